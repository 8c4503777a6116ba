//! Page components for the showcase

pub mod home;

pub use home::Home;
