//! Result alias and the silent-degrade extension.

use std::fmt::Display;

use crate::error::{Degradation, Error};

/// The standard Result type for Vantage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Absorb any displayable error as a [`Degradation`].
pub trait DegradeExt<T> {
    /// Drop the error, recording it at `warn` under the given kind.
    fn degrade(self, kind: Degradation) -> Option<T>;
}

impl<T, E: Display> DegradeExt<T> for std::result::Result<T, E> {
    fn degrade(self, kind: Degradation) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(degradation = %kind, "{}", e);
                None
            }
        }
    }
}
