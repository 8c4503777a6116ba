//! Capability interfaces for the platform objects the loaders depend on.
//!
//! The browser crate implements these with `IntersectionObserver`,
//! `requestIdleCallback`, image decoding and dynamic imports. Tests implement
//! them with recording doubles.

use async_trait::async_trait;
use futures::future::LocalBoxFuture;

use crate::error::FetchError;
use crate::image::ImageFormat;
use crate::margin::RootMargin;
use crate::result::Result;

/// One observer notification for the observed element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
}

impl IntersectionEntry {
    /// An entry reporting the element inside the root box.
    #[must_use]
    pub const fn visible(intersection_ratio: f64) -> Self {
        Self {
            is_intersecting: true,
            intersection_ratio,
        }
    }

    /// An entry reporting the element outside the root box.
    #[must_use]
    pub const fn hidden() -> Self {
        Self {
            is_intersecting: false,
            intersection_ratio: 0.0,
        }
    }
}

/// Options handed to the platform when an observer is created.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverOptions {
    pub threshold: f64,
    pub root_margin: RootMargin,
}

/// Callback invoked with each entry for the observed element.
pub type EntryCallback = Box<dyn FnMut(IntersectionEntry)>;

/// A live observer registration.
pub trait ObserverHandle {
    /// Stop delivering entries and release the platform observer.
    ///
    /// Must be idempotent.
    fn disconnect(&mut self);
}

/// Creates one observer per call for a single target.
pub trait ObserverFactory {
    /// The element type the platform observes.
    type Target: ?Sized;

    /// Start observing `target`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ObserverUnavailable` when the platform cannot create
    /// an observer.
    fn observe(
        &self,
        target: &Self::Target,
        options: &ObserverOptions,
        callback: EntryCallback,
    ) -> Result<Box<dyn ObserverHandle>>;
}

/// Background work queued by a scheduler.
pub type Job = LocalBoxFuture<'static, ()>;

/// Schedules work so that it does not compete with interactive work.
pub trait IdleScheduler {
    /// Whether an idle-time primitive exists on this platform.
    fn supports_idle(&self) -> bool;

    /// Run `job` when the event loop is idle.
    fn on_idle(&self, job: Job);

    /// Run `job` on the earliest available asynchronous tick.
    fn on_next_tick(&self, job: Job);
}

/// Which primitive a job was handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulePath {
    Idle,
    NextTick,
}

/// Queue `job`, preferring idle time when the platform supports it.
pub fn schedule_background<S: IdleScheduler + ?Sized>(scheduler: &S, job: Job) -> SchedulePath {
    if scheduler.supports_idle() {
        scheduler.on_idle(job);
        SchedulePath::Idle
    } else {
        scheduler.on_next_tick(job);
        SchedulePath::NextTick
    }
}

/// Result of asking the platform whether it renders a format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Supported,
    Unsupported,
    /// The probe itself failed; treated as unsupported.
    Error(String),
}

/// Oracle answering whether a compressed format can be decoded.
#[async_trait(?Send)]
pub trait FormatProbe {
    async fn probe(&self, format: ImageFormat) -> ProbeOutcome;
}

/// Loads an optional unit of code and returns a renderable handle.
#[async_trait(?Send)]
pub trait ModuleFetcher {
    type Module;

    async fn fetch(&self) -> std::result::Result<Self::Module, FetchError>;
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        idle: bool,
        calls: RefCell<Vec<SchedulePath>>,
    }

    impl IdleScheduler for Recorder {
        fn supports_idle(&self) -> bool {
            self.idle
        }

        fn on_idle(&self, _job: Job) {
            self.calls.borrow_mut().push(SchedulePath::Idle);
        }

        fn on_next_tick(&self, _job: Job) {
            self.calls.borrow_mut().push(SchedulePath::NextTick);
        }
    }

    #[test]
    fn test_prefers_idle_when_supported() {
        let scheduler = Recorder {
            idle: true,
            ..Recorder::default()
        };
        let path = schedule_background(&scheduler, Box::pin(async {}));
        assert_eq!(path, SchedulePath::Idle);
        assert_eq!(*scheduler.calls.borrow(), vec![SchedulePath::Idle]);
    }

    #[test]
    fn test_falls_back_to_next_tick() {
        let scheduler = Recorder::default();
        let path = schedule_background(&scheduler, Box::pin(async {}));
        assert_eq!(path, SchedulePath::NextTick);
    }
}
