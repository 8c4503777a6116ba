//! Viewport visibility gate.
//!
//! An [`IntersectionGate`] owns at most one observer registration at a time.
//! In trigger-once mode the registration is torn down by the first
//! intersecting entry, and nothing delivered afterwards changes the state.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::cancel::CancellationToken;
use crate::config::GateSettings;
use crate::env::{IntersectionEntry, ObserverFactory, ObserverHandle, ObserverOptions};
use crate::error::Error;
use crate::margin::RootMargin;
use crate::result::Result;

/// Observer configuration for one gate.
#[derive(Debug, Clone, PartialEq)]
pub struct GateConfig {
    pub threshold: f64,
    pub root_margin: RootMargin,
    pub trigger_once: bool,
    /// Never observe; used for priority content.
    pub skip: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: RootMargin::zero(),
            trigger_once: true,
            skip: false,
        }
    }
}

impl GateConfig {
    /// Gate defaults taken from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &GateSettings) -> Self {
        Self {
            threshold: settings.threshold,
            root_margin: settings.root_margin.clone(),
            trigger_once: settings.trigger_once,
            skip: false,
        }
    }

    #[must_use]
    pub fn with_skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub fn with_root_margin(mut self, root_margin: RootMargin) -> Self {
        self.root_margin = root_margin;
        self
    }

    #[must_use]
    pub fn with_trigger_once(mut self, trigger_once: bool) -> Self {
        self.trigger_once = trigger_once;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// # Errors
    ///
    /// Returns `Error::InvalidThreshold` if the threshold is outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if (0.0..=1.0).contains(&self.threshold) {
            Ok(())
        } else {
            Err(Error::InvalidThreshold {
                value: self.threshold,
            })
        }
    }

    fn options(&self) -> ObserverOptions {
        ObserverOptions {
            threshold: self.threshold,
            root_margin: self.root_margin.clone(),
        }
    }
}

/// What the gate currently knows about its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityState {
    pub is_intersecting: bool,
    /// Monotonic: never returns to `false` once set.
    pub has_intersected_ever: bool,
}

/// Called after every state change.
pub type VisibilityListener = Box<dyn FnMut(VisibilityState)>;

struct Shared {
    state: VisibilityState,
    trigger_once: bool,
    observer: Option<Box<dyn ObserverHandle>>,
    registration: CancellationToken,
    listeners: Vec<VisibilityListener>,
}

impl Shared {
    fn deliver(shared: &Rc<RefCell<Self>>, registration: &CancellationToken, entry: IntersectionEntry) {
        let (finished, snapshot, mut listeners) = {
            let mut inner = shared.borrow_mut();
            let previous = inner.state;

            let mut finished = None;
            if inner.trigger_once {
                if inner.state.has_intersected_ever || !entry.is_intersecting {
                    return;
                }
                inner.state = VisibilityState {
                    is_intersecting: true,
                    has_intersected_ever: true,
                };
                registration.cancel();
                finished = inner.observer.take();
            } else {
                inner.state.is_intersecting = entry.is_intersecting;
                inner.state.has_intersected_ever |= entry.is_intersecting;
            }

            if inner.state == previous {
                return;
            }
            (finished, inner.state, std::mem::take(&mut inner.listeners))
        };

        if let Some(mut observer) = finished {
            debug!("gate triggered once, disconnecting observer");
            observer.disconnect();
        }

        for listener in &mut listeners {
            listener(snapshot);
        }

        let mut inner = shared.borrow_mut();
        let added = std::mem::take(&mut inner.listeners);
        inner.listeners = listeners;
        inner.listeners.extend(added);
    }
}

/// Reports whether an element has become relevant to the user.
pub struct IntersectionGate<F: ObserverFactory> {
    factory: F,
    config: GateConfig,
    shared: Rc<RefCell<Shared>>,
}

impl<F: ObserverFactory> IntersectionGate<F> {
    /// Create a gate that has not observed anything yet.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidThreshold` for an out-of-range threshold.
    pub fn new(factory: F, config: GateConfig) -> Result<Self> {
        config.validate()?;
        let shared = Shared {
            state: VisibilityState::default(),
            trigger_once: config.trigger_once,
            observer: None,
            registration: CancellationToken::new(),
            listeners: Vec::new(),
        };
        Ok(Self {
            factory,
            config,
            shared: Rc::new(RefCell::new(shared)),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &GateConfig {
        &self.config
    }

    #[must_use]
    pub const fn factory(&self) -> &F {
        &self.factory
    }

    /// Live intersection, always `false` for a skipped gate.
    #[must_use]
    pub fn is_intersecting(&self) -> bool {
        !self.config.skip && self.shared.borrow().state.is_intersecting
    }

    #[must_use]
    pub fn has_intersected_ever(&self) -> bool {
        !self.config.skip && self.shared.borrow().state.has_intersected_ever
    }

    #[must_use]
    pub fn snapshot(&self) -> VisibilityState {
        VisibilityState {
            is_intersecting: self.is_intersecting(),
            has_intersected_ever: self.has_intersected_ever(),
        }
    }

    /// Whether an observer registration is currently live.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.shared.borrow().observer.is_some()
    }

    /// Register a listener for state changes.
    pub fn subscribe(&self, listener: VisibilityListener) {
        self.shared.borrow_mut().listeners.push(listener);
    }

    /// Observe `target`, replacing any previous registration.
    ///
    /// A skipped gate and a trigger-once gate that already fired stay
    /// unregistered.
    ///
    /// # Errors
    ///
    /// Propagates the factory's `Error::ObserverUnavailable`.
    pub fn attach(&mut self, target: &F::Target) -> Result<()> {
        self.detach();

        if self.config.skip {
            return Ok(());
        }
        if self.config.trigger_once && self.shared.borrow().state.has_intersected_ever {
            return Ok(());
        }

        let registration = CancellationToken::new();
        let callback_registration = registration.clone();
        let weak: Weak<RefCell<Shared>> = Rc::downgrade(&self.shared);
        let callback = Box::new(move |entry: IntersectionEntry| {
            if callback_registration.is_cancelled() {
                return;
            }
            if let Some(shared) = weak.upgrade() {
                Shared::deliver(&shared, &callback_registration, entry);
            }
        });

        let mut observer = self
            .factory
            .observe(target, &self.config.options(), callback)?;

        // The platform may deliver an entry synchronously during `observe`.
        if registration.is_cancelled() {
            observer.disconnect();
            return Ok(());
        }

        let mut shared = self.shared.borrow_mut();
        shared.registration = registration;
        shared.observer = Some(observer);
        debug!(root_margin = %self.config.root_margin, "gate observing");
        Ok(())
    }

    /// Observe `target` if the caller's ref is bound, otherwise do nothing.
    ///
    /// # Errors
    ///
    /// See [`IntersectionGate::attach`].
    pub fn attach_optional(&mut self, target: Option<&F::Target>) -> Result<()> {
        match target {
            Some(target) => self.attach(target),
            None => {
                self.detach();
                Ok(())
            }
        }
    }

    /// Tear down the current registration, if any.
    pub fn detach(&mut self) {
        let observer = {
            let mut shared = self.shared.borrow_mut();
            shared.registration.cancel();
            if !shared.trigger_once {
                shared.state.is_intersecting = false;
            }
            shared.observer.take()
        };
        if let Some(mut observer) = observer {
            observer.disconnect();
        }
    }

    /// Swap the configuration and re-observe `target`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidThreshold` for a bad config (the old
    /// registration is kept), or the factory's error.
    pub fn reconfigure(&mut self, config: GateConfig, target: &F::Target) -> Result<()> {
        config.validate()?;
        self.detach();
        {
            let mut shared = self.shared.borrow_mut();
            shared.trigger_once = config.trigger_once;
            // A fired trigger-once gate stays open and is not re-observed.
            if config.trigger_once && shared.state.has_intersected_ever {
                shared.state.is_intersecting = true;
            }
        }
        self.config = config;
        self.attach(target)
    }
}

impl<F: ObserverFactory> Drop for IntersectionGate<F> {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use std::cell::Cell;

    use super::*;
    use crate::env::EntryCallback;

    #[derive(Default)]
    struct Slot {
        callback: RefCell<Option<EntryCallback>>,
        created: Cell<usize>,
        live: Rc<Cell<usize>>,
    }

    struct Handle(Rc<Cell<usize>>, bool);

    impl ObserverHandle for Handle {
        fn disconnect(&mut self) {
            if !self.1 {
                self.1 = true;
                self.0.set(self.0.get() - 1);
            }
        }
    }

    #[derive(Clone, Default)]
    struct Factory(Rc<Slot>);

    impl Factory {
        fn fire(&self, entry: IntersectionEntry) {
            let callback = self.0.callback.borrow_mut().take();
            if let Some(mut callback) = callback {
                callback(entry);
                self.0.callback.borrow_mut().get_or_insert(callback);
            }
        }
    }

    impl ObserverFactory for Factory {
        type Target = str;

        fn observe(
            &self,
            _target: &str,
            _options: &ObserverOptions,
            callback: EntryCallback,
        ) -> Result<Box<dyn ObserverHandle>> {
            self.0.created.set(self.0.created.get() + 1);
            self.0.live.set(self.0.live.get() + 1);
            *self.0.callback.borrow_mut() = Some(callback);
            Ok(Box::new(Handle(self.0.live.clone(), false)))
        }
    }

    #[test]
    fn test_trigger_once_disconnects() {
        let factory = Factory::default();
        let mut gate = IntersectionGate::new(factory.clone(), GateConfig::default()).unwrap();
        gate.attach("hero").unwrap();
        assert!(gate.is_observing());

        factory.fire(IntersectionEntry::hidden());
        assert!(!gate.has_intersected_ever());

        factory.fire(IntersectionEntry::visible(0.5));
        assert!(gate.is_intersecting());
        assert!(gate.has_intersected_ever());
        assert!(!gate.is_observing());
        assert_eq!(factory.0.live.get(), 0);

        factory.fire(IntersectionEntry::hidden());
        assert!(gate.has_intersected_ever());
        assert!(gate.is_intersecting());
    }

    #[test]
    fn test_live_tracking_without_trigger_once() {
        let factory = Factory::default();
        let config = GateConfig::default().with_trigger_once(false);
        let mut gate = IntersectionGate::new(factory.clone(), config).unwrap();
        gate.attach("card").unwrap();

        factory.fire(IntersectionEntry::visible(1.0));
        assert!(gate.is_intersecting());
        factory.fire(IntersectionEntry::hidden());
        assert!(!gate.is_intersecting());
        assert!(gate.has_intersected_ever());
        assert!(gate.is_observing());
    }

    #[test]
    fn test_skip_never_observes() {
        let factory = Factory::default();
        let mut gate =
            IntersectionGate::new(factory.clone(), GateConfig::default().with_skip(true)).unwrap();
        gate.attach("priority").unwrap();

        assert_eq!(factory.0.created.get(), 0);
        assert!(!gate.is_intersecting());
    }

    #[test]
    fn test_reattach_does_not_accumulate() {
        let factory = Factory::default();
        let mut gate = IntersectionGate::new(factory.clone(), GateConfig::default()).unwrap();
        for _ in 0..5 {
            gate.attach("card").unwrap();
        }
        assert_eq!(factory.0.created.get(), 5);
        assert_eq!(factory.0.live.get(), 1);

        drop(gate);
        assert_eq!(factory.0.live.get(), 0);
    }

    #[test]
    fn test_unbound_ref_releases_observer() {
        let factory = Factory::default();
        let mut gate = IntersectionGate::new(factory.clone(), GateConfig::default()).unwrap();
        gate.attach_optional(None).unwrap();
        assert_eq!(factory.0.created.get(), 0);

        gate.attach_optional(Some("card")).unwrap();
        assert_eq!(factory.0.live.get(), 1);

        gate.attach_optional(None).unwrap();
        assert_eq!(factory.0.live.get(), 0);
        assert!(!gate.is_observing());
    }

    #[test]
    fn test_listener_sees_changes() {
        let factory = Factory::default();
        let mut gate = IntersectionGate::new(factory.clone(), GateConfig::default()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        gate.subscribe(Box::new(move |state| sink.borrow_mut().push(state)));
        gate.attach("card").unwrap();

        factory.fire(IntersectionEntry::hidden());
        factory.fire(IntersectionEntry::visible(0.2));

        assert_eq!(
            *seen.borrow(),
            vec![VisibilityState {
                is_intersecting: true,
                has_intersected_ever: true
            }]
        );
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let config = GateConfig::default().with_threshold(-0.1);
        assert!(IntersectionGate::new(Factory::default(), config).is_err());
    }
}
