//! Viewport-gated loading of optional heavy modules.
//!
//! A [`DeferredModule`] requests its module once the host has mounted and
//! the placeholder has come near the viewport. The fetch runs from an idle
//! job when the platform has one. A rejected fetch leaves the poster in
//! place for the lifetime of the instance.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::cancel::CancellationToken;
use crate::config::DeferredSettings;
use crate::env::{schedule_background, IdleScheduler, ModuleFetcher, SchedulePath};
use crate::error::{Degradation, FetchError};
use crate::gate::{GateConfig, VisibilityState};
use crate::result::DegradeExt;

/// Lifecycle of one deferred module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredModuleState<M> {
    NotRequested,
    Loading,
    Loaded(M),
    /// Terminal; no retry.
    Failed,
}

impl<M> DeferredModuleState<M> {
    #[must_use]
    pub const fn phase(&self) -> DeferredPhase {
        match self {
            Self::NotRequested => DeferredPhase::NotRequested,
            Self::Loading => DeferredPhase::Loading,
            Self::Loaded(_) => DeferredPhase::Loaded,
            Self::Failed => DeferredPhase::Failed,
        }
    }
}

/// Payload-free view of [`DeferredModuleState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredPhase {
    NotRequested,
    Loading,
    Loaded,
    Failed,
}

impl DeferredPhase {
    /// Whether the poster should be rendered.
    #[must_use]
    pub const fn shows_placeholder(self) -> bool {
        !matches!(self, Self::Loaded)
    }
}

impl fmt::Display for DeferredPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRequested => write!(f, "not-requested"),
            Self::Loading => write!(f, "loading"),
            Self::Loaded => write!(f, "loaded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Called after every phase change.
pub type PhaseListener = Box<dyn FnMut(DeferredPhase)>;

struct Inner<M> {
    state: DeferredModuleState<M>,
    mounted: bool,
    gate_satisfied: bool,
    listeners: Vec<PhaseListener>,
}

fn notify<M>(inner: &Rc<RefCell<Inner<M>>>, phase: DeferredPhase) {
    let mut listeners = std::mem::take(&mut inner.borrow_mut().listeners);
    for listener in &mut listeners {
        listener(phase);
    }
    let mut guard = inner.borrow_mut();
    let added = std::mem::take(&mut guard.listeners);
    guard.listeners = listeners;
    guard.listeners.extend(added);
}

fn settle<M>(inner: &Rc<RefCell<Inner<M>>>, result: Result<M, FetchError>) {
    let phase = {
        let mut guard = inner.borrow_mut();
        if guard.state.phase() != DeferredPhase::Loading {
            return;
        }
        guard.state = match result.degrade(Degradation::ModuleFetchFailure) {
            Some(module) => DeferredModuleState::Loaded(module),
            None => DeferredModuleState::Failed,
        };
        guard.state.phase()
    };
    debug!(%phase, "deferred module settled");
    notify(inner, phase);
}

/// Defers an expensive module until it is plausibly about to be seen.
pub struct DeferredModule<S, F>
where
    S: IdleScheduler,
    F: ModuleFetcher,
{
    scheduler: S,
    fetcher: Rc<F>,
    inner: Rc<RefCell<Inner<F::Module>>>,
    token: CancellationToken,
}

impl<S, F> DeferredModule<S, F>
where
    S: IdleScheduler,
    F: ModuleFetcher + 'static,
    F::Module: 'static,
{
    #[must_use]
    pub fn new(scheduler: S, fetcher: F) -> Self {
        Self {
            scheduler,
            fetcher: Rc::new(fetcher),
            inner: Rc::new(RefCell::new(Inner {
                state: DeferredModuleState::NotRequested,
                mounted: false,
                gate_satisfied: false,
                listeners: Vec::new(),
            })),
            token: CancellationToken::new(),
        }
    }

    /// Gate configuration with the pre-emptive margin.
    #[must_use]
    pub fn gate_config(settings: &DeferredSettings) -> GateConfig {
        GateConfig::default()
            .with_threshold(settings.threshold)
            .with_root_margin(settings.root_margin.clone())
            .with_trigger_once(true)
    }

    #[must_use]
    pub fn phase(&self) -> DeferredPhase {
        self.inner.borrow().state.phase()
    }

    /// Clone of the loaded module, if any.
    #[must_use]
    pub fn module(&self) -> Option<F::Module>
    where
        F::Module: Clone,
    {
        match &self.inner.borrow().state {
            DeferredModuleState::Loaded(module) => Some(module.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.borrow().mounted
    }

    #[must_use]
    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Register a listener for phase changes.
    pub fn subscribe(&self, listener: PhaseListener) {
        self.inner.borrow_mut().listeners.push(listener);
    }

    /// Record the host's first commit. Later calls change nothing.
    pub fn mark_mounted(&self) -> Option<SchedulePath> {
        self.inner.borrow_mut().mounted = true;
        self.maybe_request()
    }

    /// Feed the placeholder's gate state.
    pub fn on_visibility(&self, visibility: VisibilityState) -> Option<SchedulePath> {
        if visibility.is_intersecting || visibility.has_intersected_ever {
            self.inner.borrow_mut().gate_satisfied = true;
        }
        self.maybe_request()
    }

    /// Stop applying results; the instance is going away.
    pub fn unmount(&self) {
        self.token.cancel();
    }

    fn maybe_request(&self) -> Option<SchedulePath> {
        if self.token.is_cancelled() {
            return None;
        }
        {
            let mut guard = self.inner.borrow_mut();
            let ready = guard.mounted && guard.gate_satisfied;
            if !ready || guard.state.phase() != DeferredPhase::NotRequested {
                return None;
            }
            guard.state = DeferredModuleState::Loading;
        }
        notify(&self.inner, DeferredPhase::Loading);

        let fetcher = Rc::clone(&self.fetcher);
        let inner: Weak<RefCell<Inner<F::Module>>> = Rc::downgrade(&self.inner);
        let token = self.token.clone();
        let job = Box::pin(async move {
            if token.is_cancelled() {
                return;
            }
            let result = fetcher.fetch().await;
            let applied = token.run_if_live(|| {
                if let Some(inner) = inner.upgrade() {
                    settle(&inner, result);
                }
            });
            if applied.is_none() {
                debug!("deferred module settled after unmount, discarding");
            }
        });

        let path = schedule_background(&self.scheduler, job);
        debug!(?path, "deferred module fetch scheduled");
        Some(path)
    }
}

impl<S, F> Drop for DeferredModule<S, F>
where
    S: IdleScheduler,
    F: ModuleFetcher,
{
    fn drop(&mut self) {
        self.token.cancel();
    }
}
