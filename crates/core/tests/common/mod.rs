//! Recording doubles for the capability traits.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use futures::executor::block_on;

use vantage_core::env::{
    EntryCallback, FormatProbe, IdleScheduler, IntersectionEntry, Job, ModuleFetcher,
    ObserverFactory, ObserverHandle, ObserverOptions, ProbeOutcome,
};
use vantage_core::{FetchError, ImageFormat, Result};

/// Element stand-in; the platform double only needs an identity.
pub struct Element(pub &'static str);

struct Registration {
    callback: Option<EntryCallback>,
    connected: Rc<Cell<bool>>,
}

#[derive(Default)]
struct ObserverLog {
    registrations: RefCell<Vec<Registration>>,
    options: RefCell<Vec<ObserverOptions>>,
    disconnects: Cell<usize>,
}

/// Observer factory that lets tests push entries.
#[derive(Clone, Default)]
pub struct FakeObservers {
    pub log: Rc<ObserverLog>,
    /// Keep delivering to disconnected registrations, like a platform with
    /// queued entries.
    pub deliver_after_disconnect: bool,
}

struct FakeHandle {
    connected: Rc<Cell<bool>>,
    log: Rc<ObserverLog>,
}

impl ObserverHandle for FakeHandle {
    fn disconnect(&mut self) {
        if self.connected.replace(false) {
            self.log.disconnects.set(self.log.disconnects.get() + 1);
        }
    }
}

impl ObserverFactory for FakeObservers {
    type Target = Element;

    fn observe(
        &self,
        _target: &Element,
        options: &ObserverOptions,
        callback: EntryCallback,
    ) -> Result<Box<dyn ObserverHandle>> {
        let connected = Rc::new(Cell::new(true));
        self.log.registrations.borrow_mut().push(Registration {
            callback: Some(callback),
            connected: connected.clone(),
        });
        self.log.options.borrow_mut().push(options.clone());
        Ok(Box::new(FakeHandle {
            connected,
            log: self.log.clone(),
        }))
    }
}

impl FakeObservers {
    /// Deliver `entry` to every registration the platform would still call.
    /// Returns how many callbacks ran.
    pub fn fire(&self, entry: IntersectionEntry) -> usize {
        let count = self.log.registrations.borrow().len();
        let mut delivered = 0;
        for index in 0..count {
            let (callback, connected) = {
                let mut registrations = self.log.registrations.borrow_mut();
                let registration = &mut registrations[index];
                (registration.callback.take(), registration.connected.get())
            };
            let Some(mut callback) = callback else { continue };
            if connected || self.deliver_after_disconnect {
                callback(entry);
                delivered += 1;
            }
            self.log.registrations.borrow_mut()[index].callback = Some(callback);
        }
        delivered
    }

    pub fn created(&self) -> usize {
        self.log.registrations.borrow().len()
    }

    pub fn live(&self) -> usize {
        self.log
            .registrations
            .borrow()
            .iter()
            .filter(|r| r.connected.get())
            .count()
    }

    pub fn disconnects(&self) -> usize {
        self.log.disconnects.get()
    }

    pub fn last_options(&self) -> Option<ObserverOptions> {
        self.log.options.borrow().last().cloned()
    }
}

/// Scheduler that queues jobs until the test drains them.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    pub idle: bool,
    idle_jobs: Rc<RefCell<VecDeque<Job>>>,
    tick_jobs: Rc<RefCell<VecDeque<Job>>>,
}

impl ManualScheduler {
    pub fn with_idle() -> Self {
        Self {
            idle: true,
            ..Self::default()
        }
    }

    pub fn pending(&self) -> usize {
        self.idle_jobs.borrow().len() + self.tick_jobs.borrow().len()
    }

    pub fn pending_idle(&self) -> usize {
        self.idle_jobs.borrow().len()
    }

    /// Run every queued job to completion.
    pub fn drain(&self) {
        loop {
            let next = {
                let idle = self.idle_jobs.borrow_mut().pop_front();
                idle.or_else(|| self.tick_jobs.borrow_mut().pop_front())
            };
            match next {
                Some(job) => block_on(job),
                None => break,
            }
        }
    }
}

impl IdleScheduler for ManualScheduler {
    fn supports_idle(&self) -> bool {
        self.idle
    }

    fn on_idle(&self, job: Job) {
        self.idle_jobs.borrow_mut().push_back(job);
    }

    fn on_next_tick(&self, job: Job) {
        self.tick_jobs.borrow_mut().push_back(job);
    }
}

/// Fetcher with a fixed answer that counts calls.
#[derive(Clone)]
pub struct CountingFetcher {
    pub answer: std::result::Result<&'static str, FetchError>,
    pub calls: Rc<Cell<usize>>,
}

impl CountingFetcher {
    pub fn ok(module: &'static str) -> Self {
        Self {
            answer: Ok(module),
            calls: Rc::default(),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            answer: Err(FetchError::new(reason)),
            calls: Rc::default(),
        }
    }
}

#[async_trait(?Send)]
impl ModuleFetcher for CountingFetcher {
    type Module = &'static str;

    async fn fetch(&self) -> std::result::Result<&'static str, FetchError> {
        self.calls.set(self.calls.get() + 1);
        self.answer.clone()
    }
}

/// Probe with per-format answers that records what it was asked.
#[derive(Default)]
pub struct ScriptedProbe {
    pub answers: Vec<(ImageFormat, ProbeOutcome)>,
    pub asked: RefCell<Vec<ImageFormat>>,
}

impl ScriptedProbe {
    pub fn supporting(formats: &[ImageFormat]) -> Self {
        Self {
            answers: formats
                .iter()
                .map(|f| (*f, ProbeOutcome::Supported))
                .collect(),
            asked: RefCell::default(),
        }
    }
}

#[async_trait(?Send)]
impl FormatProbe for ScriptedProbe {
    async fn probe(&self, format: ImageFormat) -> ProbeOutcome {
        self.asked.borrow_mut().push(format);
        self.answers
            .iter()
            .find(|(f, _)| *f == format)
            .map_or(ProbeOutcome::Unsupported, |(_, outcome)| outcome.clone())
    }
}
