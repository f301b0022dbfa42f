//! Error log service - capture pipeline and overlay state machine.
//!
//! A single injectable object owns the store, the overlay collaborator,
//! and the visibility flag; nothing lives in ambient globals, so tests
//! can run any number of independent instances. Capture hooks hold
//! [`ErrorLogHandle`] clones and feed everything through the same `log()`
//! path, so dedup and persistence apply uniformly no matter which channel
//! an error arrived on.
//!
//! Visibility is a two-state machine: `open ⇄ closed`, flipped by
//! explicit user intent and driven to closed automatically when the last
//! unresolved record is handled. A record that arrives while the overlay
//! is closed re-renders the view but does not reopen it.

use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use tracing::{debug, info};

use crate::config::FaultlineConfig;
use crate::overlay::{Overlay, OverlayIntent};
use crate::persist::{JsonFileBackend, PersistenceBackend};
use crate::record::{ErrorRecord, RawErrorReport};
use crate::store::{ErrorStore, ResolveOutcome};

pub struct ErrorLogService {
    store: ErrorStore,
    overlay: Box<dyn Overlay>,
    visible: bool,
    open_on_start: bool,
}

impl ErrorLogService {
    pub fn new(backend: Box<dyn PersistenceBackend>, overlay: Box<dyn Overlay>) -> Self {
        Self {
            store: ErrorStore::new(backend),
            overlay,
            visible: false,
            open_on_start: true,
        }
    }

    /// Assemble a service from config: file-backed store plus the
    /// supplied overlay.
    pub fn from_config(config: &FaultlineConfig, overlay: Box<dyn Overlay>) -> Self {
        let backend = JsonFileBackend::new(&config.storage_path);
        Self::new(Box::new(backend), overlay).with_open_on_start(config.open_on_start)
    }

    pub fn with_open_on_start(mut self, open: bool) -> Self {
        self.open_on_start = open;
        self
    }

    /// Hydrate persisted records and draw the initial view.
    pub fn init(&mut self) {
        self.store.hydrate();
        info!("error log ready with {} persisted records", self.store.len());
        if self.open_on_start {
            self.set_visible(true);
        }
        self.render();
    }

    /// Capture an error report. Never fails; missing input is coerced
    /// with a diagnostic.
    pub fn log(&mut self, report: Option<RawErrorReport>) {
        let record = ErrorRecord::normalize(report);
        if self.store.add(record) {
            self.render();
        }
    }

    /// Handle one of the four overlay intents.
    pub fn handle_intent(&mut self, intent: OverlayIntent) {
        match intent {
            OverlayIntent::Resolve(index) => self.resolve(index),
            OverlayIntent::ToggleDetails(index) => self.toggle_details(index),
            OverlayIntent::CopyStack(stack) => self.overlay.copy_stack(&stack),
            OverlayIntent::SetVisible(open) => self.set_visible(open),
        }
    }

    /// Unresolved records in insertion order, as a snapshot.
    pub fn current_view(&self) -> Vec<ErrorRecord> {
        self.store.current_view().into_iter().cloned().collect()
    }

    /// Distinct captured errors, resolved ones included.
    pub fn record_count(&self) -> usize {
        self.store.len()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Final persist and hide. The process-global panic hook, if any, is
    /// restored by the embedder.
    pub fn teardown(&mut self) {
        self.store.flush();
        self.set_visible(false);
    }

    fn resolve(&mut self, index: usize) {
        match self.store.resolve_visible(index) {
            ResolveOutcome::NotFound => {}
            ResolveOutcome::Resolved => self.render(),
            ResolveOutcome::Drained => {
                self.render();
                // Auto-hide fires once: only an open overlay closes.
                if self.visible {
                    self.set_visible(false);
                }
            }
        }
    }

    fn toggle_details(&mut self, index: usize) {
        let Some(location) = self
            .store
            .current_view()
            .get(index)
            .map(|record| record.location())
        else {
            return;
        };
        self.overlay.toggle_details(index, &location);
    }

    fn set_visible(&mut self, open: bool) {
        if self.visible == open {
            return;
        }
        self.visible = open;
        if open {
            self.overlay.show();
        } else {
            self.overlay.hide();
        }
    }

    fn render(&mut self) {
        let view = self.store.current_view();
        self.overlay.render(&view);
    }
}

/// Clone-able shared handle the capture hooks use to reach the service.
#[derive(Clone)]
pub struct ErrorLogHandle {
    inner: Arc<Mutex<ErrorLogService>>,
}

impl ErrorLogHandle {
    pub fn new(service: ErrorLogService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    /// Lock the service. A poisoned lock is taken over rather than
    /// propagated so a capture after a panic can still record.
    pub fn lock(&self) -> MutexGuard<'_, ErrorLogService> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn init(&self) {
        self.lock().init();
    }

    /// Capture an error report through the shared service.
    pub fn log(&self, report: Option<RawErrorReport>) {
        self.lock().log(report);
    }

    /// Capture without blocking. Used by the panic hook, which must never
    /// wait on a lock the panicking thread may already hold. Returns
    /// whether the report was recorded.
    pub fn try_log(&self, report: Option<RawErrorReport>) -> bool {
        match self.inner.try_lock() {
            Ok(mut service) => {
                service.log(report);
                true
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                poisoned.into_inner().log(report);
                true
            }
            Err(TryLockError::WouldBlock) => {
                debug!("error log busy, report dropped");
                false
            }
        }
    }

    pub fn handle_intent(&self, intent: OverlayIntent) {
        self.lock().handle_intent(intent);
    }

    pub fn teardown(&self) {
        self.lock().teardown();
    }
}
