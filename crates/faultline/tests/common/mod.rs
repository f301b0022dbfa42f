//! Shared test fixtures: a recording overlay fake and service helpers.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use faultline::{
    ErrorLogHandle, ErrorLogService, ErrorRecord, MemoryBackend, Overlay, StackLocation,
};

/// Everything the overlay was told, for assertions.
#[derive(Debug, Clone, Default)]
pub struct OverlayLog {
    pub renders: Vec<Vec<ErrorRecord>>,
    pub shows: usize,
    pub hides: usize,
    pub details: Vec<(usize, StackLocation)>,
    pub copied: Vec<String>,
}

/// Overlay fake that records every call it receives.
#[derive(Clone, Default)]
pub struct RecordingOverlay {
    state: Arc<Mutex<OverlayLog>>,
}

impl RecordingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> OverlayLog {
        self.state.lock().unwrap().clone()
    }
}

impl Overlay for RecordingOverlay {
    fn render(&mut self, view: &[&ErrorRecord]) {
        self.state
            .lock()
            .unwrap()
            .renders
            .push(view.iter().map(|record| (*record).clone()).collect());
    }

    fn show(&mut self) {
        self.state.lock().unwrap().shows += 1;
    }

    fn hide(&mut self) {
        self.state.lock().unwrap().hides += 1;
    }

    fn toggle_details(&mut self, index: usize, location: &StackLocation) {
        self.state
            .lock()
            .unwrap()
            .details
            .push((index, location.clone()));
    }

    fn copy_stack(&mut self, stack: &str) {
        self.state.lock().unwrap().copied.push(stack.to_string());
    }
}

/// Install the test subscriber once so core diagnostics show up under
/// `--nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Initialized service over an in-memory store, overlay closed.
pub fn quiet_handle() -> (ErrorLogHandle, RecordingOverlay) {
    init_tracing();
    let overlay = RecordingOverlay::new();
    let service = ErrorLogService::new(Box::new(MemoryBackend::new()), Box::new(overlay.clone()))
        .with_open_on_start(false);
    let handle = ErrorLogHandle::new(service);
    handle.init();
    (handle, overlay)
}
