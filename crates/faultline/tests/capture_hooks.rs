//! Capture channel tests: panic hook and observed tasks.
//!
//! The panic test owns the process-global hook, so it lives in its own
//! binary and restores the default hook before asserting.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};

use common::quiet_handle;
use faultline::capture::{install_panic_hook, spawn_observed};
use faultline::ErrorKind;

#[test]
fn test_panic_is_recorded_and_previous_hook_still_runs() {
    static PREVIOUS_RAN: AtomicBool = AtomicBool::new(false);

    std::panic::set_hook(Box::new(|_| {
        PREVIOUS_RAN.store(true, Ordering::SeqCst);
    }));

    let (handle, _overlay) = quiet_handle();
    install_panic_hook(handle.clone());

    let _ = std::thread::spawn(|| panic!("boom from worker")).join();

    // Back to the default hook before any assertion can fire.
    let _ = std::panic::take_hook();

    assert!(PREVIOUS_RAN.load(Ordering::SeqCst));

    let view = handle.lock().current_view();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].kind, ErrorKind::Exception);
    assert_eq!(view[0].message, "boom from worker");
    assert!(view[0].url.ends_with("capture_hooks.rs"));
    assert_ne!(view[0].line, "N/A");
}

#[tokio::test]
async fn test_observed_task_error_is_recorded_and_returned() {
    let (handle, _overlay) = quiet_handle();

    let join = spawn_observed(&handle, async {
        Err::<(), String>("rejected without reason".to_string())
    });
    let result = join.await.expect("task was not cancelled");
    assert_eq!(result.unwrap_err(), "rejected without reason");

    let view = handle.lock().current_view();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].kind, ErrorKind::UnhandledRejection);
    assert_eq!(view[0].message, "rejected without reason");
    assert_eq!(view[0].stack, "Stack trace unavailable");
}

#[tokio::test]
async fn test_observed_task_success_records_nothing() {
    let (handle, _overlay) = quiet_handle();

    let join = spawn_observed(&handle, async { Ok::<_, String>(7) });
    assert_eq!(join.await.unwrap().unwrap(), 7);

    assert!(handle.lock().current_view().is_empty());
}

#[tokio::test]
async fn test_repeated_task_failures_dedup() {
    let (handle, _overlay) = quiet_handle();

    for _ in 0..3 {
        let join = spawn_observed(&handle, async {
            Err::<(), String>("same failure".to_string())
        });
        let _ = join.await;
    }

    assert_eq!(handle.lock().current_view().len(), 1);
}
