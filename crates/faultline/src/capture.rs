//! Capture hooks: panic and observed-task channels.
//!
//! Both channels are transparent to the host application. The previous
//! panic hook still runs after recording, so default panic reporting is
//! unchanged, and a failed observed task still hands its error to whoever
//! joins it. Every hook goes through the same `log()` path as direct
//! reports: same dedup, same persistence, same render notification.

use std::backtrace::Backtrace;
use std::fmt::Display;
use std::future::Future;
use std::panic::{self, PanicHookInfo};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::record::{ErrorKind, RawErrorReport};
use crate::service::ErrorLogHandle;

/// Install a panic hook that records every panic as an exception and then
/// delegates to the hook installed before it.
///
/// The hook records through [`ErrorLogHandle::try_log`]: a panic raised
/// while the current thread already holds the service lock is skipped
/// instead of deadlocking the process.
pub fn install_panic_hook(handle: ErrorLogHandle) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let message = panic_message(info);
        let backtrace = Backtrace::force_capture().to_string();

        let mut report = RawErrorReport::new()
            .with_kind(ErrorKind::Exception)
            .with_message(&message)
            .with_stack(&backtrace);
        if let Some(location) = info.location() {
            report = report
                .with_url(location.file())
                .with_line(&location.line().to_string())
                .with_column(&location.column().to_string());
        }

        if !handle.try_log(Some(report)) {
            debug!("panic not recorded, error log was busy");
        }

        previous(info);
    }));
}

/// Spawn a fallible future and record an `Err` completion as an unhandled
/// rejection.
///
/// The error is recorded and then still returned through the join handle;
/// observation never swallows the failure.
pub fn spawn_observed<F, T, E>(handle: &ErrorLogHandle, future: F) -> JoinHandle<Result<T, E>>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
{
    let log = handle.clone();
    tokio::spawn(async move {
        let result = future.await;
        if let Err(err) = &result {
            debug!("observed task completed with error: {err}");
            log.log(Some(
                RawErrorReport::new()
                    .with_kind(ErrorKind::UnhandledRejection)
                    .with_message(&err.to_string()),
            ));
        }
        result
    })
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
