//! Transparent fetch interception.
//!
//! Wraps a `reqwest::Client` so that transport failures and non-2xx
//! statuses are recorded as fetch errors while the caller still observes
//! the failure itself. Composition is explicit at startup: there is no
//! global client to patch, and wrapping an already-wrapped client is a
//! type error rather than a double hook.

use reqwest::{Client, IntoUrl, Response, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::record::{ErrorKind, RawErrorReport};
use crate::service::ErrorLogHandle;

/// Failure surfaced by an observed fetch.
///
/// `Status` stands in for the error a plain client would not raise on its
/// own: any response outside the 2xx range is treated as a failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { status: StatusCode, url: String },
}

/// HTTP client decorated with error capture.
pub struct ObservedFetch {
    client: Client,
    log: ErrorLogHandle,
}

impl ObservedFetch {
    pub fn wrap(client: Client, log: ErrorLogHandle) -> Self {
        Self { client, log }
    }

    /// GET `url`, treating any non-2xx status as a reportable failure.
    ///
    /// Successful responses pass through untouched. Failures are recorded
    /// and then returned to the caller, so consumers keep normal rejection
    /// semantics.
    pub async fn fetch(&self, url: impl IntoUrl) -> Result<Response, FetchError> {
        let request = match self.client.get(url).build() {
            Ok(request) => request,
            Err(err) => {
                self.record(&err.to_string(), None);
                return Err(err.into());
            }
        };
        let requested = request.url().to_string();

        match self.client.execute(request).await {
            Ok(response) if response.status().is_success() => Ok(response),
            Ok(response) => {
                let status = response.status();
                let failure = FetchError::Status {
                    status,
                    url: requested.clone(),
                };
                debug!("fetch returned non-success status {status} for {requested}");
                self.record(&failure.to_string(), Some(&requested));
                Err(failure)
            }
            Err(err) => {
                self.record(&err.to_string(), Some(&requested));
                Err(err.into())
            }
        }
    }

    /// Plain access to the wrapped client for calls that should bypass
    /// capture.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    fn record(&self, message: &str, url: Option<&str>) {
        let mut report = RawErrorReport::new()
            .with_kind(ErrorKind::FetchError)
            .with_message(message);
        if let Some(url) = url {
            report = report.with_url(url);
        }
        self.log.log(Some(report));
    }
}
