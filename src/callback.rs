//! Continuation-style delivery of client results.
//!
//! For callers that prefer handing off a callback to awaiting a future.
//! Failures are passed to the callback as `Err`, so every outcome reaches the
//! caller.
//!
//! ```no_run
//! use smartdata::callback::{self, Callback};
//! use smartdata::{Credentials, DataStream, SmartDataClient};
//!
//! # async fn run() -> Result<(), smartdata::ClientError> {
//! let client = SmartDataClient::new(Credentials::new("login", "password"))?;
//! let on_streams: Callback<Vec<DataStream>> = Box::new(|result| match result {
//!     Ok(streams) => println!("{} streams", streams.len()),
//!     Err(error) => eprintln!("listing failed: {error}"),
//! });
//! callback::spawn(async move { client.streams(None).await }, Some(on_streams));
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use tokio::task::JoinHandle;

use crate::ClientError;

/// One-shot continuation receiving the outcome of a client call.
pub type Callback<T> = Box<dyn FnOnce(Result<T, ClientError>) + Send + 'static>;

/// Calls `callback` with `result`, or logs a warning and drops the result
/// when there is no callback.
///
/// Returns whether a callback ran.
pub fn invoke<T>(callback: Option<Callback<T>>, result: Result<T, ClientError>) -> bool {
    if let Some(callback) = callback {
        callback(result);
        true
    } else {
        match &result {
            Ok(_) => tracing::warn!("no callback supplied, results are unused"),
            Err(error) => tracing::warn!(%error, "no callback supplied, error is unobserved"),
        }
        false
    }
}

/// Runs `future` on the current Tokio runtime and delivers its result
/// through [`invoke`]. Returns immediately.
///
/// The request is issued even when `callback` is `None`.
///
/// # Panics
///
/// Panics when called outside a Tokio runtime.
pub fn spawn<T, F>(future: F, callback: Option<Callback<T>>) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Future<Output = Result<T, ClientError>> + Send + 'static,
{
    tokio::spawn(async move {
        invoke(callback, future.await);
    })
}
