//! Outcome of a single read against the video platform.
//!
//! Remote faults never propagate past the adapter. Instead every read yields
//! a `FetchOutcome`, so callers can tell "the channel has zero views" apart
//! from "we could not ask".

use color_eyre::Result;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
  /// The platform answered and the subject exists
  Found(T),
  /// The platform answered but the subject does not exist
  NotFound,
  /// Network error, timeout, bad status or malformed payload
  Unavailable(String),
  /// No API key configured; nothing was sent
  Unconfigured,
}

impl<T> FetchOutcome<T> {
  /// Fold an adapter result into an outcome, logging the failure.
  pub fn from_result(operation: &str, result: Result<Option<T>>) -> Self {
    match result {
      Ok(Some(value)) => FetchOutcome::Found(value),
      Ok(None) => FetchOutcome::NotFound,
      Err(e) => {
        warn!(operation, error = %e, "fetch failed, treating as unavailable");
        FetchOutcome::Unavailable(e.to_string())
      }
    }
  }

  pub fn found(self) -> Option<T> {
    match self {
      FetchOutcome::Found(value) => Some(value),
      _ => None,
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchOutcome<U> {
    match self {
      FetchOutcome::Found(value) => FetchOutcome::Found(f(value)),
      FetchOutcome::NotFound => FetchOutcome::NotFound,
      FetchOutcome::Unavailable(reason) => FetchOutcome::Unavailable(reason),
      FetchOutcome::Unconfigured => FetchOutcome::Unconfigured,
    }
  }
}
