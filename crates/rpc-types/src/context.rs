//! Per-call deadlines shared by every collaborator a handler awaits.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Error returned when a call outlives its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Deadline exceeded")]
pub struct DeadlineExceeded;

/// Per-call context carrying the caller's deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallContext {
	deadline: Option<Instant>,
}

impl CallContext {
	/// Context without a deadline.
	pub fn background() -> Self {
		Self::default()
	}

	/// Context expiring `timeout` from now.
	pub fn with_timeout(timeout: Duration) -> Self {
		Self::with_deadline(Instant::now() + timeout)
	}

	pub fn with_deadline(deadline: Instant) -> Self {
		Self {
			deadline: Some(deadline),
		}
	}

	pub fn deadline(&self) -> Option<Instant> {
		self.deadline
	}

	/// Runs `future` until it completes or the deadline passes.
	///
	/// An expired deadline drops the in-flight future.
	pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, DeadlineExceeded> {
		match self.deadline {
			Some(deadline) => tokio::time::timeout_at(deadline, future)
				.await
				.map_err(|_| DeadlineExceeded),
			None => Ok(future.await),
		}
	}
}
