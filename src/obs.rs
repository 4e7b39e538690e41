//! Instrumentation for the authenticator and the decoder.
//!
//! Three flows are observed: a caller asking for a token, the endpoint exchange a refresh cycle
//! performs, and a decode call. Each one records an `attempt` when it starts and exactly one
//! terminal outcome when it ends.
//!
//! # Feature Flags
//!
//! - `tracing` wraps every flow in a `reddit_core.flow` span carrying `flow` and `stage`.
//! - `metrics` counts outcomes in `reddit_core_flow_total{flow, outcome}` and records the
//!   wall-clock time of each flow in `reddit_core_flow_duration_seconds{flow}`.
//!
//! Without either feature every helper here compiles down to nothing.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// std
use std::time::Instant;
// self
use crate::_prelude::*;

/// The flows this crate instruments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// `Authenticator::token`, from cache lookup to result (including waits on a refresh).
	Token,
	/// One token endpoint exchange, shared by every caller of its cycle.
	Refresh,
	/// Decoding a Thing, Listing, or MoreChildren payload.
	Decode,
}
impl FlowKind {
	/// Label used in span and metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Token => "token",
			Self::Refresh => "refresh",
			Self::Decode => "decode",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// The flow started.
	Attempt,
	/// The flow produced a value.
	Success,
	/// The flow produced an error.
	Failure,
	/// The caller gave up before the flow finished.
	Cancelled,
}
impl FlowOutcome {
	/// Label used in metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Attempt => "attempt",
			Self::Success => "success",
			Self::Failure => "failure",
			Self::Cancelled => "cancelled",
		}
	}

	/// Success or failure, depending on `result`.
	pub fn of<T, E>(result: &std::result::Result<T, E>) -> Self {
		if result.is_ok() { Self::Success } else { Self::Failure }
	}

	/// Like [`FlowOutcome::of`], but reports caller cancellation separately.
	pub fn of_auth<T>(result: &Result<T>) -> Self {
		match result {
			Err(e) if e.is_cancelled() => Self::Cancelled,
			_ => Self::of(result),
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One observed run of a flow.
///
/// Created with [`FlowRecord::start`], which records the attempt; [`FlowRecord::finish`]
/// records the outcome and the elapsed time.
#[derive(Debug)]
pub struct FlowRecord {
	kind: FlowKind,
	started: Instant,
}
impl FlowRecord {
	/// Records an attempt of `kind` and starts the clock.
	pub fn start(kind: FlowKind) -> Self {
		record_flow_outcome(kind, FlowOutcome::Attempt);

		Self { kind, started: Instant::now() }
	}

	/// Records the terminal `outcome`.
	pub fn finish(self, outcome: FlowOutcome) {
		record_flow_outcome(self.kind, outcome);
		record_flow_duration(self.kind, self.started.elapsed());
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::RequestError;

	#[test]
	fn cancellation_has_its_own_outcome() {
		let cancelled: Result<()> = Err(RequestError::Cancelled.into());
		let failed: Result<()> = Err(RequestError::Other { message: "boom".into() }.into());

		assert_eq!(FlowOutcome::of_auth(&cancelled), FlowOutcome::Cancelled);
		assert_eq!(FlowOutcome::of_auth(&failed), FlowOutcome::Failure);
		assert_eq!(FlowOutcome::of_auth(&Ok(())), FlowOutcome::Success);
		assert_eq!(FlowOutcome::of(&cancelled), FlowOutcome::Failure);
	}

	#[test]
	fn records_finish_for_every_kind() {
		for kind in [FlowKind::Token, FlowKind::Refresh, FlowKind::Decode] {
			FlowRecord::start(kind).finish(FlowOutcome::Success);
		}
	}
}
