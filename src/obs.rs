//! Optional observability helpers for gateway operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `mini_pay.operation` with the `operation`
//!   and `stage` (call site) fields, plus retry events inside them.
//! - Enable `metrics` to increment the `mini_pay_operation_total` counter for every
//!   attempt/retry/success/failure, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to a client operation.
	Attempt,
	/// A transient failure triggered another attempt.
	Retry,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Retry => "retry",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
