// self
use crate::{obs::OperationOutcome, schema::Operation};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_operation_outcome(operation: Operation, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"mini_pay_operation_total",
			"operation" => operation.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, outcome);
	}
}
