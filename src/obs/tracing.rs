// self
use crate::{_prelude::*, schema::Operation};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// A span builder used by client operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(operation: Operation, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("mini_pay.operation", operation = operation.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a `warn` event for a failed attempt that will be retried.
pub fn trace_retry(attempt: u32, limit: u32, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			attempt,
			limit,
			error = %error,
			"Retrying gateway call after transient failure."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (attempt, limit, error);
	}
}

/// Emits a `debug` event for a failure surfaced to the caller.
pub fn trace_failure(attempt: u32, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			attempt,
			retryable = error.is_retryable(),
			error = %error,
			"Gateway call failed."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (attempt, error);
	}
}
