//! Bounded retry policy with linear backoff and random jitter.

// crates.io
use rand::Rng;
// self
use crate::_prelude::*;

/// How many times, and how patiently, the dispatcher repeats a transient failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
	/// Additional attempts after the first one.
	pub limit: u32,
	/// Base delay; the n-th retry waits `n * backoff`.
	pub backoff: Duration,
	/// Upper bound of the random delay added to every wait.
	pub max_jitter: Duration,
}
impl RetryPolicy {
	/// Number of additional attempts used unless overridden.
	pub const DEFAULT_LIMIT: u32 = 3;
	const DEFAULT_BACKOFF: Duration = Duration::milliseconds(100);
	const DEFAULT_MAX_JITTER: Duration = Duration::milliseconds(50);

	/// Policy that never retries.
	pub const fn none() -> Self {
		Self { limit: 0, backoff: Duration::ZERO, max_jitter: Duration::ZERO }
	}

	/// Overrides the retry limit.
	pub fn with_limit(mut self, limit: u32) -> Self {
		self.limit = limit;

		self
	}

	/// Overrides the base delay and jitter bound; negative values are treated as zero.
	pub fn with_backoff(mut self, backoff: Duration, max_jitter: Duration) -> Self {
		self.backoff = clamp_non_negative(backoff);
		self.max_jitter = clamp_non_negative(max_jitter);

		self
	}

	/// Whether another attempt is allowed after `attempt` attempts have run.
	pub fn allows_retry(&self, attempt: u32) -> bool {
		attempt <= self.limit
	}

	/// Deterministic part of the wait before retry number `retry` (1-based).
	pub fn base_delay(&self, retry: u32) -> Duration {
		self.backoff.saturating_mul(i32::try_from(retry).unwrap_or(i32::MAX))
	}

	/// Full wait before retry number `retry`, jitter included; saturates at [`Duration::MAX`].
	pub fn delay(&self, retry: u32) -> Duration {
		self.base_delay(retry).saturating_add(self.jitter())
	}

	fn jitter(&self) -> Duration {
		let max_ms = self.max_jitter.whole_milliseconds();

		if max_ms <= 0 {
			return Duration::ZERO;
		}

		let max_ms = i64::try_from(max_ms).unwrap_or(i64::MAX);

		Duration::milliseconds(rand::rng().random_range(0..=max_ms))
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			limit: Self::DEFAULT_LIMIT,
			backoff: Self::DEFAULT_BACKOFF,
			max_jitter: Self::DEFAULT_MAX_JITTER,
		}
	}
}

/// Suspends the current task for `delay`; zero or negative delays return immediately.
pub(crate) async fn sleep(delay: Duration) {
	let Ok(delay) = std::time::Duration::try_from(delay) else { return };

	if !delay.is_zero() {
		tokio::time::sleep(delay).await;
	}
}

fn clamp_non_negative(value: Duration) -> Duration {
	if value.is_negative() { Duration::ZERO } else { value }
}
