//! Bill-number generation contract.
//!
//! The gateway rejects a reused bill number with [`ErrCode::BillExists`], which is what makes
//! a retried deduction safe. The client therefore asks for exactly one bill number per
//! logical call and reuses it on every attempt.
//!
//! [`ErrCode::BillExists`]: crate::reply::ErrCode::BillExists

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, error::BoxError};

/// Boxed future returned by [`BillNoGenerator::generate`].
pub type BillNoFuture<'a> =
	Pin<Box<dyn Future<Output = Result<String, BoxError>> + 'a + Send>>;

/// Produces globally unique bill numbers.
pub trait BillNoGenerator
where
	Self: Send + Sync,
{
	/// Returns a fresh bill number.
	fn generate(&self) -> BillNoFuture<'_>;
}

/// Default generator: random alphanumeric strings (32 characters unless overridden).
#[derive(Clone, Copy, Debug)]
pub struct RandomBillNo {
	len: usize,
}
impl RandomBillNo {
	const DEFAULT_LEN: usize = 32;

	/// Overrides the generated length; clamped to at least one character.
	pub fn with_len(len: usize) -> Self {
		Self { len: len.max(1) }
	}
}
impl Default for RandomBillNo {
	fn default() -> Self {
		Self { len: Self::DEFAULT_LEN }
	}
}
impl BillNoGenerator for RandomBillNo {
	fn generate(&self) -> BillNoFuture<'_> {
		let bill_no: String =
			rand::rng().sample_iter(Alphanumeric).take(self.len).map(char::from).collect();

		Box::pin(async move { Ok(bill_no) })
	}
}

/// Deterministic `{prefix}-{n}` generator starting at 1.
#[derive(Debug)]
pub struct SequenceBillNo {
	prefix: String,
	next: AtomicU64,
}
impl SequenceBillNo {
	/// Creates a sequence with the provided prefix.
	pub fn new(prefix: impl Into<String>) -> Self {
		Self { prefix: prefix.into(), next: AtomicU64::new(1) }
	}

	/// Number of bill numbers handed out so far.
	pub fn issued(&self) -> u64 {
		self.next.load(Ordering::Relaxed) - 1
	}
}
impl BillNoGenerator for SequenceBillNo {
	fn generate(&self) -> BillNoFuture<'_> {
		let n = self.next.fetch_add(1, Ordering::Relaxed);
		let bill_no = format!("{}-{n}", self.prefix);

		Box::pin(async move { Ok(bill_no) })
	}
}
