//! Payment client facade: `pay`, `get_balance`, and `present`.

pub mod config;

mod balance;
mod pay;
mod present;

pub use config::*;

// self
use crate::{
	_prelude::*,
	dispatch::RequestDispatcher,
	ext::{AccessTokenProvider, BillNoGenerator},
	http::GatewayHttpClient,
	obs::{self, OperationOutcome, OperationSpan},
	payload::{Fields, Identity},
	reply::GatewayReply,
	schema::Operation,
};
#[cfg(feature = "reqwest")]
use crate::{ext::RandomBillNo, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestPaymentClient = PaymentClient<ReqwestHttpClient>;

/// Issues signed gateway calls for one application.
///
/// The client owns its configuration and collaborators behind `Arc`s, holds no mutable
/// state, and can be cloned freely; concurrent calls are independent.
pub struct PaymentClient<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// HTTP transport used for every attempt.
	pub http_client: Arc<C>,
	/// Immutable configuration.
	pub config: Arc<ClientConfig>,
	/// Source of access tokens.
	pub access_tokens: Arc<dyn AccessTokenProvider>,
	/// Source of bill numbers for `pay` and `present`.
	pub bill_numbers: Arc<dyn BillNoGenerator>,
}
impl<C> PaymentClient<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(
		config: ClientConfig,
		access_tokens: impl 'static + AccessTokenProvider,
		bill_numbers: impl 'static + BillNoGenerator,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			config: Arc::new(config),
			access_tokens: Arc::new(access_tokens),
			bill_numbers: Arc::new(bill_numbers),
		}
	}

	/// Returns a dispatcher borrowing this client's collaborators.
	pub fn dispatcher(&self) -> RequestDispatcher<'_, C> {
		RequestDispatcher::new(self.http_client.as_ref(), self.access_tokens.as_ref(), &self.config)
	}

	/// Sends `fields` for `operation` and returns the whole camelCased reply.
	///
	/// The typed helpers cover the documented fields; use this for fields they do not model.
	/// Callers are responsible for including a unique `bill_no` when the operation needs one.
	pub async fn call(
		&self,
		operation: Operation,
		identity: &Identity,
		fields: &Fields,
	) -> Result<JsonMap<String, JsonValue>> {
		self.observe(operation, "call", async {
			self.dispatcher()
				.dispatch(operation, identity, fields)
				.await
				.map(GatewayReply::into_camel_case)
		})
		.await
	}

	/// Generates the bill number for one logical call.
	pub(crate) async fn next_bill_no(&self) -> Result<String> {
		self.bill_numbers.generate().await.map_err(Error::bill_no)
	}

	/// Wraps `fut` in the operation span and records attempt + outcome metrics.
	pub(crate) async fn observe<T, Fut>(
		&self,
		operation: Operation,
		stage: &'static str,
		fut: Fut,
	) -> Result<T>
	where
		Fut: Future<Output = Result<T>>,
	{
		let span = OperationSpan::new(operation, stage);

		obs::record_operation_outcome(operation, OperationOutcome::Attempt);

		let result = span.instrument(fut).await;

		match &result {
			Ok(_) => obs::record_operation_outcome(operation, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(operation, OperationOutcome::Failure),
		}

		result
	}
}
#[cfg(feature = "reqwest")]
impl PaymentClient<ReqwestHttpClient> {
	/// Creates a client backed by a default reqwest transport and random bill numbers.
	pub fn new(config: ClientConfig, access_tokens: impl 'static + AccessTokenProvider) -> Self {
		Self::with_http_client(
			config,
			access_tokens,
			RandomBillNo::default(),
			ReqwestHttpClient::default(),
		)
	}
}
impl<C> Clone for PaymentClient<C>
where
	C: ?Sized + GatewayHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: Arc::clone(&self.http_client),
			config: Arc::clone(&self.config),
			access_tokens: Arc::clone(&self.access_tokens),
			bill_numbers: Arc::clone(&self.bill_numbers),
		}
	}
}
impl<C> Debug for PaymentClient<C>
where
	C: ?Sized + GatewayHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PaymentClient").field("config", &self.config).finish()
	}
}
