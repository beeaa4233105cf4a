//! Transport primitives for gateway calls.
//!
//! The module exposes [`GatewayHttpClient`], the client's only dependency on an HTTP stack,
//! together with the [`GatewayRequest`]/[`GatewayResponse`] pair it exchanges. The default
//! [`ReqwestHttpClient`] is enabled by the `reqwest` feature; tests and custom stacks
//! implement the trait directly.

// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{CONTENT_TYPE, HeaderValue};
// self
use crate::{_prelude::*, secret::Secret};

/// Boxed future returned by [`GatewayHttpClient::post_json`].
pub type HttpFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<GatewayResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of delivering signed gateway requests.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by
/// every clone of a [`PaymentClient`](crate::client::PaymentClient), and the returned future
/// must be `Send` so calls can hop executors. Non-2xx statuses are returned as responses,
/// not errors; the dispatcher classifies them.
pub trait GatewayHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// POSTs `request.body` as JSON to [`GatewayRequest::url_with_token`].
	fn post_json(&self, request: GatewayRequest) -> HttpFuture<'_, Self::TransportError>;
}

/// Fully signed request for one attempt.
#[derive(Clone, Debug)]
pub struct GatewayRequest {
	/// Operation URL without the access token.
	pub url: Url,
	/// Access token sent as the `access_token` query parameter.
	pub access_token: Secret,
	/// JSON body: common fields, operation fields, `sig`, `qq_sig`, and `sandbox_env`.
	pub body: JsonMap<String, JsonValue>,
}
impl GatewayRequest {
	/// Returns the operation URL with `access_token` appended to the query.
	pub fn url_with_token(&self) -> Url {
		let mut url = self.url.clone();

		url.query_pairs_mut().append_pair("access_token", self.access_token.expose());

		url
	}

	/// Serializes the body.
	pub fn body_json(&self) -> String {
		JsonValue::Object(self.body.clone()).to_string()
	}
}

/// Raw HTTP reply handed back to the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl GatewayResponse {
	/// Creates a `200 OK` response carrying `body`.
	pub fn ok(body: impl Into<Vec<u8>>) -> Self {
		Self { status: 200, body: body.into() }
	}

	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl std::ops::Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl GatewayHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn post_json(&self, request: GatewayRequest) -> HttpFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client
				.post(request.url_with_token())
				.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
				.body(request.body_json())
				.send()
				.await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(GatewayResponse { status, body })
		})
	}
}
