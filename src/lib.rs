//! Signed, retry-aware client for the QQ mini-program virtual currency payment gateway.
//!
//! Every call carries two HMAC-SHA1 signatures: the platform signature (`sig`) keyed by the
//! application secret and the session signature (`qq_sig`) keyed by the user's session key.
//! [`client::PaymentClient`] wires the signing, dispatch, retry, and reply-mapping layers
//! together behind `pay`, `get_balance`, and `present`.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod client;
pub mod dispatch;
pub mod error;
pub mod ext;
pub mod http;
pub mod obs;
pub mod payload;
pub mod reply;
pub mod schema;
pub mod secret;
pub mod sign;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{collections::VecDeque, sync::Mutex};
	// self
	use crate::{
		client::{ClientConfig, PaymentClient, ReqwestPaymentClient},
		ext::{SequenceBillNo, StaticAccessToken},
		http::{
			GatewayHttpClient, GatewayRequest, GatewayResponse, HttpFuture, ReqwestHttpClient,
		},
	};

	/// Application identifier shared by the published signature vectors.
	pub const TEST_APP_ID: &str = "1234567890";
	/// Application secret shared by the published signature vectors.
	pub const TEST_APP_KEY: &str = "zNLgAGgqsEWJOg1nFVaO5r7fAlIQxr1u";
	/// Offer identifier shared by the published signature vectors.
	pub const TEST_OFFER_ID: &str = "1111111111";
	/// Open id shared by the published signature vectors.
	pub const TEST_OPEN_ID: &str = "383124F311F19D1DA9BA0CC51028CC88";
	/// Session key shared by the published signature vectors.
	pub const TEST_SESSION_KEY: &str = "NVdzZndGOVgybGlKRk1kAA==";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`PaymentClient`] that talks to `endpoint` with a fixed access token,
	/// sequential bill numbers (`bill-1`, `bill-2`, ...), and no retry backoff.
	pub fn build_reqwest_test_client(endpoint: &str) -> ReqwestPaymentClient {
		let endpoint = Url::parse(endpoint).expect("Mock gateway endpoint should parse.");
		let config = ClientConfig::builder(TEST_APP_ID, TEST_APP_KEY, TEST_OFFER_ID)
			.endpoint(endpoint)
			.retry_backoff(Duration::ZERO, Duration::ZERO)
			.build()
			.expect("Test client configuration should be valid.");

		PaymentClient::with_http_client(
			config,
			|| async { Ok::<_, std::io::Error>("ACCESSTOKEN".to_owned()) },
			SequenceBillNo::new("bill"),
			test_reqwest_http_client(),
		)
	}

	/// One scripted transport outcome replayed by [`ScriptedGateway`].
	#[derive(Clone, Debug)]
	pub enum GatewayStep {
		/// Answer with `status` and `body`.
		Reply {
			/// HTTP status code.
			status: u16,
			/// Response body.
			body: &'static str,
		},
		/// Fail at the transport layer.
		Disconnect,
	}
	impl GatewayStep {
		/// `200 OK` carrying `body`.
		pub fn ok(body: &'static str) -> Self {
			Self::Reply { status: 200, body }
		}

		/// `200 OK` carrying the gateway's busy code.
		pub fn busy() -> Self {
			Self::ok(r#"{"errcode":-1,"errmsg":"system busy"}"#)
		}
	}

	/// In-memory transport that replays [`GatewayStep`]s and records every request.
	#[derive(Debug, Default)]
	pub struct ScriptedGateway {
		steps: Mutex<VecDeque<GatewayStep>>,
		requests: Mutex<Vec<GatewayRequest>>,
	}
	impl ScriptedGateway {
		/// Creates a shared gateway replaying `steps` in order.
		pub fn new(steps: impl IntoIterator<Item = GatewayStep>) -> Arc<Self> {
			Arc::new(Self {
				steps: Mutex::new(steps.into_iter().collect()),
				requests: Mutex::new(Vec::new()),
			})
		}

		/// Requests received so far.
		pub fn requests(&self) -> Vec<GatewayRequest> {
			self.requests.lock().expect("Request log lock should not be poisoned.").clone()
		}

		/// Number of requests received so far.
		pub fn calls(&self) -> usize {
			self.requests.lock().expect("Request log lock should not be poisoned.").len()
		}
	}
	impl GatewayHttpClient for ScriptedGateway {
		type TransportError = std::io::Error;

		fn post_json(&self, request: GatewayRequest) -> HttpFuture<'_, Self::TransportError> {
			self.requests.lock().expect("Request log lock should not be poisoned.").push(request);

			let step =
				self.steps.lock().expect("Step script lock should not be poisoned.").pop_front();

			Box::pin(async move {
				match step {
					Some(GatewayStep::Reply { status, body }) =>
						Ok(GatewayResponse { status, body: body.as_bytes().to_vec() }),
					Some(GatewayStep::Disconnect) =>
						Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
					None => Err(std::io::Error::other("Gateway script exhausted.")),
				}
			})
		}
	}

	/// Constructs a [`PaymentClient`] over `gateway` with `retry_limit` zero-delay retries,
	/// a static `ACCESSTOKEN`, and sequential bill numbers.
	pub fn build_scripted_client(
		gateway: Arc<ScriptedGateway>,
		retry_limit: u32,
	) -> PaymentClient<ScriptedGateway> {
		let config = ClientConfig::builder(TEST_APP_ID, TEST_APP_KEY, TEST_OFFER_ID)
			.retry_limit(retry_limit)
			.retry_backoff(Duration::ZERO, Duration::ZERO)
			.build()
			.expect("Scripted client configuration should be valid.");

		PaymentClient::with_http_client(
			config,
			StaticAccessToken::new("ACCESSTOKEN"),
			SequenceBillNo::new("bill"),
			gateway,
		)
	}

	/// Identity shared by the published signature vectors.
	pub fn test_identity() -> crate::payload::Identity {
		crate::payload::Identity::new(TEST_OPEN_ID, TEST_SESSION_KEY)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
