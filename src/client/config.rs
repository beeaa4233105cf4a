//! Immutable client configuration and its validating builder.

// self
use crate::{
	_prelude::*,
	dispatch::RetryPolicy,
	error::ConfigError,
	payload::{DEFAULT_PLATFORM_KEY, PayloadAssembler},
	schema::Operation,
	secret::Secret,
	sign::SigningMode,
};

/// Production gateway base URL; operations append their gateway method.
pub const DEFAULT_ENDPOINT: &str = "https://api.q.qq.com/api/json/openApiPay";

/// Settings shared by every call of a [`PaymentClient`](crate::client::PaymentClient).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Mini-program application id.
	pub app_id: String,
	/// Application secret keying the platform signature.
	pub app_key: Secret,
	/// Billing offer id assigned by the payment platform.
	pub offer_id: String,
	/// Routes calls to the sandbox ledger.
	pub sandbox: bool,
	/// Retry behavior for transient failures.
	pub retry: RetryPolicy,
	/// Platform-signature key derivation.
	pub signing_mode: SigningMode,
	/// Gateway base URL.
	pub endpoint: Url,
	/// Value sent as `pfkey`.
	pub platform_key: String,
}
impl ClientConfig {
	/// Creates a builder seeded with the mandatory identifiers.
	pub fn builder(
		app_id: impl Into<String>,
		app_key: impl Into<Secret>,
		offer_id: impl Into<String>,
	) -> ClientConfigBuilder {
		ClientConfigBuilder::new(app_id, app_key, offer_id)
	}

	/// Returns the payload assembler bound to this configuration.
	pub fn assembler(&self) -> PayloadAssembler<'_> {
		PayloadAssembler {
			app_id: &self.app_id,
			offer_id: &self.offer_id,
			platform_key: &self.platform_key,
			sandbox: self.sandbox,
		}
	}

	/// Builds `{endpoint}/{gateway_method}` for `operation`.
	pub fn operation_url(&self, operation: Operation) -> Result<Url, ConfigError> {
		let mut url = self.endpoint.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::InvalidEndpoint { url: self.endpoint.to_string() })?
			.pop_if_empty()
			.push(operation.schema().gateway_method);

		Ok(url)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.app_id.is_empty() {
			return Err(ConfigError::EmptyField { field: "app_id" });
		}
		if self.app_key.is_empty() {
			return Err(ConfigError::EmptyField { field: "app_key" });
		}
		if self.offer_id.is_empty() {
			return Err(ConfigError::EmptyField { field: "offer_id" });
		}
		if self.endpoint.cannot_be_a_base() {
			return Err(ConfigError::InvalidEndpoint { url: self.endpoint.to_string() });
		}

		Ok(())
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	app_id: String,
	app_key: Secret,
	offer_id: String,
	sandbox: bool,
	retry: RetryPolicy,
	signing_mode: SigningMode,
	endpoint: Option<Url>,
	platform_key: String,
}
impl ClientConfigBuilder {
	/// Creates a new builder with default sandbox, retry, signing, and endpoint settings.
	pub fn new(
		app_id: impl Into<String>,
		app_key: impl Into<Secret>,
		offer_id: impl Into<String>,
	) -> Self {
		Self {
			app_id: app_id.into(),
			app_key: app_key.into(),
			offer_id: offer_id.into(),
			sandbox: false,
			retry: RetryPolicy::default(),
			signing_mode: SigningMode::default(),
			endpoint: None,
			platform_key: DEFAULT_PLATFORM_KEY.into(),
		}
	}

	/// Routes calls to the sandbox ledger.
	pub fn sandbox(mut self, sandbox: bool) -> Self {
		self.sandbox = sandbox;

		self
	}

	/// Overrides the number of additional attempts after a transient failure.
	pub fn retry_limit(mut self, limit: u32) -> Self {
		self.retry = self.retry.with_limit(limit);

		self
	}

	/// Overrides the backoff between attempts.
	pub fn retry_backoff(mut self, backoff: Duration, max_jitter: Duration) -> Self {
		self.retry = self.retry.with_backoff(backoff, max_jitter);

		self
	}

	/// Replaces the whole retry policy.
	pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
		self.retry = policy;

		self
	}

	/// Selects the platform-signature key derivation.
	pub fn signing_mode(mut self, mode: SigningMode) -> Self {
		self.signing_mode = mode;

		self
	}

	/// Overrides the gateway base URL.
	pub fn endpoint(mut self, url: Url) -> Self {
		self.endpoint = Some(url);

		self
	}

	/// Overrides the `pfkey` literal.
	pub fn platform_key(mut self, platform_key: impl Into<String>) -> Self {
		self.platform_key = platform_key.into();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let endpoint = match self.endpoint {
			Some(url) => url,
			None => Url::parse(DEFAULT_ENDPOINT)
				.map_err(|_| ConfigError::InvalidEndpoint { url: DEFAULT_ENDPOINT.into() })?,
		};
		let config = ClientConfig {
			app_id: self.app_id,
			app_key: self.app_key,
			offer_id: self.offer_id,
			sandbox: self.sandbox,
			retry: self.retry,
			signing_mode: self.signing_mode,
			endpoint,
			platform_key: self.platform_key,
		};

		config.validate()?;

		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config() -> ClientConfig {
		ClientConfig::builder("1234567890", "zNLgAGgqsEWJOg1n", "1111111111")
			.build()
			.expect("Fixture configuration should be valid.")
	}

	#[test]
	fn defaults_match_the_production_gateway() {
		let config = config();

		assert!(!config.sandbox);
		assert_eq!(config.retry.limit, 3);
		assert_eq!(config.signing_mode, SigningMode::AmpersandSuffixed);
		assert_eq!(config.platform_key, "pfKey");
		assert_eq!(
			config.operation_url(Operation::Pay).expect("Pay URL should build.").as_str(),
			"https://api.q.qq.com/api/json/openApiPay/MiniPay"
		);
		assert_eq!(
			config.operation_url(Operation::Present).expect("Present URL should build.").as_str(),
			"https://api.q.qq.com/api/json/openApiPay/MiniPresent"
		);
	}

	#[test]
	fn trailing_slash_endpoints_do_not_double_up() {
		let config = ClientConfig::builder("a", "k", "o")
			.endpoint(Url::parse("http://127.0.0.1:8080/").expect("Mock URL should parse."))
			.build()
			.expect("Mock configuration should be valid.");

		assert_eq!(
			config
				.operation_url(Operation::GetBalance)
				.expect("Balance URL should build.")
				.as_str(),
			"http://127.0.0.1:8080/MiniGetBalance"
		);
	}

	#[test]
	fn builder_rejects_empty_identifiers() {
		for (app_id, app_key, offer_id, field) in [
			("", "k", "o", "app_id"),
			("a", "", "o", "app_key"),
			("a", "k", "", "offer_id"),
		] {
			let err = ClientConfig::builder(app_id, app_key, offer_id)
				.build()
				.expect_err("Empty identifiers must be rejected.");

			assert!(matches!(err, ConfigError::EmptyField { field: f } if f == field));
		}
	}

	#[test]
	fn builder_rejects_non_base_endpoints() {
		let err = ClientConfig::builder("a", "k", "o")
			.endpoint(Url::parse("mailto:pay@example.com").expect("Mailto URL should parse."))
			.build()
			.expect_err("Non-base URLs must be rejected.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
	}

	#[test]
	fn debug_output_redacts_the_app_key() {
		assert!(!format!("{:?}", config()).contains("zNLgAGgqsEWJOg1n"));
	}
}
