//! Client-level error types shared across signing, dispatch, and reply mapping.

// self
use crate::{_prelude::*, reply::ErrCode};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used for collaborator and transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or argument problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure; retried by the dispatcher.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS); retried by the dispatcher.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Gateway answered with a non-success `errcode`.
	#[error("Gateway rejected the request with code {code}: {message}.")]
	Gateway {
		/// Numeric gateway code.
		code: ErrCode,
		/// Gateway-supplied `errmsg`.
		message: String,
	},
	/// Successful reply did not carry the fields the operation promises.
	#[error("Gateway reply for {operation} has an unexpected shape.")]
	UnexpectedReply {
		/// Operation label.
		operation: &'static str,
		/// Structured mapping failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Access-token provider failed before the request could be signed.
	#[error("Access token provider failed.")]
	AccessToken {
		/// Provider-specific failure.
		#[source]
		source: BoxError,
	},
	/// Bill-number generator failed before the request could be assembled.
	#[error("Bill number generator failed.")]
	BillNo {
		/// Generator-specific failure.
		#[source]
		source: BoxError,
	},
}
impl Error {
	/// Wraps an access-token provider failure.
	pub fn access_token(src: impl Into<BoxError>) -> Self {
		Self::AccessToken { source: src.into() }
	}

	/// Wraps a bill-number generator failure.
	pub fn bill_no(src: impl Into<BoxError>) -> Self {
		Self::BillNo { source: src.into() }
	}

	/// Returns the gateway code carried by [`Error::Gateway`].
	pub fn code(&self) -> Option<ErrCode> {
		match self {
			Self::Gateway { code, .. } => Some(*code),
			_ => None,
		}
	}

	/// Whether the dispatcher repeats the whole flow after this failure.
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::Transient(_) | Self::Transport(_) => true,
			Self::Gateway { code, .. } => code.is_retryable(),
			_ => false,
		}
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A mandatory identifier was empty.
	#[error("The {field} value cannot be empty.")]
	EmptyField {
		/// Name of the offending field.
		field: &'static str,
	},
	/// Gateway endpoint cannot carry a path.
	#[error("Gateway endpoint cannot be used as a base URL: {url}.")]
	InvalidEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Amount-like parameter must be non-zero.
	#[error("The {field} value must be non-zero.")]
	ZeroAmount {
		/// Name of the offending parameter.
		field: &'static str,
	},
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Gateway answered with a non-success HTTP status.
	#[error("Gateway returned HTTP status {status}.")]
	HttpStatus {
		/// HTTP status code.
		status: u16,
		/// Leading bytes of the body, for diagnostics.
		body_preview: String,
	},
	/// Gateway responded with malformed JSON that could not be parsed.
	#[error("Gateway returned malformed JSON.")]
	ReplyParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code.
		status: u16,
	},
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the payment gateway.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn only_busy_gateway_codes_are_retryable() {
		let busy = Error::Gateway { code: ErrCode::Busy, message: "system busy".into() };
		let bill = Error::Gateway { code: ErrCode::BillExists, message: "bill exists".into() };
		let io = Error::from(TransportError::network(std::io::Error::other("reset")));

		assert!(busy.is_retryable());
		assert!(!bill.is_retryable());
		assert!(io.is_retryable());
		assert!(!Error::access_token(std::io::Error::other("down")).is_retryable());
		assert_eq!(bill.code(), Some(ErrCode::BillExists));
		assert_eq!(io.code(), None);
	}

	#[test]
	fn gateway_error_renders_code_and_message() {
		let err = Error::Gateway { code: ErrCode::SigError, message: "sig error".into() };

		assert_eq!(err.to_string(), "Gateway rejected the request with code 90011: sig error.");
	}
}
