//! Redacted wrapper for signing keys and access tokens.

// self
use crate::_prelude::*;

/// Secret string (application key, session key, access token) kept out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret(String);
impl Secret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Whether the wrapped value is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for Secret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<String> for Secret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<&str> for Secret {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Secret").field(&"<redacted>").finish()
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
