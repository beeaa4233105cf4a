//! HMAC-SHA1 signatures required by every gateway request.
//!
//! Both signatures share one base-string layout:
//!
//! ```text
//! METHOD&pct(path)&pct(k1=v1&k2=v2&...)
//! ```
//!
//! Keys come from the operation's [`KeySchema`](crate::schema::KeySchema) in table order,
//! values are written raw, and a key without a value contributes `key=`. The platform
//! signature uses `GET` while the session signature uses `POST`, regardless of the HTTP
//! verb used to deliver the request.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha1::Sha1;
// self
use crate::{_prelude::*, payload::Fields};

type HmacSha1 = Hmac<Sha1>;

const PLATFORM_METHOD: &str = "GET";
const SESSION_METHOD: &str = "POST";

/// How the application secret becomes the platform HMAC key.
///
/// Historical clients disagree on this detail. The published test vectors verify with
/// [`SigningMode::AmpersandSuffixed`]; confirm against the live gateway before switching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningMode {
	/// Key is `app_key + "&"`.
	#[default]
	AmpersandSuffixed,
	/// Key is the raw `app_key`.
	RawSecret,
}
impl SigningMode {
	fn key(self, app_key: &str) -> String {
		match self {
			SigningMode::AmpersandSuffixed => format!("{app_key}&"),
			SigningMode::RawSecret => app_key.to_owned(),
		}
	}
}

/// Computes the platform signature (`sig`) keyed by the application secret.
pub fn platform_signature(
	path: &str,
	app_key: &str,
	mode: SigningMode,
	keys: &[&str],
	fields: &Fields,
) -> String {
	let base = base_string(PLATFORM_METHOD, path, keys, fields);

	hmac_base64(mode.key(app_key).as_bytes(), base.as_bytes())
}

/// Computes the session signature (`qq_sig`) keyed by `session_key + "&"`.
///
/// `fields` must already carry `access_token` and the platform `sig`.
pub fn session_signature(path: &str, session_key: &str, keys: &[&str], fields: &Fields) -> String {
	let base = base_string(SESSION_METHOD, path, keys, fields);

	hmac_base64(format!("{session_key}&").as_bytes(), base.as_bytes())
}

/// Joins `keys` as `key=value` pairs in the given order, substituting empty values.
pub fn canonical_query(keys: &[&str], fields: &Fields) -> String {
	let mut buf = String::new();

	for (idx, key) in keys.iter().enumerate() {
		if idx > 0 {
			buf.push('&');
		}

		buf.push_str(key);
		buf.push('=');

		if let Some(value) = fields.get(*key) {
			buf.push_str(&value.to_string());
		}
	}

	buf
}

/// Builds the signing base string for `method`.
pub fn base_string(method: &str, path: &str, keys: &[&str], fields: &Fields) -> String {
	let query = canonical_query(keys, fields);

	// RFC 3986: only `A-Z a-z 0-9 - . _ ~` stay literal.
	format!("{method}&{}&{}", urlencoding::encode(path), urlencoding::encode(&query))
}

fn hmac_base64(key: &[u8], message: &[u8]) -> String {
	let mut mac = HmacSha1::new_from_slice(key).expect("HMAC can take any key size");

	mac.update(message);

	STANDARD.encode(mac.finalize().into_bytes())
}
