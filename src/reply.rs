//! Gateway reply parsing and the snake_case → camelCase mapping.
//!
//! The gateway answers with `{ "errcode": .., "errmsg": .., ...extra }`. [`GatewayReply`]
//! keeps the extra fields as an open JSON object so new gateway fields flow through
//! [`camelize_keys`] without code changes, and the typed results ([`PayResult`],
//! [`BalanceResult`], [`PresentResult`]) deserialize from the camelCased object.

mod code;

pub use code::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::TransientError};

/// Raw reply as received from the gateway.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GatewayReply {
	/// Result code.
	pub errcode: ErrCode,
	/// Human-readable result message.
	#[serde(default)]
	pub errmsg: String,
	/// Every other field, keyed by the gateway's snake_case names.
	#[serde(flatten)]
	pub extra: JsonMap<String, JsonValue>,
}
impl GatewayReply {
	/// Parses a reply body, reporting the JSON path of any mismatch.
	pub fn parse(status: u16, body: &[u8]) -> Result<Self, TransientError> {
		let mut de = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| TransientError::ReplyParse { source, status })
	}

	/// Converts the reply into the caller-facing camelCase object.
	pub fn into_camel_case(self) -> JsonMap<String, JsonValue> {
		let mut map = JsonMap::with_capacity(self.extra.len() + 2);

		map.insert("errCode".into(), JsonValue::from(self.errcode.as_i64()));
		map.insert("errMsg".into(), JsonValue::String(self.errmsg));
		map.extend(camelize_keys(self.extra));

		map
	}

	/// Converts the reply into a typed result via its camelCase form.
	pub fn into_typed<T>(self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		serde_path_to_error::deserialize(JsonValue::Object(self.into_camel_case()))
	}
}

/// Renames every key of `map` from snake_case to lowerCamelCase; values are untouched.
///
/// `errcode` and `errmsg` are single words in the gateway's vocabulary and map to `errCode`
/// and `errMsg` explicitly.
pub fn camelize_keys(map: JsonMap<String, JsonValue>) -> JsonMap<String, JsonValue> {
	map.into_iter().map(|(key, value)| (camelize_key(&key), value)).collect()
}

fn camelize_key(key: &str) -> String {
	match key {
		"errcode" => "errCode".into(),
		"errmsg" => "errMsg".into(),
		_ => snake_to_lower_camel(key),
	}
}

fn snake_to_lower_camel(key: &str) -> String {
	let mut buf = String::with_capacity(key.len());
	let mut upper_next = false;

	for c in key.chars() {
		if c == '_' {
			// Leading underscores are dropped; a run collapses into one boundary.
			upper_next = !buf.is_empty();
		} else if upper_next {
			buf.extend(c.to_uppercase());

			upper_next = false;
		} else {
			buf.push(c);
		}
	}

	buf
}

/// Outcome of [`PaymentClient::pay`](crate::client::PaymentClient::pay).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayResult {
	/// Result code (always [`ErrCode::Success`] on the `Ok` path).
	pub err_code: ErrCode,
	/// Result message.
	pub err_msg: String,
	/// Bill number used for the deduction.
	#[serde(default)]
	pub bill_no: String,
	/// Balance after the deduction; zero when the gateway omits it.
	///
	/// A success reply means the ledger already changed, so a missing balance must not turn
	/// it into an error.
	#[serde(default)]
	pub balance: i64,
	/// Portion of the amount paid from granted currency.
	#[serde(default)]
	pub used_gen_amt: i64,
	/// Gateway trade identifier.
	#[serde(default)]
	pub trade_id: String,
	/// Fields not modeled above, camelCased.
	#[serde(flatten)]
	pub extra: JsonMap<String, JsonValue>,
}

/// Outcome of [`PaymentClient::get_balance`](crate::client::PaymentClient::get_balance).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResult {
	/// Result code.
	pub err_code: ErrCode,
	/// Result message.
	pub err_msg: String,
	/// Current balance.
	pub remainder: i64,
	/// Fields not modeled above, camelCased.
	#[serde(flatten)]
	pub extra: JsonMap<String, JsonValue>,
}

/// Outcome of [`PaymentClient::present`](crate::client::PaymentClient::present).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentResult {
	/// Result code.
	pub err_code: ErrCode,
	/// Result message.
	pub err_msg: String,
	/// Bill number used for the grant.
	#[serde(default)]
	pub bill_no: String,
	/// Balance after the grant; zero when the gateway omits it.
	#[serde(default)]
	pub balance: i64,
	/// Fields not modeled above, camelCased.
	#[serde(flatten)]
	pub extra: JsonMap<String, JsonValue>,
}
