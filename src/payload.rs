//! Request field assembly for a single gateway attempt.
//!
//! [`PayloadAssembler`] merges the identity fields every endpoint expects with the
//! operation-specific fields produced by [`PayParams`] and [`PresentParams`]. Optional
//! parameters without a value are never inserted, so they sign as empty strings and stay
//! out of the JSON body.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	schema::{KeySchema, Operation},
	secret::Secret,
};

/// Zone used when the caller does not partition users.
pub const DEFAULT_ZONE_ID: &str = "1";
/// Platform key literal accepted by the gateway for mini-program calls.
pub const DEFAULT_PLATFORM_KEY: &str = "pfKey";

const PLATFORM_PREFIX: &str = "qqapp_qq-2001-android-2011-";

/// Ordered request fields keyed by gateway field name.
pub type Fields = BTreeMap<String, FieldValue>;

/// Gateway field value; the gateway accepts strings and integers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
	/// Integer field such as `ts` or `amt`.
	Number(i64),
	/// String field.
	Text(String),
}
impl Display for FieldValue {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Number(value) => write!(f, "{value}"),
			Self::Text(value) => f.write_str(value),
		}
	}
}
impl From<FieldValue> for JsonValue {
	fn from(value: FieldValue) -> Self {
		match value {
			FieldValue::Number(value) => JsonValue::from(value),
			FieldValue::Text(value) => JsonValue::String(value),
		}
	}
}
impl From<i64> for FieldValue {
	fn from(value: i64) -> Self {
		Self::Number(value)
	}
}
impl From<u32> for FieldValue {
	fn from(value: u32) -> Self {
		Self::Number(i64::from(value))
	}
}
impl From<String> for FieldValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}
impl From<&str> for FieldValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_owned())
	}
}

/// End user on whose behalf a single call is made; never stored by the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
	/// Platform-issued user identifier.
	pub open_id: String,
	/// Login session key; keys the session signature.
	pub session_key: Secret,
	/// Server partition; [`DEFAULT_ZONE_ID`] when absent.
	pub zone_id: Option<String>,
}
impl Identity {
	/// Creates an identity in the default zone.
	pub fn new(open_id: impl Into<String>, session_key: impl Into<Secret>) -> Self {
		Self { open_id: open_id.into(), session_key: session_key.into(), zone_id: None }
	}

	/// Places the user in a specific zone.
	pub fn with_zone_id(mut self, zone_id: impl Into<String>) -> Self {
		self.zone_id = Some(zone_id.into());

		self
	}

	/// Zone id sent to the gateway.
	pub fn zone_id(&self) -> &str {
		self.zone_id.as_deref().filter(|zone| !zone.is_empty()).unwrap_or(DEFAULT_ZONE_ID)
	}
}

/// Parameters of a currency deduction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PayParams {
	/// Amount to deduct; must be non-zero.
	pub amt: u32,
	/// End user's public IP.
	pub user_ip: Option<String>,
	/// Item label written to the ledger.
	pub pay_item: Option<String>,
	/// Free-form remark written to the ledger (up to 256 bytes).
	pub app_remark: Option<String>,
}
impl PayParams {
	/// Creates deduction parameters for `amt` units.
	pub fn new(amt: u32) -> Self {
		Self { amt, ..Default::default() }
	}

	/// Sets the end user's IP.
	pub fn with_user_ip(mut self, user_ip: impl Into<String>) -> Self {
		self.user_ip = Some(user_ip.into());

		self
	}

	/// Sets the item label.
	pub fn with_pay_item(mut self, pay_item: impl Into<String>) -> Self {
		self.pay_item = Some(pay_item.into());

		self
	}

	/// Sets the ledger remark.
	pub fn with_app_remark(mut self, app_remark: impl Into<String>) -> Self {
		self.app_remark = Some(app_remark.into());

		self
	}

	/// Rejects a zero amount.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.amt == 0 {
			Err(ConfigError::ZeroAmount { field: "amt" })
		} else {
			Ok(())
		}
	}

	/// Builds the operation fields for the provided bill number.
	pub fn fields(&self, bill_no: &str) -> Result<Fields, ConfigError> {
		self.validate()?;

		let mut fields = Fields::new();

		fields.insert("bill_no".into(), bill_no.into());
		fields.insert("amt".into(), self.amt.into());
		insert_optional(&mut fields, "user_ip", self.user_ip.as_deref());
		insert_optional(&mut fields, "pay_item", self.pay_item.as_deref());
		insert_optional(&mut fields, "app_remark", self.app_remark.as_deref());

		Ok(fields)
	}
}

/// Parameters of a currency grant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PresentParams {
	/// Amount to grant; must be non-zero.
	pub present_counts: u32,
	/// End user's public IP.
	pub user_ip: Option<String>,
}
impl PresentParams {
	/// Creates grant parameters for `present_counts` units.
	pub fn new(present_counts: u32) -> Self {
		Self { present_counts, user_ip: None }
	}

	/// Sets the end user's IP.
	pub fn with_user_ip(mut self, user_ip: impl Into<String>) -> Self {
		self.user_ip = Some(user_ip.into());

		self
	}

	/// Rejects a zero grant.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.present_counts == 0 {
			Err(ConfigError::ZeroAmount { field: "present_counts" })
		} else {
			Ok(())
		}
	}

	/// Builds the operation fields for the provided bill number.
	pub fn fields(&self, bill_no: &str) -> Result<Fields, ConfigError> {
		self.validate()?;

		let mut fields = Fields::new();

		fields.insert("bill_no".into(), bill_no.into());
		fields.insert("present_counts".into(), self.present_counts.into());
		insert_optional(&mut fields, "user_ip", self.user_ip.as_deref());

		Ok(fields)
	}
}

/// Builds the signed field set for one attempt; performs no I/O.
#[derive(Clone, Copy, Debug)]
pub struct PayloadAssembler<'a> {
	/// Mini-program application id.
	pub app_id: &'a str,
	/// Billing offer id.
	pub offer_id: &'a str,
	/// Platform key literal (`pfkey`).
	pub platform_key: &'a str,
	/// Routes the request to the sandbox ledger.
	pub sandbox: bool,
}
impl PayloadAssembler<'_> {
	/// Returns the identity fields shared by every endpoint, stamped with `ts`.
	pub fn common_fields(&self, schema: &KeySchema, identity: &Identity, ts: i64) -> Fields {
		let mut fields = Fields::new();

		fields.insert("openid".into(), identity.open_id.as_str().into());
		fields.insert("openkey".into(), identity.session_key.expose().into());
		fields.insert(schema.app_id_field.into(), self.app_id.into());
		fields.insert("offer_id".into(), self.offer_id.into());
		fields.insert("ts".into(), ts.into());
		fields.insert("zone_id".into(), identity.zone_id().into());
		fields.insert("pf".into(), platform_string(self.app_id).into());
		fields.insert("pfkey".into(), self.platform_key.into());

		fields
	}

	/// Merges the common fields with `operation_fields`; operation fields win on collision.
	pub fn assemble(
		&self,
		operation: Operation,
		identity: &Identity,
		ts: i64,
		operation_fields: &Fields,
	) -> Fields {
		let mut fields = self.common_fields(operation.schema(), identity, ts);

		fields.extend(operation_fields.iter().map(|(key, value)| (key.clone(), value.clone())));

		fields
	}

	/// `sandbox_env` flag sent in the body (never signed).
	pub fn sandbox_env(&self) -> FieldValue {
		FieldValue::Number(i64::from(self.sandbox))
	}
}

/// Platform identifier string embedding the application id.
pub fn platform_string(app_id: &str) -> String {
	format!("{PLATFORM_PREFIX}{app_id}")
}

fn insert_optional(fields: &mut Fields, key: &str, value: Option<&str>) {
	if let Some(value) = value {
		fields.insert(key.into(), value.into());
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn assembler(sandbox: bool) -> PayloadAssembler<'static> {
		PayloadAssembler {
			app_id: "1234567890",
			offer_id: "1111111111",
			platform_key: DEFAULT_PLATFORM_KEY,
			sandbox,
		}
	}

	fn identity() -> Identity {
		Identity::new("383124F311F19D1DA9BA0CC51028CC88", "NVdzZndGOVgybGlKRk1kAA==")
	}

	#[test]
	fn common_fields_follow_the_gateway_layout() {
		let fields = assembler(false).common_fields(
			Operation::GetBalance.schema(),
			&identity(),
			1501234567,
		);

		assert_eq!(fields["openid"], FieldValue::from("383124F311F19D1DA9BA0CC51028CC88"));
		assert_eq!(fields["openkey"], FieldValue::from("NVdzZndGOVgybGlKRk1kAA=="));
		assert_eq!(fields["appid"], FieldValue::from("1234567890"));
		assert_eq!(fields["ts"], FieldValue::Number(1501234567));
		assert_eq!(fields["zone_id"], FieldValue::from("1"));
		assert_eq!(fields["pf"], FieldValue::from("qqapp_qq-2001-android-2011-1234567890"));
		assert_eq!(fields["pfkey"], FieldValue::from("pfKey"));
		assert!(!fields.contains_key("sandbox_env"));
	}

	#[test]
	fn present_uses_qq_appid() {
		let fields =
			assembler(false).common_fields(Operation::Present.schema(), &identity(), 1);

		assert_eq!(fields["qq_appid"], FieldValue::from("1234567890"));
		assert!(!fields.contains_key("appid"));
	}

	#[test]
	fn explicit_zone_overrides_default() {
		let identity = identity().with_zone_id("7");

		assert_eq!(identity.zone_id(), "7");
		assert_eq!(Identity::new("o", "k").with_zone_id("").zone_id(), DEFAULT_ZONE_ID);
	}

	#[test]
	fn absent_optional_parameters_are_not_inserted() {
		let fields = PayParams::new(123)
			.with_pay_item("abc")
			.fields("BillNo_123")
			.expect("Non-zero amounts should be accepted.");

		assert_eq!(fields["amt"], FieldValue::Number(123));
		assert_eq!(fields["bill_no"], FieldValue::from("BillNo_123"));
		assert_eq!(fields["pay_item"], FieldValue::from("abc"));
		assert!(!fields.contains_key("user_ip"));
		assert!(!fields.contains_key("app_remark"));
	}

	#[test]
	fn zero_amounts_are_rejected() {
		assert!(matches!(
			PayParams::new(0).fields("b"),
			Err(ConfigError::ZeroAmount { field: "amt" })
		));
		assert!(matches!(
			PresentParams::new(0).fields("b"),
			Err(ConfigError::ZeroAmount { field: "present_counts" })
		));
	}

	#[test]
	fn sandbox_flag_is_numeric() {
		assert_eq!(assembler(true).sandbox_env(), FieldValue::Number(1));
		assert_eq!(assembler(false).sandbox_env(), FieldValue::Number(0));
	}

	#[test]
	fn field_values_serialize_untagged() {
		let mut fields = Fields::new();

		fields.insert("amt".into(), FieldValue::Number(5));
		fields.insert("bill_no".into(), "b-1".into());

		assert_eq!(
			serde_json::to_string(&fields).expect("Fields should serialize."),
			"{\"amt\":5,\"bill_no\":\"b-1\"}"
		);
	}
}
