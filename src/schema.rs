//! Per-operation signing tables.
//!
//! Each gateway endpoint verifies a fixed, sorted subset of the request fields. The tables
//! below are plain data so they can be inspected and tested without building a client; a
//! mismatch against the gateway contract surfaces as [`ErrCode::SigError`] or
//! [`ErrCode::QqSigError`] at runtime.
//!
//! [`ErrCode::SigError`]: crate::reply::ErrCode::SigError
//! [`ErrCode::QqSigError`]: crate::reply::ErrCode::QqSigError

// self
use crate::_prelude::*;

/// Business operations exposed by the payment gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
	/// Deducts virtual currency (`pay_m`).
	Pay,
	/// Queries the virtual currency balance (`get_balance_m`).
	GetBalance,
	/// Grants virtual currency (`present_m`).
	Present,
}
impl Operation {
	/// Every operation, in declaration order.
	pub const ALL: [Operation; 3] = [Operation::Pay, Operation::GetBalance, Operation::Present];

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Pay => "pay",
			Operation::GetBalance => "get_balance",
			Operation::Present => "present",
		}
	}

	/// Returns the static signing schema for the operation.
	pub const fn schema(self) -> &'static KeySchema {
		match self {
			Operation::Pay => &PAY_SCHEMA,
			Operation::GetBalance => &GET_BALANCE_SCHEMA,
			Operation::Present => &PRESENT_SCHEMA,
		}
	}

	/// Whether the operation carries a caller-visible bill number.
	pub const fn uses_bill_no(self) -> bool {
		matches!(self, Operation::Pay | Operation::Present)
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Signing contract of a single gateway endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeySchema {
	/// Gateway method appended to the endpoint base URL.
	pub gateway_method: &'static str,
	/// URI path embedded in both signing base strings.
	pub sign_path: &'static str,
	/// Field name under which the application id is sent and signed.
	pub app_id_field: &'static str,
	/// Sorted keys covered by the platform signature (`sig`).
	pub sig_keys: &'static [&'static str],
	/// Sorted keys covered by the session signature (`qq_sig`).
	pub session_keys: &'static [&'static str],
}

/// Schema for [`Operation::Pay`].
pub const PAY_SCHEMA: KeySchema = KeySchema {
	gateway_method: "MiniPay",
	sign_path: "/v3/r/mpay/pay_m",
	app_id_field: "appid",
	sig_keys: &[
		"amt",
		"app_remark",
		"appid",
		"bill_no",
		"offer_id",
		"openid",
		"openkey",
		"pay_item",
		"pf",
		"ts",
		"user_ip",
		"zone_id",
	],
	session_keys: &["access_token", "appid", "offer_id", "openid", "pf", "sig", "ts", "zone_id"],
};

/// Schema for [`Operation::GetBalance`].
pub const GET_BALANCE_SCHEMA: KeySchema = KeySchema {
	gateway_method: "MiniGetBalance",
	sign_path: "/v3/r/mpay/get_balance_m",
	app_id_field: "appid",
	sig_keys: &["appid", "offer_id", "openid", "openkey", "pf", "pfkey", "ts", "zone_id"],
	session_keys: &["access_token", "appid", "offer_id", "openid", "pf", "sig", "ts", "zone_id"],
};

/// Schema for [`Operation::Present`].
pub const PRESENT_SCHEMA: KeySchema = KeySchema {
	gateway_method: "MiniPresent",
	sign_path: "/v3/r/mpay/present_m",
	app_id_field: "qq_appid",
	sig_keys: &[
		"bill_no",
		"offer_id",
		"openid",
		"openkey",
		"pf",
		"pfkey",
		"present_counts",
		"qq_appid",
		"ts",
		"user_ip",
		"zone_id",
	],
	session_keys: &[
		"access_token",
		"offer_id",
		"openid",
		"pf",
		"qq_appid",
		"sig",
		"ts",
		"zone_id",
	],
};

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn is_sorted(keys: &[&str]) -> bool {
		keys.windows(2).all(|pair| pair[0] < pair[1])
	}

	#[test]
	fn key_lists_are_strictly_sorted() {
		for operation in Operation::ALL {
			let schema = operation.schema();

			assert!(is_sorted(schema.sig_keys), "{operation} sig keys must be sorted.");
			assert!(is_sorted(schema.session_keys), "{operation} session keys must be sorted.");
		}
	}

	#[test]
	fn session_keys_chain_the_platform_signature() {
		for operation in Operation::ALL {
			let schema = operation.schema();

			assert!(schema.session_keys.contains(&"sig"));
			assert!(schema.session_keys.contains(&"access_token"));
			assert!(schema.session_keys.contains(&schema.app_id_field));
			assert!(schema.sig_keys.contains(&schema.app_id_field));
		}
	}

	#[test]
	fn present_signs_qq_appid_instead_of_appid() {
		let schema = Operation::Present.schema();

		assert_eq!(schema.app_id_field, "qq_appid");
		assert!(!schema.sig_keys.contains(&"appid"));
		assert!(!schema.session_keys.contains(&"appid"));
	}

	#[test]
	fn bill_numbers_only_for_ledger_mutations() {
		assert!(Operation::Pay.uses_bill_no());
		assert!(Operation::Present.uses_bill_no());
		assert!(!Operation::GetBalance.uses_bill_no());
		assert!(!Operation::GetBalance.schema().sig_keys.contains(&"bill_no"));
	}
}
