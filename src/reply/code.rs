// self
use crate::_prelude::*;

/// Result codes returned in the gateway's `errcode` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ErrCode {
	/// Request applied.
	Success,
	/// Gateway busy; the only code retried automatically.
	Busy,
	/// Access token invalid or expired.
	AccessTokenError,
	/// Session signature (`qq_sig`) mismatch.
	QqSigError,
	/// Caller not authorized for the offer.
	Unauthorized,
	/// Platform signature (`sig`) mismatch.
	SigError,
	/// Bill number already used.
	BillExists,
	/// Balance too low for the deduction.
	InsufficientBalance,
	/// Operation not permitted.
	PermissionDenied,
	/// Malformed or missing parameters.
	ParamsError,
	/// Code not known to this client.
	Other(i64),
}
impl ErrCode {
	/// Returns the numeric code sent by the gateway.
	pub const fn as_i64(self) -> i64 {
		match self {
			ErrCode::Success => 0,
			ErrCode::Busy => -1,
			ErrCode::AccessTokenError => -3000,
			ErrCode::QqSigError => 90009,
			ErrCode::Unauthorized => 90010,
			ErrCode::SigError => 90011,
			ErrCode::BillExists => 90012,
			ErrCode::InsufficientBalance => 90013,
			ErrCode::PermissionDenied => 90017,
			ErrCode::ParamsError => 90018,
			ErrCode::Other(code) => code,
		}
	}

	/// Groups the code into the client's error taxonomy.
	pub const fn category(self) -> ErrCategory {
		match self {
			ErrCode::Success => ErrCategory::Success,
			ErrCode::Busy => ErrCategory::Transient,
			ErrCode::AccessTokenError | ErrCode::Unauthorized => ErrCategory::Authentication,
			ErrCode::QqSigError | ErrCode::SigError => ErrCategory::Signature,
			ErrCode::BillExists | ErrCode::InsufficientBalance => ErrCategory::BusinessState,
			ErrCode::PermissionDenied | ErrCode::ParamsError => ErrCategory::Permission,
			ErrCode::Other(_) => ErrCategory::Unknown,
		}
	}

	/// Whether the code reports a successful call.
	pub const fn is_success(self) -> bool {
		matches!(self, ErrCode::Success)
	}

	/// Whether the dispatcher repeats the call after this code.
	pub const fn is_retryable(self) -> bool {
		matches!(self.category(), ErrCategory::Transient)
	}
}
impl From<i64> for ErrCode {
	fn from(code: i64) -> Self {
		match code {
			0 => ErrCode::Success,
			-1 => ErrCode::Busy,
			-3000 => ErrCode::AccessTokenError,
			90009 => ErrCode::QqSigError,
			90010 => ErrCode::Unauthorized,
			90011 => ErrCode::SigError,
			90012 => ErrCode::BillExists,
			90013 => ErrCode::InsufficientBalance,
			90017 => ErrCode::PermissionDenied,
			90018 => ErrCode::ParamsError,
			other => ErrCode::Other(other),
		}
	}
}
impl From<ErrCode> for i64 {
	fn from(code: ErrCode) -> Self {
		code.as_i64()
	}
}
impl Display for ErrCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}", self.as_i64())
	}
}

/// Coarse classification of [`ErrCode`] values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrCategory {
	/// Request applied.
	Success,
	/// Temporary condition; safe to retry.
	Transient,
	/// Access token or caller authorization problem.
	Authentication,
	/// One of the two signatures did not verify.
	Signature,
	/// Ledger state prevents the operation (duplicate bill, low balance).
	BusinessState,
	/// Permission or parameter problem.
	Permission,
	/// Unrecognized code.
	Unknown,
}
