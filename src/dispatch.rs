//! Signed request construction and the bounded retry loop.
//!
//! One logical call runs [`RequestDispatcher::dispatch`], which repeats
//! [`RequestDispatcher::attempt`] while the failure is retryable and the
//! [`RetryPolicy`] allows it. Every attempt fetches a fresh access token, re-stamps `ts`,
//! and recomputes `sig` then `qq_sig`; the operation fields (and therefore the bill number)
//! are reused unchanged so the gateway can reject a replayed deduction.

mod retry;

pub use retry::*;

// self
use crate::{
	_prelude::*,
	client::ClientConfig,
	error::{TransientError, TransportError},
	ext::AccessTokenProvider,
	http::{GatewayHttpClient, GatewayRequest, GatewayResponse},
	obs::{self, OperationOutcome},
	payload::{Fields, Identity},
	reply::GatewayReply,
	schema::Operation,
	secret::Secret,
	sign,
};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Borrowed view over the collaborators needed to send signed requests.
pub struct RequestDispatcher<'a, C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Transport used for every attempt.
	pub http_client: &'a C,
	/// Source of the `access_token` query parameter.
	pub access_tokens: &'a dyn AccessTokenProvider,
	/// Immutable client configuration.
	pub config: &'a ClientConfig,
}
impl<'a, C> RequestDispatcher<'a, C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Creates a dispatcher over borrowed collaborators.
	pub fn new(
		http_client: &'a C,
		access_tokens: &'a dyn AccessTokenProvider,
		config: &'a ClientConfig,
	) -> Self {
		Self { http_client, access_tokens, config }
	}

	/// Sends the call, retrying transient failures; surfaces the last failure once the
	/// policy is exhausted.
	pub async fn dispatch(
		&self,
		operation: Operation,
		identity: &Identity,
		operation_fields: &Fields,
	) -> Result<GatewayReply> {
		let policy = self.config.retry;
		let mut attempt = 0_u32;

		loop {
			attempt += 1;

			let err = match self.attempt(operation, identity, operation_fields).await {
				Ok(reply) => return Ok(reply),
				Err(err) => err,
			};

			if !err.is_retryable() || !policy.allows_retry(attempt) {
				obs::trace_failure(attempt, &err);

				return Err(err);
			}

			obs::trace_retry(attempt, policy.limit, &err);
			obs::record_operation_outcome(operation, OperationOutcome::Retry);
			retry::sleep(policy.delay(attempt)).await;
		}
	}

	/// Runs exactly one attempt: token fetch, signing, delivery, and classification.
	pub async fn attempt(
		&self,
		operation: Operation,
		identity: &Identity,
		operation_fields: &Fields,
	) -> Result<GatewayReply> {
		let access_token =
			self.access_tokens.access_token().await.map_err(Error::access_token)?;
		let ts = OffsetDateTime::now_utc().unix_timestamp();
		let request = self.sign_request(operation, identity, operation_fields, access_token, ts)?;
		let response =
			self.http_client.post_json(request).await.map_err(TransportError::network)?;

		classify(response)
	}

	/// Assembles and signs the request for one attempt stamped with `ts`.
	pub fn sign_request(
		&self,
		operation: Operation,
		identity: &Identity,
		operation_fields: &Fields,
		access_token: Secret,
		ts: i64,
	) -> Result<GatewayRequest> {
		let schema = operation.schema();
		let assembler = self.config.assembler();
		let mut fields = assembler.assemble(operation, identity, ts, operation_fields);
		let sig = sign::platform_signature(
			schema.sign_path,
			self.config.app_key.expose(),
			self.config.signing_mode,
			schema.sig_keys,
			&fields,
		);

		fields.insert("sig".into(), sig.into());

		let qq_sig = {
			let mut session_fields = fields.clone();

			session_fields.insert("access_token".into(), access_token.expose().into());

			sign::session_signature(
				schema.sign_path,
				identity.session_key.expose(),
				schema.session_keys,
				&session_fields,
			)
		};

		fields.insert("qq_sig".into(), qq_sig.into());
		fields.insert("sandbox_env".into(), assembler.sandbox_env());

		let body = fields.into_iter().map(|(key, value)| (key, JsonValue::from(value))).collect();

		Ok(GatewayRequest { url: self.config.operation_url(operation)?, access_token, body })
	}
}
impl<C> Debug for RequestDispatcher<'_, C>
where
	C: ?Sized + GatewayHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestDispatcher").field("config", self.config).finish()
	}
}

/// Classifies a raw HTTP reply into a success reply or a typed failure.
pub fn classify(response: GatewayResponse) -> Result<GatewayReply> {
	if !response.is_success() {
		return Err(TransientError::HttpStatus {
			status: response.status,
			body_preview: body_preview(&response.body),
		}
		.into());
	}

	let reply = GatewayReply::parse(response.status, &response.body)?;

	if reply.errcode.is_success() {
		Ok(reply)
	} else {
		Err(Error::Gateway { code: reply.errcode, message: reply.errmsg })
	}
}

fn body_preview(body: &[u8]) -> String {
	let end = body.len().min(BODY_PREVIEW_LIMIT);

	String::from_utf8_lossy(&body[..end]).into_owned()
}
