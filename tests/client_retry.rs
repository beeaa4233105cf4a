// std
use std::sync::atomic::{AtomicU32, Ordering};
// self
use mini_pay::{
	_preludet::*,
	client::{ClientConfig, PaymentClient},
	error::{ConfigError, TransientError, TransportError},
	ext::SequenceBillNo,
	payload::{PayParams, PresentParams},
	reply::ErrCode,
};

const PAY_OK: &str =
	r#"{"errcode":0,"errmsg":"ok","balance":877,"used_gen_amt":0,"trade_id":"T-9"}"#;
const PRESENT_OK: &str = r#"{"errcode":0,"errmsg":"ok","balance":1123,"bill_no":"bill-1"}"#;
const BALANCE_OK: &str = r#"{"errcode":0,"errmsg":"ok","remainder":1000,"gen_balance":20}"#;

fn bill_numbers(gateway: &ScriptedGateway) -> Vec<JsonValue> {
	gateway.requests().into_iter().map(|request| request.body["bill_no"].clone()).collect()
}

#[tokio::test]
async fn busy_replies_are_retried_with_the_same_bill_number() {
	let gateway =
		ScriptedGateway::new([GatewayStep::busy(), GatewayStep::busy(), GatewayStep::ok(PAY_OK)]);
	let client = build_scripted_client(gateway.clone(), 3);
	let result = client
		.pay(&test_identity(), PayParams::new(123))
		.await
		.expect("Pay should succeed on the third attempt.");

	assert_eq!(gateway.calls(), 3);
	assert_eq!(bill_numbers(&gateway), vec![JsonValue::from("bill-1"); 3]);
	assert_eq!(result.err_code, ErrCode::Success);
	assert_eq!(result.bill_no, "bill-1");
	assert_eq!(result.balance, 877);
	assert_eq!(result.trade_id, "T-9");
}

#[tokio::test]
async fn every_attempt_is_signed_afresh() {
	let gateway = ScriptedGateway::new([GatewayStep::busy(), GatewayStep::ok(PRESENT_OK)]);
	let client = build_scripted_client(gateway.clone(), 3);

	client
		.present(&test_identity(), PresentParams::new(123))
		.await
		.expect("Present should succeed on the second attempt.");

	for request in gateway.requests() {
		assert!(request.body["ts"].is_i64());
		assert!(request.body["sig"].is_string());
		assert!(request.body["qq_sig"].is_string());
		assert_eq!(request.access_token.expose(), "ACCESSTOKEN");
		assert_eq!(request.url.as_str(), "https://api.q.qq.com/api/json/openApiPay/MiniPresent");
	}
}

#[tokio::test]
async fn retries_fetch_a_new_token_and_resign() {
	let gateway =
		ScriptedGateway::new([GatewayStep::busy(), GatewayStep::busy(), GatewayStep::ok(PAY_OK)]);
	let config = ClientConfig::builder(TEST_APP_ID, TEST_APP_KEY, TEST_OFFER_ID)
		.retry_backoff(Duration::ZERO, Duration::ZERO)
		.build()
		.expect("Configuration should be valid.");
	let issued = Arc::new(AtomicU32::new(0));
	let tokens = {
		let issued = issued.clone();

		move || {
			let n = issued.fetch_add(1, Ordering::SeqCst);

			async move { Ok::<_, std::io::Error>(format!("T{n}")) }
		}
	};
	let client: PaymentClient<ScriptedGateway> = PaymentClient::with_http_client(
		config,
		tokens,
		SequenceBillNo::new("bill"),
		gateway.clone(),
	);

	client
		.pay(&test_identity(), PayParams::new(123))
		.await
		.expect("Pay should succeed on the third attempt.");

	let requests = gateway.requests();
	let access_tokens =
		requests.iter().map(|request| request.access_token.expose().to_owned()).collect::<Vec<_>>();
	let qq_sigs = requests.iter().map(|request| request.body["qq_sig"].clone()).collect::<Vec<_>>();

	assert_eq!(issued.load(Ordering::SeqCst), 3);
	assert_eq!(access_tokens, ["T0", "T1", "T2"]);
	assert_ne!(qq_sigs[0], qq_sigs[1]);
	assert_ne!(qq_sigs[1], qq_sigs[2]);
	assert_ne!(qq_sigs[0], qq_sigs[2]);
	assert_eq!(bill_numbers(&gateway), vec![JsonValue::from("bill-1"); 3]);
}

#[tokio::test]
async fn non_retryable_codes_fail_after_one_attempt() {
	let gateway = ScriptedGateway::new([GatewayStep::ok(
		r#"{"errcode":90013,"errmsg":"balance not enough"}"#,
	)]);
	let client = build_scripted_client(gateway.clone(), 3);
	let err = client
		.pay(&test_identity(), PayParams::new(5_000))
		.await
		.expect_err("Insufficient balance must surface immediately.");

	assert_eq!(gateway.calls(), 1);
	assert_eq!(err.code(), Some(ErrCode::InsufficientBalance));
	assert!(matches!(err, Error::Gateway { ref message, .. } if message == "balance not enough"));
}

#[tokio::test]
async fn exhausted_retries_surface_the_last_failure() {
	let gateway = ScriptedGateway::new(std::iter::repeat_n(GatewayStep::busy(), 5));
	let client = build_scripted_client(gateway.clone(), 2);
	let err = client
		.get_balance(&test_identity())
		.await
		.expect_err("Busy replies beyond the limit must fail.");

	assert_eq!(gateway.calls(), 3);
	assert_eq!(err.code(), Some(ErrCode::Busy));
}

#[tokio::test]
async fn transport_and_status_failures_are_retried() {
	let gateway = ScriptedGateway::new([
		GatewayStep::Disconnect,
		GatewayStep::Reply { status: 502, body: "<html>bad gateway</html>" },
		GatewayStep::ok("not json"),
		GatewayStep::ok(BALANCE_OK),
	]);
	let client = build_scripted_client(gateway.clone(), 3);
	let result = client
		.get_balance(&test_identity())
		.await
		.expect("Balance should succeed after transient failures.");

	assert_eq!(gateway.calls(), 4);
	assert_eq!(result.remainder, 1000);
	assert_eq!(result.extra.get("genBalance"), Some(&JsonValue::from(20)));
}

#[tokio::test]
async fn last_transient_error_is_preserved() {
	let gateway = ScriptedGateway::new([
		GatewayStep::Disconnect,
		GatewayStep::Reply { status: 503, body: "unavailable" },
	]);
	let client = build_scripted_client(gateway.clone(), 1);
	let err = client.get_balance(&test_identity()).await.expect_err("Both attempts fail.");

	assert_eq!(gateway.calls(), 2);
	assert!(matches!(err, Error::Transient(TransientError::HttpStatus { status: 503, .. })));

	let gateway = ScriptedGateway::new([GatewayStep::Disconnect]);
	let client = build_scripted_client(gateway.clone(), 0);
	let err = client.get_balance(&test_identity()).await.expect_err("No retries allowed.");

	assert_eq!(gateway.calls(), 1);
	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
}

#[tokio::test]
async fn zero_amounts_never_reach_the_gateway() {
	let gateway = ScriptedGateway::new([GatewayStep::ok(PAY_OK)]);
	let client = build_scripted_client(gateway.clone(), 3);
	let err = client
		.pay(&test_identity(), PayParams::new(0))
		.await
		.expect_err("Zero deductions must be rejected.");

	assert!(matches!(err, Error::Config(ConfigError::ZeroAmount { field: "amt" })));

	let err = client
		.present(&test_identity(), PresentParams::new(0))
		.await
		.expect_err("Zero grants must be rejected.");

	assert!(matches!(err, Error::Config(ConfigError::ZeroAmount { field: "present_counts" })));
	assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn access_token_failures_are_not_retried() {
	let gateway = ScriptedGateway::new([GatewayStep::ok(BALANCE_OK)]);
	let config = ClientConfig::builder(TEST_APP_ID, TEST_APP_KEY, TEST_OFFER_ID)
		.retry_backoff(Duration::ZERO, Duration::ZERO)
		.build()
		.expect("Configuration should be valid.");
	let client: PaymentClient<ScriptedGateway> = PaymentClient::with_http_client(
		config,
		|| async { Err::<String, _>(std::io::Error::other("token service down")) },
		SequenceBillNo::new("bill"),
		gateway.clone(),
	);
	let err = client.get_balance(&test_identity()).await.expect_err("Token failure must surface.");

	assert!(matches!(err, Error::AccessToken { .. }));
	assert!(!err.is_retryable());
	assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn each_logical_call_gets_a_new_bill_number() {
	let gateway = ScriptedGateway::new([GatewayStep::ok(PAY_OK), GatewayStep::ok(PAY_OK)]);
	let client = build_scripted_client(gateway.clone(), 3);

	client.pay(&test_identity(), PayParams::new(1)).await.expect("First pay should succeed.");
	client.pay(&test_identity(), PayParams::new(1)).await.expect("Second pay should succeed.");

	assert_eq!(bill_numbers(&gateway), vec![JsonValue::from("bill-1"), JsonValue::from("bill-2")]);
}
