//! Integration tests using wiremock to simulate the gateway.

mod common;

use amwal::{AmwalClient, Environment, Error, ErrorKind, PaymentRequest, RateLimiter, RefundRequest};
use common::{init_tracing, RecordingSleeper};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STORE_ID: &str = "8ff41fae-709a-46da-9b27-a5d2b1059e67";
const TRANSACTION_ID: &str = "0f0a7c6a-ca74-4fae-8d9c-290b722b6750";

fn client_for(mock_server: &MockServer) -> AmwalClient {
    AmwalClient::builder("secret-key", "public-key")
        .environment(Environment::Test)
        .api_url(mock_server.uri())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_create_payment_end_to_end() {
    init_tracing();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/payment_links/{}/create", STORE_ID)))
        .and(header("authorization", "secret-key"))
        .and(header("x-amwal-key", "public-key"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .and(header("origin", "https://shop.example"))
        .and(body_json(json!({"amount": 100, "description": "Order #42"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://pay.example/x",
            "payment_link_id": "abc",
            "environment": "production"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request = PaymentRequest::new(100).with_description("Order #42");

    let link = client
        .create_payment(&request, STORE_ID, Some("https://shop.example"))
        .await
        .unwrap();

    assert_eq!(link.environment.as_deref(), Some("production"));
    assert_eq!(link.payment_url, "https://pay.example/x");
    assert_eq!(link.payment_link_id.as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_payment_details_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/payment_links/{}/details", TRANSACTION_ID)))
        .and(header("authorization", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": TRANSACTION_ID,
            "status": "paid"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let details = client.get_payment_details(TRANSACTION_ID).await.unwrap();

    assert_eq!(details["status"], "paid");

    let received = mock_server.received_requests().await.unwrap();
    assert!(received[0].body.is_empty());
}

#[tokio::test]
async fn test_transaction_details_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/transactions/{}", TRANSACTION_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"amount": "10.00"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let details = client
        .get_transaction_details(TRANSACTION_ID)
        .await
        .unwrap();

    assert_eq!(details["amount"], "10.00");
}

#[tokio::test]
async fn test_refund_post() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/transactions/refund/{}/", TRANSACTION_ID)))
        .and(body_json(json!({
            "transaction_id": TRANSACTION_ID,
            "refund_amount": 10
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"refund_id": "r-1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let body = client
        .refund_payment(&RefundRequest::new(TRANSACTION_ID, 10))
        .await
        .unwrap();

    assert_eq!(body["refund_id"], "r-1");
}

#[tokio::test]
async fn test_validate_merchant_post() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/validate-merchant-api-key/"))
        .and(body_json(json!({
            "api_key": "secret-key",
            "merchant_id": "public-key"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": true})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    assert_eq!(client.validate_merchant().await.unwrap()["valid"], true);
    assert!(client.test_connection().await);
}

#[tokio::test]
async fn test_http_error_4xx() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/payment_links/{}/details", TRANSACTION_ID)))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Payment link not found"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.get_payment_details(TRANSACTION_ID).await;

    match result {
        Err(Error::Api {
            message,
            status,
            context,
        }) => {
            assert_eq!(status.map(|s| s.as_u16()), Some(404));
            assert_eq!(message, "Payment link not found");
            assert_eq!(context["response"]["message"], "Payment link not found");
            assert_eq!(context["environment"], "test");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .get_transaction_details(TRANSACTION_ID)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "API Error (500): boom");
}

#[tokio::test]
async fn test_deserialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .get_transaction_details(TRANSACTION_ID)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unknown);
    assert!(err.context()["json_error"].as_str().unwrap().contains("expected"));
}

#[tokio::test]
async fn test_timeout_is_retried_then_fails() {
    init_tracing();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"late": true}))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let client = AmwalClient::builder("secret-key", "public-key")
        .environment(Environment::Test)
        .api_url(mock_server.uri())
        .timeout(Duration::from_millis(50))
        .max_retries(1)
        .sleeper(sleeper.clone())
        .build()
        .unwrap();

    let err = client
        .get_transaction_details(TRANSACTION_ID)
        .await
        .unwrap_err();

    match err {
        Error::Network {
            source, attempts, ..
        } => {
            assert!(matches!(source, amwal::TransportError::Timeout(_)));
            assert_eq!(attempts, 2);
        }
        other => panic!("Expected Network error, got {:?}", other),
    }
    assert_eq!(sleeper.delays(), vec![Duration::from_millis(100)]);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    init_tracing();
    let sleeper = Arc::new(RecordingSleeper::default());
    let client = AmwalClient::builder("secret-key", "public-key")
        .environment(Environment::Local)
        .api_url("http://127.0.0.1:1")
        .max_retries(2)
        .sleeper(sleeper.clone())
        .build()
        .unwrap();

    let err = client
        .get_transaction_details(TRANSACTION_ID)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.context()["environment"], "local");
    assert_eq!(
        err.context()["url"],
        format!("http://127.0.0.1:1/transactions/{}", TRANSACTION_ID)
    );
    assert_eq!(sleeper.delays().len(), 2);
}

#[tokio::test]
async fn test_live_environment_rate_limits_real_calls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AmwalClient::builder("secret-key", "public-key")
        .environment(Environment::Production)
        .api_url(mock_server.uri())
        .rate_limiter(Arc::new(RateLimiter::default()))
        .build()
        .unwrap();

    client.get_payment_details(TRANSACTION_ID).await.unwrap();
    let err = client.get_payment_details(TRANSACTION_ID).await.unwrap_err();

    assert!(err.is_rate_limited());
}

#[tokio::test]
async fn test_log_file_receives_events() {
    init_tracing();
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let log_file = dir.path().join("logs").join("amwalpay.log");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"url": "https://pay/x"})))
        .mount(&mock_server)
        .await;

    let client = AmwalClient::builder("secret-key", "public-key")
        .environment(Environment::Test)
        .api_url(mock_server.uri())
        .log_file(&log_file)
        .build()
        .unwrap();

    client
        .create_payment(&PaymentRequest::new(5), STORE_ID, None)
        .await
        .unwrap();

    let contents = std::fs::read_to_string(&log_file).unwrap();
    assert!(contents.contains("INFO: Creating payment"));
    assert!(contents.contains("DEBUG: HTTP Request"));
    assert!(contents.contains("INFO: Payment created successfully"));
    assert!(contents.contains(r#""environment":"test""#));
    assert!(!contents.contains("secret-key"));
}
