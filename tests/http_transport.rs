use std::time::Duration;

use content_understanding_client::{ContentUnderstandingClient, Credential, Error};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANALYZE_PATH: &str = "/contentunderstanding/analyzers/receipts:analyze";

// The blocking client owns its own runtime, so it is built, used and dropped
// on a blocking thread.
async fn run_blocking<F, R>(f: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn analyzes_url_end_to_end() {
    let server = MockServer::start().await;
    let operation_location = format!(
        "{}/contentunderstanding/analyzerResults/op-1?api-version=2025-05-01-preview",
        server.uri()
    );

    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .and(query_param("api-version", "2025-05-01-preview"))
        .and(query_param("stringEncoding", "utf16"))
        .and(header("ocp-apim-subscription-key", "secret"))
        .and(header("x-ms-useragent", "cu-sample-code"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"url": "https://example.com/receipt.png"})))
        .respond_with(
            ResponseTemplate::new(202).insert_header("operation-location", operation_location.as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/contentunderstanding/analyzerResults/op-1"))
        .and(header("ocp-apim-subscription-key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "Succeeded",
            "result": {"analyzerId": "receipts", "contents": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = format!("{}/", server.uri());
    let result = run_blocking(move || {
        let client = ContentUnderstandingClient::new(
            &endpoint,
            "2025-05-01-preview",
            Credential::subscription_key("secret"),
        )?;
        client.analyze(
            "receipts",
            "https://example.com/receipt.png",
            Duration::from_secs(10),
            Duration::from_millis(10),
        )
    })
    .await
    .unwrap();

    assert_eq!(result["status"], "Succeeded");
    assert_eq!(result["result"]["analyzerId"], "receipts");
}

#[tokio::test(flavor = "multi_thread")]
async fn uploads_local_file_with_bearer_token() {
    let server = MockServer::start().await;
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), b"%PDF-1.7 fake").unwrap();

    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .and(header("authorization", "Bearer aad"))
        .and(header("content-type", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(202).insert_header(
            "operation-location",
            format!("{}/contentunderstanding/analyzerResults/op-2", server.uri()).as_str(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = server.uri();
    let location = file.path().to_str().unwrap().to_owned();
    let submitted = run_blocking(move || {
        let client = ContentUnderstandingClient::new(
            &endpoint,
            "2025-05-01-preview",
            Credential::token(|| "aad".to_owned()),
        )?;
        client.submit("receipts", &location)
    })
    .await
    .unwrap();

    assert!(submitted.operation_location().unwrap().ends_with("/op-2"));
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body, b"%PDF-1.7 fake");
}

#[tokio::test(flavor = "multi_thread")]
async fn non_success_submit_is_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("analyzer not found"))
        .mount(&server)
        .await;

    let endpoint = server.uri();
    let err = run_blocking(move || {
        let client = ContentUnderstandingClient::new(
            &endpoint,
            "2025-05-01-preview",
            Credential::subscription_key("secret"),
        )?;
        client.submit("receipts", "https://example.com/receipt.png")
    })
    .await
    .unwrap_err();

    match err {
        Error::Http { status, body, .. } => {
            assert_eq!(status, 404);
            assert_eq!(body, "analyzer not found");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn unreachable_endpoint_is_transport_error() {
    let client = ContentUnderstandingClient::new(
        "http://127.0.0.1:1",
        "2025-05-01-preview",
        Credential::subscription_key("secret"),
    )
    .unwrap();

    let err = client
        .analyze(
            "receipts",
            "https://example.com/receipt.png",
            Duration::from_secs(5),
            Duration::from_millis(10),
        )
        .unwrap_err();

    match err {
        Error::Transport { endpoint_url, .. } => {
            assert!(endpoint_url.starts_with("http://127.0.0.1:1/contentunderstanding/analyzers/receipts:analyze"))
        }
        other => panic!("unexpected error {:?}", other),
    }
}
