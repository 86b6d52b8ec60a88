//! Integration tests for `RemoteClassifier` using wiremock HTTP mocks.

use fundnews_core::SentimentLabel;
use fundnews_sentiment::{RemoteClassifier, SentimentClassifier, SentimentError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_classifier(server: &MockServer) -> RemoteClassifier {
    RemoteClassifier::new(&format!("{}/models/finbert", server.uri()), "hf_test", 5)
        .expect("classifier construction should not fail")
}

#[tokio::test]
async fn classify_posts_inputs_and_parses_label() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/finbert"))
        .and(header("authorization", "Bearer hf_test"))
        .and(body_json(serde_json::json!({ "inputs": "Acme beats estimates" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[
            { "label": "positive", "score": 0.93 },
            { "label": "neutral", "score": 0.05 },
            { "label": "negative", "score": 0.02 }
        ]])))
        .expect(1)
        .mount(&server)
        .await;

    let label = test_classifier(&server)
        .classify("Acme beats estimates")
        .await
        .expect("classification should succeed");

    assert_eq!(label, Some(SentimentLabel::Positive));
}

#[tokio::test]
async fn unknown_label_yields_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([[{ "label": "LABEL_7", "score": 0.99 }]])),
        )
        .mount(&server)
        .await;

    let label = test_classifier(&server).classify("anything").await.unwrap();
    assert!(label.is_none());
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
        .mount(&server)
        .await;

    let err = test_classifier(&server).classify("anything").await.unwrap_err();
    assert!(
        matches!(err, SentimentError::Endpoint { status: 503, ref body } if body == "model loading")
    );
}
