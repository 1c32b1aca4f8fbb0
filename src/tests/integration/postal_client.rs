//! PostalPincodeClient Integration Tests

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::core::postal::{PinCodeValidator, PostalPincodeClient};
use crate::tests::common::api_config;

fn client(server: &MockServer) -> PostalPincodeClient {
    PostalPincodeClient::new(&api_config(&server.uri())).unwrap()
}

#[tokio::test]
async fn test_known_pin_code_is_valid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pincode/110001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Status": "Success", "PostOffice": [{ "Name": "Connaught Place" }] }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client(&server).is_valid(" 110001 ").await);
}

#[tokio::test]
async fn test_unknown_pin_code_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pincode/999999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Status": "Error", "Message": "No records found", "PostOffice": null }
        ])))
        .mount(&server)
        .await;

    assert!(!client(&server).is_valid("999999").await);
}

#[tokio::test]
async fn test_lookup_failure_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pincode/110001"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(!client(&server).is_valid("110001").await);
}

#[tokio::test]
async fn test_garbage_body_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pincode/110001"))
        .respond_with(ResponseTemplate::new(200).set_body_string("maintenance"))
        .mount(&server)
        .await;

    assert!(!client(&server).is_valid("110001").await);
}

#[tokio::test]
async fn test_lookup_returns_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pincode/560001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "Status": "Success", "PostOffice": [] }
        ])))
        .mount(&server)
        .await;

    let entries = client(&server).lookup("560001").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, "Success");
}
