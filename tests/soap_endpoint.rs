//! End-to-end tests against a live endpoint serving the sample service.

use reqwest::StatusCode;
use soap_service::config::{ServerConfig, UnknownActionPolicy};

mod common;

use common::{envelope, soap_request, start_server};

const PUT_DATA: &str = r#"<putDataBySqh xmlns="http://tempuri.org/"><sqh>A-1</sqh><data>payload</data></putDataBySqh>"#;

#[tokio::test]
async fn test_put_data_by_sqh_round_trip() {
    let server = start_server(ServerConfig::default()).await;

    let res = soap_request(
        &server,
        "\"http://tempuri.org/putDataBySqh\"",
        envelope(None, PUT_DATA),
    )
    .send()
    .await
    .expect("endpoint unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()["content-type"],
        "text/xml; charset=utf-8"
    );
    assert!(res.headers().contains_key("x-request-id"));

    let body = res.text().await.unwrap();
    assert!(body.contains("<soap:Envelope"));
    assert!(body.contains(
        r#"<putDataBySqhResponse xmlns="http://tempuri.org/"><putDataBySqhResult>123</putDataBySqhResult></putDataBySqhResponse>"#
    ));
    assert!(!body.contains("soap:Fault"));
}

#[tokio::test]
async fn test_operation_fault_answers_ok() {
    let server = start_server(ServerConfig::default()).await;

    let res = soap_request(
        &server,
        "PutDataBySqh",
        envelope(None, "<putDataBySqh><sqh></sqh></putDataBySqh>"),
    )
    .send()
    .await
    .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.text().await.unwrap();
    assert!(body.contains("<faultcode>soap:Client</faultcode>"));
    assert!(body.contains("sqh must not be empty"));
}

#[tokio::test]
async fn test_unknown_action_faults_by_default() {
    let server = start_server(ServerConfig::default()).await;

    let res = soap_request(&server, "http://tempuri.org/Missing", envelope(None, PUT_DATA))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.text().await.unwrap();
    assert!(body.contains("<faultcode>soap:Client</faultcode>"));
    assert!(body.contains("Missing"));
}

#[tokio::test]
async fn test_unknown_action_dropped_when_configured() {
    let mut config = ServerConfig::default();
    config.dispatch.unknown_action = UnknownActionPolicy::Drop;
    let server = start_server(config).await;

    let res = soap_request(&server, "Missing", envelope(None, PUT_DATA))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_credentials_and_header_bound_per_request() {
    let server = start_server(ServerConfig::default()).await;

    let res = soap_request(
        &server,
        "whoAmI",
        envelope(Some("<token>t-9</token>"), "<whoAmI/>"),
    )
    .basic_auth("alice", Some("s3cret"))
    .send()
    .await
    .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.text().await.unwrap();
    assert!(body.contains("<user>alice</user>"));
    assert!(body.contains("<session>t-9</session>"));

    // A second call without credentials sees a fresh instance
    let res = soap_request(&server, "WhoAmI", envelope(None, "<whoAmI/>"))
        .send()
        .await
        .unwrap();
    let body = res.text().await.unwrap();
    assert!(body.contains("<user></user>") || body.contains("<user/>"));
    assert!(!body.contains("t-9"));
}

#[tokio::test]
async fn test_panicking_operation_is_server_fault() {
    let server = start_server(ServerConfig::default()).await;

    let res = soap_request(&server, "Explode", envelope(None, ""))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = res.text().await.unwrap();
    assert!(body.contains("<faultcode>soap:Server</faultcode>"));
    assert!(!body.contains("explode operation invoked"));

    // The endpoint keeps serving afterwards
    let res = soap_request(&server, "putDataBySqh", envelope(None, PUT_DATA))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_multiple_body_elements_rejected() {
    let server = start_server(ServerConfig::default()).await;

    let res = soap_request(
        &server,
        "putDataBySqh",
        envelope(None, &format!("{PUT_DATA}{PUT_DATA}")),
    )
    .send()
    .await
    .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res
        .text()
        .await
        .unwrap()
        .contains("<faultcode>soap:Client</faultcode>"));
}

#[tokio::test]
async fn test_request_id_echoed() {
    let server = start_server(ServerConfig::default()).await;

    let res = soap_request(&server, "putDataBySqh", envelope(None, PUT_DATA))
        .header("x-request-id", "trace-42")
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-request-id"], "trace-42");
}
