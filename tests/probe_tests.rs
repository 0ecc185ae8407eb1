//! The reqwest-backed connectivity probe against a local mock server.

use k3s_qa::kubectl::ReqwestProbe;
use k3s_qa::provider::{HttpProbe, ProviderError};
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn probe_returns_status_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let probe = ReqwestProbe::new();
    let code = probe.get(&server.uri(), "app.local").await.unwrap();
    assert_eq!(code, 404);
}

#[tokio::test]
async fn probe_sends_host_as_routing_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("host", "app.local"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let probe = ReqwestProbe::new();
    let code = probe.get(&server.uri(), "app.local").await.unwrap();
    assert_eq!(code, 200);
}

#[tokio::test]
async fn probe_reports_transport_failure() {
    let probe = ReqwestProbe::new();
    // Port 1 is essentially guaranteed unbound
    let err = probe.get("http://127.0.0.1:1", "app.local").await.unwrap_err();
    assert!(matches!(err, ProviderError::Fetch(_)));
}
