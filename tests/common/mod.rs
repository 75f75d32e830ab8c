//! Shared utilities for integration testing.

use std::net::SocketAddr;

use soap_service::config::ServerConfig;
use soap_service::demo::Login;
use soap_service::lifecycle::Shutdown;
use soap_service::{register_operations, HttpServer};
use tokio::net::TcpListener;

pub const ENVELOPE_OPEN: &str = r#"<?xml version="1.0" encoding="utf-8"?><soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#;
pub const ENVELOPE_CLOSE: &str = "</soap:Envelope>";

/// A running endpoint serving the sample `Login` service.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the endpoint on an ephemeral port.
pub async fn start_server(mut config: ServerConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let dispatcher = register_operations::<Login>(config.dispatch.clone()).unwrap();
    let server = HttpServer::new(config, dispatcher);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer { addr, shutdown }
}

/// Wrap body content (and an optional header) in a SOAP 1.1 envelope.
pub fn envelope(header: Option<&str>, body: &str) -> String {
    let header = header
        .map(|h| format!("<soap:Header>{h}</soap:Header>"))
        .unwrap_or_default();
    format!("{ENVELOPE_OPEN}{header}<soap:Body>{body}</soap:Body>{ENVELOPE_CLOSE}")
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// POST an envelope with the given SOAPAction.
pub fn soap_request(server: &TestServer, action: &str, body: String) -> reqwest::RequestBuilder {
    client()
        .post(server.url())
        .header("Content-Type", "text/xml; charset=utf-8")
        .header("SOAPAction", action)
        .body(body)
}
