//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;

use axum::{body::Body, http::Request, response::Response, Router};
use forward_proxy::config::ProxyConfig;
use forward_proxy::http::HttpServer;
use forward_proxy::lifecycle::Shutdown;
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};

/// Start a backend that answers every request with a JSON description of it.
pub async fn start_echo_backend() -> SocketAddr {
    start_backend(Router::new().fallback(echo)).await
}

/// Start a backend serving the given router on an ephemeral port.
pub async fn start_backend(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a backend that hands its first connection to `serve` as a raw socket.
///
/// For upstream behaviour an HTTP framework will not produce, such as custom
/// reason phrases or never answering.
pub async fn start_raw_backend<F, Fut>(serve: F) -> SocketAddr
where
    F: FnOnce(TcpStream) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            serve(stream).await;
        }
    });
    addr
}

/// Read from `stream` up to the blank line ending an HTTP head.
pub async fn read_head(stream: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await.unwrap();
        assert!(n > 0, "connection closed mid-head");
        head.extend_from_slice(&buf[..n]);
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// Start the proxy on an ephemeral port. Trigger the returned handle to stop it.
pub async fn start_proxy(mut config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let signalled = shutdown.signalled();
    tokio::spawn(async move {
        let _ = server.run(listener, signalled).await;
    });

    (addr, shutdown)
}

/// Proxy configuration pointing at `target`.
pub fn proxy_config(target: Option<String>, remove_headers: &[&str]) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.target_domain = target;
    config.upstream.remove_headers = remove_headers.iter().map(|h| h.to_string()).collect();
    config
}

/// Client that never follows redirects and never reuses connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

async fn echo(request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let headers: Vec<Value> = parts
        .headers
        .iter()
        .map(|(k, v)| json!([k.as_str(), v.to_str().unwrap_or_default()]))
        .collect();

    let description = json!({
        "method": parts.method.as_str(),
        "path": parts.uri.path(),
        "query": parts.uri.query(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    });

    Response::builder()
        .header("content-type", "application/json")
        .body(Body::from(description.to_string()))
        .unwrap()
}

/// Values of header `name` as seen by the echo backend, in order.
pub fn echoed_header(description: &Value, name: &str) -> Vec<String> {
    description["headers"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|pair| pair[0] == name)
        .map(|pair| pair[1].as_str().unwrap().to_string())
        .collect()
}
