use axum::{
    http::{HeaderName, HeaderValue},
    Router,
};
use std::net::SocketAddr;
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer};

fn router(root: &str) -> Router {
    let serve_dir = ServeDir::new(root).append_index_html_on_directories(true);

    // COOP/COEP so the wasm build can use SharedArrayBuffer-backed features.
    Router::new()
        .fallback_service(serve_dir)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("cross-origin-embedder-policy"),
            HeaderValue::from_static("require-corp"),
        ))
}

#[tokio::main]
async fn main() {
    let port: u16 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("Serving the orbview demo at http://localhost:{}", port);
    println!("Press Ctrl+C to stop");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, router(".")).await.unwrap();
}
