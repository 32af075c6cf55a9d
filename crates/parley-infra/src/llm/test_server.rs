//! Local stand-in for the provider API, shared by the tier tests.

use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tokio::net::TcpListener;

/// Serve `body` with `status` on every path. Returns the base URL.
pub async fn serve_json(status: StatusCode, body: serde_json::Value) -> String {
    serve(Router::new().fallback(move || async move { (status, Json(body)) })).await
}

/// Serve a non-JSON body on every path.
pub async fn serve_text(status: StatusCode, body: &'static str) -> String {
    serve(Router::new().fallback(move || async move { (status, body) })).await
}

/// Never answer within `delay`.
pub async fn serve_slow(delay: Duration) -> String {
    serve(Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        StatusCode::OK.into_response()
    }))
    .await
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
