//! IP allow-list in front of the admin routes.
//!
//! The client address is the first `X-Forwarded-For` entry, falling back to
//! the socket peer recorded by `ConnectInfo`. With restriction disabled every
//! request passes; role checks still run in the handlers.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{Extensions, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use estate_core::access::{client_ip, AdminAccessConfig};
use serde_json::json;

pub const ADMIN_IP_DENIED_MESSAGE: &str =
    "Admin access is restricted to authorized IP addresses only.";

/// Resolve the caller's address from headers and connection info.
pub fn request_client_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok());
    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    client_ip(forwarded, peer)
}

pub async fn restrict_admin_ip(
    State(access): State<Arc<AdminAccessConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = request_client_ip(request.headers(), request.extensions());
    if access.is_allowed(ip) {
        return next.run(request).await;
    }

    tracing::warn!(
        client_ip = ?ip,
        path = %request.uri().path(),
        "Blocked admin request from unlisted address"
    );
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": ADMIN_IP_DENIED_MESSAGE, "code": "FORBIDDEN" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;

    fn app(restricted: bool) -> Router {
        let access = Arc::new(AdminAccessConfig::from_list(restricted, "10.0.0.0/8,::1"));
        Router::new()
            .route("/admin", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(access, restrict_admin_ip))
    }

    fn request(forwarded: Option<&str>, peer: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/admin");
        if let Some(f) = forwarded {
            builder = builder.header("x-forwarded-for", f);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        if let Some(p) = peer {
            let addr: SocketAddr = p.parse().unwrap();
            req.extensions_mut().insert(ConnectInfo(addr));
        }
        req
    }

    #[tokio::test]
    async fn listed_forwarded_address_passes() {
        let resp = app(true)
            .oneshot(request(Some("10.2.3.4, 203.0.113.1"), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn peer_address_used_without_header() {
        let resp = app(true)
            .oneshot(request(None, Some("[::1]:5000")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unlisted_address_is_forbidden() {
        let resp = app(true)
            .oneshot(request(Some("203.0.113.1"), Some("10.0.0.1:80")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_address_is_forbidden_when_restricted() {
        let resp = app(true).oneshot(request(None, None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unrestricted_lets_everyone_through() {
        let resp = app(false)
            .oneshot(request(Some("203.0.113.1"), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
