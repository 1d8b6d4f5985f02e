//! Request metadata capture and user-activity recording.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use estate_core::types::DbId;
use estate_db::models::analytics::CreateUserActivity;
use estate_db::repositories::UserActivityRepo;
use estate_db::DbPool;

use crate::middleware::admin_ip::request_client_ip;

const MAX_USER_AGENT_LENGTH: usize = 500;

/// Caller address, user agent and referrer, as recorded on page views,
/// shares, sessions and activity rows.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub referrer: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for ClientMeta {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let user_agent: String = header("user-agent")
            .unwrap_or_default()
            .chars()
            .take(MAX_USER_AGENT_LENGTH)
            .collect();

        Ok(ClientMeta {
            ip_address: request_client_ip(&parts.headers, &parts.extensions)
                .map(|ip| ip.to_string()),
            user_agent,
            referrer: header("referer"),
        })
    }
}

/// Record a user activity row. Failures are logged and swallowed: activity
/// tracking never fails the request it describes.
pub async fn record_activity(
    pool: &DbPool,
    user_id: DbId,
    activity_type: &str,
    description: impl Into<String>,
    meta: &ClientMeta,
    metadata: serde_json::Value,
) {
    let input = CreateUserActivity {
        user_id,
        activity_type: activity_type.to_string(),
        description: description.into(),
        ip_address: meta.ip_address.clone(),
        metadata,
    };
    if let Err(e) = UserActivityRepo::create(pool, &input).await {
        tracing::warn!(user_id, activity_type, error = %e, "Failed to record user activity");
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    #[tokio::test]
    async fn meta_reads_headers() {
        let req = Request::builder()
            .header("user-agent", "curl/8.0")
            .header("referer", "https://estate.example/")
            .header("x-forwarded-for", "198.51.100.4")
            .body(())
            .unwrap();
        let (mut parts, _) = req.into_parts();
        let meta = ClientMeta::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(meta.ip_address.as_deref(), Some("198.51.100.4"));
        assert_eq!(meta.user_agent, "curl/8.0");
        assert_eq!(meta.referrer.as_deref(), Some("https://estate.example/"));
    }

    #[tokio::test]
    async fn meta_defaults_when_headers_missing() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let meta = ClientMeta::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(meta.ip_address.is_none());
        assert!(meta.user_agent.is_empty());
    }
}
