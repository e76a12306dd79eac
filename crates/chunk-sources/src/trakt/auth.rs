use crate::error::SourceError;
use async_trait::async_trait;
use chunk_config::TraktConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Create the reqwest client shared by token and list requests.
///
/// Every request made through it is bounded by `timeout_secs`; expiry
/// surfaces as [`SourceError::Transport`].
pub fn create_trakt_client(config: &TraktConfig) -> Result<Client, SourceError> {
    Ok(Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?)
}

/// Body of a `grant_type=refresh_token` exchange.
///
/// Client fields the record lacks are sent as `null`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RefreshRequest {
    pub grant_type: &'static str,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: String,
    pub redirect_uri: Option<String>,
}

impl RefreshRequest {
    pub fn new(
        refresh_token: String,
        client_id: Option<String>,
        client_secret: Option<String>,
        redirect_uri: Option<String>,
    ) -> Self {
        Self {
            grant_type: "refresh_token",
            client_id,
            client_secret,
            refresh_token,
            redirect_uri,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Epoch seconds at which the server issued the token.
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Everything else the server sent (`token_type`, `scope`, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TokenResponse {
    /// The response with both tokens stripped, suitable for persisting as debug metadata.
    pub fn redacted(&self) -> serde_json::Value {
        let mut map = self.extra.clone();
        if let Some(expires_in) = self.expires_in {
            map.insert("expires_in".to_string(), expires_in.into());
        }
        if let Some(created_at) = self.created_at {
            map.insert("created_at".to_string(), created_at.into());
        }
        serde_json::Value::Object(map)
    }
}

/// OAuth token endpoint able to exchange a refresh token.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    async fn refresh(&self, request: &RefreshRequest) -> Result<TokenResponse, SourceError>;
}

pub struct HttpTokenEndpoint {
    client: Client,
    token_url: String,
}

impl HttpTokenEndpoint {
    pub fn new(client: Client, token_url: impl Into<String>) -> Self {
        Self {
            client,
            token_url: token_url.into(),
        }
    }
}

#[async_trait]
impl TokenEndpoint for HttpTokenEndpoint {
    async fn refresh(&self, request: &RefreshRequest) -> Result<TokenResponse, SourceError> {
        debug!(url = %self.token_url, "requesting token refresh");

        let response = self
            .client
            .post(&self.token_url)
            .json(request)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "token refresh rejected");
            return Err(SourceError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/oauth/token", addr)
    }

    fn client() -> Client {
        create_trakt_client(&TraktConfig::default()).unwrap()
    }

    fn request() -> RefreshRequest {
        RefreshRequest::new(
            "refresh-1".to_string(),
            Some("cid".to_string()),
            None,
            Some("urn:ietf:wg:oauth:2.0:oob".to_string()),
        )
    }

    #[test]
    fn test_refresh_request_body_shape() {
        let body = serde_json::to_value(request()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "grant_type": "refresh_token",
                "client_id": "cid",
                "client_secret": null,
                "refresh_token": "refresh-1",
                "redirect_uri": "urn:ietf:wg:oauth:2.0:oob"
            })
        );
    }

    #[test]
    fn test_redacted_response_drops_tokens() {
        let response: TokenResponse = serde_json::from_value(serde_json::json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 7200,
            "created_at": 1700000000,
            "token_type": "bearer",
            "scope": "public"
        }))
        .unwrap();
        let redacted = response.redacted();
        assert!(redacted.get("access_token").is_none());
        assert!(redacted.get("refresh_token").is_none());
        assert_eq!(redacted["expires_in"], 7200);
        assert_eq!(redacted["token_type"], "bearer");
    }

    #[tokio::test]
    async fn test_refresh_posts_json_and_parses_response() {
        let app = Router::new().route(
            "/oauth/token",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["grant_type"], "refresh_token");
                assert_eq!(body["refresh_token"], "refresh-1");
                Json(serde_json::json!({
                    "access_token": "new-access",
                    "refresh_token": "new-refresh",
                    "expires_in": 7776000,
                    "created_at": 1700000000
                }))
            }),
        );
        let url = spawn(app).await;

        let endpoint = HttpTokenEndpoint::new(client(), url);
        let response = endpoint.refresh(&request()).await.unwrap();
        assert_eq!(response.access_token, "new-access");
        assert_eq!(response.refresh_token.as_deref(), Some("new-refresh"));
        assert_eq!(response.expires_in, Some(7776000));
        assert_eq!(response.created_at, Some(1700000000));
    }

    #[tokio::test]
    async fn test_refresh_rejected_status() {
        let app = Router::new().route(
            "/oauth/token",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid_grant") }),
        );
        let url = spawn(app).await;

        let err = HttpTokenEndpoint::new(client(), url).refresh(&request()).await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_refresh_unreachable_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}/oauth/token", addr);
        let err = HttpTokenEndpoint::new(client(), url).refresh(&request()).await.unwrap_err();
        assert!(matches!(err, SourceError::Transport(_)));
    }
}
