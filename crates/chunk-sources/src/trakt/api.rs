use crate::error::SourceError;
use async_trait::async_trait;
use chunk_config::TraktConfig;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

/// Source of raw list items.
///
/// Items are returned untyped so structural problems in single entries can be
/// handled per item by the caller instead of failing the whole response.
#[async_trait]
pub trait ListProvider: Send + Sync {
    async fn fetch_list_items(
        &self,
        list_id: &str,
        access_token: &str,
        api_key: Option<&str>,
    ) -> Result<Vec<Value>, SourceError>;
}

pub struct TraktListClient {
    client: Client,
    api_base: String,
    api_version: String,
}

impl TraktListClient {
    pub fn new(client: Client, config: &TraktConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
        }
    }

    fn list_url(&self, list_id: &str) -> String {
        format!("{}/lists/{}/items", self.api_base, urlencoding::encode(list_id))
    }
}

#[async_trait]
impl ListProvider for TraktListClient {
    async fn fetch_list_items(
        &self,
        list_id: &str,
        access_token: &str,
        api_key: Option<&str>,
    ) -> Result<Vec<Value>, SourceError> {
        let url = self.list_url(list_id);
        debug!(%url, "fetching list items");

        let mut request = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", access_token))
            .header("trakt-api-version", &self.api_version)
            .header("Accept", "application/json");
        if let Some(api_key) = api_key {
            request = request.header("trakt-api-key", api_key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, list_id, "list fetch failed");
            return Err(SourceError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        let json: Value = serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode(e.to_string()))?;
        match json {
            Value::Array(items) => Ok(items),
            other => Err(SourceError::Decode(format!(
                "expected a JSON array of list items, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
