use crate::clock::{Clock, SystemClock};
use crate::error::ChunkError;
use crate::normalize::{normalize_items, NormalizeObserver, TracingObserver};
use crate::token_manager::TokenManager;
use crate::window::{parse_anchor, select_window};
use chrono::{DateTime, Utc};
use chunk_config::{JsonFileCredentialStore, PathManager, ServiceConfig, WindowPolicy};
use chunk_models::{MediaType, NormalizedItem, SortDirection};
use chunk_sources::{create_trakt_client, HttpTokenEndpoint, ListProvider, TraktListClient};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

const MISSING_PARAMS: &str =
    "Missing required query params. Required: start (YYYY-MM-DD), step (interval days), chunk (limit), type (movie/show)";
const INVALID_STEP_CHUNK: &str = "step and chunk must be positive integers (step=days, chunk=limit)";

/// A validated `GET /list/{list_id}` request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub list_id: String,
    pub start: DateTime<Utc>,
    pub step_days: i64,
    pub chunk: usize,
    pub media_type: MediaType,
    pub dir: Option<SortDirection>,
}

impl ListQuery {
    /// Validate raw query parameters. Empty values count as missing.
    pub fn from_params(list_id: &str, params: &HashMap<String, String>) -> Result<Self, ChunkError> {
        let get = |key: &str| params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let (Some(start), Some(step), Some(chunk), Some(media_type)) =
            (get("start"), get("step"), get("chunk"), get("type"))
        else {
            return Err(ChunkError::InvalidParameter(MISSING_PARAMS.to_string()));
        };

        let step_days = step
            .parse::<i64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ChunkError::InvalidParameter(INVALID_STEP_CHUNK.to_string()))?;
        let chunk = chunk
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ChunkError::InvalidParameter(INVALID_STEP_CHUNK.to_string()))?;

        let media_type = media_type.parse::<MediaType>().map_err(ChunkError::InvalidParameter)?;
        let dir = get("dir")
            .map(|d| d.parse::<SortDirection>())
            .transpose()
            .map_err(ChunkError::InvalidParameter)?;
        let start = parse_anchor(start)?;

        Ok(Self {
            list_id: list_id.to_string(),
            start,
            step_days,
            chunk,
            media_type,
            dir,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceOptions {
    pub policy: WindowPolicy,
    /// Sort (descending) even when the request has no `dir`.
    pub sort_by_listed_at: bool,
    pub send_api_key: bool,
}

impl ServiceOptions {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            policy: config.window.policy,
            sort_by_listed_at: config.window.sort_by_listed_at,
            send_api_key: config.trakt.send_api_key,
        }
    }
}

/// Serves the current chunk of a Trakt list.
pub struct ChunkService {
    tokens: TokenManager,
    lists: Arc<dyn ListProvider>,
    observer: Arc<dyn NormalizeObserver>,
    clock: Arc<dyn Clock>,
    options: ServiceOptions,
}

impl ChunkService {
    pub fn new(tokens: TokenManager, lists: Arc<dyn ListProvider>, options: ServiceOptions) -> Self {
        Self {
            tokens,
            lists,
            observer: Arc::new(TracingObserver),
            clock: Arc::new(SystemClock),
            options,
        }
    }

    /// Wire the production collaborators from configuration.
    pub fn from_config(config: &ServiceConfig, paths: &PathManager) -> anyhow::Result<Self> {
        let client = create_trakt_client(&config.trakt)?;
        let credentials_path = config.credentials_path(paths.credentials_file());
        info!(path = %credentials_path.display(), "using credential record");

        let store = Arc::new(JsonFileCredentialStore::new(credentials_path));
        let endpoint = Arc::new(HttpTokenEndpoint::new(client.clone(), config.trakt.token_url.clone()));
        let lists = Arc::new(TraktListClient::new(client, &config.trakt));

        Ok(Self::new(
            TokenManager::new(store, endpoint),
            lists,
            ServiceOptions::from_config(config),
        ))
    }

    pub fn with_observer(mut self, observer: Arc<dyn NormalizeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn options(&self) -> ServiceOptions {
        self.options
    }

    pub async fn list_chunk(&self, query: &ListQuery) -> Result<Vec<NormalizedItem>, ChunkError> {
        let token = self.tokens.ensure_access_token().await?;
        let api_key = if self.options.send_api_key { token.api_key.as_deref() } else { None };

        let raw = self
            .lists
            .fetch_list_items(&query.list_id, token.as_str(), api_key)
            .await?;

        let sort = query
            .dir
            .or(self.options.sort_by_listed_at.then_some(SortDirection::Desc));
        let items = normalize_items(&raw, query.media_type, sort, self.observer.as_ref());

        let window = select_window(
            self.options.policy,
            query.start,
            query.step_days,
            query.chunk,
            items.len(),
            self.clock.now(),
        )?;

        debug!(
            list_id = %query.list_id,
            fetched = raw.len(),
            eligible = items.len(),
            start = window.start,
            end = window.end,
            "selected chunk window"
        );

        Ok(window.slice(&items).to_vec())
    }
}
