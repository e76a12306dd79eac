use crate::clock::{Clock, SystemClock};
use crate::error::AuthError;
use chrono::{DateTime, Utc};
use chunk_config::CredentialStore;
use chunk_models::CredentialRecord;
use chunk_sources::{RefreshRequest, TokenEndpoint, TokenResponse};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Bearer token ready to present to the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    /// The record's `client_id`, sent as `trakt-api-key` when enabled.
    pub api_key: Option<String>,
}

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    Valid { expires_at: DateTime<Utc> },
    Expired { expires_at: Option<DateTime<Utc>>, refreshable: bool },
    Missing { refreshable: bool },
}

/// Hands out valid bearer tokens, refreshing through `endpoint` when the
/// stored one has expired.
///
/// The whole load, refresh, save sequence runs under one lock, so
/// concurrent callers queue behind an in-flight refresh and then see its
/// result instead of issuing their own.
pub struct TokenManager {
    store: Arc<dyn CredentialStore>,
    endpoint: Arc<dyn TokenEndpoint>,
    clock: Arc<dyn Clock>,
    lock: Mutex<()>,
}

impl TokenManager {
    pub fn new(store: Arc<dyn CredentialStore>, endpoint: Arc<dyn TokenEndpoint>) -> Self {
        Self {
            store,
            endpoint,
            clock: Arc::new(SystemClock),
            lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store_location(&self) -> String {
        self.store.location()
    }

    pub async fn ensure_access_token(&self) -> Result<AccessToken, AuthError> {
        let _guard = self.lock.lock().await;

        let mut record = self.store.load()?;
        let now = self.clock.now();

        if record.has_valid_token(now) {
            debug!("Access token found and valid");
            return Ok(access_token(&record));
        }

        let Some(refresh_token) = record.refresh_token().map(str::to_string) else {
            error!("No valid access or refresh token available");
            return Err(AuthError::MissingRefreshToken);
        };

        info!("Attempting token refresh with refresh_token");
        let request = RefreshRequest::new(
            refresh_token,
            record.client_id.clone(),
            record.client_secret.clone(),
            record.redirect_uri.clone(),
        );
        let response = self.endpoint.refresh(&request).await.map_err(|e| {
            warn!(error = %e, "Refresh token flow failed");
            AuthError::from(e)
        })?;

        apply_token_response(&mut record, &response, now);
        self.store.save(&record).map_err(|e| {
            error!(error = %e, location = %self.store.location(), "Failed to persist refreshed token");
            AuthError::from(e)
        })?;

        info!(expires_at = ?record.expires_at_utc(), "Token refreshed successfully");
        Ok(access_token(&record))
    }

    /// Inspect the stored record without touching the network.
    pub async fn status(&self) -> Result<TokenStatus, AuthError> {
        let _guard = self.lock.lock().await;

        let record = self.store.load()?;
        let refreshable = record.refresh_token().is_some();

        if record.has_valid_token(self.clock.now()) {
            if let Some(expires_at) = record.expires_at_utc() {
                return Ok(TokenStatus::Valid { expires_at });
            }
        }

        match record.access_token.as_deref() {
            Some(token) if !token.is_empty() => Ok(TokenStatus::Expired {
                expires_at: record.expires_at_utc(),
                refreshable,
            }),
            _ => Ok(TokenStatus::Missing { refreshable }),
        }
    }
}

fn access_token(record: &CredentialRecord) -> AccessToken {
    AccessToken {
        token: record.access_token.clone().unwrap_or_default(),
        api_key: record.client_id.clone().filter(|id| !id.is_empty()),
    }
}

/// Merge a token endpoint response into the record.
///
/// A refresh token is only replaced when the server rotated it, and
/// `expires_at` only moves when the response carries `expires_in`.
pub fn apply_token_response(record: &mut CredentialRecord, response: &TokenResponse, now: DateTime<Utc>) {
    record.access_token = Some(response.access_token.clone());

    if let Some(refresh) = response.refresh_token.as_ref().filter(|t| !t.is_empty()) {
        record.refresh_token = Some(refresh.clone());
    }

    if let Some(expires_in) = response.expires_in {
        let created_at = response.created_at.unwrap_or_else(|| now.timestamp());
        record.expires_at = Some(created_at.saturating_add(expires_in));
    }

    record.last_token_response = Some(response.redacted());
}
