use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Seconds subtracted from `expires_at` before a token is considered expired.
pub const EXPIRY_BUFFER_SECS: i64 = 5;

/// Persisted OAuth state for the single Trakt account this service proxies.
///
/// Unknown keys in the backing document are kept in `extra` so a rewrite
/// after a refresh does not drop settings other tools put there.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CredentialRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Epoch seconds.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_epoch"
    )]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    /// Last token endpoint response with both tokens stripped.
    #[serde(
        rename = "_last_token_response",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_token_response: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CredentialRecord {
    /// True when an access token is present and `now < expires_at - buffer`.
    pub fn has_valid_token(&self, now: DateTime<Utc>) -> bool {
        match (self.access_token.as_deref(), self.expires_at) {
            (Some(token), Some(expires_at)) if !token.is_empty() => {
                now.timestamp() < expires_at.saturating_sub(EXPIRY_BUFFER_SECS)
            }
            _ => false,
        }
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

/// Accepts integer, float or numeric-string epochs; anything else, including
/// floats outside the `i64` range, reads as absent.
fn deserialize_epoch<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(epoch_from_f64)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().and_then(epoch_from_f64),
        _ => None,
    })
}

fn epoch_from_f64(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    (f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64).then(|| f as i64)
}
