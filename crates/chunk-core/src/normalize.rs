use chrono::{DateTime, Utc};
use chunk_models::{MediaType, NormalizedItem, SortDirection};
use serde_json::Value;
use std::cmp::Ordering;
use tracing::warn;

/// Structural problem in a single raw list item. The item is dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedItem {
    #[error("item is not a JSON object")]
    NotAnObject,

    #[error("missing '{0}' object")]
    MissingMedia(MediaType),

    #[error("'{0}.ids' is not an object")]
    InvalidIds(MediaType),
}

/// Receives items dropped during normalization.
pub trait NormalizeObserver: Send + Sync {
    fn on_malformed(&self, index: usize, item: &Value, error: &MalformedItem);
}

/// Logs every dropped item at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl NormalizeObserver for TracingObserver {
    fn on_malformed(&self, index: usize, item: &Value, error: &MalformedItem) {
        warn!(index, error = %error, item = %item, "Skipping item due to unexpected structure");
    }
}

/// Filter `raw` to `media_type`, optionally sort by `listed_at`, and extract ids.
///
/// Order of the returned items follows the (possibly sorted) source order.
pub fn normalize_items(
    raw: &[Value],
    media_type: MediaType,
    sort: Option<SortDirection>,
    observer: &dyn NormalizeObserver,
) -> Vec<NormalizedItem> {
    let mut eligible: Vec<(usize, &Value)> = Vec::with_capacity(raw.len());
    for (index, item) in raw.iter().enumerate() {
        if !item.is_object() {
            observer.on_malformed(index, item, &MalformedItem::NotAnObject);
            continue;
        }
        if item.get("type").and_then(Value::as_str) == Some(media_type.as_str()) {
            eligible.push((index, item));
        }
    }

    if let Some(direction) = sort {
        sort_by_listed_at(&mut eligible, direction);
    }

    eligible
        .into_iter()
        .filter_map(|(index, item)| match normalize_item(item, media_type) {
            Ok(normalized) => Some(normalized),
            Err(e) => {
                observer.on_malformed(index, item, &e);
                None
            }
        })
        .collect()
}

/// Extract identifiers from a single item already known to be of `media_type`.
pub fn normalize_item(item: &Value, media_type: MediaType) -> Result<NormalizedItem, MalformedItem> {
    let media = item
        .get(media_type.as_str())
        .filter(|v| v.is_object())
        .ok_or(MalformedItem::MissingMedia(media_type))?;

    let title = media.get("title").and_then(Value::as_str).map(str::to_string);

    let (tmdb, tvdb, imdb) = match media.get("ids") {
        None | Some(Value::Null) => (0, 0, None),
        Some(Value::Object(ids)) => (
            numeric_id(ids.get("tmdb")),
            numeric_id(ids.get("tvdb")),
            ids.get("imdb")
                .and_then(Value::as_str)
                .map(remove_slashes)
                .filter(|s| !s.is_empty()),
        ),
        Some(_) => return Err(MalformedItem::InvalidIds(media_type)),
    };

    Ok(NormalizedItem::new(tmdb, tvdb, imdb, title))
}

/// Integer ids arrive as numbers or numeric strings; anything else counts as 0.
fn numeric_id(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Remove slashes from IMDB ID (Trakt sometimes includes them)
fn remove_slashes(s: &str) -> String {
    s.replace('/', "")
}

fn listed_at(item: &Value) -> Option<DateTime<Utc>> {
    item.get("listed_at")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Stable sort; items without a usable `listed_at` count as the oldest.
fn sort_by_listed_at(items: &mut [(usize, &Value)], direction: SortDirection) {
    items.sort_by(|(_, a), (_, b)| {
        let ordering: Ordering = listed_at(a).cmp(&listed_at(b));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}
