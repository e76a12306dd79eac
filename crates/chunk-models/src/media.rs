use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discriminator carried by every Trakt list item (`"type": "movie"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Show,
}

impl MediaType {
    /// Key used both as the discriminator value and as the name of the
    /// nested object holding the item's ids and title.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Show => "show",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "show" => Ok(MediaType::Show),
            _ => Err(format!("Invalid type: {}. Use 'movie' or 'show'", s)),
        }
    }
}

/// Ordering applied to `listed_at` before normalization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("Invalid dir: {}. Use 'asc' or 'desc'", s)),
        }
    }
}
