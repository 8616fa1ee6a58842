use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FavoriteKind {
    Establishment,
    Site,
    Event,
}

impl FavoriteKind {
    pub fn as_path_segment(&self) -> &'static str {
        match self {
            FavoriteKind::Establishment => "establishment",
            FavoriteKind::Site => "site",
            FavoriteKind::Event => "event",
        }
    }
}

impl fmt::Display for FavoriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path_segment())
    }
}

impl FromStr for FavoriteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "establishment" => Ok(FavoriteKind::Establishment),
            "site" => Ok(FavoriteKind::Site),
            "event" => Ok(FavoriteKind::Event),
            other => Err(format!("unknown favorite kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteTarget {
    pub target_type: FavoriteKind,
    pub target_id: String,
}

impl FavoriteTarget {
    pub fn new(target_type: FavoriteKind, target_id: impl Into<String>) -> Self {
        Self {
            target_type,
            target_id: target_id.into(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    #[serde(flatten)]
    pub target: FavoriteTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
