use super::identifiers::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The contract's projection of a post, as returned by `getPost`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub creator: Address,
    pub content: String,
    #[serde(with = "unix_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "flexible_u64")]
    pub like_count: u64,
    #[serde(deserialize_with = "flexible_u64")]
    pub comment_count: u64,
    #[serde(default)]
    pub comments: Vec<String>,
}

impl Post {
    /// The zero-valued struct a contract mapping yields for an unknown id.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            creator: Address::ZERO,
            content: String::new(),
            created_at: DateTime::<Utc>::default(),
            like_count: 0,
            comment_count: 0,
            comments: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.creator.is_zero()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bio: String,
}

impl Profile {
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.username.is_empty() && self.bio.is_empty()
    }
}

/// Contract integers arrive either as JSON numbers or as decimal strings
/// (providers stringify `uint256`).
fn flexible_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    match &raw {
        Value::Number(number) => number
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom(format!("expected unsigned integer, got {raw}"))),
        Value::String(text) => text
            .trim()
            .parse::<u64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid integer '{text}': {e}"))),
        other => Err(serde::de::Error::custom(format!(
            "expected integer, got {other}"
        ))),
    }
}

mod unix_seconds {
    use chrono::{DateTime, Utc};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(value.timestamp())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = super::flexible_u64(deserializer)?;
        i64::try_from(seconds)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp {seconds} out of range")))
    }
}
