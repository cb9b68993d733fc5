//! Tagged encoding for date values.
//!
//! A date is written as
//!
//! ```json
//! {"type": "date", "version": 1, "value": "2026-03-01T09:30:00Z"}
//! ```
//!
//! Decoding also accepts the older `{"__type": "Date", "value": ...}` shape.
//! Nothing else is treated as a date. That includes a bare `{"value": ...}`
//! object, an unknown version and an unparseable timestamp.
//!
//! Use the module with `#[serde(with = "...")]`:
//!
//! ```rust
//! use chrono::{DateTime, Utc};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Lease {
//!     #[serde(with = "leasekit::persistence::tagged_date")]
//!     starts_at: DateTime<Utc>,
//!     #[serde(default, with = "leasekit::persistence::tagged_date::option")]
//!     ends_at: Option<DateTime<Utc>>,
//! }
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};

/// Value of the `type` field.
pub const DATE_TAG: &str = "date";

/// Current encoding version.
pub const DATE_TAG_VERSION: u64 = 1;

const LEGACY_TYPE_KEY: &str = "__type";
const LEGACY_TYPE: &str = "Date";

/// Encode a date as a tagged JSON object.
pub fn encode(date: &DateTime<Utc>) -> Value {
    json!({
        "type": DATE_TAG,
        "version": DATE_TAG_VERSION,
        "value": date.to_rfc3339_opts(SecondsFormat::AutoSi, true),
    })
}

/// Decode a tagged JSON object back into a date.
///
/// Returns `None` for anything that is not a recognized tag.
pub fn decode(value: &Value) -> Option<DateTime<Utc>> {
    let obj = value.as_object()?;

    let current = obj.get("type").and_then(Value::as_str) == Some(DATE_TAG)
        && obj.get("version").and_then(Value::as_u64) == Some(DATE_TAG_VERSION);
    let legacy = obj.get(LEGACY_TYPE_KEY).and_then(Value::as_str) == Some(LEGACY_TYPE);
    if !current && !legacy {
        return None;
    }

    let raw = obj.get("value")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    encode(date).serialize(serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    decode(&value).ok_or_else(|| D::Error::custom(format!("expected a tagged date, found {}", value)))
}

/// The same encoding for optional dates. `None` is written as `null`.
pub mod option {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => encode(date).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None => Ok(None),
            Some(value) => decode(&value).map(Some).ok_or_else(|| {
                D::Error::custom(format!("expected a tagged date or null, found {}", value))
            }),
        }
    }
}
