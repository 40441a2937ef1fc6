//! Serde helpers for optional text fields.
//!
//! Stored documents write `""` for "no value"; in memory that is `None`.

use serde::{Deserialize, Deserializer, Serializer};

pub(crate) mod blank_as_none {
    use super::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|text| !text.trim().is_empty()))
    }
}

/// Accepts `null` where a string is expected (legacy documents).
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
