//! Minute-precision timestamps as used by the newdle API.
//!
//! Slots and final dates travel as naive local times in the poll's
//! timezone, formatted `YYYY-MM-DDTHH:MM`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::CoreError;

/// Wire format of slot timestamps.
pub const FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parses a slot timestamp.
pub fn parse(value: &str) -> Result<NaiveDateTime, CoreError> {
    NaiveDateTime::parse_from_str(value, FORMAT)
        .map_err(|_| CoreError::InvalidSlotTime(value.to_string()))
}

/// Formats a slot timestamp.
pub fn format(value: &NaiveDateTime) -> String {
    value.format(FORMAT).to_string()
}

/// Serializes a slot timestamp.
///
/// # Errors
///
/// Never fails on its own; propagates serializer errors.
pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(value))
}

/// Deserializes a slot timestamp.
///
/// # Errors
///
/// Fails if the string does not match [`FORMAT`].
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

/// Same as the parent module, for `Option<NaiveDateTime>` fields.
pub mod option {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes an optional slot timestamp (`null` when absent).
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_some(&super::format(dt)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an optional slot timestamp.
    ///
    /// # Errors
    ///
    /// Fails if a present string does not match the slot format.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Same as the parent module, for `Vec<NaiveDateTime>` fields.
pub mod list {
    use chrono::NaiveDateTime;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes a list of slot timestamps.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        values: &[NaiveDateTime],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&super::format(value))?;
        }
        seq.end()
    }

    /// Deserializes a list of slot timestamps.
    ///
    /// # Errors
    ///
    /// Fails on the first entry that does not match the slot format.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<NaiveDateTime>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|raw| super::parse(raw).map_err(serde::de::Error::custom))
            .collect()
    }
}
