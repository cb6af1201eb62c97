//! Epoch-millisecond timestamps and the creation/update pair every document carries.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct EpochMillis(pub i64);

impl EpochMillis {
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, saturating at zero.
    #[must_use]
    pub const fn millis_since(self, earlier: Self) -> i64 {
        let diff = self.0.saturating_sub(earlier.0);
        if diff < 0 { 0 } else { diff }
    }

    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

impl From<DateTime<Utc>> for EpochMillis {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.timestamp_millis())
    }
}

/// Creation and last-update timestamps.
///
/// `creationTimestamp` is written once. `updatedTimestamp` only moves forward,
/// see [`Timestamps::touch`]. Both default to "now" when a document arrives
/// without them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    #[serde(default = "EpochMillis::now")]
    pub creation_timestamp: EpochMillis,
    #[serde(default = "EpochMillis::now")]
    pub updated_timestamp: EpochMillis,
}

impl Timestamps {
    /// Both timestamps set to `now`.
    #[must_use]
    pub const fn at(now: EpochMillis) -> Self {
        Self {
            creation_timestamp: now,
            updated_timestamp: now,
        }
    }

    /// Record a mutation at `now`. Never moves `updated_timestamp` backwards.
    pub fn touch(&mut self, now: EpochMillis) {
        self.updated_timestamp = self.updated_timestamp.max(now);
    }

    /// A document cannot be updated before it was created.
    pub fn check(&self) -> Result<(), CoreError> {
        if self.updated_timestamp < self.creation_timestamp {
            return Err(CoreError::Validation(format!(
                "updatedTimestamp {} precedes creationTimestamp {}",
                self.updated_timestamp.0, self.creation_timestamp.0
            )));
        }
        Ok(())
    }
}

impl Default for Timestamps {
    fn default() -> Self {
        Self::at(EpochMillis::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn touch_is_monotonic() {
        let mut ts = Timestamps::at(EpochMillis(1_000));
        ts.touch(EpochMillis(2_000));
        assert_eq!(ts.updated_timestamp, EpochMillis(2_000));
        ts.touch(EpochMillis(1_500));
        assert_eq!(ts.updated_timestamp, EpochMillis(2_000));
        assert_eq!(ts.creation_timestamp, EpochMillis(1_000));
    }

    #[test]
    fn update_before_creation_is_rejected() {
        let ts = Timestamps {
            creation_timestamp: EpochMillis(5_000),
            updated_timestamp: EpochMillis(1_000),
        };
        let err = ts.check().unwrap_err();
        assert!(err.to_string().contains("precedes creationTimestamp 5000"));
        assert!(Timestamps::at(EpochMillis(5_000)).check().is_ok());
    }

    #[test]
    fn missing_fields_default_to_now() {
        let before = EpochMillis::now();
        let ts: Timestamps = serde_json::from_str("{}").unwrap();
        assert!(ts.creation_timestamp >= before);
        assert!(ts.updated_timestamp >= before);
    }

    #[test]
    fn serializes_as_camel_case_numbers() {
        let ts = Timestamps::at(EpochMillis(1_700_000_000_000));
        let json = serde_json::to_value(ts).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "creationTimestamp": 1_700_000_000_000_i64,
                "updatedTimestamp": 1_700_000_000_000_i64
            })
        );
    }

    #[test]
    fn millis_since_saturates() {
        assert_eq!(EpochMillis(5).millis_since(EpochMillis(10)), 0);
        assert_eq!(EpochMillis(10).millis_since(EpochMillis(4)), 6);
    }
}
