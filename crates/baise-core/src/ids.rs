//! Object identifiers and collection-tagged references.
//!
//! Every document is keyed by a 12-byte [`ObjectId`]:
//!
//! ```text
//! | 4 bytes: seconds since epoch (BE) | 5 bytes: process random | 3 bytes: counter (BE) |
//! ```
//!
//! rendered as 24 lowercase hex characters. [`Ref<T>`] wraps an id with the
//! entity type it points at, so a `Ref<Project>` cannot be handed where a
//! `Ref<Customer>` is expected. On the wire both are the bare hex string.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::entity::Entity;
use crate::enums::EntityKind;
use crate::errors::CoreError;

/// Pattern every serialized identifier must match.
pub const OBJECT_ID_PATTERN: &str = "^[0-9a-fA-F]{24}$";

const COUNTER_MASK: u32 = 0x00FF_FFFF;

fn process_unique() -> &'static [u8; 5] {
    static UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    UNIQUE.get_or_init(random_bytes::<5>)
}

fn counter() -> &'static AtomicU32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    COUNTER.get_or_init(|| AtomicU32::new(u32::from_be_bytes(random_bytes::<4>()) & COUNTER_MASK))
}

/// Fill `N` bytes from the OS entropy source, falling back to clock and pid
/// mixing when the source is unavailable.
fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    if getrandom::fill(&mut buf).is_err() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or_default();
        let seed = (nanos ^ std::process::id().rotate_left(16)).to_le_bytes();
        for (i, b) in buf.iter_mut().enumerate() {
            *b = seed[i % seed.len()];
        }
    }
    buf
}

// ---------------------------------------------------------------------------
// ObjectId
// ---------------------------------------------------------------------------

/// A generated unique document identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Generate a fresh identifier stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        let secs = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);
        let count = counter().fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;
        Self::from_parts(secs, *process_unique(), count)
    }

    /// Assemble an identifier from its three components.
    ///
    /// Only the low 24 bits of `count` are kept.
    #[must_use]
    pub fn from_parts(secs: u32, unique: [u8; 5], count: u32) -> Self {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&unique);
        bytes[9..].copy_from_slice(&(count & COUNTER_MASK).to_be_bytes()[1..]);
        Self(bytes)
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Creation second embedded in the identifier.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        DateTime::from_timestamp(i64::from(secs), 0)
    }

    /// Lowercase hex rendering.
    #[must_use]
    pub fn to_hex(&self) -> String {
        use std::fmt::Write as _;

        self.0.iter().fold(String::with_capacity(24), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ObjectId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 24 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidId(s.to_string()));
        }
        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| CoreError::InvalidId(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({self})")
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for ObjectId {
    fn inline_schema() -> bool {
        true
    }

    fn schema_name() -> Cow<'static, str> {
        "ObjectId".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "string",
            "pattern": OBJECT_ID_PATTERN,
        })
    }
}

// ---------------------------------------------------------------------------
// Ref<T>
// ---------------------------------------------------------------------------

/// Identifier of a document in the collection of `T`.
///
/// Nothing checks at construction that the target exists; references are
/// resolved by explicit lookup.
pub struct Ref<T> {
    id: ObjectId,
    target: PhantomData<fn() -> T>,
}

impl<T> Ref<T> {
    #[must_use]
    pub const fn new(id: ObjectId) -> Self {
        Self {
            id,
            target: PhantomData,
        }
    }

    #[must_use]
    pub const fn id(self) -> ObjectId {
        self.id
    }
}

impl<T: Entity> Ref<T> {
    /// Collection kind and id this reference points at.
    #[must_use]
    pub const fn target(self) -> (EntityKind, ObjectId) {
        (T::KIND, self.id)
    }
}

impl<T> From<ObjectId> for Ref<T> {
    fn from(id: ObjectId) -> Self {
        Self::new(id)
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Ref<T> {}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Ref<T> {}

impl<T> Hash for Ref<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({})", self.id)
    }
}

impl<T> fmt::Display for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.id, f)
    }
}

impl<T> Serialize for Ref<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.id.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Ref<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ObjectId::deserialize(deserializer).map(Self::new)
    }
}

impl<T> JsonSchema for Ref<T> {
    fn inline_schema() -> bool {
        true
    }

    fn schema_name() -> Cow<'static, str> {
        ObjectId::schema_name()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        ObjectId::json_schema(generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn generated_ids_are_unique_and_hex() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_hex().len(), 24);
        assert!(a.to_hex().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn parse_roundtrip() {
        let id: ObjectId = "65a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap();
        assert_eq!(id.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn parse_accepts_uppercase_and_renders_lowercase() {
        let id: ObjectId = "65A1F0C2E4B0A1B2C3D4E5F6".parse().unwrap();
        assert_eq!(id.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn parse_rejects_bad_input() {
        for bad in ["", "abc", "zz a1f0c2e4b0a1b2c3d4e5f6", "65a1f0c2e4b0a1b2c3d4e5f6aa"] {
            assert!(bad.parse::<ObjectId>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn from_parts_layout() {
        let id = ObjectId::from_parts(1, [0xaa; 5], 0x0102_0304);
        assert_eq!(id.to_string(), "00000001aaaaaaaaaa020304");
        assert_eq!(id.timestamp().map(|t| t.timestamp()), Some(1));
    }

    #[test]
    fn counter_increments_between_ids() {
        let a = ObjectId::new().bytes();
        let b = ObjectId::new().bytes();
        assert_eq!(a[4..9], b[4..9]);
        assert_ne!(a[9..], b[9..]);
    }

    #[test]
    fn ref_serializes_as_bare_id() {
        struct Marker;
        let id = ObjectId::new();
        let r: Ref<Marker> = Ref::new(id);
        let json = serde_json::to_value(r).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_hex()));
        let back: Ref<Marker> = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }
}
