//! 12-byte document identifiers
//!
//! Layout of a freshly generated id:
//!
//! ```text
//! | 4 bytes unix seconds (BE) | 5 bytes process-random | 3 bytes counter (BE) |
//! ```
//!
//! The canonical text form is 24 lowercase hex characters. Only that form
//! parses; uppercase or any other length is rejected so that every accepted
//! string maps back to itself.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::Utc;

use crate::error::StorageError;
use crate::storage_traits::StorageResult;

/// Number of bytes in an [`ObjectId`].
pub const OBJECT_ID_LEN: usize = 12;

/// Length of the canonical hex encoding.
pub const OBJECT_ID_HEX_LEN: usize = OBJECT_ID_LEN * 2;

const COUNTER_MASK: u32 = 0x00FF_FFFF;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

/// Unique identifier of a stored post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Generate a new identifier.
    pub fn new() -> Self {
        let secs = Utc::now().timestamp() as u32;
        let count = next_count();

        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(process_unique());
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        ObjectId(bytes)
    }

    /// Wrap raw bytes.
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        ObjectId(bytes)
    }

    /// Raw bytes.
    pub const fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    /// Parse the canonical 24-character lowercase hex form.
    pub fn parse_str(s: &str) -> StorageResult<Self> {
        let canonical = s.len() == OBJECT_ID_HEX_LEN
            && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !canonical {
            return Err(StorageError::InvalidObjectId {
                value: s.to_string(),
            });
        }

        let mut bytes = [0u8; OBJECT_ID_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| StorageError::InvalidObjectId {
            value: s.to_string(),
        })?;
        Ok(ObjectId(bytes))
    }

    /// Canonical lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Seconds since the Unix epoch encoded in the leading four bytes.
    pub fn timestamp_secs(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ObjectId {
    type Err = StorageError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

fn process_unique() -> &'static [u8; 5] {
    PROCESS_UNIQUE.get_or_init(|| {
        let seed = uuid::Uuid::new_v4();
        let mut out = [0u8; 5];
        out.copy_from_slice(&seed.as_bytes()[..5]);
        out
    })
}

fn next_count() -> u32 {
    let counter = COUNTER.get_or_init(|| {
        let seed = uuid::Uuid::new_v4();
        let b = seed.as_bytes();
        AtomicU32::new(u32::from_be_bytes([0, b[0], b[1], b[2]]))
    });
    counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn hex_round_trip() {
        let hex = "5d1f8c2e9a3b4c5d6e7f8091";
        let oid = ObjectId::parse_str(hex).unwrap();
        assert_eq!(oid.to_hex(), hex);
        assert_eq!(oid.to_string(), hex);
    }

    #[test]
    fn generated_ids_are_distinct_and_canonical() {
        let ids: HashSet<String> = (0..1000).map(|_| ObjectId::new().to_hex()).collect();
        assert_eq!(ids.len(), 1000);
        for id in &ids {
            assert_eq!(id.len(), OBJECT_ID_HEX_LEN);
            assert_eq!(ObjectId::parse_str(id).unwrap().to_hex(), *id);
        }
    }

    #[test]
    fn generated_id_carries_current_timestamp() {
        let before = Utc::now().timestamp() as u32;
        let oid = ObjectId::new();
        let after = Utc::now().timestamp() as u32;
        assert!(oid.timestamp_secs() >= before && oid.timestamp_secs() <= after);
    }

    #[test]
    fn rejects_wrong_length() {
        for bad in ["", "abc", "5d1f8c2e9a3b4c5d6e7f809", "5d1f8c2e9a3b4c5d6e7f80911"] {
            let err = ObjectId::parse_str(bad).unwrap_err();
            assert!(matches!(err, StorageError::InvalidObjectId { .. }), "{bad}");
        }
    }

    #[test]
    fn rejects_non_hex_and_uppercase() {
        for bad in [
            "zzzzzzzzzzzzzzzzzzzzzzzz",
            "5D1F8C2E9A3B4C5D6E7F8091",
            "5d1f8c2e9a3b4c5d6e7f809g",
            "5d1f8c2e 9a3b4c5d6e7f809",
        ] {
            assert!(bad.parse::<ObjectId>().is_err(), "{bad}");
        }
    }

    #[test]
    fn bytes_round_trip() {
        let raw = [0xde, 0xad, 0xbe, 0xef, 0, 1, 2, 3, 4, 5, 6, 7];
        let oid = ObjectId::from_bytes(raw);
        assert_eq!(oid.bytes(), raw);
        assert_eq!(oid.to_hex(), "deadbeef0001020304050607");
    }
}
