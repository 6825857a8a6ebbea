//! Native document identifiers
//!
//! 12 bytes rendered as 24 lowercase hex characters:
//! - bytes 0..4: big-endian Unix timestamp in seconds
//! - bytes 4..9: random, fixed for the process
//! - bytes 9..12: big-endian counter, wrapping at 2^24

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::Utc;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Length of the textual form
pub const OBJECT_ID_HEX_LEN: usize = 24;

const COUNTER_MASK: u32 = 0x00FF_FFFF;

fn process_unique() -> &'static [u8; 5] {
    static UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    UNIQUE.get_or_init(rand::random)
}

fn counter() -> &'static AtomicU32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    COUNTER.get_or_init(|| AtomicU32::new(rand::random::<u32>() & COUNTER_MASK))
}

/// A document identifier in the store's native format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

/// Error returned when text is not a valid object id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidObjectId(pub String);

impl fmt::Display for InvalidObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a {}-character hex identifier", self.0, OBJECT_ID_HEX_LEN)
    }
}

impl std::error::Error for InvalidObjectId {}

impl ObjectId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        let secs = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);
        let count = counter().fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(process_unique());
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        Self(bytes)
    }

    /// Whether `raw` is exactly 24 ASCII hex digits
    pub fn is_valid(raw: &str) -> bool {
        raw.len() == OBJECT_ID_HEX_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Creation time encoded in the identifier, in Unix seconds
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if !Self::is_valid(raw) {
            return Err(InvalidObjectId(raw.to_string()));
        }

        let mut bytes = [0u8; 12];
        for (i, pair) in raw.as_bytes().chunks(2).enumerate() {
            let high = hex_value(pair[0]);
            let low = hex_value(pair[1]);
            bytes[i] = (high << 4) | low;
        }
        Ok(Self(bytes))
    }
}

// Only called on bytes already checked by `is_ascii_hexdigit`
fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
