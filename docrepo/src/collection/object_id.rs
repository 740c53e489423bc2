use crate::common::{OBJECT_ID_HEX_LEN, OBJECT_ID_LEN};
use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::ID_GENERATOR;
use chrono::{DateTime, TimeZone, Utc};
use log::info;
use rand::rngs::OsRng;
use rand::Rng;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

/// The store's native 12-byte identifier.
///
/// Layout: 4-byte big-endian creation time in seconds, 5 bytes unique to the
/// generating process, 3-byte big-endian counter. The text form is 24
/// lowercase hex characters. [ObjectId::EMPTY] (all zero bytes) is the
/// "empty identifier" sentinel and is never produced by the generator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectId {
    bytes: [u8; OBJECT_ID_LEN],
}

impl ObjectId {
    pub const EMPTY: ObjectId = ObjectId {
        bytes: [0; OBJECT_ID_LEN],
    };

    /// Generates a new unique identifier.
    pub fn new() -> Self {
        ID_GENERATOR.next_id()
    }

    pub fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        ObjectId { bytes }
    }

    pub fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes == [0; OBJECT_ID_LEN]
    }

    /// Creation time encoded in the first four bytes.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let secs = u32::from_be_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]]);
        Utc.timestamp_opt(secs as i64, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(OBJECT_ID_HEX_LEN);
        for byte in self.bytes {
            hex.push_str(&format!("{:02x}", byte));
        }
        hex
    }

    /// Parses exactly 24 hex characters (either case).
    pub fn parse_str(text: &str) -> RepoResult<ObjectId> {
        ObjectId::parse_hex(text).ok_or_else(|| {
            log::error!("'{}' is not a valid 24-digit hex identifier", text);
            RepoError::new(
                &format!("'{}' is not a valid 24-digit hex identifier", text),
                ErrorKind::InvalidIdentifierFormat,
            )
        })
    }

    pub(crate) fn parse_hex(text: &str) -> Option<ObjectId> {
        if text.len() != OBJECT_ID_HEX_LEN || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let mut bytes = [0u8; OBJECT_ID_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&text[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(ObjectId { bytes })
    }
}

impl FromStr for ObjectId {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId(\"{}\")", self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ObjectId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ObjectId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        ObjectId::parse_str(&text).map_err(serde::de::Error::custom)
    }
}

/// Process-wide generator behind [ObjectId::new].
pub struct ObjectIdGenerator {
    process_unique: [u8; 5],
    counter: AtomicU32,
}

impl ObjectIdGenerator {
    pub fn new() -> Self {
        let uuid = uuid::Uuid::new_v4();
        let uid = uuid.as_bytes();
        let mut process_unique = [0u8; 5];
        for (i, byte) in process_unique.iter_mut().enumerate() {
            *byte = uid[uid.len() - 1 - i] ^ OsRng.gen::<u8>();
        }
        let counter = OsRng.gen::<u32>() & 0x00FF_FFFF;

        info!("Initialized object id generator with counter seed {}", counter);
        ObjectIdGenerator {
            process_unique,
            counter: AtomicU32::new(counter),
        }
    }

    pub fn next_id(&self) -> ObjectId {
        let seconds = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let count = self.counter.fetch_add(1, Ordering::Relaxed) & 0x00FF_FFFF;

        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&self.process_unique);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        ObjectId { bytes }
    }
}

impl Default for ObjectIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
