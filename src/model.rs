use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const ID_BYTES: usize = 12;
const COUNTER_MASK: u32 = 0x00ff_ffff;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Store-assigned identifier of a book, shaped like a document-store object id:
/// 4 bytes of unix seconds, 5 bytes of per-process randomness and a 3 byte counter,
/// rendered as 24 lowercase hex characters. Ids carry no ordering guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId([u8; ID_BYTES]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidBookId(pub String);

impl fmt::Display for InvalidBookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a valid book id: {:?}", self.0)
    }
}

impl std::error::Error for InvalidBookId {}

impl BookId {
    pub fn generate() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or_default();
        let process = PROCESS_UNIQUE.get_or_init(rand::random::<[u8; 5]>);
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; ID_BYTES];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(process);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        BookId(bytes)
    }

    /// Accepts exactly 24 hex digits, in either case.
    pub fn parse(s: &str) -> Result<Self, InvalidBookId> {
        if s.len() != ID_BYTES * 2 {
            return Err(InvalidBookId(s.to_owned()));
        }
        let mut bytes = [0u8; ID_BYTES];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| InvalidBookId(s.to_owned()))?;
        Ok(BookId(bytes))
    }

    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for BookId {
    type Err = InvalidBookId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookId::parse(s)
    }
}

impl Serialize for BookId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BookId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        BookId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A persisted book. `comment_count` always equals `comments.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    pub id: BookId,
    pub title: String,
    pub comments: Vec<String>,
    pub comment_count: i64,
}

impl BookRecord {
    pub fn new(id: BookId, title: impl Into<String>) -> Self {
        BookRecord {
            id,
            title: title.into(),
            comments: vec![],
            comment_count: 0,
        }
    }

    pub fn push_comment(&mut self, comment: impl Into<String>) {
        self.comments.push(comment.into());
        self.comment_count = self.comments.len() as i64;
    }

    pub fn summary(&self) -> BookSummary {
        BookSummary {
            id: self.id,
            title: self.title.clone(),
            comment_count: self.comment_count,
        }
    }

    pub fn created(&self) -> CreatedBook {
        CreatedBook {
            id: self.id,
            title: self.title.clone(),
        }
    }
}

/// List projection: comments omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    #[serde(rename = "_id")]
    pub id: BookId,
    pub title: String,
    #[serde(rename = "commentcount")]
    pub comment_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBook {
    #[serde(rename = "_id")]
    pub id: BookId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDetail {
    #[serde(rename = "_id")]
    pub id: BookId,
    pub title: String,
    pub comments: Vec<String>,
}

impl From<BookRecord> for BookDetail {
    fn from(book: BookRecord) -> Self {
        BookDetail {
            id: book.id,
            title: book.title,
            comments: book.comments,
        }
    }
}
