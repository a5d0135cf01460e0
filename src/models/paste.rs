//! Represents a stored text submission.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::identifier::{Identifier, OwnerToken};

/// A single persisted paste.
///
/// Rows are written once and never updated. An expired paste may still exist
/// physically, but every read path filters it out.
#[derive(Clone, FromRow, Debug)]
pub struct Paste {
    /// Primary key and public address of the content.
    #[sqlx(try_from = "Vec<u8>")]
    pub id: Identifier,

    /// Opaque text payload.
    pub value: String,

    /// When the paste was created (UTC). Drives recency ordering.
    pub created_at: DateTime<Utc>,

    /// Instant after which the paste becomes unreadable; `None` never expires.
    pub expiry: Option<DateTime<Utc>>,

    /// Correlation token of the submitting client.
    #[sqlx(try_from = "Vec<u8>")]
    pub owner: OwnerToken,

    /// Whether the paste appears in the public recent feed.
    pub listed: bool,
}

impl Paste {
    /// True once `now` has reached the expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= now)
    }
}

/// Listing row: address and creation time only, never the payload.
#[derive(Clone, FromRow, Debug, PartialEq, Eq)]
pub struct PasteSummary {
    #[sqlx(try_from = "Vec<u8>")]
    pub id: Identifier,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields of a paste before it has an id or a timestamp.
#[derive(Clone, Debug)]
pub struct NewPaste {
    pub value: String,
    pub listed: bool,
    pub expiry: Option<DateTime<Utc>>,
}
