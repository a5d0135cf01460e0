//! PasteService — the operations the HTTP layer calls.
//!
//! Owns validation, id minting with collision retry, owner resolution and
//! page clamping. All persistence goes through [`PasteStore`]; the clock and
//! id source are injected.

use crate::{
    clock::Clock,
    models::{
        identifier::{IdGenerator, Identifier, OwnerToken},
        paste::{NewPaste, Paste, PasteSummary},
    },
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{
    archive::write_archive,
    error::{PasteError, PasteResult, ValidationError},
    ownership::resolve_owner,
    pagination::PageWindow,
    paste_store::PasteStore,
};

/// Insert attempts before giving up on finding an unused id.
pub const MAX_ID_ATTEMPTS: usize = 4;

#[derive(Clone, Copy, Debug)]
pub struct Limits {
    /// Exclusive upper bound on value length in bytes.
    pub max_paste_size: usize,
    pub page_size: usize,
    pub history_limit: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_paste_size: 5 << 20,
            page_size: 24,
            history_limit: 100,
        }
    }
}

/// One page of the public feed plus navigation state.
#[derive(Debug)]
pub struct RecentPage {
    pub pastes: Vec<PasteSummary>,
    pub window: PageWindow,
}

#[derive(Clone)]
pub struct PasteService {
    pub store: PasteStore,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    limits: Limits,
}

impl PasteService {
    pub fn new(
        store: PasteStore,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        limits: Limits,
    ) -> Self {
        Self {
            store,
            ids,
            clock,
            limits,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Validate and persist a new paste, returning its id and the owner token
    /// the client should present next time.
    ///
    /// The id is only meaningful once this returns `Ok`. On a primary-key
    /// clash a fresh id is minted, up to [`MAX_ID_ATTEMPTS`] inserts.
    pub async fn submit(
        &self,
        new: NewPaste,
        existing_owner: Option<OwnerToken>,
    ) -> PasteResult<(Identifier, OwnerToken)> {
        let now = self.clock.now();
        self.validate(&new, now)?;

        let owner = resolve_owner(existing_owner, self.ids.as_ref())?;
        let mut paste = Paste {
            id: self.ids.new_id()?,
            value: new.value,
            created_at: now,
            expiry: new.expiry,
            owner,
            listed: new.listed,
        };

        for attempt in 1..=MAX_ID_ATTEMPTS {
            match self.store.create(&paste).await {
                Ok(()) => {
                    info!(
                        "new paste: id='{}', size={}, listed={}, expires={:?}",
                        paste.id,
                        paste.value.len(),
                        paste.listed,
                        paste.expiry
                    );
                    return Ok((paste.id, owner));
                }
                Err(PasteError::DuplicateId(id)) => {
                    warn!("paste id collision on '{}' (attempt {})", id, attempt);
                    paste.id = self.ids.new_id()?;
                }
                Err(err) => return Err(err),
            }
        }

        Err(PasteError::IdAttemptsExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    /// Look up a live paste. Expired and unknown ids are indistinguishable.
    pub async fn fetch(&self, id: &Identifier) -> PasteResult<Paste> {
        let paste = self.store.get(id, self.clock.now()).await?;
        debug!("fetched paste {}", id);
        Ok(paste)
    }

    /// Public feed page `page_no`, clamped to the last existing page.
    pub async fn recent(&self, page_no: usize) -> PasteResult<RecentPage> {
        let now = self.clock.now();
        let total = self.store.count_recent(now).await?;
        let window = PageWindow::resolve(total, self.limits.page_size, page_no);
        let pastes = self
            .store
            .list_recent(window.limit, window.offset, now)
            .await?;
        Ok(RecentPage { pastes, window })
    }

    /// Everything `owner` submitted that has not expired, listed or not.
    pub async fn history(&self, owner: &OwnerToken) -> PasteResult<Vec<PasteSummary>> {
        self.store
            .list_owned(owner, self.limits.history_limit, self.clock.now())
            .await
    }

    /// Id of the newest paste in the public feed.
    pub async fn latest(&self) -> PasteResult<Identifier> {
        self.store
            .list_recent(1, 0, self.clock.now())
            .await?
            .into_iter()
            .next()
            .map(|summary| summary.id)
            .ok_or(PasteError::NotFound)
    }

    /// Gzipped tar of every live paste. `listed_only` restricts it to the
    /// public feed.
    pub async fn export_archive(&self, listed_only: bool) -> PasteResult<Vec<u8>> {
        let pastes = self.store.list_all(listed_only, self.clock.now()).await?;
        let archive = write_archive(&pastes, Vec::new())?;
        info!(
            "exported {} pastes ({} bytes, listed_only={})",
            pastes.len(),
            archive.len(),
            listed_only
        );
        Ok(archive)
    }

    /// Physically delete expired rows. Reads already ignore them; this only
    /// reclaims space.
    pub async fn purge_expired(&self) -> PasteResult<u64> {
        let removed = self.store.delete_expired(self.clock.now()).await?;
        info!("deleted {} expired pastes", removed);
        Ok(removed)
    }

    fn validate(&self, new: &NewPaste, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if new.value.is_empty() {
            return Err(ValidationError::EmptyValue);
        }
        if new.value.len() >= self.limits.max_paste_size {
            return Err(ValidationError::ValueTooLarge {
                len: new.value.len(),
                limit: self.limits.max_paste_size,
            });
        }
        if new.expiry.is_some_and(|expiry| expiry <= now) {
            return Err(ValidationError::ExpiryNotInFuture);
        }
        Ok(())
    }
}

/// Parse a client-supplied RFC 3339 expiry into UTC.
pub fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| ValidationError::MalformedExpiry(raw.to_string()))
}
