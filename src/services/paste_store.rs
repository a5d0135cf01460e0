//! PasteStore — persisted paste rows in SQLite.
//!
//! Expiry is lazy: expired rows stay in the table and every read filters them
//! out with `expiry IS NULL OR expiry > now`. The caller supplies `now`, so
//! the store itself never reads the wall clock.

use crate::models::{
    identifier::{Identifier, OwnerToken},
    paste::{Paste, PasteSummary},
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;

use super::error::{PasteError, PasteResult};

const UNEXPIRED: &str = "(expiry IS NULL OR expiry > ?)";

/// Read/write access to the `pastes` table.
#[derive(Clone)]
pub struct PasteStore {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl PasteStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Insert one fully validated paste.
    ///
    /// A primary-key clash is reported as `DuplicateId` so the caller can mint
    /// a new id and try again; nothing is written in that case.
    pub async fn create(&self, paste: &Paste) -> PasteResult<()> {
        let result = sqlx::query(
            "INSERT INTO pastes (id, value, created_at, expiry, owner, listed)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(paste.id.as_bytes().to_vec())
        .bind(&paste.value)
        .bind(paste.created_at)
        .bind(paste.expiry)
        .bind(paste.owner.as_bytes().to_vec())
        .bind(paste.listed)
        .execute(&*self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(PasteError::DuplicateId(paste.id)),
            Err(err) => Err(PasteError::Sqlx(err)),
        }
    }

    /// Point lookup. Missing and expired rows both yield `NotFound`.
    pub async fn get(&self, id: &Identifier, now: DateTime<Utc>) -> PasteResult<Paste> {
        let query = format!(
            "SELECT id, value, created_at, expiry, owner, listed
             FROM pastes WHERE id = ? AND {UNEXPIRED}"
        );
        sqlx::query_as::<_, Paste>(&query)
            .bind(id.as_bytes().to_vec())
            .bind(now)
            .fetch_one(&*self.db)
            .await
            .map_err(|err| match err {
                sqlx::Error::RowNotFound => PasteError::NotFound,
                other => PasteError::Sqlx(other),
            })
    }

    /// Number of pastes visible in the public feed.
    pub async fn count_recent(&self, now: DateTime<Utc>) -> PasteResult<u64> {
        let query = format!("SELECT COUNT(*) FROM pastes WHERE listed = 1 AND {UNEXPIRED}");
        let count: i64 = sqlx::query_scalar(&query)
            .bind(now)
            .fetch_one(&*self.db)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Listed, unexpired pastes, newest first, skipping `offset` rows.
    pub async fn list_recent(
        &self,
        limit: usize,
        offset: usize,
        now: DateTime<Utc>,
    ) -> PasteResult<Vec<PasteSummary>> {
        let query = format!(
            "SELECT id, created_at FROM pastes
             WHERE listed = 1 AND {UNEXPIRED}
             ORDER BY created_at DESC, rowid DESC
             LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query_as::<_, PasteSummary>(&query)
            .bind(now)
            .bind(to_sql_int(limit))
            .bind(to_sql_int(offset))
            .fetch_all(&*self.db)
            .await?;
        debug!("listed {} recent pastes at offset {}", rows.len(), offset);
        Ok(rows)
    }

    /// Unexpired pastes created by `owner`, newest first. Unlisted pastes are
    /// included.
    pub async fn list_owned(
        &self,
        owner: &OwnerToken,
        limit: usize,
        now: DateTime<Utc>,
    ) -> PasteResult<Vec<PasteSummary>> {
        let query = format!(
            "SELECT id, created_at FROM pastes
             WHERE owner = ? AND {UNEXPIRED}
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?"
        );
        let rows = sqlx::query_as::<_, PasteSummary>(&query)
            .bind(owner.as_bytes().to_vec())
            .bind(now)
            .bind(to_sql_int(limit))
            .fetch_all(&*self.db)
            .await?;
        Ok(rows)
    }

    /// Full unexpired rows, newest first, for backup export. With
    /// `listed_only` the unlisted pastes are left out.
    pub async fn list_all(
        &self,
        listed_only: bool,
        now: DateTime<Utc>,
    ) -> PasteResult<Vec<Paste>> {
        let scope = if listed_only { "listed = 1 AND " } else { "" };
        let query = format!(
            "SELECT id, value, created_at, expiry, owner, listed FROM pastes
             WHERE {scope}{UNEXPIRED}
             ORDER BY created_at DESC, rowid DESC"
        );
        let rows = sqlx::query_as::<_, Paste>(&query)
            .bind(now)
            .fetch_all(&*self.db)
            .await?;
        Ok(rows)
    }

    /// Physically remove every row whose expiry has passed.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> PasteResult<u64> {
        let result = sqlx::query("DELETE FROM pastes WHERE expiry IS NOT NULL AND expiry <= ?")
            .bind(now)
            .execute(&*self.db)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn to_sql_int(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::{Duration, TimeZone};

    async fn store() -> PasteStore {
        let pool = db::connect_in_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        PasteStore::new(Arc::new(pool))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn id(n: u8) -> Identifier {
        Identifier::from_bytes([n; 8])
    }

    fn owner(n: u8) -> OwnerToken {
        OwnerToken::new(Identifier::from_bytes([0xa0 | n; 8]))
    }

    fn paste(n: u8, created_at: DateTime<Utc>) -> Paste {
        Paste {
            id: id(n),
            value: format!("paste {n}"),
            created_at,
            expiry: None,
            owner: owner(1),
            listed: true,
        }
    }

    #[tokio::test]
    async fn get_returns_stored_paste() {
        let store = store().await;
        let mut p = paste(1, t0());
        p.expiry = Some(t0() + Duration::hours(1));
        p.listed = false;
        store.create(&p).await.unwrap();

        let got = store.get(&id(1), t0()).await.unwrap();
        assert_eq!(got.id, p.id);
        assert_eq!(got.value, "paste 1");
        assert_eq!(got.created_at, t0());
        assert_eq!(got.expiry, p.expiry);
        assert_eq!(got.owner, owner(1));
        assert!(!got.listed);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = store().await;
        let err = store.get(&id(9), t0()).await.unwrap_err();
        assert!(matches!(err, PasteError::NotFound));
    }

    #[tokio::test]
    async fn expired_rows_are_hidden_from_every_read() {
        let store = store().await;
        let mut p = paste(1, t0());
        p.expiry = Some(t0() + Duration::minutes(5));
        store.create(&p).await.unwrap();

        let later = t0() + Duration::minutes(5);
        assert!(matches!(
            store.get(&id(1), later).await.unwrap_err(),
            PasteError::NotFound
        ));
        assert_eq!(store.count_recent(later).await.unwrap(), 0);
        assert!(store.list_recent(10, 0, later).await.unwrap().is_empty());
        assert!(
            store
                .list_owned(&owner(1), 10, later)
                .await
                .unwrap()
                .is_empty()
        );

        // still physically present until purged
        assert_eq!(store.delete_expired(later).await.unwrap(), 1);
        assert_eq!(store.delete_expired(later).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn expiry_boundary_matches_is_expired_at() {
        let store = store().await;
        let mut p = paste(1, t0());
        p.expiry = Some(t0() + Duration::minutes(5));
        store.create(&p).await.unwrap();

        let just_before = t0() + Duration::minutes(5) - Duration::seconds(1);
        assert!(!p.is_expired_at(just_before));
        assert_eq!(store.get(&id(1), just_before).await.unwrap().id, id(1));

        let at_expiry = t0() + Duration::minutes(5);
        assert!(p.is_expired_at(at_expiry));
        assert!(matches!(
            store.get(&id(1), at_expiry).await.unwrap_err(),
            PasteError::NotFound
        ));

        let forever = paste(2, t0());
        store.create(&forever).await.unwrap();
        let far = t0() + Duration::days(3650);
        assert!(!forever.is_expired_at(far));
        assert_eq!(store.get(&id(2), far).await.unwrap().id, id(2));
    }

    #[tokio::test]
    async fn list_all_returns_full_rows_and_skips_expired() {
        let store = store().await;
        store.create(&paste(1, t0())).await.unwrap();
        let mut hidden = paste(2, t0() + Duration::seconds(1));
        hidden.listed = false;
        store.create(&hidden).await.unwrap();
        let mut gone = paste(3, t0() + Duration::seconds(2));
        gone.expiry = Some(t0() + Duration::seconds(5));
        store.create(&gone).await.unwrap();

        let now = t0() + Duration::seconds(5);
        let everything = store.list_all(false, now).await.unwrap();
        let ids: Vec<_> = everything.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![id(2), id(1)]);
        assert_eq!(everything[1].value, "paste 1");

        let listed: Vec<_> = store
            .list_all(true, now)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(listed, vec![id(1)]);
    }

    #[tokio::test]
    async fn duplicate_id_is_reported_and_not_written() {
        let store = store().await;
        store.create(&paste(1, t0())).await.unwrap();

        let mut clash = paste(1, t0() + Duration::seconds(1));
        clash.value = "other".into();
        let err = store.create(&clash).await.unwrap_err();
        assert!(matches!(err, PasteError::DuplicateId(dup) if dup == id(1)));
        assert_eq!(store.get(&id(1), t0()).await.unwrap().value, "paste 1");
    }

    #[tokio::test]
    async fn recent_excludes_unlisted_and_orders_newest_first() {
        let store = store().await;
        store.create(&paste(1, t0())).await.unwrap();
        store
            .create(&paste(2, t0() + Duration::seconds(2)))
            .await
            .unwrap();
        let mut hidden = paste(3, t0() + Duration::seconds(3));
        hidden.listed = false;
        store.create(&hidden).await.unwrap();
        store
            .create(&paste(4, t0() + Duration::seconds(1)))
            .await
            .unwrap();

        let now = t0() + Duration::seconds(10);
        let ids: Vec<_> = store
            .list_recent(10, 0, now)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![id(2), id(4), id(1)]);
        assert_eq!(store.count_recent(now).await.unwrap(), 3);

        let page: Vec<_> = store
            .list_recent(1, 1, now)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(page, vec![id(4)]);
    }

    #[tokio::test]
    async fn equal_timestamps_fall_back_to_insertion_order() {
        let store = store().await;
        for n in 1..=3 {
            store.create(&paste(n, t0())).await.unwrap();
        }
        let ids: Vec<_> = store
            .list_recent(10, 0, t0())
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![id(3), id(2), id(1)]);
    }

    #[tokio::test]
    async fn owned_listing_includes_unlisted_and_ignores_other_owners() {
        let store = store().await;
        let mut mine_hidden = paste(1, t0());
        mine_hidden.listed = false;
        store.create(&mine_hidden).await.unwrap();
        store
            .create(&paste(2, t0() + Duration::seconds(1)))
            .await
            .unwrap();
        let mut theirs = paste(3, t0() + Duration::seconds(2));
        theirs.owner = owner(2);
        store.create(&theirs).await.unwrap();

        let mine: Vec<_> = store
            .list_owned(&owner(1), 10, t0() + Duration::seconds(5))
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(mine, vec![id(2), id(1)]);

        let limited = store
            .list_owned(&owner(1), 1, t0() + Duration::seconds(5))
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }
}
