//! Ordered listings of entity IDs.
//!
//! A listing is a sorted set scored by creation time. Entity IDs are stored zero-padded (see
//! [`store::schema::id_member`]) so that equal scores fall back to ID order.

use store::{
    schema::{id_member, parse_id_member},
    KvStore, Mutation, WriteBatch,
};

use crate::error::{record::RecordError, AppError};

/// Page size used when a caller asks for zero or a negative number of items.
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Normalises a caller-supplied count to a usable page size.
pub fn page_size(count: i64) -> i64 {
    if count <= 0 {
        DEFAULT_PAGE_SIZE
    } else {
        count
    }
}

/// Membership of one entity in one listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexEntry {
    /// Key of the listing.
    pub key: String,
    /// Member stored in the listing.
    pub member: String,
}

impl IndexEntry {
    /// Entry listing entity `id` under `key`.
    pub fn id(key: impl Into<String>, id: u64) -> Self {
        Self {
            key: key.into(),
            member: id_member(id),
        }
    }

    /// Entry listing an arbitrary member (a tag name) under `key`.
    pub fn member(key: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            member: member.into(),
        }
    }

    pub fn add(&self, score: i64) -> Mutation {
        Mutation::SortedAdd {
            key: self.key.clone(),
            score,
            member: self.member.clone(),
        }
    }

    pub fn remove(&self) -> Mutation {
        Mutation::SortedRemove {
            key: self.key.clone(),
            member: self.member.clone(),
        }
    }
}

/// Repository for reading and maintaining listings.
pub struct IndexRepository<'a, S: KvStore> {
    store: &'a S,
}

impl<'a, S: KvStore> IndexRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Adds entity `id` to the listing at `key` with the given score.
    pub async fn add(&self, key: &str, score: i64, id: u64) -> Result<(), AppError> {
        let mut batch = WriteBatch::new();
        batch.push(IndexEntry::id(key, id).add(score));
        self.store.apply(batch).await?;
        Ok(())
    }

    /// Removes entity `id` from the listing at `key`. Removing an absent ID is a no-op.
    pub async fn remove(&self, key: &str, id: u64) -> Result<(), AppError> {
        let mut batch = WriteBatch::new();
        batch.push(IndexEntry::id(key, id).remove());
        self.store.apply(batch).await?;
        Ok(())
    }

    /// Reads a page of raw members, ascending by score.
    ///
    /// # Arguments
    /// - `key` - Listing key
    /// - `offset` - Number of members to skip
    /// - `count` - Page size; values of zero or less use [`DEFAULT_PAGE_SIZE`]
    ///
    /// An offset past the end of the listing, however large, yields an empty page.
    pub async fn range(&self, key: &str, offset: u64, count: i64) -> Result<Vec<String>, AppError> {
        // Negative ranks count from the end, so an offset that doesn't fit must not wrap.
        let Ok(start) = isize::try_from(offset) else {
            return Ok(Vec::new());
        };
        let len = isize::try_from(page_size(count)).unwrap_or(isize::MAX);
        let stop = start.saturating_add(len - 1);

        let members = self.store.zrange(key, start, stop).await?;
        Ok(members)
    }

    /// Reads every member of a listing.
    pub async fn range_all(&self, key: &str) -> Result<Vec<String>, AppError> {
        let members = self.store.zrange(key, 0, -1).await?;
        Ok(members)
    }

    /// Reads a page of entity IDs, ascending by score then ID.
    ///
    /// # Returns
    /// - `Ok(Vec<u64>)` - IDs on the requested page (empty if the listing is absent)
    /// - `Err(AppError::CorruptRecord)` - The listing holds a member that is not an ID
    /// - `Err(AppError::StoreErr)` - Store error during the read
    pub async fn range_ids(&self, key: &str, offset: u64, count: i64) -> Result<Vec<u64>, AppError> {
        let members = self.range(key, offset, count).await?;
        decode_ids(key, members)
    }

    /// Reads every entity ID of a listing.
    pub async fn all_ids(&self, key: &str) -> Result<Vec<u64>, AppError> {
        let members = self.range_all(key).await?;
        decode_ids(key, members)
    }

    /// Tests membership without scanning the listing.
    pub async fn contains(&self, key: &str, member: &str) -> Result<bool, AppError> {
        Ok(self.store.zscore(key, member).await?.is_some())
    }

    /// Tests whether entity `id` is listed under `key`.
    pub async fn contains_id(&self, key: &str, id: u64) -> Result<bool, AppError> {
        self.contains(key, &id_member(id)).await
    }
}

fn decode_ids(key: &str, members: Vec<String>) -> Result<Vec<u64>, AppError> {
    members
        .into_iter()
        .map(|member| {
            parse_id_member(&member).ok_or_else(|| {
                AppError::from(RecordError::InvalidListingMember {
                    key: key.to_string(),
                    member,
                })
            })
        })
        .collect()
}
