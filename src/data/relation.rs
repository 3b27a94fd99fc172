//! Symmetric edges between users, and between users and interest tags.
//!
//! Both relation types are stored as a pair of listings, one per endpoint, and every edge
//! change writes both sides in one atomic batch so the pair never disagrees.

use store::{
    schema::{id_member, interest, user},
    KvStore, Mutation, WriteBatch,
};

use crate::{
    data::index::{IndexEntry, IndexRepository},
    error::AppError,
    util::parse::now,
};

/// The two listing entries making up one edge.
fn connection_edge(a: u64, b: u64) -> [IndexEntry; 2] {
    [
        IndexEntry::id(user::connections_key(a), b),
        IndexEntry::id(user::connections_key(b), a),
    ]
}

fn interest_edge(user_id: u64, tag: &str) -> [IndexEntry; 2] {
    [
        IndexEntry::member(user::interests_key(user_id), tag),
        IndexEntry::id(interest::users_key(tag), user_id),
    ]
}

/// Mutations linking `user_id` to each of `tags`.
pub fn tag_plan(user_id: u64, tags: &[String], score: i64) -> Vec<Mutation> {
    tags.iter()
        .flat_map(|tag| interest_edge(user_id, tag))
        .map(|entry| entry.add(score))
        .collect()
}

/// Mutations replacing a user's tags: every current edge is cleared, then `new_tags` written.
///
/// The user's own interest listing is deleted outright, so tags that were never mirrored in
/// `current_tags` cannot survive the replacement.
pub fn replace_tags_plan(
    user_id: u64,
    current_tags: &[String],
    new_tags: &[String],
    score: i64,
) -> Vec<Mutation> {
    let mut mutations = vec![Mutation::Delete {
        key: user::interests_key(user_id),
    }];
    mutations.extend(current_tags.iter().map(|tag| Mutation::SortedRemove {
        key: interest::users_key(tag),
        member: id_member(user_id),
    }));
    mutations.extend(tag_plan(user_id, new_tags, score));
    mutations
}

/// Mutations removing every edge touching `user_id`.
pub fn detach_plan(user_id: u64, neighbors: &[u64], tags: &[String]) -> Vec<Mutation> {
    let mut mutations: Vec<Mutation> = neighbors
        .iter()
        .map(|&neighbor| Mutation::SortedRemove {
            key: user::connections_key(neighbor),
            member: id_member(user_id),
        })
        .collect();
    mutations.push(Mutation::Delete {
        key: user::connections_key(user_id),
    });
    mutations.extend(replace_tags_plan(user_id, tags, &[], 0));
    mutations
}

/// Repository for the relation graph.
pub struct RelationRepository<'a, S: KvStore> {
    store: &'a S,
}

impl<'a, S: KvStore> RelationRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn index(&self) -> IndexRepository<'a, S> {
        IndexRepository::new(self.store)
    }

    /// Connects two users. Connecting an already connected pair refreshes the edge score.
    ///
    /// Both sides are written in one batch.
    pub async fn connect(&self, a: u64, b: u64) -> Result<(), AppError> {
        let score = now().timestamp();
        let batch: WriteBatch = connection_edge(a, b)
            .iter()
            .map(|entry| entry.add(score))
            .collect();

        self.store.apply(batch).await?;

        tracing::info!("Connected users {} and {}", a, b);
        Ok(())
    }

    /// Removes the edge between two users, if any.
    pub async fn disconnect(&self, a: u64, b: u64) -> Result<(), AppError> {
        let batch: WriteBatch = connection_edge(a, b)
            .iter()
            .map(IndexEntry::remove)
            .collect();

        self.store.apply(batch).await?;

        tracing::info!("Disconnected users {} and {}", a, b);
        Ok(())
    }

    /// IDs of every user connected to `user_id`, oldest connection first.
    pub async fn neighbors(&self, user_id: u64) -> Result<Vec<u64>, AppError> {
        self.index().all_ids(&user::connections_key(user_id)).await
    }

    /// Tests a single edge by membership, without reading the listing.
    pub async fn is_connected(&self, a: u64, b: u64) -> Result<bool, AppError> {
        self.index()
            .contains_id(&user::connections_key(a), b)
            .await
    }

    pub async fn tag_user(&self, user_id: u64, tag: &str) -> Result<(), AppError> {
        let batch: WriteBatch = tag_plan(user_id, &[tag.to_string()], now().timestamp())
            .into_iter()
            .collect();

        self.store.apply(batch).await?;

        tracing::info!("Tagged user {} with '{}'", user_id, tag);
        Ok(())
    }

    pub async fn untag_user(&self, user_id: u64, tag: &str) -> Result<(), AppError> {
        let batch: WriteBatch = interest_edge(user_id, tag)
            .iter()
            .map(IndexEntry::remove)
            .collect();

        self.store.apply(batch).await?;

        tracing::info!("Untagged user {} from '{}'", user_id, tag);
        Ok(())
    }

    /// A page of users tagged with `tag`, in tagging order.
    pub async fn users_by_tag(
        &self,
        tag: &str,
        offset: u64,
        count: i64,
    ) -> Result<Vec<u64>, AppError> {
        self.index()
            .range_ids(&interest::users_key(tag), offset, count)
            .await
    }

    /// Every user tagged with `tag`.
    pub async fn all_users_by_tag(&self, tag: &str) -> Result<Vec<u64>, AppError> {
        self.index().all_ids(&interest::users_key(tag)).await
    }

    /// Tags of a user. A user without an interest listing simply has no tags.
    pub async fn tags_of_user(&self, user_id: u64) -> Result<Vec<String>, AppError> {
        self.index()
            .range_all(&user::interests_key(user_id))
            .await
    }

    /// Replaces every tag of a user with `tags`.
    pub async fn replace_tags(&self, user_id: u64, tags: &[String]) -> Result<(), AppError> {
        let current = self.tags_of_user(user_id).await?;
        let batch: WriteBatch = replace_tags_plan(user_id, &current, tags, now().timestamp())
            .into_iter()
            .collect();

        self.store.apply(batch).await?;

        tracing::info!("Replaced tags of user {} ({} tag(s))", user_id, tags.len());
        Ok(())
    }
}
