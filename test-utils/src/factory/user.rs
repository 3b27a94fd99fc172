//! User factory for creating test users.

use store::{
    schema::{field, id_member, interest, user, EntityKind},
    KvStore, Mutation, StoreError, WriteBatch,
};

use crate::factory::helpers::{allocate_id, next_id, now_seconds};

/// Factory for creating test users with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::user::UserFactory;
///
/// let user_id = UserFactory::new(&store)
///     .email("ada@example.com")
///     .interest("chess")
///     .build()
///     .await?;
/// ```
pub struct UserFactory<'a, S: KvStore> {
    store: &'a S,
    email: String,
    firstname: Option<String>,
    interests: Vec<String>,
    created_at: i64,
}

impl<'a, S: KvStore> UserFactory<'a, S> {
    /// Creates a new UserFactory with default values.
    ///
    /// Defaults:
    /// - email: `"user{n}@example.com"` where n is auto-incremented
    /// - firstname: none
    /// - interests: none
    /// - created_at: now
    ///
    /// # Arguments
    /// - `store` - Store to write the user to
    ///
    /// # Returns
    /// - `UserFactory` - New factory instance with defaults
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            email: format!("user{}@example.com", next_id()),
            firstname: None,
            interests: Vec::new(),
            created_at: now_seconds(),
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn firstname(mut self, firstname: impl Into<String>) -> Self {
        self.firstname = Some(firstname.into());
        self
    }

    /// Adds an interest tag, linked in both directions.
    pub fn interest(mut self, tag: impl Into<String>) -> Self {
        self.interests.push(tag.into());
        self
    }

    /// Sets the creation time, as unix seconds. Also used as the listing score.
    pub fn created_at(mut self, seconds: i64) -> Self {
        self.created_at = seconds;
        self
    }

    /// Builds and writes the user.
    ///
    /// # Returns
    /// - `Ok(u64)` - ID of the created user
    /// - `Err(StoreError)` - Store error during the write
    pub async fn build(self) -> Result<u64, StoreError> {
        let id = allocate_id(self.store, EntityKind::User).await?;

        let mut fields = vec![
            (field::ID.to_string(), id.to_string()),
            (user::EMAIL.to_string(), self.email.clone()),
            (field::CREATED_AT.to_string(), self.created_at.to_string()),
        ];
        if let Some(firstname) = self.firstname {
            fields.push((user::FIRSTNAME.to_string(), firstname));
        }

        let mut batch = WriteBatch::new();
        batch.push(Mutation::HashSet {
            key: EntityKind::User.record_key(id),
            fields,
        });
        batch.push(Mutation::SortedAdd {
            key: EntityKind::User.listing_key().to_string(),
            score: self.created_at,
            member: id_member(id),
        });
        batch.push(Mutation::Set {
            key: user::email_key(&self.email),
            value: id.to_string(),
        });
        for tag in &self.interests {
            batch.push(Mutation::SortedAdd {
                key: user::interests_key(id),
                score: self.created_at,
                member: tag.clone(),
            });
            batch.push(Mutation::SortedAdd {
                key: interest::users_key(tag),
                score: self.created_at,
                member: id_member(id),
            });
        }
        self.store.apply(batch).await?;

        Ok(id)
    }
}

/// Creates a user with default values.
///
/// Shorthand for `UserFactory::new(store).build().await`.
pub async fn create_user<S: KvStore>(store: &S) -> Result<u64, StoreError> {
    UserFactory::new(store).build().await
}

/// Creates a user with a specific email address.
pub async fn create_user_with_email<S: KvStore>(
    store: &S,
    email: &str,
) -> Result<u64, StoreError> {
    UserFactory::new(store).email(email).build().await
}
