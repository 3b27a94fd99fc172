//! User service for business logic.
//!
//! This module provides the `UserService` for registering, loading, editing and deleting
//! users, and for the relation graph around them: connections between users and the interest
//! tags used for discovery.

use store::{
    schema::{field, user, EntityKind},
    KvStore,
};

use crate::{
    data::{
        entity::EntityRepository,
        index::page_size,
        relation::{replace_tags_plan, tag_plan, RelationRepository},
    },
    error::{record::RecordError, AppError},
    model::user::{CreateUserParam, GetUserParam, UpdateUserParam, User},
    service::cascade::CascadePlanner,
    util::parse::now,
};

/// Service providing business logic for user management.
///
/// This struct holds a reference to the store handle and provides methods for the user
/// lifecycle, connections and interests.
pub struct UserService<'a, S: KvStore> {
    store: &'a S,
}

impl<'a, S: KvStore> UserService<'a, S> {
    /// Creates a new UserService instance.
    ///
    /// # Arguments
    /// - `store` - Reference to the store handle
    ///
    /// # Returns
    /// - `UserService` - New service instance
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Registers a new user together with their interest tags.
    ///
    /// The email address is claimed before anything else is written, so two registrations
    /// racing for the same address cannot both succeed.
    ///
    /// # Arguments
    /// - `param` - Email, optional credential hash, profile fields and interests
    ///
    /// # Returns
    /// - `Ok(User)` - The new user with its assigned ID and interests as stored
    /// - `Err(AppError::MissingRequiredField)` - Email is empty
    /// - `Err(AppError::BadRequest)` - An interest tag is blank
    /// - `Err(AppError::Conflict)` - Email is already registered
    /// - `Err(AppError::StoreErr)` - Store error during the write
    pub async fn insert_user(&self, param: CreateUserParam) -> Result<User, AppError> {
        let interests = param.interests.clone();

        let user = EntityRepository::new(self.store)
            .insert_with::<User, _>(param, |user| {
                tag_plan(user.id, &interests, user.created_at.timestamp())
            })
            .await?;

        // duplicates collapse in the tag set
        self.with_interests(user).await
    }

    /// Retrieves a user by ID or by email, including their interests.
    ///
    /// # Returns
    /// - `Ok(User)` - The user
    /// - `Err(AppError::NotFound)` - No live user matches
    /// - `Err(AppError::CorruptRecord)` - The stored record failed to decode
    /// - `Err(AppError::StoreErr)` - Store error during the read
    pub async fn get_user(&self, param: GetUserParam) -> Result<User, AppError> {
        let found = match &param {
            GetUserParam::Id(id) => self.find_user(*id).await?,
            GetUserParam::Email(email) => self.find_by_email(email).await?,
        };

        found.ok_or_else(|| match param {
            GetUserParam::Id(id) => AppError::NotFound(format!("User {} not found", id)),
            GetUserParam::Email(email) => {
                AppError::NotFound(format!("No user registered with email {}", email))
            }
        })
    }

    /// Loads a user by ID if they exist, including their interests.
    pub async fn find_user(&self, id: u64) -> Result<Option<User>, AppError> {
        match EntityRepository::new(self.store).find::<User>(id).await? {
            Some(user) => Ok(Some(self.with_interests(user).await?)),
            None => Ok(None),
        }
    }

    /// Resolves an email address through its unique reference.
    ///
    /// A reference whose user record is gone is treated as absent.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let key = user::email_key(email);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };
        let id = raw
            .parse::<u64>()
            .map_err(|source| RecordError::InvalidInteger {
                key,
                field: field::ID,
                value: raw.clone(),
                source,
            })?;

        let user = self.find_user(id).await?;
        if user.is_none() {
            tracing::warn!("Email reference for {} points at missing user {}", email, id);
        }
        Ok(user)
    }

    /// Updates the supplied fields of a user.
    ///
    /// Fields left as `None` are not written. Changing the email moves the email reference in
    /// the same batch; supplying `interests` replaces the whole tag set.
    ///
    /// # Returns
    /// - `Ok(User)` - The user as stored after the update
    /// - `Err(AppError::NotFound)` - No user with the ID exists
    /// - `Err(AppError::BadRequest)` - A replacement interest tag is blank
    /// - `Err(AppError::Conflict)` - The new email is already registered to another user
    /// - `Err(AppError::StoreErr)` - Store error during the read or write
    pub async fn update_user(&self, param: UpdateUserParam) -> Result<User, AppError> {
        let id = param.id;
        let relations = RelationRepository::new(self.store);

        let related = match &param.interests {
            Some(tags) => {
                let current = relations.tags_of_user(id).await?;
                replace_tags_plan(id, &current, tags, now().timestamp())
            }
            None => Vec::new(),
        };

        let updated = EntityRepository::new(self.store)
            .update_with::<User>(id, param, related)
            .await?;

        self.with_interests(updated).await
    }

    /// Deletes a user and everything that references them.
    ///
    /// Removes the record, the email reference, every connection edge on both sides, every
    /// interest tag, the user's bookings and the resources they own together with all
    /// bookings on those resources. Everything is committed as one batch.
    ///
    /// # Returns
    /// - `Ok(())` - The user and all dependent data were removed
    /// - `Err(AppError::NotFound)` - No user with the ID exists
    /// - `Err(AppError::StoreErr)` - Store error during the read or write
    pub async fn delete_user(&self, id: u64) -> Result<(), AppError> {
        let entities = EntityRepository::new(self.store);
        let user = entities.get::<User>(id).await?;

        let related = CascadePlanner::new(self.store).user(&user).await?;
        entities.delete_with(&user, related).await
    }

    /// Lists users in registration order, optionally only those carrying any of `tags`.
    ///
    /// With a tag filter the result is the union of the tags' listings, in the order the
    /// tags are given, without duplicates.
    ///
    /// # Arguments
    /// - `offset` - Number of users to skip
    /// - `count` - Page size; values of zero or less use the default page size
    /// - `tags` - Interest filter; empty means every user
    pub async fn list_users(
        &self,
        offset: u64,
        count: i64,
        tags: &[String],
    ) -> Result<Vec<User>, AppError> {
        let entities = EntityRepository::new(self.store);

        let users = if tags.is_empty() {
            entities
                .list::<User>(EntityKind::User.listing_key(), offset, count)
                .await?
        } else {
            let ids = self.tagged_ids(tags, None).await?;
            let page: Vec<u64> = ids
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(usize::try_from(page_size(count)).unwrap_or(usize::MAX))
                .collect();
            entities.load_many::<User>(&page).await?
        };

        tracing::debug!("Listed {} user(s)", users.len());
        self.with_interests_all(users).await
    }

    /// IDs of users carrying any of `tags`, deduplicated, optionally leaving one user out.
    async fn tagged_ids(
        &self,
        tags: &[String],
        exclude: Option<u64>,
    ) -> Result<Vec<u64>, AppError> {
        let relations = RelationRepository::new(self.store);

        let mut ids: Vec<u64> = Vec::new();
        for tag in tags {
            for id in relations.all_users_by_tag(tag).await? {
                if Some(id) != exclude && !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }

    /// Connects two users.
    ///
    /// # Returns
    /// - `Ok(())` - Both users now list each other as connections
    /// - `Err(AppError::BadRequest)` - A user cannot connect to themselves
    /// - `Err(AppError::NotFound)` - Either user does not exist
    /// - `Err(AppError::StoreErr)` - Store error during the write
    pub async fn connect_users(&self, a: u64, b: u64) -> Result<(), AppError> {
        if a == b {
            return Err(AppError::BadRequest(format!(
                "User {} cannot connect to themselves",
                a
            )));
        }

        let entities = EntityRepository::new(self.store);
        for id in [a, b] {
            if !entities.exists::<User>(id).await? {
                return Err(AppError::NotFound(format!("User {} not found", id)));
            }
        }

        RelationRepository::new(self.store).connect(a, b).await
    }

    /// Removes the connection between two users. Disconnecting an unconnected pair is a no-op.
    pub async fn disconnect_users(&self, a: u64, b: u64) -> Result<(), AppError> {
        RelationRepository::new(self.store).disconnect(a, b).await
    }

    /// Users connected to `user_id`, oldest connection first.
    ///
    /// Connections of the returned users are not loaded.
    pub async fn neighbors(&self, user_id: u64) -> Result<Vec<User>, AppError> {
        let ids = RelationRepository::new(self.store).neighbors(user_id).await?;
        let users = EntityRepository::new(self.store)
            .load_many::<User>(&ids)
            .await?;
        self.with_interests_all(users).await
    }

    pub async fn is_connected(&self, a: u64, b: u64) -> Result<bool, AppError> {
        RelationRepository::new(self.store).is_connected(a, b).await
    }

    /// Users sharing at least one interest with `user_id`, excluding the user themselves.
    ///
    /// # Returns
    /// - `Ok(Vec<User>)` - Up to `count` similar users (empty if the user has no interests)
    /// - `Err(AppError::NotFound)` - The user does not exist
    pub async fn similar_users(&self, user_id: u64, count: i64) -> Result<Vec<User>, AppError> {
        let user = self.get_user(GetUserParam::Id(user_id)).await?;

        let mut ids = self.tagged_ids(&user.interests, Some(user_id)).await?;
        ids.truncate(page_size(count) as usize);

        let users = EntityRepository::new(self.store)
            .load_many::<User>(&ids)
            .await?;
        self.with_interests_all(users).await
    }

    /// Returns the user registered with `param.email`, registering them first if needed.
    ///
    /// Used after a successful social login, where the identity provider vouches for the
    /// email address. If a concurrent call registers the same address first, its user is
    /// returned.
    pub async fn sign_in_or_register(&self, param: CreateUserParam) -> Result<User, AppError> {
        if let Some(existing) = self.find_by_email(&param.email).await? {
            tracing::debug!("Signed in existing user {}", existing.id);
            return Ok(existing);
        }

        let email = param.email.clone();
        match self.insert_user(param).await {
            Ok(user) => Ok(user),
            Err(AppError::Conflict(_)) => self.get_user(GetUserParam::Email(email)).await,
            Err(e) => Err(e),
        }
    }

    /// Adds an interest tag to an existing user.
    pub async fn tag_user(&self, user_id: u64, tag: &str) -> Result<(), AppError> {
        if tag.trim().is_empty() {
            return Err(AppError::BadRequest("Interest tag cannot be empty".to_string()));
        }
        if !EntityRepository::new(self.store).exists::<User>(user_id).await? {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        RelationRepository::new(self.store).tag_user(user_id, tag).await
    }

    pub async fn untag_user(&self, user_id: u64, tag: &str) -> Result<(), AppError> {
        RelationRepository::new(self.store).untag_user(user_id, tag).await
    }

    /// A page of users tagged with `tag`.
    pub async fn users_by_tag(
        &self,
        tag: &str,
        offset: u64,
        count: i64,
    ) -> Result<Vec<User>, AppError> {
        let ids = RelationRepository::new(self.store)
            .users_by_tag(tag, offset, count)
            .await?;
        let users = EntityRepository::new(self.store)
            .load_many::<User>(&ids)
            .await?;
        self.with_interests_all(users).await
    }

    pub async fn tags_of_user(&self, user_id: u64) -> Result<Vec<String>, AppError> {
        RelationRepository::new(self.store).tags_of_user(user_id).await
    }

    /// Whether an email address is registered, without loading the user.
    pub async fn email_taken(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.store.exists(&user::email_key(email)).await?)
    }

    async fn with_interests(&self, mut user: User) -> Result<User, AppError> {
        user.interests = RelationRepository::new(self.store)
            .tags_of_user(user.id)
            .await?;
        Ok(user)
    }

    async fn with_interests_all(&self, users: Vec<User>) -> Result<Vec<User>, AppError> {
        let mut loaded = Vec::with_capacity(users.len());
        for user in users {
            loaded.push(self.with_interests(user).await?);
        }
        Ok(loaded)
    }
}
