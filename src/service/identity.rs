//! Resolution of session principals to users.
//!
//! Session handling itself lives in the web layer. What reaches the core is the principal the
//! session carries: the signed-in user's ID, or nothing (or 0) when logged out.

use store::KvStore;

use crate::{error::AppError, model::user::User, service::user::UserService};

pub struct IdentityService<'a, S: KvStore> {
    store: &'a S,
}

impl<'a, S: KvStore> IdentityService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Resolves a principal to the live user it names.
    ///
    /// # Returns
    /// - `Ok(Some(User))` - The signed-in user
    /// - `Ok(None)` - Logged out, or the user was deleted since the session was issued
    /// - `Err(AppError)` - Store error or corrupt user record
    pub async fn current_user(&self, principal: Option<u64>) -> Result<Option<User>, AppError> {
        let Some(user_id) = principal.filter(|id| *id != 0) else {
            return Ok(None);
        };

        let user = UserService::new(self.store).find_user(user_id).await?;
        if user.is_none() {
            tracing::debug!("Session principal {} no longer exists", user_id);
        }
        Ok(user)
    }

    /// Like [`current_user`](Self::current_user), but requires someone to be signed in.
    ///
    /// # Returns
    /// - `Ok(User)` - The signed-in user
    /// - `Err(AppError::PermissionDenied)` - Nobody is signed in
    pub async fn require_user(&self, principal: Option<u64>) -> Result<User, AppError> {
        self.current_user(principal)
            .await?
            .ok_or_else(|| AppError::PermissionDenied("Not signed in".to_string()))
    }
}
