//! Persistence port for employees.

use std::sync::Arc;

use async_trait::async_trait;

use stockroom_core::{StoreResult, UserId};

use crate::user::User;

/// Storage collaborator for users.
///
/// `save` is insert-or-update keyed by `User::id`. Implementations must
/// enforce name uniqueness themselves and report a clash as
/// `StoreError::UniqueViolation`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all(&self) -> StoreResult<Vec<User>>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Exact (case-sensitive) name lookup.
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<User>>;

    async fn exists_by_id(&self, id: UserId) -> StoreResult<bool>;

    async fn save(&self, user: User) -> StoreResult<User>;

    async fn delete_by_id(&self, id: UserId) -> StoreResult<()>;

    async fn delete(&self, user: &User) -> StoreResult<()>;
}

#[async_trait]
impl<S> UserRepository for Arc<S>
where
    S: UserRepository + ?Sized,
{
    async fn find_all(&self) -> StoreResult<Vec<User>> {
        (**self).find_all().await
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        (**self).find_by_id(id).await
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        (**self).find_by_name(name).await
    }

    async fn exists_by_id(&self, id: UserId) -> StoreResult<bool> {
        (**self).exists_by_id(id).await
    }

    async fn save(&self, user: User) -> StoreResult<User> {
        (**self).save(user).await
    }

    async fn delete_by_id(&self, id: UserId) -> StoreResult<()> {
        (**self).delete_by_id(id).await
    }

    async fn delete(&self, user: &User) -> StoreResult<()> {
        (**self).delete(user).await
    }
}
