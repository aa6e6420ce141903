//! User rule component: validation, name uniqueness, partial updates.

use std::sync::Arc;

use stockroom_core::validate::{require_not_future, require_positive, require_text};
use stockroom_core::{Clock, DomainError, DomainResult, SystemClock, UserId};

use crate::repository::UserRepository;
use crate::user::{User, UserInput, UserPatch, UserView};

pub const NAME_REQUIRED: &str = "user name must not be empty";
pub const AGE_NOT_POSITIVE: &str = "user age must be a positive number";
pub const POSITION_REQUIRED: &str = "user position must not be empty";
pub const HIRE_DATE_IN_FUTURE: &str = "hire date cannot be in the future";

pub fn user_not_found(id: UserId) -> DomainError {
    DomainError::not_found(format!("user not found with id: {id}"))
}

fn name_taken(name: &str) -> DomainError {
    DomainError::conflict(format!("a user named '{name}' already exists"))
}

/// Stateless rule component for employees.
///
/// Every call reloads what it needs from the repository; nothing is cached.
#[derive(Clone)]
pub struct UserRules<R> {
    users: R,
    clock: Arc<dyn Clock>,
}

impl<R> UserRules<R>
where
    R: UserRepository,
{
    pub fn new(users: R) -> Self {
        Self {
            users,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn list(&self) -> DomainResult<Vec<UserView>> {
        let users = self.users.find_all().await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    pub async fn get(&self, id: UserId) -> DomainResult<UserView> {
        self.users
            .find_by_id(id)
            .await?
            .map(UserView::from)
            .ok_or_else(|| user_not_found(id))
    }

    /// Validate and persist a new employee under a freshly assigned id.
    ///
    /// Checks run in a fixed order (name, age, position, hire date, then
    /// uniqueness); the first failure is reported.
    pub async fn create(&self, input: UserInput) -> DomainResult<UserView> {
        let today = self.clock.today();
        let name = require_text(input.name.as_deref(), NAME_REQUIRED)?;
        let age = require_positive(input.age, AGE_NOT_POSITIVE)?;
        let position = require_text(input.position.as_deref(), POSITION_REQUIRED)?;
        let hire_date = require_not_future(input.hire_date, today, HIRE_DATE_IN_FUTURE)?;

        if self.users.find_by_name(name).await?.is_some() {
            return Err(name_taken(name));
        }

        let user = User {
            id: UserId::new(),
            name: name.to_owned(),
            age,
            position: position.to_owned(),
            hire_date,
        };
        let saved = self.users.save(user).await?;
        tracing::info!(user_id = %saved.id, "user created");
        Ok(saved.into())
    }

    /// Apply every individually valid field of `input` to an existing user.
    ///
    /// Absent or invalid fields are retained, never rejected. The only
    /// failures are a missing target and a name that belongs to another user.
    pub async fn update(&self, id: UserId, input: UserInput) -> DomainResult<UserView> {
        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| user_not_found(id))?;

        let patch = UserPatch::from_input(&input, self.clock.today());

        if let Some(name) = patch.name.as_deref() {
            if name != user.name {
                if let Some(other) = self.users.find_by_name(name).await? {
                    if other.id != user.id {
                        return Err(name_taken(name));
                    }
                }
            }
        }

        if patch.is_empty() {
            tracing::debug!(user_id = %id, "user update carried no applicable fields");
        }
        user.apply(patch);
        self.users.save(user).await?;
        tracing::info!(user_id = %id, "user updated");

        self.get(id).await
    }

    pub async fn delete(&self, id: UserId) -> DomainResult<()> {
        if !self.users.exists_by_id(id).await? {
            return Err(user_not_found(id));
        }
        self.users.delete_by_id(id).await?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }
}
