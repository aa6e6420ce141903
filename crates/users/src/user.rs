//! Employee record and its input/projection shapes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockroom_core::validate::{accept_not_future, accept_positive, accept_text};
use stockroom_core::{Entity, UserId};

/// An employee who registers and modifies products.
///
/// # Invariants
/// - `name` is non-blank and unique across all users (enforced by the rules + store).
/// - `age` is strictly positive.
/// - `hire_date` was not in the future when it was set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub age: i32,
    pub position: String,
    pub hire_date: NaiveDate,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl User {
    /// Overwrite every field the patch carries; leave the rest untouched.
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(hire_date) = patch.hire_date {
            self.hire_date = hire_date;
        }
    }
}

/// Inbound employee fields, shared by create and update.
///
/// Every field is optional on the wire: create rejects missing values,
/// update ignores them. A caller-supplied `id` is never honored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
}

/// The subset of a `UserInput` that is individually valid.
///
/// Built per field: a value is kept only if present and acceptable by the
/// same rule create applies (non-blank text, positive age, hire date not
/// after `today`). Anything else is dropped, not rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
}

impl UserPatch {
    pub fn from_input(input: &UserInput, today: NaiveDate) -> Self {
        Self {
            name: accept_text(input.name.as_deref()).map(str::to_owned),
            age: accept_positive(input.age),
            position: accept_text(input.position.as_deref()).map(str::to_owned),
            hire_date: accept_not_future(input.hire_date, today),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.position.is_none() && self.hire_date.is_none()
    }
}

/// Public projection of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub age: i32,
    pub position: String,
    pub hire_date: NaiveDate,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            age: user.age,
            position: user.position.clone(),
            hire_date: user.hire_date,
        }
    }
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            age: user.age,
            position: user.position,
            hire_date: user.hire_date,
        }
    }
}
