//! Product search criteria and their normalized filter form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, UserId};

pub const FILTER_REQUIRED: &str =
    "at least one search filter is required (entry date, user or product name)";

/// Raw search criteria as supplied by the caller; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSearch {
    #[serde(default)]
    pub entry_date: Option<NaiveDate>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub product_name: Option<String>,
}

/// One of the seven non-empty combinations of search criteria.
///
/// Each variant carries exactly the fields its store query needs. The name
/// is a case-insensitive substring; the user id matches the registering user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductFilter {
    EntryDate(NaiveDate),
    RegisteredBy(UserId),
    NameContains(String),
    EntryDateAndRegisteredBy(NaiveDate, UserId),
    EntryDateAndNameContains(NaiveDate, String),
    RegisteredByAndNameContains(UserId, String),
    EntryDateAndRegisteredByAndNameContains(NaiveDate, UserId, String),
}

impl ProductFilter {
    /// Normalize raw criteria. A blank name counts as absent; no criteria at
    /// all is `InvalidInput`.
    pub fn from_search(search: ProductSearch) -> DomainResult<Self> {
        let name = search.product_name.filter(|n| !n.trim().is_empty());

        let filter = match (search.entry_date, search.user_id, name) {
            (Some(date), Some(user), Some(name)) => {
                Self::EntryDateAndRegisteredByAndNameContains(date, user, name)
            }
            (Some(date), Some(user), None) => Self::EntryDateAndRegisteredBy(date, user),
            (Some(date), None, Some(name)) => Self::EntryDateAndNameContains(date, name),
            (None, Some(user), Some(name)) => Self::RegisteredByAndNameContains(user, name),
            (Some(date), None, None) => Self::EntryDate(date),
            (None, Some(user), None) => Self::RegisteredBy(user),
            (None, None, Some(name)) => Self::NameContains(name),
            (None, None, None) => return Err(DomainError::invalid_input(FILTER_REQUIRED)),
        };
        Ok(filter)
    }

    /// The user the filter is scoped to, if any.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::RegisteredBy(user)
            | Self::EntryDateAndRegisteredBy(_, user)
            | Self::RegisteredByAndNameContains(user, _)
            | Self::EntryDateAndRegisteredByAndNameContains(_, user, _) => Some(*user),
            Self::EntryDate(_)
            | Self::NameContains(_)
            | Self::EntryDateAndNameContains(_, _) => None,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::EntryDate(_) => "entry_date",
            Self::RegisteredBy(_) => "user",
            Self::NameContains(_) => "name",
            Self::EntryDateAndRegisteredBy(_, _) => "entry_date+user",
            Self::EntryDateAndNameContains(_, _) => "entry_date+name",
            Self::RegisteredByAndNameContains(_, _) => "user+name",
            Self::EntryDateAndRegisteredByAndNameContains(_, _, _) => "entry_date+user+name",
        }
    }
}
