//! Product record, its input shapes and the read-only projection.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{Entity, ProductId, UserId};

/// A tracked inventory item.
///
/// # Invariants
/// - `name` is non-blank and unique across all products.
/// - `quantity` is strictly positive.
/// - `entry_date` was not in the future when it was set.
/// - `registered_by` is set once at creation and never changes.
/// - `last_modified_by` and `last_modified_at` are both absent until the
///   first update, then both present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub quantity: i64,
    pub entry_date: NaiveDate,
    pub registered_by: UserId,
    pub last_modified_by: Option<UserId>,
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Product {
    /// Whether `user_id` registered this product (and may therefore delete it).
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.registered_by == user_id
    }
}

/// Input for registering a new product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub entry_date: Option<NaiveDate>,
    #[serde(default)]
    pub registered_by_user_id: Option<UserId>,
}

/// Input for a full replacement update of a product.
///
/// Unlike user updates, name, quantity and entry date are all mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductChanges {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub entry_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_modified_by_user_id: Option<UserId>,
}

/// Denormalized, read-only view of a product.
///
/// User references are resolved to display names; a reference whose user is
/// unset or gone is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductView {
    pub id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub entry_date: NaiveDate,
    pub registered_by_name: Option<String>,
    pub last_modified_by_name: Option<String>,
    pub last_modification_date: Option<DateTime<Utc>>,
}
