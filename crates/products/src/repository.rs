//! Persistence port for products.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use stockroom_core::{ProductId, StoreResult, UserId};

use crate::product::Product;

/// Storage collaborator for products.
///
/// Every search method is a dedicated store-side query; the rule layer never
/// filters in memory. `name` arguments are case-insensitive substrings.
/// Results come back in the store's natural order.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_all(&self) -> StoreResult<Vec<Product>>;

    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Product>>;

    /// Exact (case-sensitive) name lookup.
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Product>>;

    async fn exists_by_id(&self, id: ProductId) -> StoreResult<bool>;

    /// Insert-or-update keyed by `Product::id`; a name clash is
    /// `StoreError::UniqueViolation`.
    async fn save(&self, product: Product) -> StoreResult<Product>;

    async fn delete_by_id(&self, id: ProductId) -> StoreResult<()>;

    async fn delete(&self, product: &Product) -> StoreResult<()>;

    async fn find_by_entry_date(&self, entry_date: NaiveDate) -> StoreResult<Vec<Product>>;

    async fn find_by_registered_by(&self, user_id: UserId) -> StoreResult<Vec<Product>>;

    async fn find_by_name_containing(&self, name: &str) -> StoreResult<Vec<Product>>;

    async fn find_by_entry_date_and_registered_by(
        &self,
        entry_date: NaiveDate,
        user_id: UserId,
    ) -> StoreResult<Vec<Product>>;

    async fn find_by_entry_date_and_name_containing(
        &self,
        entry_date: NaiveDate,
        name: &str,
    ) -> StoreResult<Vec<Product>>;

    async fn find_by_registered_by_and_name_containing(
        &self,
        user_id: UserId,
        name: &str,
    ) -> StoreResult<Vec<Product>>;

    async fn find_by_entry_date_and_registered_by_and_name_containing(
        &self,
        entry_date: NaiveDate,
        user_id: UserId,
        name: &str,
    ) -> StoreResult<Vec<Product>>;
}

#[async_trait]
impl<S> ProductRepository for Arc<S>
where
    S: ProductRepository + ?Sized,
{
    async fn find_all(&self) -> StoreResult<Vec<Product>> {
        (**self).find_all().await
    }

    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
        (**self).find_by_id(id).await
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Product>> {
        (**self).find_by_name(name).await
    }

    async fn exists_by_id(&self, id: ProductId) -> StoreResult<bool> {
        (**self).exists_by_id(id).await
    }

    async fn save(&self, product: Product) -> StoreResult<Product> {
        (**self).save(product).await
    }

    async fn delete_by_id(&self, id: ProductId) -> StoreResult<()> {
        (**self).delete_by_id(id).await
    }

    async fn delete(&self, product: &Product) -> StoreResult<()> {
        (**self).delete(product).await
    }

    async fn find_by_entry_date(&self, entry_date: NaiveDate) -> StoreResult<Vec<Product>> {
        (**self).find_by_entry_date(entry_date).await
    }

    async fn find_by_registered_by(&self, user_id: UserId) -> StoreResult<Vec<Product>> {
        (**self).find_by_registered_by(user_id).await
    }

    async fn find_by_name_containing(&self, name: &str) -> StoreResult<Vec<Product>> {
        (**self).find_by_name_containing(name).await
    }

    async fn find_by_entry_date_and_registered_by(
        &self,
        entry_date: NaiveDate,
        user_id: UserId,
    ) -> StoreResult<Vec<Product>> {
        (**self).find_by_entry_date_and_registered_by(entry_date, user_id).await
    }

    async fn find_by_entry_date_and_name_containing(
        &self,
        entry_date: NaiveDate,
        name: &str,
    ) -> StoreResult<Vec<Product>> {
        (**self).find_by_entry_date_and_name_containing(entry_date, name).await
    }

    async fn find_by_registered_by_and_name_containing(
        &self,
        user_id: UserId,
        name: &str,
    ) -> StoreResult<Vec<Product>> {
        (**self).find_by_registered_by_and_name_containing(user_id, name).await
    }

    async fn find_by_entry_date_and_registered_by_and_name_containing(
        &self,
        entry_date: NaiveDate,
        user_id: UserId,
        name: &str,
    ) -> StoreResult<Vec<Product>> {
        (**self)
            .find_by_entry_date_and_registered_by_and_name_containing(entry_date, user_id, name)
            .await
    }
}
