use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use stockroom_core::{Entity, ProductId, StoreError, StoreResult, UserId};
use stockroom_products::{Product, ProductRepository};
use stockroom_users::{User, UserRepository};

/// Insertion-ordered record table with a unique-name constraint.
///
/// Intended for tests/dev. Lookups are linear scans.
#[derive(Debug)]
struct Table<T> {
    label: &'static str,
    rows: RwLock<Vec<T>>,
}

impl<T> Table<T>
where
    T: Entity + Clone,
{
    fn new(label: &'static str) -> Self {
        Self {
            label,
            rows: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Vec<T>>> {
        self.rows
            .read()
            .map_err(|_| StoreError::backend(format!("{} table lock poisoned", self.label)))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Vec<T>>> {
        self.rows
            .write()
            .map_err(|_| StoreError::backend(format!("{} table lock poisoned", self.label)))
    }

    fn select(&self, predicate: impl Fn(&T) -> bool) -> StoreResult<Vec<T>> {
        Ok(self.read()?.iter().filter(|row| predicate(row)).cloned().collect())
    }

    fn find_one(&self, predicate: impl Fn(&T) -> bool) -> StoreResult<Option<T>> {
        Ok(self.read()?.iter().find(|row| predicate(row)).cloned())
    }

    fn upsert(&self, record: T) -> StoreResult<T> {
        let mut rows = self.write()?;
        let clash = rows
            .iter()
            .any(|row| row.id() != record.id() && row.name() == record.name());
        if clash {
            return Err(StoreError::unique(format!(
                "{}.name '{}' already exists",
                self.label,
                record.name()
            )));
        }

        match rows.iter_mut().find(|row| row.id() == record.id()) {
            Some(existing) => *existing = record.clone(),
            None => rows.push(record.clone()),
        }
        Ok(record)
    }

    fn remove(&self, id: T::Id) -> StoreResult<()> {
        self.write()?.retain(|row| row.id() != id);
        Ok(())
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// In-memory user store.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    table: Table<User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            table: Table::new("users"),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_all(&self) -> StoreResult<Vec<User>> {
        self.table.select(|_| true)
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        self.table.find_one(|u| u.id == id)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        self.table.find_one(|u| u.name == name)
    }

    async fn exists_by_id(&self, id: UserId) -> StoreResult<bool> {
        Ok(self.table.find_one(|u| u.id == id)?.is_some())
    }

    async fn save(&self, user: User) -> StoreResult<User> {
        self.table.upsert(user)
    }

    async fn delete_by_id(&self, id: UserId) -> StoreResult<()> {
        self.table.remove(id)
    }

    async fn delete(&self, user: &User) -> StoreResult<()> {
        self.table.remove(user.id)
    }
}

/// In-memory product store.
#[derive(Debug)]
pub struct InMemoryProductRepository {
    table: Table<Product>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            table: Table::new("products"),
        }
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_all(&self) -> StoreResult<Vec<Product>> {
        self.table.select(|_| true)
    }

    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
        self.table.find_one(|p| p.id == id)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Product>> {
        self.table.find_one(|p| p.name == name)
    }

    async fn exists_by_id(&self, id: ProductId) -> StoreResult<bool> {
        Ok(self.table.find_one(|p| p.id == id)?.is_some())
    }

    async fn save(&self, product: Product) -> StoreResult<Product> {
        self.table.upsert(product)
    }

    async fn delete_by_id(&self, id: ProductId) -> StoreResult<()> {
        self.table.remove(id)
    }

    async fn delete(&self, product: &Product) -> StoreResult<()> {
        self.table.remove(product.id)
    }

    async fn find_by_entry_date(&self, entry_date: NaiveDate) -> StoreResult<Vec<Product>> {
        self.table.select(|p| p.entry_date == entry_date)
    }

    async fn find_by_registered_by(&self, user_id: UserId) -> StoreResult<Vec<Product>> {
        self.table.select(|p| p.registered_by == user_id)
    }

    async fn find_by_name_containing(&self, name: &str) -> StoreResult<Vec<Product>> {
        self.table.select(|p| contains_ignore_case(&p.name, name))
    }

    async fn find_by_entry_date_and_registered_by(
        &self,
        entry_date: NaiveDate,
        user_id: UserId,
    ) -> StoreResult<Vec<Product>> {
        self.table
            .select(|p| p.entry_date == entry_date && p.registered_by == user_id)
    }

    async fn find_by_entry_date_and_name_containing(
        &self,
        entry_date: NaiveDate,
        name: &str,
    ) -> StoreResult<Vec<Product>> {
        self.table
            .select(|p| p.entry_date == entry_date && contains_ignore_case(&p.name, name))
    }

    async fn find_by_registered_by_and_name_containing(
        &self,
        user_id: UserId,
        name: &str,
    ) -> StoreResult<Vec<Product>> {
        self.table
            .select(|p| p.registered_by == user_id && contains_ignore_case(&p.name, name))
    }

    async fn find_by_entry_date_and_registered_by_and_name_containing(
        &self,
        entry_date: NaiveDate,
        user_id: UserId,
        name: &str,
    ) -> StoreResult<Vec<Product>> {
        self.table.select(|p| {
            p.entry_date == entry_date
                && p.registered_by == user_id
                && contains_ignore_case(&p.name, name)
        })
    }
}
