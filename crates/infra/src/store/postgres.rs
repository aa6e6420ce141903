//! Postgres-backed repositories.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `UniqueViolation` | Name already taken (lost a create/rename race) |
//! | Database (foreign key violation) | `23503` | `Backend` | Deleting a user still referenced by products |
//! | Database (other) | Any other | `Backend` | Check constraints, permissions, ... |
//! | Other | N/A | `Backend` | Pool closed, network errors, decode failures |
//!
//! Name substring searches use `ILIKE` with the input's `%`, `_` and `\`
//! escaped, so the needle is matched literally.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use stockroom_core::{ProductId, StoreError, StoreResult, UserId};
use stockroom_products::{Product, ProductRepository};
use stockroom_users::{User, UserRepository};

const SCHEMA: &str = include_str!("schema.sql");

const USER_COLUMNS: &str = "id, name, age, position, hire_date";

const PRODUCT_COLUMNS: &str = "id, product_name, quantity, entry_date, registered_by_user_id, \
     last_modified_by_user_id, last_modification_date";

/// Create the `users` and `products` tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> StoreResult<()> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    Ok(())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::UniqueViolation(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

/// Turn a user-supplied substring into a literal `ILIKE` pattern.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn select_products_where(clause: &str) -> String {
    format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE {clause} ORDER BY id")
}

// SQLx row types

#[derive(Debug)]
struct UserRow {
    id: Uuid,
    name: String,
    age: i32,
    position: String,
    hire_date: NaiveDate,
}

impl<'r> FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            age: row.try_get("age")?,
            position: row.try_get("position")?,
            hire_date: row.try_get("hire_date")?,
        })
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::from_uuid(row.id),
            name: row.name,
            age: row.age,
            position: row.position,
            hire_date: row.hire_date,
        }
    }
}

#[derive(Debug)]
struct ProductRow {
    id: Uuid,
    product_name: String,
    quantity: i64,
    entry_date: NaiveDate,
    registered_by_user_id: Uuid,
    last_modified_by_user_id: Option<Uuid>,
    last_modification_date: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            product_name: row.try_get("product_name")?,
            quantity: row.try_get("quantity")?,
            entry_date: row.try_get("entry_date")?,
            registered_by_user_id: row.try_get("registered_by_user_id")?,
            last_modified_by_user_id: row.try_get("last_modified_by_user_id")?,
            last_modification_date: row.try_get("last_modification_date")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::from_uuid(row.id),
            name: row.product_name,
            quantity: row.quantity,
            entry_date: row.entry_date,
            registered_by: UserId::from_uuid(row.registered_by_user_id),
            last_modified_by: row.last_modified_by_user_id.map(UserId::from_uuid),
            last_modified_at: row.last_modification_date,
        }
    }
}

/// Postgres user store over the `users` table.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: Arc<PgPool>,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self), err)]
    async fn find_all(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("users.find_all", e))?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("users.find_by_id", e))?;
        Ok(row.map(User::from))
    }

    #[instrument(skip(self), err)]
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("users.find_by_name", e))?;
        Ok(row.map(User::from))
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn exists_by_id(&self, id: UserId) -> StoreResult<bool> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1) AS present")
            .bind(id.as_uuid())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("users.exists_by_id", e))?;
        row.try_get("present")
            .map_err(|e| map_sqlx_error("users.exists_by_id", e))
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn save(&self, user: User) -> StoreResult<User> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, age, position, hire_date)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                age = EXCLUDED.age,
                position = EXCLUDED.position,
                hire_date = EXCLUDED.hire_date
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(user.age)
        .bind(&user.position)
        .bind(user.hire_date)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("users.save", e))?;
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn delete_by_id(&self, id: UserId) -> StoreResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("users.delete_by_id", e))?;
        Ok(())
    }

    async fn delete(&self, user: &User) -> StoreResult<()> {
        self.delete_by_id(user.id).await
    }
}

/// Postgres product store over the `products` table.
#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: Arc<PgPool>,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    async fn fetch_many(
        &self,
        operation: &str,
        query: sqlx::query::QueryAs<'_, sqlx::Postgres, ProductRow, sqlx::postgres::PgArguments>,
    ) -> StoreResult<Vec<Product>> {
        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    #[instrument(skip(self), err)]
    async fn find_all(&self) -> StoreResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");
        self.fetch_many("products.find_all", sqlx::query_as(&sql)).await
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("products.find_by_id", e))?;
        Ok(row.map(Product::from))
    }

    #[instrument(skip(self), err)]
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_name = $1"
        ))
        .bind(name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("products.find_by_name", e))?;
        Ok(row.map(Product::from))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn exists_by_id(&self, id: ProductId) -> StoreResult<bool> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1) AS present")
            .bind(id.as_uuid())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("products.exists_by_id", e))?;
        row.try_get("present")
            .map_err(|e| map_sqlx_error("products.exists_by_id", e))
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn save(&self, product: Product) -> StoreResult<Product> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, product_name, quantity, entry_date, registered_by_user_id,
                last_modified_by_user_id, last_modification_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                product_name = EXCLUDED.product_name,
                quantity = EXCLUDED.quantity,
                entry_date = EXCLUDED.entry_date,
                last_modified_by_user_id = EXCLUDED.last_modified_by_user_id,
                last_modification_date = EXCLUDED.last_modification_date
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.quantity)
        .bind(product.entry_date)
        .bind(product.registered_by.as_uuid())
        .bind(product.last_modified_by.map(Uuid::from))
        .bind(product.last_modified_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("products.save", e))?;
        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete_by_id(&self, id: ProductId) -> StoreResult<()> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("products.delete_by_id", e))?;
        Ok(())
    }

    async fn delete(&self, product: &Product) -> StoreResult<()> {
        self.delete_by_id(product.id).await
    }

    #[instrument(skip(self), err)]
    async fn find_by_entry_date(&self, entry_date: NaiveDate) -> StoreResult<Vec<Product>> {
        let sql = select_products_where("entry_date = $1");
        self.fetch_many(
            "products.find_by_entry_date",
            sqlx::query_as(&sql).bind(entry_date),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn find_by_registered_by(&self, user_id: UserId) -> StoreResult<Vec<Product>> {
        let sql = select_products_where("registered_by_user_id = $1");
        self.fetch_many(
            "products.find_by_registered_by",
            sqlx::query_as(&sql).bind(*user_id.as_uuid()),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn find_by_name_containing(&self, name: &str) -> StoreResult<Vec<Product>> {
        let sql = select_products_where("product_name ILIKE $1");
        self.fetch_many(
            "products.find_by_name_containing",
            sqlx::query_as(&sql).bind(like_pattern(name)),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn find_by_entry_date_and_registered_by(
        &self,
        entry_date: NaiveDate,
        user_id: UserId,
    ) -> StoreResult<Vec<Product>> {
        let sql = select_products_where("entry_date = $1 AND registered_by_user_id = $2");
        self.fetch_many(
            "products.find_by_entry_date_and_registered_by",
            sqlx::query_as(&sql)
                .bind(entry_date)
                .bind(*user_id.as_uuid()),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn find_by_entry_date_and_name_containing(
        &self,
        entry_date: NaiveDate,
        name: &str,
    ) -> StoreResult<Vec<Product>> {
        let sql = select_products_where("entry_date = $1 AND product_name ILIKE $2");
        self.fetch_many(
            "products.find_by_entry_date_and_name_containing",
            sqlx::query_as(&sql)
                .bind(entry_date)
                .bind(like_pattern(name)),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn find_by_registered_by_and_name_containing(
        &self,
        user_id: UserId,
        name: &str,
    ) -> StoreResult<Vec<Product>> {
        let sql = select_products_where("registered_by_user_id = $1 AND product_name ILIKE $2");
        self.fetch_many(
            "products.find_by_registered_by_and_name_containing",
            sqlx::query_as(&sql)
                .bind(*user_id.as_uuid())
                .bind(like_pattern(name)),
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn find_by_entry_date_and_registered_by_and_name_containing(
        &self,
        entry_date: NaiveDate,
        user_id: UserId,
        name: &str,
    ) -> StoreResult<Vec<Product>> {
        let sql = select_products_where(
            "entry_date = $1 AND registered_by_user_id = $2 AND product_name ILIKE $3",
        );
        self.fetch_many(
            "products.find_by_entry_date_and_registered_by_and_name_containing",
            sqlx::query_as(&sql)
                .bind(entry_date)
                .bind(*user_id.as_uuid())
                .bind(like_pattern(name)),
        )
        .await
    }
}
