//! Rule components and the repository backend behind them.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use stockroom_core::Clock;
use stockroom_infra::config::{Settings, StoreBackend};
use stockroom_infra::store::{
    InMemoryProductRepository, InMemoryUserRepository, PostgresProductRepository,
    PostgresUserRepository, ensure_schema,
};
use stockroom_products::{ProductRepository, ProductRules};
use stockroom_users::{UserRepository, UserRules};

pub type DynUserRepository = Arc<dyn UserRepository>;
pub type DynProductRepository = Arc<dyn ProductRepository>;

#[derive(Clone)]
pub struct AppServices {
    pub users: UserRules<DynUserRepository>,
    pub products: ProductRules<DynProductRepository, DynUserRepository>,
}

impl AppServices {
    pub fn new(users: DynUserRepository, products: DynProductRepository) -> Self {
        Self {
            users: UserRules::new(users.clone()),
            products: ProductRules::new(products, users),
        }
    }

    /// Swap the time source of both rule components.
    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: self.users.with_clock(clock.clone()),
            products: self.products.with_clock(clock),
        }
    }
}

/// Fresh in-memory stores (dev/test).
pub fn in_memory_services() -> AppServices {
    AppServices::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryProductRepository::new()),
    )
}

pub async fn build_services(settings: &Settings) -> anyhow::Result<AppServices> {
    match &settings.store {
        StoreBackend::InMemory => {
            tracing::info!("using in-memory stores");
            Ok(in_memory_services())
        }
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(database_url)
                .await
                .context("failed to connect to Postgres")?;
            ensure_schema(&pool)
                .await
                .context("failed to apply database schema")?;
            tracing::info!(max_connections, "using Postgres stores");

            Ok(AppServices::new(
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresProductRepository::new(pool)),
            ))
        }
    }
}
