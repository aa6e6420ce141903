//! Repository adapters for users and products.
//!
//! Two interchangeable backends implement the `UserRepository` and
//! `ProductRepository` ports: an in-memory store for tests/dev and a
//! Postgres store for persistent deployments.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryProductRepository, InMemoryUserRepository};
pub use postgres::{PostgresProductRepository, PostgresUserRepository, ensure_schema};
