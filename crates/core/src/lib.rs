//! `stockroom-core` — shared building blocks for the inventory rule layer.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the error model, a clock abstraction and field validators.

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod validate;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::Entity;
pub use error::{DomainError, DomainResult, StoreError, StoreResult};
pub use id::{ProductId, UserId};
