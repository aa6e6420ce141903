//! Products (inventory items) module.
//!
//! Business rules for products: validation, name uniqueness, ownership-based
//! deletion and the filtered search dispatch. Storage is reached only through
//! the `ProductRepository` and `UserRepository` ports.

pub mod filter;
pub mod product;
pub mod repository;
pub mod rules;

pub use filter::{ProductFilter, ProductSearch};
pub use product::{NewProduct, Product, ProductChanges, ProductView};
pub use repository::ProductRepository;
pub use rules::ProductRules;
