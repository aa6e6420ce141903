//! Users (employees) module.
//!
//! Holds the employee record, its input/output shapes, the persistence port
//! and the rule component that validates and persists employees.

pub mod repository;
pub mod rules;
pub mod user;

pub use repository::UserRepository;
pub use rules::UserRules;
pub use user::{User, UserInput, UserPatch, UserView};
