//! Infrastructure layer: repository adapters and configuration.

pub mod config;
pub mod store;

#[cfg(test)]
mod integration_tests;
