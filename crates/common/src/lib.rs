//! Shared runtime helpers for the registry crates.

pub mod env;
pub mod utils;
