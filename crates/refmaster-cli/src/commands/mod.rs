//! CLI command implementations.

pub mod analyze;
pub mod common;
pub mod master;
pub mod profiles;
