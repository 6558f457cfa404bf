//! CLI command implementations.

pub mod components;
pub mod run;
pub mod validate;
