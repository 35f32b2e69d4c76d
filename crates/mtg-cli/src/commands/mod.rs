//! CLI subcommand implementations.

pub mod create;
pub mod next;
pub mod validate;
