//! Recurring meeting agenda CLI library.
//!
//! This crate provides the CLI interface for filing agenda issues.

mod cli;
pub mod commands;
mod config;
pub mod error;
pub mod output;
pub mod service;

pub use cli::{Cli, Commands, CreateArgs, MeetingArgs, NextArgs};
pub use config::{Config, ConfigOverrides};
pub use error::MeetingError;
