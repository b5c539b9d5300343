//! Subcommand implementations.

pub mod config;
pub mod ops;
pub mod run;
