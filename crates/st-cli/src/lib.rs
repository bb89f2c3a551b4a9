//! Screentime CLI library.
//!
//! This crate provides record acquisition, persistence and the `st`
//! command-line interface on top of `st-core`.

mod cli;
pub mod commands;
mod config;
pub mod source;

pub use cli::{Cli, Commands, SourceArgs};
pub use config::Config;
