//! CLI subcommand implementations.

pub mod analyze;
pub mod collect;
pub mod events;
pub mod export;
pub mod report;
pub mod sessions;
