//! CLI subcommand implementations.

pub mod probe;
pub mod prune;
pub mod request;
