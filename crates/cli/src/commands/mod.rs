//! CLI subcommands.

pub mod contact;
pub mod env;
