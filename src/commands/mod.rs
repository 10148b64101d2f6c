//! CLI command implementations.
//!
//! Each submodule maps to one subcommand and exposes a single `run`
//! function; everything of substance lives in the library modules.

pub mod audit;
pub mod dedupe;
pub mod migrate;
pub mod update;
