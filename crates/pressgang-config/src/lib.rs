//! Pressgang Config
//!
//! This crate contains the option types for a publishing agent instance.
//! Options are a flat JSON object: string values are templates that get
//! rendered against each incoming event, everything else is a literal.
//!
//! Options are parsed from a JSON document with [`AgentOptions::from_json`]
//! or converted from an already parsed value.
//!
//! The agent merges [`default_options`] under the configured values, validates
//! the result once, and then resolves it fresh for every event.

mod defaults;
mod error;
mod options;

pub use defaults::{default_options, scaffold_options};
pub use error::ConfigError;
pub use options::{AgentOptions, REQUIRED_OPTIONS};
