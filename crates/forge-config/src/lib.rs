//! Configuration management for itemforge
//!
//! This crate provides the configuration types, the layered loading logic
//! (defaults, TOML file, environment) and the tracing initialisation shared
//! by the generator and the CLI.

pub mod config;
pub mod logging;

// Re-export commonly used types at the crate root for convenience
pub use config::{
    AppConfig, CanonicalMembers, GeneratorConfig, LogFormat, LoggingConfig, MemberSignature,
    PathsConfig, PropertyRule, ValueKind, CONFIG_FILE_NAME, ENV_PREFIX,
};
