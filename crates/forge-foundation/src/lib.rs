//! Foundation Layer - Core types shared by every itemforge crate
//!
//! - [`error`] - the `ForgeError` enum and `ForgeResult` alias
//! - [`naming`] - item id to C# identifier conversion and identifier validation

pub mod error;
pub mod naming;

// Re-export commonly used types for convenience
pub use error::{ForgeError, ForgeResult, SourceLocation};
