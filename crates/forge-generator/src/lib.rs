//! Idempotent AST-merge generator
//!
//! Turns item descriptors into C# `ModItem` classes and keeps hand-written
//! code in those classes intact across runs.
//!
//! Components, leaf first:
//! - [`synthesizer`] builds the canonical members from descriptor data
//! - [`locator`] finds the managed namespace and class in a parsed tree
//! - [`bootstrap`] adds a minimal skeleton to files that have none
//! - [`merger`] folds synthesized members into the class by name
//! - [`serializer`] rebuilds, renders and writes the tree
//!
//! [`generator::ItemGenerator`] runs them for one item and
//! [`batch::BatchRunner`] runs a whole descriptor directory.

pub mod batch;
pub mod bootstrap;
pub mod descriptor;
pub mod generator;
pub mod locator;
pub mod merger;
pub mod serializer;
pub mod synthesizer;

pub use batch::{BatchReport, BatchRunner, ItemReport};
pub use bootstrap::Bootstrapper;
pub use descriptor::Descriptor;
pub use generator::{GenerationOutcome, GenerationStatus, ItemGenerator};
pub use locator::Locator;
pub use merger::{ManagedMember, MergeAction, MergePolicy, MergeResult, Merger};
pub use serializer::Serializer;
pub use synthesizer::Synthesizer;
