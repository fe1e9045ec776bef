//! C# language support for itemforge
//!
//! This crate turns C# source text into a [`SourceTree`], a value-typed
//! structural model that the generator can navigate and rebuild, and renders
//! trees back to text with a canonical, idempotent layout.
//!
//! - [`syntax`] - tree node types and identity-based replacement
//! - [`verbatim`] - source-preserving text blocks and attached trivia
//! - [`parser`] - tree-sitter backed parsing into a [`SourceTree`]
//! - [`printer`] - canonical formatting of a [`SourceTree`]

pub mod parser;
pub mod printer;
pub mod syntax;
pub mod verbatim;

pub use parser::{parse_source, CsharpParser};
pub use printer::Printer;
pub use syntax::{
    Block, ClassNode, ClassPosition, Expression, Literal, LiteralKind, MemberBody, MemberKind,
    MemberNode, MethodBody, MethodDecl, NamespaceNode, NamespaceStyle, OpaqueNode, SourceTree,
    Statement, StatementKind, TopLevelItem, TopLevelKind, TypeMember, TypeMemberKind,
    UsingDirective,
};
pub use verbatim::{Trivia, Verbatim};
