//! JavaScript syntax tree for static value resolution
//!
//! Nodes live in an [`Ast`] arena and refer to each other by [`NodeId`]. Besides its
//! syntactic fields every node has a known-value slot and, for object values, a shared
//! property list; both are filled in by the resolution engine.

mod ast;
mod kind;
mod pattern;

use anyhow::Result;
use jv_span::FileId;

pub use ast::{Ast, MAX_VALUE_CHAIN, Node, NodeId, PropertyList, PropertyListId, synthetic_span};
pub use kind::*;
pub use pattern::{Pattern, ShapePattern};

/// Trait for language front ends built on tree-sitter
pub trait Language: Send + Sync + 'static {
    /// Name of the language
    fn name(&self) -> &'static str;

    /// File extensions this language handles
    fn extensions(&self) -> &[&'static str];

    /// tree-sitter language instance
    fn tree_sitter_language(&self) -> tree_sitter::Language;

    /// Parse source code to concrete syntax tree
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar cannot be loaded or parsing is aborted
    fn parse(&self, source: &str) -> Result<tree_sitter::Tree>;

    /// Lower a concrete tree into `ast`, returning the program node
    fn lower(&self, tree: &tree_sitter::Tree, source: &str, file: FileId, ast: &mut Ast) -> NodeId;
}
