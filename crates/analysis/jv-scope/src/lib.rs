//! Lexical scopes and value bindings
//!
//! A [`ScopeTree`] holds one global scope per module and one scope per function. Each
//! binding points at a canonical identifier node; that node's known-value slot is the
//! binding's current value, so every reference resolved to the binding shares it.

mod builder;
mod scope;

pub use builder::build_scopes;
pub use scope::{Binding, ScopeData, ScopeId, ScopeKind, ScopeTree};
