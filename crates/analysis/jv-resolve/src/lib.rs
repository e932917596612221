//! Static, scope-aware value resolution for JavaScript programs
//!
//! Resolution walks a parsed module once, in evaluation order, and records for every
//! expression the node it statically evaluates to. Assignments propagate through
//! bindings, member accesses on known objects find or create the named property, and
//! `require` calls with relative specifiers are replaced by the required module's
//! exported value.
//!
//! ```ignore
//! let mut cx = ResolutionContext::new(ResolveOptions::default());
//! let module = cx.analyze_source("var a = 2; var b = a;", Path::new("/main.js"))?;
//! ```

mod context;
mod engine;
mod error;
mod module;
mod observer;

use serde::{Deserialize, Serialize};

pub use context::{ModuleAnalysis, ResolutionContext};
pub use error::{Diagnostic, DiagnosticKind, ModuleError, ResolveError};
pub use observer::Observer;

/// Default bound on nested node resolution
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 512;

/// Options for one resolution run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ResolveOptions {
    /// Whether `require('./relative')` calls are followed into other files
    pub follow_requires: bool,
    /// Nodes nested deeper than this are reported and left unresolved
    pub max_nesting_depth: usize,
    /// Bound on nested module analyses, unbounded when `None`
    pub max_module_depth: Option<usize>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            follow_requires: true,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_module_depth: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults_fill_missing_keys() {
        let options: ResolveOptions = toml::from_str("follow-requires = false").unwrap();
        assert_eq!(
            options,
            ResolveOptions {
                follow_requires: false,
                ..ResolveOptions::default()
            }
        );

        let options: ResolveOptions = toml::from_str("max-module-depth = 3").unwrap();
        assert!(options.follow_requires);
        assert_eq!(options.max_module_depth, Some(3));
        assert_eq!(options.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
    }
}
