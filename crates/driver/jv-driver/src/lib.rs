//! Resolution driver and high-level APIs
//!
//! Ties the pipeline together for one entry file: parse, build scopes, resolve (following
//! relative `require` calls) and hand back the resolved tree with everything needed to
//! print or inspect it.

mod config;

pub use config::{CONFIG_FILE_NAME, Config, ConfigError};

use jv_parser::{ParseError, parse_source};
use jv_resolve::{Diagnostic, ModuleAnalysis, ResolutionContext, ResolveOptions};
use jv_span::FileId;
use jv_syntax::{Ast, NodeId};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a run produced no resolved tree
#[derive(Debug, Error)]
pub enum RunError {
    /// The entry file could not be read
    #[error("failed to read {}", path.display())]
    Read {
        /// Entry file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        error: io::Error,
    },
    /// The entry file does not parse
    #[error("failed to parse {}", path.display())]
    Parse {
        /// Entry file path
        path: PathBuf,
        /// Source text, kept for rendering the error
        text: String,
        /// First parse error
        #[source]
        error: ParseError,
    },
}

/// Final value of one global name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalValue {
    /// Name of the binding
    pub name: String,
    /// Generated text of the final known value, `None` when unknown
    pub value: Option<String>,
}

/// Result of resolving an entry file
#[derive(Debug)]
pub struct ResolvedTree {
    /// Syntax tree shared by the entry module and every module it required
    pub ast: Ast,
    /// The entry module
    pub module: ModuleAnalysis,
    /// Non-fatal problems reported during resolution
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedTree {
    /// Program node of the entry module
    pub fn root(&self) -> NodeId {
        self.module.root
    }

    /// Generated text of the resolved entry program
    pub fn generate(&self) -> String {
        jv_printer::generate(&self.ast, self.module.root)
    }

    /// End of the known-value chain of a global name
    pub fn global_value(&self, name: &str) -> Option<NodeId> {
        let global = self.module.scopes.global();
        let binding = self.module.scopes.lookup_str(&self.ast, global, name)?;
        self.module
            .scopes
            .value(&self.ast, binding)
            .and_then(|value| self.ast.final_value(value))
    }

    /// Declared globals followed by implicit ones, with their generated final values
    ///
    /// The injected `module` object is reported through [`Self::exports`] instead.
    pub fn globals(&self) -> Vec<GlobalValue> {
        let data = self.module.scopes.get(self.module.scopes.global());
        data.bindings
            .values()
            .chain(data.implicit.values())
            .filter(|binding| self.ast.name(binding.name) != "module")
            .map(|binding| {
                let name = self.ast.name(binding.name).to_string();
                let value = self
                    .global_value(&name)
                    .map(|value| jv_printer::generate(&self.ast, value));
                GlobalValue { name, value }
            })
            .collect()
    }

    /// Generated text of the module's exported value
    pub fn exports(&self) -> Option<String> {
        self.module
            .exports
            .map(|exports| jv_printer::generate(&self.ast, exports))
    }
}

/// Resolve `source` as the module at `path`
///
/// Relative `require` calls are followed from the directory of `path` when
/// `options.follow_requires` is set.
///
/// # Errors
///
/// Returns [`RunError::Parse`] if the source does not parse.
pub fn run(source: &str, options: ResolveOptions, path: &Path) -> Result<ResolvedTree, RunError> {
    let mut cx = ResolutionContext::new(options);
    let module = cx
        .analyze_source(source, path)
        .map_err(|error| RunError::Parse {
            path: path.to_path_buf(),
            text: source.to_string(),
            error,
        })?;
    tracing::debug!(
        path = %module.path.display(),
        diagnostics = cx.diagnostics().len(),
        "resolved entry module"
    );
    let diagnostics = cx.diagnostics().to_vec();
    Ok(ResolvedTree {
        ast: cx.into_ast(),
        module,
        diagnostics,
    })
}

/// Read `path` from disk and [`run`] it
///
/// # Errors
///
/// Returns [`RunError`] if the file cannot be read or does not parse.
pub fn run_file(path: &Path, options: ResolveOptions) -> Result<ResolvedTree, RunError> {
    let source = fs::read_to_string(path).map_err(|error| RunError::Read {
        path: path.to_path_buf(),
        error,
    })?;
    run(&source, options, path)
}

/// Parse `source` without resolving it, returning every syntax error
pub fn check(source: &str, name: &str) -> Vec<ParseError> {
    let mut ast = Ast::new();
    parse_source(&mut ast, FileId::new(0), name, source).errors
}
