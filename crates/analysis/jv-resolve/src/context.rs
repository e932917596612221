//! Run-wide resolution state

use crate::engine::Resolver;
use crate::error::{Diagnostic, ResolveError};
use crate::module;
use crate::{Observer, ResolveOptions};
use jv_parser::{ParseError, parse_source};
use jv_scope::{ScopeId, ScopeTree, build_scopes};
use jv_span::{FileId, LineIndex};
use jv_syntax::{Ast, NodeId, synthetic_span};
use jv_vfs::{NodeModuleResolver, VirtualFileSystem, resolve::normalize};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{self, Path, PathBuf};
use tracing::warn;

/// One analyzed module
#[derive(Debug, Clone)]
pub struct ModuleAnalysis {
    /// File id of the module's nodes
    pub file: FileId,
    /// Normalized absolute path
    pub path: PathBuf,
    /// Program node
    pub root: NodeId,
    /// Scopes and bindings of the module
    pub scopes: ScopeTree,
    /// Exported value, when one could be determined
    pub exports: Option<NodeId>,
}

#[derive(Debug)]
struct SourceInfo {
    name: String,
    line_index: LineIndex,
}

/// State shared by every module pulled into one run
///
/// Owns the syntax tree all modules are parsed into, so values exported by one module
/// can be referenced from another. The visited set guarantees each path is analyzed at
/// most once.
pub struct ResolutionContext<'obs> {
    pub(crate) ast: Ast,
    pub(crate) vfs: VirtualFileSystem,
    pub(crate) module_resolver: NodeModuleResolver,
    pub(crate) options: ResolveOptions,
    pub(crate) visited: FxHashSet<PathBuf>,
    pub(crate) module_depth: usize,
    observer: Option<Box<dyn Observer + 'obs>>,
    sources: FxHashMap<FileId, SourceInfo>,
    diagnostics: Vec<Diagnostic>,
}

impl<'obs> ResolutionContext<'obs> {
    /// Create a context reading modules from disk
    pub fn new(options: ResolveOptions) -> Self {
        Self::with_vfs(VirtualFileSystem::new(), options)
    }

    /// Create a context over `vfs`; in-memory files take part in module lookup
    pub fn with_vfs(vfs: VirtualFileSystem, options: ResolveOptions) -> Self {
        Self {
            ast: Ast::new(),
            module_resolver: NodeModuleResolver::new(vfs.clone()),
            vfs,
            options,
            visited: FxHashSet::default(),
            module_depth: 0,
            observer: None,
            sources: FxHashMap::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Install an observer called for every resolved node
    #[must_use]
    pub fn with_observer(mut self, observer: impl Observer + 'obs) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// The shared syntax tree
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Consume the context, keeping the syntax tree
    pub fn into_ast(self) -> Ast {
        self.ast
    }

    /// Options of this run
    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// File system modules are read from
    pub fn vfs(&self) -> &VirtualFileSystem {
        &self.vfs
    }

    /// Non-fatal problems reported so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether `path` was analyzed in this run
    pub fn is_visited(&self, path: &Path) -> bool {
        self.visited.contains(&normalize(path))
    }

    /// Display name of a file, as used in diagnostics
    pub fn file_name(&self, file: FileId) -> Option<&str> {
        self.sources.get(&file).map(|info| info.name.as_str())
    }

    /// Line index of a parsed file
    pub fn line_index(&self, file: FileId) -> Option<&LineIndex> {
        self.sources.get(&file).map(|info| &info.line_index)
    }

    /// Parse, scope and resolve `source` as the module at `path`
    ///
    /// The path is recorded as visited, so modules requiring it back stop there.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] if the source does not parse.
    pub fn analyze_source(&mut self, source: &str, path: &Path) -> Result<ModuleAnalysis, ParseError> {
        let path = normalize(&path::absolute(path).unwrap_or_else(|_| path.to_path_buf()));
        let file = self
            .vfs
            .add_file(&path, source)
            .map_err(|err| ParseError::IoError {
                message: err.to_string(),
            })?;
        self.visited.insert(path.clone());
        self.analyze(file, path, source)
    }

    /// Resolve an analyzed module again
    ///
    /// Every rule only rewrites what it already computed, so repeating the pass leaves
    /// all known values unchanged.
    pub fn resolve_module(&mut self, module: &mut ModuleAnalysis) {
        let global = module.scopes.global();
        let root = {
            let mut resolver = Resolver::new(self, module.file, &module.path, &mut module.scopes);
            resolver.resolve(global, module.root)
        };
        module.root = root;
        module.exports = module::exports(&self.ast, &module.scopes);
    }

    pub(crate) fn analyze(
        &mut self,
        file: FileId,
        path: PathBuf,
        source: &str,
    ) -> Result<ModuleAnalysis, ParseError> {
        let name = path.display().to_string();
        let parsed = parse_source(&mut self.ast, file, &name, source);
        self.sources.insert(
            file,
            SourceInfo {
                name,
                line_index: parsed.line_index.clone(),
            },
        );
        let root = parsed.into_root()?;

        let mut scopes = build_scopes(&self.ast, root);
        self.inject_module(&mut scopes, file);

        let mut module = ModuleAnalysis {
            file,
            path,
            root,
            scopes,
            exports: None,
        };
        self.resolve_module(&mut module);
        Ok(module)
    }

    /// Bind the implicit `module` global to `{ exports: {} }`
    fn inject_module(&mut self, scopes: &mut ScopeTree, file: FileId) {
        let span = synthetic_span(file);
        let key = self.ast.alloc_identifier("exports", span);
        let exports = self.ast.alloc_object(Vec::new(), span);
        let property = self.ast.alloc_property(key, exports, span);
        let object = self.ast.alloc_object(vec![property], span);

        let module = self.ast.alloc_identifier("module", span);
        self.ast.set_value(module, object);
        if let Some(list) = self.ast.property_list(object) {
            self.ast.share_properties(module, list);
        }

        let name = self.ast.intern("module");
        let global = scopes.global();
        scopes.declare_implicit(global, name, module);
    }

    pub(crate) fn notify(&mut self, scope: ScopeId, node: NodeId) {
        if let Some(observer) = &mut self.observer {
            observer.on_resolved(&self.ast, scope, node);
        }
    }

    pub(crate) fn report(&mut self, error: &ResolveError) {
        let span = error.span();
        let (file, position) = match self.sources.get(&span.file) {
            Some(info) => (info.name.clone(), info.line_index.line_col(span.span.start)),
            None => ("<unknown>".to_string(), LineIndex::new("").line_col(0)),
        };
        warn!("{file}:{}: {error}", position.line);
        self.diagnostics.push(Diagnostic {
            kind: error.kind(),
            message: error.to_string(),
            file,
            line: position.line,
            column: position.column,
        });
    }
}
