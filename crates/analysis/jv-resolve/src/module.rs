//! Following `require` into other modules

use crate::ResolutionContext;
use crate::error::ModuleError;
use jv_match::Patterns;
use jv_scope::ScopeTree;
use jv_syntax::{Ast, NodeId, Pattern};
use jv_vfs::SpecifierKind;
use std::path::Path;
use tracing::debug;

/// Analyze the module `specifier` names, relative to the file at `from`
///
/// Returns the module's exported value. Each path is analyzed at most once per
/// context; a second request for the same path is [`ModuleError::AlreadyVisited`].
pub(crate) fn follow_require(
    cx: &mut ResolutionContext<'_>,
    specifier: &str,
    from: &Path,
) -> Result<NodeId, ModuleError> {
    if !cx.options.follow_requires {
        return Err(ModuleError::Disabled);
    }
    let specifier_owned = || specifier.to_string();
    match SpecifierKind::classify(specifier) {
        SpecifierKind::Relative => {}
        SpecifierKind::Json => return Err(ModuleError::Json { specifier: specifier_owned() }),
        SpecifierKind::Core => return Err(ModuleError::Core { specifier: specifier_owned() }),
        SpecifierKind::Package => {
            return Err(ModuleError::NotRelative {
                specifier: specifier_owned(),
            });
        }
    }
    let depth = cx.module_depth;
    if let Some(limit) = cx.options.max_module_depth.filter(|limit| depth >= *limit) {
        return Err(ModuleError::TooDeep { limit });
    }

    let base_dir = from.parent().unwrap_or_else(|| Path::new(""));
    let path = cx.module_resolver.resolve(specifier, base_dir)?;
    if !cx.visited.insert(path.clone()) {
        return Err(ModuleError::AlreadyVisited { path });
    }

    let (file, source) = cx.vfs.read_path(&path).map_err(|err| ModuleError::Read {
        path: path.clone(),
        message: err.to_string(),
    })?;
    debug!(specifier, path = %path.display(), "following require");

    cx.module_depth += 1;
    let analysis = cx.analyze(file, path.clone(), &source);
    cx.module_depth -= 1;

    let analysis = analysis.map_err(|source| ModuleError::Parse {
        path: path.clone(),
        source,
    })?;
    analysis.exports.ok_or(ModuleError::NoExports { path })
}

/// The value a module publishes
///
/// A module-level `exports` binding with a value wins; otherwise the `exports` property
/// of the `module` object is used, falling back to the property itself while it has no
/// value.
pub(crate) fn exports(ast: &Ast, scopes: &ScopeTree) -> Option<NodeId> {
    let global = scopes.global();
    let settle = |value: NodeId| ast.final_value(value).unwrap_or(value);

    if let Some(value) = scopes
        .lookup_str(ast, global, "exports")
        .and_then(|binding| scopes.value(ast, binding))
    {
        return Some(settle(value));
    }

    let module = scopes.lookup_str(ast, global, "module")?;
    let object = ast.final_value(module.node)?;
    let patterns = Patterns::new(ast.interner());
    let property = jv_match::find(ast, ast.properties(object), &patterns.prop("exports", Pattern::Any))?;
    Some(ast.value(property).map_or(property, settle))
}
