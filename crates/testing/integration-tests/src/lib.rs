//! Integration test utilities for jsvalue

pub mod multi_file;

use anyhow::{Context, Result};
use jv_driver::ResolvedTree;
use jv_resolve::{ResolutionContext, ResolveOptions};
use jv_vfs::VirtualFileSystem;
use std::path::PathBuf;

/// In-memory project: files live only in a [`VirtualFileSystem`] overlay
pub struct TestFixture {
    /// File system holding the fixture's files
    pub vfs: VirtualFileSystem,
    root: PathBuf,
}

impl TestFixture {
    /// Creates an empty fixture rooted at `/fixture`
    #[must_use]
    pub fn new() -> Self {
        Self {
            vfs: VirtualFileSystem::new(),
            root: PathBuf::from("/fixture"),
        }
    }

    /// Adds a file relative to the fixture root
    ///
    /// # Errors
    ///
    /// Returns an error if file registration fails
    pub fn add_file(&mut self, path: &str, contents: &str) -> Result<PathBuf> {
        let full_path = self.root.join(path);
        self.vfs.add_file(&full_path, contents)?;
        Ok(full_path)
    }

    /// Resolves `entry` with default options
    ///
    /// # Errors
    ///
    /// Returns an error if the entry file is missing or does not parse
    pub fn resolve(&self, entry: &str) -> Result<ResolvedTree> {
        self.resolve_with(entry, ResolveOptions::default())
    }

    /// Resolves `entry` with `options`
    ///
    /// # Errors
    ///
    /// Returns an error if the entry file is missing or does not parse
    pub fn resolve_with(&self, entry: &str, options: ResolveOptions) -> Result<ResolvedTree> {
        let path = self.root.join(entry);
        let file = self
            .vfs
            .get_file_id(&path)?
            .with_context(|| format!("{} is not part of the fixture", path.display()))?;
        let source = self.vfs.load_file(file)?;

        let mut cx = ResolutionContext::with_vfs(self.vfs.clone(), options);
        let module = cx.analyze_source(&source, &path)?;
        let diagnostics = cx.diagnostics().to_vec();
        Ok(ResolvedTree {
            ast: cx.into_ast(),
            module,
            diagnostics,
        })
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain-text summary of a resolved tree: one `name = value` line per global
///
/// Unknown values print as `unknown`; a non-empty `module.exports` closes the list.
pub fn render_globals(tree: &ResolvedTree) -> String {
    let mut out = String::new();
    for global in tree.globals() {
        let value = global.value.as_deref().unwrap_or("unknown");
        out.push_str(&format!("{} = {value}\n", global.name));
    }
    if let Some(exports) = tree.exports().filter(|exports| exports != "{}") {
        out.push_str(&format!("module.exports = {exports}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_resolves_in_memory_files() {
        let mut fixture = TestFixture::new();
        fixture.add_file("main.js", "var x = require('./x');").unwrap();
        fixture.add_file("x.js", "module.exports = 1;").unwrap();

        let tree = fixture.resolve("main.js").unwrap();
        assert_eq!(render_globals(&tree), "x = 1\n");
    }

    #[test]
    fn test_fixture_missing_entry() {
        let fixture = TestFixture::new();
        assert!(fixture.resolve("main.js").is_err());
    }
}
