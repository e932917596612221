//! Node-style module specifier resolution
//!
//! Resolution follows the CommonJS lookup order for relative specifiers:
//! - the exact path
//! - the path with each known extension appended
//! - a directory's `package.json` `main` entry
//! - a directory's `index` file

use crate::VirtualFileSystem;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Extensions tried, in order, when a specifier names no existing file
pub const EXTENSIONS: &[&str] = &["js", "cjs", "json", "node"];

/// Node built-in module names
const CORE_MODULES: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Whether `specifier` names a Node built-in module (`fs`, `node:fs`, `fs/promises`)
pub fn is_core_module(specifier: &str) -> bool {
    if specifier.starts_with("node:") {
        return true;
    }
    let root = specifier.split('/').next().unwrap_or(specifier);
    CORE_MODULES.contains(&root)
}

/// How a `require` specifier should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// `./x` or `../x`, resolved against the requiring file
    Relative,
    /// A JSON data file
    Json,
    /// A platform built-in such as `fs`
    Core,
    /// A bare package name looked up in `node_modules`
    Package,
}

impl SpecifierKind {
    /// Classify a specifier
    pub fn classify(specifier: &str) -> Self {
        if specifier.ends_with(".json") {
            Self::Json
        } else if specifier.starts_with("./") || specifier.starts_with("../") {
            Self::Relative
        } else if is_core_module(specifier) {
            Self::Core
        } else {
            Self::Package
        }
    }
}

/// Why a specifier could not be turned into a path
#[derive(Debug, Error)]
pub enum ResolveFailure {
    /// No candidate file exists
    #[error("cannot find module '{specifier}' from '{}'", base_dir.display())]
    NotFound {
        /// The specifier as written
        specifier: String,
        /// Directory the lookup started from
        base_dir: PathBuf,
    },

    /// A `package.json` on the lookup path could not be read
    #[error("invalid package.json at '{}': {message}", path.display())]
    PackageJson {
        /// Location of the manifest
        path: PathBuf,
        /// Underlying error
        message: String,
    },
}

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    main: Option<String>,
}

/// Resolves relative specifiers the way Node's CommonJS loader does
#[derive(Debug, Clone)]
pub struct NodeModuleResolver {
    vfs: VirtualFileSystem,
}

impl NodeModuleResolver {
    /// Create a resolver that consults `vfs` for file existence
    pub fn new(vfs: VirtualFileSystem) -> Self {
        Self { vfs }
    }

    /// Resolve `specifier` relative to `base_dir` into a normalized path
    ///
    /// # Errors
    ///
    /// Returns [`ResolveFailure::NotFound`] when no candidate exists and
    /// [`ResolveFailure::PackageJson`] for an unreadable directory manifest.
    pub fn resolve(&self, specifier: &str, base_dir: &Path) -> Result<PathBuf, ResolveFailure> {
        let candidate = normalize(&base_dir.join(specifier));
        tracing::trace!(specifier, candidate = %candidate.display(), "resolving module");

        if let Some(path) = self.try_file(&candidate) {
            return Ok(path);
        }
        if self.vfs.is_dir(&candidate) {
            if let Some(path) = self.try_directory(&candidate)? {
                return Ok(path);
            }
        }

        Err(ResolveFailure::NotFound {
            specifier: specifier.to_string(),
            base_dir: base_dir.to_path_buf(),
        })
    }

    fn try_file(&self, path: &Path) -> Option<PathBuf> {
        if self.vfs.is_file(path) {
            return Some(path.to_path_buf());
        }
        EXTENSIONS.iter().find_map(|extension| {
            let mut candidate = path.as_os_str().to_owned();
            candidate.push(".");
            candidate.push(extension);
            let candidate = PathBuf::from(candidate);
            self.vfs.is_file(&candidate).then_some(candidate)
        })
    }

    fn try_directory(&self, dir: &Path) -> Result<Option<PathBuf>, ResolveFailure> {
        let manifest_path = dir.join("package.json");
        if self.vfs.is_file(&manifest_path) {
            let manifest = self.read_package_json(&manifest_path)?;
            if let Some(main) = manifest.main {
                let main_path = normalize(&dir.join(main));
                if let Some(path) = self.try_file(&main_path) {
                    return Ok(Some(path));
                }
                if let Some(path) = self.try_index(&main_path) {
                    return Ok(Some(path));
                }
            }
        }
        Ok(self.try_index(dir))
    }

    fn try_index(&self, dir: &Path) -> Option<PathBuf> {
        EXTENSIONS.iter().find_map(|extension| {
            let candidate = dir.join(format!("index.{extension}"));
            self.vfs.is_file(&candidate).then_some(candidate)
        })
    }

    fn read_package_json(&self, path: &Path) -> Result<PackageJson, ResolveFailure> {
        let failure = |message: String| ResolveFailure::PackageJson {
            path: path.to_path_buf(),
            message,
        };
        let (_, content) = self
            .vfs
            .read_path(path)
            .map_err(|err| failure(err.to_string()))?;
        serde_json::from_str(&content).map_err(|err| failure(err.to_string()))
    }
}

/// Fold `.` and `..` components without touching the file system
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver_with(files: &[(&str, &str)]) -> NodeModuleResolver {
        let vfs = VirtualFileSystem::new();
        for (path, contents) in files {
            vfs.add_file(path, *contents).unwrap();
        }
        NodeModuleResolver::new(vfs)
    }

    #[test]
    fn test_classify_specifiers() {
        assert_eq!(SpecifierKind::classify("./a"), SpecifierKind::Relative);
        assert_eq!(SpecifierKind::classify("../lib/a"), SpecifierKind::Relative);
        assert_eq!(SpecifierKind::classify("./data.json"), SpecifierKind::Json);
        assert_eq!(SpecifierKind::classify("fs"), SpecifierKind::Core);
        assert_eq!(SpecifierKind::classify("node:path"), SpecifierKind::Core);
        assert_eq!(SpecifierKind::classify("fs/promises"), SpecifierKind::Core);
        assert_eq!(SpecifierKind::classify("lodash"), SpecifierKind::Package);
    }

    #[test]
    fn test_extension_is_appended() {
        let resolver = resolver_with(&[("/project/lib/util.js", "")]);
        let path = resolver
            .resolve("./lib/util", Path::new("/project"))
            .unwrap();
        assert_eq!(path, PathBuf::from("/project/lib/util.js"));
    }

    #[test]
    fn test_exact_file_wins() {
        let resolver = resolver_with(&[("/project/a.js", ""), ("/project/a.js.js", "")]);
        let path = resolver.resolve("./a.js", Path::new("/project")).unwrap();
        assert_eq!(path, PathBuf::from("/project/a.js"));
    }

    #[test]
    fn test_parent_directory_is_normalized() {
        let resolver = resolver_with(&[("/project/shared.js", "")]);
        let path = resolver
            .resolve("../shared", Path::new("/project/src/./nested/.."))
            .unwrap();
        assert_eq!(path, PathBuf::from("/project/shared.js"));
    }

    #[test]
    fn test_directory_index() {
        let resolver = resolver_with(&[("/project/lib/index.js", "")]);
        let path = resolver.resolve("./lib", Path::new("/project")).unwrap();
        assert_eq!(path, PathBuf::from("/project/lib/index.js"));
    }

    #[test]
    fn test_package_main() {
        let resolver = resolver_with(&[
            ("/project/pkg/package.json", r#"{ "main": "./dist/entry" }"#),
            ("/project/pkg/dist/entry.js", ""),
            ("/project/pkg/index.js", ""),
        ]);
        let path = resolver.resolve("./pkg", Path::new("/project")).unwrap();
        assert_eq!(path, PathBuf::from("/project/pkg/dist/entry.js"));
    }

    #[test]
    fn test_missing_module() {
        let resolver = resolver_with(&[]);
        let err = resolver
            .resolve("./nope", Path::new("/project"))
            .unwrap_err();
        assert!(matches!(err, ResolveFailure::NotFound { .. }));
        assert!(err.to_string().contains("./nope"));
    }

    #[test]
    fn test_broken_package_json() {
        let resolver = resolver_with(&[("/project/pkg/package.json", "{ main: ")]);
        let err = resolver.resolve("./pkg", Path::new("/project")).unwrap_err();
        assert!(matches!(err, ResolveFailure::PackageJson { .. }));
    }
}
