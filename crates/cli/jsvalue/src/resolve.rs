//! Resolve command implementation

use crate::Format;
use crate::diagnostics::{render_parse_errors, render_resolution_diagnostics};
use anyhow::{Context, Result};
use colored::Colorize;
use jv_driver::{Config, GlobalValue, ResolvedTree, RunError, run_file};
use jv_resolve::Diagnostic;
use serde::Serialize;
use std::path::{self, Path};

#[derive(Serialize)]
struct Report<'tree> {
    file: String,
    program: String,
    globals: Vec<GlobalValue>,
    exports: Option<String>,
    diagnostics: &'tree [Diagnostic],
}

/// Resolve `file` and print its globals; `Ok(false)` when the file does not parse
pub fn resolve(
    file: &Path,
    config_path: Option<&Path>,
    no_follow_requires: bool,
    format: Format,
) -> Result<bool> {
    let config = match config_path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => {
            let absolute = path::absolute(file).unwrap_or_else(|_| file.to_path_buf());
            let dir = absolute.parent().unwrap_or(&absolute);
            let (config, found) = Config::discover(dir)?;
            if let Some(found) = found {
                tracing::debug!(config = %found.display(), "using discovered config");
            }
            config
        }
    };

    let mut options = config.resolve;
    if no_follow_requires {
        options.follow_requires = false;
    }

    let tree = match run_file(file, options) {
        Ok(tree) => tree,
        Err(RunError::Parse { path, text, error }) => {
            render_parse_errors(&path.display().to_string(), &text, &[error])?;
            return Ok(false);
        }
        Err(error @ RunError::Read { .. }) => return Err(error.into()),
    };

    render_resolution_diagnostics(&tree.diagnostics);
    match format {
        Format::Text => print_text(&tree),
        Format::Json => print_json(file, &tree)?,
    }
    Ok(true)
}

fn print_text(tree: &ResolvedTree) {
    println!("{}", tree.generate());
    for global in tree.globals() {
        match global.value {
            Some(value) => println!("{} = {value}", global.name.bold()),
            None => println!("{} = {}", global.name.bold(), "unknown".dimmed()),
        }
    }
    if let Some(exports) = tree.exports().filter(|exports| exports != "{}") {
        println!("{} = {exports}", "module.exports".bold());
    }
}

fn print_json(file: &Path, tree: &ResolvedTree) -> Result<()> {
    let report = Report {
        file: file.display().to_string(),
        program: tree.generate(),
        globals: tree.globals(),
        exports: tree.exports(),
        diagnostics: &tree.diagnostics,
    };
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{json}");
    Ok(())
}
