//! Check command implementation

use crate::diagnostics::render_parse_errors;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

/// Parse every file; `Ok(false)` when any of them has syntax errors
pub fn check(files: &[PathBuf]) -> Result<bool> {
    let mut failed = 0;

    for file in files {
        let source = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let name = file.display().to_string();
        let errors = jv_driver::check(&source, &name);

        if errors.is_empty() {
            println!("  {} {name}", "✓".green());
        } else {
            failed += 1;
            println!("  {} {name}", "✗".red());
            render_parse_errors(&name, &source, &errors)?;
        }
    }

    println!();
    if failed == 0 {
        println!("{} No syntax errors found", "Success:".green().bold());
        Ok(true)
    } else {
        eprintln!(
            "{} {failed} of {} files have syntax errors",
            "Failed:".red().bold(),
            files.len()
        );
        Ok(false)
    }
}
