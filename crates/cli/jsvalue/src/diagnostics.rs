//! Terminal rendering of diagnostics

use anyhow::Result;
use colored::Colorize;
use jv_parser::ParseError;
use jv_parser::error::codespan_reporting::files::SimpleFiles;
use jv_parser::error::codespan_reporting::term;
use jv_resolve::Diagnostic;

/// Render parse errors against their source, rustc style
pub fn render_parse_errors(name: &str, source: &str, errors: &[ParseError]) -> Result<()> {
    let mut files = SimpleFiles::new();
    let file_id = files.add(name, source);
    let config = term::Config::default();

    let mut buffer = Vec::new();
    for error in errors {
        let diagnostic = error.to_codespan_diagnostic(file_id);
        #[allow(deprecated, reason = "emit is the stable rendering entry point")]
        term::emit(&mut buffer, &config, &files, &diagnostic)?;
    }
    eprint!("{}", String::from_utf8_lossy(&buffer));
    Ok(())
}

/// Print non-fatal resolution problems
pub fn render_resolution_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{} {diagnostic}", "warning:".yellow().bold());
    }
}
