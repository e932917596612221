//! Multi-file test infrastructure for integration testing.
//!
//! A [`MultiFileProject`] is written into a temporary directory and resolved from disk,
//! exactly as the CLI would see it: `jsvalue.toml` discovery, module lookup through
//! `package.json` and `index.js`, and cycles between files.

use crate::render_globals;
use indexmap::IndexMap;
use jv_driver::{Config, RunError, run_file};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File every project starts resolving from
pub const ENTRY_FILE: &str = "main.js";

/// Result of running a multi-file test
#[derive(Debug)]
pub enum TestResult {
    /// Test passed successfully
    Pass,
    /// Test failed with a reason
    Fail { reason: String },
}

/// Expected result from a multi-file test
#[derive(Debug, Clone)]
pub enum ExpectedResult {
    /// The entry resolves and its globals render as `output`
    Globals { output: String },
    /// The entry does not parse; the error message contains every pattern
    ParseError { patterns: Vec<String> },
}

/// A multi-file test project
#[derive(Debug)]
pub struct MultiFileProject {
    /// Name of the test project
    pub name: String,
    /// File paths and contents, in insertion order
    pub files: IndexMap<PathBuf, String>,
    /// Expected result from resolving the entry file
    pub expected: ExpectedResult,
}

impl MultiFileProject {
    /// Creates a new multi-file test project with the given name
    ///
    /// # Examples
    ///
    /// ```
    /// # use integration_tests::multi_file::MultiFileProject;
    /// let project = MultiFileProject::new("my-test-project");
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: IndexMap::new(),
            expected: ExpectedResult::Globals {
                output: String::new(),
            },
        }
    }

    /// Loads a project directory
    ///
    /// `expected.txt` holds the rendered globals; `expected_error.txt` instead lists
    /// substrings of the parse error, one per line. Every other file is project content.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read
    pub fn from_dir(dir: &Path) -> anyhow::Result<Self> {
        let name = dir
            .file_name()
            .map_or_else(|| "project".to_string(), |name| name.to_string_lossy().to_string());
        let mut project = Self::new(name);
        project.load_dir(dir, dir)?;

        if let Some(output) = project.files.shift_remove(Path::new("expected.txt")) {
            project.expect_globals(output);
        }
        if let Some(patterns) = project.files.shift_remove(Path::new("expected_error.txt")) {
            project.expect_parse_error(patterns.lines().map(str::to_string).collect());
        }
        Ok(project)
    }

    fn load_dir(&mut self, base: &Path, current: &Path) -> anyhow::Result<()> {
        let mut entries = fs::read_dir(current)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                self.load_dir(base, &path)?;
            } else {
                let contents = fs::read_to_string(&path)?;
                let relative = path.strip_prefix(base).unwrap_or(&path).to_path_buf();
                self.files.insert(relative, contents);
            }
        }
        Ok(())
    }

    /// Adds a file to the test project
    ///
    /// # Examples
    ///
    /// ```
    /// # use integration_tests::multi_file::MultiFileProject;
    /// let mut project = MultiFileProject::new("test");
    /// project.add_file("main.js", "var a = 2;");
    /// ```
    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    /// Sets the expected rendering of the entry module's globals
    pub fn expect_globals(&mut self, output: impl Into<String>) {
        self.expected = ExpectedResult::Globals {
            output: output.into(),
        };
    }

    /// Sets the expected parse error patterns
    pub fn expect_parse_error(&mut self, patterns: Vec<String>) {
        self.expected = ExpectedResult::ParseError { patterns };
    }

    /// Writes every file below a fresh temporary directory
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or file cannot be created
    pub fn write(&self) -> anyhow::Result<TempDir> {
        let temp_dir = TempDir::new()?;
        for (path, content) in &self.files {
            let full_path = temp_dir.path().join(path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&full_path, content)?;
        }
        Ok(temp_dir)
    }

    /// Writes the project to disk, resolves [`ENTRY_FILE`] and checks the outcome
    #[must_use]
    pub fn run(&self) -> TestResult {
        let temp_dir = match self.write() {
            Ok(dir) => dir,
            Err(error) => {
                return TestResult::Fail {
                    reason: format!("Failed to write project {}: {error}", self.name),
                };
            }
        };
        let root = temp_dir.path();

        let config = match Config::discover(root) {
            Ok((config, _)) => config,
            Err(error) => {
                return TestResult::Fail {
                    reason: format!("Failed to load config: {error}"),
                };
            }
        };

        let outcome = run_file(&root.join(ENTRY_FILE), config.resolve);
        match (&self.expected, outcome) {
            (ExpectedResult::Globals { output }, Ok(tree)) => {
                let actual = render_globals(&tree);
                if actual.trim_end() == output.trim_end() {
                    TestResult::Pass
                } else {
                    TestResult::Fail {
                        reason: format!("expected:\n{output}\nactual:\n{actual}"),
                    }
                }
            }
            (ExpectedResult::ParseError { patterns }, Err(RunError::Parse { error, .. })) => {
                let message = error.to_string();
                match patterns
                    .iter()
                    .find(|pattern| !message.contains(pattern.as_str()))
                {
                    Some(missing) => TestResult::Fail {
                        reason: format!("parse error `{message}` does not mention `{missing}`"),
                    },
                    None => TestResult::Pass,
                }
            }
            (_, Err(error)) => TestResult::Fail {
                reason: format!("unexpected failure: {error}"),
            },
            (ExpectedResult::ParseError { .. }, Ok(tree)) => TestResult::Fail {
                reason: format!("expected a parse error, resolved:\n{}", render_globals(&tree)),
            },
        }
    }
}

/// Creates a new multi-file test project with the given name
///
/// # Examples
///
/// ```
/// # use integration_tests::multi_file::create_project;
/// let project = create_project("my-test");
/// ```
#[must_use]
pub fn create_project(name: &str) -> MultiFileProject {
    MultiFileProject::new(name)
}

/// An export chain across three files
///
/// `main.js` requires `config.js`, which builds its export from `defaults.js`.
#[must_use]
pub fn export_chain() -> MultiFileProject {
    let mut project = create_project("export-chain");

    project.add_file(
        "main.js",
        r"var config = require('./config');
var port = config.port;
",
    );
    project.add_file(
        "config.js",
        r"var defaults = require('./defaults.js');
module.exports = {port: defaults.port, host: 'localhost'};
",
    );
    project.add_file("defaults.js", "module.exports = {port: 8080};\n");

    project.expect_globals(
        "config = {port: 8080,host: 'localhost'}\n\
         port = 8080\n",
    );
    project
}

/// Two modules requiring each other
///
/// The second require of the entry module is cut off, leaving that value unknown.
#[must_use]
pub fn require_cycle() -> MultiFileProject {
    let mut project = create_project("require-cycle");

    project.add_file(
        "main.js",
        r"var b = require('./b');
module.exports = {name: 'a'};
",
    );
    project.add_file(
        "b.js",
        r"var a = require('./main');
module.exports = {name: 'b', other: a};
",
    );

    project.expect_globals(
        "b = {name: 'b',other: a}\n\
         module.exports = {name: 'a'}\n",
    );
    project
}

/// A module required through `package.json` and one through `index.js`
#[must_use]
pub fn directory_modules() -> MultiFileProject {
    let mut project = create_project("directory-modules");

    project.add_file(
        "main.js",
        r"var lib = require('./lib');
var util = require('./util');
",
    );
    project.add_file("lib/package.json", r#"{ "main": "./src/entry.js" }"#);
    project.add_file("lib/src/entry.js", "module.exports = 'from main';\n");
    project.add_file("util/index.js", "module.exports = [1, 2];\n");

    project.expect_globals(
        "lib = 'from main'\n\
         util = [1,2]\n",
    );
    project
}

/// Package and core module specifiers are never followed
#[must_use]
pub fn non_relative_specifiers() -> MultiFileProject {
    let mut project = create_project("non-relative-specifiers");

    project.add_file(
        "main.js",
        r"var fs = require('fs');
var lodash = require('lodash');
var data = require('./data.json');
",
    );
    project.add_file("node_modules/lodash/index.js", "module.exports = 1;\n");
    project.add_file("data.json", "{}\n");

    project.expect_globals(
        "fs = require('fs')\n\
         lodash = require('lodash')\n\
         data = require('./data.json')\n",
    );
    project
}
