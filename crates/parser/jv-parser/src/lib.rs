//! Parser infrastructure for JavaScript sources
//!
//! Parses with tree-sitter through the [`JavaScriptLanguage`] adapter, turns every
//! ERROR/MISSING node into a [`ParseError`] and lowers error-free trees into the
//! shared [`Ast`].

pub mod error;

pub use error::ParseError;

use jv_span::{FileId, LineIndex};
use jv_syntax::{Ast, Language, NodeId};
use lang_javascript::JavaScriptLanguage;
use miette::{NamedSource, SourceSpan};

/// Result of parsing a source file
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Program node, present when the source parsed without errors
    pub root: Option<NodeId>,
    /// Parse errors with detailed diagnostics
    pub errors: Vec<ParseError>,
    /// Line lookup for positions in this file
    pub line_index: LineIndex,
}

impl ParseResult {
    /// The program node, or the first error
    ///
    /// # Errors
    ///
    /// Returns the first collected [`ParseError`] when the source did not parse.
    pub fn into_root(self) -> Result<NodeId, ParseError> {
        match (self.root, self.errors.into_iter().next()) {
            (Some(root), None) => Ok(root),
            (_, Some(error)) => Err(error),
            (None, None) => Err(ParseError::ParseFailed {
                reason: "no syntax tree produced".to_string(),
            }),
        }
    }
}

/// Parse JavaScript `source` into `ast` as file `file`
///
/// `name` labels the source in diagnostics.
pub fn parse_source(ast: &mut Ast, file: FileId, name: &str, source: &str) -> ParseResult {
    let language = JavaScriptLanguage::new();
    let line_index = LineIndex::new(source);

    match language.parse(source) {
        Ok(tree) => {
            let mut errors = Vec::new();
            let root_node = tree.root_node();
            if root_node.has_error() {
                let src = NamedSource::new(name, source.to_string());
                collect_errors(&root_node, source, &src, &mut errors);
            }

            if errors.is_empty() {
                let root = language.lower(&tree, source, file, ast);
                tracing::trace!(file = name, nodes = ast.len(), "lowered source");
                ParseResult {
                    root: Some(root),
                    errors,
                    line_index,
                }
            } else {
                ParseResult {
                    root: None,
                    errors,
                    line_index,
                }
            }
        }
        Err(err) => ParseResult {
            root: None,
            errors: vec![ParseError::ParseFailed {
                reason: format!("{err}"),
            }],
            line_index,
        },
    }
}

/// Collect error nodes from the tree in source order
///
/// Subtrees without errors are skipped. Traversal keeps its own stack so deeply nested
/// sources cannot exhaust the thread's stack.
fn collect_errors(
    root: &tree_sitter::Node<'_>,
    source: &str,
    src: &NamedSource<String>,
    errors: &mut Vec<ParseError>,
) {
    let mut pending = vec![*root];
    while let Some(node) = pending.pop() {
        if node.is_error() {
            errors.push(error_node(&node, source, src));
        } else if node.is_missing() {
            errors.push(missing_node(&node, source, src));
        } else if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            pending.extend(children.into_iter().rev());
        }
    }
}

/// Error for an ERROR node: an unclosed bracket around it, or the unexpected token itself
fn error_node(node: &tree_sitter::Node<'_>, source: &str, src: &NamedSource<String>) -> ParseError {
    let start = node.start_byte();
    let end = node.end_byte();
    let span: SourceSpan = (start, end - start).into();

    node.parent()
        .and_then(|parent| unclosed_delimiter(&parent, span, src))
        .unwrap_or_else(|| {
            let text = source.get(start..end).unwrap_or_default();
            let token = text.lines().next().unwrap_or(text).to_string();
            ParseError::UnexpectedToken {
                token,
                span,
                src: src.clone(),
            }
        })
}

/// Error for a MISSING node inserted by error recovery
fn missing_node(node: &tree_sitter::Node<'_>, source: &str, src: &NamedSource<String>) -> ParseError {
    let pos = node.start_byte();
    let expected = node.kind().to_string();
    let closing = matches!(expected.as_str(), ")" | "}" | "]");
    node.parent()
        .filter(|_| closing)
        .and_then(|parent| unclosed_delimiter(&parent, (pos, 0).into(), src))
        .unwrap_or_else(|| missing_token(source, pos, &expected, src))
}

/// Build an unclosed delimiter error if `parent` opens a bracket it never closes
fn unclosed_delimiter(
    parent: &tree_sitter::Node<'_>,
    expected_close: SourceSpan,
    src: &NamedSource<String>,
) -> Option<ParseError> {
    let mut cursor = parent.walk();
    let children: Vec<_> = parent.children(&mut cursor).collect();
    let opening = children
        .iter()
        .find(|child| matches!(child.kind(), "(" | "{" | "["))?;
    let (opening_char, closing_char) = match opening.kind() {
        "(" => ('(', ')'),
        "{" => ('{', '}'),
        _ => ('[', ']'),
    };
    let closing_kind = closing_char.to_string();
    let closed = children
        .iter()
        .any(|child| child.kind() == closing_kind && !child.is_missing());
    if closed {
        return None;
    }
    Some(ParseError::UnclosedDelimiter {
        opening_char,
        opening: (opening.start_byte(), 1).into(),
        expected_close,
        closing_char,
        src: src.clone(),
    })
}

/// Helper to create a missing token error
fn missing_token(source: &str, pos: usize, expected: &str, src: &NamedSource<String>) -> ParseError {
    let found = source
        .get(pos..)
        .and_then(|rest| rest.split_whitespace().next())
        .map_or_else(
            || "end of file".to_string(),
            |word| word.chars().take(10).collect(),
        );

    ParseError::MissingToken {
        expected: expected.to_string(),
        found,
        span: (pos, 1).into(),
        src: src.clone(),
    }
}
