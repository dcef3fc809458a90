//! Conditional compilation of script sources.
//!
//! Prunes metadata-guarded `if` statements out of a file at generation time:
//! a false guard disappears together with its branch, a true guard is
//! replaced by its branch body. Guards are `if` statements whose test
//! mentions an `import.meta.STRATA_*` marker; all other `if` statements are
//! left untouched. Parsing is delegated to tree-sitter; rewriting splices
//! the original text by byte range, re-indenting flattened blocks.

use crate::config::{Metadata, MARKER_TOKEN};
use crate::error::{Error, Result};
use crate::eval::{self, CondError};
use std::ops::Range;
use std::path::Path;
use tree_sitter::{Language, Node, Parser};

/// One marker-guarded `if` statement, captured as byte ranges so the syntax
/// tree can be dropped before the text is rewritten.
struct GuardedIf {
    statement: Range<usize>,
    condition: String,
    consequence: Branch,
    alternative: Option<Branch>,
}

/// A branch of a guarded `if`: either a `{ ... }` block (flattened on
/// survival) or a single statement (kept as-is).
struct Branch {
    inner: Range<usize>,
    is_block: bool,
}

/// Compiles one script source against the run metadata.
///
/// Repeatedly parses the text, resolves the first marker-guarded `if` in
/// document order, splices the text, and re-parses until none remain. Nested
/// guards inside a surviving branch are resolved by the later passes.
///
/// # Errors
/// * `Error::Parse` if the file is not valid script source
/// * `Error::UnsupportedExpression` / `Error::UnknownMarker` from guard
///   evaluation
pub fn compile(source_path: &Path, text: &str, metadata: &Metadata) -> Result<String> {
    let language = language_for(source_path);
    let mut code = text.to_string();

    loop {
        let guarded = match find_guarded_if(source_path, &code, &language)? {
            Some(guarded) => guarded,
            None => return Ok(code),
        };
        code = rewrite(source_path, &code, guarded, metadata)?;
    }
}

/// tsx needs its own grammar; plain TypeScript covers `.ts` and `.js`.
fn language_for(source_path: &Path) -> Language {
    match source_path.extension().and_then(|e| e.to_str()) {
        Some("tsx") | Some("jsx") => tree_sitter_typescript::LANGUAGE_TSX.into(),
        _ => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
    }
}

/// Parses the text and returns the first `if` statement (pre-order) whose
/// test mentions a marker.
fn find_guarded_if(
    source_path: &Path,
    code: &str,
    language: &Language,
) -> Result<Option<GuardedIf>> {
    let mut parser = Parser::new();
    parser.set_language(language).map_err(|e| Error::Parse {
        path: source_path.display().to_string(),
        message: e.to_string(),
    })?;

    let tree = parser.parse(code, None).ok_or_else(|| Error::Parse {
        path: source_path.display().to_string(),
        message: "parser produced no tree".to_string(),
    })?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(Error::Parse {
            path: source_path.display().to_string(),
            message: "source contains syntax errors".to_string(),
        });
    }

    Ok(first_guarded_if(root, code))
}

fn first_guarded_if(node: Node, code: &str) -> Option<GuardedIf> {
    if node.kind() == "if_statement" {
        if let Some(guarded) = capture_guarded_if(node, code) {
            return Some(guarded);
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_guarded_if(child, code) {
            return Some(found);
        }
    }
    None
}

fn capture_guarded_if(node: Node, code: &str) -> Option<GuardedIf> {
    let condition = node.child_by_field_name("condition")?;
    if !contains_marker_expression(condition, code) {
        return None;
    }
    let condition_text = condition.utf8_text(code.as_bytes()).ok()?;

    let consequence = node.child_by_field_name("consequence")?;
    let alternative = node
        .child_by_field_name("alternative")
        .and_then(|clause| else_body(clause))
        .map(|body| capture_branch(body));

    Some(GuardedIf {
        statement: node.byte_range(),
        condition: condition_text.to_string(),
        consequence: capture_branch(consequence),
        alternative,
    })
}

/// Whether a condition subtree contains a marker as an actual member
/// expression (`import.meta.STRATA_*`). The token occurring in a string
/// literal or comment does not make a guard.
fn contains_marker_expression(node: Node, code: &str) -> bool {
    if node.kind() == "member_expression"
        && node
            .utf8_text(code.as_bytes())
            .is_ok_and(|text| text.starts_with(MARKER_TOKEN))
    {
        return true;
    }

    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| contains_marker_expression(child, code));
    found
}

/// The statement behind an `else_clause`: either a block, or another `if`
/// for `else if` chains.
fn else_body(clause: Node) -> Option<Node> {
    let mut cursor = clause.walk();
    let body = clause.children(&mut cursor).find(|child| child.kind() != "else");
    body
}

fn capture_branch(node: Node) -> Branch {
    if node.kind() == "statement_block" {
        // inner text between the braces
        let start = node.byte_range().start + 1;
        let end = node.byte_range().end.saturating_sub(1).max(start);
        Branch { inner: start..end, is_block: true }
    } else {
        Branch { inner: node.byte_range(), is_block: false }
    }
}

/// Evaluates the guard and splices the surviving branch (or nothing) into
/// the text.
fn rewrite(
    source_path: &Path,
    code: &str,
    guarded: GuardedIf,
    metadata: &Metadata,
) -> Result<String> {
    let keep = eval::evaluate(&guarded.condition, metadata).map_err(|e| match e {
        CondError::Unsupported(_) => Error::UnsupportedExpression {
            path: source_path.display().to_string(),
            expression: guarded.condition.clone(),
        },
        CondError::UnknownMarker(marker) => Error::UnknownMarker {
            path: source_path.display().to_string(),
            marker,
        },
    })?;

    let survivor = if keep { Some(&guarded.consequence) } else { guarded.alternative.as_ref() };

    let indent = statement_indent(code, guarded.statement.start);
    let replacement = match survivor {
        Some(branch) => {
            let snippet = &code[branch.inner.clone()];
            if branch.is_block {
                flatten_block(snippet, &indent)
            } else {
                snippet.to_string()
            }
        }
        None => String::new(),
    };

    let mut start = guarded.statement.start;
    let mut end = guarded.statement.end;
    if replacement.trim().is_empty() {
        // drop the whole line when nothing else remains on it
        let line_start = code[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_end = code[end..].find('\n').map(|i| end + i + 1).unwrap_or(code.len());
        let line_tail = code[end..line_end].trim_end_matches('\n');
        if code[line_start..start].trim().is_empty() && line_tail.trim().is_empty() {
            start = line_start;
            end = line_end;
        }
        let mut result = code.to_string();
        result.replace_range(start..end, "");
        return Ok(result);
    }

    let mut result = code.to_string();
    result.replace_range(start..end, &replacement);
    Ok(result)
}

/// Leading whitespace of the line a statement starts on, used to re-indent
/// flattened block bodies.
fn statement_indent(code: &str, statement_start: usize) -> String {
    let line_start = code[..statement_start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let prefix = &code[line_start..statement_start];
    if prefix.trim().is_empty() {
        prefix.to_string()
    } else {
        String::new()
    }
}

/// Re-indents the inner text of a `{ ... }` block to the indentation of the
/// statement it replaces.
fn flatten_block(snippet: &str, indent: &str) -> String {
    let lines: Vec<&str> = snippet.lines().collect();
    let trimmed: Vec<&str> = lines
        .iter()
        .skip_while(|line| line.trim().is_empty())
        .copied()
        .collect();
    let mut trimmed = trimmed;
    while trimmed.last().is_some_and(|line| line.trim().is_empty()) {
        trimmed.pop();
    }
    if trimmed.is_empty() {
        return String::new();
    }

    let common_indent = trimmed
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    trimmed
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                let dedented = &line[common_indent.min(line.len() - line.trim_start().len())..];
                dedented.to_string()
            }
        })
        .enumerate()
        .map(|(index, line)| {
            if index == 0 || line.is_empty() {
                line
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
