//! Indented textual outline of a tree.
//!
//! Each node is rendered on its own line by its ID, indented by two spaces
//! per level below the top level and prefixed with `- `:
//!
//! ```text
//! - 5
//! - 1
//!   - 7
//!     - 11
//!   - 10
//! ```
//!
//! Multi-line IDs continue on the next line, aligned with the text of
//! their node.

use crate::model::Tree;
use std::fmt;

/// Marker in front of every node.
const MARKER: &str = "- ";

/// Indentation per level.
const INDENT: &str = "  ";

/// Writes the outline of `tree` to `out`, lines separated by `\n`
/// (no trailing newline).
pub fn write_outline<W: fmt::Write>(out: &mut W, tree: &Tree) -> fmt::Result {
    for (i, node) in tree.nodes().into_iter().enumerate() {
        if i > 0 {
            out.write_char('\n')?;
        }

        let indent = INDENT.repeat(node.level().saturating_sub(1));
        let continuation = format!("\n{indent}{INDENT}");
        let text = node.to_string().replace('\n', &continuation);
        write!(out, "{indent}{MARKER}{text}")?;
    }

    Ok(())
}

/// Returns the outline of `tree` as string.
pub fn to_outline(tree: &Tree) -> String {
    let mut outline = String::with_capacity(tree.len() * 8);
    // Writing to a String cannot fail
    let _ = write_outline(&mut outline, tree);
    outline
}
