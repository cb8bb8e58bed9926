//! VDF serialization: renders a token tree back into VDF text.
//!
//! Serialization is a single synchronous recursive walk. Formatting state
//! (delimiter, indent level) travels as an explicit
//! [`FormatOptions`](crate::FormatOptions) value plus a level counter; there
//! is no shared mutable state.
//!
//! Output is canonical rather than byte-preserving: comments and original
//! whitespace are gone, names and values are always quoted, and all keys of
//! a node are written before its child nodes regardless of the order they
//! were interleaved in.
//!
//! ## Examples
//!
//! ```rust
//! use vdf_tree::{from_str, FormatOptions};
//!
//! let doc = from_str("Root { Key1 Value1 }").unwrap();
//! assert_eq!(
//!     doc.render(&FormatOptions::compact()),
//!     "\"Root\"{\"Key1\" \"Value1\"}"
//! );
//! ```

use crate::document::Document;
use crate::options::FormatOptions;
use crate::tree::{KeyId, NodeId};

/// Renders the whole document: root nodes joined by the delimiter, with no
/// trailing delimiter after the last root.
pub(crate) fn render_document(doc: &Document, options: &FormatOptions) -> String {
    let mut out = String::new();
    for (i, &root) in doc.roots().iter().enumerate() {
        if i > 0 {
            out.push_str(&options.delimiter);
        }
        render_node(doc, root, options, options.indent, &mut out);
    }
    out
}

/// Renders a single node (and its subtree) at `level` tab stops.
pub(crate) fn render_node(
    doc: &Document,
    id: NodeId,
    options: &FormatOptions,
    level: usize,
    out: &mut String,
) {
    let node = doc.node(id);

    push_tabs(out, level);
    push_quoted(out, node.name());
    out.push_str(&options.delimiter);
    push_tabs(out, level);
    out.push('{');
    out.push_str(&options.delimiter);

    for &key in node.keys() {
        render_key(doc, key, level + 1, out);
        out.push_str(&options.delimiter);
    }
    for &child in node.children() {
        render_node(doc, child, options, level + 1, out);
        out.push_str(&options.delimiter);
    }

    push_tabs(out, level);
    out.push('}');
}

/// Renders a key as `"name" "value"` at `level` tab stops.
pub(crate) fn render_key(doc: &Document, id: KeyId, level: usize, out: &mut String) {
    let key = doc.key(id);
    push_tabs(out, level);
    push_quoted(out, key.name());
    out.push(' ');
    push_quoted(out, key.value());
}

/// Writes `s` surrounded by double quotes, escaping characters that would
/// break the token on re-read. Newline becomes the two-character literal
/// `\n`; carriage returns are dropped entirely.
fn push_quoted(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => {}
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

fn push_tabs(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push('\t');
    }
}
