//! # vdf-tree
//!
//! A reader, writer and mutable tree model for Valve's VDF text format —
//! the nested, brace-delimited name/value format Steam uses for
//! configuration and manifest files (`appmanifest_*.acf`,
//! `libraryfolders.vdf` and friends).
//!
//! ## What is VDF?
//!
//! A VDF document is zero or more *nodes*. A node is `"<name>" { ... }`
//! holding keys (`"<name>" "<value>"` pairs) and child nodes. Names and
//! values may be quoted or unquoted, `//` comments run to end of line, and
//! `[ ... ]` platform conditionals are skipped opaquely:
//!
//! ```text
//! "AppState"
//! {
//!     "appid"      "70"
//!     "name"       "Half-Life"
//!     "UserConfig"
//!     {
//!         "language"   "english"
//!     }
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Single-pass parsing**: a character-level state machine builds the
//!   tree in one sweep, with 1-based line/column diagnostics on failure
//! - **Mutable tree**: find, rename, duplicate, migrate, detach and remove
//!   nodes and keys in place, with parent/child links kept consistent
//! - **Structural round trip**: `parse(render(doc))` always reproduces the
//!   same tree, even though comments and original whitespace are not kept
//! - **No unsafe code**: written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ```rust
//! use vdf_tree::{from_str, CaseSensitivity, FormatOptions};
//!
//! let mut doc = from_str(
//!     "\"AppState\"\n{\n\t\"appid\" \"70\"\n\t\"name\" \"Half-Life\"\n}",
//! )
//! .unwrap();
//!
//! // Name-based lookup, case-insensitive by default.
//! let app = doc.expect_root("appstate", CaseSensitivity::default()).unwrap();
//! assert_eq!(
//!     doc.find_key_value(app, "name", CaseSensitivity::default()),
//!     Some("Half-Life"),
//! );
//!
//! // Mutate and render back out.
//! let key = doc.find_key(app, "name", CaseSensitivity::default()).unwrap();
//! doc.key_mut(key).set_value("Half-Life 2");
//! assert!(doc.render(&FormatOptions::default()).contains("Half-Life 2"));
//! ```
//!
//! ## Ownership model
//!
//! A [`Document`] owns every token in its tree; client code holds [`NodeId`]
//! and [`KeyId`] handles and resolves them through the document. Parent
//! links are handles too, so back-references never extend a lifetime —
//! dropping the document drops the whole tree.
//!
//! The tree is an ordinary mutable in-memory structure: single-threaded and
//! synchronous with no internal locking. Sharing a document across threads
//! requires external mutual exclusion, which the `&mut self` receivers on
//! every mutating operation enforce at compile time.

pub mod document;
pub mod error;
pub mod options;
pub mod parser;
pub mod ser;
pub mod tree;

pub use document::Document;
pub use error::{Error, Result};
pub use options::FormatOptions;
pub use tree::{CaseSensitivity, Key, KeyId, Node, NodeId};

use std::path::Path;

/// Parses a VDF document from a string.
///
/// # Examples
///
/// ```rust
/// use vdf_tree::from_str;
///
/// let doc = from_str("\"Root\" { \"Key1\" \"Value1\" }").unwrap();
/// assert_eq!(doc.roots().len(), 1);
/// ```
///
/// # Errors
///
/// Returns a malformed-input error with the line and column of the first
/// offending construct.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(s: &str) -> Result<Document> {
    s.parse()
}

/// Reads and parses a VDF document from a file.
///
/// # Errors
///
/// Returns [`Error::FileNotFound`] if the path does not exist, [`Error::Io`]
/// for other read failures, or a malformed-input error from parsing.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_file(path: impl AsRef<Path>) -> Result<Document> {
    Document::load(path)
}
