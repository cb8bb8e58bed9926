//! Error types for VDF parsing, tree mutation and file I/O.
//!
//! Everything fallible in this crate reports through the single [`Error`]
//! enum so callers can match on the failure kind. Parse errors carry the
//! 1-based line and column of the offending character; the first malformed
//! construct aborts the whole parse, there is no resynchronization.
//!
//! ## Error categories
//!
//! - **Malformed input**: unclosed node, missing node name, key outside a
//!   node, bad escape sequence, input below the minimum document size
//! - **Lookup**: [`Error::TokenNotFound`], raised only by the strict
//!   `expect_*` lookups
//! - **Invariant violations**: empty names, detaching/attaching tokens whose
//!   linkage does not allow it
//! - **I/O**: missing file on load, existing file on save without overwrite
//!
//! ## Examples
//!
//! ```rust
//! use vdf_tree::{from_str, Error};
//!
//! let result = from_str("\"Key1\" \"Value1\"");
//! match result {
//!     Err(Error::KeyOutsideNode { line, .. }) => assert_eq!(line, 1),
//!     other => panic!("expected KeyOutsideNode, got {:?}", other),
//! }
//! ```

use thiserror::Error;

/// Represents all possible errors reported by this crate.
///
/// Parse variants include the 1-based line and column where scanning stopped.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Input is shorter than the smallest syntactically valid VDF document.
    #[error("provided data is not a valid VDF document")]
    InvalidDocument,

    /// End of input was reached while a node was still open.
    #[error("line {line}, column {column}: \"}}\" expected")]
    UnclosedNode { line: usize, column: usize },

    /// An opening brace was read with no name staged for the node.
    #[error("line {line}, column {column}: node name is missing")]
    MissingNodeName { line: usize, column: usize },

    /// A quoted token closed with nothing accumulated and nothing staged.
    #[error("line {line}, column {column}: node name or key name is missing")]
    MissingTokenName { line: usize, column: usize },

    /// A key-value pair appeared outside any node.
    #[error("line {line}, column {column}: key-value pair must be inside a node")]
    KeyOutsideNode { line: usize, column: usize },

    /// A backslash was followed by a character that is not a valid escape.
    #[error("line {line}, column {column}: invalid escape character")]
    InvalidEscape { line: usize, column: usize },

    /// The input ended in the middle of an escape sequence.
    #[error("line {line}, column {column}: incomplete escape sequence")]
    IncompleteEscape { line: usize, column: usize },

    /// Strict lookup failed to find a token with the requested name.
    #[error("{name} has not been found in the collection")]
    TokenNotFound { name: String },

    /// A node or key name was set to the empty string.
    #[error("name of a node or key cannot be empty")]
    EmptyName,

    /// The token has no parent (and is not a detachable root), so there is
    /// nothing to detach it from or migrate it out of.
    #[error("{name} is not attached to a parent")]
    DetachedToken { name: String },

    /// Attempted to attach a token that is already part of a collection.
    #[error("{name} is already attached")]
    AlreadyAttached { name: String },

    /// Attempted to move a node underneath itself or one of its descendants.
    #[error("moving {name} here would create a cycle")]
    WouldCreateCycle { name: String },

    /// The file to load does not exist.
    #[error("file {path} is not found")]
    FileNotFound { path: String },

    /// The file to save to already exists and overwrite was not requested.
    #[error("file {path} already exists")]
    FileExists { path: String },

    /// Underlying I/O failure while reading or writing a file.
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// Creates an unclosed-node error at the given position.
    pub(crate) fn unclosed_node(line: usize, column: usize) -> Self {
        Error::UnclosedNode { line, column }
    }

    /// Creates a missing-node-name error at the given position.
    pub(crate) fn missing_node_name(line: usize, column: usize) -> Self {
        Error::MissingNodeName { line, column }
    }

    /// Creates a key-outside-node error at the given position.
    pub(crate) fn key_outside_node(line: usize, column: usize) -> Self {
        Error::KeyOutsideNode { line, column }
    }

    /// Creates a strict-lookup miss for `name`.
    pub(crate) fn not_found(name: &str) -> Self {
        Error::TokenNotFound {
            name: name.to_string(),
        }
    }

    /// Wraps an I/O failure, keeping `Error: Clone`.
    pub(crate) fn io(err: &std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
