//! Formatting options for VDF serialization.
//!
//! Serialization threads one immutable [`FormatOptions`] value through the
//! recursive tree walk instead of relying on shared defaults. Two knobs
//! exist: the delimiter written between rendered entries and the starting
//! indent level (tab characters) of the outermost entries.
//!
//! ## Examples
//!
//! ```rust
//! use vdf_tree::{from_str, FormatOptions};
//!
//! let doc = from_str("\"Root\" { \"Key1\" \"Value1\" }").unwrap();
//!
//! // Default: newline delimiter, no starting indent.
//! let text = doc.render(&FormatOptions::default());
//! assert!(text.contains('\n'));
//!
//! // An empty delimiter produces a single-line document.
//! let compact = doc.render(&FormatOptions::compact());
//! assert_eq!(compact, "\"Root\"{\"Key1\" \"Value1\"}");
//! ```

/// Formatting options applied during serialization.
///
/// # Examples
///
/// ```rust
/// use vdf_tree::FormatOptions;
///
/// // Newline-delimited output starting two tab stops in.
/// let options = FormatOptions::new().with_indent(2);
///
/// // CRLF output for Windows-style VDF files.
/// let options = FormatOptions::new().with_delimiter("\r\n");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    /// Separator written after the node name, each brace and each key-value
    /// pair. May be empty.
    pub delimiter: String,
    /// Number of tab characters prepended to the outermost entries. Each
    /// nesting level adds one more.
    pub indent: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            delimiter: "\n".to_string(),
            indent: 0,
        }
    }
}

impl FormatOptions {
    /// Creates the default options: newline delimiter, indent level 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options with an empty delimiter, producing a single-line,
    /// whitespace-free document.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vdf_tree::FormatOptions;
    ///
    /// let options = FormatOptions::compact();
    /// assert!(options.delimiter.is_empty());
    /// ```
    #[must_use]
    pub fn compact() -> Self {
        FormatOptions {
            delimiter: String::new(),
            indent: 0,
        }
    }

    /// Sets the delimiter written between rendered entries.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Sets the starting indent level (tab characters) for the outermost
    /// entries.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}
