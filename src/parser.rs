//! The VDF parser: a character-level state machine.
//!
//! The parser consumes the whole input once, left to right, building nodes
//! and keys directly into a [`Document`] as it goes. All scanning state
//! lives in one [`Parser`] context: the accumulation buffer for the token
//! being scanned, the staged previous token (whose role as node name, key
//! name or key value is not yet known), the node currently being populated
//! (the parent chain of which acts as the implicit stack), the mode, and
//! 1-based line/column counters for diagnostics.
//!
//! Two rules apply in every mode: a line feed ends the current line and
//! forces the mode back to [`Mode::None`], and a backslash consumes exactly
//! one following character as an escape (`\n`, `\t`, `\\`, `\"`). The
//! escape rule holding in every mode mirrors the observed behavior of
//! real-world VDF consumers.
//!
//! Errors abort the parse at the first malformed construct; no recovery is
//! attempted.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::tree::NodeId;

/// The smallest syntactically valid document, `"a"{ }` collapsed to four
/// characters. Anything shorter is rejected before scanning.
const SMALLEST_DOCUMENT: &str = "a{\n}";

/// Scanning mode. There is no terminal state; parsing ends with the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum Mode {
    /// Default scanning.
    #[default]
    None,
    /// Between a pair of `"`.
    InsideQuotes,
    /// After `//`, until end of line.
    InsideComment,
    /// Between `[` and `]`; content is discarded opaquely.
    InsideBrackets,
}

/// Parses `text` into `doc`, appending any parsed roots to the document's
/// existing root list.
pub(crate) fn parse_into(doc: &mut Document, text: &str) -> Result<()> {
    Parser::new(doc, text).run()
}

struct Parser<'a> {
    doc: &'a mut Document,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    mode: Mode,
    buf: String,
    staged: Option<String>,
    current: Option<NodeId>,
}

impl<'a> Parser<'a> {
    fn new(doc: &'a mut Document, text: &str) -> Self {
        Parser {
            doc,
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            mode: Mode::None,
            buf: String::new(),
            staged: None,
            current: None,
        }
    }

    fn run(mut self) -> Result<()> {
        if self.chars.len() < SMALLEST_DOCUMENT.len() {
            return Err(Error::InvalidDocument);
        }

        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];

            // Line feeds and escapes behave the same in every mode.
            match c {
                '\n' => {
                    self.end_line()?;
                    continue;
                }
                '\\' => {
                    self.consume_escape()?;
                    continue;
                }
                _ => {}
            }

            match self.mode {
                Mode::InsideComment => {
                    self.advance(1);
                    continue;
                }
                Mode::InsideBrackets => {
                    if c == ']' {
                        self.mode = Mode::None;
                    }
                    self.advance(1);
                    continue;
                }
                Mode::InsideQuotes => {
                    if c == '"' {
                        self.close_quoted_token()?;
                    } else {
                        self.buf.push(c);
                        self.advance(1);
                    }
                    continue;
                }
                Mode::None => {}
            }

            match c {
                '"' => self.open_quoted_token()?,
                '[' => self.enter_brackets()?,
                '/' if self.peek() == Some('/') => self.enter_comment()?,
                '{' => self.enter_node()?,
                '}' => self.exit_node()?,
                ' ' | '\r' | '\t' => {
                    // Whitespace is a delimiter for unquoted tokens.
                    self.flush_token(false)?;
                    self.advance(1);
                }
                _ => {
                    self.buf.push(c);
                    self.advance(1);
                }
            }
        }

        if self.current.is_some() {
            // An opened node was never closed before EOF.
            return Err(Error::unclosed_node(self.line, self.column));
        }
        Ok(())
    }

    fn advance(&mut self, count: usize) {
        self.pos += count;
        self.column += count;
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn end_line(&mut self) -> Result<()> {
        self.line += 1;
        self.column = 0;
        self.mode = Mode::None;
        // Newline is a delimiter for unquoted tokens.
        self.flush_token(false)?;
        self.advance(1);
        Ok(())
    }

    /// Resolves a backslash escape, appending the resolved character to the
    /// accumulation buffer and consuming both input characters.
    fn consume_escape(&mut self) -> Result<()> {
        let resolved = match self.peek() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('\\') => '\\',
            Some('"') => '"',
            Some(_) => {
                return Err(Error::InvalidEscape {
                    line: self.line,
                    column: self.column + 1,
                })
            }
            None => {
                return Err(Error::IncompleteEscape {
                    line: self.line,
                    column: self.column,
                })
            }
        };
        self.buf.push(resolved);
        self.advance(2);
        Ok(())
    }

    fn open_quoted_token(&mut self) -> Result<()> {
        self.mode = Mode::InsideQuotes;
        // An opening quote is a delimiter for a pending unquoted token.
        self.flush_token(false)?;
        self.buf.clear();
        self.advance(1);
        Ok(())
    }

    fn close_quoted_token(&mut self) -> Result<()> {
        self.mode = Mode::None;
        // Quotes denote an explicit token, so the flush is required even if
        // the accumulated token is empty.
        self.flush_token(true)?;
        self.advance(1);
        Ok(())
    }

    fn enter_brackets(&mut self) -> Result<()> {
        self.mode = Mode::InsideBrackets;
        self.flush_token(false)?;
        self.advance(1);
        Ok(())
    }

    fn enter_comment(&mut self) -> Result<()> {
        self.mode = Mode::InsideComment;
        // Comments can touch unquoted tokens, so flush first.
        self.flush_token(false)?;
        self.advance(2);
        Ok(())
    }

    /// Opens a node named by the staged (or just-accumulated) token and
    /// makes it current.
    fn enter_node(&mut self) -> Result<()> {
        if self.staged.is_none() {
            if self.buf.is_empty() {
                return Err(Error::missing_node_name(self.line, self.column));
            }
            self.staged = Some(std::mem::take(&mut self.buf));
        }
        let name = self.staged.take().unwrap_or_default();
        let node = self.doc.create_node(name, self.current)?;
        self.current = Some(node);
        self.advance(1);
        Ok(())
    }

    /// Closes the current node, returning to its parent (or the document
    /// root level). A stray closing brace at root level is ignored.
    fn exit_node(&mut self) -> Result<()> {
        self.flush_token(false)?;
        self.current = self.current.and_then(|id| self.doc.node(id).parent());
        self.advance(1);
        Ok(())
    }

    /// Reaches a token boundary. If a token is already staged, the staged
    /// token is a key name and the current buffer its value; otherwise the
    /// buffer becomes the staged token. `required` marks boundaries (closing
    /// quotes) where an explicit, possibly empty, token must be produced.
    fn flush_token(&mut self, required: bool) -> Result<()> {
        match self.staged.take() {
            Some(name) => {
                if !required && self.buf.is_empty() {
                    // Not a boundary for this pair yet; keep the name staged.
                    self.staged = Some(name);
                    return Ok(());
                }
                let value = std::mem::take(&mut self.buf);
                let Some(current) = self.current else {
                    return Err(Error::key_outside_node(self.line, self.column));
                };
                self.doc.create_key(name, value, current)?;
            }
            None => {
                if self.buf.is_empty() {
                    if required {
                        return Err(Error::MissingTokenName {
                            line: self.line,
                            column: self.column,
                        });
                    }
                    return Ok(());
                }
                self.staged = Some(std::mem::take(&mut self.buf));
            }
        }
        Ok(())
    }
}
