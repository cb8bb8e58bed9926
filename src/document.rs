//! The document façade: ownership, lookup, mutation and load/save.
//!
//! A [`Document`] is the sole owner of a VDF tree. It holds the ordered list
//! of root nodes plus the arenas every [`Node`] and [`Key`] lives in, and it
//! composes the parser and serializer behind [`Document::parse`],
//! [`Document::load`], [`Document::save`] and [`Document::render`].
//!
//! All tree mutation goes through the document so that the bidirectional
//! parent/child links stay consistent: detaching clears back-references,
//! migrating is atomic (the token is never in both or neither collection),
//! and duplication yields a structurally independent clone.
//!
//! ## Handles
//!
//! [`NodeId`]/[`KeyId`] handles are resolved through the document. The
//! indexed accessors ([`Document::node`], [`Document::key`] and their `_mut`
//! twins) panic when given a handle to a token that was removed with
//! [`Document::remove_node`]/[`Document::remove_key`]; the checked `get_*`
//! accessors return `None` instead. Handles are never reused, so a dead
//! handle can never resolve to a different token.
//!
//! ## Examples
//!
//! ```rust
//! use vdf_tree::{CaseSensitivity, Document, FormatOptions};
//!
//! let mut doc: Document = "\"AppState\" { \"appid\" \"70\" }".parse().unwrap();
//! let root = doc.expect_root("appstate", CaseSensitivity::Insensitive).unwrap();
//! assert_eq!(doc.find_key_value(root, "appid", CaseSensitivity::default()), Some("70"));
//!
//! doc.create_key("name", "Half-Life", root).unwrap();
//! let text = doc.render(&FormatOptions::compact());
//! assert_eq!(text, "\"AppState\"{\"appid\" \"70\"\"name\" \"Half-Life\"}");
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::options::FormatOptions;
use crate::parser;
use crate::ser;
use crate::tree::{Arena, CaseSensitivity, Key, KeyId, Node, NodeId};

/// The top-level owner of a VDF tree.
///
/// Dropping the document drops every node and key transitively reachable
/// from it; the `parent` back-references held by tokens never extend a
/// lifetime.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Arena<Node>,
    keys: Arena<Key>,
    roots: Vec<NodeId>,
}

impl Document {
    /// Creates an empty document with no root nodes.
    #[must_use]
    pub fn new() -> Self {
        Document {
            nodes: Arena::new(),
            keys: Arena::new(),
            roots: Vec::new(),
        }
    }

    // ---- accessors -------------------------------------------------------

    /// The root nodes in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Resolves a node handle.
    ///
    /// # Panics
    ///
    /// Panics if the node was removed from the document.
    pub fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id.0) {
            Some(node) => node,
            None => panic!("NodeId({}) refers to a removed node", id.0),
        }
    }

    /// Resolves a node handle mutably.
    ///
    /// # Panics
    ///
    /// Panics if the node was removed from the document.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.0) {
            Some(node) => node,
            None => panic!("NodeId({}) refers to a removed node", id.0),
        }
    }

    /// Resolves a key handle.
    ///
    /// # Panics
    ///
    /// Panics if the key was removed from the document.
    pub fn key(&self, id: KeyId) -> &Key {
        match self.keys.get(id.0) {
            Some(key) => key,
            None => panic!("KeyId({}) refers to a removed key", id.0),
        }
    }

    /// Resolves a key handle mutably.
    ///
    /// # Panics
    ///
    /// Panics if the key was removed from the document.
    pub fn key_mut(&mut self, id: KeyId) -> &mut Key {
        match self.keys.get_mut(id.0) {
            Some(key) => key,
            None => panic!("KeyId({}) refers to a removed key", id.0),
        }
    }

    /// Resolves a node handle, returning `None` if the node was removed.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Resolves a node handle mutably, returning `None` if removed.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Resolves a key handle, returning `None` if the key was removed.
    pub fn get_key(&self, id: KeyId) -> Option<&Key> {
        self.keys.get(id.0)
    }

    /// Resolves a key handle mutably, returning `None` if removed.
    pub fn get_key_mut(&mut self, id: KeyId) -> Option<&mut Key> {
        self.keys.get_mut(id.0)
    }

    // ---- creation --------------------------------------------------------

    /// Creates a node and attaches it under `parent`, or as a new root when
    /// `parent` is `None`. The node is appended to the end of the target
    /// collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyName`] if `name` is empty.
    pub fn create_node(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        let mut node = Node::new(name)?;
        match parent {
            Some(pid) => {
                self.node(pid); // stale-handle check before the arena grows
                node.set_parent(Some(pid));
                let id = NodeId(self.nodes.insert(node));
                self.node_mut(pid).children_mut().push(id);
                Ok(id)
            }
            None => {
                node.set_in_document(true);
                let id = NodeId(self.nodes.insert(node));
                self.roots.push(id);
                Ok(id)
            }
        }
    }

    /// Creates a key under `parent`. A key always requires a parent node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyName`] if `name` is empty. The value may be
    /// empty.
    pub fn create_key(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        parent: NodeId,
    ) -> Result<KeyId> {
        self.node(parent); // stale-handle check before the arena grows
        let key = Key::new(name, value, parent)?;
        let id = KeyId(self.keys.insert(key));
        self.node_mut(parent).keys_mut().push(id);
        Ok(id)
    }

    // ---- lookup ----------------------------------------------------------

    /// Finds the first root node whose name matches, in insertion order.
    pub fn find_root(&self, name: &str, case: CaseSensitivity) -> Option<NodeId> {
        self.roots
            .iter()
            .copied()
            .find(|&id| case.matches(self.node(id).name(), name))
    }

    /// Like [`Document::find_root`], but returns the position in the root
    /// list.
    pub fn find_root_index(&self, name: &str, case: CaseSensitivity) -> Option<usize> {
        self.roots
            .iter()
            .position(|&id| case.matches(self.node(id).name(), name))
    }

    /// Finds the first child node of `parent` whose name matches.
    pub fn find_child(&self, parent: NodeId, name: &str, case: CaseSensitivity) -> Option<NodeId> {
        self.node(parent)
            .children()
            .iter()
            .copied()
            .find(|&id| case.matches(self.node(id).name(), name))
    }

    /// Like [`Document::find_child`], but returns the position in the
    /// parent's child list.
    pub fn find_child_index(
        &self,
        parent: NodeId,
        name: &str,
        case: CaseSensitivity,
    ) -> Option<usize> {
        self.node(parent)
            .children()
            .iter()
            .position(|&id| case.matches(self.node(id).name(), name))
    }

    /// Finds the first key of `node` whose name matches.
    pub fn find_key(&self, node: NodeId, name: &str, case: CaseSensitivity) -> Option<KeyId> {
        self.node(node)
            .keys()
            .iter()
            .copied()
            .find(|&id| case.matches(self.key(id).name(), name))
    }

    /// Like [`Document::find_key`], but returns the position in the node's
    /// key list.
    pub fn find_key_index(
        &self,
        node: NodeId,
        name: &str,
        case: CaseSensitivity,
    ) -> Option<usize> {
        self.node(node)
            .keys()
            .iter()
            .position(|&id| case.matches(self.key(id).name(), name))
    }

    /// Shorthand for looking up a key and reading its value, the access
    /// pattern manifest consumers use.
    pub fn find_key_value(&self, node: NodeId, name: &str, case: CaseSensitivity) -> Option<&str> {
        self.find_key(node, name, case).map(|id| self.key(id).value())
    }

    /// Strict variant of [`Document::find_root`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TokenNotFound`] when no root matches.
    pub fn expect_root(&self, name: &str, case: CaseSensitivity) -> Result<NodeId> {
        self.find_root(name, case).ok_or_else(|| Error::not_found(name))
    }

    /// Strict variant of [`Document::find_child`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TokenNotFound`] when no child matches.
    pub fn expect_child(&self, parent: NodeId, name: &str, case: CaseSensitivity) -> Result<NodeId> {
        self.find_child(parent, name, case)
            .ok_or_else(|| Error::not_found(name))
    }

    /// Strict variant of [`Document::find_key`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TokenNotFound`] when no key matches.
    pub fn expect_key(&self, node: NodeId, name: &str, case: CaseSensitivity) -> Result<KeyId> {
        self.find_key(node, name, case)
            .ok_or_else(|| Error::not_found(name))
    }

    // ---- mutation --------------------------------------------------------

    /// Detaches a node from its owning collection and clears its parent
    /// back-reference. The node stays alive and can be re-homed with
    /// [`Document::attach_node`] or destroyed with
    /// [`Document::remove_node`].
    ///
    /// For a root node the document link is only severed when
    /// `full_removal` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DetachedToken`] when there is nothing to detach
    /// from: the node has no parent and is either already detached or a root
    /// without `full_removal`.
    pub fn detach_node(&mut self, id: NodeId, full_removal: bool) -> Result<()> {
        let parent = self.node(id).parent();
        match parent {
            Some(pid) => {
                self.node_mut(pid).children_mut().retain(|&c| c != id);
                self.node_mut(id).set_parent(None);
                Ok(())
            }
            None if self.node(id).is_root() && full_removal => {
                self.roots.retain(|&r| r != id);
                self.node_mut(id).set_in_document(false);
                Ok(())
            }
            None => Err(Error::DetachedToken {
                name: self.node(id).name().to_string(),
            }),
        }
    }

    /// Detaches a key from its owning node and clears its parent link.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DetachedToken`] if the key is already detached.
    pub fn detach_key(&mut self, id: KeyId) -> Result<()> {
        let Some(pid) = self.key(id).parent() else {
            return Err(Error::DetachedToken {
                name: self.key(id).name().to_string(),
            });
        };
        self.node_mut(pid).keys_mut().retain(|&k| k != id);
        self.key_mut(id).set_parent(None);
        Ok(())
    }

    /// Attaches a detached node under `parent`, or as a new root when
    /// `parent` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyAttached`] if the node is still part of a
    /// collection, or [`Error::WouldCreateCycle`] if `parent` lies inside
    /// the node's own subtree.
    pub fn attach_node(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<()> {
        if self.node(id).parent().is_some() || self.node(id).is_root() {
            return Err(Error::AlreadyAttached {
                name: self.node(id).name().to_string(),
            });
        }
        match parent {
            Some(pid) => {
                self.node(pid); // stale-handle check
                if pid == id || self.has_ancestor(pid, id) {
                    return Err(Error::WouldCreateCycle {
                        name: self.node(id).name().to_string(),
                    });
                }
                self.node_mut(pid).children_mut().push(id);
                self.node_mut(id).set_parent(Some(pid));
            }
            None => {
                self.roots.push(id);
                self.node_mut(id).set_in_document(true);
            }
        }
        Ok(())
    }

    /// Attaches a detached key to `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyAttached`] if the key is still owned by a
    /// node.
    pub fn attach_key(&mut self, id: KeyId, parent: NodeId) -> Result<()> {
        if self.key(id).parent().is_some() {
            return Err(Error::AlreadyAttached {
                name: self.key(id).name().to_string(),
            });
        }
        self.node(parent); // stale-handle check
        self.node_mut(parent).keys_mut().push(id);
        self.key_mut(id).set_parent(Some(parent));
        Ok(())
    }

    /// Moves a node to a new parent in one step: it is unlinked from
    /// whichever collection holds it (parent's child list or the root list)
    /// and appended to `new_parent`'s children. The node is never in both
    /// or neither collection. A detached node is simply attached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WouldCreateCycle`] if `new_parent` is the node
    /// itself or one of its descendants.
    pub fn migrate_node(&mut self, id: NodeId, new_parent: NodeId) -> Result<()> {
        self.node(new_parent); // stale-handle check
        if new_parent == id || self.has_ancestor(new_parent, id) {
            return Err(Error::WouldCreateCycle {
                name: self.node(id).name().to_string(),
            });
        }
        match self.node(id).parent() {
            Some(pid) => {
                self.node_mut(pid).children_mut().retain(|&c| c != id);
            }
            None if self.node(id).is_root() => {
                self.roots.retain(|&r| r != id);
                self.node_mut(id).set_in_document(false);
            }
            None => {}
        }
        self.node_mut(new_parent).children_mut().push(id);
        self.node_mut(id).set_parent(Some(new_parent));
        Ok(())
    }

    /// Moves a key to a new owning node in one step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DetachedToken`] if the key has no current parent.
    pub fn migrate_key(&mut self, id: KeyId, new_parent: NodeId) -> Result<()> {
        self.node(new_parent); // stale-handle check
        let Some(pid) = self.key(id).parent() else {
            return Err(Error::DetachedToken {
                name: self.key(id).name().to_string(),
            });
        };
        self.node_mut(pid).keys_mut().retain(|&k| k != id);
        self.node_mut(new_parent).keys_mut().push(id);
        self.key_mut(id).set_parent(Some(new_parent));
        Ok(())
    }

    /// Deep-clones a node, recursively cloning all descendant keys and
    /// nodes, and attaches the clone under `new_parent` (or as a new root
    /// when `None`). The original is untouched and the clone is fully
    /// independent of it.
    ///
    /// The clone is a fresh subtree, so `new_parent` may be the source node
    /// itself or any node inside its subtree; the copy reflects the source
    /// as it was before the call.
    pub fn duplicate_node(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<NodeId> {
        self.node(id);
        if let Some(pid) = new_parent {
            self.node(pid);
        }
        let clone = self.clone_subtree(id)?;
        self.attach_node(clone, new_parent)?;
        Ok(clone)
    }

    /// Shallow-clones a key (name and value) onto `new_parent`.
    pub fn duplicate_key(&mut self, id: KeyId, new_parent: NodeId) -> Result<KeyId> {
        let (name, value) = {
            let key = self.key(id);
            (key.name().to_string(), key.value().to_string())
        };
        self.create_key(name, value, new_parent)
    }

    /// Destroys a node and its whole subtree, unlinking it from its owning
    /// collection first. All handles into the subtree become dead.
    pub fn remove_node(&mut self, id: NodeId) {
        match self.node(id).parent() {
            Some(pid) => {
                self.node_mut(pid).children_mut().retain(|&c| c != id);
            }
            None if self.node(id).is_root() => {
                self.roots.retain(|&r| r != id);
            }
            None => {}
        }
        self.free_subtree(id);
    }

    /// Destroys a key, unlinking it from its owning node first.
    pub fn remove_key(&mut self, id: KeyId) {
        if let Some(pid) = self.key(id).parent() {
            self.node_mut(pid).keys_mut().retain(|&k| k != id);
        }
        self.keys.remove(id.0);
    }

    /// Finds a root by name and destroys it. Returns whether a root was
    /// removed.
    pub fn remove_root_by_name(&mut self, name: &str, case: CaseSensitivity) -> bool {
        match self.find_root(name, case) {
            Some(id) => {
                self.remove_node(id);
                true
            }
            None => false,
        }
    }

    /// Finds a child of `parent` by name and destroys it. Returns whether a
    /// child was removed.
    pub fn remove_child_by_name(
        &mut self,
        parent: NodeId,
        name: &str,
        case: CaseSensitivity,
    ) -> bool {
        match self.find_child(parent, name, case) {
            Some(id) => {
                self.remove_node(id);
                true
            }
            None => false,
        }
    }

    /// Finds a key of `node` by name and destroys it. Returns whether a key
    /// was removed.
    pub fn remove_key_by_name(&mut self, node: NodeId, name: &str, case: CaseSensitivity) -> bool {
        match self.find_key(node, name, case) {
            Some(id) => {
                self.remove_key(id);
                true
            }
            None => false,
        }
    }

    // ---- parse / render / I/O -------------------------------------------

    /// Parses VDF text, appending any parsed root nodes to this document.
    ///
    /// # Errors
    ///
    /// Returns a malformed-input error with the 1-based line and column of
    /// the first offending construct.
    pub fn parse(&mut self, text: &str) -> Result<()> {
        parser::parse_into(self, text)
    }

    /// Reads and parses a whole VDF file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if `path` does not exist, an
    /// [`Error::Io`] for other read failures, or a malformed-input error
    /// from parsing.
    pub fn load(path: impl AsRef<Path>) -> Result<Document> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let text = fs::read_to_string(path).map_err(|e| Error::io(&e))?;
        let mut doc = Document::new();
        doc.parse(&text)?;
        Ok(doc)
    }

    /// Writes the document to `path` with default formatting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileExists`] if `path` exists and `overwrite` is
    /// false, or [`Error::Io`] on write failure.
    pub fn save(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        self.save_with_options(path, &FormatOptions::default(), overwrite)
    }

    /// Writes the document to `path` with the given formatting options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileExists`] if `path` exists and `overwrite` is
    /// false, or [`Error::Io`] on write failure.
    pub fn save_with_options(
        &self,
        path: impl AsRef<Path>,
        options: &FormatOptions,
        overwrite: bool,
    ) -> Result<()> {
        let path = path.as_ref();
        if !overwrite && path.exists() {
            return Err(Error::FileExists {
                path: path.display().to_string(),
            });
        }
        fs::write(path, self.render(options)).map_err(|e| Error::io(&e))
    }

    /// Renders the whole document: root nodes joined by the delimiter, no
    /// trailing delimiter after the last root.
    #[must_use]
    pub fn render(&self, options: &FormatOptions) -> String {
        ser::render_document(self, options)
    }

    /// Renders a single node and its subtree.
    #[must_use]
    pub fn render_node(&self, id: NodeId, options: &FormatOptions) -> String {
        let mut out = String::new();
        ser::render_node(self, id, options, options.indent, &mut out);
        out
    }

    /// Renders a single key as `"name" "value"` at `indent` tab stops.
    #[must_use]
    pub fn render_key(&self, id: KeyId, indent: usize) -> String {
        let mut out = String::new();
        ser::render_key(self, id, indent, &mut out);
        out
    }

    // ---- internals -------------------------------------------------------

    /// Whether `ancestor` appears on `node`'s parent chain.
    fn has_ancestor(&self, mut node: NodeId, ancestor: NodeId) -> bool {
        while let Some(parent) = self.node(node).parent() {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }

    /// Builds a detached deep copy of `src`'s subtree. The copy is linked
    /// only within itself and is never visible from the source tree, so the
    /// walk covers exactly the tokens the source held when the call began,
    /// even when the copy's eventual destination lies inside the source.
    fn clone_subtree(&mut self, src: NodeId) -> Result<NodeId> {
        let name = self.node(src).name().to_string();
        let key_ids = self.node(src).keys().to_vec();
        let child_ids = self.node(src).children().to_vec();

        let clone = NodeId(self.nodes.insert(Node::new(name)?));
        for key in key_ids {
            self.duplicate_key(key, clone)?;
        }
        for child in child_ids {
            let child_clone = self.clone_subtree(child)?;
            self.node_mut(clone).children_mut().push(child_clone);
            self.node_mut(child_clone).set_parent(Some(clone));
        }
        Ok(clone)
    }

    fn free_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(id.0) {
            for &key in node.keys() {
                self.keys.remove(key.0);
            }
            for &child in node.children() {
                self.free_subtree(child);
            }
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&FormatOptions::default()))
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Document> {
        let mut doc = Document::new();
        doc.parse(s)?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensitive() -> CaseSensitivity {
        CaseSensitivity::Sensitive
    }

    fn insensitive() -> CaseSensitivity {
        CaseSensitivity::Insensitive
    }

    #[test]
    fn created_root_has_document_link_and_no_parent() {
        let mut doc = Document::new();
        let root = doc.create_node("Root", None).unwrap();
        assert!(doc.node(root).is_root());
        assert_eq!(doc.node(root).parent(), None);
        assert_eq!(doc.roots(), &[root]);
    }

    #[test]
    fn created_child_has_parent_and_no_document_link() {
        let mut doc = Document::new();
        let root = doc.create_node("Root", None).unwrap();
        let child = doc.create_node("Child", Some(root)).unwrap();
        assert!(!doc.node(child).is_root());
        assert_eq!(doc.node(child).parent(), Some(root));
        assert_eq!(doc.node(root).children(), &[child]);
    }

    #[test]
    fn find_is_first_match_in_insertion_order() {
        let mut doc = Document::new();
        let root = doc.create_node("Root", None).unwrap();
        let first = doc.create_key("dup", "1", root).unwrap();
        doc.create_key("DUP", "2", root).unwrap();

        assert_eq!(doc.find_key(root, "dup", insensitive()), Some(first));
        assert_eq!(doc.find_key_index(root, "dup", insensitive()), Some(0));
        assert_eq!(doc.find_key_value(root, "dup", insensitive()), Some("1"));
        // A sensitive lookup skips the first, differently-cased key.
        assert_eq!(doc.find_key_value(root, "DUP", sensitive()), Some("2"));
    }

    #[test]
    fn strict_lookup_reports_the_missing_name() {
        let mut doc = Document::new();
        let root = doc.create_node("Root", None).unwrap();
        let err = doc.expect_key(root, "absent", insensitive()).unwrap_err();
        assert!(matches!(err, Error::TokenNotFound { name } if name == "absent"));
    }

    #[test]
    fn detach_leaves_token_in_zero_collections() {
        let mut doc = Document::new();
        let root = doc.create_node("Root", None).unwrap();
        let child = doc.create_node("Child", Some(root)).unwrap();

        doc.detach_node(child, false).unwrap();
        assert_eq!(doc.node(child).parent(), None);
        assert!(!doc.node(child).is_root());
        assert!(doc.node(root).children().is_empty());

        // Detaching again has nothing to work on.
        assert!(matches!(
            doc.detach_node(child, false),
            Err(Error::DetachedToken { .. })
        ));
    }

    #[test]
    fn detaching_a_root_requires_full_removal() {
        let mut doc = Document::new();
        let root = doc.create_node("Root", None).unwrap();

        assert!(matches!(
            doc.detach_node(root, false),
            Err(Error::DetachedToken { .. })
        ));
        doc.detach_node(root, true).unwrap();
        assert!(doc.roots().is_empty());
        assert!(!doc.node(root).is_root());
    }

    #[test]
    fn detached_node_can_be_reattached_elsewhere() {
        let mut doc = Document::new();
        let a = doc.create_node("A", None).unwrap();
        let b = doc.create_node("B", None).unwrap();
        let child = doc.create_node("Child", Some(a)).unwrap();

        doc.detach_node(child, false).unwrap();
        doc.attach_node(child, Some(b)).unwrap();
        assert_eq!(doc.node(child).parent(), Some(b));
        assert_eq!(doc.node(b).children(), &[child]);

        assert!(matches!(
            doc.attach_node(child, Some(a)),
            Err(Error::AlreadyAttached { .. })
        ));
    }

    #[test]
    fn migrate_node_is_atomic_across_collections() {
        let mut doc = Document::new();
        let a = doc.create_node("A", None).unwrap();
        let b = doc.create_node("B", None).unwrap();
        let child = doc.create_node("Child", Some(a)).unwrap();

        doc.migrate_node(child, b).unwrap();
        assert!(doc.node(a).children().is_empty());
        assert_eq!(doc.node(b).children(), &[child]);
        assert_eq!(doc.node(child).parent(), Some(b));
    }

    #[test]
    fn migrating_a_root_removes_it_from_the_root_list() {
        let mut doc = Document::new();
        let a = doc.create_node("A", None).unwrap();
        let b = doc.create_node("B", None).unwrap();

        doc.migrate_node(a, b).unwrap();
        assert_eq!(doc.roots(), &[b]);
        assert_eq!(doc.node(b).children(), &[a]);
        assert_eq!(doc.node(a).parent(), Some(b));
        assert!(!doc.node(a).is_root());
    }

    #[test]
    fn migrate_into_own_subtree_is_rejected() {
        let mut doc = Document::new();
        let root = doc.create_node("Root", None).unwrap();
        let child = doc.create_node("Child", Some(root)).unwrap();
        let grandchild = doc.create_node("Grandchild", Some(child)).unwrap();

        assert!(matches!(
            doc.migrate_node(root, grandchild),
            Err(Error::WouldCreateCycle { .. })
        ));
        assert!(matches!(
            doc.migrate_node(root, root),
            Err(Error::WouldCreateCycle { .. })
        ));
        // The failed migration must not have unlinked anything.
        assert_eq!(doc.roots(), &[root]);
    }

    #[test]
    fn migrate_key_moves_between_nodes() {
        let mut doc = Document::new();
        let a = doc.create_node("A", None).unwrap();
        let b = doc.create_node("B", None).unwrap();
        let key = doc.create_key("k", "v", a).unwrap();

        doc.migrate_key(key, b).unwrap();
        assert!(doc.node(a).keys().is_empty());
        assert_eq!(doc.node(b).keys(), &[key]);
        assert_eq!(doc.key(key).parent(), Some(b));

        doc.detach_key(key).unwrap();
        assert!(matches!(
            doc.migrate_key(key, a),
            Err(Error::DetachedToken { .. })
        ));
    }

    #[test]
    fn duplicate_node_is_structurally_independent() {
        let mut doc = Document::new();
        let a = doc.create_node("A", None).unwrap();
        let k = doc.create_key("K", "1", a).unwrap();

        let a2 = doc.duplicate_node(a, None).unwrap();
        assert_ne!(a, a2);
        assert!(doc.node(a2).is_root());

        let k2 = doc.node(a2).keys()[0];
        assert_eq!(doc.key(k2).name(), "K");
        assert_eq!(doc.key(k2).value(), "1");

        doc.key_mut(k2).set_value("2");
        doc.node_mut(a2).set_name("A2").unwrap();
        assert_eq!(doc.key(k).value(), "1");
        assert_eq!(doc.node(a).name(), "A");
    }

    #[test]
    fn duplicate_clones_the_whole_subtree_in_order() {
        let mut doc: Document =
            "\"A\" { \"k1\" \"1\" \"k2\" \"2\" \"inner\" { \"deep\" \"d\" } }"
                .parse()
                .unwrap();
        let a = doc.roots()[0];
        let target = doc.create_node("Target", None).unwrap();

        let copy = doc.duplicate_node(a, Some(target)).unwrap();
        assert_eq!(doc.node(copy).parent(), Some(target));
        assert_eq!(doc.node(copy).keys().len(), 2);
        assert_eq!(doc.key(doc.node(copy).keys()[0]).name(), "k1");
        assert_eq!(doc.key(doc.node(copy).keys()[1]).name(), "k2");

        let inner_copy = doc.node(copy).children()[0];
        assert_eq!(
            doc.find_key_value(inner_copy, "deep", insensitive()),
            Some("d")
        );
    }

    #[test]
    fn duplicate_onto_the_source_itself_nests_the_copy() {
        let mut doc = Document::new();
        let a = doc.create_node("A", None).unwrap();
        doc.create_key("k", "v", a).unwrap();
        let b = doc.create_node("B", Some(a)).unwrap();

        let copy = doc.duplicate_node(a, Some(a)).unwrap();
        assert_eq!(doc.node(copy).parent(), Some(a));
        assert_eq!(doc.node(a).children(), &[b, copy]);

        // The copy reflects the source as it was, without the copy inside.
        assert_eq!(doc.node(copy).keys().len(), 1);
        assert_eq!(doc.node(copy).children().len(), 1);
        let b_copy = doc.node(copy).children()[0];
        assert_eq!(doc.node(b_copy).name(), "B");
        assert!(doc.node(b_copy).children().is_empty());
    }

    #[test]
    fn duplicate_onto_a_node_inside_the_source_subtree() {
        let mut doc: Document = "\"A\" { \"B\" { \"G\" { \"k\" \"v\" } } }"
            .parse()
            .unwrap();
        let a = doc.roots()[0];
        let b = doc.node(a).children()[0];
        let g = doc.node(b).children()[0];

        let copy = doc.duplicate_node(a, Some(g)).unwrap();
        assert_eq!(doc.node(copy).parent(), Some(g));
        assert_eq!(doc.node(g).children(), &[copy]);

        // The copy is exactly as deep as the source was: A > B > G.
        let b_copy = doc.node(copy).children()[0];
        let g_copy = doc.node(b_copy).children()[0];
        assert!(doc.node(g_copy).children().is_empty());
        assert_eq!(doc.find_key_value(g_copy, "k", insensitive()), Some("v"));
    }

    #[test]
    fn index_lookups_report_positions_in_their_collections() {
        let doc: Document = "\"A\" { }\n\"B\" { \"inner\" { } \"other\" { } }"
            .parse()
            .unwrap();
        assert_eq!(doc.find_root_index("b", insensitive()), Some(1));
        assert_eq!(doc.find_root_index("B", sensitive()), Some(1));
        assert_eq!(doc.find_root_index("b", sensitive()), None);

        let b = doc.roots()[1];
        assert_eq!(doc.find_child_index(b, "OTHER", insensitive()), Some(1));
        assert_eq!(doc.find_child_index(b, "OTHER", sensitive()), None);
        assert_eq!(doc.find_child_index(b, "missing", insensitive()), None);
    }

    #[test]
    fn detached_key_can_be_reattached_but_attached_key_cannot() {
        let mut doc = Document::new();
        let a = doc.create_node("A", None).unwrap();
        let b = doc.create_node("B", None).unwrap();
        let key = doc.create_key("k", "v", a).unwrap();

        assert!(matches!(
            doc.attach_key(key, b),
            Err(Error::AlreadyAttached { .. })
        ));

        doc.detach_key(key).unwrap();
        doc.attach_key(key, b).unwrap();
        assert_eq!(doc.key(key).parent(), Some(b));
        assert_eq!(doc.node(b).keys(), &[key]);
        assert!(doc.node(a).keys().is_empty());
    }

    #[test]
    fn remove_child_by_name_destroys_only_the_named_subtree() {
        let mut doc: Document = "\"Root\" { \"keep\" { } \"drop\" { \"k\" \"v\" } }"
            .parse()
            .unwrap();
        let root = doc.roots()[0];
        let dropped = doc.find_child(root, "drop", insensitive()).unwrap();

        assert!(doc.remove_child_by_name(root, "DROP", insensitive()));
        assert!(!doc.remove_child_by_name(root, "drop", insensitive()));
        assert!(doc.get_node(dropped).is_none());
        assert_eq!(doc.node(root).children().len(), 1);
        assert!(doc.find_child(root, "keep", insensitive()).is_some());
    }

    #[test]
    fn render_key_emits_a_single_quoted_pair() {
        let mut doc = Document::new();
        let root = doc.create_node("Root", None).unwrap();
        let key = doc.create_key("name", "Half-Life", root).unwrap();

        assert_eq!(doc.render_key(key, 0), "\"name\" \"Half-Life\"");
        assert_eq!(doc.render_key(key, 2), "\t\t\"name\" \"Half-Life\"");
    }

    #[test]
    fn remove_node_frees_the_subtree() {
        let mut doc = Document::new();
        let root = doc.create_node("Root", None).unwrap();
        let child = doc.create_node("Child", Some(root)).unwrap();
        let key = doc.create_key("k", "v", child).unwrap();

        doc.remove_node(root);
        assert!(doc.roots().is_empty());
        assert!(doc.get_node(root).is_none());
        assert!(doc.get_node(child).is_none());
        assert!(doc.get_key(key).is_none());
    }

    #[test]
    fn remove_by_name_reports_whether_anything_matched() {
        let mut doc: Document = "\"A\" { \"k\" \"v\" }\n\"B\" { }".parse().unwrap();
        let a = doc.roots()[0];

        assert!(doc.remove_key_by_name(a, "K", insensitive()));
        assert!(!doc.remove_key_by_name(a, "K", insensitive()));
        assert!(doc.remove_root_by_name("b", insensitive()));
        assert_eq!(doc.roots().len(), 1);
    }

    #[test]
    fn load_fails_for_missing_file() {
        let err = Document::load("/definitely/not/here.vdf").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn display_uses_default_formatting() {
        let doc: Document = "\"Root\" { \"k\" \"v\" }".parse().unwrap();
        assert_eq!(doc.to_string(), "\"Root\"\n{\n\t\"k\" \"v\"\n}");
    }
}
