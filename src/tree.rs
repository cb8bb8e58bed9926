//! The VDF token tree: nodes, keys and the handles that link them.
//!
//! A [`crate::Document`] owns every token in its tree through two internal
//! arenas, one for nodes and one for keys. Client code holds [`NodeId`] and
//! [`KeyId`] handles and resolves them through the document. Parent links are
//! stored as handles too, so the cyclic parent/child relationship never
//! becomes a second owning reference: ownership flows strictly
//! Document → root nodes → descendants.
//!
//! Arena slots are never reused. A handle to a removed token stays dead
//! forever instead of silently aliasing a newer token; resolving it returns
//! `None` through the checked accessors.
//!
//! ## Core types
//!
//! - [`Node`]: a named container holding ordered keys and ordered child nodes
//! - [`Key`]: a named string value owned by exactly one node
//! - [`CaseSensitivity`]: how name lookups compare names
//!
//! ## Examples
//!
//! ```rust
//! use vdf_tree::{CaseSensitivity, Document};
//!
//! let mut doc = Document::new();
//! let root = doc.create_node("AppState", None).unwrap();
//! doc.create_key("name", "Half-Life", root).unwrap();
//!
//! let key = doc.find_key(root, "NAME", CaseSensitivity::Insensitive).unwrap();
//! assert_eq!(doc.key(key).value(), "Half-Life");
//! ```

use crate::{Error, Result};

/// Handle to a [`Node`] inside a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

/// Handle to a [`Key`] inside a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyId(pub(crate) u32);

/// Controls how name lookups compare names.
///
/// The default is [`CaseSensitivity::Insensitive`], matching how Steam
/// manifest consumers look up fields. Insensitive comparison folds both
/// sides with Unicode lowercasing.
///
/// # Examples
///
/// ```rust
/// use vdf_tree::CaseSensitivity;
///
/// assert_eq!(CaseSensitivity::default(), CaseSensitivity::Insensitive);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CaseSensitivity {
    /// Names must match exactly.
    Sensitive,
    /// Names match under case folding.
    #[default]
    Insensitive,
}

impl CaseSensitivity {
    /// Compares two names under this sensitivity.
    pub(crate) fn matches(self, a: &str, b: &str) -> bool {
        match self {
            CaseSensitivity::Sensitive => a == b,
            CaseSensitivity::Insensitive => a.to_lowercase() == b.to_lowercase(),
        }
    }
}

/// A named container holding ordered [`Key`]s and ordered child [`Node`]s.
///
/// The order of `keys()` and `children()` is insertion order and controls
/// serialization order. A node is either a root (no parent, member of the
/// document's root list) or a descendant (exactly one parent node); never
/// both.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    parent: Option<NodeId>,
    /// Set iff this node sits in the document's root list.
    in_document: bool,
    keys: Vec<KeyId>,
    children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        Ok(Node {
            name,
            parent: None,
            in_document: false,
            keys: Vec::new(),
            children: Vec::new(),
        })
    }

    /// The node's name. Never empty.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the node. Renaming never changes tree position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyName`] if `name` is empty.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        self.name = name;
        Ok(())
    }

    /// The parent node, or `None` for roots and detached nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Whether this node is a root owned directly by the document.
    pub fn is_root(&self) -> bool {
        self.in_document
    }

    /// The node's keys in insertion order.
    pub fn keys(&self) -> &[KeyId] {
        &self.keys
    }

    /// The node's child nodes in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn set_in_document(&mut self, in_document: bool) {
        self.in_document = in_document;
    }

    pub(crate) fn keys_mut(&mut self) -> &mut Vec<KeyId> {
        &mut self.keys
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }
}

/// A named string value owned by exactly one [`Node`].
///
/// Unlike a node, a key can never be a root: constructing one requires a
/// parent node, and the parent link is only `None` while the key is detached.
#[derive(Debug, Clone)]
pub struct Key {
    name: String,
    value: String,
    parent: Option<NodeId>,
}

impl Key {
    pub(crate) fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        parent: NodeId,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        Ok(Key {
            name,
            value: value.into(),
            parent: Some(parent),
        })
    }

    /// The key's name. Never empty.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyName`] if `name` is empty.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        self.name = name;
        Ok(())
    }

    /// The key's value. May be empty.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the key's value. Empty values are allowed.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// The owning node, or `None` while the key is detached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}

/// Slot storage for tokens. Indices are handed out once and never reused,
/// so removal leaves a permanently vacant slot behind.
#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena::new()
    }
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Self {
        Arena { slots: Vec::new() }
    }

    pub(crate) fn insert(&mut self, value: T) -> u32 {
        let index = self.slots.len() as u32;
        self.slots.push(Some(value));
        index
    }

    pub(crate) fn get(&self, index: u32) -> Option<&T> {
        self.slots.get(index as usize).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.slots.get_mut(index as usize).and_then(Option::as_mut)
    }

    pub(crate) fn remove(&mut self, index: u32) -> Option<T> {
        self.slots.get_mut(index as usize).and_then(Option::take)
    }
}
