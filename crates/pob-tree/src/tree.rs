//! The node arena and alias index.
//!
//! [`ObjectTree`] owns the object store and a strict tree of [`Node`]s
//! projected from it. Nodes live in a [`HashMap`] keyed by [`NodeId`]; parent
//! links are plain ids and ownership flows from parent to child. A side index
//! maps every tracked [`ValueId`] to the nodes currently showing it.
//!
//! # Invariants
//!
//! - Exactly one node has [`Parentage::Root`]; every other node's parent is
//!   live and lists it among its children.
//! - Every live node appears exactly once in the alias index under its value.
//! - When the tree is torn down the alias index is empty.

use std::collections::{HashMap, VecDeque};

use pob_store::{parse_value, ObjectStore, PdfValue};
use pob_types::{DataType, Name, ObjectRef, ValueId};
use tracing::{debug, warn};

use crate::config::{ProjectionRoot, TreeConfig};
use crate::error::{TreeError, TreeResult};
use crate::node::{Node, NodeId, Parentage, ReferenceStatus};

const ROOT_KEY: &str = "Root";

// ---------------------------------------------------------------
// Arena
// ---------------------------------------------------------------

/// Node storage plus the alias index. Kept apart from the store so the
/// teardown check runs even when the store is taken back.
#[derive(Debug, Default)]
struct NodeArena {
    nodes: HashMap<NodeId, Node>,
    aliases: HashMap<ValueId, Vec<NodeId>>,
    next_id: u64,
}

impl NodeArena {
    fn create(
        &mut self,
        value: ValueId,
        parent: Option<NodeId>,
        parentage: Parentage,
        parent_key: Option<Name>,
    ) -> NodeId {
        let id = NodeId::from_raw(self.next_id);
        self.next_id += 1;
        self.nodes
            .insert(id, Node::new(id, value, parent, parentage, parent_key));
        self.node_created(value, id);
        id
    }

    fn node_created(&mut self, value: ValueId, id: NodeId) {
        self.aliases.entry(value).or_default().push(id);
    }

    fn node_deleted(&mut self, value: ValueId, id: NodeId) {
        let entry = self
            .aliases
            .get_mut(&value)
            .unwrap_or_else(|| panic!("alias index has no entry for {value} (deleting {id})"));
        let pos = entry
            .iter()
            .position(|n| *n == id)
            .unwrap_or_else(|| panic!("{id} is not registered as an alias of {value}"));
        entry.swap_remove(pos);
        if entry.is_empty() {
            self.aliases.remove(&value);
        }
    }

    /// Remove `id` and everything below it.
    fn remove_subtree(&mut self, id: NodeId) {
        let node = self
            .nodes
            .remove(&id)
            .unwrap_or_else(|| panic!("child {id} is not in the arena"));
        for child in node.children.into_iter().flatten() {
            self.remove_subtree(child);
        }
        self.node_deleted(node.value, id);
    }
}

impl Drop for NodeArena {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for id in ids {
            if let Some(node) = self.nodes.remove(&id) {
                self.node_deleted(node.value, id);
            }
        }
        assert!(
            self.aliases.is_empty(),
            "tree torn down with {} stale alias entries",
            self.aliases.len()
        );
    }
}

// ---------------------------------------------------------------
// Tree
// ---------------------------------------------------------------

/// A lazily populated tree projection of an object store.
pub struct ObjectTree<S> {
    store: S,
    config: TreeConfig,
    arena: NodeArena,
    root: NodeId,
}

impl<S: ObjectStore> ObjectTree<S> {
    /// Build the projection for `store`.
    ///
    /// The trailer must be a dictionary whose `/Root` entry references a
    /// dictionary. Any other shape fails construction.
    pub fn new(store: S, config: TreeConfig) -> TreeResult<Self> {
        let root_value = locate_root(&store, config.root)?;
        let mut arena = NodeArena::default();
        let root = arena.create(root_value, None, Parentage::Root, None);
        debug!(root = %root_value, kind = ?config.root, "built object tree");
        Ok(Self {
            store,
            config,
            arena,
            root,
        })
    }

    /// Tear the projection down and return the store.
    pub fn into_store(self) -> S {
        let Self { store, arena, .. } = self;
        debug!(nodes = arena.nodes.len(), "tearing down object tree");
        drop(arena);
        store
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Look up a live node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.nodes.get(&id)
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.arena.nodes.len()
    }

    // ---------------------------------------------------------------
    // Aliases
    // ---------------------------------------------------------------

    /// All live nodes tracking `value`.
    pub fn aliases(&self, value: ValueId) -> &[NodeId] {
        self.arena
            .aliases
            .get(&value)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn count_aliases(&self, value: ValueId) -> usize {
        self.aliases(value).len()
    }

    /// Aliases of the value `id` tracks, `id` included.
    pub fn node_aliases(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|n| self.aliases(n.value).to_vec())
            .unwrap_or_default()
    }

    // ---------------------------------------------------------------
    // Population
    // ---------------------------------------------------------------

    /// Compute the children of `id` if they are not cached.
    pub fn populate(&mut self, id: NodeId) {
        let value = match self.node(id) {
            Some(node) if node.children.is_none() => node.value,
            _ => return,
        };
        let specs = self.child_specs(id, value);
        let children: Vec<NodeId> = specs
            .into_iter()
            .map(|(child, parentage, key)| self.arena.create(child, Some(id), parentage, key))
            .collect();
        debug!(node = %id, value = %value, children = children.len(), "populated node");
        if let Some(node) = self.arena.nodes.get_mut(&id) {
            node.children = Some(children);
        }
    }

    fn child_specs(&self, id: NodeId, value: ValueId) -> Vec<(ValueId, Parentage, Option<Name>)> {
        if self.config.follow_references && self.store.is_reference(value) {
            if !self.reference_status(id).is_resolved() {
                return Vec::new();
            }
            return self
                .store
                .resolve_reference(value)
                .map(|target| vec![(target, Parentage::Referenced, None)])
                .unwrap_or_default();
        }
        if let Some(entries) = self.store.dictionary_entries(value) {
            return entries
                .into_iter()
                .map(|(key, child)| (child, Parentage::Contained, Some(key)))
                .collect();
        }
        if let Some(elements) = self.store.array_elements(value) {
            return elements
                .into_iter()
                .map(|child| (child, Parentage::Contained, None))
                .collect();
        }
        Vec::new()
    }

    /// What following `id`'s value leads to, without populating it.
    pub fn reference_status(&self, id: NodeId) -> ReferenceStatus {
        let Some(node) = self.node(id) else {
            return ReferenceStatus::NotReference;
        };
        let Some(target) = self.store.reference_target(node.value) else {
            return ReferenceStatus::NotReference;
        };
        if !self.config.follow_references {
            return ReferenceStatus::NotFollowed;
        }
        if self.store.resolve(target).is_none() {
            return ReferenceStatus::Dangling;
        }
        let mut cursor = node.parent;
        while let Some(ancestor) = cursor.and_then(|a| self.node(a)) {
            if self.store.reference_target(ancestor.value) == Some(target) {
                return ReferenceStatus::CycleBroken;
            }
            cursor = ancestor.parent;
        }
        ReferenceStatus::Resolved
    }

    /// Children of `id`, populating on first access. A suppressed node
    /// reports none.
    pub fn children(&mut self, id: NodeId) -> Vec<NodeId> {
        if self.node(id).is_some_and(|n| n.suppressed) {
            return Vec::new();
        }
        self.populate(id);
        self.node(id)
            .and_then(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn child_count(&mut self, id: NodeId) -> usize {
        if self.node(id).is_some_and(|n| n.suppressed) {
            return 0;
        }
        self.populate(id);
        self.node(id)
            .and_then(|n| n.children.as_ref())
            .map_or(0, Vec::len)
    }

    pub fn child(&mut self, id: NodeId, row: usize) -> Option<NodeId> {
        if self.node(id)?.suppressed {
            return None;
        }
        self.populate(id);
        self.node(id)?.children.as_ref()?.get(row).copied()
    }

    /// Drop the cached children of `id` and everything below them. Returns
    /// how many direct children were dropped.
    pub fn invalidate_children(&mut self, id: NodeId) -> usize {
        let Some(children) = self
            .arena
            .nodes
            .get_mut(&id)
            .and_then(|n| n.children.take())
        else {
            return 0;
        };
        for child in &children {
            self.arena.remove_subtree(*child);
        }
        debug!(node = %id, dropped = children.len(), "invalidated children");
        children.len()
    }

    /// Make `id` report zero children (or stop doing so).
    pub fn set_suppressed(&mut self, id: NodeId, suppressed: bool) {
        if let Some(node) = self.arena.nodes.get_mut(&id) {
            node.suppressed = suppressed;
        }
    }

    fn invalidate_aliases(&mut self, value: ValueId) {
        for alias in self.aliases(value).to_vec() {
            self.invalidate_children(alias);
        }
    }

    // ---------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------

    /// Position of `id` in its parent's child list; 0 for the root.
    ///
    /// # Panics
    ///
    /// If `id` is unknown or its parent does not list it.
    pub fn index_in_parent(&self, id: NodeId) -> usize {
        let node = self
            .node(id)
            .unwrap_or_else(|| panic!("unknown node {id}"));
        let Some(parent) = node.parent else {
            return 0;
        };
        self.node(parent)
            .and_then(|p| p.children.as_ref())
            .and_then(|c| c.iter().position(|child| *child == id))
            .unwrap_or_else(|| panic!("{id} is missing from the child list of {parent}"))
    }

    /// Row indices from the top level down to `id`; the root is `[0]`.
    pub fn row_path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            path.push(self.index_in_parent(current));
            cursor = self.node(current).and_then(Node::parent);
        }
        path.reverse();
        path
    }

    /// Breadth-first search for the first node showing `reference`'s top
    /// level value, populating up to `search_depth` levels.
    pub fn find_object(&mut self, reference: ObjectRef) -> Option<NodeId> {
        let mut queue = VecDeque::from([(self.root, 0usize)]);
        while let Some((id, depth)) = queue.pop_front() {
            let value = self.node(id)?.value;
            if self.store.object_ref_of(value) == Some(reference) {
                return Some(id);
            }
            if depth < self.config.search_depth {
                queue.extend(self.children(id).into_iter().map(|c| (c, depth + 1)));
            }
        }
        None
    }

    // ---------------------------------------------------------------
    // Edits
    // ---------------------------------------------------------------

    /// Parse `text` and store it as the value of `id`.
    ///
    /// Returns `Ok(false)` without touching anything when the text encodes
    /// the value already present. On a parse error the value is untouched.
    pub fn set_raw_data(&mut self, id: NodeId, text: &str) -> TreeResult<bool> {
        let value = self.node(id).ok_or(TreeError::UnknownNode(id))?.value;
        let parsed = parse_value(text).map_err(|source| {
            warn!(node = %id, error = %source, "rejected value edit");
            TreeError::InvalidValue {
                text: text.to_string(),
                source,
            }
        })?;
        if self.store.snapshot(value)?.identical(&parsed) {
            debug!(node = %id, "value unchanged");
            return Ok(false);
        }
        self.invalidate_aliases(value);
        self.store.replace(value, parsed)?;
        debug!(node = %id, value = %value, "set raw data");
        Ok(true)
    }

    /// Returns `true` if `id` is an array that accepts an element before
    /// `row` under the configured insertion rule.
    pub fn can_insert_element(&self, id: NodeId, row: usize) -> bool {
        self.node(id)
            .and_then(|n| self.store.array_elements(n.value))
            .is_some_and(|elements| self.config.element_insertion.allows(row, elements.len()))
    }

    /// Insert a null element before `row`.
    ///
    /// # Panics
    ///
    /// If [`can_insert_element`](Self::can_insert_element) is false.
    pub fn insert_element(&mut self, id: NodeId, row: usize) -> TreeResult<ValueId> {
        assert!(
            self.can_insert_element(id, row),
            "cannot insert an element at row {row} of {id}"
        );
        let value = self.node(id).ok_or(TreeError::UnknownNode(id))?.value;
        self.invalidate_aliases(value);
        let element = self.store.insert_element(value, row, PdfValue::Null)?;
        debug!(node = %id, row, element = %element, "inserted element");
        Ok(element)
    }

    /// Returns `true` if `id` is a dictionary without `name` and `name` is
    /// not empty.
    pub fn can_insert_key(&self, id: NodeId, name: &Name) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        !name.is_empty()
            && self.store.is_dictionary(node.value)
            && self.store.dictionary_get(node.value, name).is_none()
    }

    /// Add `name` with a null value.
    ///
    /// # Panics
    ///
    /// If [`can_insert_key`](Self::can_insert_key) is false.
    pub fn insert_key(&mut self, id: NodeId, name: Name) -> TreeResult<ValueId> {
        assert!(
            self.can_insert_key(id, &name),
            "cannot insert key {name} into {id}"
        );
        let value = self.node(id).ok_or(TreeError::UnknownNode(id))?.value;
        self.invalidate_aliases(value);
        let entry = self.store.insert_key(value, name, PdfValue::Null)?;
        debug!(node = %id, entry = %entry, "inserted key");
        Ok(entry)
    }

    // ---------------------------------------------------------------
    // Value queries
    // ---------------------------------------------------------------

    /// Data type of the value `id` tracks.
    pub fn data_type(&self, id: NodeId) -> Option<DataType> {
        self.node(id).and_then(|n| self.store.data_type(n.value))
    }

    /// Owned copy of the value `id` tracks.
    pub fn value(&self, id: NodeId) -> Option<PdfValue> {
        self.node(id).and_then(|n| self.store.snapshot(n.value).ok())
    }
}

impl<S> std::fmt::Debug for ObjectTree<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectTree")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("node_count", &self.arena.nodes.len())
            .field("alias_count", &self.arena.aliases.len())
            .finish()
    }
}

/// Resolve the value the root node tracks.
fn locate_root<S: ObjectStore>(store: &S, root: ProjectionRoot) -> TreeResult<ValueId> {
    let trailer = store.trailer();
    if !store.is_dictionary(trailer) {
        return Err(TreeError::NonDictionaryTrailer(
            store.data_type(trailer).unwrap_or(DataType::Null),
        ));
    }
    let entry = store
        .dictionary_get(trailer, &Name::new(ROOT_KEY))
        .ok_or(TreeError::MissingRoot)?;
    let reference = store.reference_target(entry).ok_or_else(|| {
        TreeError::InvalidRootEntry(store.data_type(entry).unwrap_or(DataType::Null))
    })?;
    let catalog = store
        .resolve(reference)
        .ok_or(TreeError::DanglingRoot(reference))?;
    if !store.is_dictionary(catalog) {
        return Err(TreeError::InvalidCatalog {
            reference,
            actual: store.data_type(catalog).unwrap_or(DataType::Null),
        });
    }
    Ok(match root {
        ProjectionRoot::Catalog => catalog,
        ProjectionRoot::Trailer => trailer,
    })
}
