//! Row/column adapter for tree views.
//!
//! [`ObjectModel`] answers the questions a tree view asks (how many rows under
//! this index, what is the parent of that one, what text goes in this cell)
//! and applies edits. Because one stored value may be shown in several
//! places, every edit is bracketed by a two-phase protocol that first empties
//! every alias of the edited value and then refills them, telling observers
//! about each step so no view keeps rows for nodes that no longer exist.

use std::cell::RefCell;
use std::rc::Rc;

use pob_store::{ObjectStore, PdfValue};
use pob_types::{DataType, Name, ObjectRef, ValueId};
use tracing::{debug, warn};

use crate::display::{self, Icon, HEADERS, VALUE_COLUMN};
use crate::error::{TreeError, TreeResult};
use crate::node::NodeId;
use crate::tree::ObjectTree;

// =============================================================================
// INDICES AND EVENTS
// =============================================================================

/// Address of a cell: row and column under a parent node.
///
/// The invalid index stands for the (hidden) top level, which has exactly
/// one row: the root node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelIndex {
    row: usize,
    column: usize,
    node: Option<NodeId>,
}

impl ModelIndex {
    pub const fn invalid() -> Self {
        Self {
            row: 0,
            column: 0,
            node: None,
        }
    }

    fn new(row: usize, column: usize, node: NodeId) -> Self {
        Self {
            row,
            column,
            node: Some(node),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.node.is_some()
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// The node this index points at.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// The same row in another column.
    pub fn sibling(&self, column: usize) -> Self {
        Self { column, ..*self }
    }
}

impl Default for ModelIndex {
    fn default() -> Self {
        Self::invalid()
    }
}

/// Change notifications, delivered in emission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelEvent {
    RowsAboutToBeRemoved {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    RowsRemoved {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    RowsAboutToBeInserted {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    RowsInserted {
        parent: ModelIndex,
        first: usize,
        last: usize,
    },
    DataChanged {
        top_left: ModelIndex,
        bottom_right: ModelIndex,
    },
    LayoutAboutToBeChanged,
    LayoutChanged,
}

/// Receives model notifications.
pub trait ModelObserver {
    fn notify(&mut self, event: &ModelEvent);
}

/// Observer that records every event. Clones share one log.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<ModelEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far.
    pub fn events(&self) -> Vec<ModelEvent> {
        self.events.borrow().clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<ModelEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl ModelObserver for EventLog {
    fn notify(&mut self, event: &ModelEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

/// What a view may do with a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemFlags {
    pub enabled: bool,
    pub selectable: bool,
    pub editable: bool,
}

// =============================================================================
// MODEL
// =============================================================================

/// Tree-view adapter over an [`ObjectTree`].
pub struct ObjectModel<S> {
    tree: ObjectTree<S>,
    observers: Vec<Box<dyn ModelObserver>>,
    modified: bool,
}

impl<S: ObjectStore> ObjectModel<S> {
    pub fn new(tree: ObjectTree<S>) -> Self {
        Self {
            tree,
            observers: Vec::new(),
            modified: false,
        }
    }

    /// Register an observer for change notifications.
    pub fn subscribe(&mut self, observer: Box<dyn ModelObserver>) {
        self.observers.push(observer);
    }

    pub fn tree(&self) -> &ObjectTree<S> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ObjectTree<S> {
        &mut self.tree
    }

    /// Tear the model down and return the store.
    pub fn into_store(self) -> S {
        self.tree.into_store()
    }

    /// Returns `true` once any edit has changed the document.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    fn emit(&mut self, event: ModelEvent) {
        for observer in &mut self.observers {
            observer.notify(&event);
        }
    }

    // ---------------------------------------------------------------
    // Addressing
    // ---------------------------------------------------------------

    /// Index of the cell at `row`, `column` under `parent`, or the invalid
    /// index if there is none.
    pub fn index(&mut self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if column >= HEADERS.len() {
            return ModelIndex::invalid();
        }
        match parent.node {
            None if row == 0 => ModelIndex::new(0, column, self.tree.root()),
            None => ModelIndex::invalid(),
            Some(node) => self
                .tree
                .child(node, row)
                .map_or_else(ModelIndex::invalid, |child| {
                    ModelIndex::new(row, column, child)
                }),
        }
    }

    /// Column 0 index of a live node.
    pub fn index_for_node(&self, node: NodeId) -> ModelIndex {
        ModelIndex::new(self.tree.index_in_parent(node), 0, node)
    }

    /// Index of the parent row, or the invalid index for the root.
    pub fn parent(&self, index: &ModelIndex) -> ModelIndex {
        index
            .node
            .and_then(|n| self.tree.node(n))
            .and_then(|n| n.parent())
            .map_or_else(ModelIndex::invalid, |p| self.index_for_node(p))
    }

    /// Rows under `parent`. The top level always has one row.
    pub fn row_count(&mut self, parent: &ModelIndex) -> usize {
        match parent.node {
            None => 1,
            Some(node) => self.tree.child_count(node),
        }
    }

    pub fn column_count(&self) -> usize {
        HEADERS.len()
    }

    /// Resolve a row path such as `[0, 2, 1]` from the top level.
    pub fn index_for_path(&mut self, path: &[usize]) -> Option<ModelIndex> {
        let mut index = ModelIndex::invalid();
        for row in path {
            index = self.index(*row, 0, &index);
            if !index.is_valid() {
                return None;
            }
        }
        index.is_valid().then_some(index)
    }

    /// Row path of an index, the inverse of [`index_for_path`](Self::index_for_path).
    pub fn path_for_index(&self, index: &ModelIndex) -> Vec<usize> {
        index
            .node
            .map(|n| self.tree.row_path(n))
            .unwrap_or_default()
    }

    // ---------------------------------------------------------------
    // Cell data
    // ---------------------------------------------------------------

    /// Display text of a cell.
    pub fn data(&self, index: &ModelIndex) -> Option<String> {
        display::cell_text(&self.tree, index.node?, index.column)
    }

    /// Icon shown in the label column.
    pub fn decoration(&self, index: &ModelIndex) -> Option<Icon> {
        if index.column != 0 {
            return None;
        }
        display::icon(&self.tree, index.node?)
    }

    pub fn header_data(&self, section: usize) -> Option<&'static str> {
        HEADERS.get(section).copied()
    }

    pub fn flags(&self, index: &ModelIndex) -> ItemFlags {
        if !index.is_valid() {
            return ItemFlags {
                enabled: true,
                selectable: false,
                editable: false,
            };
        }
        ItemFlags {
            enabled: true,
            selectable: true,
            editable: index.column == VALUE_COLUMN,
        }
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    fn data_type(&self, index: &ModelIndex) -> Option<DataType> {
        self.tree.data_type(index.node?)
    }

    pub fn is_dictionary(&self, index: &ModelIndex) -> bool {
        self.data_type(index) == Some(DataType::Dictionary)
    }

    pub fn is_array(&self, index: &ModelIndex) -> bool {
        self.data_type(index) == Some(DataType::Array)
    }

    pub fn is_reference(&self, index: &ModelIndex) -> bool {
        self.data_type(index) == Some(DataType::Reference)
    }

    /// Children of the node at `index`, or `None` for the invalid index.
    pub fn child_count(&mut self, index: &ModelIndex) -> Option<usize> {
        index.node.map(|n| self.tree.child_count(n))
    }

    /// The stored value shown at `index`.
    pub fn object(&self, index: &ModelIndex) -> Option<ValueId> {
        index.node.and_then(|n| self.tree.node(n)).map(|n| n.value())
    }

    /// Owned copy of the value shown at `index`.
    pub fn value(&self, index: &ModelIndex) -> Option<PdfValue> {
        self.tree.value(index.node?)
    }

    /// Index of the first occurrence of an indirect object.
    pub fn find_object(&mut self, reference: ObjectRef) -> Option<ModelIndex> {
        let node = self.tree.find_object(reference)?;
        Some(self.index_for_node(node))
    }

    // ---------------------------------------------------------------
    // Two-phase protocol
    // ---------------------------------------------------------------

    /// First phase: empty every alias of the value at `index`.
    ///
    /// Runs before the value is mutated so every observer drops its rows
    /// for every occurrence first. Aliases nested under another alias are
    /// destroyed along with it.
    pub fn prepare_for_subtree_change(&mut self, index: &ModelIndex) {
        if let Some(value) = self.object(index) {
            self.empty_aliases(value);
        }
    }

    /// Second phase: refill every alias of the value at `index` and report
    /// each one as changed.
    ///
    /// `index` must still be live; [`set_data`](Self::set_data) and the
    /// inserts track the value itself and do not depend on that.
    pub fn subtree_changed(&mut self, index: &ModelIndex) {
        if let Some(value) = self.object(index) {
            self.refill_aliases(value);
        }
    }

    fn empty_aliases(&mut self, value: ValueId) {
        for alias in self.tree.aliases(value).to_vec() {
            let count = match self.tree.node(alias) {
                Some(n) if !n.is_suppressed() => n.cached_children().map_or(0, <[_]>::len),
                _ => continue,
            };
            if count == 0 {
                continue;
            }
            let parent = self.index_for_node(alias);
            let (first, last) = (0, count - 1);
            self.emit(ModelEvent::RowsAboutToBeRemoved { parent, first, last });
            self.tree.invalidate_children(alias);
            self.tree.set_suppressed(alias, true);
            self.emit(ModelEvent::RowsRemoved { parent, first, last });
        }
    }

    fn refill_aliases(&mut self, value: ValueId) {
        for alias in self.tree.aliases(value).to_vec() {
            self.tree.set_suppressed(alias, false);
            let parent = self.index_for_node(alias);
            let count = self.tree.child_count(alias);
            if count > 0 {
                let (first, last) = (0, count - 1);
                self.emit(ModelEvent::RowsAboutToBeInserted { parent, first, last });
                self.emit(ModelEvent::RowsInserted { parent, first, last });
            }
            self.emit(ModelEvent::DataChanged {
                top_left: parent,
                bottom_right: parent.sibling(VALUE_COLUMN),
            });
        }
    }

    /// Run `edit` on the value `node` shows between the two phases.
    ///
    /// The first phase may destroy `node` when it sits under another alias
    /// of its own value; the edit then goes through an alias that survived.
    fn bracketed<T>(
        &mut self,
        node: NodeId,
        edit: impl FnOnce(&mut ObjectTree<S>, NodeId) -> TreeResult<T>,
    ) -> TreeResult<T> {
        let value = self
            .tree
            .node(node)
            .ok_or(TreeError::UnknownNode(node))?
            .value();
        self.empty_aliases(value);
        let target = if self.tree.node(node).is_some() {
            Some(node)
        } else {
            self.tree.aliases(value).first().copied()
        };
        let result = match target {
            Some(target) => edit(&mut self.tree, target),
            None => Err(TreeError::UnknownNode(node)),
        };
        self.refill_aliases(value);
        result
    }

    // ---------------------------------------------------------------
    // Edits
    // ---------------------------------------------------------------

    /// Replace the value at `index` with the value `text` encodes.
    ///
    /// Only the value column is editable and empty text is ignored; both
    /// return `Ok(false)` without notifications. A parse error is returned
    /// after the view has been restored, with the value untouched.
    pub fn set_data(&mut self, index: &ModelIndex, text: &str) -> TreeResult<bool> {
        let Some(node) = index.node else {
            return Ok(false);
        };
        if index.column != VALUE_COLUMN || text.is_empty() {
            return Ok(false);
        }
        let result = self.bracketed(node, |tree, target| tree.set_raw_data(target, text));
        match &result {
            Ok(changed) => {
                self.modified |= *changed;
                debug!(node = %node, changed, "set data");
            }
            Err(e) => warn!(node = %node, error = %e, "edit rejected"),
        }
        result
    }

    /// Insert a null element before `row` in the array at `index`.
    ///
    /// Returns `Ok(false)` if the array does not accept that row.
    pub fn insert_element(&mut self, row: usize, index: &ModelIndex) -> TreeResult<bool> {
        let Some(node) = index.node else {
            return Ok(false);
        };
        if !self.tree.can_insert_element(node, row) {
            return Ok(false);
        }
        self.bracketed(node, |tree, target| tree.insert_element(target, row))?;
        self.modified = true;
        Ok(true)
    }

    /// Add `key` with a null value to the dictionary at `index`.
    ///
    /// Returns `Ok(false)` if the key is empty, present, or the value is not
    /// a dictionary.
    pub fn insert_key(&mut self, key: &str, index: &ModelIndex) -> TreeResult<bool> {
        let Some(node) = index.node else {
            return Ok(false);
        };
        let name = Name::new(key);
        if !self.tree.can_insert_key(node, &name) {
            return Ok(false);
        }
        self.bracketed(node, |tree, target| tree.insert_key(target, name))?;
        self.modified = true;
        Ok(true)
    }

    /// Drop and re-read the children at `index` without changing the value.
    pub fn invalidate_children(&mut self, index: &ModelIndex) {
        let Some(node) = index.node else {
            return;
        };
        self.emit(ModelEvent::LayoutAboutToBeChanged);
        self.tree.invalidate_children(node);
        self.emit(ModelEvent::LayoutChanged);
        self.emit(ModelEvent::DataChanged {
            top_left: *index,
            bottom_right: *index,
        });
    }
}

impl<S> std::fmt::Debug for ObjectModel<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectModel")
            .field("tree", &self.tree)
            .field("observers", &self.observers.len())
            .field("modified", &self.modified)
            .finish()
    }
}
