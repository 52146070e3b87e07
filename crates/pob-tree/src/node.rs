use std::fmt;

use pob_types::{Name, ValueId};
use serde::{Deserialize, Serialize};

/// Synthetic id of one occurrence in the projection.
///
/// Node ids are allocated by the owning [`ObjectTree`](crate::ObjectTree)
/// and never reused, so an id kept across an invalidation simply stops
/// resolving.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric id.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node:{}", self.0)
    }
}

/// How a node relates to its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parentage {
    /// The single entry point of the tree; no parent.
    Root,
    /// Held directly by the parent's dictionary or array.
    Contained,
    /// Target of the parent's reference value.
    Referenced,
}

/// What following a node's reference value leads to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceStatus {
    /// The value is not a reference.
    NotReference,
    /// References are not followed by this tree.
    NotFollowed,
    /// The target exists and is shown as the node's only child.
    Resolved,
    /// The target object does not exist.
    Dangling,
    /// An ancestor already follows a reference to the same target.
    CycleBroken,
}

impl ReferenceStatus {
    /// Returns `true` if the node gets a child for the target.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

/// One occurrence of a stored value in the projection.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) value: ValueId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) parentage: Parentage,
    pub(crate) parent_key: Option<Name>,
    /// `None` until populated; `Some(vec![])` is a populated leaf.
    pub(crate) children: Option<Vec<NodeId>>,
    pub(crate) suppressed: bool,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        value: ValueId,
        parent: Option<NodeId>,
        parentage: Parentage,
        parent_key: Option<Name>,
    ) -> Self {
        Self {
            id,
            value,
            parent,
            parentage,
            parent_key,
            children: None,
            suppressed: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tracked value. Aliases share this id.
    pub fn value(&self) -> ValueId {
        self.value
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn parentage(&self) -> Parentage {
        self.parentage
    }

    /// The dictionary key this node sits under, if any.
    pub fn parent_key(&self) -> Option<&Name> {
        self.parent_key.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parentage == Parentage::Root
    }

    /// Returns `true` if the children have been computed since the last
    /// invalidation.
    pub fn is_populated(&self) -> bool {
        self.children.is_some()
    }

    /// Returns `true` while the node reports no children during an edit.
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Children as currently cached, ignoring suppression.
    pub fn cached_children(&self) -> Option<&[NodeId]> {
        self.children.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_node_is_unpopulated() {
        let node = Node::new(
            NodeId::from_raw(1),
            ValueId::from_raw(7),
            Some(NodeId::from_raw(0)),
            Parentage::Contained,
            Some(Name::new("Kids")),
        );
        assert!(!node.is_populated());
        assert!(!node.is_suppressed());
        assert!(!node.is_root());
        assert_eq!(node.parent_key().map(Name::as_str), Some("Kids"));
        assert!(node.cached_children().is_none());
    }

    #[test]
    fn node_id_formatting() {
        let id = NodeId::from_raw(3);
        assert_eq!(id.to_string(), "node:3");
        assert_eq!(format!("{id:?}"), "NodeId(3)");
    }

    #[test]
    fn only_resolved_counts_as_resolved() {
        assert!(ReferenceStatus::Resolved.is_resolved());
        assert!(!ReferenceStatus::Dangling.is_resolved());
        assert!(!ReferenceStatus::CycleBroken.is_resolved());
        assert!(!ReferenceStatus::NotFollowed.is_resolved());
    }
}
