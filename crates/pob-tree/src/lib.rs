//! Lazy tree projection of a PDF object graph.
//!
//! The document's objects form a graph: one indirect object may be referenced
//! from many places, and references may form cycles. This crate projects that
//! graph onto a strict tree of [`Node`]s, one per occurrence, and keeps every
//! occurrence of the same underlying value (its *aliases*) consistent across
//! edits.
//!
//! # Layers
//!
//! - [`ObjectTree`] -- node arena, alias index, lazy population and
//!   structural edits
//! - [`ObjectModel`] -- row/column adapter for tree views, with the
//!   two-phase edit notification protocol
//! - [`display`] -- labels, type tags, previews and icons for a node
//!
//! # Example
//!
//! ```
//! use pob_store::Document;
//! use pob_tree::{ObjectModel, ObjectTree, TreeConfig};
//!
//! let doc = Document::from_listing(
//!     "1 0 obj << /Type /Catalog >> endobj trailer << /Root 1 0 R >>",
//! )
//! .unwrap();
//! let tree = ObjectTree::new(doc, TreeConfig::default()).unwrap();
//! let mut model = ObjectModel::new(tree);
//! let root = model.index(0, 0, &pob_tree::ModelIndex::invalid());
//! assert_eq!(model.row_count(&root), 1);
//! ```

pub mod config;
pub mod display;
pub mod error;
pub mod model;
pub mod node;
pub mod tree;

pub use config::{ElementInsertion, ProjectionRoot, TreeConfig};
pub use display::Icon;
pub use error::{TreeError, TreeResult};
pub use model::{EventLog, ItemFlags, ModelEvent, ModelIndex, ModelObserver, ObjectModel};
pub use node::{Node, NodeId, Parentage, ReferenceStatus};
pub use tree::ObjectTree;
