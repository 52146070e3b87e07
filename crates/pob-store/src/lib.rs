//! In-memory object store for the PDF object browser.
//!
//! This crate holds the mutable graph of typed document values that the tree
//! projection browses and edits. Values are dictionaries, arrays, references
//! to indirect objects, and scalars (booleans, numbers, strings, names, null).
//!
//! # Value Types
//!
//! - [`PdfValue`] -- owned, recursive value tree (the unit of parse/encode)
//! - [`Document`] -- arena of stored values, each with a stable [`ValueId`]
//!
//! # Interfaces
//!
//! - [`ObjectStore`] -- the introspection and mutation surface the tree
//!   projection consumes
//! - [`parse_value`] / `Display for PdfValue` -- the native literal codec
//! - [`Document::from_listing`] -- loads `N G obj ... endobj` listings
//!
//! # Design Rules
//!
//! 1. Every value, direct or indirect, has a `ValueId`.
//! 2. In-place replacement keeps the replaced value's id and drops the ids of
//!    its former descendants.
//! 3. Ids are never reused.
//! 4. Dictionaries keep their insertion order.
//!
//! [`ValueId`]: pob_types::ValueId

pub mod error;
pub mod listing;
pub mod literal;
pub mod memory;
pub mod traits;
pub mod value;

pub use error::{StoreError, StoreResult};
pub use literal::parse_value;
pub use memory::Document;
pub use traits::ObjectStore;
pub use value::PdfValue;
