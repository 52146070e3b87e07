//! Foundation types for the PDF object browser.
//!
//! This crate provides the identity and naming types shared by the object
//! store and the tree projection. Every other crate depends on `pob-types`.
//!
//! # Key Types
//!
//! - [`ObjectRef`] -- Object number + generation of an indirect object
//! - [`ValueId`] -- Store-assigned identity of any value, direct or indirect
//! - [`Name`] -- A PDF name (dictionary key or name value)
//! - [`DataType`] -- The kind of a stored value

pub mod data_type;
pub mod error;
pub mod name;
pub mod object;

pub use data_type::DataType;
pub use error::TypeError;
pub use name::Name;
pub use object::{ObjectRef, ValueId};
