use pob_types::{DataType, Name, ObjectRef, ValueId};

use crate::error::StoreResult;
use crate::value::PdfValue;

/// Mutable graph of typed document values.
///
/// This is the surface the tree projection consumes. All implementations must
/// satisfy these invariants:
/// - Every live value has a `ValueId`; ids are never reused.
/// - [`replace`](ObjectStore::replace) keeps the replaced value's id, so the
///   identity of an edited value survives the edit.
/// - Dictionary entries are enumerated in a stable order (insertion order).
/// - Reads never mutate.
pub trait ObjectStore {
    /// Returns `true` if `id` names a live value.
    fn contains(&self, id: ValueId) -> bool;

    /// The type of a live value, or `None` for an unknown id.
    fn data_type(&self, id: ValueId) -> Option<DataType>;

    /// `(key, value)` pairs of a dictionary in enumeration order.
    ///
    /// Returns `None` if `id` is not a dictionary.
    fn dictionary_entries(&self, id: ValueId) -> Option<Vec<(Name, ValueId)>>;

    /// Look up a single dictionary entry.
    fn dictionary_get(&self, id: ValueId, key: &Name) -> Option<ValueId>;

    /// Elements of an array in order. Returns `None` if `id` is not an array.
    fn array_elements(&self, id: ValueId) -> Option<Vec<ValueId>>;

    /// The target of a reference value. Returns `None` if `id` is not a
    /// reference.
    fn reference_target(&self, id: ValueId) -> Option<ObjectRef>;

    /// The top-level value of an indirect object, or `None` if no such
    /// object exists (a dangling reference).
    fn resolve(&self, reference: ObjectRef) -> Option<ValueId>;

    /// The indirect object whose top-level value is `id`, if any.
    fn object_ref_of(&self, id: ValueId) -> Option<ObjectRef>;

    /// The document's trailer record.
    fn trailer(&self) -> ValueId;

    /// An owned copy of a value and everything it contains.
    fn snapshot(&self, id: ValueId) -> StoreResult<PdfValue>;

    /// Replace a value in place. The value keeps `id`; ids of its former
    /// descendants become invalid.
    fn replace(&mut self, id: ValueId, value: PdfValue) -> StoreResult<()>;

    /// Insert `value` into an array before position `index`
    /// (`index == len` appends). Returns the new element's id.
    fn insert_element(&mut self, array: ValueId, index: usize, value: PdfValue)
        -> StoreResult<ValueId>;

    /// Add a new key to a dictionary. Fails if the key already exists.
    /// Returns the new entry's id.
    fn insert_key(&mut self, dictionary: ValueId, key: Name, value: PdfValue)
        -> StoreResult<ValueId>;

    /// Returns `true` if `id` is a dictionary.
    fn is_dictionary(&self, id: ValueId) -> bool {
        self.data_type(id) == Some(DataType::Dictionary)
    }

    /// Returns `true` if `id` is an array.
    fn is_array(&self, id: ValueId) -> bool {
        self.data_type(id) == Some(DataType::Array)
    }

    /// Returns `true` if `id` is a reference.
    fn is_reference(&self, id: ValueId) -> bool {
        self.data_type(id) == Some(DataType::Reference)
    }

    /// Follow a reference value to its target's top-level value.
    fn resolve_reference(&self, id: ValueId) -> Option<ValueId> {
        self.reference_target(id).and_then(|r| self.resolve(r))
    }

    /// Canonical literal text of a value.
    fn encode(&self, id: ValueId) -> StoreResult<String> {
        Ok(self.snapshot(id)?.to_string())
    }
}
