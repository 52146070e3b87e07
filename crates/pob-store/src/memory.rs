use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use pob_types::{DataType, Name, ObjectRef, ValueId};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;
use crate::value::PdfValue;

/// A value as held in the arena: scalars inline, containers by child id.
#[derive(Clone, Debug)]
enum StoredValue {
    Null,
    Bool(bool),
    Number(i64),
    Real(f64),
    String(Vec<u8>),
    HexString(Vec<u8>),
    Name(Name),
    Reference(ObjectRef),
    RawData(Vec<u8>),
    Array(Vec<ValueId>),
    Dictionary(IndexMap<Name, ValueId>),
}

impl StoredValue {
    fn data_type(&self) -> DataType {
        match self {
            Self::Null => DataType::Null,
            Self::Bool(_) => DataType::Bool,
            Self::Number(_) => DataType::Number,
            Self::Real(_) => DataType::Real,
            Self::String(_) => DataType::String,
            Self::HexString(_) => DataType::HexString,
            Self::Name(_) => DataType::Name,
            Self::Reference(_) => DataType::Reference,
            Self::RawData(_) => DataType::RawData,
            Self::Array(_) => DataType::Array,
            Self::Dictionary(_) => DataType::Dictionary,
        }
    }

    fn child_ids(&self) -> Vec<ValueId> {
        match self {
            Self::Array(items) => items.clone(),
            Self::Dictionary(entries) => entries.values().copied().collect(),
            _ => Vec::new(),
        }
    }
}

/// In-memory, HashMap-based document.
///
/// Every value lives in one arena keyed by [`ValueId`]. Indirect objects map
/// an [`ObjectRef`] to the id of their top-level value; the trailer is an
/// ordinary arena value that no indirect object owns.
pub struct Document {
    values: HashMap<ValueId, StoredValue>,
    objects: BTreeMap<ObjectRef, ValueId>,
    object_refs: HashMap<ValueId, ObjectRef>,
    trailer: ValueId,
    next_id: u64,
}

impl Document {
    /// Create an empty document whose trailer is an empty dictionary.
    pub fn new() -> Self {
        let mut doc = Self {
            values: HashMap::new(),
            objects: BTreeMap::new(),
            object_refs: HashMap::new(),
            trailer: ValueId::from_raw(0),
            next_id: 0,
        };
        doc.trailer = doc.alloc(PdfValue::Dictionary(IndexMap::new()));
        doc
    }

    /// Number of indirect objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of live values, including the trailer and all direct values.
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// All indirect objects in (number, generation) order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectRef, ValueId)> + '_ {
        self.objects.iter().map(|(r, id)| (*r, *id))
    }

    /// Add a new indirect object with the next free object number and
    /// generation 0.
    pub fn add_object(&mut self, value: PdfValue) -> ObjectRef {
        let number = self
            .objects
            .keys()
            .map(ObjectRef::number)
            .max()
            .map_or(1, |n| n + 1);
        let reference = ObjectRef::new(number, 0);
        let id = self.alloc(value);
        self.objects.insert(reference, id);
        self.object_refs.insert(id, reference);
        reference
    }

    /// Add an indirect object under an explicit reference.
    pub fn insert_object(&mut self, reference: ObjectRef, value: PdfValue) -> StoreResult<ValueId> {
        if self.objects.contains_key(&reference) {
            return Err(StoreError::DuplicateObject(reference));
        }
        let id = self.alloc(value);
        self.objects.insert(reference, id);
        self.object_refs.insert(id, reference);
        Ok(id)
    }

    /// Replace the trailer record.
    pub fn set_trailer(&mut self, value: PdfValue) -> StoreResult<()> {
        let trailer = self.trailer;
        self.replace(trailer, value)
    }

    fn next_value_id(&mut self) -> ValueId {
        let id = ValueId::from_raw(self.next_id);
        self.next_id += 1;
        id
    }

    /// Store `value` and all its descendants; returns the new id.
    fn alloc(&mut self, value: PdfValue) -> ValueId {
        let id = self.next_value_id();
        let stored = self.store_children(value);
        self.values.insert(id, stored);
        id
    }

    /// Convert a value into its arena form, allocating ids for children.
    fn store_children(&mut self, value: PdfValue) -> StoredValue {
        match value {
            PdfValue::Null => StoredValue::Null,
            PdfValue::Bool(b) => StoredValue::Bool(b),
            PdfValue::Number(n) => StoredValue::Number(n),
            PdfValue::Real(r) => StoredValue::Real(r),
            PdfValue::String(s) => StoredValue::String(s),
            PdfValue::HexString(s) => StoredValue::HexString(s),
            PdfValue::Name(n) => StoredValue::Name(n),
            PdfValue::Reference(r) => StoredValue::Reference(r),
            PdfValue::RawData(d) => StoredValue::RawData(d),
            PdfValue::Array(items) => {
                StoredValue::Array(items.into_iter().map(|item| self.alloc(item)).collect())
            }
            PdfValue::Dictionary(entries) => StoredValue::Dictionary(
                entries
                    .into_iter()
                    .map(|(key, item)| (key, self.alloc(item)))
                    .collect(),
            ),
        }
    }

    /// Drop a value and all its descendants from the arena.
    fn free(&mut self, id: ValueId) {
        if let Some(stored) = self.values.remove(&id) {
            for child in stored.child_ids() {
                self.free(child);
            }
        }
    }

    fn get(&self, id: ValueId) -> StoreResult<&StoredValue> {
        self.values.get(&id).ok_or(StoreError::UnknownValue(id))
    }

    fn get_mut(&mut self, id: ValueId) -> StoreResult<&mut StoredValue> {
        self.values.get_mut(&id).ok_or(StoreError::UnknownValue(id))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for Document {
    fn contains(&self, id: ValueId) -> bool {
        self.values.contains_key(&id)
    }

    fn data_type(&self, id: ValueId) -> Option<DataType> {
        self.values.get(&id).map(StoredValue::data_type)
    }

    fn dictionary_entries(&self, id: ValueId) -> Option<Vec<(Name, ValueId)>> {
        match self.values.get(&id)? {
            StoredValue::Dictionary(entries) => {
                Some(entries.iter().map(|(k, v)| (k.clone(), *v)).collect())
            }
            _ => None,
        }
    }

    fn dictionary_get(&self, id: ValueId, key: &Name) -> Option<ValueId> {
        match self.values.get(&id)? {
            StoredValue::Dictionary(entries) => entries.get(key).copied(),
            _ => None,
        }
    }

    fn array_elements(&self, id: ValueId) -> Option<Vec<ValueId>> {
        match self.values.get(&id)? {
            StoredValue::Array(items) => Some(items.clone()),
            _ => None,
        }
    }

    fn reference_target(&self, id: ValueId) -> Option<ObjectRef> {
        match self.values.get(&id)? {
            StoredValue::Reference(r) => Some(*r),
            _ => None,
        }
    }

    fn resolve(&self, reference: ObjectRef) -> Option<ValueId> {
        self.objects.get(&reference).copied()
    }

    fn object_ref_of(&self, id: ValueId) -> Option<ObjectRef> {
        self.object_refs.get(&id).copied()
    }

    fn trailer(&self) -> ValueId {
        self.trailer
    }

    fn snapshot(&self, id: ValueId) -> StoreResult<PdfValue> {
        Ok(match self.get(id)? {
            StoredValue::Null => PdfValue::Null,
            StoredValue::Bool(b) => PdfValue::Bool(*b),
            StoredValue::Number(n) => PdfValue::Number(*n),
            StoredValue::Real(r) => PdfValue::Real(*r),
            StoredValue::String(s) => PdfValue::String(s.clone()),
            StoredValue::HexString(s) => PdfValue::HexString(s.clone()),
            StoredValue::Name(n) => PdfValue::Name(n.clone()),
            StoredValue::Reference(r) => PdfValue::Reference(*r),
            StoredValue::RawData(d) => PdfValue::RawData(d.clone()),
            StoredValue::Array(items) => PdfValue::Array(
                items
                    .iter()
                    .map(|item| self.snapshot(*item))
                    .collect::<StoreResult<_>>()?,
            ),
            StoredValue::Dictionary(entries) => PdfValue::Dictionary(
                entries
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), self.snapshot(*v)?)))
                    .collect::<StoreResult<_>>()?,
            ),
        })
    }

    fn replace(&mut self, id: ValueId, value: PdfValue) -> StoreResult<()> {
        let old = self.values.remove(&id).ok_or(StoreError::UnknownValue(id))?;
        for child in old.child_ids() {
            self.free(child);
        }
        let stored = self.store_children(value);
        debug!(value = %id, kind = %stored.data_type(), "replaced value in place");
        self.values.insert(id, stored);
        Ok(())
    }

    fn insert_element(
        &mut self,
        array: ValueId,
        index: usize,
        value: PdfValue,
    ) -> StoreResult<ValueId> {
        let len = match self.get(array)? {
            StoredValue::Array(items) => items.len(),
            other => {
                return Err(StoreError::TypeMismatch {
                    id: array,
                    expected: DataType::Array,
                    actual: other.data_type(),
                })
            }
        };
        if index > len {
            return Err(StoreError::IndexOutOfRange { index, len });
        }
        let element = self.alloc(value);
        if let StoredValue::Array(items) = self.get_mut(array)? {
            items.insert(index, element);
        }
        Ok(element)
    }

    fn insert_key(
        &mut self,
        dictionary: ValueId,
        key: Name,
        value: PdfValue,
    ) -> StoreResult<ValueId> {
        match self.get(dictionary)? {
            StoredValue::Dictionary(entries) if entries.contains_key(&key) => {
                return Err(StoreError::DuplicateKey(key))
            }
            StoredValue::Dictionary(_) => {}
            other => {
                return Err(StoreError::TypeMismatch {
                    id: dictionary,
                    expected: DataType::Dictionary,
                    actual: other.data_type(),
                })
            }
        }
        let entry = self.alloc(value);
        if let StoredValue::Dictionary(entries) = self.get_mut(dictionary)? {
            entries.insert(key, entry);
        }
        Ok(entry)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("object_count", &self.objects.len())
            .field("value_count", &self.values.len())
            .finish()
    }
}
