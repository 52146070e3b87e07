use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier of an indirect object: object number plus generation number.
///
/// Two references with the same number and generation always name the same
/// indirect object, no matter how many places in a document refer to it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectRef {
    number: u32,
    generation: u16,
}

impl ObjectRef {
    /// Create a reference from its object and generation numbers.
    pub const fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }

    /// The object number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The generation number.
    pub fn generation(&self) -> u16 {
        self.generation
    }

    /// Header form used for a followed reference, e.g. `12 0 obj`.
    pub fn obj_label(&self) -> String {
        format!("{} {} obj", self.number, self.generation)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({} {})", self.number, self.generation)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

/// Parses `"12 0"` or `"12 0 R"`.
impl FromStr for ObjectRef {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let number = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(|| TypeError::InvalidReference(s.to_string()))?;
        let generation = parts
            .next()
            .and_then(|p| p.parse::<u16>().ok())
            .ok_or_else(|| TypeError::InvalidReference(s.to_string()))?;
        match (parts.next(), parts.next()) {
            (None, _) | (Some("R"), None) => Ok(Self::new(number, generation)),
            _ => Err(TypeError::InvalidReference(s.to_string())),
        }
    }
}

/// Store-assigned identity of a single value.
///
/// Every value held by an object store has a `ValueId`, including values
/// directly contained in arrays and dictionaries. Replacing a value in place
/// keeps its `ValueId`; ids of discarded values are never handed out again.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueId(u64);

impl ValueId {
    /// Wrap a raw id.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric id.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueId({})", self.0)
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
