use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a stored value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Bool,
    Number,
    Real,
    String,
    HexString,
    Name,
    Array,
    Dictionary,
    Null,
    Reference,
    RawData,
}

impl DataType {
    /// The type tag shown in the Type column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "Boolean",
            Self::Number => "Number",
            Self::Real => "Real",
            Self::String => "String",
            Self::HexString => "HexString",
            Self::Name => "Name",
            Self::Array => "Array",
            Self::Dictionary => "Dictionary",
            Self::Null => "Null",
            Self::Reference => "Reference",
            Self::RawData => "RawData",
        }
    }

    /// Returns `true` for arrays and dictionaries.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Array | Self::Dictionary)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags() {
        assert_eq!(DataType::Bool.to_string(), "Boolean");
        assert_eq!(DataType::HexString.to_string(), "HexString");
        assert_eq!(DataType::RawData.as_str(), "RawData");
    }

    #[test]
    fn containers() {
        assert!(DataType::Array.is_container());
        assert!(DataType::Dictionary.is_container());
        assert!(!DataType::Reference.is_container());
    }
}
