use std::fmt;

use indexmap::IndexMap;
use pob_types::{DataType, Name, ObjectRef};

/// An owned document value.
///
/// `PdfValue` is what the literal parser produces and what the store hands
/// out as a snapshot of a stored value. Dictionaries keep their key order.
#[derive(Clone, Debug, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Number(i64),
    Real(f64),
    /// Literal string, `( ... )`.
    String(Vec<u8>),
    /// Hex string, `< ... >`.
    HexString(Vec<u8>),
    Name(Name),
    Array(Vec<PdfValue>),
    Dictionary(IndexMap<Name, PdfValue>),
    Reference(ObjectRef),
    /// Bytes that are not a parsed value (e.g. an unparsed stream body).
    RawData(Vec<u8>),
}

impl PdfValue {
    /// The data type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Null => DataType::Null,
            Self::Bool(_) => DataType::Bool,
            Self::Number(_) => DataType::Number,
            Self::Real(_) => DataType::Real,
            Self::String(_) => DataType::String,
            Self::HexString(_) => DataType::HexString,
            Self::Name(_) => DataType::Name,
            Self::Array(_) => DataType::Array,
            Self::Dictionary(_) => DataType::Dictionary,
            Self::Reference(_) => DataType::Reference,
            Self::RawData(_) => DataType::RawData,
        }
    }

    /// Build a dictionary from `(key, value)` pairs, keeping their order.
    pub fn dictionary<K, I>(entries: I) -> Self
    where
        K: Into<Name>,
        I: IntoIterator<Item = (K, PdfValue)>,
    {
        Self::Dictionary(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Shorthand for a name value.
    pub fn name(name: impl Into<Name>) -> Self {
        Self::Name(name.into())
    }

    /// Shorthand for a reference value.
    pub fn reference(number: u32, generation: u16) -> Self {
        Self::Reference(ObjectRef::new(number, generation))
    }

    /// Shorthand for a literal string value.
    pub fn string(text: impl AsRef<[u8]>) -> Self {
        Self::String(text.as_ref().to_vec())
    }

    /// Structural equality that also requires dictionary keys to appear in
    /// the same order.
    ///
    /// `PartialEq` treats dictionaries as maps; two values that are
    /// `identical` also project to identical child sequences.
    pub fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.identical(y))
            }
            (Self::Dictionary(a), Self::Dictionary(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.identical(vb))
            }
            (Self::Real(a), Self::Real(b)) => a.to_bits() == b.to_bits() || a == b,
            _ => self == other,
        }
    }
}

impl From<bool> for PdfValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for PdfValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<f64> for PdfValue {
    fn from(r: f64) -> Self {
        Self::Real(r)
    }
}

impl From<Name> for PdfValue {
    fn from(n: Name) -> Self {
        Self::Name(n)
    }
}

impl From<ObjectRef> for PdfValue {
    fn from(r: ObjectRef) -> Self {
        Self::Reference(r)
    }
}

impl From<Vec<PdfValue>> for PdfValue {
    fn from(items: Vec<PdfValue>) -> Self {
        Self::Array(items)
    }
}

/// Canonical literal encoding. The output parses back to an equal value.
impl fmt::Display for PdfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Real(r) => write_real(f, *r),
            Self::String(bytes) => write_literal_string(f, bytes),
            Self::HexString(bytes) => {
                f.write_str("<")?;
                for b in bytes {
                    write!(f, "{b:02X}")?;
                }
                f.write_str(">")
            }
            Self::Name(name) => write!(f, "{name}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Dictionary(entries) => {
                f.write_str("<< ")?;
                for (key, value) in entries {
                    write!(f, "{key} {value} ")?;
                }
                f.write_str(">>")
            }
            Self::Reference(r) => write!(f, "{r}"),
            Self::RawData(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

fn write_real(f: &mut fmt::Formatter<'_>, r: f64) -> fmt::Result {
    if r.is_finite() && r.fract() == 0.0 {
        write!(f, "{r:.1}")
    } else {
        write!(f, "{r}")
    }
}

fn write_literal_string(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("(")?;
    for &b in bytes {
        match b {
            b'(' => f.write_str("\\(")?,
            b')' => f.write_str("\\)")?,
            b'\\' => f.write_str("\\\\")?,
            b'\n' => f.write_str("\\n")?,
            b'\r' => f.write_str("\\r")?,
            b'\t' => f.write_str("\\t")?,
            0x08 => f.write_str("\\b")?,
            0x0c => f.write_str("\\f")?,
            0x20..=0x7e => write!(f, "{}", b as char)?,
            _ => write!(f, "\\{b:03o}")?,
        }
    }
    f.write_str(")")
}
