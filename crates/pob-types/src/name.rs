use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A PDF name, stored in decoded form (without the leading `/`).
///
/// Names are used both as dictionary keys and as name values. The
/// [`Display`](fmt::Display) impl writes the encoded form, `/` prefixed and
/// with `#xx` escapes for bytes that are not regular characters.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Name(String);

impl Name {
    /// Create a name from its decoded text.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Create a name, rejecting the empty name.
    pub fn non_empty(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::InvalidName("empty name".to_string()));
        }
        Ok(Self(name))
    }

    /// The decoded text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty name.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if `b` can appear unescaped in an encoded name.
    pub fn is_regular_byte(b: u8) -> bool {
        (0x21..=0x7e).contains(&b) && !b"()<>[]{}/%#".contains(&b)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({self})")
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for &b in self.0.as_bytes() {
            if Self::is_regular_byte(b) {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "#{b:02X}")?;
            }
        }
        Ok(())
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
