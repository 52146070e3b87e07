use serde::{Deserialize, Serialize};

/// Which record the projection is rooted at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionRoot {
    /// The catalog dictionary named by the trailer's `/Root` entry.
    #[default]
    Catalog,
    /// The trailer dictionary itself.
    Trailer,
}

/// Which rows accept a new array element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementInsertion {
    /// `0 < row <= count`. Row 0 is rejected, so an empty array cannot grow
    /// through an element insert.
    #[default]
    Strict,
    /// `0 <= row <= count`.
    Inclusive,
}

impl ElementInsertion {
    /// Returns `true` if inserting before `row` is allowed in an array of
    /// `count` elements.
    pub fn allows(&self, row: usize, count: usize) -> bool {
        match self {
            Self::Strict => row > 0 && row <= count,
            Self::Inclusive => row <= count,
        }
    }
}

/// Configuration for an [`ObjectTree`](crate::ObjectTree).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Give reference nodes one child for their resolved target.
    pub follow_references: bool,
    /// Record the projection is rooted at.
    pub root: ProjectionRoot,
    /// Row rule for array element inserts.
    pub element_insertion: ElementInsertion,
    /// Maximum depth explored by `find_object`.
    pub search_depth: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            follow_references: true,
            root: ProjectionRoot::Catalog,
            element_insertion: ElementInsertion::Strict,
            search_depth: 64,
        }
    }
}

impl TreeConfig {
    /// A configuration that leaves reference nodes as leaves.
    pub fn without_references() -> Self {
        Self {
            follow_references: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TreeConfig::default();
        assert!(config.follow_references);
        assert_eq!(config.root, ProjectionRoot::Catalog);
        assert_eq!(config.element_insertion, ElementInsertion::Strict);
        assert_eq!(config.search_depth, 64);
        assert!(!TreeConfig::without_references().follow_references);
    }

    #[test]
    fn strict_rejects_row_zero() {
        assert!(!ElementInsertion::Strict.allows(0, 0));
        assert!(!ElementInsertion::Strict.allows(0, 3));
        assert!(ElementInsertion::Strict.allows(1, 3));
        assert!(ElementInsertion::Strict.allows(3, 3));
        assert!(!ElementInsertion::Strict.allows(4, 3));
    }

    #[test]
    fn inclusive_accepts_row_zero() {
        assert!(ElementInsertion::Inclusive.allows(0, 0));
        assert!(ElementInsertion::Inclusive.allows(2, 2));
        assert!(!ElementInsertion::Inclusive.allows(3, 2));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: TreeConfig = toml::from_str(
            "follow_references = false\nelement_insertion = \"inclusive\"\n",
        )
        .unwrap();
        assert!(!config.follow_references);
        assert_eq!(config.element_insertion, ElementInsertion::Inclusive);
        assert_eq!(config.root, ProjectionRoot::Catalog);
        assert_eq!(config.search_depth, 64);
    }

    #[test]
    fn serde_roundtrip() {
        let config = TreeConfig {
            root: ProjectionRoot::Trailer,
            search_depth: 8,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: TreeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
