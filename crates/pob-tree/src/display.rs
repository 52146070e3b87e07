//! What a tree view shows for a node: label, type tag, value preview and
//! icon.

use pob_store::ObjectStore;
use pob_types::{DataType, Name};

use crate::config::ProjectionRoot;
use crate::node::{NodeId, ReferenceStatus};
use crate::tree::ObjectTree;

/// Column headers, in column order.
pub const HEADERS: [&str; 3] = ["Object", "Type", "Value"];

/// Index of the label column.
pub const OBJECT_COLUMN: usize = 0;
/// Index of the type tag column.
pub const TYPE_COLUMN: usize = 1;
/// Index of the value column, the only editable one.
pub const VALUE_COLUMN: usize = 2;

/// Dictionary keys summarised in a dictionary preview, in order.
const PREVIEW_KEYS: [&str; 3] = ["Type", "SubType", "Name"];

/// Decoration for the label column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Icon {
    Bool,
    Number,
    Real,
    LiteralString,
    HexString,
    Name,
    /// Arrays and dictionaries.
    Container,
    Null,
    Reference,
    /// A reference that shows no target: dangling or cut by the cycle guard.
    DanglingReference,
    /// Raw data has no icon.
    None,
}

impl Icon {
    /// Resource base name for hosts that ship icon files.
    pub fn resource(&self) -> Option<&'static str> {
        Some(match self {
            Self::Bool => "bool",
            Self::Number => "number",
            Self::Real => "real",
            Self::LiteralString => "litstring",
            Self::HexString => "hexstring",
            Self::Name => "name",
            Self::Container => "dictionary",
            Self::Null => "empty",
            Self::Reference => "reference",
            Self::DanglingReference => "dangling_reference",
            Self::None => return None,
        })
    }
}

/// Text of the label column.
///
/// The root is `/Root` (or `trailer` when rooted at the trailer). Other
/// nodes are labelled by what their parent holds: a dictionary key, an
/// array position, or the object header of a followed reference.
pub fn label<S: ObjectStore>(tree: &ObjectTree<S>, id: NodeId) -> String {
    let Some(node) = tree.node(id) else {
        return String::new();
    };
    let Some(parent) = node.parent() else {
        return match tree.config().root {
            ProjectionRoot::Catalog => "/Root".to_string(),
            ProjectionRoot::Trailer => "trailer".to_string(),
        };
    };
    let store = tree.store();
    let parent_value = match tree.node(parent) {
        Some(p) => p.value(),
        None => return "<UNKNOWN>".to_string(),
    };
    match store.data_type(parent_value) {
        Some(DataType::Dictionary) => node
            .parent_key()
            .map(|k| k.as_str().to_string())
            .unwrap_or_default(),
        Some(DataType::Array) => format!("<element {}>", tree.index_in_parent(id)),
        Some(DataType::Reference) => store
            .reference_target(parent_value)
            .map(|r| r.obj_label())
            .unwrap_or_default(),
        _ => "<UNKNOWN>".to_string(),
    }
}

/// Text of the type column.
pub fn type_tag<S: ObjectStore>(tree: &ObjectTree<S>, id: NodeId) -> Option<&'static str> {
    tree.data_type(id).map(|t| t.as_str())
}

/// Text of the value column.
///
/// Dictionaries get a `<< /Type ... /SubType ... /Name ... ... >>` summary
/// of whichever of those keys they have. Arrays have no preview. Everything
/// else shows its literal encoding.
pub fn preview<S: ObjectStore>(tree: &ObjectTree<S>, id: NodeId) -> Option<String> {
    let value = tree.node(id)?.value();
    let store = tree.store();
    match store.data_type(value)? {
        DataType::Dictionary => {
            let mut text = String::from("<< ");
            for key in PREVIEW_KEYS {
                if let Some(entry) = store.dictionary_get(value, &Name::new(key)) {
                    let encoded = store.encode(entry).ok()?;
                    text.push_str(&format!("/{key} {encoded} "));
                }
            }
            text.push_str("... >>");
            Some(text)
        }
        DataType::Array => None,
        _ => store.encode(value).ok(),
    }
}

/// Icon for the label column.
pub fn icon<S: ObjectStore>(tree: &ObjectTree<S>, id: NodeId) -> Option<Icon> {
    Some(match tree.data_type(id)? {
        DataType::Bool => Icon::Bool,
        DataType::Number => Icon::Number,
        DataType::Real => Icon::Real,
        DataType::String => Icon::LiteralString,
        DataType::HexString => Icon::HexString,
        DataType::Name => Icon::Name,
        DataType::Array | DataType::Dictionary => Icon::Container,
        DataType::Null => Icon::Null,
        DataType::Reference => match tree.reference_status(id) {
            ReferenceStatus::Resolved | ReferenceStatus::NotFollowed => Icon::Reference,
            _ => Icon::DanglingReference,
        },
        DataType::RawData => Icon::None,
    })
}

/// Display text for one cell.
pub fn cell_text<S: ObjectStore>(
    tree: &ObjectTree<S>,
    id: NodeId,
    column: usize,
) -> Option<String> {
    match column {
        OBJECT_COLUMN => Some(label(tree, id)),
        TYPE_COLUMN => type_tag(tree, id).map(str::to_string),
        VALUE_COLUMN => preview(tree, id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeConfig;
    use pob_store::Document;

    const LISTING: &str = "\
1 0 obj << /Type /Catalog /Pages 2 0 R /Gone 9 0 R /Data [1 (two) <0A>] /Flag true /R 1.5 /N null >> endobj
2 0 obj << /Type /Pages /SubType /Tree /Name /Main /Count 0 >> endobj
trailer << /Root 1 0 R >>";

    fn tree(config: TreeConfig) -> ObjectTree<Document> {
        ObjectTree::new(Document::from_listing(LISTING).unwrap(), config).unwrap()
    }

    fn child(t: &mut ObjectTree<Document>, id: NodeId, row: usize) -> NodeId {
        t.child(id, row).unwrap()
    }

    #[test]
    fn root_labels() {
        let t = tree(TreeConfig::default());
        assert_eq!(label(&t, t.root()), "/Root");
        let t = tree(TreeConfig {
            root: ProjectionRoot::Trailer,
            ..Default::default()
        });
        assert_eq!(label(&t, t.root()), "trailer");
    }

    #[test]
    fn child_labels_depend_on_parent_kind() {
        let mut t = tree(TreeConfig::default());
        let root = t.root();
        let pages_ref = child(&mut t, root, 1);
        assert_eq!(label(&t, pages_ref), "Pages");
        let pages = child(&mut t, pages_ref, 0);
        assert_eq!(label(&t, pages), "2 0 obj");
        let data = child(&mut t, root, 3);
        let second = child(&mut t, data, 1);
        assert_eq!(label(&t, second), "<element 1>");
    }

    #[test]
    fn type_tags() {
        let mut t = tree(TreeConfig::default());
        let root = t.root();
        let tags: Vec<&str> = t
            .children(root)
            .into_iter()
            .map(|c| type_tag(&t, c).unwrap())
            .collect();
        assert_eq!(
            tags,
            vec!["Name", "Reference", "Reference", "Array", "Boolean", "Real", "Null"]
        );
    }

    #[test]
    fn dictionary_preview_lists_known_keys() {
        let mut t = tree(TreeConfig::default());
        let root = t.root();
        assert_eq!(preview(&t, root).unwrap(), "<< /Type /Catalog ... >>");
        let pages_ref = child(&mut t, root, 1);
        let pages = child(&mut t, pages_ref, 0);
        assert_eq!(
            preview(&t, pages).unwrap(),
            "<< /Type /Pages /SubType /Tree /Name /Main ... >>"
        );
    }

    #[test]
    fn scalar_and_array_previews() {
        let mut t = tree(TreeConfig::default());
        let root = t.root();
        let pages_ref = child(&mut t, root, 1);
        assert_eq!(preview(&t, pages_ref).unwrap(), "2 0 R");
        let data = child(&mut t, root, 3);
        assert!(preview(&t, data).is_none());
        let two = child(&mut t, data, 1);
        assert_eq!(preview(&t, two).unwrap(), "(two)");
        let hex = child(&mut t, data, 2);
        assert_eq!(preview(&t, hex).unwrap(), "<0A>");
        let real = child(&mut t, root, 5);
        assert_eq!(preview(&t, real).unwrap(), "1.5");
    }

    #[test]
    fn icons() {
        let mut t = tree(TreeConfig::default());
        let root = t.root();
        let icons: Vec<Icon> = t
            .children(root)
            .into_iter()
            .map(|c| icon(&t, c).unwrap())
            .collect();
        assert_eq!(
            icons,
            vec![
                Icon::Name,
                Icon::Reference,
                Icon::DanglingReference,
                Icon::Container,
                Icon::Bool,
                Icon::Real,
                Icon::Null,
            ]
        );
        assert_eq!(Icon::DanglingReference.resource(), Some("dangling_reference"));
        assert_eq!(Icon::None.resource(), None);
    }

    #[test]
    fn cells_by_column() {
        let mut t = tree(TreeConfig::default());
        let root = t.root();
        let flag = child(&mut t, root, 4);
        assert_eq!(cell_text(&t, flag, OBJECT_COLUMN).unwrap(), "Flag");
        assert_eq!(cell_text(&t, flag, TYPE_COLUMN).unwrap(), "Boolean");
        assert_eq!(cell_text(&t, flag, VALUE_COLUMN).unwrap(), "true");
        assert!(cell_text(&t, flag, 3).is_none());
        assert_eq!(HEADERS, ["Object", "Type", "Value"]);
    }
}
