//! Relationships (`.rels`) schema structures.
//!
//! Used for `_rels/.rels`, `xl/_rels/workbook.xml.rels`, and per-worksheet
//! relationship parts.

use serde::{Deserialize, Serialize};

use crate::namespaces;

/// Relationships root element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "Relationships")]
pub struct Relationships {
    #[serde(rename = "@xmlns", default = "namespaces::package_relationships")]
    pub xmlns: String,

    #[serde(rename = "Relationship", default)]
    pub relationships: Vec<Relationship>,
}

/// Individual relationship entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "@Id")]
    pub id: String,

    #[serde(rename = "@Type")]
    pub rel_type: String,

    #[serde(rename = "@Target")]
    pub target: String,

    #[serde(rename = "@TargetMode", skip_serializing_if = "Option::is_none")]
    pub target_mode: Option<String>,
}

impl Relationships {
    /// Find the first relationship of the given type.
    pub fn by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.rel_type == rel_type)
    }

    /// Find a relationship by its `rId`.
    pub fn by_id(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }

    /// Next unused `rId` number.
    pub fn next_id(&self) -> String {
        let max = self
            .relationships
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }
}

/// Package-level relationships for a freshly built workbook (`_rels/.rels`).
pub fn package_rels() -> Relationships {
    Relationships {
        xmlns: namespaces::PACKAGE_RELATIONSHIPS.to_string(),
        relationships: vec![Relationship {
            id: "rId1".to_string(),
            rel_type: rel_types::OFFICE_DOCUMENT.to_string(),
            target: "xl/workbook.xml".to_string(),
            target_mode: None,
        }],
    }
}

/// Workbook-level relationships for a freshly built single-sheet workbook.
pub fn workbook_rels() -> Relationships {
    Relationships {
        xmlns: namespaces::PACKAGE_RELATIONSHIPS.to_string(),
        relationships: vec![
            Relationship {
                id: "rId1".to_string(),
                rel_type: rel_types::WORKSHEET.to_string(),
                target: "worksheets/sheet1.xml".to_string(),
                target_mode: None,
            },
            Relationship {
                id: "rId2".to_string(),
                rel_type: rel_types::STYLES.to_string(),
                target: "styles.xml".to_string(),
                target_mode: None,
            },
            Relationship {
                id: "rId3".to_string(),
                rel_type: rel_types::SHARED_STRINGS.to_string(),
                target: "sharedStrings.xml".to_string(),
                target_mode: None,
            },
        ],
    }
}

/// Relationship type URI constants.
pub mod rel_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const WORKSHEET: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
    pub const SHARED_STRINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const COMMENTS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments";
    pub const TABLE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/table";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
}
