//! `[Content_Types].xml` schema structures.
//!
//! Maps every part in the package to a MIME content type, either by file
//! extension (`Default`) or by explicit part name (`Override`).

use serde::{Deserialize, Serialize};

use crate::namespaces;

/// `[Content_Types].xml` root element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "Types")]
pub struct ContentTypes {
    #[serde(rename = "@xmlns", default = "namespaces::content_types")]
    pub xmlns: String,

    #[serde(rename = "Default", default)]
    pub defaults: Vec<DefaultType>,

    #[serde(rename = "Override", default)]
    pub overrides: Vec<OverrideType>,
}

/// Extension-based default content type mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultType {
    #[serde(rename = "@Extension")]
    pub extension: String,

    #[serde(rename = "@ContentType")]
    pub content_type: String,
}

/// Part-name content type override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideType {
    #[serde(rename = "@PartName")]
    pub part_name: String,

    #[serde(rename = "@ContentType")]
    pub content_type: String,
}

impl ContentTypes {
    /// Look up the content type recorded for a part, falling back from
    /// overrides to extension defaults.
    pub fn type_of(&self, part_name: &str) -> Option<&str> {
        let slashed = format!("/{}", part_name.trim_start_matches('/'));
        if let Some(ovr) = self.overrides.iter().find(|o| o.part_name == slashed) {
            return Some(&ovr.content_type);
        }
        let ext = part_name.rsplit('.').next()?;
        self.defaults
            .iter()
            .find(|d| d.extension.eq_ignore_ascii_case(ext))
            .map(|d| d.content_type.as_str())
    }

    /// Register an override, replacing any existing entry for the part.
    pub fn set_override(&mut self, part_name: &str, content_type: &str) {
        let slashed = format!("/{}", part_name.trim_start_matches('/'));
        self.overrides.retain(|o| o.part_name != slashed);
        self.overrides.push(OverrideType {
            part_name: slashed,
            content_type: content_type.to_string(),
        });
    }
}

impl Default for ContentTypes {
    fn default() -> Self {
        Self {
            xmlns: namespaces::CONTENT_TYPES.to_string(),
            defaults: vec![
                DefaultType {
                    extension: "rels".to_string(),
                    content_type: mime::RELS.to_string(),
                },
                DefaultType {
                    extension: "xml".to_string(),
                    content_type: mime::XML.to_string(),
                },
            ],
            overrides: vec![
                OverrideType {
                    part_name: "/xl/workbook.xml".to_string(),
                    content_type: mime::WORKBOOK.to_string(),
                },
                OverrideType {
                    part_name: "/xl/worksheets/sheet1.xml".to_string(),
                    content_type: mime::WORKSHEET.to_string(),
                },
                OverrideType {
                    part_name: "/xl/styles.xml".to_string(),
                    content_type: mime::STYLES.to_string(),
                },
                OverrideType {
                    part_name: "/xl/sharedStrings.xml".to_string(),
                    content_type: mime::SHARED_STRINGS.to_string(),
                },
            ],
        }
    }
}

/// MIME strings for the parts lancet models.
pub mod mime {
    pub const RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
    pub const WORKBOOK: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
    pub const WORKSHEET: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
    pub const STYLES: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
    pub const SHARED_STRINGS: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";
    pub const THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
    pub const COMMENTS: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.comments+xml";
    pub const TABLE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.table+xml";
    pub const CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_content_types() {
        let ct = ContentTypes::default();
        assert_eq!(ct.xmlns, namespaces::CONTENT_TYPES);
        assert_eq!(ct.defaults.len(), 2);
        let parts: Vec<&str> = ct.overrides.iter().map(|o| o.part_name.as_str()).collect();
        assert!(parts.contains(&"/xl/workbook.xml"));
        assert!(parts.contains(&"/xl/styles.xml"));
    }

    #[test]
    fn test_type_of_override_beats_default() {
        let ct = ContentTypes::default();
        assert_eq!(ct.type_of("xl/workbook.xml"), Some(mime::WORKBOOK));
        assert_eq!(ct.type_of("/xl/workbook.xml"), Some(mime::WORKBOOK));
        // No override for an arbitrary xml part -> extension default.
        assert_eq!(ct.type_of("xl/calcChain.xml"), Some(mime::XML));
    }

    #[test]
    fn test_set_override_replaces() {
        let mut ct = ContentTypes::default();
        ct.set_override("xl/worksheets/sheet2.xml", mime::WORKSHEET);
        ct.set_override("xl/worksheets/sheet2.xml", mime::WORKSHEET);
        let count = ct
            .overrides
            .iter()
            .filter(|o| o.part_name == "/xl/worksheets/sheet2.xml")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_roundtrip() {
        let ct = ContentTypes::default();
        let xml = quick_xml::se::to_string(&ct).unwrap();
        let parsed: ContentTypes = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(ct, parsed);
    }
}
