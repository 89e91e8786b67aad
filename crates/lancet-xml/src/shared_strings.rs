//! `xl/sharedStrings.xml` schema structures.
//!
//! The shared string table (SST) is the indexed pool of text values that
//! cells of type `s` point into. Items are either plain text (`<t>`) or a
//! sequence of rich-text runs (`<r>`).

use serde::{Deserialize, Serialize};

use crate::namespaces;

/// Shared string table root element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "sst")]
pub struct SstXml {
    #[serde(rename = "@xmlns", default = "namespaces::spreadsheet_ml")]
    pub xmlns: String,

    /// Total reference count across the workbook.
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    /// Number of unique entries.
    #[serde(rename = "@uniqueCount", skip_serializing_if = "Option::is_none")]
    pub unique_count: Option<u32>,

    #[serde(rename = "si", default)]
    pub items: Vec<StringItem>,
}

impl Default for SstXml {
    fn default() -> Self {
        Self {
            xmlns: namespaces::SPREADSHEET_ML.to_string(),
            count: Some(0),
            unique_count: Some(0),
            items: vec![],
        }
    }
}

/// One `<si>` item: plain text or rich runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringItem {
    #[serde(rename = "t", skip_serializing_if = "Option::is_none")]
    pub t: Option<Text>,

    #[serde(rename = "r", default)]
    pub runs: Vec<RichRunXml>,
}

impl StringItem {
    /// Plain-text view: `t` when present, otherwise the run texts joined.
    pub fn plain_text(&self) -> String {
        match &self.t {
            Some(t) => t.value.clone(),
            None => self.runs.iter().map(|r| r.t.value.as_str()).collect(),
        }
    }
}

/// Text element with optional whitespace preservation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(
        rename = "@xml:space",
        alias = "@space",
        skip_serializing_if = "Option::is_none"
    )]
    pub xml_space: Option<String>,

    #[serde(rename = "$value", default)]
    pub value: String,
}

impl Text {
    /// Wrap a string, emitting `xml:space="preserve"` when leading or
    /// trailing whitespace would otherwise be lost.
    pub fn new(value: &str) -> Self {
        let needs_preserve = value.starts_with(' ')
            || value.ends_with(' ')
            || value.contains('\n')
            || value.contains('\t');
        Self {
            xml_space: needs_preserve.then(|| "preserve".to_string()),
            value: value.to_string(),
        }
    }
}

/// Rich text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichRunXml {
    #[serde(rename = "rPr", skip_serializing_if = "Option::is_none")]
    pub r_pr: Option<RunProperties>,

    #[serde(rename = "t")]
    pub t: Text,
}

/// Run properties (per-run font overrides).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProperties {
    #[serde(rename = "b", skip_serializing_if = "Option::is_none")]
    pub b: Option<BoolVal>,

    #[serde(rename = "i", skip_serializing_if = "Option::is_none")]
    pub i: Option<BoolVal>,

    #[serde(rename = "u", skip_serializing_if = "Option::is_none")]
    pub u: Option<BoolVal>,

    #[serde(rename = "strike", skip_serializing_if = "Option::is_none")]
    pub strike: Option<BoolVal>,

    #[serde(rename = "sz", skip_serializing_if = "Option::is_none")]
    pub sz: Option<ValF64>,

    #[serde(rename = "color", skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorXml>,

    #[serde(rename = "rFont", skip_serializing_if = "Option::is_none")]
    pub r_font: Option<ValString>,
}

/// Empty-or-`val` boolean element (`<b/>`, `<b val="0"/>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoolVal {
    #[serde(rename = "@val", skip_serializing_if = "Option::is_none")]
    pub val: Option<bool>,
}

impl BoolVal {
    /// An absent `val` attribute means true.
    pub fn is_set(&self) -> bool {
        self.val.unwrap_or(true)
    }
}

/// `val`-carrying f64 element (font size).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValF64 {
    #[serde(rename = "@val")]
    pub val: f64,
}

/// `val`-carrying string element (font name, scheme).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValString {
    #[serde(rename = "@val")]
    pub val: String,
}

/// Color in any of the three OOXML spellings: raw ARGB, theme slot + tint,
/// or legacy palette index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorXml {
    #[serde(rename = "@rgb", skip_serializing_if = "Option::is_none")]
    pub rgb: Option<String>,

    #[serde(rename = "@theme", skip_serializing_if = "Option::is_none")]
    pub theme: Option<u32>,

    #[serde(rename = "@tint", skip_serializing_if = "Option::is_none")]
    pub tint: Option<f64>,

    #[serde(rename = "@indexed", skip_serializing_if = "Option::is_none")]
    pub indexed: Option<u32>,
}
