//! `xl/styles.xml` schema structures.
//!
//! The stylesheet holds separately numbered component tables (`numFmts`,
//! `fonts`, `fills`, `borders`) plus the `cellXfs` records that combine
//! them. Cell `s` attributes index into `cellXfs`. The codec's style index
//! is responsible for keeping component positions stable across surgical
//! writes; this module is only the wire shape.

use serde::{Deserialize, Serialize};

use crate::namespaces;
use crate::shared_strings::{BoolVal, ColorXml, ValF64, ValString};

/// Stylesheet root element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "styleSheet")]
pub struct StyleSheetXml {
    #[serde(rename = "@xmlns", default = "namespaces::spreadsheet_ml")]
    pub xmlns: String,

    #[serde(rename = "numFmts", skip_serializing_if = "Option::is_none")]
    pub num_fmts: Option<NumFmts>,

    #[serde(rename = "fonts")]
    pub fonts: Fonts,

    #[serde(rename = "fills")]
    pub fills: Fills,

    #[serde(rename = "borders")]
    pub borders: Borders,

    #[serde(rename = "cellStyleXfs", skip_serializing_if = "Option::is_none")]
    pub cell_style_xfs: Option<CellStyleXfs>,

    #[serde(rename = "cellXfs")]
    pub cell_xfs: CellXfs,

    #[serde(rename = "cellStyles", skip_serializing_if = "Option::is_none")]
    pub cell_styles: Option<CellStyles>,
}

/// Custom number formats container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumFmts {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "numFmt", default)]
    pub num_fmts: Vec<NumFmtXml>,
}

/// One number format: id 164+ for custom codes, below 164 reserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumFmtXml {
    #[serde(rename = "@numFmtId")]
    pub num_fmt_id: u32,

    #[serde(rename = "@formatCode")]
    pub format_code: String,
}

/// Fonts container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fonts {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "font", default)]
    pub fonts: Vec<FontXml>,
}

/// One font definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontXml {
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

    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub name: Option<ValString>,

    #[serde(rename = "family", skip_serializing_if = "Option::is_none")]
    pub family: Option<ValU32>,

    #[serde(rename = "scheme", skip_serializing_if = "Option::is_none")]
    pub scheme: Option<ValString>,
}

/// `val`-carrying u32 element (font family).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValU32 {
    #[serde(rename = "@val")]
    pub val: u32,
}

/// Fills container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fills {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "fill", default)]
    pub fills: Vec<FillXml>,
}

/// One fill definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FillXml {
    #[serde(rename = "patternFill", skip_serializing_if = "Option::is_none")]
    pub pattern_fill: Option<PatternFillXml>,
}

/// Pattern fill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternFillXml {
    #[serde(rename = "@patternType", skip_serializing_if = "Option::is_none")]
    pub pattern_type: Option<String>,

    #[serde(rename = "fgColor", skip_serializing_if = "Option::is_none")]
    pub fg_color: Option<ColorXml>,

    #[serde(rename = "bgColor", skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<ColorXml>,
}

/// Borders container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Borders {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "border", default)]
    pub borders: Vec<BorderXml>,
}

/// One border definition. Element order (left, right, top, bottom,
/// diagonal) is fixed by the schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderXml {
    #[serde(rename = "left", skip_serializing_if = "Option::is_none")]
    pub left: Option<BorderSideXml>,

    #[serde(rename = "right", skip_serializing_if = "Option::is_none")]
    pub right: Option<BorderSideXml>,

    #[serde(rename = "top", skip_serializing_if = "Option::is_none")]
    pub top: Option<BorderSideXml>,

    #[serde(rename = "bottom", skip_serializing_if = "Option::is_none")]
    pub bottom: Option<BorderSideXml>,

    #[serde(rename = "diagonal", skip_serializing_if = "Option::is_none")]
    pub diagonal: Option<BorderSideXml>,
}

/// One side of a border.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderSideXml {
    #[serde(rename = "@style", skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(rename = "color", skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorXml>,
}

/// `cellStyleXfs` container (named-style base records).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellStyleXfs {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "xf", default)]
    pub xfs: Vec<Xf>,
}

/// `cellXfs` container (the records cell `s` attributes index).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellXfs {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "xf", default)]
    pub xfs: Vec<Xf>,
}

/// One cell format record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Xf {
    #[serde(rename = "@numFmtId", skip_serializing_if = "Option::is_none")]
    pub num_fmt_id: Option<u32>,

    #[serde(rename = "@fontId", skip_serializing_if = "Option::is_none")]
    pub font_id: Option<u32>,

    #[serde(rename = "@fillId", skip_serializing_if = "Option::is_none")]
    pub fill_id: Option<u32>,

    #[serde(rename = "@borderId", skip_serializing_if = "Option::is_none")]
    pub border_id: Option<u32>,

    #[serde(rename = "@xfId", skip_serializing_if = "Option::is_none")]
    pub xf_id: Option<u32>,

    #[serde(rename = "@applyNumberFormat", skip_serializing_if = "Option::is_none")]
    pub apply_number_format: Option<bool>,

    #[serde(rename = "@applyFont", skip_serializing_if = "Option::is_none")]
    pub apply_font: Option<bool>,

    #[serde(rename = "@applyFill", skip_serializing_if = "Option::is_none")]
    pub apply_fill: Option<bool>,

    #[serde(rename = "@applyBorder", skip_serializing_if = "Option::is_none")]
    pub apply_border: Option<bool>,

    #[serde(rename = "@applyAlignment", skip_serializing_if = "Option::is_none")]
    pub apply_alignment: Option<bool>,

    #[serde(rename = "alignment", skip_serializing_if = "Option::is_none")]
    pub alignment: Option<AlignmentXml>,
}

/// Alignment record inside an xf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentXml {
    #[serde(rename = "@horizontal", skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<String>,

    #[serde(rename = "@vertical", skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,

    #[serde(rename = "@wrapText", skip_serializing_if = "Option::is_none")]
    pub wrap_text: Option<bool>,

    #[serde(rename = "@indent", skip_serializing_if = "Option::is_none")]
    pub indent: Option<u32>,
}

/// Named cell styles container (`cellStyles`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellStyles {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "cellStyle", default)]
    pub cell_styles: Vec<CellStyleEntry>,
}

/// One named cell style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellStyleEntry {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "@xfId")]
    pub xf_id: u32,

    #[serde(rename = "@builtinId", skip_serializing_if = "Option::is_none")]
    pub builtin_id: Option<u32>,
}

impl StyleSheetXml {
    /// A minimal stylesheet: one default font/fill/border and a single
    /// General-format xf at index 0, which every cell without an explicit
    /// style uses.
    pub fn minimal() -> Self {
        Self {
            xmlns: namespaces::SPREADSHEET_ML.to_string(),
            num_fmts: None,
            fonts: Fonts {
                count: Some(1),
                fonts: vec![FontXml {
                    sz: Some(ValF64 { val: 11.0 }),
                    name: Some(ValString {
                        val: "Calibri".to_string(),
                    }),
                    family: Some(ValU32 { val: 2 }),
                    ..Default::default()
                }],
            },
            fills: Fills {
                count: Some(2),
                fills: vec![
                    FillXml {
                        pattern_fill: Some(PatternFillXml {
                            pattern_type: Some("none".to_string()),
                            ..Default::default()
                        }),
                    },
                    FillXml {
                        pattern_fill: Some(PatternFillXml {
                            pattern_type: Some("gray125".to_string()),
                            ..Default::default()
                        }),
                    },
                ],
            },
            borders: Borders {
                count: Some(1),
                borders: vec![BorderXml::default()],
            },
            cell_style_xfs: Some(CellStyleXfs {
                count: Some(1),
                xfs: vec![Xf {
                    num_fmt_id: Some(0),
                    font_id: Some(0),
                    fill_id: Some(0),
                    border_id: Some(0),
                    ..Default::default()
                }],
            }),
            cell_xfs: CellXfs {
                count: Some(1),
                xfs: vec![Xf {
                    num_fmt_id: Some(0),
                    font_id: Some(0),
                    fill_id: Some(0),
                    border_id: Some(0),
                    xf_id: Some(0),
                    ..Default::default()
                }],
            },
            cell_styles: Some(CellStyles {
                count: Some(1),
                cell_styles: vec![CellStyleEntry {
                    name: "Normal".to_string(),
                    xf_id: 0,
                    builtin_id: Some(0),
                }],
            }),
        }
    }
}

impl Default for StyleSheetXml {
    fn default() -> Self {
        Self::minimal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_stylesheet_shape() {
        let ss = StyleSheetXml::minimal();
        assert_eq!(ss.fonts.fonts.len(), 1);
        assert_eq!(ss.fills.fills.len(), 2);
        assert_eq!(ss.borders.borders.len(), 1);
        assert_eq!(ss.cell_xfs.xfs.len(), 1);
        // The gray125 fill at index 1 is what Excel writes for new files.
        assert_eq!(
            ss.fills.fills[1]
                .pattern_fill
                .as_ref()
                .unwrap()
                .pattern_type
                .as_deref(),
            Some("gray125")
        );
    }

    #[test]
    fn test_stylesheet_roundtrip() {
        let mut ss = StyleSheetXml::minimal();
        ss.num_fmts = Some(NumFmts {
            count: Some(1),
            num_fmts: vec![NumFmtXml {
                num_fmt_id: 164,
                format_code: "0.000".to_string(),
            }],
        });
        let xml = quick_xml::se::to_string(&ss).unwrap();
        let parsed: StyleSheetXml = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(ss, parsed);
    }

    #[test]
    fn test_xf_alignment_roundtrip() {
        let xf = Xf {
            num_fmt_id: Some(0),
            font_id: Some(0),
            fill_id: Some(0),
            border_id: Some(0),
            apply_alignment: Some(true),
            alignment: Some(AlignmentXml {
                horizontal: Some("center".to_string()),
                wrap_text: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut ss = StyleSheetXml::minimal();
        ss.cell_xfs.xfs.push(xf.clone());
        let xml = quick_xml::se::to_string(&ss).unwrap();
        let parsed: StyleSheetXml = quick_xml::de::from_str(&xml).unwrap();
        assert_eq!(parsed.cell_xfs.xfs[1], xf);
    }
}
