//! `xl/workbook.xml` schema structures.
//!
//! Carries the sheet list, defined names, active tab, and workbook
//! properties. Sheet order here is the authoritative tab order.

use serde::{Deserialize, Serialize};

use crate::namespaces;

/// Workbook root element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "workbook")]
pub struct WorkbookXml {
    #[serde(rename = "@xmlns", default = "namespaces::spreadsheet_ml")]
    pub xmlns: String,

    #[serde(rename = "@xmlns:r", default = "namespaces::relationships")]
    pub xmlns_r: String,

    #[serde(rename = "workbookPr", skip_serializing_if = "Option::is_none")]
    pub workbook_pr: Option<WorkbookPr>,

    #[serde(rename = "bookViews", skip_serializing_if = "Option::is_none")]
    pub book_views: Option<BookViews>,

    #[serde(rename = "sheets")]
    pub sheets: Sheets,

    #[serde(rename = "definedNames", skip_serializing_if = "Option::is_none")]
    pub defined_names: Option<DefinedNames>,

    #[serde(rename = "calcPr", skip_serializing_if = "Option::is_none")]
    pub calc_pr: Option<CalcPr>,
}

/// Workbook properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookPr {
    #[serde(rename = "@date1904", skip_serializing_if = "Option::is_none")]
    pub date1904: Option<bool>,

    #[serde(
        rename = "@defaultThemeVersion",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_theme_version: Option<u32>,
}

/// Book views container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookViews {
    #[serde(rename = "workbookView")]
    pub views: Vec<WorkbookView>,
}

/// Individual workbook view; `activeTab` selects the active sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkbookView {
    #[serde(rename = "@xWindow", skip_serializing_if = "Option::is_none")]
    pub x_window: Option<i32>,

    #[serde(rename = "@yWindow", skip_serializing_if = "Option::is_none")]
    pub y_window: Option<i32>,

    #[serde(rename = "@windowWidth", skip_serializing_if = "Option::is_none")]
    pub window_width: Option<u32>,

    #[serde(rename = "@windowHeight", skip_serializing_if = "Option::is_none")]
    pub window_height: Option<u32>,

    #[serde(rename = "@activeTab", skip_serializing_if = "Option::is_none")]
    pub active_tab: Option<u32>,
}

/// Sheets container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheets {
    #[serde(rename = "sheet")]
    pub sheets: Vec<SheetEntry>,
}

/// One `<sheet>` entry; `r:id` names the worksheet relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetEntry {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "@sheetId")]
    pub sheet_id: u32,

    /// "hidden" or "veryHidden"; absent means visible.
    #[serde(rename = "@state", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(rename = "@r:id", alias = "@id")]
    pub r_id: String,
}

/// Defined names container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinedNames {
    #[serde(rename = "definedName", default)]
    pub names: Vec<DefinedNameXml>,
}

/// Individual defined name; the element text is the refers-to formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinedNameXml {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "@localSheetId", skip_serializing_if = "Option::is_none")]
    pub local_sheet_id: Option<u32>,

    #[serde(rename = "@hidden", skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,

    #[serde(rename = "$value", default)]
    pub value: String,
}

/// Calculation properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcPr {
    #[serde(rename = "@calcId", skip_serializing_if = "Option::is_none")]
    pub calc_id: Option<u32>,

    #[serde(rename = "@fullCalcOnLoad", skip_serializing_if = "Option::is_none")]
    pub full_calc_on_load: Option<bool>,
}

impl Default for WorkbookXml {
    fn default() -> Self {
        Self {
            xmlns: namespaces::SPREADSHEET_ML.to_string(),
            xmlns_r: namespaces::RELATIONSHIPS.to_string(),
            workbook_pr: None,
            book_views: None,
            sheets: Sheets {
                sheets: vec![SheetEntry {
                    name: "Sheet1".to_string(),
                    sheet_id: 1,
                    state: None,
                    r_id: "rId1".to_string(),
                }],
            },
            defined_names: None,
            calc_pr: None,
        }
    }
}
