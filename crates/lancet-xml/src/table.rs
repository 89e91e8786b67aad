//! `xl/tables/table*.xml` schema structures.

use serde::{Deserialize, Serialize};

use crate::namespaces;

/// Table root element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "table")]
pub struct TableXml {
    #[serde(rename = "@xmlns", default = "namespaces::spreadsheet_ml")]
    pub xmlns: String,

    #[serde(rename = "@id")]
    pub id: u32,

    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "@displayName")]
    pub display_name: String,

    #[serde(rename = "@ref")]
    pub reference: String,

    #[serde(rename = "@headerRowCount", skip_serializing_if = "Option::is_none")]
    pub header_row_count: Option<u32>,

    #[serde(rename = "@totalsRowCount", skip_serializing_if = "Option::is_none")]
    pub totals_row_count: Option<u32>,

    #[serde(rename = "autoFilter", skip_serializing_if = "Option::is_none")]
    pub auto_filter: Option<AutoFilter>,

    #[serde(rename = "tableColumns")]
    pub table_columns: TableColumns,

    #[serde(rename = "tableStyleInfo", skip_serializing_if = "Option::is_none")]
    pub table_style_info: Option<TableStyleInfo>,
}

/// Auto filter over the table range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoFilter {
    #[serde(rename = "@ref")]
    pub reference: String,
}

/// Table columns container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableColumns {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "tableColumn", default)]
    pub columns: Vec<TableColumn>,
}

/// One table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    #[serde(rename = "@id")]
    pub id: u32,

    #[serde(rename = "@name")]
    pub name: String,
}

/// Table style reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableStyleInfo {
    #[serde(rename = "@name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "@showFirstColumn", skip_serializing_if = "Option::is_none")]
    pub show_first_column: Option<bool>,

    #[serde(rename = "@showLastColumn", skip_serializing_if = "Option::is_none")]
    pub show_last_column: Option<bool>,

    #[serde(rename = "@showRowStripes", skip_serializing_if = "Option::is_none")]
    pub show_row_stripes: Option<bool>,

    #[serde(rename = "@showColumnStripes", skip_serializing_if = "Option::is_none")]
    pub show_column_stripes: Option<bool>,
}

impl TableXml {
    pub fn new(id: u32, name: &str, reference: &str, column_names: &[&str]) -> Self {
        Self {
            xmlns: namespaces::SPREADSHEET_ML.to_string(),
            id,
            name: name.to_string(),
            display_name: name.to_string(),
            reference: reference.to_string(),
            header_row_count: None,
            totals_row_count: None,
            auto_filter: Some(AutoFilter {
                reference: reference.to_string(),
            }),
            table_columns: TableColumns {
                count: Some(column_names.len() as u32),
                columns: column_names
                    .iter()
                    .enumerate()
                    .map(|(i, n)| TableColumn {
                        id: i as u32 + 1,
                        name: n.to_string(),
                    })
                    .collect(),
            },
            table_style_info: None,
        }
    }
}
