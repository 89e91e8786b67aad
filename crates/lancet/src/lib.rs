//! Lancet: surgical editing of `.xlsx` workbooks.
//!
//! Open a spreadsheet authored by another tool, change a handful of
//! cells, and write back a file that is byte-compatible with the original
//! in every part you did not touch -- charts, pivot tables, and unknown
//! extension parts round-trip as raw bytes.
//!
//! # Quick start
//!
//! ```no_run
//! use lancet::{read, write, ARef};
//!
//! let wb = read("report.xlsx")?;
//! let wb = wb.put("Sheet1", ARef::parse("A1")?, "Updated")?;
//! write(&wb, "report-out.xlsx")?;
//! # Ok::<(), lancet::Error>(())
//! ```

pub use lancet_core::addr::{ARef, Anchor, CellRange, Column, RefType, Row, SheetName};
pub use lancet_core::codec::{read, read_bytes, write, write_with, PreservedPartStore, WriteOptions};
pub use lancet_core::error::{Error, Result};
pub use lancet_core::formula::{
    self, evaluate, parse as parse_formula, print as print_formula, shift_formula,
    DependencyGraph, TExpr,
};
pub use lancet_core::patch::Patch;
pub use lancet_core::sheet::{Cell, ColProps, Comment, RowProps, Sheet, Table};
pub use lancet_core::source::{ModificationTracker, PartManifest, SourceContext, SourceFingerprint};
pub use lancet_core::style::{
    Align, Border, BorderSide, BorderStyle, CellStyle, Color, Fill, Font, HAlign, NumFmt,
    StyleId, StyleRegistry, VAlign,
};
pub use lancet_core::theme::ThemePalette;
pub use lancet_core::value::{CellError, CellValue, RichRun};
pub use lancet_core::workbook::{DefinedName, SheetVisibility, Workbook, WorkbookMeta};
