//! lancet-xml: OOXML (SpreadsheetML) schema structures.
//!
//! Serde + quick-xml representations of the package parts that lancet
//! models. Everything here is pure data; the codec in `lancet-core` owns
//! all ZIP and file I/O. Parts the library does not model never pass
//! through this crate -- they are preserved byte-for-byte by the writer.
//!
//! # Modules
//!
//! - [`namespaces`] - OOXML namespace URI constants
//! - [`content_types`] - `[Content_Types].xml` structures
//! - [`relationships`] - Relationships (`.rels`) structures
//! - [`workbook`] - `xl/workbook.xml` structures
//! - [`worksheet`] - `xl/worksheets/sheet*.xml` structures
//! - [`styles`] - `xl/styles.xml` structures
//! - [`shared_strings`] - `xl/sharedStrings.xml` structures
//! - [`comments`] - `xl/comments*.xml` structures
//! - [`table`] - `xl/tables/table*.xml` structures
//! - [`theme`] - theme color extraction helpers

pub mod comments;
pub mod content_types;
pub mod namespaces;
pub mod relationships;
pub mod shared_strings;
pub mod styles;
pub mod table;
pub mod theme;
pub mod workbook;
pub mod worksheet;
