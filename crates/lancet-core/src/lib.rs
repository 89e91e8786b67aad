//! lancet-core: surgical spreadsheet engine.
//!
//! The core is layered bottom-up:
//!
//! - [`addr`] / [`value`] -- A1 addressing and cell values
//! - [`style`], [`sheet`], [`patch`], [`workbook`] -- the immutable domain
//!   model with its patch algebra and style registry
//! - [`formula`] -- typed formula AST, parser/printer, shifting, dependency
//!   graph, and evaluator
//! - [`codec`] -- the OOXML reader/writer, including the preserved-part
//!   store that streams unmodelled parts byte-for-byte
//!
//! Every method on [`workbook::Workbook`] and [`sheet::Sheet`] returns a new
//! value; nothing is mutated in place, so values can be shared freely
//! between threads.

pub mod addr;
pub mod codec;
pub mod error;
pub mod formula;
pub mod patch;
pub mod sheet;
pub mod source;
pub mod style;
pub mod theme;
pub mod value;
pub mod workbook;
