//! Error types for the lancet core library.
//!
//! The taxonomy is closed: every fallible operation in the crate surfaces
//! one of these variants. Formula *evaluation* failures are not errors --
//! they become [`crate::value::CellError`] cell values and never cross the
//! API boundary as `Err`.

use thiserror::Error;

/// The top-level error type for lancet.
#[derive(Error, Debug)]
pub enum Error {
    // ===== Addressing =====
    /// A1-style cell reference parse failed.
    #[error("invalid cell reference '{input}': {detail}")]
    InvalidCellRef { input: String, detail: String },

    /// Sheet name violates OOXML naming rules.
    #[error("invalid sheet name '{input}': {detail}")]
    InvalidSheetName { input: String, detail: String },

    /// Structural reference mismatch (e.g. an unqualified reference where a
    /// sheet-qualified one is required).
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// A numeric index fell outside the Excel grid.
    #[error("{what} {value} out of bounds (max {max})")]
    OutOfBounds {
        what: &'static str,
        value: u32,
        max: u32,
    },

    // ===== Workbook structure =====
    /// No sheet with the given name exists.
    #[error("sheet '{name}' does not exist")]
    SheetNotFound { name: String },

    /// Adding the sheet would violate name uniqueness.
    #[error("sheet '{name}' already exists")]
    DuplicateSheet { name: String },

    /// A structural workbook rule was violated (e.g. removing the last
    /// sheet).
    #[error("invalid workbook: {0}")]
    InvalidWorkbook(String),

    /// A new merge intersects an existing merged range.
    #[error("merge overlaps existing range {range}")]
    MergeOverlap { range: String },

    /// Bulk put with a value count that disagrees with the target shape.
    #[error("{context}: expected {expected} values, got {actual}")]
    ValueCountMismatch {
        expected: usize,
        actual: usize,
        context: String,
    },

    /// Bulk put with a value that cannot be coerced for the target cell.
    #[error("unsupported value type {type_name} at {reference}")]
    UnsupportedType {
        reference: String,
        type_name: String,
    },

    // ===== Formula =====
    /// Formula text could not be parsed.
    #[error("formula parse error in '{input}': {detail}")]
    ParseError { input: String, detail: String },

    /// The dependency graph contains one or more cycles.
    #[error("circular reference involving: {}", cells.join(", "))]
    CycleError { cells: Vec<String> },

    // ===== Codec =====
    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The container is not a readable ZIP archive.
    #[error("corrupt zip: {0}")]
    CorruptZip(String),

    /// A required part is missing from the package.
    #[error("missing part: {0}")]
    MissingPart(String),

    /// A modelled part could not be structurally parsed.
    #[error("malformed XML in {part}: {detail}")]
    MalformedXml { part: String, detail: String },

    /// The source file changed between read and surgical write.
    #[error("source file mutated since read: {path}")]
    SourceMutated { path: String },

    /// A preserved-part copy disagreed with the manifest sizes.
    #[error("preserved entry size mismatch: {entry}")]
    SizeMismatch { entry: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
