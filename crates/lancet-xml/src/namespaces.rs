//! OOXML namespace URI constants shared by every modelled part.

/// SpreadsheetML main namespace.
pub const SPREADSHEET_ML: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Relationship-reference namespace, bound as `xmlns:r` on elements that
/// carry `r:id` attributes. Some consumers reject worksheet parts that omit
/// this binding, so the writer always emits it on part roots.
pub const RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Package-level relationships namespace (`.rels` parts).
pub const PACKAGE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";

/// `[Content_Types].xml` namespace.
pub const CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// DrawingML main namespace (used when scanning theme parts for colors).
pub const DRAWING_ML: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

// serde `default = ...` helpers so parts missing a namespace declaration
// still deserialize (and re-serialize with the standard one).

pub fn spreadsheet_ml() -> String {
    SPREADSHEET_ML.to_string()
}

pub fn relationships() -> String {
    RELATIONSHIPS.to_string()
}

pub fn package_relationships() -> String {
    PACKAGE_RELATIONSHIPS.to_string()
}

pub fn content_types() -> String {
    CONTENT_TYPES.to_string()
}
