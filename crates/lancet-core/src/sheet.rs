//! The worksheet domain model.
//!
//! A [`Sheet`] is a persistent value: every operation returns a new sheet
//! and leaves the receiver untouched. Cells live in a `BTreeMap` keyed by
//! [`ARef`], whose row-major ordering is what makes writer output
//! deterministic.

use std::collections::BTreeMap;

use crate::addr::{ARef, CellRange, SheetName};
use crate::error::{Error, Result};
use crate::style::{CellStyle, StyleId, StyleRegistry};
use crate::value::CellValue;

/// A cell comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub author: String,
    pub text: String,
}

impl Comment {
    pub fn new(author: &str, text: &str) -> Self {
        Self {
            author: author.to_string(),
            text: text.to_string(),
        }
    }
}

/// A cell: value, optional style, optional comment. The empty cell is
/// `Cell { value: Empty, style: None, comment: None }`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub value: CellValue,
    pub style: Option<StyleId>,
    pub comment: Option<Comment>,
}

impl Cell {
    pub fn of(value: CellValue) -> Self {
        Self {
            value,
            style: None,
            comment: None,
        }
    }

    /// True when the cell carries nothing worth writing.
    pub fn is_blank(&self) -> bool {
        self.value.is_empty() && self.style.is_none() && self.comment.is_none()
    }
}

/// Per-column properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColProps {
    pub width: Option<f64>,
    pub hidden: bool,
    pub outline_level: u8,
    pub style: Option<StyleId>,
}

/// Per-row properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowProps {
    pub height: Option<f64>,
    pub hidden: bool,
    pub outline_level: u8,
    pub collapsed: bool,
    pub style: Option<StyleId>,
}

/// A worksheet table (structured range).
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub range: CellRange,
    pub columns: Vec<String>,
}

/// An immutable worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: SheetName,
    pub(crate) cells: BTreeMap<ARef, Cell>,
    /// Merged ranges, kept sorted by start cell.
    pub(crate) merges: Vec<CellRange>,
    /// 0-based column index -> properties.
    pub(crate) col_props: BTreeMap<u32, ColProps>,
    /// 0-based row index -> properties.
    pub(crate) row_props: BTreeMap<u32, RowProps>,
    pub(crate) default_col_width: Option<f64>,
    pub(crate) default_row_height: Option<f64>,
    pub(crate) hyperlinks: BTreeMap<ARef, String>,
    pub(crate) tables: Vec<Table>,
    pub(crate) styles: StyleRegistry,
}

impl Sheet {
    /// A new empty sheet. The style registry starts with the default style
    /// at slot 0.
    pub fn new(name: SheetName) -> Self {
        Self {
            name,
            cells: BTreeMap::new(),
            merges: Vec::new(),
            col_props: BTreeMap::new(),
            row_props: BTreeMap::new(),
            default_col_width: None,
            default_row_height: None,
            hyperlinks: BTreeMap::new(),
            tables: Vec::new(),
            styles: StyleRegistry::new(),
        }
    }

    pub fn name(&self) -> &SheetName {
        &self.name
    }

    pub(crate) fn renamed(&self, name: SheetName) -> Self {
        let mut next = self.clone();
        next.name = name;
        next
    }

    // ----- cell access ------------------------------------------------------

    pub fn get(&self, aref: ARef) -> Option<&Cell> {
        self.cells.get(&aref)
    }

    /// The cell's value; `Empty` when the cell is absent.
    pub fn value(&self, aref: ARef) -> CellValue {
        self.cells
            .get(&aref)
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Empty)
    }

    /// Row-major iteration over present cells.
    pub fn iter_cells(&self) -> impl Iterator<Item = (ARef, &Cell)> {
        self.cells.iter().map(|(a, c)| (*a, c))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Bounding rectangle of present cells, if any.
    pub fn used_range(&self) -> Option<CellRange> {
        let mut iter = self.cells.keys();
        let first = *iter.next()?;
        let (mut min_c, mut max_c) = (first.col, first.col);
        let (mut min_r, mut max_r) = (first.row, first.row);
        for aref in iter {
            min_c = min_c.min(aref.col);
            max_c = max_c.max(aref.col);
            min_r = min_r.min(aref.row);
            max_r = max_r.max(aref.row);
        }
        Some(CellRange::new(
            ARef::new(min_c, min_r),
            ARef::new(max_c, max_r),
        ))
    }

    // ----- cell mutation (persistent) ---------------------------------------

    /// Write a value, keeping any existing style and comment on the cell.
    pub fn put(&self, aref: ARef, value: CellValue) -> Self {
        let mut next = self.clone();
        next.cells.entry(aref).or_default().value = value;
        next
    }

    /// Delete a cell entirely (value, style, and comment).
    pub fn remove(&self, aref: ARef) -> Self {
        let mut next = self.clone();
        next.cells.remove(&aref);
        next
    }

    /// Delete every cell inside the range.
    pub fn remove_range(&self, range: CellRange) -> Self {
        let mut next = self.clone();
        next.cells.retain(|aref, _| !range.contains(*aref));
        next
    }

    /// Bulk write: fill the range row-major with the given values. The
    /// value count must match the range size exactly.
    pub fn put_range(&self, range: CellRange, values: &[CellValue]) -> Result<Self> {
        let expected = range.cell_count() as usize;
        if values.len() != expected {
            return Err(Error::ValueCountMismatch {
                expected,
                actual: values.len(),
                context: format!("put_range {}", range.to_a1()),
            });
        }
        let mut next = self.clone();
        for (aref, value) in range.iter().zip(values) {
            next.cells.entry(aref).or_default().value = value.clone();
        }
        Ok(next)
    }

    // ----- merges -----------------------------------------------------------

    pub fn merges(&self) -> &[CellRange] {
        &self.merges
    }

    /// Add a merged range. Fails with [`Error::MergeOverlap`] when the
    /// range intersects an existing merge (end-inclusive on both axes);
    /// the sheet is unchanged on failure.
    pub fn merge(&self, range: CellRange) -> Result<Self> {
        if let Some(existing) = self.merges.iter().find(|m| m.intersects(range)) {
            return Err(Error::MergeOverlap {
                range: existing.to_a1(),
            });
        }
        let mut next = self.clone();
        let at = next
            .merges
            .partition_point(|m| m.start < range.start);
        next.merges.insert(at, range);
        Ok(next)
    }

    /// Remove the exact merged range; a no-op when absent.
    pub fn unmerge(&self, range: CellRange) -> Self {
        let mut next = self.clone();
        next.merges
            .retain(|m| !(m.start == range.start && m.end == range.end));
        next
    }

    // ----- styles -----------------------------------------------------------

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    /// Assign an already registered style id to a cell, creating the cell
    /// if needed. The id must name a live registry entry.
    pub fn set_style(&self, aref: ARef, id: StyleId) -> Result<Self> {
        if !self.styles.contains(id) {
            return Err(Error::OutOfBounds {
                what: "style id",
                value: id.0,
                max: self.styles.len().saturating_sub(1) as u32,
            });
        }
        let mut next = self.clone();
        next.cells.entry(aref).or_default().style = Some(id);
        Ok(next)
    }

    /// Register a style and assign it in one step.
    pub fn set_cell_style(&self, aref: ARef, style: &CellStyle) -> Self {
        let mut next = self.clone();
        let id = next.styles.register(style.clone());
        next.cells.entry(aref).or_default().style = Some(id);
        next
    }

    /// Register once, then assign the same id to every cell in the range.
    pub fn set_range_style(&self, range: CellRange, style: &CellStyle) -> Self {
        let mut next = self.clone();
        let id = next.styles.register(style.clone());
        for aref in range.iter() {
            next.cells.entry(aref).or_default().style = Some(id);
        }
        next
    }

    /// Drop the style id; the cell keeps its value and comment.
    pub fn clear_style(&self, aref: ARef) -> Self {
        let mut next = self.clone();
        if let Some(cell) = next.cells.get_mut(&aref) {
            cell.style = None;
            if cell.is_blank() {
                next.cells.remove(&aref);
            }
        }
        next
    }

    // ----- row / column properties ------------------------------------------

    pub fn col_props(&self, col: u32) -> Option<&ColProps> {
        self.col_props.get(&col)
    }

    pub fn row_props(&self, row: u32) -> Option<&RowProps> {
        self.row_props.get(&row)
    }

    pub fn set_col_props(&self, col: u32, props: ColProps) -> Self {
        let mut next = self.clone();
        next.col_props.insert(col, props);
        next
    }

    pub fn set_row_props(&self, row: u32, props: RowProps) -> Self {
        let mut next = self.clone();
        next.row_props.insert(row, props);
        next
    }

    pub fn default_col_width(&self) -> Option<f64> {
        self.default_col_width
    }

    pub fn default_row_height(&self) -> Option<f64> {
        self.default_row_height
    }

    // ----- comments ---------------------------------------------------------

    pub fn comment(&self, aref: ARef) -> Option<&Comment> {
        self.cells.get(&aref).and_then(|c| c.comment.as_ref())
    }

    pub fn set_comment(&self, aref: ARef, comment: Comment) -> Self {
        let mut next = self.clone();
        next.cells.entry(aref).or_default().comment = Some(comment);
        next
    }

    pub fn remove_comment(&self, aref: ARef) -> Self {
        let mut next = self.clone();
        if let Some(cell) = next.cells.get_mut(&aref) {
            cell.comment = None;
            if cell.is_blank() {
                next.cells.remove(&aref);
            }
        }
        next
    }

    /// All commented cells in row-major order.
    pub fn iter_comments(&self) -> impl Iterator<Item = (ARef, &Comment)> {
        self.cells
            .iter()
            .filter_map(|(a, c)| c.comment.as_ref().map(|cm| (*a, cm)))
    }

    // ----- hyperlinks / tables ----------------------------------------------

    pub fn hyperlink(&self, aref: ARef) -> Option<&str> {
        self.hyperlinks.get(&aref).map(|s| s.as_str())
    }

    pub fn set_hyperlink(&self, aref: ARef, target: &str) -> Self {
        let mut next = self.clone();
        next.hyperlinks.insert(aref, target.to_string());
        next
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{CellStyle, Font};
    use pretty_assertions::assert_eq;

    fn sheet() -> Sheet {
        Sheet::new(SheetName::new("Test").unwrap())
    }

    fn a(s: &str) -> ARef {
        ARef::parse(s).unwrap()
    }

    fn r(s: &str) -> CellRange {
        CellRange::parse(s).unwrap()
    }

    #[test]
    fn test_put_is_persistent() {
        let s0 = sheet();
        let s1 = s0.put(a("A1"), CellValue::Number(1.0));
        assert_eq!(s0.value(a("A1")), CellValue::Empty);
        assert_eq!(s1.value(a("A1")), CellValue::Number(1.0));
    }

    #[test]
    fn test_put_keeps_style_and_comment() {
        let s = sheet()
            .set_cell_style(a("A1"), &CellStyle::default())
            .set_comment(a("A1"), Comment::new("me", "note"))
            .put(a("A1"), CellValue::Text("x".to_string()));
        let cell = s.get(a("A1")).unwrap();
        assert!(cell.style.is_some());
        assert!(cell.comment.is_some());
        assert_eq!(cell.value, CellValue::Text("x".to_string()));
    }

    #[test]
    fn test_remove_range() {
        let s = sheet()
            .put(a("A1"), 1.0.into())
            .put(a("B2"), 2.0.into())
            .put(a("D4"), 3.0.into())
            .remove_range(r("A1:C3"));
        assert_eq!(s.cell_count(), 1);
        assert_eq!(s.value(a("D4")), CellValue::Number(3.0));
    }

    #[test]
    fn test_put_range_fills_row_major() {
        let values: Vec<CellValue> = (1..=4).map(|n| CellValue::Number(n as f64)).collect();
        let s = sheet().put_range(r("A1:B2"), &values).unwrap();
        assert_eq!(s.value(a("A1")), CellValue::Number(1.0));
        assert_eq!(s.value(a("B1")), CellValue::Number(2.0));
        assert_eq!(s.value(a("A2")), CellValue::Number(3.0));
        assert_eq!(s.value(a("B2")), CellValue::Number(4.0));
    }

    #[test]
    fn test_put_range_count_mismatch() {
        let err = sheet()
            .put_range(r("A1:B2"), &[CellValue::Number(1.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ValueCountMismatch {
                expected: 4,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_merge_overlap_rejected() {
        let s = sheet().merge(r("A1:B2")).unwrap();
        let err = s.merge(r("B2:C3")).unwrap_err();
        assert!(matches!(err, Error::MergeOverlap { .. }));
        // Receiver unchanged on failure.
        assert_eq!(s.merges().len(), 1);
    }

    #[test]
    fn test_merge_adjacent_ok() {
        let s = sheet()
            .merge(r("A1:B2"))
            .unwrap()
            .merge(r("C1:D2"))
            .unwrap();
        assert_eq!(s.merges().len(), 2);
    }

    #[test]
    fn test_merges_stay_sorted() {
        let s = sheet()
            .merge(r("D4:E5"))
            .unwrap()
            .merge(r("A1:B2"))
            .unwrap();
        assert_eq!(s.merges()[0].to_a1(), "A1:B2");
        assert_eq!(s.merges()[1].to_a1(), "D4:E5");
    }

    #[test]
    fn test_unmerge_exact_only() {
        let s = sheet().merge(r("A1:B2")).unwrap();
        assert_eq!(s.unmerge(r("A1:B3")).merges().len(), 1);
        assert_eq!(s.unmerge(r("A1:B2")).merges().len(), 0);
    }

    #[test]
    fn test_set_style_requires_live_id() {
        let s = sheet();
        assert!(s.set_style(a("A1"), StyleId(0)).is_ok());
        assert!(matches!(
            s.set_style(a("A1"), StyleId(7)),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_set_range_style_registers_once() {
        let bold = CellStyle {
            font: Font {
                bold: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let s = sheet().set_range_style(r("A1:C3"), &bold);
        assert_eq!(s.styles().len(), 2);
        let ids: Vec<_> = r("A1:C3")
            .iter()
            .map(|aref| s.get(aref).unwrap().style.unwrap())
            .collect();
        assert!(ids.iter().all(|&id| id == ids[0]));
    }

    #[test]
    fn test_clear_style_keeps_value() {
        let s = sheet()
            .put(a("A1"), 5.0.into())
            .set_cell_style(a("A1"), &CellStyle::default())
            .clear_style(a("A1"));
        let cell = s.get(a("A1")).unwrap();
        assert!(cell.style.is_none());
        assert_eq!(cell.value, CellValue::Number(5.0));
    }

    #[test]
    fn test_clear_style_drops_blank_cell() {
        let s = sheet()
            .set_cell_style(a("A1"), &CellStyle::default())
            .clear_style(a("A1"));
        assert!(s.get(a("A1")).is_none());
    }

    #[test]
    fn test_used_range() {
        assert!(sheet().used_range().is_none());
        let s = sheet()
            .put(a("B2"), 1.0.into())
            .put(a("D7"), 2.0.into())
            .put(a("C1"), 3.0.into());
        assert_eq!(s.used_range().unwrap().to_a1(), "B1:D7");
    }

    #[test]
    fn test_iter_cells_row_major() {
        let s = sheet()
            .put(a("B2"), 1.0.into())
            .put(a("A1"), 2.0.into())
            .put(a("B1"), 3.0.into());
        let order: Vec<String> = s.iter_cells().map(|(aref, _)| aref.to_a1()).collect();
        assert_eq!(order, ["A1", "B1", "B2"]);
    }

    #[test]
    fn test_comment_lifecycle() {
        let s = sheet().set_comment(a("C3"), Comment::new("alice", "why?"));
        assert_eq!(s.comment(a("C3")).unwrap().text, "why?");
        let s = s.remove_comment(a("C3"));
        assert!(s.comment(a("C3")).is_none());
        assert!(s.get(a("C3")).is_none());
    }

    #[test]
    fn test_row_col_props() {
        let s = sheet()
            .set_col_props(
                0,
                ColProps {
                    width: Some(18.0),
                    ..Default::default()
                },
            )
            .set_row_props(
                2,
                RowProps {
                    height: Some(30.0),
                    hidden: true,
                    ..Default::default()
                },
            );
        assert_eq!(s.col_props(0).unwrap().width, Some(18.0));
        assert!(s.row_props(2).unwrap().hidden);
        assert!(s.row_props(0).is_none());
    }
}
