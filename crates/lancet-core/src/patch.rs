//! The patch algebra: every atomic sheet mutation as a value.
//!
//! Patches form a monoid under [`Patch::combine`] with [`Patch::Empty`] as
//! the identity and [`Patch::Batch`] as ordered composition. The monoid is
//! not commutative: `Put` then `SetStyle` differs from the reverse when
//! the target cell does not yet exist.

use crate::addr::{ARef, CellRange};
use crate::error::Result;
use crate::sheet::{ColProps, Comment, RowProps, Sheet};
use crate::style::{CellStyle, StyleId};
use crate::value::CellValue;

/// One atomic (or batched) sheet mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch {
    /// The identity patch.
    #[default]
    Empty,
    /// Write a single cell value.
    Put(ARef, CellValue),
    /// Delete a single cell.
    Remove(ARef),
    /// Delete all cells in a range.
    RemoveRange(CellRange),
    /// Add a merged range.
    Merge(CellRange),
    /// Remove a merged range.
    Unmerge(CellRange),
    /// Assign an existing style id.
    SetStyle(ARef, StyleId),
    /// Register a style and assign it.
    SetCellStyle(ARef, CellStyle),
    /// Register once, assign to every cell in the range.
    SetRangeStyle(CellRange, CellStyle),
    /// Drop the style id; the cell keeps its value.
    ClearStyle(ARef),
    /// Replace a row's properties (0-based row index).
    SetRowProperties(u32, RowProps),
    /// Replace a column's properties (0-based column index).
    SetColumnProperties(u32, ColProps),
    /// Attach a comment.
    SetComment(ARef, Comment),
    /// Remove a comment.
    RemoveComment(ARef),
    /// Ordered sequence of patches.
    Batch(Vec<Patch>),
}

impl Patch {
    /// Convenience constructor for [`Patch::Put`].
    pub fn put(aref: ARef, value: impl Into<CellValue>) -> Self {
        Patch::Put(aref, value.into())
    }

    /// Monoid composition. `Empty` is the identity; batches flatten one
    /// level so that `Batch(a) ++ Batch(b) = Batch(a ++ b)`.
    pub fn combine(self, other: Patch) -> Patch {
        match (self, other) {
            (Patch::Empty, p) | (p, Patch::Empty) => p,
            (Patch::Batch(mut a), Patch::Batch(b)) => {
                a.extend(b);
                Patch::Batch(a)
            }
            (Patch::Batch(mut a), p) => {
                a.push(p);
                Patch::Batch(a)
            }
            (p, Patch::Batch(b)) => {
                let mut v = Vec::with_capacity(b.len() + 1);
                v.push(p);
                v.extend(b);
                Patch::Batch(v)
            }
            (a, b) => Patch::Batch(vec![a, b]),
        }
    }

    /// Apply to a sheet, producing a new sheet. Batches execute
    /// left-to-right; the first failing step aborts and the original sheet
    /// is unaffected (the partial result is dropped).
    pub fn apply(&self, sheet: &Sheet) -> Result<Sheet> {
        match self {
            Patch::Empty => Ok(sheet.clone()),
            Patch::Put(aref, value) => Ok(sheet.put(*aref, value.clone())),
            Patch::Remove(aref) => Ok(sheet.remove(*aref)),
            Patch::RemoveRange(range) => Ok(sheet.remove_range(*range)),
            Patch::Merge(range) => sheet.merge(*range),
            Patch::Unmerge(range) => Ok(sheet.unmerge(*range)),
            Patch::SetStyle(aref, id) => sheet.set_style(*aref, *id),
            Patch::SetCellStyle(aref, style) => Ok(sheet.set_cell_style(*aref, style)),
            Patch::SetRangeStyle(range, style) => Ok(sheet.set_range_style(*range, style)),
            Patch::ClearStyle(aref) => Ok(sheet.clear_style(*aref)),
            Patch::SetRowProperties(row, props) => Ok(sheet.set_row_props(*row, props.clone())),
            Patch::SetColumnProperties(col, props) => Ok(sheet.set_col_props(*col, props.clone())),
            Patch::SetComment(aref, comment) => Ok(sheet.set_comment(*aref, comment.clone())),
            Patch::RemoveComment(aref) => Ok(sheet.remove_comment(*aref)),
            Patch::Batch(patches) => {
                let mut current = sheet.clone();
                for patch in patches {
                    current = patch.apply(&current)?;
                }
                Ok(current)
            }
        }
    }

    /// True for patches that cannot change a sheet.
    pub fn is_empty(&self) -> bool {
        match self {
            Patch::Empty => true,
            Patch::Batch(ps) => ps.iter().all(Patch::is_empty),
            _ => false,
        }
    }
}

/// `p1 + p2` is `p1.combine(p2)`.
impl std::ops::Add for Patch {
    type Output = Patch;

    fn add(self, rhs: Patch) -> Patch {
        self.combine(rhs)
    }
}

impl FromIterator<Patch> for Patch {
    fn from_iter<I: IntoIterator<Item = Patch>>(iter: I) -> Self {
        iter.into_iter().fold(Patch::Empty, Patch::combine)
    }
}

// =========================================================================
// Tests
// =========================================================================
