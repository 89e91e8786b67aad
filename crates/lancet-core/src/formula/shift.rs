//! Anchor-aware formula shifting (fill/drag semantics).
//!
//! Relative endpoints translate by the delta, absolute endpoints stay put,
//! and mixed anchors shift only on their free axis. Negative deltas
//! saturate at the top-left of the grid; a reference pushed past `XFD` or
//! row 1048576 collapses to a `#REF!` literal, as Excel does on a drag
//! off the edge.

use crate::addr::{ARef, Anchor, CellRange, Column, Row, MAX_COLUMN, MAX_ROW};
use crate::error::Result;
use crate::formula::ast::{CellRefExpr, RangeRefExpr, TExpr};
use crate::formula::{parser, printer};
use crate::value::CellError;

/// Shift every relative reference in the expression by `(d_col, d_row)`.
pub fn shift(expr: &TExpr, d_col: i64, d_row: i64) -> TExpr {
    match expr {
        TExpr::CellRef(r) => shift_cell_ref(r, d_col, d_row),
        TExpr::RangeRef(r) => shift_range_ref(r, d_col, d_row),
        TExpr::Unary { op, expr } => TExpr::Unary {
            op: *op,
            expr: Box::new(shift(expr, d_col, d_row)),
        },
        TExpr::Binary { op, lhs, rhs } => TExpr::Binary {
            op: *op,
            lhs: Box::new(shift(lhs, d_col, d_row)),
            rhs: Box::new(shift(rhs, d_col, d_row)),
        },
        TExpr::Func { name, args } => TExpr::Func {
            name: name.clone(),
            args: args.iter().map(|a| shift(a, d_col, d_row)).collect(),
        },
        TExpr::Paren(inner) => TExpr::Paren(Box::new(shift(inner, d_col, d_row))),
        leaf => leaf.clone(),
    }
}

/// Parse, shift, and print a formula string in one step.
pub fn shift_formula(text: &str, d_col: i64, d_row: i64) -> Result<String> {
    let ast = parser::parse(text)?;
    Ok(printer::print(&shift(&ast, d_col, d_row)))
}

fn shift_cell_ref(r: &CellRefExpr, d_col: i64, d_row: i64) -> TExpr {
    match shift_endpoint(r.aref, r.anchor, d_col, d_row) {
        Some(aref) => TExpr::CellRef(CellRefExpr {
            sheet: r.sheet.clone(),
            aref,
            anchor: r.anchor,
        }),
        None => TExpr::Err(CellError::Ref),
    }
}

fn shift_range_ref(r: &RangeRefExpr, d_col: i64, d_row: i64) -> TExpr {
    let start = shift_endpoint(r.range.start, r.range.start_anchor, d_col, d_row);
    let end = shift_endpoint(r.range.end, r.range.end_anchor, d_col, d_row);
    match (start, end) {
        (Some(start), Some(end)) => TExpr::RangeRef(RangeRefExpr {
            sheet: r.sheet.clone(),
            range: CellRange::with_anchors(start, end, r.range.start_anchor, r.range.end_anchor),
        }),
        _ => TExpr::Err(CellError::Ref),
    }
}

/// Shift one endpoint. `None` means the endpoint left the grid on the
/// high side; negative overshoot clamps to 0.
fn shift_endpoint(aref: ARef, anchor: Anchor, d_col: i64, d_row: i64) -> Option<ARef> {
    let col = if anchor.abs_col() {
        aref.col
    } else {
        let shifted = (aref.col.index() as i64 + d_col).max(0);
        if shifted > MAX_COLUMN as i64 {
            return None;
        }
        Column::new(shifted as u32).ok()?
    };
    let row = if anchor.abs_row() {
        aref.row
    } else {
        let shifted = (aref.row.index() as i64 + d_row).max(0);
        if shifted > MAX_ROW as i64 {
            return None;
        }
        Row::new(shifted as u32).ok()?
    };
    Some(ARef::new(col, row))
}

// =========================================================================
// Tests
// =========================================================================
