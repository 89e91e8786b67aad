//! Lookup and reference functions.

use std::cmp::Ordering;

use crate::addr::{ARef, Column, Row};
use crate::formula::ast::TExpr;
use crate::formula::eval::{compare_values, EvalResult, Evaluator};
use crate::formula::functions::need_args;
use crate::value::{CellError, CellValue};

fn same_family(a: &CellValue, b: &CellValue) -> bool {
    matches!(
        (a, b),
        (
            CellValue::Number(_) | CellValue::DateTime(_),
            CellValue::Number(_) | CellValue::DateTime(_)
        ) | (CellValue::Text(_) | CellValue::Rich(_), CellValue::Text(_) | CellValue::Rich(_))
            | (CellValue::Bool(_), CellValue::Bool(_))
    )
}

fn values_equal(a: &CellValue, b: &CellValue) -> bool {
    same_family(a, b) && compare_values(a, b) == Ordering::Equal
}

/// VLOOKUP(lookup, table, col_index, [approximate=TRUE])
pub fn vlookup(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 3, 4)?;
    let needle = ev.eval_arg(args, 0)?;
    let table = ev.range_table(&args[1])?;
    let col_index = ev.number_arg(args, 2)? as usize;
    let approximate = if args.len() == 4 {
        ev.bool_arg(args, 3)?
    } else {
        true
    };
    if col_index == 0 {
        return Err(CellError::Value);
    }
    let row = find_row(&table, &needle, approximate)?;
    table
        .get(row)
        .and_then(|r| r.get(col_index - 1))
        .cloned()
        .ok_or(CellError::Ref)
}

/// HLOOKUP(lookup, table, row_index, [approximate=TRUE])
pub fn hlookup(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 3, 4)?;
    let needle = ev.eval_arg(args, 0)?;
    let table = ev.range_table(&args[1])?;
    let row_index = ev.number_arg(args, 2)? as usize;
    let approximate = if args.len() == 4 {
        ev.bool_arg(args, 3)?
    } else {
        true
    };
    if row_index == 0 {
        return Err(CellError::Value);
    }
    let transposed = transpose(&table);
    let col = find_row(&transposed, &needle, approximate)?;
    transposed
        .get(col)
        .and_then(|r| r.get(row_index - 1))
        .cloned()
        .ok_or(CellError::Ref)
}

fn transpose(table: &[Vec<CellValue>]) -> Vec<Vec<CellValue>> {
    let cols = table.first().map(|r| r.len()).unwrap_or(0);
    (0..cols)
        .map(|c| table.iter().map(|row| row[c].clone()).collect())
        .collect()
}

/// Search the first column. Exact mode scans; approximate mode assumes an
/// ascending first column and takes the last value <= the needle.
fn find_row(table: &[Vec<CellValue>], needle: &CellValue, approximate: bool) -> EvalResult<usize> {
    if approximate {
        let mut best: Option<usize> = None;
        for (i, row) in table.iter().enumerate() {
            let Some(key) = row.first() else { continue };
            if !same_family(key, needle) {
                continue;
            }
            match compare_values(key, needle) {
                Ordering::Less | Ordering::Equal => best = Some(i),
                Ordering::Greater => break,
            }
        }
        best.ok_or(CellError::NA)
    } else {
        table
            .iter()
            .position(|row| row.first().is_some_and(|key| values_equal(key, needle)))
            .ok_or(CellError::NA)
    }
}

/// XLOOKUP(lookup, lookup_array, return_array, [if_not_found]).
/// Exact match only; the match-mode and search-mode extensions are not
/// modelled.
pub fn xlookup(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 3, 4)?;
    let needle = ev.eval_arg(args, 0)?;
    let lookup = flatten_table(ev.range_table(&args[1])?);
    let returns = flatten_table(ev.range_table(&args[2])?);
    if lookup.len() != returns.len() {
        return Err(CellError::Value);
    }
    match lookup.iter().position(|v| values_equal(v, &needle)) {
        Some(i) => Ok(returns[i].clone()),
        None if args.len() == 4 => ev.eval(&args[3]),
        None => Err(CellError::NA),
    }
}

fn flatten_table(table: Vec<Vec<CellValue>>) -> Vec<CellValue> {
    table.into_iter().flatten().collect()
}

/// ROW(reference) -- 1-based row of the reference.
pub fn row(args: &[TExpr], _ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    match &args[0] {
        TExpr::CellRef(r) => Ok(CellValue::Number(r.aref.row.number() as f64)),
        TExpr::RangeRef(r) => Ok(CellValue::Number(r.range.start.row.number() as f64)),
        _ => Err(CellError::Value),
    }
}

/// COLUMN(reference) -- 1-based column of the reference.
pub fn column(args: &[TExpr], _ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    match &args[0] {
        TExpr::CellRef(r) => Ok(CellValue::Number(r.aref.col.number() as f64)),
        TExpr::RangeRef(r) => Ok(CellValue::Number(r.range.start.col.number() as f64)),
        _ => Err(CellError::Value),
    }
}

/// ADDRESS(row, col, [abs_num=1]) -- abs_num: 1 absolute, 2 row absolute,
/// 3 column absolute, 4 relative.
pub fn address(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 3)?;
    let row_number = ev.number_arg(args, 0)?;
    let col_number = ev.number_arg(args, 1)?;
    let abs_num = ev.opt_number_arg(args, 2, 1.0)? as u32;
    if row_number < 1.0 || col_number < 1.0 {
        return Err(CellError::Value);
    }
    let row = Row::from_number(row_number as u32).map_err(|_| CellError::Value)?;
    let col = Column::new(col_number as u32 - 1).map_err(|_| CellError::Value)?;
    let (abs_col, abs_row) = match abs_num {
        1 => (true, true),
        2 => (false, true),
        3 => (true, false),
        4 => (false, false),
        _ => return Err(CellError::Value),
    };
    let aref = ARef::new(col, row);
    Ok(CellValue::Text(aref.to_a1_anchored(
        crate::addr::Anchor::from_flags(abs_col, abs_row),
    )))
}

// =========================================================================
// Tests
// =========================================================================
