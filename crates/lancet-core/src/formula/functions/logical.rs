//! Logical functions. `IF` and `IFERROR` receive unevaluated arguments,
//! so the untaken branch is never evaluated.

use crate::formula::ast::TExpr;
use crate::formula::eval::{to_bool, EvalResult, Evaluator};
use crate::formula::functions::need_args;
use crate::value::CellValue;

/// IF(condition, then, [else]); the else branch defaults to FALSE.
pub fn if_fn(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 3)?;
    let condition = ev.bool_arg(args, 0)?;
    if condition {
        ev.eval(&args[1])
    } else if args.len() == 3 {
        ev.eval(&args[2])
    } else {
        Ok(CellValue::Bool(false))
    }
}

/// AND(value1, ...): errors propagate, everything must coerce to bool.
pub fn and(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 255)?;
    let mut out = true;
    for value in ev.flatten_values(args)? {
        if let CellValue::Error(e) = value {
            return Err(e);
        }
        out &= to_bool(&value)?;
    }
    Ok(CellValue::Bool(out))
}

/// OR(value1, ...)
pub fn or(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 255)?;
    let mut out = false;
    for value in ev.flatten_values(args)? {
        if let CellValue::Error(e) = value {
            return Err(e);
        }
        out |= to_bool(&value)?;
    }
    Ok(CellValue::Bool(out))
}

/// NOT(value)
pub fn not(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    Ok(CellValue::Bool(!ev.bool_arg(args, 0)?))
}

/// TRUE()
pub fn true_fn(args: &[TExpr], _ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 0, 0)?;
    Ok(CellValue::Bool(true))
}

/// FALSE()
pub fn false_fn(args: &[TExpr], _ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 0, 0)?;
    Ok(CellValue::Bool(false))
}

/// IFERROR(value, fallback)
pub fn iferror(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 2)?;
    match ev.eval(&args[0]) {
        Ok(CellValue::Error(_)) | Err(_) => ev.eval(&args[1]),
        Ok(value) => Ok(value),
    }
}
