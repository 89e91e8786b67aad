//! Statistical functions: COUNT/COUNTA and conditional counts, AVERAGE,
//! MIN/MAX, MEDIAN, and the variance/deviation family with population
//! variants.

use crate::formula::ast::TExpr;
use crate::formula::eval::{strict_number, Criteria, EvalResult, Evaluator};
use crate::formula::functions::math::{collect_criteria_pairs, matches_all};
use crate::formula::functions::need_args;
use crate::value::{CellError, CellValue};

/// COUNT: numbers only.
pub fn count(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 255)?;
    let values = ev.flatten_values(args)?;
    let n = values.iter().filter(|v| strict_number(v).is_ok()).count();
    Ok(CellValue::Number(n as f64))
}

/// COUNTA: anything non-empty.
pub fn counta(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 255)?;
    let values = ev.flatten_values(args)?;
    let n = values.iter().filter(|v| !v.is_empty()).count();
    Ok(CellValue::Number(n as f64))
}

/// COUNTIF(range, criteria)
pub fn countif(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 2)?;
    let table = ev.range_table(&args[0])?;
    let criteria = Criteria::parse(&ev.eval_arg(args, 1)?);
    let n = table
        .iter()
        .flatten()
        .filter(|v| criteria.matches(v))
        .count();
    Ok(CellValue::Number(n as f64))
}

/// COUNTIFS(criteria_range1, criteria1, ...)
pub fn countifs(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    if args.len() < 2 || args.len() % 2 != 0 {
        return Err(CellError::Value);
    }
    let pairs = collect_criteria_pairs(args, ev)?;
    let (rows, cols) = pairs
        .first()
        .map(|(t, _)| (t.len(), t.first().map(|r| r.len()).unwrap_or(0)))
        .unwrap_or((0, 0));
    let mut n = 0u64;
    for ri in 0..rows {
        for ci in 0..cols {
            if matches_all(&pairs, ri, ci) {
                n += 1;
            }
        }
    }
    Ok(CellValue::Number(n as f64))
}

/// AVERAGE(value1, ...)
pub fn average(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 255)?;
    let nums = ev.collect_numbers(args)?;
    if nums.is_empty() {
        return Err(CellError::Div0);
    }
    Ok(CellValue::Number(nums.iter().sum::<f64>() / nums.len() as f64))
}

/// AVERAGEIF(range, criteria, [average_range])
pub fn averageif(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 3)?;
    let test = ev.range_table(&args[0])?;
    let criteria = Criteria::parse(&ev.eval_arg(args, 1)?);
    let source = if args.len() == 3 {
        ev.range_table(&args[2])?
    } else {
        test.clone()
    };
    let mut sum = 0.0;
    let mut n = 0u64;
    for (ri, row) in test.iter().enumerate() {
        for (ci, value) in row.iter().enumerate() {
            if criteria.matches(value) {
                if let Some(Ok(v)) = source.get(ri).and_then(|r| r.get(ci)).map(strict_number) {
                    sum += v;
                    n += 1;
                }
            }
        }
    }
    if n == 0 {
        return Err(CellError::Div0);
    }
    Ok(CellValue::Number(sum / n as f64))
}

/// MIN(value1, ...) -- 0 when no numbers, as Excel does.
pub fn min(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 255)?;
    let nums = ev.collect_numbers(args)?;
    if nums.is_empty() {
        return Ok(CellValue::Number(0.0));
    }
    Ok(CellValue::Number(
        nums.iter().copied().fold(f64::INFINITY, f64::min),
    ))
}

/// MAX(value1, ...) -- 0 when no numbers, as Excel does.
pub fn max(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 255)?;
    let nums = ev.collect_numbers(args)?;
    if nums.is_empty() {
        return Ok(CellValue::Number(0.0));
    }
    Ok(CellValue::Number(
        nums.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    ))
}

/// MEDIAN(value1, ...)
pub fn median(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 255)?;
    let mut nums = ev.collect_numbers(args)?;
    if nums.is_empty() {
        return Err(CellError::Num);
    }
    nums.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = nums.len() / 2;
    let out = if nums.len() % 2 == 1 {
        nums[mid]
    } else {
        (nums[mid - 1] + nums[mid]) / 2.0
    };
    Ok(CellValue::Number(out))
}

fn variance(nums: &[f64], population: bool) -> EvalResult<f64> {
    let denom = if population {
        nums.len()
    } else {
        nums.len().saturating_sub(1)
    };
    if denom == 0 {
        return Err(CellError::Div0);
    }
    let mean = nums.iter().sum::<f64>() / nums.len() as f64;
    let ss: f64 = nums.iter().map(|x| (x - mean) * (x - mean)).sum();
    Ok(ss / denom as f64)
}

/// VAR: sample variance.
pub fn var(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 255)?;
    let nums = ev.collect_numbers(args)?;
    Ok(CellValue::Number(variance(&nums, false)?))
}

/// VARP: population variance.
pub fn varp(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 255)?;
    let nums = ev.collect_numbers(args)?;
    Ok(CellValue::Number(variance(&nums, true)?))
}

/// STDEV: sample standard deviation.
pub fn stdev(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 255)?;
    let nums = ev.collect_numbers(args)?;
    Ok(CellValue::Number(variance(&nums, false)?.sqrt()))
}

/// STDEVP: population standard deviation.
pub fn stdevp(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 255)?;
    let nums = ev.collect_numbers(args)?;
    Ok(CellValue::Number(variance(&nums, true)?.sqrt()))
}

// =========================================================================
// Tests
// =========================================================================
