//! Math functions: SUM and its conditional variants, SUMPRODUCT, and the
//! scalar helpers (SQRT, MOD, POWER, LOG, LN, EXP, FLOOR, CEILING, TRUNC,
//! SIGN, INT, ROUND family, PI).

use crate::formula::ast::TExpr;
use crate::formula::eval::{strict_number, Criteria, EvalResult, Evaluator};
use crate::formula::functions::need_args;
use crate::value::{CellError, CellValue};

/// SUM(value1, ...)
pub fn sum(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 255)?;
    let nums = ev.collect_numbers(args)?;
    Ok(CellValue::Number(nums.iter().sum()))
}

/// SUMIF(range, criteria, [sum_range])
pub fn sumif(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 3)?;
    let test = ev.range_table(&args[0])?;
    let criteria = Criteria::parse(&ev.eval_arg(args, 1)?);
    let sums = if args.len() == 3 {
        ev.range_table(&args[2])?
    } else {
        test.clone()
    };
    let mut total = 0.0;
    for (ri, row) in test.iter().enumerate() {
        for (ci, value) in row.iter().enumerate() {
            if criteria.matches(value) {
                let source = sums.get(ri).and_then(|r| r.get(ci));
                if let Some(Ok(n)) = source.map(strict_number) {
                    total += n;
                }
            }
        }
    }
    Ok(CellValue::Number(total))
}

/// SUMIFS(sum_range, criteria_range1, criteria1, ...)
pub fn sumifs(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    if args.len() < 3 || args.len() % 2 == 0 {
        return Err(CellError::Value);
    }
    let sums = ev.range_table(&args[0])?;
    let pairs = collect_criteria_pairs(&args[1..], ev)?;
    let mut total = 0.0;
    for (ri, row) in sums.iter().enumerate() {
        for (ci, value) in row.iter().enumerate() {
            if matches_all(&pairs, ri, ci) {
                if let Ok(n) = strict_number(value) {
                    total += n;
                }
            }
        }
    }
    Ok(CellValue::Number(total))
}

pub(crate) type CriteriaPair = (Vec<Vec<CellValue>>, Criteria);

/// Evaluate alternating (range, criteria) arguments.
pub(crate) fn collect_criteria_pairs(
    args: &[TExpr],
    ev: &mut Evaluator,
) -> EvalResult<Vec<CriteriaPair>> {
    let mut pairs = Vec::with_capacity(args.len() / 2);
    for chunk in args.chunks(2) {
        let [range, criteria] = chunk else {
            return Err(CellError::Value);
        };
        let table = ev.range_table(range)?;
        let criteria = Criteria::parse(&ev.eval(criteria)?);
        pairs.push((table, criteria));
    }
    Ok(pairs)
}

pub(crate) fn matches_all(pairs: &[CriteriaPair], ri: usize, ci: usize) -> bool {
    pairs.iter().all(|(table, criteria)| {
        let value = table
            .get(ri)
            .and_then(|row| row.get(ci))
            .cloned()
            .unwrap_or(CellValue::Empty);
        criteria.matches(&value)
    })
}

/// SUMPRODUCT(range1, [range2], ...)
pub fn sumproduct(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 255)?;
    let tables: Vec<_> = args
        .iter()
        .map(|a| ev.range_table(a))
        .collect::<EvalResult<_>>()?;
    let first = &tables[0];
    for t in &tables[1..] {
        if t.len() != first.len()
            || t.first().map(|r| r.len()) != first.first().map(|r| r.len())
        {
            return Err(CellError::Value);
        }
    }
    let mut total = 0.0;
    for ri in 0..first.len() {
        for ci in 0..first[ri].len() {
            let mut product = 1.0;
            for table in &tables {
                product *= strict_number(&table[ri][ci]).unwrap_or(0.0);
            }
            total += product;
        }
    }
    Ok(CellValue::Number(total))
}

// ----- scalar helpers -------------------------------------------------------

pub fn abs(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    Ok(CellValue::Number(ev.number_arg(args, 0)?.abs()))
}

pub fn sqrt(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    let n = ev.number_arg(args, 0)?;
    if n < 0.0 {
        return Err(CellError::Num);
    }
    Ok(CellValue::Number(n.sqrt()))
}

/// MOD(n, d) with Excel sign semantics: the result has the divisor's sign.
pub fn modulo(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 2)?;
    let n = ev.number_arg(args, 0)?;
    let d = ev.number_arg(args, 1)?;
    if d == 0.0 {
        return Err(CellError::Div0);
    }
    Ok(CellValue::Number(n - d * (n / d).floor()))
}

pub fn power(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 2)?;
    let base = ev.number_arg(args, 0)?;
    let exp = ev.number_arg(args, 1)?;
    Ok(CellValue::Number(base.powf(exp)))
}

/// LOG(n, [base]); base defaults to 10.
pub fn log(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 2)?;
    let n = ev.number_arg(args, 0)?;
    let base = ev.opt_number_arg(args, 1, 10.0)?;
    if n <= 0.0 || base <= 0.0 || base == 1.0 {
        return Err(CellError::Num);
    }
    Ok(CellValue::Number(n.log(base)))
}

pub fn log10(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    let n = ev.number_arg(args, 0)?;
    if n <= 0.0 {
        return Err(CellError::Num);
    }
    Ok(CellValue::Number(n.log10()))
}

pub fn ln(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    let n = ev.number_arg(args, 0)?;
    if n <= 0.0 {
        return Err(CellError::Num);
    }
    Ok(CellValue::Number(n.ln()))
}

pub fn exp(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    Ok(CellValue::Number(ev.number_arg(args, 0)?.exp()))
}

/// FLOOR(n, significance)
pub fn floor(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 2)?;
    let n = ev.number_arg(args, 0)?;
    let sig = ev.opt_number_arg(args, 1, 1.0)?;
    round_to_multiple(n, sig, f64::floor)
}

/// CEILING(n, significance)
pub fn ceiling(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 2)?;
    let n = ev.number_arg(args, 0)?;
    let sig = ev.opt_number_arg(args, 1, 1.0)?;
    round_to_multiple(n, sig, f64::ceil)
}

fn round_to_multiple(n: f64, sig: f64, dir: fn(f64) -> f64) -> EvalResult<CellValue> {
    if sig == 0.0 {
        return Ok(CellValue::Number(0.0));
    }
    if n > 0.0 && sig < 0.0 {
        return Err(CellError::Num);
    }
    Ok(CellValue::Number(dir(n / sig) * sig))
}

/// TRUNC(n, [digits])
pub fn trunc(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 2)?;
    let n = ev.number_arg(args, 0)?;
    let digits = ev.opt_number_arg(args, 1, 0.0)? as i32;
    let factor = 10f64.powi(digits);
    Ok(CellValue::Number((n * factor).trunc() / factor))
}

pub fn sign(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    let n = ev.number_arg(args, 0)?;
    Ok(CellValue::Number(if n > 0.0 {
        1.0
    } else if n < 0.0 {
        -1.0
    } else {
        0.0
    }))
}

/// INT rounds down toward negative infinity.
pub fn int(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    Ok(CellValue::Number(ev.number_arg(args, 0)?.floor()))
}

/// ROUND(n, digits) -- round half away from zero, as Excel does.
pub fn round(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 2)?;
    let n = ev.number_arg(args, 0)?;
    let digits = ev.number_arg(args, 1)? as i32;
    let factor = 10f64.powi(digits);
    Ok(CellValue::Number((n * factor).round() / factor))
}

pub fn roundup(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 2)?;
    let n = ev.number_arg(args, 0)?;
    let digits = ev.number_arg(args, 1)? as i32;
    let factor = 10f64.powi(digits);
    let scaled = n * factor;
    let out = if scaled >= 0.0 {
        scaled.ceil()
    } else {
        scaled.floor()
    };
    Ok(CellValue::Number(out / factor))
}

pub fn rounddown(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 2)?;
    let n = ev.number_arg(args, 0)?;
    let digits = ev.number_arg(args, 1)? as i32;
    let factor = 10f64.powi(digits);
    Ok(CellValue::Number((n * factor).trunc() / factor))
}

pub fn pi(args: &[TExpr], _ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 0, 0)?;
    Ok(CellValue::Number(std::f64::consts::PI))
}

// =========================================================================
// Tests
// =========================================================================
