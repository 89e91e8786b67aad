//! Financial functions: NPV/IRR, the annuity family (PMT, FV, PV, RATE,
//! NPER), and the dated variants XNPV/XIRR.
//!
//! Iterative solvers (IRR, RATE, XIRR) use Newton's method with a 1e-10
//! tolerance and at most 100 iterations; non-convergence is `#NUM!`.

use crate::formula::ast::TExpr;
use crate::formula::eval::{strict_number, EvalResult, Evaluator};
use crate::formula::functions::need_args;
use crate::value::{CellError, CellValue};

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 100;

/// Newton's method over `f`, with a numeric derivative.
fn newton(f: impl Fn(f64) -> f64, guess: f64) -> Option<f64> {
    let mut x = guess;
    for _ in 0..MAX_ITERATIONS {
        let fx = f(x);
        if fx.abs() < TOLERANCE {
            return Some(x);
        }
        let h = (x.abs() * 1e-7).max(1e-7);
        let derivative = (f(x + h) - f(x - h)) / (2.0 * h);
        if derivative == 0.0 || !derivative.is_finite() {
            return None;
        }
        let next = x - fx / derivative;
        if !next.is_finite() {
            return None;
        }
        if (next - x).abs() < TOLERANCE {
            return Some(next);
        }
        x = next;
    }
    None
}

/// NPV(rate, value1, ...) -- first cash flow discounted one period.
pub fn npv(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 255)?;
    let rate = ev.number_arg(args, 0)?;
    let values = ev.collect_numbers(&args[1..])?;
    if rate <= -1.0 {
        return Err(CellError::Num);
    }
    let npv = values
        .iter()
        .enumerate()
        .map(|(i, v)| v / (1.0 + rate).powi(i as i32 + 1))
        .sum();
    Ok(CellValue::Number(npv))
}

/// IRR(values, [guess])
pub fn irr(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 2)?;
    let values = ev.collect_numbers(&args[0..1])?;
    let guess = ev.opt_number_arg(args, 1, 0.1)?;
    if !values.iter().any(|v| *v > 0.0) || !values.iter().any(|v| *v < 0.0) {
        return Err(CellError::Num);
    }
    let f = |rate: f64| -> f64 {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| v / (1.0 + rate).powi(i as i32))
            .sum()
    };
    match newton(f, guess) {
        Some(rate) if rate > -1.0 => Ok(CellValue::Number(rate)),
        _ => Err(CellError::Num),
    }
}

/// XNPV(rate, values, dates)
pub fn xnpv(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 3, 3)?;
    let rate = ev.number_arg(args, 0)?;
    let (values, dates) = cashflow_series(args, ev)?;
    if rate <= -1.0 {
        return Err(CellError::Num);
    }
    Ok(CellValue::Number(xnpv_at(rate, &values, &dates)))
}

/// XIRR(values, dates, [guess])
pub fn xirr(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 3)?;
    let values = table_numbers(&args[0], ev)?;
    let dates = table_numbers(&args[1], ev)?;
    if values.len() != dates.len() || values.is_empty() {
        return Err(CellError::Num);
    }
    if !values.iter().any(|v| *v > 0.0) || !values.iter().any(|v| *v < 0.0) {
        return Err(CellError::Num);
    }
    let guess = ev.opt_number_arg(args, 2, 0.1)?;
    match newton(|rate| xnpv_at(rate, &values, &dates), guess) {
        Some(rate) if rate > -1.0 => Ok(CellValue::Number(rate)),
        _ => Err(CellError::Num),
    }
}

fn cashflow_series(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<(Vec<f64>, Vec<f64>)> {
    let values = table_numbers(&args[1], ev)?;
    let dates = table_numbers(&args[2], ev)?;
    if values.len() != dates.len() || values.is_empty() {
        return Err(CellError::Num);
    }
    Ok((values, dates))
}

fn table_numbers(arg: &TExpr, ev: &mut Evaluator) -> EvalResult<Vec<f64>> {
    let table = ev.range_table(arg)?;
    Ok(table
        .into_iter()
        .flatten()
        .filter_map(|v| strict_number(&v).ok())
        .collect())
}

fn xnpv_at(rate: f64, values: &[f64], dates: &[f64]) -> f64 {
    let t0 = dates[0];
    values
        .iter()
        .zip(dates)
        .map(|(v, d)| v / (1.0 + rate).powf((d - t0) / 365.0))
        .sum()
}

/// PMT(rate, nper, pv, [fv], [type])
pub fn pmt(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 3, 5)?;
    let rate = ev.number_arg(args, 0)?;
    let nper = ev.number_arg(args, 1)?;
    let pv = ev.number_arg(args, 2)?;
    let fv = ev.opt_number_arg(args, 3, 0.0)?;
    let due = ev.opt_number_arg(args, 4, 0.0)? != 0.0;
    if nper == 0.0 {
        return Err(CellError::Num);
    }
    Ok(CellValue::Number(calc_pmt(rate, nper, pv, fv, due)))
}

fn calc_pmt(rate: f64, nper: f64, pv: f64, fv: f64, due: bool) -> f64 {
    if rate == 0.0 {
        return -(pv + fv) / nper;
    }
    let growth = (1.0 + rate).powf(nper);
    let mut pmt = -(pv * growth + fv) * rate / (growth - 1.0);
    if due {
        pmt /= 1.0 + rate;
    }
    pmt
}

/// FV(rate, nper, pmt, [pv], [type])
pub fn fv(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 3, 5)?;
    let rate = ev.number_arg(args, 0)?;
    let nper = ev.number_arg(args, 1)?;
    let pmt = ev.number_arg(args, 2)?;
    let pv = ev.opt_number_arg(args, 3, 0.0)?;
    let due = ev.opt_number_arg(args, 4, 0.0)? != 0.0;
    Ok(CellValue::Number(calc_fv(rate, nper, pmt, pv, due)))
}

fn calc_fv(rate: f64, nper: f64, pmt: f64, pv: f64, due: bool) -> f64 {
    if rate == 0.0 {
        return -(pv + pmt * nper);
    }
    let growth = (1.0 + rate).powf(nper);
    let factor = if due { 1.0 + rate } else { 1.0 };
    -(pv * growth + pmt * factor * (growth - 1.0) / rate)
}

/// PV(rate, nper, pmt, [fv], [type])
pub fn pv(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 3, 5)?;
    let rate = ev.number_arg(args, 0)?;
    let nper = ev.number_arg(args, 1)?;
    let pmt = ev.number_arg(args, 2)?;
    let fv = ev.opt_number_arg(args, 3, 0.0)?;
    let due = ev.opt_number_arg(args, 4, 0.0)? != 0.0;
    if rate == 0.0 {
        return Ok(CellValue::Number(-(fv + pmt * nper)));
    }
    let growth = (1.0 + rate).powf(nper);
    let factor = if due { 1.0 + rate } else { 1.0 };
    let pv = -(fv + pmt * factor * (growth - 1.0) / rate) / growth;
    Ok(CellValue::Number(pv))
}

/// RATE(nper, pmt, pv, [fv], [type], [guess])
pub fn rate(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 3, 6)?;
    let nper = ev.number_arg(args, 0)?;
    let pmt = ev.number_arg(args, 1)?;
    let pv = ev.number_arg(args, 2)?;
    let fv = ev.opt_number_arg(args, 3, 0.0)?;
    let due = ev.opt_number_arg(args, 4, 0.0)? != 0.0;
    let guess = ev.opt_number_arg(args, 5, 0.1)?;
    let f = |rate: f64| -> f64 {
        if rate == 0.0 {
            return pv + pmt * nper + fv;
        }
        let growth = (1.0 + rate).powf(nper);
        let factor = if due { 1.0 + rate } else { 1.0 };
        pv * growth + pmt * factor * (growth - 1.0) / rate + fv
    };
    match newton(f, guess) {
        Some(rate) if rate > -1.0 => Ok(CellValue::Number(rate)),
        _ => Err(CellError::Num),
    }
}

/// NPER(rate, pmt, pv, [fv], [type])
pub fn nper(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 3, 5)?;
    let rate = ev.number_arg(args, 0)?;
    let pmt = ev.number_arg(args, 1)?;
    let pv = ev.number_arg(args, 2)?;
    let fv = ev.opt_number_arg(args, 3, 0.0)?;
    let due = ev.opt_number_arg(args, 4, 0.0)? != 0.0;
    if rate == 0.0 {
        if pmt == 0.0 {
            return Err(CellError::Num);
        }
        return Ok(CellValue::Number(-(pv + fv) / pmt));
    }
    let factor = if due { 1.0 + rate } else { 1.0 };
    let z = pmt * factor / rate;
    let numerator = z - fv;
    let denominator = pv + z;
    if denominator == 0.0 || numerator / denominator <= 0.0 {
        return Err(CellError::Num);
    }
    Ok(CellValue::Number(
        (numerator / denominator).ln() / (1.0 + rate).ln(),
    ))
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use crate::addr::{ARef, SheetName};
    use crate::formula::eval::{evaluate, SheetProvider};
    use crate::formula::parser::parse;
    use crate::sheet::Sheet;
    use crate::value::{CellError, CellValue};

    fn a(s: &str) -> ARef {
        ARef::parse(s).unwrap()
    }

    fn cashflow_sheet() -> Sheet {
        let mut sheet = Sheet::new(SheetName::new("S").unwrap());
        for (cell, v) in [
            ("A1", -10_000.0),
            ("A2", 3_000.0),
            ("A3", 4_200.0),
            ("A4", 6_800.0),
        ] {
            sheet = sheet.put(a(cell), CellValue::Number(v));
        }
        // Dates one year apart for XNPV/XIRR.
        for (cell, v) in [
            ("B1", 43_831.0),
            ("B2", 44_197.0),
            ("B3", 44_562.0),
            ("B4", 44_927.0),
        ] {
            sheet = sheet.put(a(cell), CellValue::Number(v));
        }
        sheet
    }

    fn eval_on(sheet: &Sheet, formula: &str) -> CellValue {
        evaluate(&parse(formula).unwrap(), &SheetProvider { sheet })
    }

    fn num(sheet: &Sheet, formula: &str) -> f64 {
        match eval_on(sheet, formula) {
            CellValue::Number(n) => n,
            other => panic!("{formula} -> {other:?}"),
        }
    }

    #[test]
    fn test_npv_reference_value() {
        let s = cashflow_sheet();
        // Excel: NPV(10%, 3000, 4200, 6800) = 11188.4434...
        let got = num(&s, "NPV(0.1,A2:A4)");
        assert!((got - 11_188.443_412).abs() < 1e-4, "got {got}");
    }

    #[test]
    fn test_irr_zeroes_the_npv() {
        let s = cashflow_sheet();
        let rate = num(&s, "IRR(A1:A4)");
        let check: f64 = [-10_000.0, 3_000.0, 4_200.0, 6_800.0]
            .iter()
            .enumerate()
            .map(|(i, v)| v / (1.0f64 + rate).powi(i as i32))
            .sum();
        assert!(check.abs() < 1e-6, "npv at irr = {check}");
    }

    #[test]
    fn test_irr_requires_sign_change() {
        let s = cashflow_sheet();
        assert_eq!(
            eval_on(&s, "IRR(A2:A4)"),
            CellValue::Error(CellError::Num)
        );
    }

    #[test]
    fn test_pmt_reference_value() {
        let s = cashflow_sheet();
        // Excel: PMT(0.08/12, 10, 10000) = -1037.0320...
        let got = num(&s, "PMT(0.08/12,10,10000)");
        assert!((got + 1_037.032_089).abs() < 1e-4, "got {got}");
    }

    #[test]
    fn test_fv_pv_inverse_relationship() {
        let s = cashflow_sheet();
        let fv = num(&s, "FV(0.05,10,-100)");
        assert!((fv - 1_257.789_253).abs() < 1e-4, "got {fv}");
        let pv = num(&s, "PV(0.05,10,-100)");
        assert!((pv - 772.173_492_9).abs() < 1e-4, "got {pv}");
    }

    #[test]
    fn test_rate_recovers_pmt_rate() {
        let s = cashflow_sheet();
        let rate = num(&s, "RATE(10,-1037.03208935915,10000)");
        assert!((rate - 0.08 / 12.0).abs() < 1e-7, "got {rate}");
    }

    #[test]
    fn test_nper() {
        let s = cashflow_sheet();
        let n = num(&s, "NPER(0.05,-100,772.173492918482)");
        assert!((n - 10.0).abs() < 1e-6, "got {n}");
        assert_eq!(
            eval_on(&s, "NPER(0,0,1000)"),
            CellValue::Error(CellError::Num)
        );
    }

    #[test]
    fn test_zero_rate_degenerate_forms() {
        let s = cashflow_sheet();
        assert_eq!(num(&s, "PMT(0,10,1000)"), -100.0);
        assert_eq!(num(&s, "FV(0,10,-100)"), 1000.0);
        assert_eq!(num(&s, "NPER(0,-100,1000)"), 10.0);
    }

    #[test]
    fn test_xnpv_at_zero_rate_is_plain_sum() {
        let s = cashflow_sheet();
        let got = num(&s, "XNPV(0,A1:A4,B1:B4)");
        assert!((got - 4_000.0).abs() < 1e-9, "got {got}");
    }

    #[test]
    fn test_xirr_zeroes_the_xnpv() {
        let s = cashflow_sheet();
        let rate = num(&s, "XIRR(A1:A4,B1:B4)");
        let check = num(&s, &format!("XNPV({rate},A1:A4,B1:B4)"));
        assert!(check.abs() < 1e-4, "xnpv at xirr = {check}");
    }
}
