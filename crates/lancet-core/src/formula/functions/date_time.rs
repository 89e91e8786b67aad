//! Date and time functions. Dates flow through evaluation as OOXML serial
//! numbers; only the cell model stores them as `NaiveDateTime`.

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::formula::ast::TExpr;
use crate::formula::eval::{strict_number, EvalResult, Evaluator};
use crate::formula::functions::need_args;
use crate::value::{datetime_to_serial, serial_to_datetime, CellError, CellValue};

fn serial_to_date(serial: f64) -> EvalResult<NaiveDate> {
    serial_to_datetime(serial)
        .map(|dt| dt.date())
        .ok_or(CellError::Num)
}

fn date_to_serial(date: NaiveDate) -> f64 {
    datetime_to_serial(&date.and_hms_opt(0, 0, 0).unwrap())
}

fn date_arg(args: &[TExpr], index: usize, ev: &mut Evaluator) -> EvalResult<NaiveDate> {
    serial_to_date(ev.number_arg(args, index)?)
}

/// TODAY() -- the local date as a serial number.
pub fn today(args: &[TExpr], _ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 0, 0)?;
    let now = Local::now().naive_local();
    Ok(CellValue::Number(date_to_serial(now.date())))
}

/// NOW() -- the local date-time as a serial number.
pub fn now(args: &[TExpr], _ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 0, 0)?;
    Ok(CellValue::Number(datetime_to_serial(
        &Local::now().naive_local(),
    )))
}

/// DATE(year, month, day); out-of-range month/day roll over as in Excel.
pub fn date(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 3, 3)?;
    let year = ev.number_arg(args, 0)? as i32;
    let month = ev.number_arg(args, 1)? as i32;
    let day = ev.number_arg(args, 2)? as i64;
    let rolled = add_months(
        NaiveDate::from_ymd_opt(year, 1, 1).ok_or(CellError::Num)?,
        month - 1,
    )?;
    let date = rolled
        .checked_add_signed(Duration::days(day - 1))
        .ok_or(CellError::Num)?;
    Ok(CellValue::Number(date_to_serial(date)))
}

/// YEAR(serial)
pub fn year(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    Ok(CellValue::Number(date_arg(args, 0, ev)?.year() as f64))
}

/// MONTH(serial)
pub fn month(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    Ok(CellValue::Number(date_arg(args, 0, ev)?.month() as f64))
}

/// DAY(serial)
pub fn day(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    Ok(CellValue::Number(date_arg(args, 0, ev)?.day() as f64))
}

/// Add months, clamping the day to the target month's length.
fn add_months(date: NaiveDate, months: i32) -> EvalResult<NaiveDate> {
    let zero_based = date.year() * 12 + date.month() as i32 - 1 + months;
    let year = zero_based.div_euclid(12);
    let month = zero_based.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).ok_or(CellError::Num)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (next, NaiveDate::from_ymd_opt(year, month, 1)) {
        (Some(next), Some(first)) => (next - first).num_days() as u32,
        _ => 30,
    }
}

/// EDATE(start, months)
pub fn edate(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 2)?;
    let start = date_arg(args, 0, ev)?;
    let months = ev.number_arg(args, 1)? as i32;
    Ok(CellValue::Number(date_to_serial(add_months(
        start, months,
    )?)))
}

/// EOMONTH(start, months) -- last day of the shifted month.
pub fn eomonth(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 2)?;
    let start = date_arg(args, 0, ev)?;
    let months = ev.number_arg(args, 1)? as i32;
    let shifted = add_months(start, months)?;
    let last = days_in_month(shifted.year(), shifted.month());
    let eom =
        NaiveDate::from_ymd_opt(shifted.year(), shifted.month(), last).ok_or(CellError::Num)?;
    Ok(CellValue::Number(date_to_serial(eom)))
}

/// DATEDIF(start, end, unit) with units Y, M, D, MD, YM, YD.
pub fn datedif(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 3, 3)?;
    let start = date_arg(args, 0, ev)?;
    let end = date_arg(args, 1, ev)?;
    let unit = ev.text_arg(args, 2)?.to_ascii_uppercase();
    if end < start {
        return Err(CellError::Num);
    }
    let whole_months = |from: NaiveDate, to: NaiveDate| -> i32 {
        let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
        if to.day() < from.day() {
            months -= 1;
        }
        months
    };
    let out = match unit.as_str() {
        "D" => (end - start).num_days() as f64,
        "M" => whole_months(start, end) as f64,
        "Y" => (whole_months(start, end) / 12) as f64,
        "MD" => {
            let anchor = add_months(end.with_day(start.day().min(days_in_month(end.year(), end.month()))).unwrap_or(end), if end.day() < start.day() { -1 } else { 0 })?;
            (end - anchor).num_days() as f64
        }
        "YM" => (whole_months(start, end) % 12) as f64,
        "YD" => {
            let years = whole_months(start, end) / 12;
            let anchor = add_months(start, years * 12)?;
            (end - anchor).num_days() as f64
        }
        _ => return Err(CellError::Num),
    };
    Ok(CellValue::Number(out))
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(
        date.weekday(),
        chrono::Weekday::Sat | chrono::Weekday::Sun
    )
}

fn holiday_set(args: &[TExpr], index: usize, ev: &mut Evaluator) -> EvalResult<Vec<NaiveDate>> {
    if index >= args.len() {
        return Ok(vec![]);
    }
    let values = ev.flatten_values(&args[index..=index])?;
    let mut out = Vec::new();
    for value in values {
        if let Ok(serial) = strict_number(&value) {
            out.push(serial_to_date(serial)?);
        }
    }
    Ok(out)
}

/// NETWORKDAYS(start, end, [holidays]) -- whole working days, inclusive.
pub fn networkdays(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 3)?;
    let mut start = date_arg(args, 0, ev)?;
    let mut end = date_arg(args, 1, ev)?;
    let holidays = holiday_set(args, 2, ev)?;
    let sign = if start > end {
        std::mem::swap(&mut start, &mut end);
        -1.0
    } else {
        1.0
    };
    let mut count = 0i64;
    let mut current = start;
    while current <= end {
        if !is_weekend(current) && !holidays.contains(&current) {
            count += 1;
        }
        current += Duration::days(1);
    }
    Ok(CellValue::Number(count as f64 * sign))
}

/// WORKDAY(start, days, [holidays]) -- the date `days` working days away.
pub fn workday(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 3)?;
    let start = date_arg(args, 0, ev)?;
    let days = ev.number_arg(args, 1)? as i64;
    let holidays = holiday_set(args, 2, ev)?;
    let step = if days < 0 { -1 } else { 1 };
    let mut remaining = days.abs();
    let mut current = start;
    while remaining > 0 {
        current += Duration::days(step);
        if !is_weekend(current) && !holidays.contains(&current) {
            remaining -= 1;
        }
    }
    Ok(CellValue::Number(date_to_serial(current)))
}

/// YEARFRAC(start, end, [basis]); bases 0 (30/360 US), 1 (actual/actual),
/// 2 (actual/360), 3 (actual/365), 4 (30/360 EU).
pub fn yearfrac(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 2, 3)?;
    let mut start = date_arg(args, 0, ev)?;
    let mut end = date_arg(args, 1, ev)?;
    let basis = ev.opt_number_arg(args, 2, 0.0)? as i32;
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }
    let actual_days = (end - start).num_days() as f64;
    let out = match basis {
        0 => days_360(start, end, false) / 360.0,
        1 => {
            // Average year length across the spanned calendar years.
            let years = (start.year()..=end.year())
                .map(|y| if NaiveDate::from_ymd_opt(y, 2, 29).is_some() { 366.0 } else { 365.0 })
                .sum::<f64>()
                / (end.year() - start.year() + 1) as f64;
            actual_days / years
        }
        2 => actual_days / 360.0,
        3 => actual_days / 365.0,
        4 => days_360(start, end, true) / 360.0,
        _ => return Err(CellError::Num),
    };
    Ok(CellValue::Number(out))
}

fn days_360(start: NaiveDate, end: NaiveDate, european: bool) -> f64 {
    let mut d1 = start.day() as i32;
    let mut d2 = end.day() as i32;
    if european {
        d1 = d1.min(30);
        d2 = d2.min(30);
    } else {
        if d1 == 31 {
            d1 = 30;
        }
        if d2 == 31 && d1 == 30 {
            d2 = 30;
        }
    }
    (((end.year() - start.year()) * 360) + (end.month() as i32 - start.month() as i32) * 30
        + (d2 - d1)) as f64
}

// =========================================================================
// Tests
// =========================================================================
