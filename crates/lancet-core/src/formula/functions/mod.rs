//! Built-in spreadsheet function dispatch.
//!
//! Functions receive their UNevaluated argument expressions plus the
//! evaluator, so short-circuiting (`IF`) and range expansion (`SUM`) work
//! without special cases in the core evaluator. All failures are cell
//! errors.

pub mod date_time;
pub mod financial;
pub mod information;
pub mod logical;
pub mod lookup;
pub mod math;
pub mod statistical;
pub mod text;

use crate::formula::ast::TExpr;
use crate::formula::eval::{EvalResult, Evaluator};
use crate::value::{CellError, CellValue};

/// Signature of a built-in function implementation.
pub type FunctionFn = fn(&[TExpr], &mut Evaluator) -> EvalResult<CellValue>;

/// Resolve an upper-cased function name to its implementation.
pub fn lookup(name: &str) -> Option<FunctionFn> {
    match name {
        // math
        "SUM" => Some(math::sum),
        "SUMIF" => Some(math::sumif),
        "SUMIFS" => Some(math::sumifs),
        "SUMPRODUCT" => Some(math::sumproduct),
        "ABS" => Some(math::abs),
        "SQRT" => Some(math::sqrt),
        "MOD" => Some(math::modulo),
        "POWER" => Some(math::power),
        "LOG" => Some(math::log),
        "LOG10" => Some(math::log10),
        "LN" => Some(math::ln),
        "EXP" => Some(math::exp),
        "FLOOR" => Some(math::floor),
        "CEILING" => Some(math::ceiling),
        "TRUNC" => Some(math::trunc),
        "SIGN" => Some(math::sign),
        "INT" => Some(math::int),
        "ROUND" => Some(math::round),
        "ROUNDUP" => Some(math::roundup),
        "ROUNDDOWN" => Some(math::rounddown),
        "PI" => Some(math::pi),
        // statistical
        "COUNT" => Some(statistical::count),
        "COUNTA" => Some(statistical::counta),
        "COUNTIF" => Some(statistical::countif),
        "COUNTIFS" => Some(statistical::countifs),
        "AVERAGE" => Some(statistical::average),
        "AVERAGEIF" => Some(statistical::averageif),
        "MIN" => Some(statistical::min),
        "MAX" => Some(statistical::max),
        "MEDIAN" => Some(statistical::median),
        "STDEV" => Some(statistical::stdev),
        "STDEVP" => Some(statistical::stdevp),
        "VAR" => Some(statistical::var),
        "VARP" => Some(statistical::varp),
        // logical
        "IF" => Some(logical::if_fn),
        "AND" => Some(logical::and),
        "OR" => Some(logical::or),
        "NOT" => Some(logical::not),
        "TRUE" => Some(logical::true_fn),
        "FALSE" => Some(logical::false_fn),
        "IFERROR" => Some(logical::iferror),
        // text
        "CONCATENATE" | "CONCAT" => Some(text::concatenate),
        "LEFT" => Some(text::left),
        "RIGHT" => Some(text::right),
        "MID" => Some(text::mid),
        "LEN" => Some(text::len),
        "UPPER" => Some(text::upper),
        "LOWER" => Some(text::lower),
        "TRIM" => Some(text::trim),
        // date/time
        "TODAY" => Some(date_time::today),
        "NOW" => Some(date_time::now),
        "DATE" => Some(date_time::date),
        "YEAR" => Some(date_time::year),
        "MONTH" => Some(date_time::month),
        "DAY" => Some(date_time::day),
        "EDATE" => Some(date_time::edate),
        "EOMONTH" => Some(date_time::eomonth),
        "DATEDIF" => Some(date_time::datedif),
        "NETWORKDAYS" => Some(date_time::networkdays),
        "WORKDAY" => Some(date_time::workday),
        "YEARFRAC" => Some(date_time::yearfrac),
        // financial
        "NPV" => Some(financial::npv),
        "IRR" => Some(financial::irr),
        "XNPV" => Some(financial::xnpv),
        "XIRR" => Some(financial::xirr),
        "PMT" => Some(financial::pmt),
        "FV" => Some(financial::fv),
        "PV" => Some(financial::pv),
        "RATE" => Some(financial::rate),
        "NPER" => Some(financial::nper),
        // lookup
        "VLOOKUP" => Some(lookup::vlookup),
        "HLOOKUP" => Some(lookup::hlookup),
        "XLOOKUP" => Some(lookup::xlookup),
        "ROW" => Some(lookup::row),
        "COLUMN" => Some(lookup::column),
        "ADDRESS" => Some(lookup::address),
        // information
        "ISNUMBER" => Some(information::isnumber),
        "ISTEXT" => Some(information::istext),
        "ISBLANK" => Some(information::isblank),
        "ISERROR" => Some(information::iserror),
        "ISERR" => Some(information::iserr),
        "ISNA" => Some(information::isna),
        "ISLOGICAL" => Some(information::islogical),
        _ => None,
    }
}

/// Reject calls whose argument count is outside `min..=max`.
pub fn need_args(args: &[TExpr], min: usize, max: usize) -> EvalResult<()> {
    if args.len() < min || args.len() > max {
        return Err(CellError::Value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_and_unknown() {
        assert!(lookup("SUM").is_some());
        assert!(lookup("XLOOKUP").is_some());
        assert!(lookup("PI").is_some());
        assert!(lookup("FNORD").is_none());
    }

    #[test]
    fn test_concat_aliases() {
        assert!(lookup("CONCAT").is_some());
        assert!(lookup("CONCATENATE").is_some());
    }

    #[test]
    fn test_need_args() {
        let args = vec![TExpr::Num(1.0)];
        assert!(need_args(&args, 1, 2).is_ok());
        assert_eq!(need_args(&args, 2, 3), Err(CellError::Value));
        assert_eq!(need_args(&args, 0, 0), Err(CellError::Value));
    }
}
