//! Type-inspection (IS*) functions. These never propagate errors from
//! their argument -- an error value is simply something ISERROR is true
//! of.

use crate::formula::ast::TExpr;
use crate::formula::eval::{EvalResult, Evaluator};
use crate::formula::functions::need_args;
use crate::value::{CellError, CellValue};

fn inspect(
    args: &[TExpr],
    ev: &mut Evaluator,
    f: impl Fn(&CellValue) -> bool,
) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    let value = match ev.eval(&args[0]) {
        Ok(v) => v,
        Err(e) => CellValue::Error(e),
    };
    Ok(CellValue::Bool(f(&value)))
}

pub fn isnumber(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    inspect(args, ev, |v| {
        matches!(v, CellValue::Number(_) | CellValue::DateTime(_))
    })
}

pub fn istext(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    inspect(args, ev, |v| {
        matches!(v, CellValue::Text(_) | CellValue::Rich(_))
    })
}

pub fn isblank(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    inspect(args, ev, |v| matches!(v, CellValue::Empty))
}

pub fn iserror(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    inspect(args, ev, |v| matches!(v, CellValue::Error(_)))
}

/// ISERR: any error except #N/A.
pub fn iserr(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    inspect(args, ev, |v| {
        matches!(v, CellValue::Error(e) if *e != CellError::NA)
    })
}

pub fn isna(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    inspect(args, ev, |v| {
        matches!(v, CellValue::Error(CellError::NA))
    })
}

pub fn islogical(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    inspect(args, ev, |v| matches!(v, CellValue::Bool(_)))
}

#[cfg(test)]
mod tests {
    use crate::addr::{ARef, SheetName};
    use crate::formula::eval::{evaluate, SheetProvider};
    use crate::formula::parser::parse;
    use crate::sheet::Sheet;
    use crate::value::CellValue;

    fn sheet() -> Sheet {
        let mut s = Sheet::new(SheetName::new("S").unwrap());
        s = s.put(ARef::parse("A1").unwrap(), CellValue::Number(1.0));
        s = s.put(
            ARef::parse("A2").unwrap(),
            CellValue::Text("t".to_string()),
        );
        s = s.put(ARef::parse("A3").unwrap(), CellValue::Bool(true));
        s
    }

    fn check(formula: &str, expected: bool) {
        let s = sheet();
        let got = evaluate(&parse(formula).unwrap(), &SheetProvider { sheet: &s });
        assert_eq!(got, CellValue::Bool(expected), "{formula}");
    }

    #[test]
    fn test_isnumber_istext_islogical() {
        check("ISNUMBER(A1)", true);
        check("ISNUMBER(A2)", false);
        check("ISTEXT(A2)", true);
        check("ISTEXT(A1)", false);
        check("ISLOGICAL(A3)", true);
        check("ISLOGICAL(A1)", false);
    }

    #[test]
    fn test_isblank() {
        check("ISBLANK(Z99)", true);
        check("ISBLANK(A1)", false);
    }

    #[test]
    fn test_error_inspectors_swallow_errors() {
        check("ISERROR(1/0)", true);
        check("ISERROR(1)", false);
        check("ISNA(#N/A)", true);
        check("ISNA(1/0)", false);
        check("ISERR(1/0)", true);
        check("ISERR(#N/A)", false);
    }
}
