//! Text functions.

use crate::formula::ast::TExpr;
use crate::formula::eval::{to_text, EvalResult, Evaluator};
use crate::formula::functions::need_args;
use crate::value::{CellError, CellValue};

/// CONCATENATE(value1, ...) / CONCAT(value1, ...)
pub fn concatenate(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 255)?;
    let mut out = String::new();
    for value in ev.flatten_values(args)? {
        if let CellValue::Error(e) = value {
            return Err(e);
        }
        out.push_str(&to_text(&value));
    }
    Ok(CellValue::Text(out))
}

/// LEFT(text, [count])
pub fn left(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 2)?;
    let text = ev.text_arg(args, 0)?;
    let count = ev.opt_number_arg(args, 1, 1.0)?;
    if count < 0.0 {
        return Err(CellError::Value);
    }
    Ok(CellValue::Text(text.chars().take(count as usize).collect()))
}

/// RIGHT(text, [count])
pub fn right(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 2)?;
    let text = ev.text_arg(args, 0)?;
    let count = ev.opt_number_arg(args, 1, 1.0)?;
    if count < 0.0 {
        return Err(CellError::Value);
    }
    let chars: Vec<char> = text.chars().collect();
    let start = chars.len().saturating_sub(count as usize);
    Ok(CellValue::Text(chars[start..].iter().collect()))
}

/// MID(text, start, count) -- start is 1-based.
pub fn mid(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 3, 3)?;
    let text = ev.text_arg(args, 0)?;
    let start = ev.number_arg(args, 1)?;
    let count = ev.number_arg(args, 2)?;
    if start < 1.0 || count < 0.0 {
        return Err(CellError::Value);
    }
    Ok(CellValue::Text(
        text.chars()
            .skip(start as usize - 1)
            .take(count as usize)
            .collect(),
    ))
}

/// LEN(text) -- character count, not bytes.
pub fn len(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    let text = ev.text_arg(args, 0)?;
    Ok(CellValue::Number(text.chars().count() as f64))
}

/// UPPER(text)
pub fn upper(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    Ok(CellValue::Text(ev.text_arg(args, 0)?.to_uppercase()))
}

/// LOWER(text)
pub fn lower(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    Ok(CellValue::Text(ev.text_arg(args, 0)?.to_lowercase()))
}

/// TRIM(text) -- strips leading/trailing spaces and collapses runs.
pub fn trim(args: &[TExpr], ev: &mut Evaluator) -> EvalResult<CellValue> {
    need_args(args, 1, 1)?;
    let text = ev.text_arg(args, 0)?;
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    Ok(CellValue::Text(collapsed))
}

#[cfg(test)]
mod tests {
    use crate::addr::SheetName;
    use crate::formula::eval::{evaluate, SheetProvider};
    use crate::formula::parser::parse;
    use crate::sheet::Sheet;
    use crate::value::CellValue;

    fn eval_str(formula: &str) -> CellValue {
        let sheet = Sheet::new(SheetName::new("S").unwrap());
        evaluate(&parse(formula).unwrap(), &SheetProvider { sheet: &sheet })
    }

    fn text(formula: &str) -> String {
        match eval_str(formula) {
            CellValue::Text(s) => s,
            other => panic!("{formula} -> {other:?}"),
        }
    }

    #[test]
    fn test_concatenate() {
        assert_eq!(text("CONCATENATE(\"a\",\"b\",1)"), "ab1");
        assert_eq!(text("CONCAT(\"x\",TRUE)"), "xTRUE");
    }

    #[test]
    fn test_left_right_mid() {
        assert_eq!(text("LEFT(\"spreadsheet\",6)"), "spread");
        assert_eq!(text("LEFT(\"abc\")"), "a");
        assert_eq!(text("RIGHT(\"spreadsheet\",5)"), "sheet");
        assert_eq!(text("MID(\"spreadsheet\",7,5)"), "sheet");
        assert_eq!(text("RIGHT(\"ab\",9)"), "ab");
    }

    #[test]
    fn test_len_counts_chars() {
        assert_eq!(eval_str("LEN(\"abc\")"), CellValue::Number(3.0));
        assert_eq!(eval_str("LEN(\"\u{00e9}t\u{00e9}\")"), CellValue::Number(3.0));
    }

    #[test]
    fn test_upper_lower() {
        assert_eq!(text("UPPER(\"MixeD\")"), "MIXED");
        assert_eq!(text("LOWER(\"MixeD\")"), "mixed");
    }

    #[test]
    fn test_trim() {
        assert_eq!(text("TRIM(\"  a   b  \")"), "a b");
    }

    #[test]
    fn test_numbers_coerce_to_text() {
        assert_eq!(text("LEFT(12345,3)"), "123");
    }
}
