//! Formula evaluation.
//!
//! Evaluation failures are values, not errors: everything that can go
//! wrong inside a formula becomes a [`CellError`], which the caller stores
//! in the cell cache. Nothing here returns [`crate::error::Error`] or
//! panics.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::addr::{ARef, SheetName};
use crate::formula::ast::{BinaryOp, RangeRefExpr, TExpr, UnaryOp};
use crate::formula::{functions, parser};
use crate::sheet::Sheet;
use crate::value::{datetime_to_serial, CellError, CellValue};
use crate::workbook::Workbook;

/// Result type used throughout evaluation: the error side is a cell error.
pub type EvalResult<T> = std::result::Result<T, CellError>;

/// Nested evaluation depth limit.
const MAX_EVAL_DEPTH: usize = 256;

/// Largest range a function is allowed to materialize as a dense table.
const MAX_TABLE_CELLS: u64 = 1 << 20;

/// Supplies cell values to the evaluator.
pub trait CellProvider {
    /// The sheet unqualified references bind to.
    fn current_sheet(&self) -> &str;
    /// The raw value at (sheet, cell); `Empty` when absent or the sheet is
    /// unknown.
    fn cell(&self, sheet: &str, aref: ARef) -> CellValue;
    /// Bottom-right corner of the sheet's used range, for clamping
    /// open-ended ranges.
    fn used_bound(&self, sheet: &str) -> Option<ARef>;
}

/// Provider over a single sheet; references to other sheets read as empty.
pub struct SheetProvider<'a> {
    pub sheet: &'a Sheet,
}

impl CellProvider for SheetProvider<'_> {
    fn current_sheet(&self) -> &str {
        self.sheet.name().as_str()
    }

    fn cell(&self, sheet: &str, aref: ARef) -> CellValue {
        if sheet == self.sheet.name().as_str() {
            self.sheet.value(aref)
        } else {
            CellValue::Empty
        }
    }

    fn used_bound(&self, sheet: &str) -> Option<ARef> {
        if sheet == self.sheet.name().as_str() {
            self.sheet.used_range().map(|r| r.end)
        } else {
            None
        }
    }
}

/// Provider over a whole workbook, with one sheet current.
pub struct WorkbookProvider<'a> {
    pub workbook: &'a Workbook,
    pub current: usize,
}

impl CellProvider for WorkbookProvider<'_> {
    fn current_sheet(&self) -> &str {
        self.workbook.sheets()[self.current].name().as_str()
    }

    fn cell(&self, sheet: &str, aref: ARef) -> CellValue {
        self.workbook
            .sheet_by_name(sheet)
            .map(|s| s.value(aref))
            .unwrap_or(CellValue::Empty)
    }

    fn used_bound(&self, sheet: &str) -> Option<ARef> {
        self.workbook
            .sheet_by_name(sheet)
            .ok()
            .and_then(|s| s.used_range())
            .map(|r| r.end)
    }
}

/// Evaluate an expression against a provider.
pub fn evaluate(expr: &TExpr, provider: &dyn CellProvider) -> CellValue {
    let mut evaluator = Evaluator::new(provider);
    match evaluator.eval(expr) {
        Ok(value) => value,
        Err(e) => CellValue::Error(e),
    }
}

/// Stateful evaluator tracking recursion depth and in-flight cells for
/// cycle detection.
pub struct Evaluator<'a> {
    provider: &'a dyn CellProvider,
    sheet_stack: Vec<String>,
    visiting: HashSet<(String, u64)>,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(provider: &'a dyn CellProvider) -> Self {
        Self {
            provider,
            sheet_stack: Vec::new(),
            visiting: HashSet::new(),
            depth: 0,
        }
    }

    fn context_sheet(&self) -> String {
        self.sheet_stack
            .last()
            .cloned()
            .unwrap_or_else(|| self.provider.current_sheet().to_string())
    }

    /// Evaluate one AST node.
    pub fn eval(&mut self, expr: &TExpr) -> EvalResult<CellValue> {
        self.depth += 1;
        if self.depth > MAX_EVAL_DEPTH {
            self.depth -= 1;
            return Err(CellError::Value);
        }
        let result = self.eval_inner(expr);
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, expr: &TExpr) -> EvalResult<CellValue> {
        match expr {
            TExpr::Num(n) => Ok(CellValue::Number(*n)),
            TExpr::Str(s) => Ok(CellValue::Text(s.clone())),
            TExpr::Bool(b) => Ok(CellValue::Bool(*b)),
            TExpr::Err(e) => Ok(CellValue::Error(*e)),
            TExpr::CellRef(r) => self.resolve(r.sheet.as_ref(), r.aref),
            TExpr::RangeRef(r) => {
                // A range in scalar context yields its first cell.
                let sheet = self.ref_sheet(r.sheet.as_ref());
                self.resolve_raw(&sheet, r.range.start)
            }
            TExpr::Paren(inner) => self.eval(inner),
            TExpr::Unary { op, expr } => self.eval_unary(*op, expr),
            TExpr::Binary { op, lhs, rhs } => self.eval_binary(*op, lhs, rhs),
            TExpr::Func { name, args } => match functions::lookup(name) {
                Some(f) => f(args, self),
                None => Err(CellError::Name),
            },
        }
    }

    fn ref_sheet(&self, sheet: Option<&SheetName>) -> String {
        sheet
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| self.context_sheet())
    }

    /// Resolve a cell to a scalar, following uncached formulas and
    /// detecting cycles.
    fn resolve(&mut self, sheet: Option<&SheetName>, aref: ARef) -> EvalResult<CellValue> {
        let sheet = self.ref_sheet(sheet);
        self.resolve_raw(&sheet, aref)
    }

    fn resolve_raw(&mut self, sheet: &str, aref: ARef) -> EvalResult<CellValue> {
        match self.provider.cell(sheet, aref) {
            CellValue::Formula { expr, cached } => {
                if let Some(cached) = cached {
                    return Ok(*cached);
                }
                let key = (sheet.to_string(), aref.packed());
                if !self.visiting.insert(key.clone()) {
                    return Err(CellError::Ref);
                }
                let result = match parser::parse(&expr) {
                    Ok(ast) => {
                        self.sheet_stack.push(sheet.to_string());
                        let r = self.eval(&ast);
                        self.sheet_stack.pop();
                        r
                    }
                    Err(_) => Err(CellError::Name),
                };
                self.visiting.remove(&key);
                result
            }
            other => Ok(other),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, expr: &TExpr) -> EvalResult<CellValue> {
        let value = self.eval(expr)?;
        if let CellValue::Error(e) = value {
            return Ok(CellValue::Error(e));
        }
        let n = to_number(&value)?;
        Ok(CellValue::Number(match op {
            UnaryOp::Neg => -n,
            UnaryOp::Pos => n,
            UnaryOp::Percent => n / 100.0,
        }))
    }

    fn eval_binary(&mut self, op: BinaryOp, lhs: &TExpr, rhs: &TExpr) -> EvalResult<CellValue> {
        let left = self.eval(lhs)?;
        let right = self.eval(rhs)?;
        if let CellValue::Error(e) = left {
            return Ok(CellValue::Error(e));
        }
        if let CellValue::Error(e) = right {
            return Ok(CellValue::Error(e));
        }
        match op {
            BinaryOp::Concat => Ok(CellValue::Text(format!(
                "{}{}",
                to_text(&left),
                to_text(&right)
            ))),
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Pow => {
                let l = to_number(&left)?;
                let r = to_number(&right)?;
                let out = match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => {
                        if r == 0.0 {
                            return Ok(CellValue::Error(CellError::Div0));
                        }
                        l / r
                    }
                    BinaryOp::Pow => l.powf(r),
                    _ => unreachable!(),
                };
                Ok(CellValue::Number(out))
            }
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt
            | BinaryOp::Ge => {
                let ord = compare_values(&left, &right);
                let out = match op {
                    BinaryOp::Eq => ord == Ordering::Equal,
                    BinaryOp::Ne => ord != Ordering::Equal,
                    BinaryOp::Lt => ord == Ordering::Less,
                    BinaryOp::Le => ord != Ordering::Greater,
                    BinaryOp::Gt => ord == Ordering::Greater,
                    BinaryOp::Ge => ord != Ordering::Less,
                    _ => unreachable!(),
                };
                Ok(CellValue::Bool(out))
            }
        }
    }

    // ----- helpers for function implementations -----------------------------

    /// Evaluate the argument at `index`; missing arguments are a `#VALUE!`.
    pub fn eval_arg(&mut self, args: &[TExpr], index: usize) -> EvalResult<CellValue> {
        let arg = args.get(index).ok_or(CellError::Value)?;
        self.eval(arg)
    }

    pub fn number_arg(&mut self, args: &[TExpr], index: usize) -> EvalResult<f64> {
        to_number(&self.eval_arg(args, index)?)
    }

    pub fn text_arg(&mut self, args: &[TExpr], index: usize) -> EvalResult<String> {
        Ok(to_text(&self.eval_arg(args, index)?))
    }

    pub fn bool_arg(&mut self, args: &[TExpr], index: usize) -> EvalResult<bool> {
        to_bool(&self.eval_arg(args, index)?)
    }

    /// Optional numeric argument with a default.
    pub fn opt_number_arg(
        &mut self,
        args: &[TExpr],
        index: usize,
        default: f64,
    ) -> EvalResult<f64> {
        if index < args.len() {
            self.number_arg(args, index)
        } else {
            Ok(default)
        }
    }

    /// Collect numbers across all arguments, expanding ranges. Inside
    /// ranges, non-numeric cells are skipped (Excel aggregate semantics);
    /// scalar arguments coerce and fail loudly.
    pub fn collect_numbers(&mut self, args: &[TExpr]) -> EvalResult<Vec<f64>> {
        let mut out = Vec::new();
        for arg in args {
            match arg {
                TExpr::RangeRef(r) => {
                    for value in self.range_values(r)? {
                        if let Ok(n) = strict_number(&value) {
                            out.push(n);
                        }
                    }
                }
                _ => out.push(to_number(&self.eval(arg)?)?),
            }
        }
        Ok(out)
    }

    /// Flatten all arguments to scalars, expanding ranges sparsely (absent
    /// cells are not included).
    pub fn flatten_values(&mut self, args: &[TExpr]) -> EvalResult<Vec<CellValue>> {
        let mut out = Vec::new();
        for arg in args {
            match arg {
                TExpr::RangeRef(r) => out.extend(self.range_values(r)?),
                _ => out.push(self.eval(arg)?),
            }
        }
        Ok(out)
    }

    /// The values of the cells present inside a range, row-major.
    pub fn range_values(&mut self, r: &RangeRefExpr) -> EvalResult<Vec<CellValue>> {
        let table = self.range_table_of(r)?;
        Ok(table
            .into_iter()
            .flatten()
            .filter(|v| !v.is_empty())
            .collect())
    }

    /// Materialize a range argument as a dense row-major table. The range
    /// is clamped to the sheet's used extent so open-ended references stay
    /// affordable; oversized tables fail with `#VALUE!`.
    pub fn range_table(&mut self, arg: &TExpr) -> EvalResult<Vec<Vec<CellValue>>> {
        match arg {
            TExpr::RangeRef(r) => self.range_table_of(r),
            TExpr::CellRef(c) => {
                let v = self.resolve(c.sheet.as_ref(), c.aref)?;
                Ok(vec![vec![v]])
            }
            _ => Err(CellError::Value),
        }
    }

    fn range_table_of(&mut self, r: &RangeRefExpr) -> EvalResult<Vec<Vec<CellValue>>> {
        let sheet = self.ref_sheet(r.sheet.as_ref());
        let start = r.range.start;
        let mut end = r.range.end;
        if let Some(bound) = self.provider.used_bound(&sheet) {
            end = ARef::new(end.col.min(bound.col), end.row.min(bound.row));
        }
        if end.col < start.col || end.row < start.row {
            return Ok(vec![]);
        }
        let rows = (end.row.index() - start.row.index() + 1) as u64;
        let cols = (end.col.index() - start.col.index() + 1) as u64;
        if rows * cols > MAX_TABLE_CELLS {
            return Err(CellError::Value);
        }
        let mut table = Vec::with_capacity(rows as usize);
        for row in start.row.index()..=end.row.index() {
            let mut line = Vec::with_capacity(cols as usize);
            for col in start.col.index()..=end.col.index() {
                let aref = ARef::from_indices(col, row).map_err(|_| CellError::Ref)?;
                line.push(self.resolve_raw(&sheet, aref)?);
            }
            table.push(line);
        }
        Ok(table)
    }
}

// ---------------------------------------------------------------------------
// Coercions
// ---------------------------------------------------------------------------

/// Coerce to a number: booleans become 0/1, empty 0, dates their serial,
/// numeric text parses; other text is `#VALUE!`.
pub fn to_number(value: &CellValue) -> EvalResult<f64> {
    match value {
        CellValue::Number(n) => Ok(*n),
        CellValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        CellValue::Empty => Ok(0.0),
        CellValue::DateTime(dt) => Ok(datetime_to_serial(dt)),
        CellValue::Text(s) => s.trim().parse::<f64>().map_err(|_| CellError::Value),
        CellValue::Rich(_) => {
            let text = value.to_string();
            text.trim().parse::<f64>().map_err(|_| CellError::Value)
        }
        CellValue::Error(e) => Err(*e),
        CellValue::Formula { cached, .. } => match cached {
            Some(inner) => to_number(inner),
            None => Ok(0.0),
        },
    }
}

/// Like [`to_number`] but rejects text and booleans; used by aggregates
/// that skip non-numeric range cells.
pub fn strict_number(value: &CellValue) -> EvalResult<f64> {
    match value {
        CellValue::Number(n) => Ok(*n),
        CellValue::DateTime(dt) => Ok(datetime_to_serial(dt)),
        CellValue::Formula { cached: Some(c), .. } => strict_number(c),
        _ => Err(CellError::Value),
    }
}

/// Coerce to display text.
pub fn to_text(value: &CellValue) -> String {
    value.to_string()
}

/// Coerce to a boolean: numbers are nonzero, "TRUE"/"FALSE" text parses.
pub fn to_bool(value: &CellValue) -> EvalResult<bool> {
    match value {
        CellValue::Bool(b) => Ok(*b),
        CellValue::Number(n) => Ok(*n != 0.0),
        CellValue::Empty => Ok(false),
        CellValue::Text(s) => match s.to_ascii_uppercase().as_str() {
            "TRUE" => Ok(true),
            "FALSE" => Ok(false),
            _ => Err(CellError::Value),
        },
        CellValue::DateTime(_) => Ok(true),
        CellValue::Rich(_) => Err(CellError::Value),
        CellValue::Error(e) => Err(*e),
        CellValue::Formula { cached, .. } => match cached {
            Some(inner) => to_bool(inner),
            None => Ok(false),
        },
    }
}

/// Excel comparison semantics: numbers sort below text, text below
/// booleans; text compares case-insensitively.
pub fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    fn rank(v: &CellValue) -> u8 {
        match v {
            CellValue::Number(_) | CellValue::DateTime(_) | CellValue::Empty => 0,
            CellValue::Text(_) | CellValue::Rich(_) => 1,
            CellValue::Bool(_) => 2,
            _ => 3,
        }
    }
    let (ra, rb) = (rank(a), rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }
    match ra {
        0 => {
            let na = to_number(a).unwrap_or(0.0);
            let nb = to_number(b).unwrap_or(0.0);
            na.partial_cmp(&nb).unwrap_or(Ordering::Equal)
        }
        1 => {
            let ta = to_text(a).to_lowercase();
            let tb = to_text(b).to_lowercase();
            ta.cmp(&tb)
        }
        2 => {
            let ba = matches!(a, CellValue::Bool(true));
            let bb = matches!(b, CellValue::Bool(true));
            ba.cmp(&bb)
        }
        _ => Ordering::Equal,
    }
}

// ---------------------------------------------------------------------------
// Criteria matching (SUMIF / COUNTIF / AVERAGEIF)
// ---------------------------------------------------------------------------

/// A parsed criteria value: either a comparison against a number/text or a
/// wildcard equality pattern.
pub enum Criteria {
    Compare(Ordering, bool, CellValue),
    Pattern(String),
}

impl Criteria {
    /// Parse a criteria argument. Text like `">=10"` compares; anything
    /// else is an equality test, with `*`/`?` wildcards (escaped by `~`)
    /// for text.
    pub fn parse(value: &CellValue) -> Self {
        let text = match value {
            CellValue::Text(s) => s.clone(),
            other => return Criteria::Compare(Ordering::Equal, true, other.clone()),
        };
        let (op, rest): (&str, &str) = if let Some(r) = text.strip_prefix(">=") {
            (">=", r)
        } else if let Some(r) = text.strip_prefix("<=") {
            ("<=", r)
        } else if let Some(r) = text.strip_prefix("<>") {
            ("<>", r)
        } else if let Some(r) = text.strip_prefix('>') {
            (">", r)
        } else if let Some(r) = text.strip_prefix('<') {
            ("<", r)
        } else if let Some(r) = text.strip_prefix('=') {
            ("=", r)
        } else {
            return Criteria::Pattern(text);
        };
        let operand = match rest.trim().parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::Text(rest.to_string()),
        };
        match op {
            ">=" => Criteria::Compare(Ordering::Greater, true, operand),
            "<=" => Criteria::Compare(Ordering::Less, true, operand),
            ">" => Criteria::Compare(Ordering::Greater, false, operand),
            "<" => Criteria::Compare(Ordering::Less, false, operand),
            "<>" => Criteria::Compare(Ordering::Equal, false, operand),
            _ => match operand {
                CellValue::Text(t) => Criteria::Pattern(t),
                other => Criteria::Compare(Ordering::Equal, true, other),
            },
        }
    }

    /// Test a cell value against the criteria.
    pub fn matches(&self, value: &CellValue) -> bool {
        match self {
            Criteria::Compare(target, or_equal, operand) => {
                // Comparing across type families never matches (except <>).
                let ord = compare_values(value, operand);
                let same_family = matches!(
                    (value, operand),
                    (
                        CellValue::Number(_) | CellValue::DateTime(_),
                        CellValue::Number(_) | CellValue::DateTime(_)
                    ) | (CellValue::Text(_), CellValue::Text(_))
                        | (CellValue::Bool(_), CellValue::Bool(_))
                );
                match (target, or_equal) {
                    (Ordering::Equal, true) => same_family && ord == Ordering::Equal,
                    (Ordering::Equal, false) => !same_family || ord != Ordering::Equal,
                    (t, true) => same_family && (ord == *t || ord == Ordering::Equal),
                    (t, false) => same_family && ord == *t,
                }
            }
            Criteria::Pattern(pattern) => match value {
                CellValue::Text(s) => wildcard_match(pattern, s),
                CellValue::Rich(_) => wildcard_match(pattern, &value.to_string()),
                other => {
                    // "5" as criteria matches the number 5.
                    if let Ok(n) = pattern.trim().parse::<f64>() {
                        strict_number(other).map(|v| v == n).unwrap_or(false)
                    } else {
                        false
                    }
                }
            },
        }
    }
}

/// Case-insensitive wildcard match: `*` any run, `?` any one character,
/// `~*` / `~?` literal.
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    let text: Vec<char> = text.to_lowercase().chars().collect();

    // Classic iterative matcher with a single backtrack point.
    let (mut p, mut t) = (0usize, 0usize);
    let (mut star_p, mut star_t): (Option<usize>, usize) = (None, 0);
    while t < text.len() {
        let tok = pattern.get(p).copied();
        let (literal, advance) = match tok {
            Some('~') => (pattern.get(p + 1).copied(), 2),
            other => (other, 1),
        };
        if tok == Some('*') && advance == 1 {
            star_p = Some(p + 1);
            star_t = t;
            p += 1;
        } else if (tok == Some('?') && advance == 1)
            || (literal == Some(text[t]) && !(advance == 1 && tok == Some('*')))
        {
            p += advance;
            t += 1;
        } else if let Some(sp) = star_p {
            star_t += 1;
            p = sp;
            t = star_t;
        } else {
            return false;
        }
    }
    while pattern.get(p) == Some(&'*') {
        p += 1;
    }
    p == pattern.len()
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::SheetName;

    fn a(s: &str) -> ARef {
        ARef::parse(s).unwrap()
    }

    fn sheet() -> Sheet {
        Sheet::new(SheetName::new("S").unwrap())
    }

    fn eval_on(sheet: &Sheet, formula: &str) -> CellValue {
        let ast = parser::parse(formula).unwrap();
        evaluate(&ast, &SheetProvider { sheet })
    }

    #[test]
    fn test_arithmetic_and_precedence() {
        let s = sheet();
        assert_eq!(eval_on(&s, "1+2*3"), CellValue::Number(7.0));
        assert_eq!(eval_on(&s, "(1+2)*3"), CellValue::Number(9.0));
        assert_eq!(eval_on(&s, "2^10"), CellValue::Number(1024.0));
        assert_eq!(eval_on(&s, "50%"), CellValue::Number(0.5));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            eval_on(&sheet(), "1/0"),
            CellValue::Error(CellError::Div0)
        );
    }

    #[test]
    fn test_boolean_arithmetic_coerces() {
        let s = sheet();
        assert_eq!(eval_on(&s, "TRUE+1"), CellValue::Number(2.0));
        assert_eq!(eval_on(&s, "(5>3)*10"), CellValue::Number(10.0));
    }

    #[test]
    fn test_numeric_text_coerces() {
        let s = sheet().put(a("A1"), CellValue::Text("12.5".to_string()));
        assert_eq!(eval_on(&s, "A1*2"), CellValue::Number(25.0));
        let s = s.put(a("A2"), CellValue::Text("pear".to_string()));
        assert_eq!(eval_on(&s, "A2*2"), CellValue::Error(CellError::Value));
    }

    #[test]
    fn test_cell_refs_and_empty_default() {
        let s = sheet().put(a("A1"), 10.0.into());
        assert_eq!(eval_on(&s, "A1+B7"), CellValue::Number(10.0));
    }

    #[test]
    fn test_formula_cells_resolve_through_cache() {
        let s = sheet()
            .put(a("A1"), 10.0.into())
            .put(
                a("B1"),
                CellValue::formula_with_cache("A1*2", CellValue::Number(20.0)),
            );
        assert_eq!(eval_on(&s, "B1+1"), CellValue::Number(21.0));
    }

    #[test]
    fn test_uncached_formula_evaluates_recursively() {
        let s = sheet()
            .put(a("A1"), 10.0.into())
            .put(a("B1"), CellValue::formula("A1*2"));
        assert_eq!(eval_on(&s, "B1+1"), CellValue::Number(21.0));
    }

    #[test]
    fn test_cycle_yields_ref_error() {
        let s = sheet()
            .put(a("A1"), CellValue::formula("B1"))
            .put(a("B1"), CellValue::formula("A1"));
        assert_eq!(eval_on(&s, "A1"), CellValue::Error(CellError::Ref));
    }

    #[test]
    fn test_error_propagates_through_operators() {
        let s = sheet().put(a("A1"), CellValue::Error(CellError::NA));
        assert_eq!(eval_on(&s, "A1+1"), CellValue::Error(CellError::NA));
        assert_eq!(eval_on(&s, "-A1"), CellValue::Error(CellError::NA));
    }

    #[test]
    fn test_concat_and_comparison() {
        let s = sheet().put(a("A1"), CellValue::Text("ab".to_string()));
        assert_eq!(
            eval_on(&s, "A1&\"c\""),
            CellValue::Text("abc".to_string())
        );
        assert_eq!(eval_on(&s, "\"AB\"=A1"), CellValue::Bool(true));
        assert_eq!(eval_on(&s, "1<2"), CellValue::Bool(true));
        assert_eq!(eval_on(&s, "\"a\"<\"b\""), CellValue::Bool(true));
    }

    #[test]
    fn test_unknown_function_is_name_error() {
        assert_eq!(
            eval_on(&sheet(), "NOSUCHFN(1)"),
            CellValue::Error(CellError::Name)
        );
    }

    #[test]
    fn test_compare_type_ranking() {
        // number < text < bool
        assert_eq!(
            compare_values(&CellValue::Number(999.0), &CellValue::Text("a".into())),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&CellValue::Text("zzz".into()), &CellValue::Bool(false)),
            Ordering::Less
        );
    }

    // ----- wildcard / criteria ----------------------------------------------

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("a*", "apple"));
        assert!(wildcard_match("*le", "apple"));
        assert!(wildcard_match("a?ple", "apple"));
        assert!(wildcard_match("*p*e", "apple"));
        assert!(!wildcard_match("a?ple", "apples"));
        assert!(wildcard_match("APPLE", "apple"));
        assert!(!wildcard_match("b*", "apple"));
    }

    #[test]
    fn test_wildcard_tilde_escapes() {
        assert!(wildcard_match("2~*3", "2*3"));
        assert!(!wildcard_match("2~*3", "2x3"));
        assert!(wildcard_match("what~?", "what?"));
        assert!(!wildcard_match("what~?", "whatx"));
    }

    #[test]
    fn test_criteria_numeric_comparisons() {
        let c = Criteria::parse(&CellValue::Text(">=10".to_string()));
        assert!(c.matches(&CellValue::Number(10.0)));
        assert!(c.matches(&CellValue::Number(11.0)));
        assert!(!c.matches(&CellValue::Number(9.0)));
        assert!(!c.matches(&CellValue::Text("11".to_string())));

        let c = Criteria::parse(&CellValue::Text("<>5".to_string()));
        assert!(c.matches(&CellValue::Number(4.0)));
        assert!(!c.matches(&CellValue::Number(5.0)));
    }

    #[test]
    fn test_criteria_direct_number() {
        let c = Criteria::parse(&CellValue::Number(5.0));
        assert!(c.matches(&CellValue::Number(5.0)));
        assert!(!c.matches(&CellValue::Number(6.0)));
    }

    #[test]
    fn test_criteria_text_pattern() {
        let c = Criteria::parse(&CellValue::Text("ap*".to_string()));
        assert!(c.matches(&CellValue::Text("apple".to_string())));
        assert!(!c.matches(&CellValue::Text("grape".to_string())));
        assert!(!c.matches(&CellValue::Number(5.0)));
    }

    #[test]
    fn test_criteria_numeric_text() {
        let c = Criteria::parse(&CellValue::Text("5".to_string()));
        assert!(c.matches(&CellValue::Number(5.0)));
    }
}
