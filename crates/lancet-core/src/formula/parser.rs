//! nom-based formula parser.
//!
//! The input does NOT include the leading `=` (the OOXML file convention).
//!
//! Operator precedence, loosest to tightest:
//! 1. Comparison (`= <> < <= > >=`)
//! 2. Concatenation (`&`)
//! 3. Additive (`+ -`)
//! 4. Multiplicative (`* /`)
//! 5. Power (`^`)
//! 6. Unary prefix (`- +`) and postfix (`%`)
//! 7. Primary (literals, references, functions, parens)

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{char, multispace0},
    combinator::{map, opt, recognize, value},
    multi::many0,
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::addr::{ARef, Anchor, CellRange, Column, Row, SheetName};
use crate::error::{Error, Result};
use crate::formula::ast::{BinaryOp, CellRefExpr, RangeRefExpr, TExpr, UnaryOp};
use crate::value::CellError;

/// Parse a formula string (without the leading `=`) into a typed AST.
pub fn parse(input: &str) -> Result<TExpr> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::ParseError {
            input: input.to_string(),
            detail: "empty formula".to_string(),
        });
    }
    match parse_expr(trimmed) {
        Ok(("", expr)) => Ok(expr),
        Ok((remaining, _)) => Err(Error::ParseError {
            input: input.to_string(),
            detail: format!("unexpected trailing input: {remaining}"),
        }),
        Err(e) => Err(Error::ParseError {
            input: input.to_string(),
            detail: e.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Whitespace helper
// ---------------------------------------------------------------------------

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn fail(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Verify))
}

// ---------------------------------------------------------------------------
// Expression layers
// ---------------------------------------------------------------------------

fn parse_expr(input: &str) -> IResult<&str, TExpr> {
    let (input, first) = parse_concat(input)?;
    let (input, rest) = many0(pair(ws(parse_comparison_op), parse_concat))(input)?;
    Ok((input, fold_binary(first, rest)))
}

fn parse_comparison_op(input: &str) -> IResult<&str, BinaryOp> {
    alt((
        value(BinaryOp::Le, tag("<=")),
        value(BinaryOp::Ge, tag(">=")),
        value(BinaryOp::Ne, tag("<>")),
        value(BinaryOp::Lt, tag("<")),
        value(BinaryOp::Gt, tag(">")),
        value(BinaryOp::Eq, tag("=")),
    ))(input)
}

fn parse_concat(input: &str) -> IResult<&str, TExpr> {
    let (input, first) = parse_additive(input)?;
    let (input, rest) = many0(pair(ws(value(BinaryOp::Concat, tag("&"))), parse_additive))(input)?;
    Ok((input, fold_binary(first, rest)))
}

fn parse_additive(input: &str) -> IResult<&str, TExpr> {
    let (input, first) = parse_multiplicative(input)?;
    let (input, rest) = many0(pair(
        ws(alt((
            value(BinaryOp::Add, tag("+")),
            value(BinaryOp::Sub, tag("-")),
        ))),
        parse_multiplicative,
    ))(input)?;
    Ok((input, fold_binary(first, rest)))
}

fn parse_multiplicative(input: &str) -> IResult<&str, TExpr> {
    let (input, first) = parse_power(input)?;
    let (input, rest) = many0(pair(
        ws(alt((
            value(BinaryOp::Mul, tag("*")),
            value(BinaryOp::Div, tag("/")),
        ))),
        parse_power,
    ))(input)?;
    Ok((input, fold_binary(first, rest)))
}

fn parse_power(input: &str) -> IResult<&str, TExpr> {
    let (input, first) = parse_unary(input)?;
    let (input, rest) = many0(pair(ws(value(BinaryOp::Pow, tag("^"))), parse_unary))(input)?;
    Ok((input, fold_binary(first, rest)))
}

fn parse_unary(input: &str) -> IResult<&str, TExpr> {
    let input = input.trim_start();
    if let Ok((rest, _)) = tag::<_, _, nom::error::Error<&str>>("-")(input) {
        let (rest, operand) = parse_unary(rest)?;
        return Ok((
            rest,
            TExpr::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(operand),
            },
        ));
    }
    if let Ok((rest, _)) = tag::<_, _, nom::error::Error<&str>>("+")(input) {
        let (rest, operand) = parse_unary(rest)?;
        return Ok((
            rest,
            TExpr::Unary {
                op: UnaryOp::Pos,
                expr: Box::new(operand),
            },
        ));
    }
    let (input, expr) = parse_primary(input)?;
    let (input, pcts) = many0(ws(value(UnaryOp::Percent, tag("%"))))(input)?;
    let result = pcts.into_iter().fold(expr, |acc, op| TExpr::Unary {
        op,
        expr: Box::new(acc),
    });
    Ok((input, result))
}

fn parse_primary(input: &str) -> IResult<&str, TExpr> {
    let input = input.trim_start();
    alt((
        parse_paren,
        parse_string_literal,
        parse_error_literal,
        parse_bool_literal,
        parse_function_call,
        parse_ref,
        parse_number_literal,
    ))(input)
}

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

fn parse_number_literal(input: &str) -> IResult<&str, TExpr> {
    let (rest, text) = recognize(|i| {
        let (i, _) = take_while1(|c: char| c.is_ascii_digit())(i)?;
        let (i, _) = opt(pair(tag("."), take_while1(|c: char| c.is_ascii_digit())))(i)?;
        let (i, _) = opt(|i| {
            let (i, _) = tag_no_case::<_, _, nom::error::Error<&str>>("e")(i)?;
            let (i, _) = opt(alt((tag("+"), tag("-"))))(i)?;
            take_while1(|c: char| c.is_ascii_digit())(i)
        })(i)?;
        Ok((i, ()))
    })(input)?;
    let n: f64 = text.parse().map_err(|_| fail(input))?;
    Ok((rest, TExpr::Num(n)))
}

/// `"..."` with `""` as an escaped quote.
fn parse_string_literal(input: &str) -> IResult<&str, TExpr> {
    let (input, _) = tag("\"")(input)?;
    let mut out = String::new();
    let mut rest = input;
    loop {
        if rest.is_empty() {
            return Err(fail(rest));
        }
        if let Some(r) = rest.strip_prefix("\"\"") {
            out.push('"');
            rest = r;
        } else if let Some(r) = rest.strip_prefix('"') {
            return Ok((r, TExpr::Str(out)));
        } else {
            let c = rest.chars().next().unwrap();
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
}

fn parse_bool_literal(input: &str) -> IResult<&str, TExpr> {
    let (rest, val) = alt((
        value(true, tag_no_case("TRUE")),
        value(false, tag_no_case("FALSE")),
    ))(input)?;
    // "TRUE1" is an identifier and "TRUE(" a function call, not a boolean.
    if rest
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '(')
    {
        return Err(fail(input));
    }
    Ok((rest, TExpr::Bool(val)))
}

fn parse_error_literal(input: &str) -> IResult<&str, TExpr> {
    let (rest, code) = alt((
        tag("#DIV/0!"),
        tag("#VALUE!"),
        tag("#REF!"),
        tag("#NAME?"),
        tag("#NUM!"),
        tag("#NULL!"),
        tag("#N/A"),
    ))(input)?;
    let err = CellError::from_code(code).ok_or_else(|| fail(input))?;
    Ok((rest, TExpr::Err(err)))
}

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

/// A cell or range reference, optionally sheet-qualified.
fn parse_ref(input: &str) -> IResult<&str, TExpr> {
    let (input, sheet) = opt(parse_sheet_prefix)(input)?;
    let (input, (start, start_anchor)) = parse_cell_ref(input)?;
    if let Ok((rest, _)) = tag::<_, _, nom::error::Error<&str>>(":")(input) {
        let (rest, (end, end_anchor)) = parse_cell_ref(rest)?;
        return Ok((
            rest,
            TExpr::RangeRef(RangeRefExpr {
                sheet,
                range: CellRange::with_anchors(start, end, start_anchor, end_anchor),
            }),
        ));
    }
    Ok((
        input,
        TExpr::CellRef(CellRefExpr {
            sheet,
            aref: start,
            anchor: start_anchor,
        }),
    ))
}

/// One `[$]letters[$]digits` endpoint, validated against the Excel grid.
fn parse_cell_ref(input: &str) -> IResult<&str, (ARef, Anchor)> {
    let (input, abs_col) = map(opt(tag("$")), |o| o.is_some())(input)?;
    let (input, letters) = take_while1(|c: char| c.is_ascii_alphabetic())(input)?;
    if letters.len() > 3 {
        return Err(fail(input));
    }
    let (input, abs_row) = map(opt(tag("$")), |o| o.is_some())(input)?;
    let (input, digits) = take_while1(|c: char| c.is_ascii_digit())(input)?;
    // A reference must not run into more identifier characters
    // ("A1B" is a name, not a reference followed by "B").
    if input
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
    {
        return Err(fail(input));
    }
    let col = Column::from_name(letters).map_err(|_| fail(input))?;
    let number: u32 = digits.parse().map_err(|_| fail(input))?;
    let row = Row::from_number(number).map_err(|_| fail(input))?;
    Ok((
        input,
        (ARef::new(col, row), Anchor::from_flags(abs_col, abs_row)),
    ))
}

fn parse_sheet_prefix(input: &str) -> IResult<&str, SheetName> {
    alt((parse_quoted_sheet, parse_unquoted_sheet))(input)
}

fn parse_unquoted_sheet(input: &str) -> IResult<&str, SheetName> {
    let (rest, name) = take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '.')(input)?;
    let (rest, _) = tag("!")(rest)?;
    let sheet = SheetName::new(name).map_err(|_| fail(input))?;
    Ok((rest, sheet))
}

fn parse_quoted_sheet(input: &str) -> IResult<&str, SheetName> {
    let (mut rest, _) = tag("'")(input)?;
    let mut name = String::new();
    loop {
        if rest.is_empty() {
            return Err(fail(rest));
        }
        if let Some(r) = rest.strip_prefix("''") {
            name.push('\'');
            rest = r;
        } else if let Some(r) = rest.strip_prefix('\'') {
            let (r, _) = tag("!")(r)?;
            let sheet = SheetName::new(&name).map_err(|_| fail(input))?;
            return Ok((r, sheet));
        } else {
            let c = rest.chars().next().unwrap();
            name.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
}

// ---------------------------------------------------------------------------
// Function calls and parens
// ---------------------------------------------------------------------------

fn parse_function_call(input: &str) -> IResult<&str, TExpr> {
    // Names may carry the `_xlfn.` future-function prefix.
    let (rest, name) = recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        many0(take_while1(|c: char| {
            c.is_alphanumeric() || c == '_' || c == '.'
        })),
    ))(input)?;
    let (rest, _) = preceded(multispace0, char('('))(rest)?;
    let (rest, _) = multispace0(rest)?;
    // Empty argument list needs a special case so `NOW()` parses.
    if let Ok((rest, _)) = char::<_, nom::error::Error<&str>>(')')(rest) {
        return Ok((
            rest,
            TExpr::Func {
                name: canonical_function_name(name),
                args: vec![],
            },
        ));
    }
    let (rest, first) = parse_expr(rest)?;
    let (rest, mut more) = many0(preceded(ws(char(',')), parse_expr))(rest)?;
    let (rest, _) = preceded(multispace0, char(')'))(rest)?;
    let mut args = vec![first];
    args.append(&mut more);
    Ok((
        rest,
        TExpr::Func {
            name: canonical_function_name(name),
            args,
        },
    ))
}

fn canonical_function_name(raw: &str) -> String {
    let name = raw.strip_prefix("_xlfn.").unwrap_or(raw);
    name.to_ascii_uppercase()
}

fn parse_paren(input: &str) -> IResult<&str, TExpr> {
    let (input, _) = char('(')(input)?;
    let (input, expr) = ws(parse_expr)(input)?;
    let (input, _) = char(')')(input)?;
    Ok((input, TExpr::Paren(Box::new(expr))))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fold_binary(first: TExpr, rest: Vec<(BinaryOp, TExpr)>) -> TExpr {
    rest.into_iter().fold(first, |lhs, (op, rhs)| TExpr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

// =========================================================================
// Tests
// =========================================================================
