//! Formula printing.
//!
//! `print` is the inverse of the parser up to AST equality: for every
//! parseable formula `s`, `parse(print(parse(s)?))? == parse(s)?`. Since
//! `Paren` nodes survive parsing, no precedence analysis is needed here.

use std::fmt::Write as _;

use crate::formula::ast::{RangeRefExpr, TExpr, UnaryOp};

/// Render an AST back to formula text (without the leading `=`).
pub fn print(expr: &TExpr) -> String {
    let mut out = String::new();
    write_expr(expr, &mut out);
    out
}

fn write_expr(expr: &TExpr, out: &mut String) {
    match expr {
        TExpr::Num(n) => write_number(*n, out),
        TExpr::Str(s) => {
            out.push('"');
            out.push_str(&s.replace('"', "\"\""));
            out.push('"');
        }
        TExpr::Bool(b) => out.push_str(if *b { "TRUE" } else { "FALSE" }),
        TExpr::Err(e) => out.push_str(e.code()),
        TExpr::CellRef(r) => {
            if let Some(sheet) = &r.sheet {
                let _ = write!(out, "{}!", sheet.quoted());
            }
            out.push_str(&r.aref.to_a1_anchored(r.anchor));
        }
        TExpr::RangeRef(r) => write_range(r, out),
        TExpr::Unary { op, expr } => match op {
            UnaryOp::Neg => {
                out.push('-');
                write_expr(expr, out);
            }
            UnaryOp::Pos => {
                out.push('+');
                write_expr(expr, out);
            }
            UnaryOp::Percent => {
                write_expr(expr, out);
                out.push('%');
            }
        },
        TExpr::Binary { op, lhs, rhs } => {
            write_expr(lhs, out);
            out.push_str(op.symbol());
            write_expr(rhs, out);
        }
        TExpr::Func { name, args } => {
            out.push_str(name);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_expr(arg, out);
            }
            out.push(')');
        }
        TExpr::Paren(inner) => {
            out.push('(');
            write_expr(inner, out);
            out.push(')');
        }
    }
}

/// A range always prints both endpoints, even when 1x1, so the printed
/// text re-parses as a range and not a cell.
fn write_range(r: &RangeRefExpr, out: &mut String) {
    if let Some(sheet) = &r.sheet {
        let _ = write!(out, "{}!", sheet.quoted());
    }
    let _ = write!(
        out,
        "{}:{}",
        r.range.start.to_a1_anchored(r.range.start_anchor),
        r.range.end.to_a1_anchored(r.range.end_anchor)
    );
}

fn write_number(n: f64, out: &mut String) {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        let _ = write!(out, "{}", n as i64);
    } else {
        let _ = write!(out, "{n}");
    }
}
