//! Typed AST for parsed formulas.
//!
//! References carry validated [`ARef`]/[`CellRange`] coordinates and their
//! anchors, so shifting and dependency analysis never re-parse text.
//! `Paren` nodes are kept from the source text so printing round-trips.

use crate::addr::{ARef, Anchor, CellRange, SheetName};
use crate::value::CellError;

/// A single-cell reference inside a formula.
#[derive(Debug, Clone, PartialEq)]
pub struct CellRefExpr {
    pub sheet: Option<SheetName>,
    pub aref: ARef,
    pub anchor: Anchor,
}

/// A range reference inside a formula.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeRefExpr {
    pub sheet: Option<SheetName>,
    pub range: CellRange,
}

/// Binary operators in precedence order (loosest first): comparison,
/// concatenation, additive, multiplicative, power.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Concat => "&",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

/// Unary operators: prefix `-`/`+` and postfix `%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Percent,
}

/// A typed formula expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TExpr {
    /// Numeric literal.
    Num(f64),
    /// String literal (quotes and `""` escapes removed).
    Str(String),
    /// Boolean literal.
    Bool(bool),
    /// Error literal, e.g. `#REF!`.
    Err(CellError),
    /// Cell reference, possibly sheet-qualified and anchored.
    CellRef(CellRefExpr),
    /// Range reference, possibly sheet-qualified; endpoint anchors live on
    /// the range.
    RangeRef(RangeRefExpr),
    /// Unary operation.
    Unary { op: UnaryOp, expr: Box<TExpr> },
    /// Binary operation.
    Binary {
        op: BinaryOp,
        lhs: Box<TExpr>,
        rhs: Box<TExpr>,
    },
    /// Function call.
    Func { name: String, args: Vec<TExpr> },
    /// Parenthesized subexpression, kept for faithful printing.
    Paren(Box<TExpr>),
}

impl TExpr {
    /// Unanchored cell reference on the current sheet.
    pub fn cell(aref: ARef) -> Self {
        TExpr::CellRef(CellRefExpr {
            sheet: None,
            aref,
            anchor: Anchor::Relative,
        })
    }

    /// Range reference on the current sheet.
    pub fn range(range: CellRange) -> Self {
        TExpr::RangeRef(RangeRefExpr { sheet: None, range })
    }

    /// Walk the expression, visiting every node.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a TExpr)) {
        f(self);
        match self {
            TExpr::Unary { expr, .. } | TExpr::Paren(expr) => expr.visit(f),
            TExpr::Binary { lhs, rhs, .. } => {
                lhs.visit(f);
                rhs.visit(f);
            }
            TExpr::Func { args, .. } => {
                for arg in args {
                    arg.visit(f);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_counts_nodes() {
        // 1 + SUM(A1:A3)
        let expr = TExpr::Binary {
            op: BinaryOp::Add,
            lhs: Box::new(TExpr::Num(1.0)),
            rhs: Box::new(TExpr::Func {
                name: "SUM".to_string(),
                args: vec![TExpr::range(CellRange::parse("A1:A3").unwrap())],
            }),
        };
        let mut count = 0;
        expr.visit(&mut |_| count += 1);
        assert_eq!(count, 4);
    }

    #[test]
    fn test_binary_op_symbols() {
        assert_eq!(BinaryOp::Ne.symbol(), "<>");
        assert_eq!(BinaryOp::Concat.symbol(), "&");
        assert_eq!(BinaryOp::Pow.symbol(), "^");
    }
}
