//! The formula engine: typed AST, parser/printer, anchor-aware shifting,
//! dependency graph, and evaluator with cached-result recalculation.

pub mod ast;
pub mod eval;
pub mod functions;
pub mod graph;
pub mod parser;
pub mod printer;
pub mod recalc;
pub mod shift;

pub use ast::{BinaryOp, CellRefExpr, RangeRefExpr, TExpr, UnaryOp};
pub use eval::{evaluate, CellProvider, Evaluator, SheetProvider, WorkbookProvider};
pub use graph::DependencyGraph;
pub use parser::parse;
pub use printer::print;
pub use shift::{shift, shift_formula};
