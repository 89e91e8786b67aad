//! Cached-value recalculation over a sheet.
//!
//! Evaluation is best-effort: a formula that fails to parse has its cache
//! cleared; one that evaluates to an error caches that error value.
//! Dependency cycles are surfaced as [`Error::CycleError`] before any cell
//! is touched.

use std::collections::BTreeSet;

use crate::addr::ARef;
use crate::error::Result;
use crate::formula::eval::{Evaluator, SheetProvider};
use crate::formula::graph::DependencyGraph;
use crate::formula::parser;
use crate::sheet::Sheet;
use crate::value::CellValue;

/// Recalculate every formula on the sheet in dependency order.
pub fn recalculate(sheet: &Sheet) -> Result<Sheet> {
    let graph = DependencyGraph::from_sheet(sheet);
    let order = graph.topological_order()?;
    // Formula cells outside the graph (no references at all) still need a
    // refresh.
    let mut targets: Vec<ARef> = order;
    let in_order: BTreeSet<ARef> = targets.iter().copied().collect();
    for (aref, cell) in sheet.iter_cells() {
        if matches!(cell.value, CellValue::Formula { .. }) && !in_order.contains(&aref) {
            targets.push(aref);
        }
    }
    Ok(recalc_cells(sheet, &targets))
}

/// Recalculate only the transitive dependents of `modified`, in
/// dependency order.
pub fn recalculate_dependents(sheet: &Sheet, modified: &BTreeSet<ARef>) -> Result<Sheet> {
    let graph = DependencyGraph::from_sheet(sheet);
    let affected = graph.transitive_dependents(modified);
    if affected.is_empty() {
        return Ok(sheet.clone());
    }
    let order = graph.topological_order()?;
    let targets: Vec<ARef> = order
        .into_iter()
        .filter(|aref| affected.contains(aref))
        .collect();
    Ok(recalc_cells(sheet, &targets))
}

/// Refresh the cache of each formula cell in `targets`, left to right.
/// Later cells see earlier refreshed caches through the provider.
fn recalc_cells(sheet: &Sheet, targets: &[ARef]) -> Sheet {
    let mut current = sheet.clone();
    for &aref in targets {
        let Some(cell) = current.get(aref) else {
            continue;
        };
        let CellValue::Formula { expr, .. } = &cell.value else {
            continue;
        };
        let expr = expr.clone();
        let new_value = match parser::parse(&expr) {
            Ok(ast) => {
                let result = {
                    let provider = SheetProvider { sheet: &current };
                    let mut evaluator = Evaluator::new(&provider);
                    evaluator.eval(&ast)
                };
                match result {
                    Ok(value) => CellValue::formula_with_cache(&expr, value),
                    Err(e) => CellValue::formula_with_cache(&expr, CellValue::Error(e)),
                }
            }
            // Unparseable: clear the stale cache rather than guessing.
            Err(_) => CellValue::formula(&expr),
        };
        current = current.put(aref, new_value);
    }
    current
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::SheetName;
    use crate::error::Error;
    use crate::value::CellError;

    fn a(s: &str) -> ARef {
        ARef::parse(s).unwrap()
    }

    fn sheet() -> Sheet {
        Sheet::new(SheetName::new("S").unwrap())
    }

    fn cached(sheet: &Sheet, cell: &str) -> Option<CellValue> {
        match sheet.value(a(cell)) {
            CellValue::Formula { cached, .. } => cached.map(|b| *b),
            other => panic!("expected formula at {cell}, got {other:?}"),
        }
    }

    #[test]
    fn test_recalculate_fills_caches() {
        let s = sheet()
            .put(a("A1"), 10.0.into())
            .put(a("B1"), 20.0.into())
            .put(a("C1"), CellValue::formula("A1+B1"));
        let s = recalculate(&s).unwrap();
        assert_eq!(cached(&s, "C1"), Some(CellValue::Number(30.0)));
    }

    #[test]
    fn test_recalculate_chain_in_order() {
        let s = sheet()
            .put(a("A1"), 2.0.into())
            .put(a("B1"), CellValue::formula("A1*10"))
            .put(a("C1"), CellValue::formula("B1+1"));
        let s = recalculate(&s).unwrap();
        assert_eq!(cached(&s, "B1"), Some(CellValue::Number(20.0)));
        assert_eq!(cached(&s, "C1"), Some(CellValue::Number(21.0)));
    }

    #[test]
    fn test_recalculate_dependents_scenario() {
        // Change A1, then refresh only its dependents.
        let s = sheet()
            .put(a("A1"), 10.0.into())
            .put(a("B1"), 20.0.into())
            .put(a("C1"), CellValue::formula("A1+B1"));
        let s = recalculate(&s).unwrap();
        assert_eq!(cached(&s, "C1"), Some(CellValue::Number(30.0)));

        let s = s.put(a("A1"), 50.0.into());
        let s = recalculate_dependents(&s, &BTreeSet::from([a("A1")])).unwrap();
        assert_eq!(cached(&s, "C1"), Some(CellValue::Number(70.0)));
    }

    #[test]
    fn test_recalculate_dependents_leaves_unrelated_caches() {
        let s = sheet()
            .put(a("A1"), 1.0.into())
            .put(
                a("B1"),
                CellValue::formula_with_cache("A1*2", CellValue::Number(999.0)),
            )
            .put(
                a("D1"),
                CellValue::formula_with_cache("C1*2", CellValue::Number(123.0)),
            );
        let s = recalculate_dependents(&s, &BTreeSet::from([a("A1")])).unwrap();
        // B1 depends on A1 and refreshes; D1 does not and keeps its stale cache.
        assert_eq!(cached(&s, "B1"), Some(CellValue::Number(2.0)));
        assert_eq!(cached(&s, "D1"), Some(CellValue::Number(123.0)));
    }

    #[test]
    fn test_cycle_is_reported_not_evaluated() {
        let s = sheet()
            .put(a("A1"), CellValue::formula("B1"))
            .put(a("B1"), CellValue::formula("A1"));
        match recalculate(&s) {
            Err(Error::CycleError { cells }) => {
                assert_eq!(cells, vec!["A1".to_string(), "B1".to_string()]);
            }
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn test_eval_error_is_cached_as_error() {
        let s = sheet().put(a("A1"), CellValue::formula("1/0"));
        let s = recalculate(&s).unwrap();
        assert_eq!(cached(&s, "A1"), Some(CellValue::Error(CellError::Div0)));
    }

    #[test]
    fn test_unparseable_formula_clears_cache() {
        let s = sheet().put(
            a("A1"),
            CellValue::formula_with_cache("###garbage", CellValue::Number(1.0)),
        );
        let s = recalculate(&s).unwrap();
        assert_eq!(cached(&s, "A1"), None);
    }

    #[test]
    fn test_constant_formula_without_refs_still_refreshes() {
        let s = sheet().put(a("A1"), CellValue::formula("1+1"));
        let s = recalculate(&s).unwrap();
        assert_eq!(cached(&s, "A1"), Some(CellValue::Number(2.0)));
    }
}
