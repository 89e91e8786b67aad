//! The formula dependency graph.
//!
//! Two adjacency maps over [`ARef`]: what each formula cell reads, and who
//! reads each cell. Cycles are a data property detected by Tarjan's SCC,
//! not a type error. Cross-sheet references are not edges -- the graph is
//! scoped to a single sheet.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::addr::ARef;
use crate::error::{Error, Result};
use crate::formula::ast::TExpr;
use crate::formula::parser;
use crate::sheet::Sheet;
use crate::value::CellValue;

/// Directed dependency graph over a sheet's formula cells.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// cell -> cells its formula reads.
    reads: BTreeMap<ARef, BTreeSet<ARef>>,
    /// cell -> cells whose formulas read it.
    read_by: BTreeMap<ARef, BTreeSet<ARef>>,
}

impl DependencyGraph {
    /// Build the graph by parsing every formula cell. Unparseable formulas
    /// contribute no edges. Range references are expanded against cells
    /// present on the sheet, so a whole-column `SUM` does not materialize
    /// a million nodes.
    pub fn from_sheet(sheet: &Sheet) -> Self {
        let mut graph = Self::default();
        for (aref, cell) in sheet.iter_cells() {
            let CellValue::Formula { expr, .. } = &cell.value else {
                continue;
            };
            let Ok(ast) = parser::parse(expr) else {
                continue;
            };
            for dep in references_of(&ast, sheet) {
                graph.add_edge(dep, aref);
            }
        }
        graph
    }

    /// Record that `reader` reads `source`.
    pub fn add_edge(&mut self, source: ARef, reader: ARef) {
        self.reads.entry(reader).or_default().insert(source);
        self.read_by.entry(source).or_default().insert(reader);
        self.reads.entry(source).or_default();
        self.read_by.entry(reader).or_default();
    }

    /// What this cell's formula reads.
    pub fn dependencies(&self, aref: ARef) -> BTreeSet<ARef> {
        self.reads.get(&aref).cloned().unwrap_or_default()
    }

    /// Who reads this cell.
    pub fn dependents(&self, aref: ARef) -> BTreeSet<ARef> {
        self.read_by.get(&aref).cloned().unwrap_or_default()
    }

    /// Forward BFS from the seeds: every cell whose value can change when
    /// any seed changes. Seeds themselves are included only if reachable.
    pub fn transitive_dependents(&self, seeds: &BTreeSet<ARef>) -> BTreeSet<ARef> {
        let mut out = BTreeSet::new();
        let mut queue: Vec<ARef> = seeds.iter().copied().collect();
        while let Some(cell) = queue.pop() {
            if let Some(readers) = self.read_by.get(&cell) {
                for &reader in readers {
                    if out.insert(reader) {
                        queue.push(reader);
                    }
                }
            }
        }
        out
    }

    /// All nodes, sorted.
    pub fn nodes(&self) -> Vec<ARef> {
        self.reads.keys().copied().collect()
    }

    /// A dependency-first ordering of every node: for every edge
    /// `source -> reader`, the source appears before the reader. Fails
    /// with [`Error::CycleError`] listing every cell that participates in
    /// a cycle.
    pub fn topological_order(&self) -> Result<Vec<ARef>> {
        let nodes = self.nodes();
        let index_of: HashMap<ARef, usize> =
            nodes.iter().enumerate().map(|(i, &a)| (a, i)).collect();
        let succs: Vec<Vec<usize>> = nodes
            .iter()
            .map(|a| {
                self.read_by
                    .get(a)
                    .map(|readers| readers.iter().map(|r| index_of[r]).collect())
                    .unwrap_or_default()
            })
            .collect();

        let sccs = tarjan_sccs(&succs);

        let mut cycle_cells = BTreeSet::new();
        for scc in &sccs {
            let is_cycle = scc.len() > 1 || succs[scc[0]].contains(&scc[0]);
            if is_cycle {
                cycle_cells.extend(scc.iter().map(|&i| nodes[i]));
            }
        }
        if !cycle_cells.is_empty() {
            return Err(Error::CycleError {
                cells: cycle_cells.iter().map(|a| a.to_a1()).collect(),
            });
        }

        // Tarjan emits an SCC only after every SCC reachable from it, so
        // reversing the emission order puts sources before readers.
        Ok(sccs.iter().rev().map(|scc| nodes[scc[0]]).collect())
    }
}

/// Iterative Tarjan strongly-connected components. Returns SCCs in the
/// order they complete (reverse topological over the condensation).
fn tarjan_sccs(succs: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = succs.len();
    let mut index: Vec<Option<u32>> = vec![None; n];
    let mut low: Vec<u32> = vec![0; n];
    let mut on_stack: Vec<bool> = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut counter: u32 = 0;
    let mut sccs: Vec<Vec<usize>> = Vec::new();

    for root in 0..n {
        if index[root].is_some() {
            continue;
        }
        let mut call_stack: Vec<(usize, usize)> = vec![(root, 0)];
        while let Some(&mut (v, ref mut next_succ)) = call_stack.last_mut() {
            if *next_succ == 0 {
                index[v] = Some(counter);
                low[v] = counter;
                counter += 1;
                stack.push(v);
                on_stack[v] = true;
            }
            if *next_succ < succs[v].len() {
                let w = succs[v][*next_succ];
                *next_succ += 1;
                match index[w] {
                    None => call_stack.push((w, 0)),
                    Some(w_index) => {
                        if on_stack[w] {
                            low[v] = low[v].min(w_index);
                        }
                    }
                }
            } else {
                if low[v] == index[v].unwrap() {
                    let mut scc = Vec::new();
                    loop {
                        let w = stack.pop().unwrap();
                        on_stack[w] = false;
                        scc.push(w);
                        if w == v {
                            break;
                        }
                    }
                    scc.sort_unstable();
                    sccs.push(scc);
                }
                call_stack.pop();
                if let Some(&mut (parent, _)) = call_stack.last_mut() {
                    low[parent] = low[parent].min(low[v]);
                }
            }
        }
    }
    sccs
}

/// Collect the single-sheet cell references an expression reads. Ranges
/// are intersected with cells present on the sheet.
fn references_of(ast: &TExpr, sheet: &Sheet) -> BTreeSet<ARef> {
    let mut refs = BTreeSet::new();
    ast.visit(&mut |node| match node {
        TExpr::CellRef(r) if r.sheet.is_none() => {
            refs.insert(r.aref);
        }
        TExpr::RangeRef(r) if r.sheet.is_none() => {
            for (aref, _) in sheet.iter_cells() {
                if r.range.contains(aref) {
                    refs.insert(aref);
                }
            }
        }
        _ => {}
    });
    refs
}

// =========================================================================
// Tests
// =========================================================================
