use std::collections::BTreeMap;
use std::rc::Rc;

use lfkernel_term::{Pattern, QName};

use crate::error::CompileError;
use crate::problem::{Guard, MatchProblem, MillerProblem, SyntacticPosition};
use crate::rule::{CompiledRule, Row};
use crate::tree::{CaseShape, DTree};

/// Compiles a non-empty set of rules sharing a head symbol into a
/// decision tree (spec §4.E). Returns the pivot (the stack column count
/// the reducer must have available before attempting a match) alongside
/// the tree.
pub fn compile(rules: &[CompiledRule]) -> Result<(usize, DTree), CompileError> {
    let head = &rules[0].head;
    for rule in &rules[1..] {
        if rule.head != *head {
            return Err(CompileError::HeadSymbolMismatch {
                first: head.clone(),
                second: rule.head.clone(),
            });
        }
    }

    let pivot = rules.iter().map(|r| r.patterns.len()).max().unwrap_or(0);
    let mut next_joker = 0usize;
    let rows: Vec<Row> = rules.iter().map(|r| Row::from_rule(r, pivot, &mut next_joker)).collect();

    let tree = compile_rows(rows)?.expect("a non-empty rule set always compiles to a tree");
    Ok((pivot, (*tree).clone()))
}

fn compile_rows(rows: Vec<Row>) -> Result<Option<Rc<DTree>>, CompileError> {
    if rows.is_empty() {
        return Ok(None);
    }
    let width = rows[0].columns.len();

    let chosen_col = (0..width).find(|&col| !rows.iter().all(|r| r.columns[col].is_variable_like()));

    let Some(col) = chosen_col else {
        // Every surviving column is variable-like: every remaining row is a
        // Test leaf, tried in source order (spec §4.E step 2, "no such
        // column exists" branch).
        let mut iter = rows.into_iter();
        let first = iter.next().unwrap();
        let rest: Vec<Row> = iter.collect();
        let default = compile_rows(rest)?;
        return Ok(Some(Rc::new(build_leaf(first, default))));
    };

    let mut arities_seen: BTreeMap<QName, usize> = BTreeMap::new();
    let mut bucket_order: Vec<CaseShape> = vec![];
    let mut buckets: Vec<(CaseShape, Vec<Row>)> = vec![];
    let mut var_rows: Vec<Row> = vec![];

    for row in rows {
        let pat = row.columns[col].clone();
        match pat {
            Pattern::Pattern(qname, subs) => {
                if let Some(&prior_arity) = arities_seen.get(&qname) {
                    if prior_arity != subs.len() {
                        return Err(CompileError::ArityInnerMismatch {
                            symbol: qname,
                            first_arity: prior_arity,
                            second_arity: subs.len(),
                        });
                    }
                } else {
                    arities_seen.insert(qname.clone(), subs.len());
                }
                let shape = CaseShape::Const(qname, subs.len());
                let depth = row.depths[col];
                let mut new_row = row;
                for sub in subs {
                    new_row.columns.push(sub);
                    new_row.depths.push(depth);
                }
                insert_into_bucket(&mut bucket_order, &mut buckets, shape, new_row);
            }
            Pattern::Lambda(_, inner) => {
                let shape = CaseShape::Lambda;
                let depth = row.depths[col];
                let mut new_row = row;
                new_row.columns.push(*inner);
                new_row.depths.push(depth + 1);
                insert_into_bucket(&mut bucket_order, &mut buckets, shape, new_row);
            }
            _ => var_rows.push(row),
        }
    }

    let default = compile_rows(var_rows.clone())?;

    let mut cases = Vec::with_capacity(bucket_order.len());
    for shape in bucket_order {
        let (_, mut bucket_rows) = buckets.iter_mut().find(|(s, _)| *s == shape).map(|(s, r)| (s.clone(), std::mem::take(r))).unwrap();
        let arity = match &shape {
            CaseShape::Const(_, k) => *k,
            CaseShape::Lambda => 1,
            CaseShape::Db(_, k) => *k,
        };
        for var_row in &var_rows {
            let mut padded = var_row.clone();
            let base_depth = var_row.depths[col];
            for i in 0..arity {
                padded.columns.push(Pattern::Joker(0));
                let d = if matches!(shape, CaseShape::Lambda) { base_depth + 1 } else { base_depth };
                let _ = i;
                padded.depths.push(d);
            }
            bucket_rows.push(padded);
        }
        let subtree = compile_rows(bucket_rows)?
            .expect("a bucket always has at least the rigid row that created it");
        cases.push((shape, subtree));
    }

    Ok(Some(Rc::new(DTree::Switch { column: col, cases, default })))
}

fn insert_into_bucket(
    order: &mut Vec<CaseShape>,
    buckets: &mut Vec<(CaseShape, Vec<Row>)>,
    shape: CaseShape,
    row: Row,
) {
    if let Some((_, rows)) = buckets.iter_mut().find(|(s, _)| *s == shape) {
        rows.push(row);
    } else {
        order.push(shape.clone());
        buckets.push((shape, vec![row]));
    }
}

struct Occurrence {
    var_index: usize,
    column: usize,
    depth: usize,
    applied: Vec<usize>,
}

fn build_leaf(row: Row, default: Option<Rc<DTree>>) -> DTree {
    let mut occurrences: Vec<Occurrence> = vec![];
    let mut brackets: Vec<(usize, Rc<lfkernel_term::Term>)> = vec![];

    for (col, pat) in row.columns.iter().enumerate() {
        let depth = row.depths[col];
        match pat {
            Pattern::Var(_, var_index, args) => {
                let applied: Vec<usize> = args
                    .iter()
                    .filter_map(|a| match a {
                        Pattern::Var(_, bound_index, _) => Some(*bound_index),
                        _ => None,
                    })
                    .collect();
                occurrences.push(Occurrence { var_index: *var_index, column: col, depth, applied });
            }
            Pattern::Brackets(t) => brackets.push((col, t.clone())),
            Pattern::Joker(_) => {}
            Pattern::Pattern(_, _) | Pattern::Lambda(_, _) => {
                unreachable!("leaf rows only contain variable-like columns")
            }
        }
    }

    let mut by_var: BTreeMap<usize, Vec<&Occurrence>> = BTreeMap::new();
    for occ in &occurrences {
        by_var.entry(occ.var_index).or_default().push(occ);
    }

    let mut guards = vec![];
    let is_syntactic = occurrences.iter().all(|o| o.applied.is_empty());

    let mut syntactic_positions = vec![];
    let mut miller_problems = vec![];

    for (_, occs) in &by_var {
        let first = occs[0];
        for other in &occs[1..] {
            guards.push(Guard::Linearity(first.column, other.column));
        }
        if is_syntactic {
            syntactic_positions.push(SyntacticPosition { column: first.column, depth: first.depth });
        } else {
            miller_problems.push(MillerProblem {
                column: first.column,
                depth: first.depth,
                bound_vars: first.applied.clone(),
            });
        }
    }

    for (col, term) in brackets {
        guards.push(Guard::Bracket(col, term));
    }

    let problem = if is_syntactic {
        MatchProblem::Syntactic(syntactic_positions)
    } else {
        MatchProblem::MillerPattern(miller_problems)
    };

    DTree::Test { rule_name: row.name, problem, guards, rhs: row.rhs, default }
}
