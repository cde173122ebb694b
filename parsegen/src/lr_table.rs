//! C5: projects the canonical collection onto an action/goto table,
//! resolving or reporting shift/reduce and reduce/reduce conflicts
//!.

use std::collections::HashMap;

use parsegen_index::{NonTermIndex, NonTermVec, ProdIndex, StateIndex, StateVec, TermIndex, TermVec};

use crate::canonical::CanonicalCollection;
use crate::grammar::{Associativity, Grammar, Symbol};
use crate::sets::SetsEngine;

/// A cell of the action/goto table (spec §3 `LR Table`). Shift and goto
/// are modeled as distinct variants (rather than sharing a single "next
/// state" slot) because they index different symbol spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(StateIndex),
    Reduce(ProdIndex),
    Accept,
    Error,
}

/// A first-class conflict record (spec §9's open question: not a `"a/b"`
/// string — that's only a serialization-boundary concern for callers that
/// want it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LRConflict {
    ShiftReduce { state: StateIndex, terminal: String, shift_to: StateIndex, reduce_prod: ProdIndex },
    ReduceReduce { state: StateIndex, terminal: String, prod_a: ProdIndex, prod_b: ProdIndex },
}

pub struct LRTable {
    pub action: StateVec<TermVec<Action>>,
    pub goto: StateVec<NonTermVec<Option<StateIndex>>>,
    /// Conflicts found, whether or not `resolveConflicts` papered over them
    /// in `action`/`goto` (spec §4.4 "unresolved conflicts are retained in
    /// the table but flagged").
    pub conflicts: Vec<LRConflict>,
}

impl LRTable {
    /// Builds the table for `grammar`'s already-constructed canonical
    /// collection. `resolve_conflicts` mirrors spec §6's recognized option
    /// of the same name.
    pub fn build(grammar: &Grammar, sets: &SetsEngine, collection: &CanonicalCollection, resolve_conflicts: bool) -> Self {
        let term_count = grammar.terminals.len();
        let nonterm_count = grammar.nonterminals.len();
        let mut action: StateVec<TermVec<Action>> =
            collection.states.iter().map(|_| (0..term_count).map(|_| Action::Error).collect()).collect();
        let mut goto: StateVec<NonTermVec<Option<StateIndex>>> =
            collection.states.iter().map(|_| (0..nonterm_count).map(|_| None).collect()).collect();
        let mut conflicts = vec![];

        for state in collection.states.iter() {
            // Shifts and gotos: one per item with the dot before a symbol
            // that has a recorded transition.
            for (&symbol, &target) in &state.transitions {
                match symbol {
                    Symbol::Terminal(t) => {
                        set_action(&mut action[state.id], t, Action::Shift(target), state.id, grammar, &mut conflicts, resolve_conflicts);
                    }
                    Symbol::NonTerminal(n) => {
                        goto[state.id][n] = Some(target);
                    }
                }
            }

            // Reduces and the accept action.
            for item in &state.items {
                if item.is_accept(grammar) {
                    set_action(&mut action[state.id], grammar.stop_index, Action::Accept, state.id, grammar, &mut conflicts, resolve_conflicts);
                } else if item.is_reduce(grammar) {
                    let reduce_set = item.reduce_set(grammar, sets);
                    for t in reduce_set.terminals(grammar) {
                        set_action(&mut action[state.id], t, Action::Reduce(item.production), state.id, grammar, &mut conflicts, resolve_conflicts);
                    }
                }
            }
        }

        LRTable { action, goto, conflicts }
    }

    pub fn action(&self, state: StateIndex, terminal: TermIndex) -> Action {
        self.action[state][terminal]
    }

    pub fn goto(&self, state: StateIndex, nonterminal: NonTermIndex) -> Option<StateIndex> {
        self.goto[state][nonterminal]
    }

    pub fn is_conflict_free(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Assigns `action[t]`, resolving a collision per spec §4.4's precedence
/// rules when `resolve_conflicts` is set, else just recording the conflict
/// and keeping whichever action arrived first (spec: "the conflict is
/// reported").
#[allow(clippy::too_many_arguments)]
fn set_action(
    row: &mut TermVec<Action>,
    terminal: TermIndex,
    new_action: Action,
    state: StateIndex,
    grammar: &Grammar,
    conflicts: &mut Vec<LRConflict>,
    resolve_conflicts: bool,
) {
    let existing = row[terminal];
    match existing {
        Action::Error => {
            row[terminal] = new_action;
        }
        _ if existing == new_action => {}
        Action::Shift(shift_to) if matches!(new_action, Action::Reduce(_)) => {
            let Action::Reduce(reduce_prod) = new_action else { unreachable!() };
            conflicts.push(LRConflict::ShiftReduce {
                state,
                terminal: grammar.terminals[terminal].name.clone(),
                shift_to,
                reduce_prod,
            });
            if resolve_conflicts {
                row[terminal] = resolve_shift_reduce(grammar, terminal, reduce_prod, shift_to);
            }
        }
        Action::Reduce(existing_prod) if matches!(new_action, Action::Shift(_)) => {
            let Action::Shift(shift_to) = new_action else { unreachable!() };
            conflicts.push(LRConflict::ShiftReduce {
                state,
                terminal: grammar.terminals[terminal].name.clone(),
                shift_to,
                reduce_prod: existing_prod,
            });
            if resolve_conflicts {
                row[terminal] = resolve_shift_reduce(grammar, terminal, existing_prod, shift_to);
            }
        }
        Action::Reduce(existing_prod) => {
            let Action::Reduce(new_prod) = new_action else { unreachable!() };
            let (prod_a, prod_b) = if existing_prod.0 < new_prod.0 { (existing_prod, new_prod) } else { (new_prod, existing_prod) };
            conflicts.push(LRConflict::ReduceReduce { state, terminal: grammar.terminals[terminal].name.clone(), prod_a, prod_b });
            // Keep the lower-numbered production regardless of
            // resolve_conflicts: reduce/reduce always resolves this way
            //, only the report is gated on the flag being off.
            row[terminal] = Action::Reduce(prod_a);
        }
        _ => {
            // Two shifts to different states or two accepts cannot happen
            // for a deterministic grammar's canonical collection.
        }
    }
}

/// shift/reduce resolution by precedence/associativity. Keeps
/// `Shift` when either side's precedence is undeclared.
fn resolve_shift_reduce(grammar: &Grammar, terminal: TermIndex, reduce_prod: ProdIndex, shift_to: StateIndex) -> Action {
    let p = grammar.production_precedence(reduce_prod);
    let q = grammar.operator_precedence.get(&terminal).copied();
    match (p, q) {
        (Some(p), Some(q)) if q.level > p.level => Action::Shift(shift_to),
        (Some(p), Some(q)) if p.level > q.level => Action::Reduce(reduce_prod),
        (Some(_), Some(q)) => match q.assoc {
            Associativity::Left => Action::Reduce(reduce_prod),
            Associativity::Right => Action::Shift(shift_to),
            Associativity::NonAssoc => Action::Error,
        },
        _ => Action::Shift(shift_to),
    }
}
