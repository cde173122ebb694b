//! The bit-exact table serialization format of spec §6: each action cell is
//! one of `"s" + state-id`, `"r" + production#`, `"acc"`, or (for goto cells)
//! a bare decimal state id. This is the boundary spec §9's open question
//! talks about — a first-class [`parsegen::lr_table::Action`]/
//! [`parsegen::lr_table::LRConflict`] only turns into one of these strings
//! here, at the serializer, never earlier.

use parsegen::grammar::{Grammar, Symbol};
use parsegen::lr_table::{Action, LRTable};
use parsegen_index::{NonTermIndex, ProdIndex, StateIndex, TermIndex};

/// `action[s][t]` rendered as spec §6's string alphabet.
pub fn action_cell(action: Action) -> String {
    match action {
        Action::Shift(StateIndex(s)) => format!("s{s}"),
        Action::Reduce(ProdIndex(p)) => format!("r{p}"),
        Action::Accept => "acc".to_string(),
        Action::Error => String::new(),
    }
}

/// `goto[s][n]` rendered as a bare decimal state id, or empty when absent.
pub fn goto_cell(goto: Option<StateIndex>) -> String {
    match goto {
        Some(StateIndex(s)) => s.to_string(),
        None => String::new(),
    }
}

/// Production metadata per spec §6: `[LHS-encoded-index, RHS-length]`;
/// production 0 (the augmented production) is always `[-1, -1]`.
pub fn production_entry(grammar: &Grammar, prod: ProdIndex) -> (i64, i64) {
    if prod == grammar.augmented_production() {
        return (-1, -1);
    }
    let production = &grammar.productions[prod];
    (production.lhs.0 as i64, production.rhs.len() as i64)
}

/// Symbol encoding of spec §6: non-terminals `1..N`, terminals
/// `N+1..N+T`, `$` receives a reserved index (`N+T+1`, one past the last
/// terminal, since terminal index 1 -- `$` itself -- is excluded from the
/// regular terminal range here to keep the two halves contiguous).
pub fn symbol_encoding(grammar: &Grammar, symbol: Symbol) -> usize {
    let nonterm_count = grammar.nonterminals.len();
    match symbol {
        Symbol::NonTerminal(NonTermIndex(n)) => n + 1,
        Symbol::Terminal(t) if t == grammar.stop_index => nonterm_count + grammar.term_count(),
        Symbol::Terminal(TermIndex(t)) => nonterm_count + t,
    }
}

/// A fully-serialized LR table: one row of action-cell strings per state
/// (indexed by terminal), one row of goto-cell strings per state (indexed by
/// non-terminal), and the production metadata table.
pub struct SerializedLrTable {
    pub action_rows: Vec<Vec<String>>,
    pub goto_rows: Vec<Vec<String>>,
    pub productions: Vec<(i64, i64)>,
}

pub fn serialize_lr_table(grammar: &Grammar, table: &LRTable) -> SerializedLrTable {
    let term_count = grammar.term_count();
    let nonterm_count = grammar.nonterminals.len();
    let state_count = table.action.len();

    let action_rows = (0..state_count)
        .map(|s| {
            (0..term_count)
                .map(|t| action_cell(table.action(StateIndex(s), TermIndex(t))))
                .collect()
        })
        .collect();

    let goto_rows = (0..state_count)
        .map(|s| {
            (0..nonterm_count)
                .map(|n| goto_cell(table.goto(StateIndex(s), NonTermIndex(n))))
                .collect()
        })
        .collect();

    let productions = grammar.productions.iter().map(|p| production_entry(grammar, p.number)).collect();

    SerializedLrTable { action_rows, goto_rows, productions }
}
