//! C6: the LL(1) predictive table, built straight from
//! Predict sets rather than a canonical collection — LL(1) has no states.

use std::collections::HashMap;

use parsegen_index::{NonTermIndex, NonTermVec, ProdIndex, TermIndex, TermVec};

use crate::grammar::Grammar;
use crate::sets::SetsEngine;

/// Spec §9's open question resolved for LL(1) the same way as LR: a
/// first-class record, not a formatted string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LLConflict {
    pub nonterminal: String,
    pub terminal: String,
    pub productions: Vec<ProdIndex>,
}

pub struct LLTable {
    /// `table[nonterminal][terminal]` is the production to expand by, if
    /// any entry was assigned.
    table: NonTermVec<TermVec<Option<ProdIndex>>>,
    pub conflicts: Vec<LLConflict>,
}

impl LLTable {
    /// Builds the table for every production of `grammar` (Predict-set
    /// driven; spec §4.5). A conflict arises when two productions of the
    /// same non-terminal claim the same terminal's cell; the first
    /// assignment wins and the collision is recorded regardless of any
    /// "resolve" flag — LL(1) conflicts always mean the grammar is not
    /// LL(1), there is no precedence-based tie-break like LR's.
    pub fn build(grammar: &Grammar, sets: &SetsEngine) -> Self {
        let term_count = grammar.terminals.len();
        let nonterm_count = grammar.nonterminals.len();
        let mut table: NonTermVec<TermVec<Option<ProdIndex>>> =
            (0..nonterm_count).map(|_| (0..term_count).map(|_| None).collect()).collect();
        let mut conflicts: Vec<LLConflict> = vec![];
        let mut seen: HashMap<(NonTermIndex, TermIndex), ProdIndex> = HashMap::new();

        for production in grammar.productions.iter() {
            if production.number == grammar.augmented_production() {
                continue;
            }
            let predict = sets.predict(grammar, production.number);
            for terminal in predict {
                let key = (production.lhs, terminal);
                if let Some(&existing) = seen.get(&key) {
                    if existing != production.number {
                        let (prod_a, prod_b) =
                            if existing.0 < production.number.0 { (existing, production.number) } else { (production.number, existing) };
                        conflicts.push(LLConflict {
                            nonterminal: grammar.nonterminals[production.lhs].name.clone(),
                            terminal: grammar.terminals[terminal].name.clone(),
                            productions: vec![prod_a, prod_b],
                        });
                    }
                    continue;
                }
                seen.insert(key, production.number);
                table[production.lhs][terminal] = Some(production.number);
            }
        }

        LLTable { table, conflicts }
    }

    pub fn entry(&self, nonterminal: NonTermIndex, terminal: TermIndex) -> Option<ProdIndex> {
        self.table[nonterminal][terminal]
    }

    pub fn is_conflict_free(&self) -> bool {
        self.conflicts.is_empty()
    }
}
