//! C3: the LR item.
//!
//! An item is a production with a dot; LALR(1)/CLR(1) items additionally
//! carry a lookahead set (spec §3, §4.2).

use std::collections::BTreeSet;

use parsegen_index::{ProdIndex, TermIndex};

use crate::grammar::{Grammar, Mode, Symbol};
use crate::sets::{SetsEngine, TermSet};

/// Spec §9's open question resolved: an explicit `ALL` variant rather than
/// a boolean sentinel meaning "all terminals" for LR(0) reduce sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReduceSet {
    All,
    Terminals(TermSet),
}

impl ReduceSet {
    pub fn contains(&self, t: TermIndex) -> bool {
        match self {
            ReduceSet::All => true,
            ReduceSet::Terminals(set) => set.contains(&t),
        }
    }

    pub fn terminals<'g>(&'g self, grammar: &'g Grammar) -> Box<dyn Iterator<Item = TermIndex> + 'g> {
        match self {
            ReduceSet::All => Box::new(grammar.terminals.indices().filter(|t| *t != grammar.empty_index)),
            ReduceSet::Terminals(set) => Box::new(set.iter().copied()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Item {
    pub production: ProdIndex,
    pub dot: usize,
    /// `None` for LR(0)/SLR(1); `Some` for LALR(1)/CLR(1).
    pub lookahead: Option<BTreeSet<TermIndex>>,
}

impl Item {
    pub fn start(production: ProdIndex, lookahead: Option<BTreeSet<TermIndex>>) -> Self {
        Item { production, dot: 0, lookahead }
    }

    /// Identity for dedup within/across states, ignoring lookaheads (spec
    /// §3 "LR Item Key" for LR(0)).
    pub fn kernel_key(&self) -> (usize, usize) {
        (self.production.0, self.dot)
    }

    /// Full identity including lookaheads (spec §3 "LR Item Key" for
    /// LR(1)).
    pub fn full_key(&self) -> (usize, usize, Option<Vec<usize>>) {
        (self.production.0, self.dot, self.lookahead.as_ref().map(|s| s.iter().map(|t| t.0).collect()))
    }

    pub fn current_symbol(&self, grammar: &Grammar) -> Option<Symbol> {
        grammar.productions[self.production].rhs.get(self.dot).copied()
    }

    pub fn is_final(&self, grammar: &Grammar) -> bool {
        let production = &grammar.productions[self.production];
        production.is_epsilon || self.dot == production.rhs.len()
    }

    pub fn is_shift(&self, grammar: &Grammar) -> bool {
        matches!(self.current_symbol(grammar), Some(Symbol::Terminal(_)))
    }

    pub fn is_reduce(&self, grammar: &Grammar) -> bool {
        self.is_final(grammar) && self.production != grammar.augmented_production()
    }

    pub fn is_accept(&self, grammar: &Grammar) -> bool {
        self.is_final(grammar) && self.production == grammar.augmented_production()
    }

    /// Moves the dot one position right; lookaheads are copied unchanged
    ///.
    pub fn advance(&self) -> Self {
        Item { production: self.production, dot: self.dot + 1, lookahead: self.lookahead.clone() }
    }

    pub fn reduce_set(&self, grammar: &Grammar, sets: &SetsEngine) -> ReduceSet {
        match grammar.mode {
            Mode::Lr0 => ReduceSet::All,
            Mode::Slr1 => ReduceSet::Terminals(sets.follow(grammar.productions[self.production].lhs).clone()),
            Mode::Lalr1(_) | Mode::Clr1 => {
                ReduceSet::Terminals(self.lookahead.clone().unwrap_or_default())
            }
            Mode::Ll1 => unreachable!("LL(1) has no LR items"),
        }
    }

    /// Closure of `A → α • B β, L` on non-terminal `B`: produces the
    /// lookahead `L' = First(βL)` for every new item `B → •γ, L'` (spec
    /// §4.2). Returns `None` when the mode does not use lookaheads.
    pub fn closure_lookahead(&self, grammar: &Grammar, sets: &SetsEngine) -> Option<BTreeSet<TermIndex>> {
        if !grammar.mode.uses_lookaheads() {
            return None;
        }
        let production = &grammar.productions[self.production];
        let beta = &production.rhs[self.dot + 1..];
        let mut result = sets.first_of(beta, grammar);
        let nullable = result.remove(&grammar.empty_index);
        if nullable || beta.is_empty() {
            if let Some(lookahead) = &self.lookahead {
                result.extend(lookahead.iter().copied());
            }
        }
        Some(result)
    }
}
