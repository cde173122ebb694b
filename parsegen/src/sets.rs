//! C2: First/Follow/Predict sets engine.
//!
//! Computed once by fixpoint over the whole grammar and frozen afterwards;
//! `SetsEngine::build` is the only entry point (construction is the
//! "single phase" spec §5 describes — no further mutation once built).

use std::collections::BTreeSet;

use parsegen_index::{NonTermIndex, SymbolVec, TermIndex};

use crate::grammar::{Grammar, Symbol};

pub type TermSet = BTreeSet<TermIndex>;

pub struct SetsEngine {
    /// Indexed by the combined symbol space (terminals first, then
    /// non-terminals), matching `parsegen_index`'s `to_symbol_index`
    /// convention.
    first: SymbolVec<TermSet>,
    follow: SymbolVec<TermSet>,
    term_count: usize,
}

impl SetsEngine {
    pub fn build(grammar: &Grammar) -> Self {
        let term_count = grammar.term_count();
        let symbol_count = term_count + grammar.nonterminals.len();

        let mut first: SymbolVec<TermSet> = (0..symbol_count).map(|_| TermSet::new()).collect();
        // First(t) = {t} for every terminal, including ε and $.
        for t in grammar.terminals.indices() {
            first[t.to_symbol_index()].insert(t);
        }

        // Dragon book p.221: iterate First(A) = ⋃ First(α) over A → α until
        // no set grows. A guard entry (the empty set above) breaks cycles:
        // union with an empty set is a no-op, so mutual recursion between
        // non-terminals settles once every reachable production has been
        // visited (spec §9's "memoization with lazy fill" note).
        let mut changed = true;
        while changed {
            changed = false;
            for production in grammar.productions.iter() {
                let lhs_symbol = production.lhs.to_symbol_index(term_count);
                let before = first[lhs_symbol].len();
                let rhs_first = Self::first_of_sequence(grammar, &first, &production.rhs, term_count);
                first[lhs_symbol].extend(rhs_first);
                if first[lhs_symbol].len() > before {
                    changed = true;
                }
            }
        }

        let empty_set: TermSet = first[TermIndex(0).to_symbol_index()].clone();
        debug_assert!(empty_set.contains(&grammar.empty_index));

        let mut follow: SymbolVec<TermSet> = (0..symbol_count).map(|_| TermSet::new()).collect();
        // Rule 1: $ ∈ Follow(start).
        follow[grammar.start_symbol.to_symbol_index(term_count)].insert(grammar.stop_index);

        let mut changed = true;
        while changed {
            changed = false;
            for production in grammar.productions.iter() {
                let lhs_symbol = production.lhs.to_symbol_index(term_count);
                for (i, symbol) in production.rhs.iter().enumerate() {
                    let sym_index = Self::symbol_index(*symbol, term_count);
                    let before = follow[sym_index].len();

                    let beta = &production.rhs[i + 1..];
                    let beta_first = Self::first_of_sequence(grammar, &first, beta, term_count);
                    follow[sym_index].extend(beta_first.iter().filter(|&&t| t != grammar.empty_index));

                    // Self-recursion (B → αB) is harmless here: unioning
                    // Follow(LHS) into Follow(LHS) is a no-op, so no special
                    // case is needed beyond the natural fixpoint.
                    if beta.is_empty() || beta_first.contains(&grammar.empty_index) {
                        let lhs_follow: Vec<TermIndex> = follow[lhs_symbol].iter().copied().collect();
                        follow[sym_index].extend(lhs_follow);
                    }

                    if follow[sym_index].len() > before {
                        changed = true;
                    }
                }
            }
        }

        SetsEngine { first, follow, term_count }
    }

    fn symbol_index(symbol: Symbol, term_count: usize) -> parsegen_index::SymbolIndex {
        match symbol {
            Symbol::Terminal(t) => t.to_symbol_index(),
            Symbol::NonTerminal(n) => n.to_symbol_index(term_count),
        }
    }

    /// First(α₁…αₖ): accumulate First(αᵢ) \ {ε}, stopping at the first αᵢ
    /// whose First omits ε; include ε iff every αᵢ's First contains it
    ///.
    fn first_of_sequence(grammar: &Grammar, first: &SymbolVec<TermSet>, seq: &[Symbol], term_count: usize) -> TermSet {
        let mut result = TermSet::new();
        let mut all_nullable = true;
        for symbol in seq {
            let symbol_first = &first[Self::symbol_index(*symbol, term_count)];
            result.extend(symbol_first.iter().filter(|&&t| t != grammar.empty_index));
            if !symbol_first.contains(&grammar.empty_index) {
                all_nullable = false;
                break;
            }
        }
        if all_nullable {
            result.insert(grammar.empty_index);
        }
        result
    }

    pub fn first(&self, symbol: Symbol) -> &TermSet {
        &self.first[Self::symbol_index(symbol, self.term_count)]
    }

    pub fn first_of(&self, seq: &[Symbol], grammar: &Grammar) -> TermSet {
        Self::first_of_sequence(grammar, &self.first, seq, self.term_count)
    }

    pub fn follow(&self, nonterminal: NonTermIndex) -> &TermSet {
        &self.follow[nonterminal.to_symbol_index(self.term_count)]
    }

    /// Predict(A → α).
    pub fn predict(&self, grammar: &Grammar, prod: parsegen_index::ProdIndex) -> TermSet {
        let production = &grammar.productions[prod];
        let alpha_first = self.first_of(&production.rhs, grammar);
        if alpha_first.contains(&grammar.empty_index) {
            let mut set: TermSet = alpha_first.into_iter().filter(|t| *t != grammar.empty_index).collect();
            set.extend(self.follow(production.lhs).iter().copied());
            set
        } else {
            alpha_first
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{GrammarBuilder, Symbol};

    /// `S → A B 'c' | D; A → 'a' | ε; B → 'b' | ε; D → 'd' | ε` (spec §8
    /// scenario 4).
    fn letters_grammar() -> Grammar {
        let mut b = GrammarBuilder::new();
        let a_t = b.literal("a").unwrap();
        let b_t = b.literal("b").unwrap();
        let c_t = b.literal("c").unwrap();
        let d_t = b.literal("d").unwrap();
        let s = b.nonterminal("S").unwrap();
        let a = b.nonterminal("A").unwrap();
        let bn = b.nonterminal("B").unwrap();
        let d = b.nonterminal("D").unwrap();
        b.production(s, vec![Symbol::NonTerminal(a), Symbol::NonTerminal(bn), Symbol::Terminal(c_t)], None, None);
        b.production(s, vec![Symbol::NonTerminal(d)], None, None);
        b.production(a, vec![Symbol::Terminal(a_t)], None, None);
        b.production(a, vec![], None, None);
        b.production(bn, vec![Symbol::Terminal(b_t)], None, None);
        b.production(bn, vec![], None, None);
        b.production(d, vec![Symbol::Terminal(d_t)], None, None);
        b.production(d, vec![], None, None);
        b.start(s).build().unwrap()
    }

    #[test]
    fn first_of_start_symbol() {
        let g = letters_grammar();
        let sets = SetsEngine::build(&g);
        let names: BTreeSet<&str> = sets
            .first(Symbol::NonTerminal(g.start_symbol))
            .iter()
            .map(|t| g.terminals[*t].name.as_str())
            .collect();
        assert_eq!(names, BTreeSet::from(["a", "b", "c", "d", "ε"]));
    }

    #[test]
    fn follow_of_a_and_b() {
        let g = letters_grammar();
        let sets = SetsEngine::build(&g);
        let a = g.nonterminal_index("A").unwrap();
        let bn = g.nonterminal_index("B").unwrap();
        let follow_a: BTreeSet<&str> = sets.follow(a).iter().map(|t| g.terminals[*t].name.as_str()).collect();
        let follow_b: BTreeSet<&str> = sets.follow(bn).iter().map(|t| g.terminals[*t].name.as_str()).collect();
        assert_eq!(follow_a, BTreeSet::from(["b", "c"]));
        assert_eq!(follow_b, BTreeSet::from(["c"]));
    }

    #[test]
    fn first_subseteq_first_of_lhs() {
        // (First/Follow) testable property, spec §8.
        let g = letters_grammar();
        let sets = SetsEngine::build(&g);
        for production in g.productions.iter() {
            let alpha_first = sets.first_of(&production.rhs, &g);
            let lhs_first = sets.first(Symbol::NonTerminal(production.lhs));
            assert!(alpha_first.is_subset(lhs_first), "production {:?}", production.number);
        }
    }
}
