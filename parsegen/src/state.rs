//! C3: the LR state — a kernel plus its closure, and the symbol on which
//! it was entered (spec §3 `State`).

use std::collections::{BTreeSet, HashMap};

use parsegen_index::StateIndex;

use crate::grammar::{Grammar, Symbol};
use crate::item::Item;
use crate::sets::SetsEngine;

#[derive(Debug, Clone)]
pub struct State {
    pub id: StateIndex,
    pub kernel_items: Vec<Item>,
    pub items: Vec<Item>,
    pub transitions: HashMap<Symbol, StateIndex>,
}

impl State {
    pub fn new(id: StateIndex, kernel_items: Vec<Item>) -> Self {
        State { id, kernel_items: kernel_items.clone(), items: kernel_items, transitions: HashMap::new() }
    }

    /// The LR(0) kernel key: the sorted `(production#, dot)` pairs of the
    /// kernel items (spec §3 `State`, §4.3 step 3).
    pub fn lr0_kernel_key(items: &[Item]) -> Vec<(usize, usize)> {
        let mut keys: Vec<(usize, usize)> = items.iter().map(Item::kernel_key).collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// The full kernel+lookahead key used to distinguish CLR(1) states
    /// (spec §3 `State` invariant, mode CLR1).
    pub fn full_kernel_key(items: &[Item]) -> Vec<(usize, usize, Option<Vec<usize>>)> {
        let mut keys: Vec<_> = items.iter().map(Item::full_key).collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// Closes the state's kernel to a fixpoint (spec §4.2 "Closure of a
    /// State"). Items with the same `(production, dot)` but different
    /// lookaheads are unioned into one item — cross-state merging policy
    /// (LALR/SLR/CLR) is handled by the canonical-collection builder, not
    /// here.
    pub fn close(&mut self, grammar: &Grammar, sets: &SetsEngine) {
        let mut by_key: HashMap<(usize, usize), Item> = HashMap::new();
        // Always recompute from the kernel, not the previous closure: a
        // state's kernel lookaheads can grow after merging (LALR), and the
        // stale closure must not leak into the new one.
        for item in self.kernel_items.clone() {
            Self::merge_into(&mut by_key, item);
        }

        loop {
            let mut additions: Vec<Item> = vec![];
            for item in by_key.values() {
                if let Some(Symbol::NonTerminal(nt)) = item.current_symbol(grammar) {
                    let lookahead = item.closure_lookahead(grammar, sets);
                    for prod in &grammar.nonterminals[nt].productions {
                        additions.push(Item::start(*prod, lookahead.clone()));
                    }
                }
            }
            let before = by_key.len();
            let before_lookaheads: usize = by_key.values().map(|i| i.lookahead.as_ref().map_or(0, BTreeSet::len)).sum();
            for item in additions {
                Self::merge_into(&mut by_key, item);
            }
            let after = by_key.len();
            let after_lookaheads: usize = by_key.values().map(|i| i.lookahead.as_ref().map_or(0, BTreeSet::len)).sum();
            if after == before && after_lookaheads == before_lookaheads {
                break;
            }
        }

        let mut items: Vec<Item> = by_key.into_values().collect();
        items.sort_by_key(Item::kernel_key);
        self.items = items;
    }

    /// Unions `incoming`'s lookaheads into the matching kernel items,
    /// returning whether anything grew. Used by LALR merging when a goto
    /// target's kernel already exists under a different lookahead set
    ///.
    pub fn merge_kernel_lookaheads(&mut self, incoming: &[Item]) -> bool {
        let mut changed = false;
        for item in incoming {
            if let Some(existing) = self.kernel_items.iter_mut().find(|k| k.kernel_key() == item.kernel_key()) {
                if let (Some(a), Some(b)) = (&mut existing.lookahead, &item.lookahead) {
                    let before = a.len();
                    a.extend(b.iter().copied());
                    if a.len() > before {
                        changed = true;
                    }
                }
            }
        }
        changed
    }

    fn merge_into(by_key: &mut HashMap<(usize, usize), Item>, item: Item) {
        by_key
            .entry(item.kernel_key())
            .and_modify(|existing| {
                if let (Some(a), Some(b)) = (&mut existing.lookahead, &item.lookahead) {
                    a.extend(b.iter().copied());
                }
            })
            .or_insert(item);
    }

    /// Items with a symbol at the dot, grouped by that symbol — the
    /// candidates for `goto`.
    pub fn items_by_next_symbol(&self, grammar: &Grammar) -> HashMap<Symbol, Vec<Item>> {
        let mut grouped: HashMap<Symbol, Vec<Item>> = HashMap::new();
        for item in &self.items {
            if let Some(symbol) = item.current_symbol(grammar) {
                grouped.entry(symbol).or_default().push(item.advance());
            }
        }
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{GrammarBuilder, Mode, Symbol};
    use parsegen_index::ProdIndex;

    fn balanced_grammar(mode: Mode) -> Grammar {
        let mut b = GrammarBuilder::new().mode(mode);
        let a = b.literal("a").unwrap();
        let bt = b.literal("b").unwrap();
        let s = b.nonterminal("S").unwrap();
        b.production(s, vec![Symbol::Terminal(a), Symbol::NonTerminal(s), Symbol::Terminal(bt)], None, None);
        b.production(s, vec![], None, None);
        b.start(s).build().unwrap()
    }

    #[test]
    fn closure_adds_both_alternatives() {
        let g = balanced_grammar(Mode::Lr0);
        let sets = SetsEngine::build(&g);
        let mut state = State::new(StateIndex(0), vec![Item::start(ProdIndex(0), None)]);
        state.close(&g, &sets);
        // $accept -> •S$, S -> •aSb, S -> •
        assert_eq!(state.items.len(), 3);
    }

    #[test]
    fn kernel_key_ignores_lookahead() {
        let item_a = Item { production: ProdIndex(1), dot: 1, lookahead: Some(BTreeSet::new()) };
        let item_b = Item { production: ProdIndex(1), dot: 1, lookahead: None };
        assert_eq!(item_a.kernel_key(), item_b.kernel_key());
    }
}
