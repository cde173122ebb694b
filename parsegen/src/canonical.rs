//! C4: the canonical collection of LR states, reachable from the initial
//! state by `goto`.
//!
//! Four construction strategies share one worklist skeleton
//! ([`build_collection`]), differing only in whether items carry
//! lookaheads and how a goto target that collides with an existing state's
//! LR(0) kernel is handled:
//!
//! - LR(0)/SLR(1): no lookaheads, states always merge on the LR(0) kernel.
//! - CLR(1): full lookaheads, states only merge when the *full* key
//!   (kernel + lookaheads) matches; otherwise a new state is created.
//! - LALR(1) by-CLR: full lookaheads like CLR(1), but states merge on the
//!   LR(0) kernel alone, unioning lookaheads and re-closing to a fixpoint
//!  .
//! - LALR(1) by-SLR: the LR(0) skeleton is built first (no lookaheads),
//!   then [`propagate_lalr_lookaheads`] assigns lookaheads by relaxing a
//!   least fixpoint over the existing goto graph (see Design Notes below).

use std::collections::{BTreeSet, HashMap, VecDeque};

use colored::Colorize;
use parsegen_index::{StateIndex, StateVec};

use crate::grammar::{Grammar, LalrConstruction, Mode, Symbol};
use crate::item::Item;
use crate::log;
use crate::sets::SetsEngine;
use crate::state::State;

pub struct CanonicalCollection {
    pub states: StateVec<State>,
}

impl CanonicalCollection {
    /// Builds the collection appropriate for `grammar.mode` (any LR mode;
    /// LL(1) has no canonical collection).
    pub fn build(grammar: &Grammar, sets: &SetsEngine) -> Self {
        match grammar.mode {
            Mode::Lr0 | Mode::Slr1 => build_collection(grammar, sets, false, StateKeyMode::Lr0Kernel),
            Mode::Clr1 => build_collection(grammar, sets, true, StateKeyMode::FullKernel),
            Mode::Lalr1(LalrConstruction::ByClr1) => build_collection(grammar, sets, true, StateKeyMode::Lr0Kernel),
            Mode::Lalr1(LalrConstruction::BySlr1) => {
                let mut collection = build_collection(grammar, sets, false, StateKeyMode::Lr0Kernel);
                propagate_lalr_lookaheads(grammar, sets, &mut collection);
                collection
            }
            Mode::Ll1 => panic!("LL(1) has no canonical collection"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StateKeyMode {
    Lr0Kernel,
    FullKernel,
}

fn state_key(items: &[Item], mode: StateKeyMode) -> String {
    match mode {
        StateKeyMode::Lr0Kernel => format!("{:?}", State::lr0_kernel_key(items)),
        StateKeyMode::FullKernel => format!("{:?}", State::full_kernel_key(items)),
    }
}

/// Deterministic traversal order over a state's outgoing symbols: puts
/// terminals before non-terminals (so generated tables read shift-rows
/// before goto-rows), each ordered by index.
fn symbol_sort_key(symbol: Symbol) -> (u8, usize) {
    match symbol {
        Symbol::Terminal(t) => (0, t.0),
        Symbol::NonTerminal(n) => (1, n.0),
    }
}

fn build_collection(grammar: &Grammar, sets: &SetsEngine, use_lookaheads: bool, key_mode: StateKeyMode) -> CanonicalCollection {
    log!("\n{}", "Building canonical collection.".red());
    let mut states: StateVec<State> = StateVec::new();
    let mut key_to_id: HashMap<String, StateIndex> = HashMap::new();
    let mut worklist: VecDeque<StateIndex> = VecDeque::new();

    let initial_lookahead = use_lookaheads.then(|| BTreeSet::from([grammar.stop_index]));
    let initial_kernel = vec![Item::start(grammar.augmented_production(), initial_lookahead)];
    let mut s0 = State::new(StateIndex(0), initial_kernel);
    s0.close(grammar, sets);
    key_to_id.insert(state_key(&s0.kernel_items, key_mode), StateIndex(0));
    states.push(s0);
    worklist.push_back(StateIndex(0));

    while let Some(id) = worklist.pop_front() {
        let grouped = states[id].items_by_next_symbol(grammar);
        let mut symbols: Vec<Symbol> = grouped.keys().copied().collect();
        symbols.sort_by_key(|s| symbol_sort_key(*s));

        for symbol in symbols {
            let kernel_items = grouped[&symbol].clone();
            let key = state_key(&kernel_items, key_mode);

            let target = if let Some(&existing_id) = key_to_id.get(&key) {
                if use_lookaheads && key_mode == StateKeyMode::Lr0Kernel {
                    let changed = states[existing_id].merge_kernel_lookaheads(&kernel_items);
                    if changed {
                        states[existing_id].close(grammar, sets);
                        worklist.push_back(existing_id);
                    }
                }
                existing_id
            } else {
                let new_id = StateIndex(states.len());
                let mut new_state = State::new(new_id, kernel_items);
                new_state.close(grammar, sets);
                log!("  {} {new_id:?}", "new state".green());
                key_to_id.insert(key, new_id);
                states.push(new_state);
                worklist.push_back(new_id);
                new_id
            };
            states[id].transitions.insert(symbol, target);
        }
    }

    CanonicalCollection { states }
}

/// LALR(1)-by-SLR construction: assigns lookaheads to the kernel items of
/// an already-built LR(0) skeleton by relaxation, rather than by building
/// the full CLR(1) collection first.
///
/// Each kernel item's lookahead set is the *least* fixpoint of: the start
/// item's kernel lookahead is `{$}`; every other kernel item's lookahead is
/// the union, over every predecessor state and every item in that
/// predecessor's *current* best-known closure that transitions here, of
/// that closure item's lookahead. This is computed by repeatedly
/// re-closing every state with its current kernel lookaheads and
/// propagating the results along the (already-fixed) goto edges until no
/// kernel lookahead grows.
///
/// Design note: spec §4.3 describes seeding this from the SLR Follow sets.
/// Seeding from Follow would make the fixpoint start *above* the correct
/// LALR solution (Follow is usually a proper superset of the true LALR
/// lookahead), and since every step here only ever adds elements, starting
/// from a superset would stay a superset — the table would come out equal
/// to plain SLR(1), not LALR(1), breaking the by-SLR/by-CLR equivalence
/// spec §8 requires. Seeding from the empty set (only `{$}` at the start
/// item, which is forced by the grammar regardless of construction
/// strategy) is the least fixpoint and converges to the same table as
/// by-CLR merging.
fn propagate_lalr_lookaheads(grammar: &Grammar, sets: &SetsEngine, collection: &mut CanonicalCollection) {
    let state_count = collection.states.len();
    let mut lookaheads: Vec<Vec<BTreeSet<parsegen_index::TermIndex>>> =
        collection.states.iter().map(|s| s.kernel_items.iter().map(|_| BTreeSet::new()).collect()).collect();
    lookaheads[0][0].insert(grammar.stop_index);

    loop {
        let mut changed = false;
        for id in 0..state_count {
            let sid = StateIndex(id);
            // Re-close this state using its current best-known kernel
            // lookaheads.
            let mut working = State::new(
                sid,
                collection.states[sid]
                    .kernel_items
                    .iter()
                    .cloned()
                    .zip(lookaheads[id].iter().cloned())
                    .map(|(item, la)| Item { lookahead: Some(la), ..item })
                    .collect(),
            );
            working.close(grammar, sets);

            for item in &working.items {
                let Some(symbol) = item.current_symbol(grammar) else { continue };
                let Some(&target) = collection.states[sid].transitions.get(&symbol) else { continue };
                let advanced = item.advance();
                let target_kernel = &collection.states[target].kernel_items;
                if let Some(pos) = target_kernel.iter().position(|k| k.kernel_key() == advanced.kernel_key()) {
                    let incoming = item.lookahead.clone().unwrap_or_default();
                    let before = lookaheads[target.0][pos].len();
                    lookaheads[target.0][pos].extend(incoming);
                    if lookaheads[target.0][pos].len() > before {
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    for (id, state) in collection.states.iter_mut().enumerate() {
        for (item, la) in state.kernel_items.iter_mut().zip(lookaheads[id].iter()) {
            item.lookahead = Some(la.clone());
        }
        state.close(grammar, sets);
    }
}
