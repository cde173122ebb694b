//! C8: the shift/reduce stack machine.

use colored::Colorize;
use parsegen_index::{ProdIndex, StateIndex, TermIndex};

use crate::error::{Error, Result};
use crate::grammar::{Grammar, Symbol};
use crate::log;
use crate::lr_table::{Action, LRTable};
use crate::token::{Location, Token};
use crate::tokenizer::TokenSource;

/// What a caller supplies to turn shifted tokens and reduced productions
/// into semantic values. The core never interprets a production's
/// `action` handler string itself — it only calls back here with
/// the production number, letting the caller dispatch.
pub trait SemanticActions<V> {
    /// Builds the value for a shifted terminal from its token.
    fn shift(&mut self, terminal: TermIndex, token: &Token) -> V;

    /// Builds the value for a reduced production from its RHS values, in
    /// source order. `locations` parallels `args`; present only when
    /// location capture is enabled.
    fn reduce(&mut self, production: ProdIndex, args: Vec<V>, locations: Vec<Option<Location>>) -> V;

    fn on_parse_begin(&mut self, _input: &str) {}
    fn on_parse_end(&mut self, _value: &V) {}
}

pub struct LRDriver<'g> {
    grammar: &'g Grammar,
    table: &'g LRTable,
    capture_locations: bool,
}

impl<'g> LRDriver<'g> {
    pub fn new(grammar: &'g Grammar, table: &'g LRTable, capture_locations: bool) -> Self {
        LRDriver { grammar, table, capture_locations }
    }

    /// Drives `tokenizer` to completion against `actions`, returning the
    /// semantic value of the start symbol.
    pub fn parse<S, A, V>(&self, input: &str, tokenizer: &mut S, actions: &mut A) -> Result<V>
    where
        S: TokenSource,
        A: SemanticActions<V>,
    {
        actions.on_parse_begin(input);
        tokenizer.init_string(input);

        // Stack bottom is the sentinel `(state 0, ⊥)`; `⊥` is never read
        // because the grammar is augmented and the first real value pushed
        // is the shift/reduce for the start symbol.
        let mut stack: Vec<(StateIndex, Option<V>, Option<Location>)> = vec![(StateIndex(0), None, None)];
        let mut lookahead = tokenizer.get_next_token()?;

        loop {
            let state = stack.last().expect("stack is never empty mid-parse").0;
            let terminal = self.terminal_for(&lookahead)?;

            match self.table.action(state, terminal) {
                Action::Shift(target) => {
                    log!("  {} {:?} -> {target:?}", "shift".green(), lookahead.ty);
                    let loc = lookahead.loc;
                    let value = actions.shift(terminal, &lookahead);
                    stack.push((target, Some(value), loc));
                    lookahead = tokenizer.get_next_token()?;
                }
                Action::Reduce(production) => {
                    log!("  {} by production {}", "reduce".yellow(), production.0);
                    let rhs_len = self.grammar.production_rhs_symbols(production).len();
                    let mut args = Vec::with_capacity(rhs_len);
                    let mut locations = Vec::with_capacity(rhs_len);
                    for _ in 0..rhs_len {
                        let (_, value, loc) = stack.pop().expect("reduce pops only what shift/goto pushed");
                        args.push(value.expect("popped slot holds a semantic value"));
                        locations.push(loc);
                    }
                    args.reverse();
                    locations.reverse();
                    let span = if self.capture_locations { Location::span(&locations) } else { None };

                    let value = actions.reduce(production, args, locations);
                    let lhs = self.grammar.productions[production].lhs;
                    let top_state = stack.last().expect("stack is never empty mid-parse").0;
                    let target = self
                        .table
                        .goto(top_state, lhs)
                        .expect("a conflict-free table always has a goto after a valid reduce");
                    stack.push((target, Some(value), span));
                }
                Action::Accept => {
                    stack.pop(); // the shifted $ sentinel
                    let (_, value, _) = stack.pop().expect("start symbol value sits below $");
                    let value = value.expect("start symbol was reduced before acceptance");
                    actions.on_parse_end(&value);
                    return Ok(value);
                }
                Action::Error => {
                    return Err(Error::parse(&lookahead, self.expected_at(state)));
                }
            }
        }
    }

    fn terminal_for(&self, token: &Token) -> Result<TermIndex> {
        self.grammar.terminal_for_token(token).ok_or_else(|| Error::parse(token, self.expected_terminals()))
    }

    fn expected_terminals(&self) -> Vec<String> {
        let symbols: Vec<Symbol> = self.grammar.terminals.indices().map(Symbol::Terminal).collect();
        self.grammar.symbol_names(&symbols)
    }

    fn expected_at(&self, state: StateIndex) -> Vec<String> {
        let symbols: Vec<Symbol> = self
            .grammar
            .terminals
            .indices()
            .filter(|&t| !matches!(self.table.action(state, t), Action::Error))
            .map(Symbol::Terminal)
            .collect();
        self.grammar.symbol_names(&symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::CanonicalCollection;
    use crate::grammar::{Associativity, GrammarBuilder, LalrConstruction, Mode};
    use crate::lexer::{LexAction, LexGrammar, LexRule, INITIAL};
    use crate::sets::SetsEngine;
    use crate::tokenizer::Tokenizer;

    enum CalcValue {
        Num(i64),
    }

    struct Evaluator;

    impl SemanticActions<CalcValue> for Evaluator {
        fn shift(&mut self, _terminal: TermIndex, token: &Token) -> CalcValue {
            CalcValue::Num(token.value.parse().unwrap_or(0))
        }

        fn reduce(&mut self, production: ProdIndex, mut args: Vec<CalcValue>, _locations: Vec<Option<Location>>) -> CalcValue {
            match production.0 {
                // S -> S '+' S
                1 => {
                    let CalcValue::Num(rhs) = args.pop().unwrap();
                    args.pop(); // '+'
                    let CalcValue::Num(lhs) = args.pop().unwrap();
                    CalcValue::Num(lhs + rhs)
                }
                // S -> S '*' S
                2 => {
                    let CalcValue::Num(rhs) = args.pop().unwrap();
                    args.pop();
                    let CalcValue::Num(lhs) = args.pop().unwrap();
                    CalcValue::Num(lhs * rhs)
                }
                // S -> NUMBER
                3 => args.pop().unwrap(),
                // S -> '(' S ')'
                4 => {
                    args.pop();
                    let middle = args.pop().unwrap();
                    args.pop();
                    middle
                }
                _ => unreachable!(),
            }
        }
    }

    fn calculator() -> (Grammar, LRTable) {
        let mut b = GrammarBuilder::new().mode(Mode::Lalr1(LalrConstruction::ByClr1));
        let plus = b.literal("+").unwrap();
        let star = b.literal("*").unwrap();
        let lparen = b.literal("(").unwrap();
        let rparen = b.literal(")").unwrap();
        let number = b.token("NUMBER").unwrap();
        let s = b.nonterminal("S").unwrap();
        let lex = LexGrammar::new(vec![
            LexRule::new(0, r"\s+", vec![INITIAL.to_string()], LexAction::Skip, false).unwrap(),
            LexRule::new(1, r"\d+", vec![INITIAL.to_string()], LexAction::Emit("NUMBER".into()), false).unwrap(),
            LexRule::new(2, r"\+", vec![INITIAL.to_string()], LexAction::Emit("+".into()), false).unwrap(),
            LexRule::new(3, r"\*", vec![INITIAL.to_string()], LexAction::Emit("*".into()), false).unwrap(),
            LexRule::new(4, r"\(", vec![INITIAL.to_string()], LexAction::Emit("(".into()), false).unwrap(),
            LexRule::new(5, r"\)", vec![INITIAL.to_string()], LexAction::Emit(")".into()), false).unwrap(),
        ]);
        let mut b = b.precedence(plus, 1, Associativity::Left).precedence(star, 2, Associativity::Left).lex_grammar(lex);
        b.production(s, vec![Symbol::NonTerminal(s), Symbol::Terminal(plus), Symbol::NonTerminal(s)], None, None);
        b.production(s, vec![Symbol::NonTerminal(s), Symbol::Terminal(star), Symbol::NonTerminal(s)], None, None);
        b.production(s, vec![Symbol::Terminal(number)], None, None);
        b.production(s, vec![Symbol::Terminal(lparen), Symbol::NonTerminal(s), Symbol::Terminal(rparen)], None, None);
        let g = b.start(s).build().unwrap();
        let sets = SetsEngine::build(&g);
        let collection = CanonicalCollection::build(&g, &sets);
        let table = LRTable::build(&g, &sets, &collection, true);
        (g, table)
    }

    /// Spec §8 scenario 1.
    #[test]
    fn evaluates_precedence_correctly() {
        let (g, table) = calculator();
        let driver = LRDriver::new(&g, &table, false);
        let lex = g.lex_grammar.as_ref().unwrap();
        let mut tokenizer = Tokenizer::new(lex, false);
        let mut evaluator = Evaluator;
        let CalcValue::Num(result) = driver.parse("2 + 2 * 2", &mut tokenizer, &mut evaluator).unwrap();
        assert_eq!(result, 6);

        let mut tokenizer = Tokenizer::new(lex, false);
        let CalcValue::Num(result) = driver.parse("(2 + 2) * 2", &mut tokenizer, &mut evaluator).unwrap();
        assert_eq!(result, 8);
    }

    /// Spec §8 scenario 2: `S -> 'a' S 'b' | ε`.
    #[test]
    fn balanced_grammar_accepts_and_rejects() {
        let mut b = GrammarBuilder::new().mode(Mode::Lalr1(LalrConstruction::ByClr1));
        let a = b.literal("a").unwrap();
        let bt = b.literal("b").unwrap();
        let s = b.nonterminal("S").unwrap();
        let lex = LexGrammar::new(vec![
            LexRule::new(0, "a", vec![INITIAL.to_string()], LexAction::Emit("a".into()), false).unwrap(),
            LexRule::new(1, "b", vec![INITIAL.to_string()], LexAction::Emit("b".into()), false).unwrap(),
        ]);
        let mut b = b.lex_grammar(lex);
        b.production(s, vec![Symbol::Terminal(a), Symbol::NonTerminal(s), Symbol::Terminal(bt)], None, None);
        b.production(s, vec![], None, None);
        let g = b.start(s).build().unwrap();
        let sets = SetsEngine::build(&g);
        let collection = CanonicalCollection::build(&g, &sets);
        let table = LRTable::build(&g, &sets, &collection, true);
        let driver = LRDriver::new(&g, &table, false);

        struct Recognizer;
        impl SemanticActions<()> for Recognizer {
            fn shift(&mut self, _terminal: TermIndex, _token: &Token) {}
            fn reduce(&mut self, _production: ProdIndex, _args: Vec<()>, _locations: Vec<Option<Location>>) {}
        }

        let lex = g.lex_grammar.as_ref().unwrap();
        let mut recognizer = Recognizer;

        let mut tokenizer = Tokenizer::new(lex, false);
        assert!(driver.parse("aabb", &mut tokenizer, &mut recognizer).is_ok());

        let mut tokenizer = Tokenizer::new(lex, false);
        assert!(driver.parse("", &mut tokenizer, &mut recognizer).is_ok());

        let mut tokenizer = Tokenizer::new(lex, false);
        let err = driver.parse("aab", &mut tokenizer, &mut recognizer).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { .. }));
    }
}
