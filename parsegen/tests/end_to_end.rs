//! End-to-end scenarios driven through the public API the way an external
//! caller would use it (`parsegen::` paths only, no internal module
//! access) — as opposed to the `#[cfg(test)] mod tests` unit tests living
//! alongside each component, which poke at internal state directly.

use parsegen::canonical::CanonicalCollection;
use parsegen::error::Error;
use parsegen::grammar::{Associativity, Grammar, GrammarBuilder, LalrConstruction, Mode, Symbol};
use parsegen::lexer::{LexAction, LexGrammar, LexRule, INITIAL};
use parsegen::ll_driver::LLDriver;
use parsegen::ll_table::LLTable;
use parsegen::lr_driver::{LRDriver, SemanticActions};
use parsegen::lr_table::LRTable;
use parsegen::sets::SetsEngine;
use parsegen::token::{Location, Token};
use parsegen::tokenizer::Tokenizer;
use parsegen_index::{ProdIndex, TermIndex};

enum Value {
    Num(i64),
}

struct Evaluator;

impl SemanticActions<Value> for Evaluator {
    fn shift(&mut self, _terminal: TermIndex, token: &Token) -> Value {
        Value::Num(token.value.parse().unwrap_or(0))
    }

    fn reduce(&mut self, production: ProdIndex, mut args: Vec<Value>, _locations: Vec<Option<Location>>) -> Value {
        match production.0 {
            1 => {
                let Value::Num(rhs) = args.pop().unwrap();
                args.pop();
                let Value::Num(lhs) = args.pop().unwrap();
                Value::Num(lhs + rhs)
            }
            2 => {
                let Value::Num(rhs) = args.pop().unwrap();
                args.pop();
                let Value::Num(lhs) = args.pop().unwrap();
                Value::Num(lhs * rhs)
            }
            3 => args.pop().unwrap(),
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

fn calculator_grammar() -> Grammar {
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
    b.start(s).build().unwrap()
}

/// Scenario 1: `"2 + 2 * 2"` -> 6, `"(2 + 2) * 2"` -> 8.
#[test]
fn calculator_respects_precedence() {
    let g = calculator_grammar();
    let sets = SetsEngine::build(&g);
    let collection = CanonicalCollection::build(&g, &sets);
    let table = LRTable::build(&g, &sets, &collection, true);
    let driver = LRDriver::new(&g, &table, false);
    let lex = g.lex_grammar.as_ref().unwrap();
    let mut evaluator = Evaluator;

    let mut tokenizer = Tokenizer::new(lex, false);
    let Value::Num(result) = driver.parse("2 + 2 * 2", &mut tokenizer, &mut evaluator).unwrap();
    assert_eq!(result, 6);

    let mut tokenizer = Tokenizer::new(lex, false);
    let Value::Num(result) = driver.parse("(2 + 2) * 2", &mut tokenizer, &mut evaluator).unwrap();
    assert_eq!(result, 8);
}

fn balanced_grammar(mode: Mode) -> Grammar {
    let mut b = GrammarBuilder::new().mode(mode);
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
    b.start(s).build().unwrap()
}

/// Scenario 2: `"aabb"` accepts, `""` accepts, `"aab"` fails at end of input.
#[test]
fn balanced_grammar_accepts_and_rejects() {
    let g = balanced_grammar(Mode::Lalr1(LalrConstruction::ByClr1));
    let sets = SetsEngine::build(&g);
    let collection = CanonicalCollection::build(&g, &sets);
    let table = LRTable::build(&g, &sets, &collection, true);
    let driver = LRDriver::new(&g, &table, false);
    let lex = g.lex_grammar.as_ref().unwrap();

    struct Recognizer;
    impl SemanticActions<()> for Recognizer {
        fn shift(&mut self, _terminal: TermIndex, _token: &Token) {}
        fn reduce(&mut self, _production: ProdIndex, _args: Vec<()>, _locations: Vec<Option<Location>>) {}
    }
    let mut recognizer = Recognizer;

    let mut tokenizer = Tokenizer::new(lex, false);
    assert!(driver.parse("aabb", &mut tokenizer, &mut recognizer).is_ok());

    let mut tokenizer = Tokenizer::new(lex, false);
    assert!(driver.parse("", &mut tokenizer, &mut recognizer).is_ok());

    let mut tokenizer = Tokenizer::new(lex, false);
    let err = driver.parse("aab", &mut tokenizer, &mut recognizer).unwrap_err();
    assert!(matches!(err, Error::UnexpectedEof { .. }));
}

/// Scenario 3: the left-factored expression grammar's production sequence
/// for `"id + id * id"`.
#[test]
fn ll1_production_sequence_for_id_plus_id_times_id() {
    let mut b = GrammarBuilder::new().mode(Mode::Ll1);
    let plus = b.literal("+").unwrap();
    let star = b.literal("*").unwrap();
    let lparen = b.literal("(").unwrap();
    let rparen = b.literal(")").unwrap();
    let id = b.token("id").unwrap();
    let e = b.nonterminal("E").unwrap();
    let e_prime = b.nonterminal("E'").unwrap();
    let t = b.nonterminal("T").unwrap();
    let t_prime = b.nonterminal("T'").unwrap();
    let f = b.nonterminal("F").unwrap();
    let lex = LexGrammar::new(vec![
        LexRule::new(0, r"\s+", vec![INITIAL.to_string()], LexAction::Skip, false).unwrap(),
        LexRule::new(1, r"\+", vec![INITIAL.to_string()], LexAction::Emit("+".into()), false).unwrap(),
        LexRule::new(2, r"\*", vec![INITIAL.to_string()], LexAction::Emit("*".into()), false).unwrap(),
        LexRule::new(3, r"\(", vec![INITIAL.to_string()], LexAction::Emit("(".into()), false).unwrap(),
        LexRule::new(4, r"\)", vec![INITIAL.to_string()], LexAction::Emit(")".into()), false).unwrap(),
        LexRule::new(5, "id", vec![INITIAL.to_string()], LexAction::Emit("id".into()), false).unwrap(),
    ]);
    let mut b = b.lex_grammar(lex);
    b.production(e, vec![Symbol::NonTerminal(t), Symbol::NonTerminal(e_prime)], None, None);
    b.production(e_prime, vec![Symbol::Terminal(plus), Symbol::NonTerminal(t), Symbol::NonTerminal(e_prime)], None, None);
    b.production(e_prime, vec![], None, None);
    b.production(t, vec![Symbol::NonTerminal(f), Symbol::NonTerminal(t_prime)], None, None);
    b.production(t_prime, vec![Symbol::Terminal(star), Symbol::NonTerminal(f), Symbol::NonTerminal(t_prime)], None, None);
    b.production(t_prime, vec![], None, None);
    b.production(f, vec![Symbol::Terminal(id)], None, None);
    b.production(f, vec![Symbol::Terminal(lparen), Symbol::NonTerminal(e), Symbol::Terminal(rparen)], None, None);
    let g = b.start(e).build().unwrap();

    let sets = SetsEngine::build(&g);
    let table = LLTable::build(&g, &sets);
    assert!(table.is_conflict_free());

    let driver = LLDriver::new(&g, &table);
    let lex = g.lex_grammar.as_ref().unwrap();
    let mut tokenizer = Tokenizer::new(lex, false);
    let productions = driver.parse("id + id * id", &mut tokenizer).unwrap();
    let numbers: Vec<usize> = productions.iter().map(|p| p.0).collect();
    // Spec §8 scenario 3 allows "an equivalent" sequence for this production
    // numbering: 1:E->TE' 2:E'->+TE' 3:E'->ε 4:T->FT' 5:T'->*FT' 6:T'->ε
    // 7:F->id 8:F->(E), traced by hand against the table built above.
    assert_eq!(numbers, vec![1, 4, 7, 6, 2, 4, 7, 5, 7, 6, 3]);
}

/// Scenario 4: First/Follow on `S -> A B 'c' | D; A -> 'a' | ε; B -> 'b' | ε;
/// D -> 'd' | ε`.
#[test]
fn first_and_follow_on_letters_grammar() {
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
    let g = b.start(s).build().unwrap();
    let sets = SetsEngine::build(&g);

    let names = |set: &std::collections::BTreeSet<TermIndex>| -> std::collections::BTreeSet<String> {
        set.iter().map(|t| g.terminals[*t].name.clone()).collect()
    };

    assert_eq!(
        names(sets.first(Symbol::NonTerminal(s))),
        std::collections::BTreeSet::from(["a".into(), "b".into(), "c".into(), "d".into(), "ε".into()])
    );
    assert_eq!(names(sets.follow(a)), std::collections::BTreeSet::from(["b".into(), "c".into()]));
    assert_eq!(names(sets.follow(bn)), std::collections::BTreeSet::from(["c".into()]));
}

/// Scenario 5: `S -> A | A 'a'; A -> 'x'` is an LR(0) shift/reduce conflict
/// that disappears under SLR(1) because `Follow(A) = {$, 'a'}` does not make
/// the shift/reduce ambiguity resolvable without precedence, so LR(0)
/// reports it and SLR(1) simply never has to pick.
#[test]
fn lr0_conflict_resolved_away_by_slr1_follow_sets() {
    fn build(mode: Mode) -> Grammar {
        let mut b = GrammarBuilder::new().mode(mode);
        let x = b.literal("x").unwrap();
        let a_t = b.literal("a").unwrap();
        let s = b.nonterminal("S").unwrap();
        let a = b.nonterminal("A").unwrap();
        b.production(s, vec![Symbol::NonTerminal(a)], None, None);
        b.production(s, vec![Symbol::NonTerminal(a), Symbol::Terminal(a_t)], None, None);
        b.production(a, vec![Symbol::Terminal(x)], None, None);
        b.start(s).build().unwrap()
    }

    let g0 = build(Mode::Lr0);
    let sets0 = SetsEngine::build(&g0);
    let table0 = LRTable::build(&g0, &sets0, &CanonicalCollection::build(&g0, &sets0), false);
    assert!(!table0.is_conflict_free());

    let g1 = build(Mode::Slr1);
    let sets1 = SetsEngine::build(&g1);
    let table1 = LRTable::build(&g1, &sets1, &CanonicalCollection::build(&g1, &sets1), false);
    assert!(table1.is_conflict_free());
}

/// Scenario 6: a comment-state tokenizer, `"1 /* 2 */ 3"` ->
/// `[NUMBER, NUMBER_IN_COMMENT, NUMBER, $]`.
#[test]
fn tokenizer_state_stack_switches_rule_sets() {
    let grammar = LexGrammar::new(vec![
        LexRule::new(0, r"\s+", vec![INITIAL.to_string()], LexAction::Skip, false).unwrap(),
        LexRule::new(1, r"/\*", vec![INITIAL.to_string()], LexAction::Skip, false).unwrap().with_push_state("comment"),
        LexRule::new(2, r"\*/", vec!["comment".to_string()], LexAction::Skip, false).unwrap().with_pop_state(),
        LexRule::new(3, r"\d+", vec![INITIAL.to_string()], LexAction::Emit("NUMBER".into()), false).unwrap(),
        LexRule::new(4, r"\d+", vec!["comment".to_string()], LexAction::Emit("NUMBER_IN_COMMENT".into()), false).unwrap(),
    ]);
    let mut tokenizer = Tokenizer::new(&grammar, false);
    tokenizer.init_string("1 /* 2 */ 3");
    let tokens = tokenizer.get_tokens().unwrap();
    let types: Vec<&str> = tokens.iter().map(|t| t.ty.as_str()).collect();
    assert_eq!(types, vec!["NUMBER", "NUMBER_IN_COMMENT", "NUMBER", "$"]);
}
