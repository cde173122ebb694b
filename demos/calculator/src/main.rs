//! Worked example: an arithmetic calculator, end to end —
//! `S -> S '+' S | S '*' S | NUMBER | '(' S ')'` with `%left +` lower
//! precedence than `%left *`, built LALR(1) and driven by
//! [`parsegen::lr_driver::LRDriver`].

use std::env;

use parsegen::canonical::CanonicalCollection;
use parsegen::grammar::{Associativity, Grammar, GrammarBuilder, LalrConstruction, Mode, Symbol};
use parsegen::lexer::{LexAction, LexGrammar, LexRule, INITIAL};
use parsegen::lr_driver::{LRDriver, SemanticActions};
use parsegen::lr_table::LRTable;
use parsegen::sets::SetsEngine;
use parsegen::token::{Location, Token};
use parsegen::tokenizer::Tokenizer;
use parsegen_index::{ProdIndex, TermIndex};

fn grammar() -> Grammar {
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
    b.start(s).build().expect("calculator grammar is well-formed")
}

enum Value {
    Num(f64),
}

struct Evaluator;

impl SemanticActions<Value> for Evaluator {
    fn shift(&mut self, _terminal: TermIndex, token: &Token) -> Value {
        Value::Num(token.value.parse().unwrap_or(0.0))
    }

    fn reduce(&mut self, production: ProdIndex, mut args: Vec<Value>, _locations: Vec<Option<Location>>) -> Value {
        match production.0 {
            // S -> S '+' S
            1 => {
                let Value::Num(rhs) = args.pop().unwrap();
                args.pop();
                let Value::Num(lhs) = args.pop().unwrap();
                Value::Num(lhs + rhs)
            }
            // S -> S '*' S
            2 => {
                let Value::Num(rhs) = args.pop().unwrap();
                args.pop();
                let Value::Num(lhs) = args.pop().unwrap();
                Value::Num(lhs * rhs)
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
            _ => unreachable!("calculator grammar has four productions"),
        }
    }
}

fn main() {
    let expr = env::args().nth(1).unwrap_or_else(|| "2 + 2 * (3 + 4)".to_string());

    let g = grammar();
    let sets = SetsEngine::build(&g);
    let collection = CanonicalCollection::build(&g, &sets);
    let table = LRTable::build(&g, &sets, &collection, true);
    if !table.conflicts.is_empty() {
        eprintln!("grammar has unresolved conflicts: {:?}", table.conflicts);
        std::process::exit(1);
    }

    let driver = LRDriver::new(&g, &table, false);
    let lex = g.lex_grammar.as_ref().expect("calculator grammar declares a lexer");
    let mut tokenizer = Tokenizer::new(lex, false);
    let mut evaluator = Evaluator;

    match driver.parse(&expr, &mut tokenizer, &mut evaluator) {
        Ok(Value::Num(result)) => println!("{expr} = {result}"),
        Err(err) => {
            eprintln!("parse error: {err}");
            std::process::exit(1);
        }
    }
}
