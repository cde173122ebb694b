//! Built-in demo grammars the CLI can generate from, since this workspace
//! does not build a textual grammar-file front end (spec §1/§6). Each is
//! one of the end-to-end scenarios from spec §8.

use parsegen::grammar::{Associativity, Grammar, GrammarBuilder, LalrConstruction, Mode, Symbol};
use parsegen::lexer::{LexAction, LexGrammar, LexRule, INITIAL};

/// Spec §8 scenario 1: `S -> S '+' S | S '*' S | NUMBER | '(' S ')'` with
/// `%left +`, `%left *`.
pub fn calculator(mode: Mode) -> Grammar {
    let mut b = GrammarBuilder::new().mode(mode);
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
    b.start(s).build().expect("calculator demo grammar is well-formed")
}

/// Spec §8 scenario 2: `S -> 'a' S 'b' | ε`.
pub fn balanced(mode: Mode) -> Grammar {
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
    b.start(s).build().expect("balanced demo grammar is well-formed")
}

/// Spec §8 scenario 3's left-factored expression grammar:
/// `E -> T E'; E' -> '+' T E' | ε; T -> F T'; T' -> '*' F T' | ε; F -> 'id' | '(' E ')'`.
/// Only meaningful under `Mode::Ll1`.
pub fn expression() -> Grammar {
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
    b.start(e).build().expect("expression demo grammar is well-formed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use parsegen::canonical::CanonicalCollection;
    use parsegen::lr_table::LRTable;
    use parsegen::sets::SetsEngine;

    #[test]
    fn calculator_demo_has_declared_lexer() {
        let g = calculator(Mode::Lalr1(LalrConstruction::ByClr1));
        assert!(g.lex_grammar.is_some());
        let sets = SetsEngine::build(&g);
        let collection = CanonicalCollection::build(&g, &sets);
        let table = LRTable::build(&g, &sets, &collection, true);
        assert!(!table.action.is_empty());
    }
}
