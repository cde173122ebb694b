//! C9: the predictive stack interpreter.

use parsegen_index::ProdIndex;

use crate::error::{Error, Result};
use crate::grammar::{Grammar, Symbol};
use crate::ll_table::LLTable;
use crate::token::Token;
use crate::tokenizer::TokenSource;

enum StackSymbol {
    /// The bottom-of-stack marker, matched against the EOF token.
    Eof,
    Symbol(Symbol),
}

pub struct LLDriver<'g> {
    grammar: &'g Grammar,
    table: &'g LLTable,
}

impl<'g> LLDriver<'g> {
    pub fn new(grammar: &'g Grammar, table: &'g LLTable) -> Self {
        LLDriver { grammar, table }
    }

    /// Drives `tokenizer` to completion, returning the sequence of
    /// productions applied in the order the driver expanded them (spec §8
    /// scenario 3's "production sequence").
    pub fn parse<S: TokenSource>(&self, input: &str, tokenizer: &mut S) -> Result<Vec<ProdIndex>> {
        tokenizer.init_string(input);

        let mut stack = vec![StackSymbol::Eof, StackSymbol::Symbol(Symbol::NonTerminal(self.grammar.start_symbol))];
        let mut lookahead = tokenizer.get_next_token()?;
        let mut productions = vec![];

        loop {
            let top = stack.pop().expect("stack is never empty mid-parse");
            match top {
                StackSymbol::Eof => {
                    if lookahead.ty == "$" {
                        return Ok(productions);
                    }
                    return Err(Error::parse(&lookahead, vec![]));
                }
                StackSymbol::Symbol(Symbol::Terminal(t)) => {
                    let expected_name = &self.grammar.terminals[t].name;
                    if lookahead.ty == *expected_name {
                        lookahead = tokenizer.get_next_token()?;
                    } else {
                        return Err(Error::parse(&lookahead, vec![expected_name.clone()]));
                    }
                }
                StackSymbol::Symbol(Symbol::NonTerminal(n)) => {
                    let terminal = self.terminal_for(&lookahead)?;
                    match self.table.entry(n, terminal) {
                        Some(production) => {
                            productions.push(production);
                            for symbol in self.grammar.production_rhs_symbols(production).iter().rev() {
                                stack.push(StackSymbol::Symbol(*symbol));
                            }
                        }
                        None => return Err(Error::parse(&lookahead, self.expected_for(n))),
                    }
                }
            }
        }
    }

    fn terminal_for(&self, token: &Token) -> Result<parsegen_index::TermIndex> {
        self.grammar.terminal_for_token(token).ok_or_else(|| Error::parse(token, vec![]))
    }

    fn expected_for(&self, nonterminal: parsegen_index::NonTermIndex) -> Vec<String> {
        let symbols: Vec<Symbol> = self
            .grammar
            .terminals
            .indices()
            .filter(|&t| self.table.entry(nonterminal, t).is_some())
            .map(Symbol::Terminal)
            .collect();
        self.grammar.symbol_names(&symbols)
    }
}
