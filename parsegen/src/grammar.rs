//! The grammar model.
//!
//! A [`Grammar`] is immutable once built: terminals, non-terminals,
//! productions, operator precedence, and the lexical specification are all
//! fixed by the time [`GrammarBuilder::build`] returns. Grammar text parsing
//! (BNF/Yacc concrete syntax) is out of scope here — a `Grammar` is always
//! assembled programmatically, by this builder or by an external front end
//! that hands one to the core.

use std::collections::HashMap;

use parsegen_index::{NonTermIndex, NonTermVec, ProdIndex, ProdVec, TermIndex, TermVec};

use crate::error::GrammarError;
use crate::lexer::LexGrammar;
use crate::token::Token;

/// The empty symbol, reserved, always terminal index 0.
pub const EMPTY_NAME: &str = "ε";
/// The end-of-input symbol, reserved, always terminal index 1.
pub const STOP_NAME: &str = "$";
/// The synthetic accept non-terminal's name, always non-terminal index 0.
pub const ACCEPT_NAME: &str = "$accept";

/// A terminal is either a symbolic token name (`NUMBER`) or a quoted literal
/// (`'+'`), plus the two reserved terminals ε and $.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Empty,
    Stop,
    Token,
    Literal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    pub name: String,
    pub kind: TerminalKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonTerminalDef {
    pub name: String,
    pub productions: Vec<ProdIndex>,
}

/// Associativity used to break shift/reduce ties at equal precedence
///.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
    NonAssoc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precedence {
    pub level: i32,
    pub assoc: Associativity,
}

/// Either half of a production RHS slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(TermIndex),
    NonTerminal(NonTermIndex),
}

impl Symbol {
    pub fn as_terminal(self) -> Option<TermIndex> {
        match self {
            Symbol::Terminal(t) => Some(t),
            Symbol::NonTerminal(_) => None,
        }
    }

    pub fn as_nonterminal(self) -> Option<NonTermIndex> {
        match self {
            Symbol::NonTerminal(n) => Some(n),
            Symbol::Terminal(_) => None,
        }
    }
}

/// A production: `number: LHS → RHS`. Production 0 is always the augmented
/// `$accept → S $`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub number: ProdIndex,
    pub lhs: NonTermIndex,
    pub rhs: Vec<Symbol>,
    pub is_epsilon: bool,
    /// Explicit precedence, if declared (e.g. `%prec`).
    pub precedence: Option<Precedence>,
    /// Opaque handler reference; the core never interprets it beyond
    /// passing it through to semantic-action invocation.
    pub action: Option<String>,
}

/// Construction mode, including the two LALR(1) construction variants whose
/// equivalence is a testable property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Lr0,
    Slr1,
    Lalr1(LalrConstruction),
    Clr1,
    Ll1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LalrConstruction {
    /// Build the LR(0) collection, seed lookaheads via SLR Follow sets,
    /// then propagate along gotos to a fixpoint.
    BySlr1,
    /// Build the full CLR(1) collection, then merge states sharing an
    /// LR(0) kernel, unioning lookaheads.
    ByClr1,
}

impl Mode {
    pub fn is_lr(&self) -> bool {
        !matches!(self, Mode::Ll1)
    }

    pub fn uses_lookaheads(&self) -> bool {
        matches!(self, Mode::Lalr1(_) | Mode::Clr1)
    }
}

#[derive(Debug, Clone)]
pub struct Grammar {
    pub productions: ProdVec<Production>,
    pub terminals: TermVec<Terminal>,
    pub nonterminals: NonTermVec<NonTerminalDef>,
    /// The real (non-augmented) start non-terminal, `S` in `$accept → S $`.
    pub start_symbol: NonTermIndex,
    pub mode: Mode,
    pub operator_precedence: HashMap<TermIndex, Precedence>,
    pub lex_grammar: Option<LexGrammar>,
    pub empty_index: TermIndex,
    pub stop_index: TermIndex,
}

impl Grammar {
    pub fn accept_nonterm(&self) -> NonTermIndex {
        NonTermIndex(0)
    }

    pub fn augmented_production(&self) -> ProdIndex {
        ProdIndex(0)
    }

    pub fn term_count(&self) -> usize {
        self.terminals.len()
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        match symbol {
            Symbol::Terminal(t) => &self.terminals[t].name,
            Symbol::NonTerminal(n) => &self.nonterminals[n].name,
        }
    }

    pub fn production_rhs_symbols(&self, prod: ProdIndex) -> &[Symbol] {
        &self.productions[prod].rhs
    }

    pub fn terminal_index(&self, name: &str) -> Option<TermIndex> {
        self.terminals
            .iter()
            .position(|t| t.name == name)
            .map(TermIndex)
    }

    pub fn nonterminal_index(&self, name: &str) -> Option<NonTermIndex> {
        self.nonterminals
            .iter()
            .position(|n| n.name == name)
            .map(NonTermIndex)
    }

    /// Resolves a scanned token to the terminal it represents, by name —
    /// a driver consults `action[s][t.type]` keyed on this.
    pub fn terminal_for_token(&self, token: &Token) -> Option<TermIndex> {
        self.terminal_index(&token.ty)
    }

    /// Resolves a list of symbols to their declared names, in order (used to
    /// render the "expected one of" list in a parse error).
    pub fn symbol_names(&self, symbols: &[Symbol]) -> Vec<String> {
        symbols.iter().map(|s| self.symbol_name(*s).to_string()).collect()
    }

    /// The precedence that governs a reduce action by `prod`: its own
    /// explicit precedence if declared, otherwise the precedence of the
    /// rightmost terminal in its RHS.
    pub fn production_precedence(&self, prod: ProdIndex) -> Option<Precedence> {
        let production = &self.productions[prod];
        if let Some(p) = production.precedence {
            return Some(p);
        }
        production
            .rhs
            .iter()
            .rev()
            .find_map(|s| s.as_terminal())
            .and_then(|t| self.operator_precedence.get(&t).copied())
    }
}

/// Builds a [`Grammar`] programmatically. This is the only supported way to
/// construct one; textual grammar files are an external collaborator's
/// concern.
pub struct GrammarBuilder {
    terminals: TermVec<Terminal>,
    nonterminals: NonTermVec<NonTerminalDef>,
    productions: ProdVec<Production>,
    start_symbol: Option<NonTermIndex>,
    operator_precedence: HashMap<TermIndex, Precedence>,
    lex_grammar: Option<LexGrammar>,
    mode: Mode,
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        let mut terminals = TermVec::new();
        terminals.push(Terminal { name: EMPTY_NAME.to_string(), kind: TerminalKind::Empty });
        terminals.push(Terminal { name: STOP_NAME.to_string(), kind: TerminalKind::Stop });
        let mut nonterminals = NonTermVec::new();
        nonterminals.push(NonTerminalDef { name: ACCEPT_NAME.to_string(), productions: vec![] });
        Self {
            terminals,
            nonterminals,
            productions: ProdVec::new(),
            start_symbol: None,
            operator_precedence: HashMap::new(),
            lex_grammar: None,
            mode: Mode::Lalr1(LalrConstruction::BySlr1),
        }
    }
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn lex_grammar(mut self, lex_grammar: LexGrammar) -> Self {
        self.lex_grammar = Some(lex_grammar);
        self
    }

    /// Declares a symbolic token terminal (e.g. `NUMBER`), returning its
    /// index. Declaring the same name twice returns the existing index.
    pub fn token(&mut self, name: &str) -> Result<TermIndex, GrammarError> {
        self.terminal(name, TerminalKind::Token)
    }

    /// Declares a quoted literal terminal (e.g. `'+'`).
    pub fn literal(&mut self, name: &str) -> Result<TermIndex, GrammarError> {
        self.terminal(name, TerminalKind::Literal)
    }

    fn terminal(&mut self, name: &str, kind: TerminalKind) -> Result<TermIndex, GrammarError> {
        if name == EMPTY_NAME || name == STOP_NAME {
            return Err(GrammarError::ReservedSymbolName(name.to_string()));
        }
        if let Some(existing) = self.terminals.iter().position(|t| t.name == name) {
            return Ok(TermIndex(existing));
        }
        Ok(self.terminals.push(Terminal { name: name.to_string(), kind }))
    }

    /// Declares a non-terminal, returning its index. Declaring the same
    /// name twice returns the existing index.
    pub fn nonterminal(&mut self, name: &str) -> Result<NonTermIndex, GrammarError> {
        if name == ACCEPT_NAME {
            return Err(GrammarError::ReservedSymbolName(name.to_string()));
        }
        if let Some(existing) = self.nonterminals.iter().position(|n| n.name == name) {
            return Ok(NonTermIndex(existing));
        }
        Ok(self.nonterminals.push(NonTerminalDef { name: name.to_string(), productions: vec![] }))
    }

    pub fn start(mut self, nonterminal: NonTermIndex) -> Self {
        self.start_symbol = Some(nonterminal);
        self
    }

    pub fn precedence(mut self, terminal: TermIndex, level: i32, assoc: Associativity) -> Self {
        self.operator_precedence.insert(terminal, Precedence { level, assoc });
        self
    }

    /// Adds a production `lhs → rhs`. An empty `rhs` is an epsilon
    /// production.
    pub fn production(
        &mut self,
        lhs: NonTermIndex,
        rhs: Vec<Symbol>,
        precedence: Option<Precedence>,
        action: Option<String>,
    ) -> ProdIndex {
        let is_epsilon = rhs.is_empty();
        let number = ProdIndex(self.productions.len());
        self.productions.push(Production { number, lhs, rhs, is_epsilon, precedence, action });
        self.nonterminals[lhs].productions.push(number);
        number
    }

    pub fn build(mut self) -> Result<Grammar, GrammarError> {
        let start_symbol = self.start_symbol.ok_or(GrammarError::NoStartSymbol)?;

        // Production 0: $accept → S $
        let accept_rhs = vec![Symbol::NonTerminal(start_symbol), Symbol::Terminal(TermIndex(1))];
        let augmented = Production {
            number: ProdIndex(0),
            lhs: NonTermIndex(0),
            rhs: accept_rhs,
            is_epsilon: false,
            precedence: None,
            action: None,
        };
        let mut productions = ProdVec::new();
        productions.push(augmented);
        for p in self.productions.iter() {
            productions.push(Production { number: ProdIndex(productions.len()), ..p.clone() });
        }
        self.nonterminals[NonTermIndex(0)].productions = vec![ProdIndex(0)];
        for nt in self.nonterminals.iter_mut().skip(1) {
            nt.productions = nt.productions.iter().map(|p| ProdIndex(p.0 + 1)).collect();
        }

        // Validate: every RHS symbol must resolve (terminals/nonterminals
        // were only handed out through this builder, so the index spaces
        // are closed by construction); check every nonterminal has at
        // least one production, and that is_epsilon matches an empty RHS.
        for (idx, nt) in self.nonterminals.iter().enumerate() {
            if idx == 0 {
                continue;
            }
            if nt.productions.is_empty() {
                return Err(GrammarError::UndefinedSymbol(nt.name.clone()));
            }
        }
        for p in productions.iter() {
            let empty_rhs = p.rhs.is_empty();
            if empty_rhs != p.is_epsilon {
                return Err(GrammarError::DuplicateProduction(format!(
                    "production {} has inconsistent epsilon flag",
                    p.number.0
                )));
            }
        }

        Ok(Grammar {
            productions,
            terminals: self.terminals,
            nonterminals: self.nonterminals,
            start_symbol,
            mode: self.mode,
            operator_precedence: self.operator_precedence,
            lex_grammar: self.lex_grammar,
            empty_index: TermIndex(0),
            stop_index: TermIndex(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balanced_grammar() -> Grammar {
        // S -> 'a' S 'b' | ε
        let mut b = GrammarBuilder::new();
        let a = b.literal("a").unwrap();
        let bt = b.literal("b").unwrap();
        let s = b.nonterminal("S").unwrap();
        b.production(s, vec![Symbol::Terminal(a), Symbol::NonTerminal(s), Symbol::Terminal(bt)], None, None);
        b.production(s, vec![], None, None);
        b.start(s).build().unwrap()
    }

    #[test]
    fn augmented_production_is_first() {
        let g = balanced_grammar();
        let aug = &g.productions[ProdIndex(0)];
        assert_eq!(aug.lhs, NonTermIndex(0));
        assert_eq!(aug.rhs.len(), 2);
        assert!(!aug.is_epsilon);
    }

    #[test]
    fn epsilon_production_flagged() {
        let g = balanced_grammar();
        let eps = g.productions.iter().find(|p| p.rhs.is_empty()).unwrap();
        assert!(eps.is_epsilon);
    }

    #[test]
    fn reserved_names_rejected() {
        let mut b = GrammarBuilder::new();
        assert!(b.token(STOP_NAME).is_err());
        assert!(b.literal(EMPTY_NAME).is_err());
        assert!(b.nonterminal(ACCEPT_NAME).is_err());
    }

    #[test]
    fn no_start_symbol_is_an_error() {
        let mut b = GrammarBuilder::new();
        let s = b.nonterminal("S").unwrap();
        b.production(s, vec![], None, None);
        assert!(matches!(b.build(), Err(GrammarError::NoStartSymbol)));
    }
}
