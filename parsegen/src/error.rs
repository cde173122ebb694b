//! The four error kinds from spec §7, as an explicit failure type rather
//! than panics or exceptions-for-control-flow (see Design Notes, §9).

use std::fmt;

use crate::lr_table::LRConflict;
use crate::ll_table::LLConflict;
use crate::token::Token;

/// A single point in the source, used by tokenization and parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Top-level failure, distinguishing the four kinds spec §7 lists. Table
/// construction errors surface at generator time; tokenization and parse
/// errors at parse time. Nothing is recovered internally.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Grammar-construction error: undefined symbol, duplicate production,
    /// no start symbol. Raised synchronously during grammar validation.
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),

    /// Table-construction conflict (LR shift/reduce, reduce/reduce, or LL
    /// First/First, First/Follow), unresolved.
    #[error("table construction conflict: {0}")]
    TableConflict(#[from] TableConflict),

    /// No lex rule matches the remaining input.
    #[error("unexpected character {char:?} at {at}")]
    Tokenization { char: char, at: Position, snippet: String },

    /// The action cell is Error for the current (state, lookahead), or the
    /// LL table has no entry for (non-terminal, lookahead).
    #[error("unexpected token {found:?} at {at}")]
    Parse { found: String, at: Position, expected: Vec<String> },

    /// Specialization of `Parse` where the lookahead is `$`.
    #[error("unexpected end of input, expected one of {expected:?}")]
    UnexpectedEof { expected: Vec<String> },
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("symbol {0:?} appears on a production RHS but is neither a terminal nor the LHS of any production")]
    UndefinedSymbol(String),

    #[error("no start symbol declared")]
    NoStartSymbol,

    #[error("duplicate production: {0}")]
    DuplicateProduction(String),

    #[error("reserved symbol name {0:?} used as a user-defined symbol")]
    ReservedSymbolName(String),

    #[error("First set for symbol {0:?} is empty: infinite recursion in the grammar")]
    EmptyFirstSet(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TableConflict {
    #[error("shift/reduce conflict in state {state} on {terminal}: shift to {shift_to} vs reduce by production {reduce_prod}")]
    ShiftReduce {
        state: usize,
        terminal: String,
        shift_to: usize,
        reduce_prod: usize,
    },

    #[error("reduce/reduce conflict in state {state} on {terminal}: productions {prod_a} and {prod_b}")]
    ReduceReduce {
        state: usize,
        terminal: String,
        prod_a: usize,
        prod_b: usize,
    },

    #[error("LL(1) conflict for non-terminal {nonterminal} on {terminal}: productions {productions:?}")]
    Ll {
        nonterminal: String,
        terminal: String,
        productions: Vec<usize>,
    },
}

impl From<LRConflict> for TableConflict {
    fn from(c: LRConflict) -> Self {
        match c {
            LRConflict::ShiftReduce { state, terminal, shift_to, reduce_prod } => {
                TableConflict::ShiftReduce {
                    state: state.0,
                    terminal,
                    shift_to: shift_to.0,
                    reduce_prod: reduce_prod.0,
                }
            }
            LRConflict::ReduceReduce { state, terminal, prod_a, prod_b } => {
                TableConflict::ReduceReduce {
                    state: state.0,
                    terminal,
                    prod_a: prod_a.0,
                    prod_b: prod_b.0,
                }
            }
        }
    }
}

impl From<LLConflict> for TableConflict {
    fn from(c: LLConflict) -> Self {
        TableConflict::Ll {
            nonterminal: c.nonterminal,
            terminal: c.terminal,
            productions: c.productions.into_iter().map(|p| p.0).collect(),
        }
    }
}

impl Error {
    /// Builds a parse error from the unexpected token and the names of the
    /// symbols that would have been accepted; `$` in
    /// `found.ty` specializes to "unexpected end of input".
    pub fn parse(found: &Token, expected: Vec<String>) -> Self {
        let at = found.loc.map(|l| l.start.into()).unwrap_or_default();
        if found.ty == "$" {
            Error::UnexpectedEof { expected }
        } else {
            Error::Parse { found: found.ty.clone(), at, expected }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
