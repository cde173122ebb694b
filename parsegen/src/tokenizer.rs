//! C7: the regex-based, state-stacked tokenizer runtime that consumes a
//! [`LexGrammar`].
//!
//! A [`Tokenizer`] is mutable (cursor, state stack, pending queue) and is
//! not shared between threads, unlike the immutable [`Grammar`] it reads
//! from.
//!
//! [`Grammar`]: crate::grammar::Grammar

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::lexer::{LexAction, LexGrammar, INITIAL};
use crate::token::{LineCol, Location, Token};

/// What a caller substitutes via `setTokenizer` must implement.
pub trait TokenSource {
    fn init_string(&mut self, input: &str);
    fn has_more_tokens(&self) -> bool;
    fn get_next_token(&mut self) -> Result<Token>;
    fn is_eof(&self) -> bool {
        !self.has_more_tokens()
    }
}

pub struct Tokenizer<'g> {
    grammar: &'g LexGrammar,
    input: String,
    cursor: usize,
    states: Vec<String>,
    pending: VecDeque<Token>,
    capture_locations: bool,
    line: usize,
    column: usize,
    line_begin_offset: usize,
}

impl<'g> Tokenizer<'g> {
    pub fn new(grammar: &'g LexGrammar, capture_locations: bool) -> Self {
        Tokenizer {
            grammar,
            input: String::new(),
            cursor: 0,
            states: vec![INITIAL.to_string()],
            pending: VecDeque::new(),
            capture_locations,
            line: 1,
            column: 0,
            line_begin_offset: 0,
        }
    }

    pub fn current_state(&self) -> &str {
        self.states.last().expect("INITIAL is never popped")
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn push_state(&mut self, name: &str) {
        self.states.push(name.to_string());
    }

    /// Alias for [`Tokenizer::push_state`] (spec §4.6: `begin` is an alias
    /// for `pushState`).
    pub fn begin(&mut self, name: &str) {
        self.push_state(name);
    }

    /// Never pops below `INITIAL`.
    pub fn pop_state(&mut self) -> Option<String> {
        if self.states.len() > 1 {
            self.states.pop()
        } else {
            None
        }
    }

    fn position(&self) -> LineCol {
        LineCol { line: self.line, column: self.cursor - self.line_begin_offset }
    }

    fn advance_location(&mut self, consumed: &str) {
        for ch in consumed.chars() {
            if ch == '\n' {
                self.line += 1;
                self.line_begin_offset = self.cursor + ch.len_utf8();
            }
        }
        let _ = self.column;
    }

    fn try_match(&mut self) -> Result<Option<(usize, String, LexAction)>> {
        let remaining = &self.input[self.cursor..];
        let rule_indices = self.grammar.rules_for_state(self.current_state()).to_vec();
        for idx in rule_indices {
            let rule = &self.grammar.rules[idx];
            if let Some(m) = rule.matcher.find(remaining) {
                let matched = m.as_str().to_string();
                return Ok(Some((idx, matched, rule.action.clone())));
            }
        }
        if remaining.is_empty() {
            return Ok(None);
        }
        let bad_char = remaining.chars().next().unwrap();
        let at = self.position();
        let line_end = remaining.find('\n').map(|i| self.cursor + i).unwrap_or(self.input.len());
        let snippet = format!(
            "{}\n{}^",
            &self.input[self.line_begin_offset..line_end],
            " ".repeat(at.column)
        );
        Err(Error::Tokenization { char: bad_char, at: at.into(), snippet })
    }
}

impl<'g> TokenSource for Tokenizer<'g> {
    fn init_string(&mut self, input: &str) {
        self.input = input.to_string();
        self.cursor = 0;
        self.states = vec![INITIAL.to_string()];
        self.pending.clear();
        self.line = 1;
        self.column = 0;
        self.line_begin_offset = 0;
    }

    fn has_more_tokens(&self) -> bool {
        !self.pending.is_empty() || self.cursor <= self.input.len()
    }

    /// Spec §4.6's five-step algorithm.
    fn get_next_token(&mut self) -> Result<Token> {
        if let Some(tok) = self.pending.pop_front() {
            return Ok(tok);
        }
        if self.cursor > self.input.len() {
            let at = self.position();
            return Ok(Token::eof(self.cursor, self.capture_locations.then_some(Location { start: at, end: at })));
        }

        loop {
            match self.try_match()? {
                None => {
                    // Cursor at end: synthesize EOF and advance cursor past
                    // the end so subsequent calls keep returning EOF.
                    let at = self.position();
                    self.cursor = self.input.len() + 1;
                    return Ok(Token::eof(self.input.len(), self.capture_locations.then_some(Location { start: at, end: at })));
                }
                Some((rule_idx, matched, action)) => {
                    let start_offset = self.cursor;
                    let start_loc = self.position();
                    let consumed_len = matched.len().max(1);
                    self.advance_location(&self.input[self.cursor..self.cursor + matched.len()]);
                    self.cursor += consumed_len;
                    let end_loc = self.position();
                    let loc = self
                        .capture_locations
                        .then_some(Location { start: start_loc, end: end_loc });

                    let rule = &self.grammar.rules[rule_idx];
                    if let Some(name) = &rule.push_state {
                        self.states.push(name.clone());
                    }
                    if rule.pop_state {
                        self.pop_state();
                    }

                    match action {
                        LexAction::Skip => continue,
                        LexAction::Emit(ty) => {
                            return Ok(Token {
                                ty,
                                value: matched,
                                start: start_offset,
                                end: start_offset + matched.len(),
                                loc,
                            });
                        }
                        LexAction::EmitMany(types) => {
                            let mut iter = types.into_iter();
                            let first = iter.next().expect("EmitMany is non-empty");
                            for ty in iter {
                                self.pending.push_back(Token {
                                    ty,
                                    value: String::new(),
                                    start: start_offset + matched.len(),
                                    end: start_offset + matched.len(),
                                    loc,
                                });
                            }
                            return Ok(Token {
                                ty: first,
                                value: matched,
                                start: start_offset,
                                end: start_offset + matched.len(),
                                loc,
                            });
                        }
                    }
                }
            }
        }
    }
}

impl<'g> Tokenizer<'g> {
    /// Repeated `getNextToken` until EOF, collected (spec §8 "tokenizer
    /// determinism" property references `getTokens`).
    pub fn get_tokens(&mut self) -> Result<Vec<Token>> {
        let mut tokens = vec![];
        loop {
            let tok = self.get_next_token()?;
            let is_eof = tok.ty == "$";
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }
}
