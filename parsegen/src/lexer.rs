//! C7 data model: the regex-based lexical specification a [`Grammar`] may
//! carry. The runtime state machine that consumes it lives in
//! [`crate::tokenizer`]; this module only describes the rules.
//!
//! [`Grammar`]: crate::grammar::Grammar

use regex::Regex;

/// The tokenizer state a rule fires in. The
/// state `INITIAL` always exists.
pub const INITIAL: &str = "INITIAL";

/// What a matched rule produces. Handlers are data, not closures: spec §9's
/// design note rules out a process-wide mutable "sandbox", and the core
/// does not host semantic-action scripting (spec §1 Non-goals), so a rule's
/// effect is a fixed, declared outcome rather than arbitrary logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexAction {
    /// Emit a single token of the given type, with the matched text as its
    /// value.
    Emit(String),
    /// Emit a list of token types; the first is returned immediately, the
    /// rest are enqueued with empty values.
    EmitMany(Vec<String>),
    /// Consume the match without producing a token.
    Skip,
}

/// One lexical rule: an anchored regex, the start conditions it is active
/// in, the handler, and case sensitivity.
#[derive(Debug, Clone)]
pub struct LexRule {
    pub number: usize,
    /// Compiled with an implicit `^` so matches are always anchored at the
    /// current cursor position (spec §3: "anchored at current position").
    pub matcher: Regex,
    /// The raw pattern text `matcher` was compiled from, before the `^(?:…)`
    /// anchor wrapping. Kept alongside the compiled form so a source
    /// generator can re-emit `LexRule::new` calls without having to parse
    /// the anchor back out of `matcher.as_str()`.
    pub pattern: String,
    pub start_conditions: Vec<String>,
    pub action: LexAction,
    /// Pushed onto the tokenizer's state stack when this rule fires, if any
    /// (a rule's own `begin`/`pushState` side effect, declared rather than
    /// invoked imperatively).
    pub push_state: Option<String>,
    /// Whether this rule pops the current state when it fires.
    pub pop_state: bool,
    pub case_insensitive: bool,
}

impl LexRule {
    /// Builds a rule from a regex pattern (without the anchor — this
    /// compiles `^(?:pattern)` internally, optionally `(?i)`-prefixed).
    pub fn new(
        number: usize,
        pattern: &str,
        start_conditions: Vec<String>,
        action: LexAction,
        case_insensitive: bool,
    ) -> Result<Self, regex::Error> {
        let anchored = if case_insensitive {
            format!("^(?i:{})", pattern)
        } else {
            format!("^(?:{})", pattern)
        };
        Ok(LexRule {
            number,
            matcher: Regex::new(&anchored)?,
            pattern: pattern.to_string(),
            start_conditions,
            action,
            push_state: None,
            pop_state: false,
            case_insensitive,
        })
    }

    pub fn with_push_state(mut self, name: &str) -> Self {
        self.push_state = Some(name.to_string());
        self
    }

    pub fn with_pop_state(mut self) -> Self {
        self.pop_state = true;
        self
    }
}

/// The ordered list of lex rules, plus the per-start-condition ordering of
/// which rules are active (spec §3 `LexGrammar`).
#[derive(Debug, Clone)]
pub struct LexGrammar {
    pub rules: Vec<LexRule>,
    rules_by_start_condition: Vec<(String, Vec<usize>)>,
}

impl LexGrammar {
    pub fn new(rules: Vec<LexRule>) -> Self {
        let mut rules_by_start_condition: Vec<(String, Vec<usize>)> = vec![];
        for rule in &rules {
            for sc in &rule.start_conditions {
                if let Some((_, indices)) =
                    rules_by_start_condition.iter_mut().find(|(name, _)| name == sc)
                {
                    indices.push(rule.number);
                } else {
                    rules_by_start_condition.push((sc.clone(), vec![rule.number]));
                }
            }
        }
        if !rules_by_start_condition.iter().any(|(name, _)| name == INITIAL) {
            rules_by_start_condition.push((INITIAL.to_string(), vec![]));
        }
        LexGrammar { rules, rules_by_start_condition }
    }

    /// Rule indices active in `start_condition`, in declaration order
    ///.
    pub fn rules_for_state(&self, start_condition: &str) -> &[usize] {
        self.rules_by_start_condition
            .iter()
            .find(|(name, _)| name == start_condition)
            .map(|(_, indices)| indices.as_slice())
            .unwrap_or(&[])
    }
}
