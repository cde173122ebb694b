//! The "Recognized options" of spec §6, as a plain struct with `Default`
//! (grounded on the teacher's `Settings` shape referenced from
//! `rustemo-tools/src/generator/mod.rs`, trimmed to what the core itself
//! reads — target-language/builder choices are a `parsegen-gen` concern,
//! not this crate's).

use crate::grammar::Mode;

/// Parser construction mode, mirroring [`Mode`] but without the
/// LALR(1)-by-SLR1/by-CLR1 construction-strategy detail `spec.md` keeps
/// internal to [`crate::grammar::Mode`] — callers pick a construction
/// strategy elsewhere; `ParserMode` is just which of the five table shapes
/// spec §6 exposes to a caller setting `mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserMode {
    Lr0,
    Slr1,
    Lalr1,
    Clr1,
    Ll1,
}

impl From<Mode> for ParserMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Lr0 => ParserMode::Lr0,
            Mode::Slr1 => ParserMode::Slr1,
            Mode::Lalr1(_) => ParserMode::Lalr1,
            Mode::Clr1 => ParserMode::Clr1,
            Mode::Ll1 => ParserMode::Ll1,
        }
    }
}

/// Recognized options: `captureLocations`, `resolveConflicts`,
/// `mode`, `customTokenizer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub capture_locations: bool,
    pub resolve_conflicts: bool,
    pub mode: ParserMode,
    pub custom_tokenizer: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            capture_locations: false,
            // Table construction defaults conflict-resolution off (spec
            // §6): conflicts are reported, not silently resolved, unless a
            // caller opts in.
            resolve_conflicts: false,
            mode: ParserMode::Lalr1,
            custom_tokenizer: false,
        }
    }
}

impl Settings {
    /// Returns a copy of `self` with `overrides` applied. Used to implement
    /// the "Options scoping" testable property: `parse(s, opts)`
    /// temporarily overrides the current settings and the prior settings are
    /// restored on return, success or failure, because the caller never
    /// mutates the stored `Settings` in place — it calls `with_overrides`,
    /// uses the result for one parse, and drops it.
    pub fn with_overrides(&self, overrides: Settings) -> Settings {
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let settings = Settings::default();
        assert!(!settings.capture_locations);
        assert!(!settings.resolve_conflicts);
        assert_eq!(settings.mode, ParserMode::Lalr1);
        assert!(!settings.custom_tokenizer);
    }

    #[test]
    fn overrides_do_not_mutate_the_original() {
        let base = Settings::default();
        let scoped = base.with_overrides(Settings { capture_locations: true, ..base });
        assert!(scoped.capture_locations);
        assert!(!base.capture_locations);
    }
}
