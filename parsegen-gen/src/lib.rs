//! The external collaborator spec §1/§6 calls out as plumbing around the
//! core: bit-exact table serialization and a Rust source generator
//! (`generator`), plus the CLI binary in `src/bin/parsegen_gen.rs` that
//! drives grammar construction from the command line.
//!
//! This crate targets Rust only (spec §13 non-goal: no polyglot template
//! engine) and does not parse textual grammar files (spec §1/§6: that front
//! end is a separate external collaborator this workspace does not build).
//! Grammars here are assembled programmatically via `parsegen::GrammarBuilder`
//! — the CLI's built-in demo grammars, or a caller's own code linking this
//! crate as a library.

pub mod generator;
pub mod serialize;

pub mod demo;
