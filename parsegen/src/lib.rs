//! Grammar analysis and table-construction engine.
//!
//! Given a [`grammar::Grammar`] (optionally carrying a [`lexer::LexGrammar`]),
//! this crate builds First/Follow/Predict sets ([`sets`]), the canonical
//! collection of LR items and states ([`item`], [`state`], [`canonical`]),
//! the LR action/goto table or the LL(1) predict table ([`lr_table`],
//! [`ll_table`]), and drives a parse over either with a regex-based
//! tokenizer ([`tokenizer`], [`lr_driver`], [`ll_driver`]).
//!
//! Grammar file parsing, CLI plumbing, and source-emitting code generation
//! are external collaborators layered on top of this crate (the `parsegen-gen`
//! crate in this workspace); this crate only builds and runs the tables.

#[macro_use]
pub mod debug;

pub mod canonical;
pub mod error;
pub mod grammar;
pub mod item;
pub mod lexer;
pub mod ll_driver;
pub mod ll_table;
pub mod lr_driver;
pub mod lr_table;
pub mod settings;
pub mod sets;
pub mod state;
pub mod token;
pub mod tokenizer;

pub use error::{Error, Result};
pub use grammar::{Grammar, GrammarBuilder, Mode};
pub use settings::Settings;
