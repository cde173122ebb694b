//! `clap`-based CLI driving grammar construction from the command line
//! (spec §6's "a generated parser or embedded use" entry point). Grammar
//! text parsing is out of scope (spec §1/§6), so this binary builds one of
//! a handful of built-in demo grammars (spec §8's scenarios) rather than
//! reading a `.g`/`.y` file — the CLI-argument-handling *plumbing* spec §1
//! scopes out is how the core is invoked, not whether a toolkit ships one.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use parsegen::canonical::CanonicalCollection;
use parsegen::grammar::{LalrConstruction, Mode};
use parsegen::ll_table::LLTable;
use parsegen::lr_table::LRTable;
use parsegen::sets::SetsEngine;
use parsegen_gen::{demo, generator};

#[derive(Parser)]
#[command(name = "parsegen-gen", about = "Builds parsing tables and emits a generated Rust parser", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the table for a built-in demo grammar and emit a Rust module.
    Generate {
        #[arg(value_enum)]
        grammar: DemoGrammar,
        #[arg(value_enum, long, default_value = "lalr1")]
        mode: CliMode,
        #[arg(long)]
        out: PathBuf,
    },
    /// Build the table and print its conflicts (if any) without emitting code.
    Check {
        #[arg(value_enum)]
        grammar: DemoGrammar,
        #[arg(value_enum, long, default_value = "lalr1")]
        mode: CliMode,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DemoGrammar {
    Calculator,
    Balanced,
    Expression,
}

#[derive(Clone, Copy, ValueEnum)]
enum CliMode {
    Lr0,
    Slr1,
    Lalr1,
    Clr1,
    Ll1,
}

impl From<CliMode> for Mode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Lr0 => Mode::Lr0,
            CliMode::Slr1 => Mode::Slr1,
            CliMode::Lalr1 => Mode::Lalr1(LalrConstruction::ByClr1),
            CliMode::Clr1 => Mode::Clr1,
            CliMode::Ll1 => Mode::Ll1,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate { grammar, mode, out } => generate(grammar, mode.into(), out),
        Command::Check { grammar, mode } => check(grammar, mode.into()),
    }
}

fn build_demo(grammar: DemoGrammar, mode: Mode) -> parsegen::Grammar {
    match grammar {
        DemoGrammar::Calculator => demo::calculator(mode),
        DemoGrammar::Balanced => demo::balanced(mode),
        DemoGrammar::Expression => demo::expression(),
    }
}

fn generate(grammar: DemoGrammar, mode: Mode, out: PathBuf) {
    let g = build_demo(grammar, mode);
    let module_name = match grammar {
        DemoGrammar::Calculator => "calculator",
        DemoGrammar::Balanced => "balanced",
        DemoGrammar::Expression => "expression",
    };

    let source = if matches!(mode, Mode::Ll1) {
        let sets = SetsEngine::build(&g);
        let table = LLTable::build(&g, &sets);
        report_ll_conflicts(&table);
        generator::dump_ll_table(&g, &table)
    } else {
        let sets = SetsEngine::build(&g);
        let collection = CanonicalCollection::build(&g, &sets);
        let table = LRTable::build(&g, &sets, &collection, true);
        report_lr_conflicts(&table);
        generator::generate_lr_parser(&g, &table, module_name).expect("writing to an in-memory String never fails")
    };

    fs::write(&out, source).unwrap_or_else(|e| panic!("failed to write {out:?}: {e}"));
    eprintln!("wrote {}", out.display());
}

fn check(grammar: DemoGrammar, mode: Mode) {
    let g = build_demo(grammar, mode);
    if matches!(mode, Mode::Ll1) {
        let sets = SetsEngine::build(&g);
        let table = LLTable::build(&g, &sets);
        report_ll_conflicts(&table);
    } else {
        let sets = SetsEngine::build(&g);
        let collection = CanonicalCollection::build(&g, &sets);
        let table = LRTable::build(&g, &sets, &collection, false);
        report_lr_conflicts(&table);
    }
}

fn report_lr_conflicts(table: &LRTable) {
    if table.conflicts.is_empty() {
        eprintln!("no conflicts");
        return;
    }
    for conflict in &table.conflicts {
        eprintln!("{conflict:?}");
    }
}

fn report_ll_conflicts(table: &LLTable) {
    if table.conflicts.is_empty() {
        eprintln!("no conflicts");
        return;
    }
    for conflict in &table.conflicts {
        eprintln!("{conflict:?}");
    }
}
