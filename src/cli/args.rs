//! Defines the command-line arguments and subcommands for the macroasm CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "macroasm",
    version,
    about = "Expands MACRO/MEND macro definitions in assembly source."
)]
pub struct MacroasmArgs {
    /// Log expansion activity to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand that reads a source file.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// The path to the macro source file.
    #[arg(required = true)]
    pub file: PathBuf,

    /// YAML file overriding the macro syntax (keywords, comment characters, label format).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Expand the source and write the `.asm` output file.
    Expand {
        #[command(flatten)]
        source: SourceArgs,

        /// Write to this path instead of the source's `.asm` sibling.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print the fully macro-expanded source to stdout.
    Print {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Show each macro expansion with its bindings and label renames.
    Trace {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// List the macros defined in the source.
    Macros {
        #[command(flatten)]
        source: SourceArgs,

        /// Emit the definitions as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn argument_definitions_are_consistent() {
        MacroasmArgs::command().debug_assert();
    }

    #[test]
    fn parses_expand_with_output() {
        let args =
            MacroasmArgs::try_parse_from(["macroasm", "expand", "prog.mac", "-o", "out.asm"])
                .unwrap();
        match args.command {
            Command::Expand { source, output } => {
                assert_eq!(source.file, PathBuf::from("prog.mac"));
                assert_eq!(output, Some(PathBuf::from("out.asm")));
                assert!(source.config.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn verbose_is_global() {
        let args =
            MacroasmArgs::try_parse_from(["macroasm", "macros", "prog.mac", "--json", "-v"])
                .unwrap();
        assert!(args.verbose);
        assert!(matches!(args.command, Command::Macros { json: true, .. }));
    }
}
