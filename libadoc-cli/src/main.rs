//! # libadoc CLI
//!
//! Command-line front end for parsing AsciiDoc documents.

mod commands;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use libadoc_core::ParseOptions;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "libadoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML file with parse options
    #[arg(long, global = true, env = "LIBADOC_OPTIONS")]
    options: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides applied on top of the options file.
#[derive(Args, Debug, Default)]
struct ParseFlags {
    /// Cache rule results per position
    #[arg(long)]
    memoize: bool,

    /// Abort after evaluating this many expressions
    #[arg(long)]
    max_expressions: Option<u64>,

    /// Replace invalid UTF-8 instead of failing
    #[arg(long)]
    allow_invalid_utf8: bool,
}

impl ParseFlags {
    fn apply(&self, mut options: ParseOptions) -> ParseOptions {
        if self.memoize {
            options = options.with_memoization(true);
        }
        if let Some(limit) = self.max_expressions {
            options = options.with_max_expressions(limit);
        }
        if self.allow_invalid_utf8 {
            options = options.with_invalid_utf8(true);
        }
        options
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a document and print its tree as JSON
    Parse {
        /// Input file
        input: PathBuf,

        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,

        #[command(flatten)]
        flags: ParseFlags,
    },

    /// Report whether a file parses, with diagnostics when it does not
    Check {
        /// Input file
        input: PathBuf,

        /// Rule to start from (defaults to Document)
        #[arg(long)]
        entry: Option<String>,

        /// Print parse statistics as JSON
        #[arg(long)]
        stats: bool,

        #[command(flatten)]
        flags: ParseFlags,
    },

    /// List the anchor ID of every section
    Anchors {
        /// Input file
        input: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        flags: ParseFlags,
    },
}

fn load_options(path: Option<&Path>, flags: &ParseFlags) -> anyhow::Result<ParseOptions> {
    let options = match path {
        Some(path) => ParseOptions::from_file(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => ParseOptions::default(),
    };
    Ok(flags.apply(options))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let options_path = cli.options.as_deref();
    match cli.command {
        Commands::Parse {
            input,
            pretty,
            flags,
        } => commands::parse_file(&input, &load_options(options_path, &flags)?, pretty),
        Commands::Check {
            input,
            entry,
            stats,
            flags,
        } => commands::check_file(
            &input,
            entry.as_deref(),
            &load_options(options_path, &flags)?,
            stats,
        ),
        Commands::Anchors { input, json, flags } => {
            commands::list_anchors(&input, &load_options(options_path, &flags)?, json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let flags = ParseFlags {
            memoize: true,
            max_expressions: Some(50),
            allow_invalid_utf8: false,
        };
        let options = flags.apply(ParseOptions::default());
        assert!(options.memoize);
        assert_eq!(options.max_expressions, Some(50));
        assert!(!options.allow_invalid_utf8);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
