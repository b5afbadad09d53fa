//! Parse without output and report diagnostics.

use super::read_input;
use anyhow::{bail, Result};
use libadoc_core::{asciidoc_grammar, parse_with, ParseOptions};
use libadoc_peg::ErrorContext;
use std::path::Path;
use tracing::debug;

const DEFAULT_ENTRY: &str = "Document";

pub fn check_file(
    path: &Path,
    entry: Option<&str>,
    options: &ParseOptions,
    stats: bool,
) -> Result<()> {
    let input = read_input(path)?;
    let entry = entry
        .or(options.entrypoint.as_deref())
        .unwrap_or(DEFAULT_ENTRY);
    debug!(entry, "checking {}", path.display());

    match parse_with(asciidoc_grammar(), entry, &input, options) {
        Ok(output) => {
            println!("{}: ok", path.display());
            if stats {
                println!("{}", serde_json::to_string_pretty(&output.stats)?);
            }
            Ok(())
        }
        Err(err) => {
            let source = String::from_utf8_lossy(&input);
            eprint!("{}", ErrorContext::new(&source, &err));
            bail!("{} does not parse", path.display())
        }
    }
}
