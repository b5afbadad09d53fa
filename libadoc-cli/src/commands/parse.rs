//! Dump the document tree as JSON.

use super::read_input;
use anyhow::{Context, Result};
use libadoc_core::{parse_document, ParseOptions};
use std::path::Path;
use tracing::info;

pub fn parse_file(path: &Path, options: &ParseOptions, pretty: bool) -> Result<()> {
    let input = read_input(path)?;
    let document = parse_document(&input, options)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    info!(
        blocks = document.elements.len(),
        sections = document.sections().len(),
        "parsed {}",
        path.display()
    );

    let json = if pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    println!("{json}");
    Ok(())
}
