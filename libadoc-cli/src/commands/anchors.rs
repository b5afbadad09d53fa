//! Section anchors, one per line.

use super::read_input;
use anyhow::{Context, Result};
use libadoc_core::{parse_document, ParseOptions};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct AnchorEntry<'a> {
    level: usize,
    id: &'a str,
    title: String,
}

pub fn list_anchors(path: &Path, options: &ParseOptions, json: bool) -> Result<()> {
    let input = read_input(path)?;
    let document = parse_document(&input, options)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let entries: Vec<AnchorEntry> = document
        .sections()
        .into_iter()
        .map(|section| AnchorEntry {
            level: section.level,
            id: &section.title.id,
            title: section.title.content.to_string(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for entry in &entries {
        println!("{}{}", "  ".repeat(entry.level.saturating_sub(1)), entry.id);
    }
    Ok(())
}
