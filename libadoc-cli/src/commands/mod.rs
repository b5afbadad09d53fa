//! CLI command implementations.

pub mod anchors;
pub mod check;
pub mod parse;

pub use anchors::list_anchors;
pub use check::check_file;
pub use parse::parse_file;

use anyhow::{Context, Result};
use std::path::Path;

/// Raw bytes of `path`; decoding is left to the parser.
fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}
