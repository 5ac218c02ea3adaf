//! fnindex core library - function index generation for Unity C# projects

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Parsing is strictly per-file and per-line
// - No global mutable state (lookup tables are passed by reference)
// - No clocks or randomness; file order is explicit
// - Identical input yields byte-for-byte identical output

pub mod config;
pub mod error;
pub mod keywords;
pub mod parser;
pub mod patterns;
pub mod record;
pub mod report;
pub mod scan;

pub use config::ResolvedConfig;
pub use error::IndexError;
pub use parser::Vocabulary;
pub use record::FunctionRecord;
pub use report::{render_json, render_markdown, IndexStats, RenderOptions};
pub use scan::{scan_project, ScanOutcome};

use std::path::Path;

/// Persist a rendered index
pub fn write_index(path: &Path, contents: &str) -> error::Result<()> {
    std::fs::write(path, contents).map_err(|source| IndexError::OutputWriteFailure {
        path: path.to_path_buf(),
        source,
    })
}
