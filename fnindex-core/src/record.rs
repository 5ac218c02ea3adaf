//! Function records emitted by the parser
//!
//! Global invariants enforced:
//! - A record is created once, when its declaration line is matched, and
//!   never mutated afterwards
//! - Every record belongs to exactly one file
//! - `keywords` holds no empty and no case-insensitively duplicated entry

use serde::{Deserialize, Serialize};

/// Location of a source file, shared by every record parsed from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIdentity {
    pub file_name: String,
    pub file_path: String,
    /// Path relative to the source container, `/`-separated on every platform
    pub relative_path: String,
}

impl FileIdentity {
    /// Build an identity for a file under `source_root`
    ///
    /// Falls back to the full path when `path` is not below `source_root`.
    pub fn new(path: &std::path::Path, source_root: &std::path::Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let relative = path.strip_prefix(source_root).unwrap_or(path);
        let relative_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        FileIdentity {
            file_name,
            file_path: path.to_string_lossy().into_owned(),
            relative_path,
        }
    }

    /// Identity for source text that has no backing file
    pub fn virtual_file(relative_path: &str) -> Self {
        let file_name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(relative_path)
            .to_string();
        FileIdentity {
            file_name,
            file_path: relative_path.to_string(),
            relative_path: relative_path.to_string(),
        }
    }
}

/// One detected function declaration
///
/// `namespace` and `class_name` are the first namespace and first class found
/// anywhere in the file (first match wins). Files declaring several classes
/// stamp all of their functions with the first one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FunctionRecord {
    pub file_name: String,
    pub file_path: String,
    pub relative_path: String,
    pub namespace: String,
    pub class_name: String,
    pub function_name: String,
    pub signature: String,
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<String>,
    pub is_lifecycle_callback: bool,
    pub is_async_generator: bool,
    #[serde(default)]
    pub keywords: Vec<String>,
}
