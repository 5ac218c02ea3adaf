//! Configuration file support for fnindex
//!
//! Loads project-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.fnindexrc.json` in project root
//! 3. `fnindex.config.json` in project root
//!
//! All fields are optional. CLI arguments take precedence over config values.

use crate::parser::{Vocabulary, DEFAULT_COROUTINE_MARKER};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SOURCE_DIR: &str = "Assets";
pub const DEFAULT_EXTENSION: &str = "cs";
pub const DEFAULT_MAX_KEYWORDS: usize = 8;
pub const DEFAULT_OUTPUT: &str = "functions-index.md";

/// fnindex configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FnindexConfig {
    /// Top-level source container under the project root (default: `Assets`)
    #[serde(default)]
    pub source_dir: Option<String>,

    /// Source file extension without the dot (default: `cs`)
    #[serde(default)]
    pub extension: Option<String>,

    /// Glob patterns for files to include, relative to the source container
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns for files to exclude, relative to the source container
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Extra method names treated as lifecycle callbacks
    #[serde(default)]
    pub lifecycle_extra: Vec<String>,

    /// Return type marking a coroutine (default: `IEnumerator`)
    #[serde(default)]
    pub coroutine_marker: Option<String>,

    /// Keywords shown per function in the Markdown index (default: 8)
    #[serde(default)]
    pub max_keywords: Option<usize>,

    /// Default output file (default: `functions-index.md`)
    #[serde(default)]
    pub output: Option<String>,
}

/// Resolved configuration with compiled glob patterns
#[derive(Debug)]
pub struct ResolvedConfig {
    pub source_dir: String,
    pub extension: String,
    /// Compiled include patterns (None means include all)
    pub include: Option<GlobSet>,
    /// Compiled exclude patterns
    pub exclude: GlobSet,
    pub vocabulary: Vocabulary,
    pub max_keywords: usize,
    pub output: PathBuf,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

impl FnindexConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref dir) = self.source_dir {
            if dir.trim().is_empty() {
                anyhow::bail!("source_dir must not be empty");
            }
        }

        if let Some(ref ext) = self.extension {
            if ext.is_empty() {
                anyhow::bail!("extension must not be empty");
            }
            if ext.starts_with('.') {
                anyhow::bail!("extension must not start with a dot (got {:?})", ext);
            }
        }

        if let Some(ref marker) = self.coroutine_marker {
            if marker.trim().is_empty() {
                anyhow::bail!("coroutine_marker must not be empty");
            }
        }

        if self.max_keywords == Some(0) {
            anyhow::bail!("max_keywords must be at least 1");
        }

        for name in &self.lifecycle_extra {
            if !is_identifier(name) {
                anyhow::bail!("lifecycle_extra entry is not an identifier: {:?}", name);
            }
        }

        // Validate glob patterns compile
        for pattern in &self.include {
            Glob::new(pattern).with_context(|| format!("invalid include pattern: {}", pattern))?;
        }
        for pattern in &self.exclude {
            Glob::new(pattern).with_context(|| format!("invalid exclude pattern: {}", pattern))?;
        }

        Ok(())
    }

    /// Resolve config into compiled form ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let include = if self.include.is_empty() {
            None
        } else {
            Some(build_glob_set(&self.include)?)
        };
        let exclude = build_glob_set(&self.exclude)?;

        let vocabulary = Vocabulary::new(
            self.lifecycle_extra.iter().cloned(),
            self.coroutine_marker
                .as_deref()
                .unwrap_or(DEFAULT_COROUTINE_MARKER),
        );

        Ok(ResolvedConfig {
            source_dir: self
                .source_dir
                .clone()
                .unwrap_or_else(|| DEFAULT_SOURCE_DIR.to_string()),
            extension: self
                .extension
                .clone()
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
            include,
            exclude,
            vocabulary,
            max_keywords: self.max_keywords.unwrap_or(DEFAULT_MAX_KEYWORDS),
            output: PathBuf::from(self.output.as_deref().unwrap_or(DEFAULT_OUTPUT)),
            config_path: None,
        })
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

impl ResolvedConfig {
    /// Check if a path relative to the source container passes include/exclude
    pub fn should_include(&self, relative: &Path) -> bool {
        let path_str = relative.to_string_lossy().replace('\\', "/");

        // Check exclude first
        if self.exclude.is_match(path_str.as_str()) {
            return false;
        }

        // If include patterns exist, file must match at least one
        if let Some(ref include) = self.include {
            return include.is_match(path_str.as_str());
        }

        true
    }

    /// True when the file name carries the configured source extension
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == self.extension)
    }

    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        FnindexConfig::default().resolve()
    }
}

/// Discover and load a config file from the project root
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(FnindexConfig, PathBuf)>> {
    for name in [".fnindexrc.json", "fnindex.config.json"] {
        let path = project_root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<FnindexConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: FnindexConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (FnindexConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config_is_valid() {
        let resolved = ResolvedConfig::defaults().expect("default config should resolve");
        assert!(resolved.include.is_none());
        assert_eq!(resolved.source_dir, "Assets");
        assert_eq!(resolved.extension, "cs");
        assert_eq!(resolved.max_keywords, 8);
        assert_eq!(resolved.output, PathBuf::from("functions-index.md"));
        assert!(resolved.vocabulary.is_lifecycle_callback("Update"));
        assert_eq!(resolved.vocabulary.coroutine_marker(), "IEnumerator");
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "source_dir": "Game",
            "extension": "csx",
            "include": ["Scripts/**"],
            "exclude": ["**/Editor/**"],
            "lifecycle_extra": ["OnValidate", "Reset"],
            "coroutine_marker": "UniTask",
            "max_keywords": 12,
            "output": "docs/index.md"
        }"#;
        let config: FnindexConfig = serde_json::from_str(json).unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.source_dir, "Game");
        assert_eq!(resolved.extension, "csx");
        assert!(resolved.include.is_some());
        assert!(resolved.vocabulary.is_lifecycle_callback("OnValidate"));
        assert!(resolved.vocabulary.is_lifecycle_callback("Awake"));
        assert!(resolved.vocabulary.is_async_generator("UniTask<int>"));
        assert_eq!(resolved.max_keywords, 12);
        assert_eq!(resolved.output, PathBuf::from("docs/index.md"));
    }

    #[test]
    fn test_reject_unknown_fields() {
        let result: Result<FnindexConfig, _> = serde_json::from_str(r#"{"unknown_field": true}"#);
        assert!(result.is_err(), "unknown fields should be rejected");
    }

    #[test]
    fn test_reject_invalid_values() {
        for json in [
            r#"{"source_dir": "  "}"#,
            r#"{"extension": ".cs"}"#,
            r#"{"extension": ""}"#,
            r#"{"coroutine_marker": ""}"#,
            r#"{"max_keywords": 0}"#,
            r#"{"lifecycle_extra": ["On Validate"]}"#,
            r#"{"include": ["[invalid"]}"#,
        ] {
            let config: FnindexConfig = serde_json::from_str(json).unwrap();
            assert!(config.validate().is_err(), "should reject {json}");
        }
    }

    #[test]
    fn test_should_include_custom_patterns() {
        let config: FnindexConfig = serde_json::from_str(
            r#"{
            "include": ["Scripts/**/*.cs"],
            "exclude": ["Scripts/Generated/**"]
        }"#,
        )
        .unwrap();
        let resolved = config.resolve().unwrap();
        assert!(resolved.should_include(Path::new("Scripts/Player.cs")));
        assert!(!resolved.should_include(Path::new("Plugins/Tween.cs")));
        assert!(!resolved.should_include(Path::new("Scripts/Generated/Ids.cs")));
    }

    #[test]
    fn test_is_source_file() {
        let resolved = ResolvedConfig::defaults().unwrap();
        assert!(resolved.is_source_file(Path::new("Assets/Player.cs")));
        assert!(!resolved.is_source_file(Path::new("Assets/Player.cs.meta")));
        assert!(!resolved.is_source_file(Path::new("Assets/Readme")));
    }

    #[test]
    fn test_discover_priority_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".fnindexrc.json"), r#"{"max_keywords": 3}"#).unwrap();
        fs::write(dir.path().join("fnindex.config.json"), r#"{"max_keywords": 5}"#).unwrap();

        let (config, path) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.max_keywords, Some(3), ".fnindexrc.json should take priority");
        assert_eq!(path, dir.path().join(".fnindexrc.json"));
    }

    #[test]
    fn test_discover_config_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fnindex.config.json"), r#"{"source_dir": "Src"}"#).unwrap();
        let (config, _) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.source_dir.as_deref(), Some("Src"));
    }

    #[test]
    fn test_no_config_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_and_resolve_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("custom.json");
        fs::write(&config_path, r#"{"extension": "txt"}"#).unwrap();

        let resolved = load_and_resolve(dir.path(), Some(&config_path)).unwrap();
        assert_eq!(resolved.extension, "txt");
        assert_eq!(resolved.config_path, Some(config_path));
    }

    #[test]
    fn test_load_invalid_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(".fnindexrc.json");
        fs::write(&config_path, "{ not json").unwrap();

        let err = load_and_resolve(dir.path(), None).unwrap_err();
        assert!(format!("{err:#}").contains(".fnindexrc.json"));
    }
}
