//! Project scanning
//!
//! Global invariants enforced:
//! - Only the configured source container is walked
//! - File order is sorted by path, so output never depends on directory
//!   listing order or thread scheduling
//! - Per-file read failures are skipped and reported; traversal failures abort

use crate::config::ResolvedConfig;
use crate::error::{IndexError, Result};
use crate::parser;
use crate::record::FunctionRecord;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// A source file that could not be read
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: IndexError,
}

/// Aggregated result of scanning a project
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub functions: Vec<FunctionRecord>,
    pub skipped: Vec<SkippedFile>,
    pub files_scanned: usize,
}

/// Scan `root/<source_dir>` and parse every eligible source file
pub fn scan_project(root: &Path, config: &ResolvedConfig) -> Result<ScanOutcome> {
    let source_root = root.join(&config.source_dir);
    if !source_root.is_dir() {
        return Err(IndexError::NotAProjectRoot {
            root: root.to_path_buf(),
            source_dir: config.source_dir.clone(),
        });
    }

    let files = collect_source_files(&source_root, config)?;
    tracing::debug!(
        "found {} source file(s) under {}",
        files.len(),
        source_root.display()
    );

    // Each worker owns one file end to end; collect keeps input order.
    let parsed: Vec<Result<Vec<FunctionRecord>>> = files
        .par_iter()
        .map(|path| parser::parse_file(path, &source_root, &config.vocabulary))
        .collect();

    let mut outcome = ScanOutcome {
        files_scanned: files.len(),
        ..ScanOutcome::default()
    };
    for (path, result) in files.into_iter().zip(parsed) {
        match result {
            Ok(records) => {
                tracing::debug!("{}: {} function(s)", path.display(), records.len());
                outcome.functions.extend(records);
            }
            Err(error) => {
                tracing::warn!("skipping file {}: {}", path.display(), error);
                outcome.skipped.push(SkippedFile { path, error });
            }
        }
    }

    if !outcome.skipped.is_empty() {
        tracing::warn!(
            "skipped {} file(s) due to read errors",
            outcome.skipped.len()
        );
    }
    tracing::info!(
        "indexed {} function(s) from {} file(s)",
        outcome.functions.len(),
        outcome.files_scanned - outcome.skipped.len()
    );

    Ok(outcome)
}

/// Collect eligible source files under the source container, sorted by path
pub fn collect_source_files(source_root: &Path, config: &ResolvedConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_source_files_recursive(source_root, source_root, config, &mut files)?;

    // Sort files for deterministic order
    files.sort();

    Ok(files)
}

fn collect_source_files_recursive(
    dir: &Path,
    source_root: &Path,
    config: &ResolvedConfig,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry_result in std::fs::read_dir(dir).map_err(traversal_failure(dir))? {
        let entry = entry_result.map_err(traversal_failure(dir))?;
        let path = entry.path();
        let metadata = std::fs::symlink_metadata(&path).map_err(traversal_failure(&path))?;
        process_dir_entry(path, metadata, source_root, config, files)?;
    }

    Ok(())
}

fn traversal_failure(path: &Path) -> impl FnOnce(std::io::Error) -> IndexError {
    let path = path.to_path_buf();
    move |source| IndexError::TraversalFailure { path, source }
}

/// Process one directory entry, pushing source files or recursing into dirs
fn process_dir_entry(
    path: PathBuf,
    metadata: std::fs::Metadata,
    source_root: &Path,
    config: &ResolvedConfig,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    if metadata.is_symlink() {
        return Ok(());
    }

    if metadata.is_dir() {
        collect_source_files_recursive(&path, source_root, config, files)?;
    } else if metadata.is_file() && config.is_source_file(&path) {
        let relative = path.strip_prefix(source_root).unwrap_or(&path);
        if config.should_include(relative) {
            files.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FnindexConfig;
    use std::fs;

    fn write(root: &Path, relative: &str, contents: &[u8]) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_missing_source_container() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Scripts/Player.cs", b"void Update() { }");

        let config = ResolvedConfig::defaults().unwrap();
        let err = scan_project(dir.path(), &config).unwrap_err();
        assert!(matches!(err, IndexError::NotAProjectRoot { .. }));
        assert!(err.to_string().contains("Assets"));
    }

    #[test]
    fn test_source_container_must_be_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Assets", b"not a directory");

        let config = ResolvedConfig::defaults().unwrap();
        let err = scan_project(dir.path(), &config).unwrap_err();
        assert!(matches!(err, IndexError::NotAProjectRoot { .. }));
    }

    #[test]
    fn test_only_matching_extension_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Assets/Player.cs", b"void Jump() { }");
        write(dir.path(), "Assets/Player.cs.meta", b"void NotCode() { }");
        write(dir.path(), "Assets/Notes.txt", b"void NotCode() { }");

        let config = ResolvedConfig::defaults().unwrap();
        let outcome = scan_project(dir.path(), &config).unwrap();
        assert_eq!(outcome.files_scanned, 1);
        assert_eq!(outcome.functions.len(), 1);
        assert_eq!(outcome.functions[0].function_name, "Jump");
    }

    /// Make a file unopenable; false when the process can read it anyway
    #[cfg(unix)]
    fn revoke_read(path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
        fs::read(path).is_err()
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..10 {
            write(
                dir.path(),
                &format!("Assets/Scripts/Unit{i}.cs"),
                format!("public class Unit{i}\n{{\n    void Act{i}() {{ }}\n}}\n").as_bytes(),
            );
        }
        if !revoke_read(&dir.path().join("Assets/Scripts/Unit3.cs")) {
            // Privileged users bypass file modes
            return;
        }

        let config = ResolvedConfig::defaults().unwrap();
        let outcome = scan_project(dir.path(), &config).unwrap();
        assert_eq!(outcome.files_scanned, 10);
        assert_eq!(outcome.functions.len(), 9);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].path.ends_with("Unit3.cs"));
        assert!(matches!(
            outcome.skipped[0].error,
            IndexError::FileReadFailure { .. }
        ));
    }

    #[test]
    fn test_non_utf8_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = b"public class Hero\n{\n    // Caf".to_vec();
        source.push(0xE9);
        source.extend_from_slice(b" logic\n    void Update() { }\n    void Jump() { }\n}\n");
        write(dir.path(), "Assets/Scripts/Hero.cs", &source);

        let outcome = scan_project(dir.path(), &ResolvedConfig::defaults().unwrap()).unwrap();
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.functions.len(), 2);
        assert!(outcome.functions[0].is_lifecycle_callback);
    }

    #[test]
    fn test_traversal_failure_names_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Assets", b"not a directory");
        let not_a_dir = dir.path().join("Assets");

        let config = ResolvedConfig::defaults().unwrap();
        let err = collect_source_files(&not_a_dir, &config).unwrap_err();
        assert!(matches!(err, IndexError::TraversalFailure { .. }));
        assert!(err.to_string().contains(&not_a_dir.display().to_string()));
    }

    #[test]
    fn test_order_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Assets/Zeta/Z.cs", b"void Z() { }");
        write(dir.path(), "Assets/Alpha/A.cs", b"void A() { }\nvoid B() { }");
        write(dir.path(), "Assets/Root.cs", b"void R() { }");

        let config = ResolvedConfig::defaults().unwrap();
        let first = scan_project(dir.path(), &config).unwrap();
        let second = scan_project(dir.path(), &config).unwrap();

        let names: Vec<&str> = first
            .functions
            .iter()
            .map(|f| f.function_name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B", "R", "Z"]);
        assert_eq!(first.functions, second.functions);
        assert_eq!(first.functions[0].relative_path, "Alpha/A.cs");
    }

    #[test]
    fn test_include_and_exclude_patterns() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Assets/Scripts/Game.cs", b"void Play() { }");
        write(dir.path(), "Assets/Scripts/Editor/Tool.cs", b"void Build() { }");
        write(dir.path(), "Assets/Plugins/Lib.cs", b"void Call() { }");

        let config: FnindexConfig = serde_json::from_str(
            r#"{"include": ["Scripts/**"], "exclude": ["**/Editor/**"]}"#,
        )
        .unwrap();
        let outcome = scan_project(dir.path(), &config.resolve().unwrap()).unwrap();
        assert_eq!(outcome.functions.len(), 1);
        assert_eq!(outcome.functions[0].function_name, "Play");
    }

    #[test]
    fn test_custom_source_dir() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Src/Core.cs", b"void Boot() { }");

        let config: FnindexConfig = serde_json::from_str(r#"{"source_dir": "Src"}"#).unwrap();
        let outcome = scan_project(dir.path(), &config.resolve().unwrap()).unwrap();
        assert_eq!(outcome.functions.len(), 1);
    }

    #[test]
    fn test_empty_container_yields_no_records() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Assets")).unwrap();

        let outcome = scan_project(dir.path(), &ResolvedConfig::defaults().unwrap()).unwrap();
        assert_eq!(outcome.files_scanned, 0);
        assert!(outcome.functions.is_empty());
        assert!(outcome.skipped.is_empty());
    }
}
