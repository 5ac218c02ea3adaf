//! Line-oriented C# function parser
//!
//! Global invariants enforced:
//! - Single top-to-bottom pass per file, no lookahead
//! - Namespace and class are resolved once per file, before the line pass
//! - Comments and annotations attach only to the declaration they are
//!   immediately adjacent to (blank and brace lines do not break adjacency)
//! - Records are emitted with copies of the accumulators, never references
//! - Malformed source never fails: unrecognized lines are plain code

use crate::error::{IndexError, Result};
use crate::keywords::derive_keywords;
use crate::patterns::{self, Declaration};
use crate::record::{FileIdentity, FunctionRecord};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

/// Unity `MonoBehaviour` messages invoked by the engine rather than user code
pub const UNITY_LIFECYCLE_CALLBACKS: &[&str] = &[
    "Awake",
    "Start",
    "Update",
    "FixedUpdate",
    "LateUpdate",
    "OnEnable",
    "OnDisable",
    "OnDestroy",
    "OnCollisionEnter",
    "OnCollisionExit",
    "OnCollisionStay",
    "OnTriggerEnter",
    "OnTriggerExit",
    "OnTriggerStay",
    "OnMouseDown",
    "OnMouseUp",
    "OnMouseEnter",
    "OnMouseExit",
    "OnGUI",
    "OnApplicationQuit",
    "OnApplicationPause",
    "OnBecameVisible",
    "OnBecameInvisible",
];

/// Return type marking a coroutine
pub const DEFAULT_COROUTINE_MARKER: &str = "IEnumerator";

/// Fixed lookup data used to classify declarations
///
/// Built once at startup and passed by reference into every parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    lifecycle_callbacks: BTreeSet<String>,
    coroutine_marker: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Vocabulary {
            lifecycle_callbacks: UNITY_LIFECYCLE_CALLBACKS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            coroutine_marker: DEFAULT_COROUTINE_MARKER.to_string(),
        }
    }
}

impl Vocabulary {
    pub fn new<I, S>(extra_callbacks: I, coroutine_marker: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocabulary = Vocabulary::default();
        vocabulary
            .lifecycle_callbacks
            .extend(extra_callbacks.into_iter().map(Into::into));
        vocabulary.coroutine_marker = coroutine_marker.to_string();
        vocabulary
    }

    /// Exact, case-sensitive membership in the callback set
    pub fn is_lifecycle_callback(&self, function_name: &str) -> bool {
        self.lifecycle_callbacks.contains(function_name)
    }

    pub fn is_async_generator(&self, return_type: &str) -> bool {
        return_type.contains(&self.coroutine_marker)
    }

    pub fn coroutine_marker(&self) -> &str {
        &self.coroutine_marker
    }
}

/// Shape of a single source line, in transition-table priority order
#[derive(Debug, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Fully bracket-delimited line; the name is absent for `[]`-like lines
    Annotation(Option<&'a str>),
    DocComment(&'a str),
    LineComment(&'a str),
    Declaration(Declaration<'a>),
    /// Any other non-blank line without a brace
    Statement,
    /// Blank line or a line containing `{` or `}`
    Neutral,
}

pub fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();

    if patterns::is_annotation_line(trimmed) {
        return LineKind::Annotation(patterns::match_annotation(trimmed));
    }
    if let Some(text) = patterns::match_doc_comment(trimmed) {
        return LineKind::DocComment(text);
    }
    if let Some(text) = patterns::match_line_comment(trimmed) {
        return LineKind::LineComment(text);
    }
    if let Some(decl) = patterns::match_function_declaration(line) {
        return LineKind::Declaration(decl);
    }
    if !trimmed.is_empty() && !trimmed.contains('{') && !trimmed.contains('}') {
        return LineKind::Statement;
    }
    LineKind::Neutral
}

/// Whether comments or annotations are waiting for a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Accumulating,
}

/// Accumulate/reset state machine over one file's lines
pub struct LineScanner<'v> {
    vocabulary: &'v Vocabulary,
    identity: FileIdentity,
    namespace: String,
    class_name: String,
    state: ScanState,
    pending_comments: Vec<String>,
    pending_annotations: Vec<String>,
    records: Vec<FunctionRecord>,
}

impl<'v> LineScanner<'v> {
    pub fn new(
        vocabulary: &'v Vocabulary,
        identity: FileIdentity,
        namespace: &str,
        class_name: &str,
    ) -> Self {
        LineScanner {
            vocabulary,
            identity,
            namespace: namespace.to_string(),
            class_name: class_name.to_string(),
            state: ScanState::Idle,
            pending_comments: Vec::new(),
            pending_annotations: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn pending_comments(&self) -> &[String] {
        &self.pending_comments
    }

    pub fn pending_annotations(&self) -> &[String] {
        &self.pending_annotations
    }

    /// Apply one line to the state machine
    pub fn feed(&mut self, line: &str) {
        match classify_line(line) {
            LineKind::Annotation(Some(name)) => {
                self.pending_annotations.push(name.to_string());
                self.state = ScanState::Accumulating;
            }
            LineKind::Annotation(None) | LineKind::Neutral => {}
            LineKind::DocComment(text) => self.push_comment(clean_doc_markup(text)),
            LineKind::LineComment(text) => self.push_comment(text.to_string()),
            LineKind::Declaration(decl) => {
                let record = self.build_record(line, &decl);
                self.records.push(record);
                self.reset();
            }
            LineKind::Statement => self.reset(),
        }
    }

    pub fn finish(self) -> Vec<FunctionRecord> {
        self.records
    }

    fn push_comment(&mut self, comment: String) {
        if comment.is_empty() {
            return;
        }
        self.pending_comments.push(comment);
        self.state = ScanState::Accumulating;
    }

    fn reset(&mut self) {
        self.pending_comments.clear();
        self.pending_annotations.clear();
        self.state = ScanState::Idle;
    }

    fn build_record(&self, line: &str, decl: &Declaration<'_>) -> FunctionRecord {
        let mut annotations = self.pending_annotations.clone();
        annotations.extend(decl.inline_attributes.iter().map(|a| a.to_string()));

        FunctionRecord {
            file_name: self.identity.file_name.clone(),
            file_path: self.identity.file_path.clone(),
            relative_path: self.identity.relative_path.clone(),
            namespace: self.namespace.clone(),
            class_name: self.class_name.clone(),
            function_name: decl.name.to_string(),
            signature: line.trim().to_string(),
            comments: self.pending_comments.clone(),
            annotations,
            is_lifecycle_callback: self.vocabulary.is_lifecycle_callback(decl.name),
            is_async_generator: self.vocabulary.is_async_generator(decl.return_type),
            keywords: derive_keywords(decl.name, &self.pending_comments),
        }
    }
}

/// Strip XML documentation markup from a doc-comment line
///
/// `<summary>` wrappers are removed; `<param>` and `<returns>` become
/// `parameter: ...` and `returns: ...`.
pub fn clean_doc_markup(text: &str) -> String {
    static SUMMARY_RE: OnceLock<Regex> = OnceLock::new();
    static PARAM_RE: OnceLock<Regex> = OnceLock::new();
    static RETURNS_RE: OnceLock<Regex> = OnceLock::new();

    let summary = SUMMARY_RE.get_or_init(|| Regex::new(r"</?summary>").unwrap());
    let param = PARAM_RE
        .get_or_init(|| Regex::new(r#"<param name="[^"]+">([^<]*)</param>"#).unwrap());
    let returns = RETURNS_RE.get_or_init(|| Regex::new(r"<returns>([^<]*)</returns>").unwrap());

    let text = summary.replace_all(text, "");
    let text = param.replace_all(&text, "parameter: $1");
    let text = returns.replace_all(&text, "returns: $1");
    text.trim().to_string()
}

/// Parse one file's text into function records
pub fn parse_source(
    source: &str,
    identity: FileIdentity,
    vocabulary: &Vocabulary,
) -> Vec<FunctionRecord> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let namespace = patterns::match_namespace(source).unwrap_or_default();
    let class_name = patterns::match_class(source).unwrap_or_default();

    let mut scanner = LineScanner::new(vocabulary, identity, namespace, class_name);
    for line in source.lines() {
        scanner.feed(line);
    }
    scanner.finish()
}

/// Read and parse a file located under `source_root`
///
/// Fails only when the file cannot be opened or read. Bytes that are not
/// valid UTF-8 (legacy code pages in comments) are replaced, not rejected.
pub fn parse_file(
    path: &Path,
    source_root: &Path,
    vocabulary: &Vocabulary,
) -> Result<Vec<FunctionRecord>> {
    let bytes = std::fs::read(path).map_err(|source| IndexError::FileReadFailure {
        path: path.to_path_buf(),
        source,
    })?;
    let source = String::from_utf8_lossy(&bytes);
    Ok(parse_source(
        &source,
        FileIdentity::new(path, source_root),
        vocabulary,
    ))
}
