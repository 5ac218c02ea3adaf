//! Line-level token patterns for C# sources
//!
//! Pure, stateless recognizers. No I/O. Same inputs always produce the same
//! outputs. Regexes are compiled once per process and shared.
//!
//! Declarations are recognized per physical line: parameter lists spanning
//! several lines are not matched.

use regex::Regex;
use std::sync::OnceLock;

/// Modifier keywords allowed in front of a declaration's type token
const MODIFIERS: &str = "public|private|protected|internal|static|virtual|override|abstract|sealed|async|extern|unsafe|new|partial|readonly";

/// Words that can sit in the "type" slot of `<type> <ident>(...)` but only ever
/// start a statement, e.g. `return Compute(x);` or `else if (ok)`
const STATEMENT_KEYWORDS: &[&str] = &[
    "return", "new", "else", "throw", "await", "yield", "case", "goto", "using", "lock", "in",
    "is", "as", "out", "ref",
];

/// A function declaration recognized on a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration<'a> {
    pub return_type: &'a str,
    pub name: &'a str,
    pub params: &'a str,
    /// Attributes written on the same line before the modifiers,
    /// e.g. `[ContextMenu("Reset")] void ResetState()`
    pub inline_attributes: Vec<&'a str>,
}

fn declaration_re() -> &'static Regex {
    static DECLARATION_RE: OnceLock<Regex> = OnceLock::new();
    DECLARATION_RE.get_or_init(|| {
        Regex::new(&format!(
            r"^\s*((?:\[[^\]]*\]\s*)*)(?:(?:{MODIFIERS})\s+)*([\w<>\[\],.?]+)\s+(\w+)\s*\(([^)]*)\)"
        ))
        .unwrap()
    })
}

fn attribute_name_re() -> &'static Regex {
    static ATTRIBUTE_NAME_RE: OnceLock<Regex> = OnceLock::new();
    // Skips an attribute target such as `field:` or `method:`
    ATTRIBUTE_NAME_RE.get_or_init(|| Regex::new(r"\[\s*(?:\w+\s*:\s*)?(\w+)").unwrap())
}

/// Documentation comment (`/// text`), returning the text after the marker
///
/// Rule lines made only of slashes (`//////`) yield `""`; otherwise the
/// remainder is kept as is, so `//// note` yields `/ note`.
pub fn match_doc_comment(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("///")?;
    if rest.chars().all(|c| c == '/') {
        return Some("");
    }
    Some(rest.trim())
}

/// Plain line comment (`// text`), never a documentation comment
pub fn match_line_comment(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("//")?;
    if rest.starts_with('/') {
        return None;
    }
    Some(rest.trim())
}

/// True when the trimmed line is fully bracket-delimited (`[...]`)
pub fn is_annotation_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']')
}

/// Attribute name of a fully bracket-delimited line
///
/// `[Header("Movement")]` yields `Header`; arguments are discarded.
pub fn match_annotation(line: &str) -> Option<&str> {
    if !is_annotation_line(line) {
        return None;
    }
    attribute_name_re()
        .captures(line.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Function declaration on a single physical line
pub fn match_function_declaration(line: &str) -> Option<Declaration<'_>> {
    let caps = declaration_re().captures(line)?;
    let return_type = caps.get(2)?.as_str();
    if STATEMENT_KEYWORDS.contains(&return_type) {
        return None;
    }

    let inline_attributes = caps
        .get(1)
        .map(|attrs| {
            attribute_name_re()
                .captures_iter(attrs.as_str())
                .filter_map(|c| c.get(1).map(|m| m.as_str()))
                .collect()
        })
        .unwrap_or_default();

    Some(Declaration {
        return_type,
        name: caps.get(3)?.as_str(),
        params: caps.get(4).map_or("", |m| m.as_str().trim()),
        inline_attributes,
    })
}

/// First `namespace` declared in the file
pub fn match_namespace(text: &str) -> Option<&str> {
    static NAMESPACE_RE: OnceLock<Regex> = OnceLock::new();
    let re = NAMESPACE_RE.get_or_init(|| Regex::new(r"(?m)^\s*namespace\s+([\w.]+)").unwrap());
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// First class declared in the file
pub fn match_class(text: &str) -> Option<&str> {
    static CLASS_RE: OnceLock<Regex> = OnceLock::new();
    let re = CLASS_RE.get_or_init(|| {
        Regex::new(
            r"(?m)^\s*(?:(?:public|private|protected|internal|static)\s+)*(?:(?:sealed|abstract)\s+)?(?:partial\s+)?class\s+(\w+)",
        )
        .unwrap()
    });
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
}
