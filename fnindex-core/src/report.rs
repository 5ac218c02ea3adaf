//! Index rendering
//!
//! Global invariants enforced:
//! - Pure functions of the records: no I/O, no clocks
//! - Categories and classes are sorted; functions keep input order
//! - Byte-for-byte identical output for identical input

use crate::config::DEFAULT_MAX_KEYWORDS;
use crate::record::FunctionRecord;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Label for records whose relative path has no directory segment
pub const OTHER_CATEGORY: &str = "Other";
/// Label for records from files without a detected class
pub const GLOBAL_FUNCTIONS: &str = "Global functions";

/// category -> class -> records
pub type CategoryGroups<'a> = BTreeMap<Category, BTreeMap<String, Vec<&'a FunctionRecord>>>;

/// Top-level grouping of the index
///
/// Files sitting directly in the source container form their own group,
/// distinct from any directory, even one named like its label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    TopLevel,
    Directory(String),
}

impl Category {
    pub fn label(&self) -> &str {
        match self {
            Category::TopLevel => OTHER_CATEGORY,
            Category::Directory(name) => name,
        }
    }
}

/// Summary counts shown at the top of the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub total_functions: usize,
    pub lifecycle_callbacks: usize,
    pub coroutines: usize,
}

impl IndexStats {
    pub fn from_records(records: &[FunctionRecord]) -> Self {
        IndexStats {
            total_functions: records.len(),
            lifecycle_callbacks: records.iter().filter(|r| r.is_lifecycle_callback).count(),
            coroutines: records.iter().filter(|r| r.is_async_generator).count(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Keywords shown per function
    pub max_keywords: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            max_keywords: DEFAULT_MAX_KEYWORDS,
        }
    }
}

/// First directory of the relative path, or the top-level group
pub fn category_of(relative_path: &str) -> Category {
    match relative_path.split_once('/') {
        Some((first, _)) if !first.is_empty() => Category::Directory(first.to_string()),
        _ => Category::TopLevel,
    }
}

/// Group records by category, then by class
pub fn group_by_category(records: &[FunctionRecord]) -> CategoryGroups<'_> {
    let mut groups = CategoryGroups::new();
    for record in records {
        let class = if record.class_name.is_empty() {
            GLOBAL_FUNCTIONS
        } else {
            record.class_name.as_str()
        };
        groups
            .entry(category_of(&record.relative_path))
            .or_default()
            .entry(class.to_string())
            .or_default()
            .push(record);
    }
    groups
}

fn slug_for(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect()
}

/// One in-document anchor per category, in group order
///
/// Labels that slug identically get `-2`, `-3`, ... suffixes.
fn category_anchors(groups: &CategoryGroups<'_>) -> Vec<String> {
    let mut taken = BTreeSet::new();
    groups
        .keys()
        .map(|category| {
            let base = format!("category-{}", slug_for(category.label()));
            let mut anchor = base.clone();
            let mut n = 2;
            while !taken.insert(anchor.clone()) {
                anchor = format!("{}-{}", base, n);
                n += 1;
            }
            anchor
        })
        .collect()
}

/// Render the Markdown index document
pub fn render_markdown(records: &[FunctionRecord], options: &RenderOptions) -> String {
    let stats = IndexStats::from_records(records);
    let groups = group_by_category(records);
    let anchors = category_anchors(&groups);
    let mut out = String::new();

    render_header(&mut out, &stats);
    render_navigation(&mut out, &groups, &anchors);
    for ((category, classes), anchor) in groups.iter().zip(&anchors) {
        render_category(&mut out, category.label(), anchor, classes, options);
    }
    render_usage_tips(&mut out);

    out
}

fn render_header(out: &mut String, stats: &IndexStats) {
    out.push_str("# Function Index\n\n");
    out.push_str(
        "> Generated by fnindex to locate functions quickly. Search it directly or hand it to an AI assistant.\n\n",
    );
    out.push_str("**Statistics**:\n");
    out.push_str(&format!("- Total functions: {}\n", stats.total_functions));
    out.push_str(&format!("- Lifecycle callbacks: {}\n", stats.lifecycle_callbacks));
    out.push_str(&format!("- Coroutines: {}\n\n", stats.coroutines));
    out.push_str("---\n\n");
}

fn render_navigation(out: &mut String, groups: &CategoryGroups<'_>, anchors: &[String]) {
    out.push_str("## Navigation\n\n");
    for ((category, classes), anchor) in groups.iter().zip(anchors) {
        let count: usize = classes.values().map(Vec::len).sum();
        out.push_str(&format!(
            "- [{} ({})](#{})\n",
            category.label(),
            count,
            anchor
        ));
    }
    out.push_str("\n---\n\n");
}

fn render_category(
    out: &mut String,
    label: &str,
    anchor: &str,
    classes: &BTreeMap<String, Vec<&FunctionRecord>>,
    options: &RenderOptions,
) {
    let count: usize = classes.values().map(Vec::len).sum();
    out.push_str(&format!("<a id=\"{}\"></a>\n\n", anchor));
    out.push_str(&format!("## {}\n\n", label));
    out.push_str(&format!("> {} function(s)\n\n", count));

    for (class_name, functions) in classes {
        out.push_str(&format!("### Class `{}`\n\n", class_name));

        let mut files: Vec<&str> = Vec::new();
        for f in functions {
            if !files.contains(&f.relative_path.as_str()) {
                files.push(&f.relative_path);
            }
        }
        for file in files {
            out.push_str(&format!("File: `{}`\n\n", file));
        }

        for function in functions {
            render_function(out, function, options);
        }
    }
}

fn render_function(out: &mut String, function: &FunctionRecord, options: &RenderOptions) {
    let mut markers = String::new();
    if function.is_lifecycle_callback {
        markers.push_str(" [Lifecycle]");
    }
    if function.is_async_generator {
        markers.push_str(" [Coroutine]");
    }
    out.push_str(&format!("#### `{}`{}\n\n", function.function_name, markers));

    if !function.annotations.is_empty() {
        let attributes = function
            .annotations
            .iter()
            .map(|a| format!("`[{}]`", a))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("**Attributes**: {}\n\n", attributes));
    }

    out.push_str("```csharp\n");
    out.push_str(&function.signature);
    out.push_str("\n```\n\n");

    let comments: Vec<&str> = function
        .comments
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();
    if !comments.is_empty() {
        out.push_str("**Description**:\n");
        for comment in comments {
            out.push_str(&format!("> {}\n", comment));
        }
        out.push('\n');
    }

    if !function.keywords.is_empty() {
        let shown = function
            .keywords
            .iter()
            .take(options.max_keywords)
            .map(|k| format!("`{}`", k))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&format!("**Keywords**: {}\n\n", shown));
    }

    out.push_str("---\n\n");
}

fn render_usage_tips(out: &mut String) {
    out.push_str("## Usage tips\n\n");
    out.push_str("This index supports several ways of searching:\n\n");
    out.push_str("1. **By feature**: search keywords such as \"move\", \"attack\" or \"ui\"\n");
    out.push_str("2. **By kind**: search the `[Lifecycle]` and `[Coroutine]` markers\n");
    out.push_str("3. **By location**: search a directory name\n");
    out.push_str("4. **By identifier**: search a class or function name directly\n\n");
    out.push_str("> Tip: use your editor's find, or give this document to an AI assistant.\n");
}

/// Simplified record for machine consumers
#[derive(Debug, Serialize)]
struct JsonFunction<'a> {
    class: &'a str,
    function: &'a str,
    namespace: &'a str,
    file: &'a str,
    signature: &'a str,
    comments: &'a [String],
    annotations: &'a [String],
    keywords: &'a [String],
    is_lifecycle_callback: bool,
    is_coroutine: bool,
}

#[derive(Debug, Serialize)]
struct JsonIndex<'a> {
    stats: IndexStats,
    functions: Vec<JsonFunction<'a>>,
}

/// Render the index as pretty-printed JSON
pub fn render_json(records: &[FunctionRecord]) -> String {
    let index = JsonIndex {
        stats: IndexStats::from_records(records),
        functions: records
            .iter()
            .map(|r| JsonFunction {
                class: &r.class_name,
                function: &r.function_name,
                namespace: &r.namespace,
                file: &r.relative_path,
                signature: &r.signature,
                comments: &r.comments,
                annotations: &r.annotations,
                keywords: &r.keywords,
                is_lifecycle_callback: r.is_lifecycle_callback,
                is_coroutine: r.is_async_generator,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&index).unwrap_or_else(|_| "{}".to_string())
}
