//! CLI output formatting for `check` and `build`.
//!
//! # Information-First Display
//!
//! Every item leads with its positional index and title. The source file and
//! output path are secondary context on indented lines, so the output reads
//! as a content inventory while still pointing back at files.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Posts
//! 001 Hiking the ridge (image post, published, 2024-06-01)
//!     Source: hike.md
//! 002 (notes.md) (post, draft)
//!     Source: notes.md
//!
//! Pages
//! 001 Home (home)
//!     Source: home.md
//!
//! Menu
//!     home → /
//!     about → /about
//!
//! Tags: photos, rust
//! ```
//!
//! ## Build
//!
//! ```text
//! Posts
//! 001 hike.md → posts/hike/index.html
//!     3 images, 1 thumbnail
//!     Skipped: notes.md (unpublished)
//!
//! Pages
//! 001 home.md → index.html
//!
//! Built 1 post, 1 page on 2024-06-02
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure.

use crate::content::ContentItem;
use crate::metadata::Status;
use crate::naming::item_url;
use crate::site::{BuildSummary, PassSummary, SiteAssembler};
use std::collections::BTreeMap;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Pluralize a count: `1 page`, `2 pages`.
fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

fn status_label(status: &Status) -> &str {
    match status {
        Status::Published => "published",
        Status::Draft => "draft",
        Status::Other(s) if s.is_empty() => "no status",
        Status::Other(s) => s,
    }
}

/// Titled items show the title, untitled ones the source name in parens.
///
/// ```text
/// 001 Hiking the ridge
/// 001 (notes.md)
/// ```
fn item_line(index: usize, title: Option<&str>, name: &str) -> String {
    match title {
        Some(t) if !t.is_empty() => format!("{} {}", format_index(index), t),
        _ => format!("{} ({})", format_index(index), name),
    }
}

/// Output path relative to the build root, `/`-separated.
fn relative_output(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// Check: content inventory
// ============================================================================

fn post_detail(item: &ContentItem) -> String {
    let meta = item.meta();
    let mut parts = vec![item.variant().to_string(), status_label(&meta.status()).to_string()];
    if let Some(date) = meta.date() {
        parts.push(date.to_string());
    }
    parts.join(", ")
}

fn page_detail(item: &ContentItem) -> String {
    let kind = item.meta().kind().unwrap_or("no type");
    match item.variant() {
        crate::content::Variant::DataPage => format!("{}, data", kind),
        _ => kind.to_string(),
    }
}

fn format_collection(
    lines: &mut Vec<String>,
    heading: &str,
    items: &BTreeMap<String, ContentItem>,
    detail: fn(&ContentItem) -> String,
) {
    lines.push(heading.to_string());
    for (i, (name, item)) in items.iter().enumerate() {
        lines.push(format!(
            "{} ({})",
            item_line(i + 1, item.meta().title(), name),
            detail(item)
        ));
        lines.push(format!("{}Source: {}", indent(1), name));
    }
}

/// Format the discovered content: posts, pages, menu and tags.
pub fn format_inventory(site: &SiteAssembler) -> Vec<String> {
    let mut lines = Vec::new();

    format_collection(&mut lines, "Posts", site.posts(), post_detail);

    lines.push(String::new());
    format_collection(&mut lines, "Pages", site.pages(), page_detail);

    lines.push(String::new());
    lines.push("Menu".to_string());
    for (name, link) in site.menu().iter() {
        lines.push(format!("{}{} → {}", indent(1), name, item_url(link)));
    }

    let taxonomy = site.taxonomy();
    if !taxonomy.tags.is_empty() {
        lines.push(String::new());
        let tags: Vec<&str> = taxonomy.tags.iter().map(String::as_str).collect();
        lines.push(format!("Tags: {}", tags.join(", ")));
    }
    if !taxonomy.categories.is_empty() {
        let categories: Vec<&str> = taxonomy.categories.iter().map(String::as_str).collect();
        lines.push(format!("Categories: {}", categories.join(", ")));
    }

    lines
}

/// Print the content inventory to stdout.
pub fn print_inventory(site: &SiteAssembler) {
    for line in format_inventory(site) {
        println!("{}", line);
    }
}

// ============================================================================
// Build: written files
// ============================================================================

fn format_pass(lines: &mut Vec<String>, heading: &str, pass: &PassSummary, root: &Path) {
    lines.push(heading.to_string());
    for (i, rendered) in pass.rendered.iter().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            rendered.name,
            relative_output(&rendered.outcome.index, root)
        ));
        let outcome = &rendered.outcome;
        if outcome.images > 0 {
            lines.push(format!(
                "{}{}, {}",
                indent(1),
                count(outcome.images, "image"),
                count(outcome.thumbnails, "thumbnail")
            ));
        }
        if outcome.data_files > 0 {
            lines.push(format!("{}{}", indent(1), count(outcome.data_files, "data file")));
        }
    }
    for name in &pass.skipped {
        lines.push(format!("{}Skipped: {} (unpublished)", indent(1), name));
    }
}

/// Format what a build wrote.
pub fn format_build_summary(summary: &BuildSummary) -> Vec<String> {
    let mut lines = Vec::new();

    if summary.synced > 0 {
        lines.push(format!("Synced {}", count(summary.synced, "remote object")));
        lines.push(String::new());
    }

    format_pass(&mut lines, "Posts", &summary.posts, &summary.output);
    lines.push(String::new());
    format_pass(&mut lines, "Pages", &summary.pages, &summary.output);
    lines.push(String::new());

    lines.push(format!(
        "Built {}, {} on {}",
        count(summary.posts.rendered.len(), "post"),
        count(summary.pages.rendered.len(), "page"),
        summary.build_date
    ));
    let images = summary.posts.images();
    if images > 0 {
        lines.push(format!(
            "{}, {}",
            count(images, "image"),
            count(summary.posts.thumbnails(), "thumbnail")
        ));
    }

    lines
}

/// Print the build summary to stdout.
pub fn print_build_summary(summary: &BuildSummary) {
    for line in format_build_summary(summary) {
        println!("{}", line);
    }
}
