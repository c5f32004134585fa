//! Routing tables: situation keywords -> reference documents
//!
//! A manifest body carries a markdown table such as:
//!
//! ```text
//! | Situation                | Reference                 |
//! |--------------------------|---------------------------|
//! | state, bindings          | `references/state.md`     |
//! | navigation               | [nav](references/nav.md)  |
//! ```
//!
//! The first column holds comma-separated keywords, the reference column holds
//! a bare path, a backticked path, or a markdown link.

use skillpack_types::ReferenceRef;
use std::collections::HashSet;
use tracing::debug;

/// Header words that mark a column as the reference column
const REFERENCE_HEADERS: &[&str] = &["reference", "file", "load", "path"];

/// Parsed routing table of a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceIndex {
    entries: Vec<ReferenceRef>,
}

impl ReferenceIndex {
    /// Parse the first routing table found in a markdown body
    ///
    /// Tables inside fenced code blocks are ignored. A body without a routing
    /// table yields an empty index.
    pub fn parse(body: &str) -> Self {
        let lines: Vec<&str> = body.lines().collect();
        let mut in_fence = false;
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i].trim();

            if line.starts_with("```") || line.starts_with("~~~") {
                in_fence = !in_fence;
                i += 1;
                continue;
            }

            if !in_fence && is_table_row(line) && i + 1 < lines.len() && is_separator_row(lines[i + 1])
            {
                let header = split_row(line);
                if let Some(column) = reference_column(&header) {
                    let entries = parse_rows(&lines[i + 2..], column);
                    debug!(
                        "Parsed routing table with {} entries (reference column {})",
                        entries.len(),
                        column
                    );
                    return Self { entries };
                }
            }

            i += 1;
        }

        Self::default()
    }

    /// Render the canonical markdown form of this table
    pub fn render(&self) -> String {
        let mut out = String::from("| Situation | Reference |\n|-----------|-----------|\n");
        for entry in &self.entries {
            out.push_str(&format!(
                "| {} | `{}` |\n",
                entry.situation.replace('|', "\\|"),
                entry.path
            ));
        }
        out
    }

    /// All routing entries in authored order
    pub fn entries(&self) -> &[ReferenceRef] {
        &self.entries
    }

    /// Number of routing entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `path` appears in the table, ignoring a leading `./` on either side
    pub fn contains_path(&self, path: &str) -> bool {
        let path = trim_current_dir(path);
        self.entries.iter().any(|e| trim_current_dir(&e.path) == path)
    }

    /// Select the references whose keywords occur in `situation`
    ///
    /// Order follows the table; each path is returned at most once.
    pub fn resolve(&self, situation: &str) -> Vec<&ReferenceRef> {
        let haystack = normalize(situation);
        let mut seen = HashSet::new();

        self.entries
            .iter()
            .filter(|entry| {
                entry
                    .keywords()
                    .any(|keyword| contains_phrase(&haystack, &normalize(keyword)))
            })
            .filter(|entry| seen.insert(entry.path.as_str()))
            .collect()
    }
}

/// Whether `phrase` occurs as a contiguous word sequence in `text`
///
/// Matching ignores case and punctuation.
pub fn matches_phrase(text: &str, phrase: &str) -> bool {
    contains_phrase(&normalize(text), &normalize(phrase))
}

/// Lowercase and split on anything that is not alphanumeric
fn normalize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_phrase(haystack: &[String], needle: &[String]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn trim_current_dir(mut path: &str) -> &str {
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path
}

fn is_table_row(line: &str) -> bool {
    let line = line.trim();
    line.starts_with('|') && line.len() > 1
}

fn is_separator_row(line: &str) -> bool {
    let line = line.trim();
    if !is_table_row(line) {
        return false;
    }
    split_row(line).iter().all(|cell| {
        let cell = cell.trim_matches(':');
        !cell.is_empty() && cell.chars().all(|c| c == '-')
    })
}

/// Split a table row on unescaped `|`, turning `\|` back into `|`
fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                cell.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut cell)),
            _ => cell.push(c),
        }
    }
    // a row without a closing pipe still has its last cell pending
    if !cell.trim().is_empty() {
        cells.push(cell);
    }

    cells.into_iter().map(|cell| cell.trim().to_string()).collect()
}

/// Index of the reference column, never the first (situation) column
fn reference_column(header: &[String]) -> Option<usize> {
    header
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, cell)| {
            let cell = cell.to_lowercase();
            REFERENCE_HEADERS.iter().any(|h| cell.contains(h))
        })
        .map(|(i, _)| i)
}

fn parse_rows(lines: &[&str], column: usize) -> Vec<ReferenceRef> {
    lines
        .iter()
        .take_while(|line| is_table_row(line))
        .filter_map(|line| {
            let cells = split_row(line);
            let situation = cells.first()?.trim();
            let path = extract_path(cells.get(column)?)?;
            if situation.is_empty() {
                return None;
            }
            Some(ReferenceRef::new(situation, path))
        })
        .collect()
}

/// Pull a path out of `path`, `` `path` `` or `[label](path)`
fn extract_path(cell: &str) -> Option<String> {
    let cell = cell.trim();

    let path = if let Some(start) = cell.find("](") {
        let rest = &cell[start + 2..];
        let end = rest.find(')')?;
        &rest[..end]
    } else {
        cell.trim_matches('`')
    };

    let path = path.trim();
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}
