//! Reads the `Key: value` text the converter prints.
//!
//! The converter has no documented output grammar. A line opens a new field
//! when it starts with ASCII word or space characters followed by a colon
//! and an ASCII whitespace character; every other line continues the field
//! above it. A continuation line that happens to look like `Word: ` is
//! therefore read as a new field. That ambiguity matches what the
//! converter's output has been observed to need and is kept as is.

use regex::Regex;
use std::sync::OnceLock;

/// Keys the converter is known to print
pub mod keys {
    pub const WARNING: &str = "Warning";
    pub const PROJECT_LOCATION: &str = "Xcode Project Location";
    pub const APP_NAME: &str = "App Name";
    pub const APP_BUNDLE_IDENTIFIER: &str = "App Bundle Identifier";
    pub const PLATFORM: &str = "Platform";
    pub const LANGUAGE: &str = "Language";
}

/// One field of converter output after continuation lines were merged into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    /// The merged text, still starting with `<key>: `
    text: String,
}

impl FieldRecord {
    /// The key as matched by the header heuristic
    pub fn key(&self) -> &str {
        header_re()
            .captures(&self.text)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str())
            .unwrap_or("")
    }

    /// The value recorded under `key`, if this record carries that key
    pub fn value_for(&self, key: &str) -> Option<&str> {
        self.text.strip_prefix(key)?.strip_prefix(": ")
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Consecutive lines sharing the same header classification
#[derive(Debug)]
struct Block<'a> {
    is_header: bool,
    lines: Vec<&'a str>,
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^((?-u:[\w\s]+)):(?-u:\s)").expect("valid regex"))
}

fn is_header(line: &str) -> bool {
    header_re().is_match(line)
}

fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

fn group_blocks<'a>(lines: &[&'a str]) -> Vec<Block<'a>> {
    let mut blocks: Vec<Block<'a>> = Vec::new();
    for &line in lines {
        let header = is_header(line);
        match blocks.last_mut() {
            Some(block) if block.is_header == header => block.lines.push(line),
            _ => blocks.push(Block {
                is_header: header,
                lines: vec![line],
            }),
        }
    }
    blocks
}

/// Splits converter output into field records, in emission order.
///
/// Text that appears before the first header line cannot be attributed to a
/// field and is dropped.
pub fn parse(text: &str) -> Vec<FieldRecord> {
    let lines = split_lines(text);
    let mut records: Vec<FieldRecord> = Vec::new();

    for block in group_blocks(&lines) {
        if block.is_header {
            records.extend(block.lines.iter().map(|line| FieldRecord {
                text: line.to_string(),
            }));
        } else if let Some(last) = records.last_mut() {
            last.text.push('\n');
            last.text.push_str(&block.lines.join("\n"));
        }
    }

    records
}

/// Values recorded under `key`, in the order the converter emitted them
pub fn extract(records: &[FieldRecord], key: &str) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.value_for(key))
        .map(|value| value.to_string())
        .collect()
}

/// Parsed output of one stream, queried per field
#[derive(Debug, Clone, Default)]
pub struct ParsedOutput {
    records: Vec<FieldRecord>,
}

impl ParsedOutput {
    pub fn new(text: &str) -> Self {
        Self {
            records: parse(text),
        }
    }

    pub fn values(&self, key: &str) -> Vec<String> {
        extract(&self.records, key)
    }

    /// The first value for a key the converter emits once. A missing key
    /// is an absent field, not an error.
    pub fn first(&self, key: &str) -> Option<String> {
        self.records
            .iter()
            .find_map(|record| record.value_for(key))
            .map(|value| value.to_string())
    }

    pub fn records(&self) -> &[FieldRecord] {
        &self.records
    }
}
