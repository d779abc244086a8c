use std::borrow::Cow;
use std::sync::LazyLock;

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use regex::Regex;

static HTML_ROW_HINT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<tr[\s>]").unwrap());
static HTML_ROW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").unwrap());
static HTML_CELL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<t[dh]\b[^>]*>(.*?)</t[dh]\s*>").unwrap());
static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\|?(\s*:?-{3,}:?\s*\|)*\s*:?-{3,}:?\s*\|?$").unwrap());

/// Cell texts of one table row, in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<String>,
}

impl Row {
    pub fn new<S: Into<String>>(cells: impl IntoIterator<Item = S>) -> Self {
        Row {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }
}

/// Split a document into table rows. HTML tables win over delimited text.
pub fn read_rows(text: &str) -> Vec<Row> {
    if HTML_ROW_HINT_RE.is_match(text) {
        read_html_rows(text)
    } else {
        read_delimited_rows(text)
    }
}

fn read_html_rows(html: &str) -> Vec<Row> {
    HTML_ROW_RE
        .captures_iter(html)
        .map(|row| {
            Row::new(
                HTML_CELL_RE
                    .captures_iter(&row[1])
                    .map(|cell| cell_text(&cell[1])),
            )
        })
        .filter(|row| !row.cells.is_empty())
        .collect()
}

/// Visible text of an HTML cell: tags stripped, entities decoded, whitespace collapsed.
fn cell_text(inner: &str) -> String {
    let stripped = HTML_TAG_RE.replace_all(inner, " ");
    let decoded = decode_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(raw: &str) -> Cow<'_, str> {
    // Unknown named entities leave the cell as written.
    unescape_with(raw, |entity| resolve_html5_entity(entity)).unwrap_or(Cow::Borrowed(raw))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Tab,
    Pipe,
}

/// Delimited text uses one delimiter for the whole document, taken from the first
/// line that holds one. TAB wins so a `|` glyph survives in tab-separated tables.
fn read_delimited_rows(text: &str) -> Vec<Row> {
    let data_lines = || {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !SEPARATOR_RE.is_match(line))
    };

    let Some(delimiter) = data_lines().find_map(|line| {
        if line.contains('\t') {
            Some(Delimiter::Tab)
        } else if line.contains('|') {
            Some(Delimiter::Pipe)
        } else {
            None
        }
    }) else {
        return Vec::new();
    };

    data_lines()
        .filter_map(|line| match delimiter {
            Delimiter::Tab if line.contains('\t') => Some(Row::new(line.split('\t').map(str::trim))),
            Delimiter::Pipe if line.contains('|') => Some(Row::new(split_pipe_cells(line))),
            _ => None,
        })
        .collect()
}

/// Split a markdown table line on unescaped pipes; `\|` is a literal pipe.
fn split_pipe_cells(line: &str) -> Vec<String> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = match inner.strip_suffix('|') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => inner,
    };

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                cell.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut cell).trim().to_string()),
            _ => cell.push(c),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}
