use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use unicode_segmentation::UnicodeSegmentation;

use super::table::Row;

/// One glyph placed on the grid. `character` is a single grapheme cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridEntry {
    pub x: usize,
    pub y: usize,
    pub character: String,
}

impl GridEntry {
    pub fn new(x: usize, y: usize, character: impl Into<String>) -> Self {
        GridEntry {
            x,
            y,
            character: character.into(),
        }
    }
}

/// Cell index of each column the extractor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub x: usize,
    pub character: usize,
    pub y: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        ColumnLayout {
            x: 0,
            character: 1,
            y: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    X,
    Character,
    Y,
}

impl ColumnLayout {
    /// Layout named by a header row, if every cell that matters reads as a label.
    pub fn from_header(cells: &[String]) -> Option<Self> {
        let (mut x, mut character, mut y) = (None, None, None);
        for (idx, cell) in cells.iter().enumerate() {
            if cell.trim().is_empty() {
                continue;
            }
            let slot = match column_label(cell)? {
                Column::X => &mut x,
                Column::Character => &mut character,
                Column::Y => &mut y,
            };
            if slot.replace(idx).is_some() {
                return None;
            }
        }
        Some(ColumnLayout {
            x: x?,
            character: character?,
            y: y?,
        })
    }

    fn columns_needed(&self) -> usize {
        self.x.max(self.character).max(self.y) + 1
    }
}

fn column_label(cell: &str) -> Option<Column> {
    let label: String = cell
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    match label.as_str() {
        "x" | "xcoord" | "xcoordinate" | "xpos" | "xposition" => Some(Column::X),
        "y" | "ycoord" | "ycoordinate" | "ypos" | "yposition" => Some(Column::Y),
        "char" | "character" | "glyph" | "symbol" | "letter" => Some(Column::Character),
        _ => None,
    }
}

/// Why a row produced no entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowSkip {
    #[error("expected {expected} columns, found {found}")]
    MissingColumn { expected: usize, found: usize },
    #[error("x coordinate {0:?} is not a non-negative integer")]
    BadX(String),
    #[error("y coordinate {0:?} is not a non-negative integer")]
    BadY(String),
    #[error("character cell is empty")]
    EmptyCharacter,
    #[error("character cell {0:?} holds more than one glyph")]
    MultipleCharacters(String),
}

pub fn parse_row(cells: &[String], layout: &ColumnLayout) -> Result<GridEntry, RowSkip> {
    let expected = layout.columns_needed();
    if cells.len() < expected {
        return Err(RowSkip::MissingColumn {
            expected,
            found: cells.len(),
        });
    }

    let x_cell = cells[layout.x].trim();
    let x = x_cell
        .parse::<usize>()
        .map_err(|_| RowSkip::BadX(x_cell.to_string()))?;

    let y_cell = cells[layout.y].trim();
    let y = y_cell
        .parse::<usize>()
        .map_err(|_| RowSkip::BadY(y_cell.to_string()))?;

    let char_cell = cells[layout.character].trim();
    let mut glyphs = char_cell.graphemes(true);
    match (glyphs.next(), glyphs.next()) {
        (None, _) => Err(RowSkip::EmptyCharacter),
        (Some(glyph), None) => Ok(GridEntry::new(x, y, glyph)),
        (Some(_), Some(_)) => Err(RowSkip::MultipleCharacters(char_cell.to_string())),
    }
}

/// Turn table rows into entries, in row order. Header rows set the column layout
/// for the rows after them; rows that fail to parse are skipped.
pub fn extract_entries(rows: &[Row]) -> Vec<GridEntry> {
    let mut layout = ColumnLayout::default();
    let mut entries = Vec::with_capacity(rows.len());
    let mut headers = 0usize;
    let mut skipped = 0usize;

    for (idx, row) in rows.iter().enumerate() {
        if let Some(header) = ColumnLayout::from_header(&row.cells) {
            debug!(row = idx, ?header, "Header row");
            layout = header;
            headers += 1;
            continue;
        }
        match parse_row(&row.cells, &layout) {
            Ok(entry) => entries.push(entry),
            Err(reason) => {
                debug!(row = idx, %reason, "Skipping row");
                skipped += 1;
            }
        }
    }

    info!(
        rows = rows.len(),
        entries = entries.len(),
        headers,
        skipped,
        "Extracted grid entries"
    );
    entries
}
