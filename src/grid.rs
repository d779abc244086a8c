use std::fmt;

use tracing::{debug, warn};

use crate::parser::entries::GridEntry;

const BLANK: &str = " ";

/// Largest grid accepted on either axis; entries past it are dropped before sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLimits {
    pub max_width: usize,
    pub max_height: usize,
}

impl Default for GridLimits {
    fn default() -> Self {
        GridLimits {
            max_width: 4096,
            max_height: 4096,
        }
    }
}

impl GridLimits {
    fn admits(&self, entry: &GridEntry) -> bool {
        entry.x < self.max_width && entry.y < self.max_height
    }
}

/// Dense row-major character grid, blank-filled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Option<String>>,
}

impl Grid {
    #[allow(dead_code)]
    pub fn assemble(entries: &[GridEntry]) -> Self {
        Self::assemble_within(entries, GridLimits::default())
    }

    /// Lay entries out by coordinate. Duplicate coordinates: the last entry wins.
    pub fn assemble_within(entries: &[GridEntry], limits: GridLimits) -> Self {
        let admitted: Vec<&GridEntry> = entries.iter().filter(|e| limits.admits(e)).collect();
        let dropped = entries.len() - admitted.len();
        if dropped > 0 {
            warn!(
                dropped,
                max_width = limits.max_width,
                max_height = limits.max_height,
                "Dropped entries beyond grid limits"
            );
        }

        let (Some(max_x), Some(max_y)) = (
            admitted.iter().map(|e| e.x).max(),
            admitted.iter().map(|e| e.y).max(),
        ) else {
            return Grid::default();
        };

        let width = max_x + 1;
        let height = max_y + 1;
        let mut cells: Vec<Option<String>> = Vec::new();
        let reserved = width
            .checked_mul(height)
            .filter(|&area| cells.try_reserve_exact(area).is_ok());
        let Some(area) = reserved else {
            warn!(width, height, "Grid too large to allocate, nothing to display");
            return Grid::default();
        };
        cells.resize(area, None);

        for entry in admitted {
            if entry.x < width && entry.y < height {
                cells[entry.y * width + entry.x] = Some(entry.character.clone());
            }
        }

        debug!(width, height, "Assembled grid");
        Grid {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[allow(dead_code)]
    pub fn get(&self, x: usize, y: usize) -> Option<&str> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x].as_deref().unwrap_or(BLANK))
        } else {
            None
        }
    }

    /// Rows top to bottom, cells joined left to right with no separator.
    pub fn rows(&self) -> Vec<String> {
        if self.width == 0 {
            return Vec::new();
        }
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|cell| cell.as_deref().unwrap_or(BLANK)).collect())
            .collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(x: usize, y: usize, character: &str) -> GridEntry {
        GridEntry::new(x, y, character)
    }

    #[test]
    fn empty_entries_give_no_rows() {
        let grid = Grid::assemble(&[]);
        assert!(grid.is_empty());
        assert_eq!(grid.width(), 0);
        assert_eq!(grid.height(), 0);
        assert!(grid.rows().is_empty());
        assert_eq!(grid.to_string(), "");
    }

    #[test]
    fn two_rows_blank_filled() {
        let entries = [e(0, 0, "A"), e(1, 0, "B"), e(0, 1, "C")];
        let first = Grid::assemble(&entries).rows();
        let second = Grid::assemble(&entries).rows();
        assert_eq!(first, vec!["AB", "C "]);
        assert_eq!(first, second);
    }

    #[test]
    fn last_duplicate_wins() {
        let grid = Grid::assemble(&[e(0, 0, "X"), e(0, 0, "Y")]);
        assert_eq!(grid.get(0, 0), Some("Y"));
        assert_eq!(grid.rows(), vec!["Y"]);
    }

    #[test]
    fn single_line_message() {
        let grid = Grid::assemble(&[e(0, 0, "H"), e(1, 0, "I")]);
        assert_eq!(grid.to_string(), "HI");
    }

    #[test]
    fn gaps_keep_trailing_spaces() {
        let grid = Grid::assemble(&[e(0, 0, "A"), e(2, 0, "B"), e(1, 1, "C")]);
        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert_eq!(grid.rows(), vec!["A B", " C "]);
        assert_eq!(grid.to_string(), "A B\n C ");
    }

    #[test]
    fn dimensions_follow_max_coordinates() {
        let grid = Grid::assemble(&[e(0, 0, "#"), e(9, 4, "#")]);
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 5);
        assert_eq!(grid.get(9, 4), Some("#"));
        assert_eq!(grid.get(5, 2), Some(" "));
        assert_eq!(grid.get(10, 0), None);
        assert_eq!(grid.get(0, 5), None);
    }

    #[test]
    fn entries_past_limits_are_dropped() {
        let limits = GridLimits {
            max_width: 8,
            max_height: 8,
        };
        let entries = [e(0, 0, "A"), e(1, 1, "B"), e(1_000_000, 0, "Z"), e(0, usize::MAX, "Z")];
        let grid = Grid::assemble_within(&entries, limits);
        assert_eq!((grid.width(), grid.height()), (2, 2));
        assert_eq!(grid.rows(), vec!["A ", " B"]);
    }

    #[test]
    fn everything_past_limits_is_empty() {
        let limits = GridLimits {
            max_width: 2,
            max_height: 2,
        };
        let grid = Grid::assemble_within(&[e(5, 5, "Q")], limits);
        assert!(grid.rows().is_empty());
    }

    #[test]
    fn oversized_limits_do_not_overflow() {
        let limits = GridLimits {
            max_width: usize::MAX,
            max_height: usize::MAX,
        };
        let entries = [e(usize::MAX / 2, 0, "A"), e(0, 3, "B")];
        let grid = Grid::assemble_within(&entries, limits);
        assert!(grid.is_empty());
        assert!(grid.rows().is_empty());
    }

    #[test]
    fn emoji_cell_renders_whole() {
        let grid = Grid::assemble(&[e(0, 0, "\u{2764}\u{fe0f}"), e(1, 0, "!")]);
        assert_eq!(grid.rows(), vec!["\u{2764}\u{fe0f}!"]);
    }

    #[test]
    fn multibyte_glyphs_render() {
        let grid = Grid::assemble(&[e(0, 0, "█"), e(2, 0, "░"), e(1, 1, "▀")]);
        assert_eq!(grid.rows(), vec!["█ ░", " ▀ "]);
    }
}
