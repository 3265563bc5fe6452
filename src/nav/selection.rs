//! Grid selection cursor.
//!
//! Rows are catalog collections and may all have different lengths. Each row
//! also scrolls horizontally on its own, so the same column index can sit at
//! different on-screen positions in neighbouring rows. `RowAlignment`
//! decides which tile a vertical move lands on.

/// Navigation direction for grid movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

impl Cursor {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// How a vertical move picks the column in the target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowAlignment {
    /// Carry the raw column index over. Rows scrolled to different offsets
    /// make the selection jump sideways on screen; this is the historical
    /// behavior and stays the default.
    #[default]
    IndexPreserving,
    /// Pick the tile that occupies the same on-screen slot in the target row.
    PositionPreserving,
}

impl RowAlignment {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "index" | "index-preserving" => Some(Self::IndexPreserving),
            "position" | "position-preserving" => Some(Self::PositionPreserving),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub from: Cursor,
    pub to: Cursor,
}

/// Selection state for the grid
#[derive(Debug, Clone)]
pub struct GridSelection {
    cursor: Option<Cursor>,
    row_lengths: Vec<usize>,
    alignment: RowAlignment,
    /// Number of tiles a row strip shows at once.
    visible_columns: usize,
    /// First visible column of each row strip.
    row_offsets: Vec<usize>,
}

impl GridSelection {
    pub fn new(alignment: RowAlignment) -> Self {
        Self {
            cursor: None,
            row_lengths: Vec::new(),
            alignment,
            visible_columns: 1,
            row_offsets: Vec::new(),
        }
    }

    /// Replace the grid geometry. The cursor moves to the first tile of the
    /// first non-empty row, or to `None` when there are no tiles at all.
    pub fn set_rows(&mut self, row_lengths: Vec<usize>) {
        self.row_offsets = vec![0; row_lengths.len()];
        self.cursor = row_lengths
            .iter()
            .position(|&len| len > 0)
            .map(|row| Cursor::new(row, 0));
        self.row_lengths = row_lengths;
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    pub fn row_count(&self) -> usize {
        self.row_lengths.len()
    }

    pub fn row_len(&self, row: usize) -> usize {
        self.row_lengths.get(row).copied().unwrap_or(0)
    }

    pub fn visible_columns(&self) -> usize {
        self.visible_columns
    }

    /// Update how many tiles fit in a row strip. Offsets are recomputed for
    /// the selected row only; other rows keep their scroll position.
    pub fn set_visible_columns(&mut self, count: usize) {
        self.visible_columns = count.max(1);
        for row in 0..self.row_offsets.len() {
            let max_offset = self.row_len(row).saturating_sub(self.visible_columns);
            self.row_offsets[row] = self.row_offsets[row].min(max_offset);
        }
        if let Some(cursor) = self.cursor {
            self.recenter(cursor);
        }
    }

    pub fn row_offset(&self, row: usize) -> usize {
        self.row_offsets.get(row).copied().unwrap_or(0)
    }

    /// Move selection in the given direction. Returns `None` when the move
    /// is blocked by a grid edge, leaving all state untouched.
    pub fn move_selection(&mut self, direction: Direction) -> Option<SelectionChange> {
        let from = self.cursor?;

        let to = match direction {
            Direction::Left => Cursor::new(from.row, from.col.saturating_sub(1)),
            Direction::Right => {
                let last = self.row_len(from.row).saturating_sub(1);
                Cursor::new(from.row, (from.col + 1).min(last))
            }
            Direction::Up => {
                let row = (0..from.row).rev().find(|&r| self.row_len(r) > 0)?;
                Cursor::new(row, self.target_column(from, row))
            }
            Direction::Down => {
                let row = (from.row + 1..self.row_count()).find(|&r| self.row_len(r) > 0)?;
                Cursor::new(row, self.target_column(from, row))
            }
        };

        self.apply(from, to)
    }

    /// Select a specific tile (pointer activation). Out-of-range targets are
    /// ignored.
    pub fn select(&mut self, to: Cursor) -> Option<SelectionChange> {
        let from = self.cursor?;
        if to.col >= self.row_len(to.row) {
            return None;
        }
        self.apply(from, to)
    }

    fn apply(&mut self, from: Cursor, to: Cursor) -> Option<SelectionChange> {
        if from == to {
            return None;
        }
        self.cursor = Some(to);
        self.recenter(to);
        Some(SelectionChange { from, to })
    }

    fn target_column(&self, from: Cursor, row: usize) -> usize {
        let last = self.row_len(row).saturating_sub(1);
        match self.alignment {
            RowAlignment::IndexPreserving => from.col.min(last),
            RowAlignment::PositionPreserving => {
                let slot = from.col.saturating_sub(self.row_offset(from.row));
                (self.row_offset(row) + slot).min(last)
            }
        }
    }

    /// Scroll the cursor's row so the selected tile sits in the middle of
    /// the strip, without scrolling past either end.
    fn recenter(&mut self, cursor: Cursor) {
        let max_offset = self.row_len(cursor.row).saturating_sub(self.visible_columns);
        let centered = cursor.col.saturating_sub(self.visible_columns / 2);
        if let Some(offset) = self.row_offsets.get_mut(cursor.row) {
            *offset = centered.min(max_offset);
        }
    }
}

impl Default for GridSelection {
    fn default() -> Self {
        Self::new(RowAlignment::default())
    }
}
