use crate::spreadsheet::cell::Cell;
use std::collections::BTreeMap;
use std::collections::HashMap;

/// A materialized worksheet: every cell the container recorded, indexed by position.
#[derive(Debug, Default)]
pub struct Sheet {
    /// Sheet name
    pub name: String,
    /// All recorded cells, in the order the reader produced them
    cells: Vec<Cell>,
    /// Index mapping from (row, col) to position in `cells`
    indexes: HashMap<(usize, usize), usize>,
    /// Present rows mapped to their column end (one past the last recorded cell)
    rows: BTreeMap<usize, usize>,
}

impl Sheet {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Adds a cell to the sheet. A later cell at the same position replaces the earlier one.
    pub(crate) fn push(&mut self, cell: Cell) {
        let end = self.rows.entry(cell.row).or_insert(0);
        *end = (*end).max(cell.col + 1);
        if let Some(index) = self.indexes.get(&(cell.row, cell.col)) {
            self.cells[*index] = cell;
        } else {
            self.indexes.insert((cell.row, cell.col), self.cells.len());
            self.cells.push(cell);
        }
    }

    /// Gets the cell at the specified position, if one was recorded.
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.indexes
            .get(&(row, col))
            .and_then(|index| self.cells.get(*index))
    }

    /// Checks whether any cell was recorded in the row.
    pub fn has_row(&self, row: usize) -> bool {
        self.rows.contains_key(&row)
    }

    /// Column end of a present row: one past its last recorded cell.
    pub fn row_end(&self, row: usize) -> Option<usize> {
        self.rows.get(&row).copied()
    }

    /// Index of the first present row.
    pub fn first_row(&self) -> Option<usize> {
        self.rows.keys().next().copied()
    }

    /// Index of the last present row.
    pub fn last_row(&self) -> Option<usize> {
        self.rows.keys().next_back().copied()
    }

    /// Present rows within `[lower, upper]`, ascending. Empty when `lower > upper`.
    pub fn rows_between(&self, lower: usize, upper: usize) -> impl Iterator<Item = usize> + '_ {
        (lower <= upper)
            .then(|| self.rows.range(lower..=upper))
            .into_iter()
            .flatten()
            .map(|(row, _)| *row)
    }
}
