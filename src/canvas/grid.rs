//! Sparse glyph storage for a single canvas.

use std::collections::HashMap;

/// Sparse map of occupied cells to the glyph drawn there.
///
/// Coordinates are `(col, row)` with row 0 at the bottom. No bounds
/// checking happens here; the brush only ever hands in-bounds cells.
#[derive(Debug, Default, Clone)]
pub struct Grid {
    cells: HashMap<(usize, usize), char>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a glyph, replacing whatever was there.
    pub fn set(&mut self, col: usize, row: usize, glyph: char) {
        self.cells.insert((col, row), glyph);
    }

    /// Remove the glyph at a cell, if any.
    pub fn clear(&mut self, col: usize, row: usize) {
        self.cells.remove(&(col, row));
    }

    pub fn get(&self, col: usize, row: usize) -> Option<char> {
        self.cells.get(&(col, row)).copied()
    }

    /// Empty every cell.
    pub fn clear_all(&mut self) {
        self.cells.clear();
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
