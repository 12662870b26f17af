//! Per-session drawing surface.
//!
//! A [`Canvas`] pairs one sparse [`Grid`] with one [`Brush`] and the bounds
//! they live in. Movement follows a fixed order for every step:
//!
//! 1. apply the current mode at the current cell (draw, erase or nothing)
//! 2. compute the next cell from the facing direction
//! 3. move there only if it is inside the grid
//!
//! so a stroke against a wall still marks the wall cell while the brush
//! stays put.

mod brush;
mod grid;
mod render;

pub use brush::{Brush, Mode};
use grid::Grid;

use crate::config::CanvasConfig;
use tracing::debug;

/// One client's canvas: grid, brush and bounds.
#[derive(Debug, Clone)]
pub struct Canvas {
    config: CanvasConfig,
    grid: Grid,
    brush: Brush,
}

impl Canvas {
    /// Create an empty canvas with the brush at its configured start.
    pub fn new(config: CanvasConfig) -> Self {
        let brush = Brush::new(config.start_col, config.start_row);
        debug!(
            cols = config.cols,
            rows = config.rows,
            col = brush.col,
            row = brush.row,
            mode = brush.mode.as_str(),
            "Created canvas"
        );
        Self {
            config,
            grid: Grid::new(),
            brush,
        }
    }

    pub fn cols(&self) -> usize {
        self.config.cols
    }

    pub fn rows(&self) -> usize {
        self.config.rows
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[cfg(test)]
    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn turn_left(&mut self, n: i64) {
        self.brush.turn_left(n);
    }

    pub fn turn_right(&mut self, n: i64) {
        self.brush.turn_right(n);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.brush.set_mode(mode);
    }

    /// Take `n` steps; zero or negative counts do nothing.
    ///
    /// Once a step is blocked by the edge every further step repeats the
    /// same effect on the same cell, so the loop stops there.
    pub fn steps(&mut self, n: i64) {
        debug!(
            count = n,
            mode = self.brush.mode.as_str(),
            direction = %self.brush.arrow(),
            "Stepping"
        );
        for _ in 0..n.max(0) {
            if !self.step() {
                break;
            }
        }
    }

    /// Apply the mode at the current cell, then move if the next cell is
    /// inside the grid. Returns whether the brush moved.
    pub fn step(&mut self) -> bool {
        let Brush { col, row, mode, .. } = self.brush;
        match mode {
            Mode::Draw => self.grid.set(col, row, self.config.brush_glyph),
            Mode::Eraser => self.grid.clear(col, row),
            Mode::Hover => {}
        }

        if let Some((next_col, next_row)) =
            self.brush.next_position(self.config.cols, self.config.rows)
        {
            self.brush.col = next_col;
            self.brush.row = next_row;
            true
        } else {
            false
        }
    }

    /// Remove every glyph; the brush is left untouched.
    pub fn clear(&mut self) {
        if !self.grid.is_empty() {
            debug!(cells = self.grid.len(), "Clearing canvas");
        }
        self.grid.clear_all();
    }

    /// Brush position as reported on the wire: `(col, rows - (row + 1))`.
    pub fn coord(&self) -> (usize, usize) {
        (self.brush.col, self.config.rows - (self.brush.row + 1))
    }
}
