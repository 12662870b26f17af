//! Brush state: position, facing direction and drawing mode.

/// Compass offsets as `(dcol, drow)`, clockwise from north.
pub const DIRECTIONS: [(isize, isize); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Arrow for each entry of [`DIRECTIONS`], used in debug logs.
pub const DIRECTION_ARROWS: [char; 8] = ['↑', '↗', '→', '↘', '↓', '↙', '←', '↖'];

/// Grid effect applied by each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Write the brush glyph.
    #[default]
    Draw,
    /// Move without touching the grid.
    Hover,
    /// Remove any glyph.
    Eraser,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Draw => "draw",
            Mode::Hover => "hover",
            Mode::Eraser => "eraser",
        }
    }
}

/// The drawing cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brush {
    /// Index into [`DIRECTIONS`].
    pub direction: usize,
    pub mode: Mode,
    pub col: usize,
    pub row: usize,
}

impl Brush {
    /// Brush facing north in draw mode at the given cell.
    pub fn new(col: usize, row: usize) -> Self {
        Self {
            direction: 0,
            mode: Mode::Draw,
            col,
            row,
        }
    }

    /// Rotate counter-clockwise by `n` steps of 45 degrees.
    pub fn turn_left(&mut self, n: i64) {
        self.rotate(-n);
    }

    /// Rotate clockwise by `n` steps of 45 degrees.
    pub fn turn_right(&mut self, n: i64) {
        self.rotate(n);
    }

    fn rotate(&mut self, n: i64) {
        let len = DIRECTIONS.len() as i64;
        self.direction = (self.direction as i64 + n.rem_euclid(len)).rem_euclid(len) as usize;
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Current `(dcol, drow)` offset.
    pub fn offset(&self) -> (isize, isize) {
        DIRECTIONS[self.direction]
    }

    pub fn arrow(&self) -> char {
        DIRECTION_ARROWS[self.direction]
    }

    /// The cell one step ahead, or `None` if it would leave a
    /// `cols` x `rows` grid.
    pub fn next_position(&self, cols: usize, rows: usize) -> Option<(usize, usize)> {
        let (dcol, drow) = self.offset();
        let col = self.col.checked_add_signed(dcol)?;
        let row = self.row.checked_add_signed(drow)?;
        (col < cols && row < rows).then_some((col, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_brush_defaults() {
        let brush = Brush::new(15, 14);
        assert_eq!(brush.direction, 0);
        assert_eq!(brush.mode, Mode::Draw);
        assert_eq!(brush.offset(), (0, 1));
        assert_eq!(brush.arrow(), '↑');
    }

    #[test]
    fn test_turn_right_wraps() {
        let mut brush = Brush::new(0, 0);
        brush.turn_right(2);
        assert_eq!(brush.direction, 2);
        brush.turn_right(7);
        assert_eq!(brush.direction, 1);
    }

    #[test]
    fn test_turn_left_wraps_to_high_end() {
        let mut brush = Brush::new(0, 0);
        brush.turn_left(1);
        assert_eq!(brush.direction, 7);
        brush.turn_left(10);
        assert_eq!(brush.direction, 5);
    }

    #[test]
    fn test_negative_turns_reverse() {
        let mut brush = Brush::new(0, 0);
        brush.turn_left(-3);
        assert_eq!(brush.direction, 3);
        brush.turn_right(-4);
        assert_eq!(brush.direction, 7);
    }

    #[test]
    fn test_left_then_right_is_identity() {
        for start in 0..8 {
            for n in [0, 1, 3, 8, 13, 1_000_003, i64::MAX] {
                let mut brush = Brush::new(0, 0);
                brush.direction = start;
                brush.turn_left(n);
                brush.turn_right(n);
                assert_eq!(brush.direction, start, "start={start} n={n}");
            }
        }
    }

    #[test]
    fn test_set_mode_idempotent() {
        let mut brush = Brush::new(0, 0);
        brush.set_mode(Mode::Eraser);
        brush.set_mode(Mode::Eraser);
        assert_eq!(brush.mode, Mode::Eraser);
        assert_eq!(brush.mode.as_str(), "eraser");
    }

    #[test]
    fn test_next_position_bounds() {
        let mut brush = Brush::new(0, 0);
        // North from the origin is fine
        assert_eq!(brush.next_position(3, 3), Some((0, 1)));

        // South-west leaves the grid
        brush.direction = 5;
        assert_eq!(brush.next_position(3, 3), None);

        // East from the last column leaves the grid
        brush.col = 2;
        brush.direction = 2;
        assert_eq!(brush.next_position(3, 3), None);
    }
}
