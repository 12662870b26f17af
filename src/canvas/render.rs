//! Text rendering of a canvas.
//!
//! ```text
//! ╔═════╗
//! ║     ║
//! ║  *  ║
//! ║  *  ║
//! ╚═════╝
//! ```
//!
//! Rows are emitted from the highest index down so row 0 sits at the
//! bottom. Every line, including a trailing blank one, ends in `\r\n`.

use super::Canvas;
use crate::protocols::turtle::parser::CRLF;
use bytes::BytesMut;
use std::fmt::Write;

const HORIZ: char = '═';
const VERT: char = '║';
const TOP_LEFT: char = '╔';
const TOP_RIGHT: char = '╗';
const BOT_LEFT: char = '╚';
const BOT_RIGHT: char = '╝';
const EMPTY: char = ' ';

impl Canvas {
    /// Append the framed grid to `out`.
    pub fn render(&self, out: &mut BytesMut) {
        out.reserve((self.cols() * 3 + 8) * (self.rows() + 3));

        self.border(out, TOP_LEFT, TOP_RIGHT);
        for row in (0..self.rows()).rev() {
            out.extend_from_slice(VERT.encode_utf8(&mut [0; 4]).as_bytes());
            for col in 0..self.cols() {
                let glyph = self.grid().get(col, row).unwrap_or(EMPTY);
                out.extend_from_slice(glyph.encode_utf8(&mut [0; 4]).as_bytes());
            }
            out.extend_from_slice(VERT.encode_utf8(&mut [0; 4]).as_bytes());
            out.extend_from_slice(CRLF.as_bytes());
        }
        self.border(out, BOT_LEFT, BOT_RIGHT);
        out.extend_from_slice(CRLF.as_bytes());
    }

    /// Append the `(col,row)` report line to `out`.
    pub fn render_coord(&self, out: &mut BytesMut) {
        let (col, row) = self.coord();
        // Writing into BytesMut cannot fail
        let _ = write!(out, "({col},{row}){CRLF}");
    }

    fn border(&self, out: &mut BytesMut, left: char, right: char) {
        let mut line = String::with_capacity((self.cols() + 2) * 3 + 2);
        line.push(left);
        line.extend(std::iter::repeat(HORIZ).take(self.cols()));
        line.push(right);
        line.push_str(CRLF);
        out.extend_from_slice(line.as_bytes());
    }
}
