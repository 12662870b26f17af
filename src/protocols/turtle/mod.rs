//! Turtle protocol implementation.
//!
//! Each client drives its own canvas with line commands:
//! - Client sends: `<command>[ <argument>]\r\n`, case-insensitive
//! - Server responds only to `render`, `coord` and `test`
//!
//! ## Protocol Format
//!
//! ```text
//! Greeting: hello\r\n
//!
//! Request:  steps 3\r\ncoord\r\n
//! Response: (15,12)\r\n
//! ```
//!
//! Commands: `steps n`, `left n`, `right n`, `draw`, `hover`, `erase`,
//! `coord`, `render`, `clear`, `quit`, `test`.
//!
//! Unknown commands and malformed arguments never produce a reply; the
//! line is dropped (or the argument defaults) and the session carries on.

pub mod handler;
pub mod parser;

pub use handler::handle_connection;
