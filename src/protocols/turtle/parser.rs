//! Turtle protocol parser.

/// Line terminator used for inbound framing and all output.
pub const CRLF: &str = "\r\n";

/// Parsed turtle command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Take `n` steps in the current direction.
    Steps(i64),
    /// Rotate counter-clockwise `n` times.
    Left(i64),
    /// Rotate clockwise `n` times.
    Right(i64),
    /// Switch to hover mode.
    Hover,
    /// Switch to draw mode.
    Draw,
    /// Switch to eraser mode (wire literal `erase`).
    Erase,
    /// Report the brush position.
    Coord,
    /// Send the framed canvas.
    Render,
    /// Remove every glyph.
    Clear,
    /// Close the connection.
    Quit,
    /// Run the built-in demo sequence.
    Test,
}

/// Parse result for a single line.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseResult {
    /// Recognized command.
    Complete(Command),
    /// Token that names no command; ignored by the session.
    Unknown(String),
}

const DEFAULT_STEPS: i64 = 0;
const DEFAULT_TURN: i64 = 1;

/// Parse one line (without its terminator).
///
/// The line is trimmed, stray `\r`/`\n` are removed, it is lower-cased and
/// split on the first space into a command token and an optional argument.
pub fn parse(line: &str) -> ParseResult {
    let cleaned: String = line.chars().filter(|c| *c != '\r' && *c != '\n').collect();
    let normalized = cleaned.trim().to_lowercase();

    let (token, rest) = match normalized.split_once(' ') {
        Some((token, rest)) => (token, Some(rest)),
        None => (normalized.as_str(), None),
    };

    let command = match token {
        "steps" => Command::Steps(int_arg(rest).unwrap_or(DEFAULT_STEPS)),
        "left" => Command::Left(int_arg(rest).unwrap_or(DEFAULT_TURN)),
        "right" => Command::Right(int_arg(rest).unwrap_or(DEFAULT_TURN)),
        "hover" => Command::Hover,
        "draw" => Command::Draw,
        "erase" => Command::Erase,
        "coord" => Command::Coord,
        "render" => Command::Render,
        "clear" => Command::Clear,
        "quit" => Command::Quit,
        "test" => Command::Test,
        other => return ParseResult::Unknown(other.to_string()),
    };

    ParseResult::Complete(command)
}

/// Split a payload into lines on `\r\n`.
///
/// Invalid UTF-8 is replaced rather than rejected; such lines simply fail
/// to match a command.
pub fn lines(payload: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(payload)
        .split(CRLF)
        .map(str::to_string)
        .collect()
}

/// Length of the leading part of `buffer` made of whole lines.
///
/// Input ending in `\n` is complete as-is, so clients that terminate with
/// a bare LF are served. Otherwise everything through the last `\r\n` is
/// complete and the tail waits for more data. `None` means no line is
/// finished yet.
pub fn complete_len(buffer: &[u8]) -> Option<usize> {
    if buffer.ends_with(b"\n") {
        return Some(buffer.len());
    }
    buffer
        .windows(2)
        .rposition(|w| w == CRLF.as_bytes())
        .map(|pos| pos + 2)
}

fn int_arg(rest: Option<&str>) -> Option<i64> {
    rest?.split_whitespace().next()?.parse().ok()
}
