//! Turtle protocol session and connection handler.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use super::parser::{self, Command, ParseResult, CRLF};
use crate::canvas::{Canvas, Mode};
use crate::config::CanvasConfig;

/// Read buffer size
const BUFFER_SIZE: usize = 4 * 1024;

/// Longest unterminated input kept while waiting for a line ending
const MAX_PENDING: usize = 64 * 1024;

/// Outcome of processing a payload or command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// Keep reading from the client.
    Continue,
    /// Client sent quit; close after flushing output.
    Quit,
}

/// Per-connection interpreter state.
#[derive(Debug)]
pub struct Session {
    canvas: Canvas,
}

impl Session {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            canvas: Canvas::new(config),
        }
    }

    #[cfg(test)]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Run every line of one inbound payload, in order, appending any
    /// output to `out`. Lines after `quit` are not run.
    pub fn process(&mut self, payload: &[u8], out: &mut BytesMut) -> ProcessResult {
        for line in parser::lines(payload) {
            match parser::parse(&line) {
                ParseResult::Complete(command) => {
                    trace!(?command, "Processing command");
                    if self.execute(command, out) == ProcessResult::Quit {
                        return ProcessResult::Quit;
                    }
                }
                ParseResult::Unknown(token) => {
                    if !token.is_empty() {
                        debug!(command = %token, "Ignoring unsupported command");
                    }
                }
            }
        }
        ProcessResult::Continue
    }

    /// Execute a single command against the canvas.
    pub fn execute(&mut self, command: Command, out: &mut BytesMut) -> ProcessResult {
        match command {
            Command::Steps(n) => self.canvas.steps(n),
            Command::Left(n) => self.canvas.turn_left(n),
            Command::Right(n) => self.canvas.turn_right(n),
            Command::Hover => self.canvas.set_mode(Mode::Hover),
            Command::Draw => self.canvas.set_mode(Mode::Draw),
            Command::Erase => self.canvas.set_mode(Mode::Eraser),
            Command::Coord => self.canvas.render_coord(out),
            Command::Render => self.canvas.render(out),
            Command::Clear => self.canvas.clear(),
            Command::Quit => return ProcessResult::Quit,
            Command::Test => {
                for _ in 0..4 {
                    self.canvas.steps(5);
                    self.canvas.turn_right(2);
                }
                self.canvas.render(out);
            }
        }
        ProcessResult::Continue
    }
}

/// Handle a turtle protocol connection.
///
/// Sends the greeting, then feeds every complete run of lines to a fresh
/// [`Session`] until the client quits or disconnects. A partial line at
/// the end of a read stays buffered until its terminator arrives. The
/// session is dropped on return.
pub async fn handle_connection<S>(mut stream: S, config: CanvasConfig) -> std::io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(format!("hello{CRLF}").as_bytes()).await?;

    let mut session = Session::new(config);
    let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);
    let mut output = BytesMut::new();

    loop {
        buffer.reserve(BUFFER_SIZE);
        let n = stream.read_buf(&mut buffer).await?;
        if n == 0 {
            trace!("Connection closed by client");
            return Ok(());
        }

        let consumed = match parser::complete_len(&buffer) {
            Some(len) => len,
            None => {
                if buffer.len() > MAX_PENDING {
                    // Can never name a command; drop it and keep reading
                    debug!(bytes = buffer.len(), "Discarding unterminated input");
                    buffer.clear();
                }
                continue;
            }
        };
        let payload = buffer.split_to(consumed);

        output.clear();
        let result = session.process(&payload, &mut output);

        if !output.is_empty() {
            stream.write_all(&output).await?;
        }

        if result == ProcessResult::Quit {
            stream.shutdown().await?;
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn session() -> Session {
        Session::new(CanvasConfig::default())
    }

    fn run(session: &mut Session, payload: &[u8]) -> (ProcessResult, String) {
        let mut out = BytesMut::new();
        let result = session.process(payload, &mut out);
        (result, String::from_utf8(out.to_vec()).unwrap())
    }

    fn render_of(canvas: &Canvas) -> String {
        let mut out = BytesMut::new();
        canvas.render(&mut out);
        String::from_utf8(out.to_vec()).unwrap()
    }

    #[test]
    fn test_steps_then_coord() {
        let mut session = session();
        let (result, output) = run(&mut session, b"steps 3\r\ncoord\r\n");

        assert_eq!(result, ProcessResult::Continue);
        assert_eq!(output, "(15,12)\r\n");
        assert_eq!(session.canvas().grid().len(), 3);
    }

    #[test]
    fn test_unknown_command_is_ignored() {
        let mut session = session();
        let (_, output) = run(&mut session, b"foobar\r\n");
        assert_eq!(output, "");
        assert!(session.canvas().grid().is_empty());
        assert_eq!(
            (session.canvas().brush().col, session.canvas().brush().row),
            (15, 14)
        );

        let (_, output) = run(&mut session, b"steps 1\r\nfoobar 9\r\ncoord\r\n");
        assert_eq!(output, "(15,14)\r\n");
    }

    #[test]
    fn test_mode_commands() {
        let mut session = session();
        run(&mut session, b"erase\r\n");
        assert_eq!(session.canvas().brush().mode, Mode::Eraser);
        run(&mut session, b"HOVER\r\n");
        assert_eq!(session.canvas().brush().mode, Mode::Hover);
        run(&mut session, b"draw\r\n");
        assert_eq!(session.canvas().brush().mode, Mode::Draw);
    }

    #[test]
    fn test_turn_commands() {
        let mut session = session();
        run(&mut session, b"right 3\r\n");
        assert_eq!(session.canvas().brush().direction, 3);
        run(&mut session, b"left\r\n");
        assert_eq!(session.canvas().brush().direction, 2);
        run(&mut session, b"left 5\r\n");
        assert_eq!(session.canvas().brush().direction, 5);
    }

    #[test]
    fn test_clear_keeps_brush() {
        let mut session = session();
        run(&mut session, b"right 1\r\nsteps 4\r\nhover\r\n");
        let brush = *session.canvas().brush();

        run(&mut session, b"clear\r\n");
        assert!(session.canvas().grid().is_empty());
        assert_eq!(*session.canvas().brush(), brush);
    }

    #[test]
    fn test_render_command() {
        let mut session = session();
        let (_, output) = run(&mut session, b"steps 2\r\nrender\r\n");
        assert_eq!(output, render_of(session.canvas()));
        assert!(output.starts_with("╔"));
    }

    #[test]
    fn test_demo_sequence() {
        let mut session = session();
        let (_, output) = run(&mut session, b"test\r\n");

        let mut expected = Session::new(CanvasConfig::default());
        run(
            &mut expected,
            b"steps 5\r\nright 2\r\nsteps 5\r\nright 2\r\nsteps 5\r\nright 2\r\nsteps 5\r\nright 2\r\n",
        );

        assert_eq!(output, render_of(expected.canvas()));
        // A closed square of side 5 back at the start
        assert_eq!(session.canvas().grid().len(), 20);
        assert_eq!(*session.canvas().brush(), *expected.canvas().brush());
        assert_eq!(
            (session.canvas().brush().col, session.canvas().brush().row),
            (15, 14)
        );
    }

    #[test]
    fn test_quit_stops_payload() {
        let mut session = session();
        let (result, output) = run(&mut session, b"coord\r\nquit\r\nsteps 3\r\n");

        assert_eq!(result, ProcessResult::Quit);
        assert_eq!(output, "(15,15)\r\n");
        assert!(session.canvas().grid().is_empty());
    }

    #[tokio::test]
    async fn test_connection_greets_and_replies() {
        let stream = Builder::new()
            .write(b"hello\r\n")
            .read(b"steps 3\r\ncoord\r\n")
            .write(b"(15,12)\r\n")
            .read(b"draw\r\n")
            .read(b"coord\r\n")
            .write(b"(15,12)\r\n")
            .build();

        handle_connection(stream, CanvasConfig::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_connection_line_split_across_reads() {
        let stream = Builder::new()
            .write(b"hello\r\n")
            .read(b"ste")
            .read(b"ps 3\r\nco")
            .read(b"ord\r")
            .read(b"\n")
            .write(b"(15,12)\r\n")
            .build();

        handle_connection(stream, CanvasConfig::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_connection_payload_larger_than_buffer() {
        let mut payload = b"hover\r\n".repeat(600);
        payload.extend_from_slice(b"coord\r\n");
        assert!(payload.len() > BUFFER_SIZE);

        let stream = Builder::new()
            .write(b"hello\r\n")
            .read(&payload)
            .write(b"(15,15)\r\n")
            .build();

        handle_connection(stream, CanvasConfig::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_connection_bare_lf() {
        let stream = Builder::new()
            .write(b"hello\r\n")
            .read(b"coord\n")
            .write(b"(15,15)\r\n")
            .build();

        handle_connection(stream, CanvasConfig::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_connection_discards_oversized_fragment() {
        let garbage = vec![b'x'; MAX_PENDING + 10_000];
        let stream = Builder::new()
            .write(b"hello\r\n")
            .read(&garbage)
            .read(b"\r\ncoord\r\n")
            .write(b"(15,15)\r\n")
            .build();

        handle_connection(stream, CanvasConfig::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_connection_quit() {
        let stream = Builder::new()
            .write(b"hello\r\n")
            .read(b"QUIT\r\n")
            .build();

        handle_connection(stream, CanvasConfig::default())
            .await
            .unwrap();
    }
}
