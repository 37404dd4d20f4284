//! Length-bounded line reader for the control channel.

use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlLine {
    /// One line, terminator included.
    Line(String),
    /// A line went over the limit. The rest of it, up to the next newline, is
    /// skipped silently.
    TooLong,
}

pub struct LineReader<R> {
    reader: BufReader<R>,
    line: Vec<u8>,
    max_len: usize,
    discarding: bool,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R, max_len: usize) -> Self {
        Self {
            reader: BufReader::new(inner),
            line: Vec::new(),
            max_len,
            discarding: false,
        }
    }

    /// Reads the next line. `None` on EOF; a partial trailing line is dropped.
    ///
    /// Cancel safe: bytes are consumed from the buffer only once they are kept
    /// in `self`, so a dropped call loses nothing.
    pub async fn next_line(&mut self) -> io::Result<Option<ControlLine>> {
        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(None);
            }

            let (used, complete) = match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (available.len(), false),
            };
            let overflow = !self.discarding && self.line.len() + used > self.max_len;
            if !self.discarding && !overflow {
                self.line.extend_from_slice(&available[..used]);
            }
            self.reader.consume(used);

            if overflow {
                self.line.clear();
                self.discarding = !complete;
                return Ok(Some(ControlLine::TooLong));
            }
            if complete {
                if self.discarding {
                    self.discarding = false;
                    continue;
                }
                let line = String::from_utf8_lossy(&self.line).into_owned();
                self.line.clear();
                return Ok(Some(ControlLine::Line(line)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> Option<ControlLine> {
        Some(ControlLine::Line(text.to_string()))
    }

    #[tokio::test]
    async fn splits_on_newline() {
        let input: &[u8] = b"USER esp\r\nPASS x\r\npartial";
        let mut reader = LineReader::new(input, 64);
        assert_eq!(reader.next_line().await.unwrap(), line("USER esp\r\n"));
        assert_eq!(reader.next_line().await.unwrap(), line("PASS x\r\n"));
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn overlong_line_is_reported_once_and_skipped() {
        let mut input = vec![b'A'; 100];
        input.extend_from_slice(b"AAAA\r\nNOOP\r\n");
        let mut reader = LineReader::new(input.as_slice(), 16);
        assert_eq!(reader.next_line().await.unwrap(), Some(ControlLine::TooLong));
        assert_eq!(reader.next_line().await.unwrap(), line("NOOP\r\n"));
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn line_at_the_limit_is_kept() {
        let input: &[u8] = b"NOOP\r\n";
        let mut reader = LineReader::new(input, 6);
        assert_eq!(reader.next_line().await.unwrap(), line("NOOP\r\n"));
    }

    #[tokio::test]
    async fn endless_line_never_grows_the_buffer() {
        let input = vec![b'A'; 1 << 20];
        let mut reader = LineReader::new(input.as_slice(), 4096);
        assert_eq!(reader.next_line().await.unwrap(), Some(ControlLine::TooLong));
        assert_eq!(reader.next_line().await.unwrap(), None);
        assert_eq!(reader.line.capacity(), 0);
    }
}
