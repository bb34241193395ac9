//! Destructive line cursor.
//!
//! The world grammar is line-driven: every step looks at the current line,
//! decides what it is, and takes it. Taking a line clears it in place so a
//! consumed line can never be read twice.

use crate::error::{MosaicError, Result};

/// Cursor over the lines of one document.
#[derive(Debug)]
pub struct LineCursor {
    lines: Vec<String>,
    position: usize,
}

impl LineCursor {
    /// Create a cursor, stripping one trailing `\r` from each line.
    pub fn new(lines: Vec<String>) -> Self {
        let lines = lines
            .into_iter()
            .map(|mut line| {
                if line.ends_with('\r') {
                    line.pop();
                }
                line
            })
            .collect();

        Self { lines, position: 0 }
    }

    /// Split text on `\n` and build a cursor over the pieces.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.split('\n').map(str::to_string).collect())
    }

    /// Whether every line has been taken.
    pub fn is_done(&self) -> bool {
        self.position >= self.lines.len()
    }

    /// 1-based number of the current line.
    pub fn line_number(&self) -> usize {
        self.position + 1
    }

    /// The current line, if any remain.
    pub fn peek(&self) -> Option<&str> {
        self.lines.get(self.position).map(String::as_str)
    }

    /// Whether the current line starts with `prefix`.
    pub fn check(&self, prefix: &str) -> bool {
        self.peek().is_some_and(|line| line.starts_with(prefix))
    }

    /// Whether the cursor sits on a blank separator (or past the end).
    pub fn check_blank(&self) -> bool {
        self.peek().map_or(true, |line| line.trim().is_empty())
    }

    /// Take the current line, failing if the input ran out.
    ///
    /// `expected` names what the caller was looking for, for the error.
    pub fn take_line(&mut self, expected: &str) -> Result<String> {
        let line_number = self.line_number();
        let line = self
            .lines
            .get_mut(self.position)
            .ok_or_else(|| MosaicError::UnexpectedEnd {
                line: line_number,
                expected: expected.to_string(),
            })?;

        let taken = std::mem::take(line);
        self.position += 1;
        Ok(taken)
    }

    /// Take and discard the current line; no-op past the end.
    pub fn skip_line(&mut self) {
        if let Some(line) = self.lines.get_mut(self.position) {
            line.clear();
            self.position += 1;
        }
    }

    /// Take the current line and split it once on `delimiter`.
    ///
    /// A line without the delimiter yields the whole line and an empty rest.
    pub fn take_split_once(&mut self, delimiter: char, expected: &str) -> Result<(String, String)> {
        let line = self.take_line(expected)?;
        Ok(split_once(&line, delimiter))
    }

    /// Build a parse error pointing at the line just taken.
    pub fn error_at_previous(&self, text: &str, message: impl Into<String>) -> MosaicError {
        MosaicError::Parse {
            line: self.position.max(1),
            text: text.to_string(),
            message: message.into(),
        }
    }
}

/// Split `line` at the first `delimiter`.
pub(crate) fn split_once(line: &str, delimiter: char) -> (String, String) {
    match line.split_once(delimiter) {
        Some((head, rest)) => (head.to_string(), rest.to_string()),
        None => (line.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(text: &str) -> LineCursor {
        LineCursor::from_text(text)
    }

    #[test]
    fn test_take_clears_line() {
        let mut c = cursor("a\nb");
        assert_eq!(c.take_line("first").unwrap(), "a");
        assert_eq!(c.peek(), Some("b"));
        assert_eq!(c.lines[0], "");
        assert_eq!(c.line_number(), 2);
    }

    #[test]
    fn test_take_past_end_is_error() {
        let mut c = cursor("only");
        c.skip_line();
        let err = c.take_line("frame row").unwrap_err();
        match err {
            MosaicError::UnexpectedEnd { line, expected } => {
                assert_eq!(line, 2);
                assert_eq!(expected, "frame row");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_blank_checks() {
        let mut c = cursor("x\n   \n");
        assert!(!c.check_blank());
        c.skip_line();
        assert!(c.check_blank());
        c.skip_line();
        // Trailing empty piece after the final newline
        assert!(c.check_blank());
        c.skip_line();
        assert!(c.is_done());
        assert!(c.check_blank());
        assert!(!c.check("x"));
    }

    #[test]
    fn test_strips_carriage_return() {
        let mut c = cursor("PAL 0\r\n0,0,0\r");
        assert_eq!(c.take_line("header").unwrap(), "PAL 0");
        assert_eq!(c.take_line("colour").unwrap(), "0,0,0");
    }

    #[test]
    fn test_split_once() {
        assert_eq!(split_once("TIL a b", ' '), ("TIL".to_string(), "a b".to_string()));
        assert_eq!(split_once("TIL", ' '), ("TIL".to_string(), String::new()));
    }

    #[test]
    fn test_skip_past_end_is_noop() {
        let mut c = cursor("");
        c.skip_line();
        c.skip_line();
        assert!(c.is_done());
    }
}
