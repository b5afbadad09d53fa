//! Cursor over the raw input bytes.
//!
//! The cursor decodes one character at a time and derives line and column
//! numbers while it moves forward. A newline character is reported at
//! column 0 of the line it opens, so the first character of every line sits
//! at column 1.

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// A location in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct Position {
    /// Byte offset from the start of the input
    pub offset: usize,
    /// Line number, starting at 1
    pub line: usize,
    /// Column number of the character at `offset`
    pub column: usize,
}

impl Position {
    /// Compute the position of `offset` by scanning `input` from the start.
    ///
    /// Offsets past the end of the input are clamped to the end.
    pub fn locate(input: &[u8], offset: usize) -> Self {
        let mut cursor = Cursor::new(input);
        while cursor.offset() < offset && !cursor.at_end() {
            cursor.advance();
        }
        cursor.position()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.line, self.column, self.offset)
    }
}

/// Snapshot of the cursor, sufficient to restore it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Savepoint {
    pub position: Position,
    /// Decoded character under the cursor, `None` at end of input
    pub current: Option<char>,
    /// Byte width of `current`
    pub width: usize,
    /// Whether `current` replaces an invalid byte sequence
    pub invalid: bool,
}

/// Forward-only reader with cheap savepoints.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a [u8],
    point: Savepoint,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        let mut cursor = Cursor {
            input,
            point: Savepoint {
                position: Position {
                    offset: 0,
                    line: 1,
                    column: 0,
                },
                current: None,
                width: 0,
                invalid: false,
            },
        };
        cursor.load();
        cursor
    }

    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    pub fn current(&self) -> Option<char> {
        self.point.current
    }

    pub fn position(&self) -> Position {
        self.point.position
    }

    pub fn offset(&self) -> usize {
        self.point.position.offset
    }

    pub fn at_end(&self) -> bool {
        self.point.current.is_none()
    }

    /// Whether the character under the cursor was substituted for invalid input.
    pub fn is_invalid(&self) -> bool {
        self.point.invalid
    }

    pub fn savepoint(&self) -> Savepoint {
        self.point
    }

    pub fn restore(&mut self, point: Savepoint) {
        self.point = point;
    }

    /// Move past the current character. Does nothing at end of input.
    pub fn advance(&mut self) {
        if self.at_end() {
            return;
        }
        self.point.position.offset += self.point.width;
        self.load();
    }

    /// Raw bytes consumed since `start`.
    pub fn slice_from(&self, start: &Savepoint) -> &'a [u8] {
        &self.input[start.position.offset..self.offset()]
    }

    /// Text consumed since `start`, with invalid sequences replaced.
    pub fn text_from(&self, start: &Savepoint) -> Cow<'a, str> {
        String::from_utf8_lossy(self.slice_from(start))
    }

    fn load(&mut self) {
        let (current, width, invalid) = decode(&self.input[self.point.position.offset..]);
        self.point.current = current;
        self.point.width = width;
        self.point.invalid = invalid;
        self.point.position.column += 1;
        if current == Some('\n') {
            self.point.position.line += 1;
            self.point.position.column = 0;
        }
    }
}

fn decode(bytes: &[u8]) -> (Option<char>, usize, bool) {
    let Some(&lead) = bytes.first() else {
        return (None, 0, false);
    };
    let len = match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    };
    if len > 0 && bytes.len() >= len {
        if let Some(ch) = std::str::from_utf8(&bytes[..len])
            .ok()
            .and_then(|s| s.chars().next())
        {
            return (Some(ch), len, false);
        }
    }
    (Some(char::REPLACEMENT_CHARACTER), 1, true)
}
