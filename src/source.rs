use crate::parser::{ParseError, ParseErrorKind};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Line/column of the most recently read byte. Lines start at 1; column 0
/// means nothing on the line has been read yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 0 }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Default)]
struct Tracker {
    current: Position,
    previous: Option<Position>,
}

impl Tracker {
    fn advance(&mut self, b: u8) {
        self.previous = Some(self.current);
        if b == b'\n' {
            self.current.line += 1;
            self.current.column = 0;
        } else {
            self.current.column += 1;
        }
    }

    fn retreat(&mut self) {
        if let Some(prev) = self.previous.take() {
            self.current = prev;
        }
    }
}

/// Byte-at-a-time input with a single byte of pushback.
pub trait Source {
    /// Reads the next byte. Reading past the end is an `Incomplete` error.
    fn next(&mut self) -> Result<u8, ParseError>;
    /// Un-reads the byte returned by the last `next`. Only one level deep.
    fn pushback(&mut self);
    fn at_end(&mut self) -> bool;
    fn position(&self) -> Position;
}

/// In-memory source over a byte slice.
pub struct StrSource<'a> {
    input: &'a [u8],
    pos: usize,
    tracker: Tracker,
}

impl<'a> StrSource<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            tracker: Tracker::default(),
        }
    }
}

impl<'a> From<&'a str> for StrSource<'a> {
    fn from(s: &'a str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl Source for StrSource<'_> {
    fn next(&mut self) -> Result<u8, ParseError> {
        let b = *self
            .input
            .get(self.pos)
            .ok_or_else(|| ParseError::new(ParseErrorKind::Incomplete, self.tracker.current))?;
        self.pos += 1;
        self.tracker.advance(b);
        Ok(b)
    }

    fn pushback(&mut self) {
        if self.tracker.previous.is_some() {
            self.pos -= 1;
            self.tracker.retreat();
        }
    }

    fn at_end(&mut self) -> bool {
        self.pos >= self.input.len()
    }

    fn position(&self) -> Position {
        self.tracker.current
    }
}

/// Source over any buffered reader. The last byte read is remembered so it
/// can be handed out again after a pushback.
pub struct ReaderSource<R> {
    reader: R,
    last: Option<u8>,
    pushed_back: bool,
    tracker: Tracker,
}

pub type FileSource = ReaderSource<BufReader<File>>;

impl FileSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let file = File::open(path)
            .map_err(|e| ParseError::io(e, Position::default()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            last: None,
            pushed_back: false,
            tracker: Tracker::default(),
        }
    }
}

impl<R: BufRead> Source for ReaderSource<R> {
    fn next(&mut self) -> Result<u8, ParseError> {
        if self.pushed_back {
            if let Some(b) = self.last {
                self.pushed_back = false;
                self.tracker.advance(b);
                return Ok(b);
            }
        }
        let position = self.tracker.current;
        let buf = self
            .reader
            .fill_buf()
            .map_err(|e| ParseError::io(e, position))?;
        let b = *buf
            .first()
            .ok_or_else(|| ParseError::new(ParseErrorKind::Incomplete, position))?;
        self.reader.consume(1);
        self.last = Some(b);
        self.tracker.advance(b);
        Ok(b)
    }

    fn pushback(&mut self) {
        if self.last.is_some() && !self.pushed_back {
            self.pushed_back = true;
            self.tracker.retreat();
        }
    }

    fn at_end(&mut self) -> bool {
        if self.pushed_back {
            return false;
        }
        // A read error is not the end: the next `next` call reports it.
        match self.reader.fill_buf() {
            Ok(buf) => buf.is_empty(),
            Err(_) => false,
        }
    }

    fn position(&self) -> Position {
        self.tracker.current
    }
}
