use crate::source::{FileSource, Position, Source, StrSource};
use crate::value::{Array, Object, Value};
use log::{debug, trace};
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("invalid value type")]
    InvalidValueType,
    #[error("invalid object")]
    InvalidObject,
    #[error("invalid array")]
    InvalidArray,
    #[error("invalid escape character")]
    InvalidEscape,
    #[error("invalid unicode")]
    InvalidUnicode,
    #[error("unpaired unicode surrogate")]
    InvalidUnicodeSurrogate,
    #[error("control character in string")]
    ControlCharacter,
    #[error("invalid number")]
    InvalidNumber,
    #[error("number out of range")]
    NumberOutOfRange,
    #[error("invalid constant")]
    InvalidConstant,
    #[error("nesting too deep")]
    DepthLimitExceeded,
    #[error("incomplete input")]
    Incomplete,
    #[error("extra characters after value")]
    Extra,
    #[error("read error")]
    Io,
}

impl ParseErrorKind {
    /// Stable snake_case name of the error class.
    pub fn as_str(self) -> &'static str {
        match self {
            ParseErrorKind::InvalidValueType => "invalid_value_type",
            ParseErrorKind::InvalidObject => "invalid_object",
            ParseErrorKind::InvalidArray => "invalid_array",
            ParseErrorKind::InvalidEscape => "invalid_escape_character",
            ParseErrorKind::InvalidUnicode => "invalid_unicode",
            ParseErrorKind::InvalidUnicodeSurrogate => "invalid_unicode_surrogate",
            ParseErrorKind::ControlCharacter => "control_character",
            ParseErrorKind::InvalidNumber => "invalid_number",
            ParseErrorKind::NumberOutOfRange => "number_out_of_range",
            ParseErrorKind::InvalidConstant => "invalid_constant",
            ParseErrorKind::DepthLimitExceeded => "depth_limit_exceeded",
            ParseErrorKind::Incomplete => "incomplete",
            ParseErrorKind::Extra => "extra",
            ParseErrorKind::Io => "io",
        }
    }
}

#[derive(Debug, Error)]
#[error("error at {position}: {kind}")]
pub struct ParseError {
    kind: ParseErrorKind,
    position: Position,
    #[source]
    io: Option<io::Error>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, position: Position) -> Self {
        Self {
            kind,
            position,
            io: None,
        }
    }

    pub fn io(err: io::Error, position: Position) -> Self {
        Self {
            kind: ParseErrorKind::Io,
            position,
            io: Some(err),
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum nesting of objects and arrays.
    pub max_depth: usize,
}

impl ParseOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 512;

    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Recursive-descent parser reading one byte at a time from a [`Source`].
pub struct Parser<S> {
    source: S,
    options: ParseOptions,
    depth: usize,
}

impl<S: Source> Parser<S> {
    pub fn new(source: S) -> Self {
        Self::with_options(source, ParseOptions::default())
    }

    pub fn with_options(source: S, options: ParseOptions) -> Self {
        Self {
            source,
            options,
            depth: 0,
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.source.position())
    }

    fn next(&mut self) -> Result<u8> {
        self.source.next()
    }

    // Like `next`, but the end of input is a value rather than an error.
    fn bump(&mut self) -> Result<Option<u8>> {
        if self.source.at_end() {
            Ok(None)
        } else {
            self.next().map(Some)
        }
    }

    fn next_non_whitespace(&mut self) -> Result<u8> {
        loop {
            let b = self.next()?;
            if !is_whitespace(b) {
                return Ok(b);
            }
        }
    }

    /// Parses exactly one value; anything but whitespace after it is `Extra`.
    pub fn parse(mut self) -> Result<Value> {
        let value = self.parse_value()?;
        while let Some(b) = self.bump()? {
            if !is_whitespace(b) {
                return Err(self.error(ParseErrorKind::Extra));
            }
        }
        debug!("parsed {} value", value.type_name());
        Ok(value)
    }

    pub fn parse_value(&mut self) -> Result<Value> {
        let first = self.next_non_whitespace()?;
        self.parse_value_from(first)
    }

    fn parse_value_from(&mut self, first: u8) -> Result<Value> {
        match first {
            b'{' => self.parse_object(),
            b'[' => self.parse_array(),
            b'"' => self.parse_string().map(Value::from),
            b't' | b'f' | b'n' => self.parse_constant(first),
            b'-' | b'0'..=b'9' => self.parse_number(first).map(Value::Number),
            _ => Err(self.error(ParseErrorKind::InvalidValueType)),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        trace!("enter container, depth {}", self.depth);
        if self.depth > self.options.max_depth {
            return Err(self.error(ParseErrorKind::DepthLimitExceeded));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // The opening `{` has been consumed.
    fn parse_object(&mut self) -> Result<Value> {
        self.enter()?;
        let mut object = Object::new();
        let mut b = self.next_non_whitespace()?;
        if b != b'}' {
            loop {
                if b != b'"' {
                    return Err(self.error(ParseErrorKind::InvalidObject));
                }
                let key = self.parse_string()?;
                if self.next_non_whitespace()? != b':' {
                    return Err(self.error(ParseErrorKind::InvalidObject));
                }
                let first = self.next_non_whitespace()?;
                if first == b'}' || first == b',' {
                    return Err(self.error(ParseErrorKind::InvalidObject));
                }
                let value = self.parse_value_from(first)?;
                // A repeated key replaces the earlier value.
                object.insert(key, value);
                match self.next_non_whitespace()? {
                    b',' => {}
                    b'}' => break,
                    _ => return Err(self.error(ParseErrorKind::InvalidObject)),
                }
                b = self.next_non_whitespace()?;
            }
        }
        self.leave();
        Ok(Value::Object(object))
    }

    // The opening `[` has been consumed.
    fn parse_array(&mut self) -> Result<Value> {
        self.enter()?;
        let mut array = Array::new();
        let mut b = self.next_non_whitespace()?;
        if b != b']' {
            loop {
                if b == b',' || b == b']' {
                    return Err(self.error(ParseErrorKind::InvalidArray));
                }
                array.push(self.parse_value_from(b)?);
                match self.next_non_whitespace()? {
                    b',' => {}
                    b']' => break,
                    _ => return Err(self.error(ParseErrorKind::InvalidArray)),
                }
                b = self.next_non_whitespace()?;
            }
        }
        self.leave();
        Ok(Value::Array(array))
    }

    // The opening quote has been consumed. Raw bytes are copied through and
    // escapes are decoded to UTF-8; the result must be valid UTF-8 either way.
    fn parse_string(&mut self) -> Result<String> {
        let mut bytes = Vec::new();
        loop {
            match self.next()? {
                b'"' => {
                    return String::from_utf8(bytes)
                        .map_err(|_| self.error(ParseErrorKind::InvalidUnicode))
                }
                b'\\' => self.parse_escape(&mut bytes)?,
                b if b < 0x20 => return Err(self.error(ParseErrorKind::ControlCharacter)),
                b => bytes.push(b),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let b = match self.next()? {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                let ch = self.parse_unicode_escape()?;
                let mut buf = [0; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                return Ok(());
            }
            _ => return Err(self.error(ParseErrorKind::InvalidEscape)),
        };
        out.push(b);
        Ok(())
    }

    fn parse_hex4(&mut self) -> Result<u32> {
        let mut unit = 0;
        for _ in 0..4 {
            let b = self.next()?;
            let digit = (b as char)
                .to_digit(16)
                .ok_or_else(|| self.error(ParseErrorKind::InvalidUnicode))?;
            unit = (unit << 4) | digit;
        }
        Ok(unit)
    }

    // The `\u` has been consumed.
    fn parse_unicode_escape(&mut self) -> Result<char> {
        let unit = self.parse_hex4()?;
        let code = match unit {
            0xD800..=0xDBFF => {
                if self.next()? != b'\\' || self.next()? != b'u' {
                    return Err(self.error(ParseErrorKind::InvalidUnicodeSurrogate));
                }
                let low = self.parse_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.error(ParseErrorKind::InvalidUnicodeSurrogate));
                }
                0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => return Err(self.error(ParseErrorKind::InvalidUnicodeSurrogate)),
            _ => unit,
        };
        std::char::from_u32(code).ok_or_else(|| self.error(ParseErrorKind::InvalidUnicode))
    }

    fn read_digits(&mut self, text: &mut String, mut b: Option<u8>) -> Result<Option<u8>> {
        while let Some(d @ b'0'..=b'9') = b {
            text.push(d as char);
            b = self.bump()?;
        }
        Ok(b)
    }

    // At least one digit must follow; end of input here is `Incomplete`.
    fn require_digit(&self, b: Option<u8>) -> Result<()> {
        match b {
            Some(b'0'..=b'9') => Ok(()),
            Some(_) => Err(self.error(ParseErrorKind::InvalidNumber)),
            None => Err(self.error(ParseErrorKind::Incomplete)),
        }
    }

    fn parse_number(&mut self, first: u8) -> Result<f64> {
        let mut text = String::new();
        let mut b = Some(first);
        if b == Some(b'-') {
            text.push('-');
            b = self.bump()?;
        }
        self.require_digit(b)?;
        if b == Some(b'0') {
            text.push('0');
            b = self.bump()?;
            if let Some(b'0'..=b'9') = b {
                return Err(self.error(ParseErrorKind::InvalidNumber));
            }
        } else {
            b = self.read_digits(&mut text, b)?;
        }
        if b == Some(b'.') {
            text.push('.');
            b = self.bump()?;
            self.require_digit(b)?;
            b = self.read_digits(&mut text, b)?;
        }
        if let Some(b'e') | Some(b'E') = b {
            text.push('e');
            b = self.bump()?;
            if let Some(sign @ b'+') | Some(sign @ b'-') = b {
                text.push(sign as char);
                b = self.bump()?;
            }
            self.require_digit(b)?;
            b = self.read_digits(&mut text, b)?;
        }
        // The byte that ended the number belongs to whatever follows.
        if b.is_some() {
            self.source.pushback();
        }
        let n: f64 = text
            .parse()
            .map_err(|_| self.error(ParseErrorKind::InvalidNumber))?;
        if n.is_infinite() {
            return Err(self.error(ParseErrorKind::NumberOutOfRange));
        }
        Ok(n)
    }

    fn parse_constant(&mut self, first: u8) -> Result<Value> {
        let (word, value): (&[u8], Value) = match first {
            b't' => (&b"true"[..], Value::Boolean(true)),
            b'f' => (&b"false"[..], Value::Boolean(false)),
            _ => (&b"null"[..], Value::Null),
        };
        for &expected in &word[1..] {
            if self.next()? != expected {
                return Err(self.error(ParseErrorKind::InvalidConstant));
            }
        }
        Ok(value)
    }
}

pub fn parse(text: &str) -> Result<Value> {
    parse_bytes(text.as_bytes())
}

pub fn parse_bytes(input: &[u8]) -> Result<Value> {
    Parser::new(StrSource::new(input)).parse()
}

pub fn parse_with_options(text: &str, options: ParseOptions) -> Result<Value> {
    Parser::with_options(StrSource::from(text), options).parse()
}

pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Value> {
    parse_file_with_options(path, ParseOptions::default())
}

pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Value> {
    let path = path.as_ref();
    debug!("parsing {}", path.display());
    Parser::with_options(FileSource::open(path)?, options).parse()
}
