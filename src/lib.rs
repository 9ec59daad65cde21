//! A small JSON codec: [`parse`] text into a [`Value`] tree and [`dump`] it
//! back out, compact or indented.
//!
//! ```
//! let v = jsonlite::parse(r#"{"a": [1, 2.5, "x"]}"#).unwrap();
//! assert_eq!(v["a"][1].as_number(), 2.5);
//! assert_eq!(jsonlite::dump(&v, 0).unwrap(), r#"{"a":[1,2.5,"x"]}"#);
//! ```

pub mod parser;
pub mod source;
pub mod value;
pub mod writer;

pub use parser::{
    parse, parse_bytes, parse_file, parse_file_with_options, parse_with_options, ParseError,
    ParseErrorKind, ParseOptions, Parser,
};
pub use source::{FileSource, Position, ReaderSource, Source, StrSource};
pub use value::{Array, Object, Value, ValueError, ValueIndex, ValueType};
pub use writer::{dump, WriteError, Writer, MAX_INDENT};
