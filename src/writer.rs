use crate::value::{Object, Value};
use log::debug;
use std::borrow::Cow;
use thiserror::Error;

/// Widest indentation `dump` will produce.
pub const MAX_INDENT: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error("string is not valid UTF-8")]
    InvalidUnicode,
    #[error("number {0} cannot be represented in JSON")]
    NonFiniteNumber(String),
}

pub struct Writer {
    indent: usize,
    depth: usize,
    buf: String,
    // Replace bad UTF-8 and non-finite numbers instead of failing.
    lossy: bool,
}

impl Writer {
    /// `indent` 0 writes compact output; larger values are capped at
    /// [`MAX_INDENT`].
    pub fn new(indent: usize) -> Self {
        Self {
            indent: indent.min(MAX_INDENT),
            depth: 0,
            buf: String::new(),
            lossy: false,
        }
    }

    /// Like [`Writer::new`], but never fails: malformed UTF-8 becomes
    /// U+FFFD and NaN or infinite numbers become `null`.
    pub fn lossy(indent: usize) -> Self {
        Self {
            lossy: true,
            ..Self::new(indent)
        }
    }

    fn pretty(&self) -> bool {
        self.indent > 0
    }

    fn newline(&mut self) {
        if self.pretty() {
            self.buf.push('\n');
            for _ in 0..self.indent * self.depth {
                self.buf.push(' ');
            }
        }
    }

    fn write_string(&mut self, bytes: &[u8]) -> Result<(), WriteError> {
        let s = match std::str::from_utf8(bytes) {
            Ok(s) => Cow::Borrowed(s),
            Err(_) if self.lossy => String::from_utf8_lossy(bytes),
            Err(_) => return Err(WriteError::InvalidUnicode),
        };
        self.buf.push('"');
        for ch in s.chars() {
            match ch {
                '"' => self.buf.push_str("\\\""),
                '\\' => self.buf.push_str("\\\\"),
                '\u{8}' => self.buf.push_str("\\b"),
                '\u{c}' => self.buf.push_str("\\f"),
                '\n' => self.buf.push_str("\\n"),
                '\r' => self.buf.push_str("\\r"),
                '\t' => self.buf.push_str("\\t"),
                ' '..='\u{7e}' => self.buf.push(ch),
                _ => {
                    // Everything else, non-ASCII included, goes out as UTF-16
                    // escapes; characters above U+FFFF become a surrogate pair.
                    let mut units = [0; 2];
                    for unit in ch.encode_utf16(&mut units) {
                        self.buf.push_str(&format!("\\u{:04X}", unit));
                    }
                }
            }
        }
        self.buf.push('"');
        Ok(())
    }

    // Plain decimal in [1e-7, 1e21), exponent form outside it so that
    // 1e300 does not turn into three hundred digits.
    fn write_number(&mut self, n: f64) -> Result<(), WriteError> {
        if !n.is_finite() {
            if self.lossy {
                self.buf.push_str("null");
                return Ok(());
            }
            return Err(WriteError::NonFiniteNumber(n.to_string()));
        }
        let magnitude = n.abs();
        if magnitude != 0.0 && !(1e-7..1e21).contains(&magnitude) {
            self.buf.push_str(&format!("{:e}", n));
        } else {
            self.buf.push_str(&n.to_string());
        }
        Ok(())
    }

    fn write_object(&mut self, object: &Object) -> Result<(), WriteError> {
        if object.is_empty() {
            self.buf.push_str("{}");
            return Ok(());
        }
        self.buf.push('{');
        self.depth += 1;
        for (i, (key, value)) in object.iter().enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            self.newline();
            self.write_string(key.as_bytes())?;
            self.buf.push(':');
            self.write_value(value)?;
        }
        self.depth -= 1;
        self.newline();
        self.buf.push('}');
        Ok(())
    }

    fn write_array(&mut self, values: &[Value]) -> Result<(), WriteError> {
        if values.is_empty() {
            self.buf.push_str("[]");
            return Ok(());
        }
        self.buf.push('[');
        self.depth += 1;
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            self.newline();
            self.write_value(value)?;
        }
        self.depth -= 1;
        self.newline();
        self.buf.push(']');
        Ok(())
    }

    pub fn write_value(&mut self, v: &Value) -> Result<(), WriteError> {
        match v {
            Value::String(s) => self.write_string(s),
            Value::Number(n) => self.write_number(*n),
            Value::Object(o) => self.write_object(o),
            Value::Array(a) => self.write_array(a),
            Value::Boolean(true) => {
                self.buf.push_str("true");
                Ok(())
            }
            Value::Boolean(false) => {
                self.buf.push_str("false");
                Ok(())
            }
            Value::Null => {
                self.buf.push_str("null");
                Ok(())
            }
        }
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

/// Serializes `value`. With `indent` 0 the output is compact; otherwise every
/// member sits on its own line, indented `indent` spaces per level.
/// Object members come out in the map's iteration order.
pub fn dump(value: &Value, indent: usize) -> Result<String, WriteError> {
    let mut writer = Writer::new(indent);
    debug!(
        "dumping {} value, indent {}",
        value.type_name(),
        writer.indent
    );
    writer.write_value(value)?;
    Ok(writer.finish())
}

impl std::fmt::Display for Value {
    /// Compact JSON, written with [`Writer::lossy`].
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut writer = Writer::lossy(0);
        // A lossy writer has no failure path.
        if writer.write_value(self).is_err() {
            unreachable!("lossy writer failed");
        }
        f.write_str(&writer.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn format(text: &str, indent: usize) -> String {
        let v = parse(text).unwrap();
        dump(&v, indent).unwrap()
    }

    #[test]
    fn test_format_string() {
        #[rustfmt::skip]
        let tests = vec![
            (r#""abc""#, r#""abc""#),
            (r#""  a bc   def""#, r#""  a bc   def""#),
            (r#""a\/b""#, r#""a/b""#),
            (r#""\"\\\b\f\n\r\t""#, r#""\"\\\b\f\n\r\t""#),
            (r#""\u0001\u001f""#, r#""\u0001\u001F""#),
            (r#""\u00e9""#, r#""\u00E9""#),
            ("\"caf\u{e9}\"", r#""caf\u00E9""#),
            (r#""\uD83D\uDE00""#, r#""\uD83D\uDE00""#),
            (r#""\ud83d\ude00""#, r#""\uD83D\uDE00""#),
            (r#""\u007f""#, r#""\u007F""#),
        ];
        for (input, expected) in tests {
            assert_eq!(format(input, 0), String::from(expected));
        }
    }

    #[test]
    fn test_format_number() {
        #[rustfmt::skip]
        let tests = vec![
            ("123", "123"),
            ("-123.45", "-123.45"),
            ("0", "0"),
            ("-0", "-0"),
            ("1e3", "1000"),
            ("2.5E-3", "0.0025"),
            ("1e300", "1e300"),
            ("-1e300", "-1e300"),
            ("1e21", "1e21"),
            ("1e20", "100000000000000000000"),
            ("1.5e-8", "1.5e-8"),
            ("1e-7", "0.0000001"),
        ];
        for (input, expected) in tests {
            assert_eq!(format(input, 0), String::from(expected));
        }
    }

    #[test]
    fn test_format_constants() {
        assert_eq!(format("true", 2), "true");
        assert_eq!(format("false", 0), "false");
        assert_eq!(format(" null ", 4), "null");
    }

    #[test]
    fn test_format_compact() {
        #[rustfmt::skip]
        let tests = vec![
            ("{}", "{}"),
            ("[ ]", "[]"),
            (r#"{ "a" : 1 }"#, r#"{"a":1}"#),
            ("[1, 2 ,3]", "[1,2,3]"),
            (r#"[{"a": []}, {}, [[]]]"#, r#"[{"a":[]},{},[[]]]"#),
        ];
        for (input, expected) in tests {
            assert_eq!(format(input, 0), String::from(expected));
        }
    }

    #[test]
    fn test_format_object() {
        #[rustfmt::skip]
        let tests = vec![
            ("{}", "{}"),
            ("{    }", "{}"),
            (
                r#"{"a":1}"#,
"{
  \"a\":1
}",
            ),
            (
                r#"{"b":{"c":45}}"#,
r#"{
  "b":{
    "c":45
  }
}"#,
            ),
            (
                r#"{"a": {}}"#,
r#"{
  "a":{}
}"#,
            ),
            (
                r#"{"a": []}"#,
r#"{
  "a":[]
}"#,
            ),
        ];
        for (input, expected) in tests {
            assert_eq!(format(input, 2), String::from(expected));
        }
    }

    #[test]
    fn test_format_array() {
        #[rustfmt::skip]
        let tests = vec![
            ("[]", "[]"),
            ("[    ]", "[]"),
            (
                "[123]",
r#"[
    123
]"#,
            ),
            (
                "[1,23,4]",
r#"[
    1,
    23,
    4
]"#,
            ),
            (
                r#"[{"a": 1}, {"b": 23}]"#,
r#"[
    {
        "a":1
    },
    {
        "b":23
    }
]"#,
            ),
            (
                r#"[{"a": []}]"#,
r#"[
    {
        "a":[]
    }
]"#,
            ),
        ];
        for (input, expected) in tests {
            assert_eq!(format(input, 4), String::from(expected));
        }
    }

    #[test]
    fn test_indent_is_capped() {
        let expected = format!("[\n{}1\n]", " ".repeat(MAX_INDENT));
        assert_eq!(format("[1]", 100), expected);
    }

    #[test]
    fn test_object_member_order_is_not_fixed() {
        let v = parse(r#"{"a":1,"b":2}"#).unwrap();
        let text = dump(&v, 0).unwrap();
        assert!(text == r#"{"a":1,"b":2}"# || text == r#"{"b":2,"a":1}"#, "{}", text);
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let test = |bytes: Vec<u8>| {
            let v = Value::from(vec![Value::from_bytes(bytes)]);
            assert_eq!(dump(&v, 0), Err(WriteError::InvalidUnicode));
        };
        test(vec![0xff]);
        test(vec![b'a', 0xe4, 0xb8]);
        test(vec![0xf0, 0x9f, 0x98]);
        test(vec![0xc3]);
    }

    #[test]
    fn test_non_finite_number_is_rejected() {
        for n in [std::f64::NAN, std::f64::INFINITY, std::f64::NEG_INFINITY].iter() {
            let result = dump(&Value::from(*n), 2);
            assert!(matches!(result, Err(WriteError::NonFiniteNumber(_))));
        }
    }

    #[test]
    fn test_display() {
        let v = Value::from(vec![Value::from(1), Value::from("x"), Value::Null]);
        assert_eq!(v.to_string(), r#"[1,"x",null]"#);
    }

    #[test]
    fn test_display_is_lossy() {
        let v = Value::from(vec![
            Value::from_bytes(vec![b'a', 0xff]),
            Value::from(std::f64::NAN),
            Value::from(std::f64::INFINITY),
        ]);
        assert_eq!(v.to_string(), r#"["a\uFFFD",null,null]"#);
        assert_eq!(format!("{}", Value::from_bytes(vec![0xe4, 0xb8])), r#""\uFFFD""#);
    }
}
