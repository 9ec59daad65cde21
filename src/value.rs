use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use thiserror::Error;

pub type Object = HashMap<String, Value>;
pub type Array = Vec<Value>;

static NULL: Value = Value::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Number,
    Object,
    Array,
    Boolean,
    Null,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Object => "object",
            ValueType::Array => "array",
            ValueType::Boolean => "boolean",
            ValueType::Null => "null",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure of a checked accessor (`Value::at`, `Value::at_mut`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("key `{0}` not found")]
    MissingKey(String),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ValueType,
        found: ValueType,
    },
}

/// One JSON datum.
///
/// Strings hold raw bytes that are expected to be UTF-8; the writer checks
/// them before serializing. Objects and arrays own their children, so a
/// tree never contains shared nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(Vec<u8>),
    Number(f64),
    Object(Object),
    Array(Array),
    Boolean(bool),
    Null,
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    pub fn object() -> Self {
        Value::Object(Object::new())
    }

    pub fn array() -> Self {
        Value::Array(Array::new())
    }

    /// Builds a string value from raw bytes without checking them.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Value::String(bytes)
    }

    pub fn kind(&self) -> ValueType {
        match self {
            Value::String(_) => ValueType::String,
            Value::Number(_) => ValueType::Number,
            Value::Object(_) => ValueType::Object,
            Value::Array(_) => ValueType::Array,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Null => ValueType::Null,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn mismatch(&self, expected: ValueType) -> ! {
        panic!(
            "type mismatch: expected {}, found {}",
            expected,
            self.kind()
        )
    }

    // Accessors below panic when the variant does not match: asking a number
    // for its string is a bug in the caller, not a data error.

    pub fn as_string(&self) -> &[u8] {
        match self {
            Value::String(s) => s,
            other => other.mismatch(ValueType::String),
        }
    }

    pub fn as_string_mut(&mut self) -> &mut Vec<u8> {
        match self {
            Value::String(s) => s,
            other => other.mismatch(ValueType::String),
        }
    }

    /// The string payload as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_string()).ok()
    }

    pub fn as_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            other => other.mismatch(ValueType::Number),
        }
    }

    pub fn as_boolean(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            other => other.mismatch(ValueType::Boolean),
        }
    }

    pub fn as_object(&self) -> &Object {
        match self {
            Value::Object(o) => o,
            other => other.mismatch(ValueType::Object),
        }
    }

    pub fn as_object_mut(&mut self) -> &mut Object {
        match self {
            Value::Object(o) => o,
            other => other.mismatch(ValueType::Object),
        }
    }

    pub fn as_array(&self) -> &Array {
        match self {
            Value::Array(a) => a,
            other => other.mismatch(ValueType::Array),
        }
    }

    pub fn as_array_mut(&mut self) -> &mut Array {
        match self {
            Value::Array(a) => a,
            other => other.mismatch(ValueType::Array),
        }
    }

    /// Number of members of an object or elements of an array.
    pub fn len(&self) -> usize {
        match self {
            Value::Object(o) => o.len(),
            Value::Array(a) => a.len(),
            other => other.mismatch(ValueType::Array),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces `self` with null and returns the previous value.
    pub fn take(&mut self) -> Value {
        std::mem::take(self)
    }

    /// Appends an element. A null receiver becomes an empty array first.
    pub fn append<T: Into<Value>>(&mut self, value: T) -> &mut Self {
        if self.is_null() {
            *self = Value::array();
        }
        self.as_array_mut().push(value.into());
        self
    }

    /// Inserts `value` under `key`, replacing any previous entry. A null
    /// receiver becomes an empty object first.
    pub fn insert<K: Into<String>, T: Into<Value>>(&mut self, key: K, value: T) -> Option<Value> {
        if self.is_null() {
            *self = Value::object();
        }
        self.as_object_mut().insert(key.into(), value.into())
    }

    /// Bounds- and type-checked access by array index or object key.
    pub fn at<I: ValueIndex>(&self, index: I) -> Result<&Value, ValueError> {
        index.index_into(self)
    }

    pub fn at_mut<I: ValueIndex>(&mut self, index: I) -> Result<&mut Value, ValueError> {
        index.index_into_mut(self)
    }
}

/// Something that can address a child of a [`Value`]: `usize` for arrays,
/// `&str` for objects.
pub trait ValueIndex {
    fn index_into<'v>(&self, v: &'v Value) -> Result<&'v Value, ValueError>;
    fn index_into_mut<'v>(&self, v: &'v mut Value) -> Result<&'v mut Value, ValueError>;
}

impl ValueIndex for usize {
    fn index_into<'v>(&self, v: &'v Value) -> Result<&'v Value, ValueError> {
        match v {
            Value::Array(a) => a.get(*self).ok_or(ValueError::IndexOutOfRange {
                index: *self,
                len: a.len(),
            }),
            other => Err(ValueError::TypeMismatch {
                expected: ValueType::Array,
                found: other.kind(),
            }),
        }
    }

    fn index_into_mut<'v>(&self, v: &'v mut Value) -> Result<&'v mut Value, ValueError> {
        match v {
            Value::Array(a) => {
                let len = a.len();
                a.get_mut(*self)
                    .ok_or(ValueError::IndexOutOfRange { index: *self, len })
            }
            other => Err(ValueError::TypeMismatch {
                expected: ValueType::Array,
                found: other.kind(),
            }),
        }
    }
}

impl ValueIndex for str {
    fn index_into<'v>(&self, v: &'v Value) -> Result<&'v Value, ValueError> {
        match v {
            Value::Object(o) => o
                .get(self)
                .ok_or_else(|| ValueError::MissingKey(self.to_string())),
            other => Err(ValueError::TypeMismatch {
                expected: ValueType::Object,
                found: other.kind(),
            }),
        }
    }

    fn index_into_mut<'v>(&self, v: &'v mut Value) -> Result<&'v mut Value, ValueError> {
        match v {
            Value::Object(o) => o
                .get_mut(self)
                .ok_or_else(|| ValueError::MissingKey(self.to_string())),
            other => Err(ValueError::TypeMismatch {
                expected: ValueType::Object,
                found: other.kind(),
            }),
        }
    }
}

impl ValueIndex for String {
    fn index_into<'v>(&self, v: &'v Value) -> Result<&'v Value, ValueError> {
        self.as_str().index_into(v)
    }

    fn index_into_mut<'v>(&self, v: &'v mut Value) -> Result<&'v mut Value, ValueError> {
        self.as_str().index_into_mut(v)
    }
}

impl<'a, T: ValueIndex + ?Sized> ValueIndex for &'a T {
    fn index_into<'v>(&self, v: &'v Value) -> Result<&'v Value, ValueError> {
        (**self).index_into(v)
    }

    fn index_into_mut<'v>(&self, v: &'v mut Value) -> Result<&'v mut Value, ValueError> {
        (**self).index_into_mut(v)
    }
}

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, i: usize) -> &Value {
        &self.as_array()[i]
    }
}

impl IndexMut<usize> for Value {
    fn index_mut(&mut self, i: usize) -> &mut Value {
        &mut self.as_array_mut()[i]
    }
}

impl Index<&str> for Value {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.as_object().get(key).unwrap_or(&NULL)
    }
}

impl IndexMut<&str> for Value {
    /// Returns the entry for `key`, creating a null entry if it is absent.
    /// A null receiver becomes an empty object first.
    fn index_mut(&mut self, key: &str) -> &mut Value {
        if self.is_null() {
            *self = Value::object();
        }
        self.as_object_mut()
            .entry(key.to_string())
            .or_insert(Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into_bytes())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

macro_rules! from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(list: [T; N]) -> Self {
        Value::from(Vec::from(list))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> std::iter::FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Value::Array(iter.into_iter().map(Into::into).collect())
    }
}
