//! Name-indexed access into decoded object graphs.
//!
//! MonoBehaviours are decoded without a compile-time schema, so every field
//! lookup can fail. [`FieldNode`] carries the path it was reached by, and each
//! accessor reports a [`FieldError`] naming that path.

use serde_json::Value;

use crate::error::FieldError;

/// Name of the field Unity uses to wrap the elements of a `vector`.
pub const ARRAY_FIELD: &str = "Array";

#[derive(Debug, Clone)]
pub struct FieldNode<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> FieldNode<'a> {
    pub fn root(value: &'a Value, name: impl Into<String>) -> Self {
        FieldNode {
            value,
            path: name.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn field(&self, name: &str) -> Result<FieldNode<'a>, FieldError> {
        let path = format!("{}.{}", self.path, name);
        match self.value {
            Value::Object(map) => match map.get(name) {
                Some(value) => Ok(FieldNode { value, path }),
                None => Err(FieldError::Missing { path }),
            },
            other => Err(FieldError::UnexpectedShape {
                path: self.path.clone(),
                expected: "an object",
                found: kind(other),
            }),
        }
    }

    /// Structural children: the values of an object in field order, or the
    /// elements of a sequence.
    pub fn children(&self) -> Result<Vec<FieldNode<'a>>, FieldError> {
        match self.value {
            Value::Object(map) => Ok(map
                .iter()
                .map(|(name, value)| FieldNode {
                    value,
                    path: format!("{}.{}", self.path, name),
                })
                .collect()),
            Value::Array(_) => self.elements(),
            other => Err(FieldError::UnexpectedShape {
                path: self.path.clone(),
                expected: "an object or array",
                found: kind(other),
            }),
        }
    }

    /// Elements of an array-shaped node. Accepts both a bare sequence and the
    /// `{ "Array": [...] }` wrapper.
    pub fn elements(&self) -> Result<Vec<FieldNode<'a>>, FieldError> {
        let (items, path) = self.sequence()?;
        Ok(items
            .iter()
            .enumerate()
            .map(|(i, value)| FieldNode {
                value,
                path: format!("{path}[{i}]"),
            })
            .collect())
    }

    pub fn index(&self, index: usize) -> Result<FieldNode<'a>, FieldError> {
        let (items, path) = self.sequence()?;
        match items.get(index) {
            Some(value) => Ok(FieldNode {
                value,
                path: format!("{path}[{index}]"),
            }),
            None => Err(FieldError::OutOfRange {
                path: self.path.clone(),
                index,
                len: items.len(),
            }),
        }
    }

    /// The items of the sequence and the path they are indexed under.
    fn sequence(&self) -> Result<(&'a [Value], String), FieldError> {
        match self.value {
            Value::Array(items) => Ok((items.as_slice(), self.path.clone())),
            Value::Object(map) if map.contains_key(ARRAY_FIELD) => {
                self.field(ARRAY_FIELD)?.sequence()
            }
            other => Err(FieldError::UnexpectedShape {
                path: self.path.clone(),
                expected: "an array",
                found: kind(other),
            }),
        }
    }

    pub fn as_str(&self) -> Result<&'a str, FieldError> {
        self.value.as_str().ok_or_else(|| self.shape_error("a string"))
    }

    pub fn as_i64(&self) -> Result<i64, FieldError> {
        self.value.as_i64().ok_or_else(|| self.shape_error("an integer"))
    }

    pub fn as_i32(&self) -> Result<i32, FieldError> {
        self.as_i64()
            .and_then(|value| i32::try_from(value).map_err(|_| self.shape_error("a 32-bit integer")))
    }

    pub fn as_f64(&self) -> Result<f64, FieldError> {
        self.value.as_f64().ok_or_else(|| self.shape_error("a number"))
    }

    fn shape_error(&self, expected: &'static str) -> FieldError {
        FieldError::UnexpectedShape {
            path: self.path.clone(),
            expected,
            found: kind(self.value),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(n) if n.is_f64() => "a float",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
