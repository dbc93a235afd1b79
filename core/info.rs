//! The unit of context every collector produces.
//!
//! A record renders as one tagged block in the final prompt:
//!
//! ```text
//! <file name="src/main.rs">
//! fn main() {}
//! </file>
//! ```

use crate::error::{AppError, Result};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatheredInformation {
    pub tag: String,
    pub attrs: IndexMap<String, String>,
    pub content: String,
}

impl GatheredInformation {
    pub fn new(tag: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: IndexMap::new(),
            content: content.into(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Validates an untyped value produced outside the crate (user functions,
    /// external commands) and converts it into a record.
    ///
    /// The value must be an object with a non-empty string `tag`, an `attrs`
    /// object whose values are all strings, and a string `content`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| shape_error(format!("expected an object, got {}", kind_of(value))))?;

        let tag = match obj.get("tag") {
            Some(Value::String(tag)) if !tag.is_empty() => tag.clone(),
            Some(Value::String(_)) => return Err(shape_error("'tag' must not be empty")),
            Some(other) => {
                return Err(shape_error(format!(
                    "'tag' must be a string, got {}",
                    kind_of(other)
                )));
            }
            None => return Err(shape_error("missing 'tag'")),
        };

        let attrs = match obj.get("attrs") {
            Some(Value::Object(map)) => {
                let mut attrs = IndexMap::with_capacity(map.len());
                for (key, attr_value) in map {
                    match attr_value {
                        Value::String(s) => {
                            attrs.insert(key.clone(), s.clone());
                        }
                        other => {
                            return Err(shape_error(format!(
                                "attribute '{}' of <{}> must be a string, got {}",
                                key,
                                tag,
                                kind_of(other)
                            )));
                        }
                    }
                }
                attrs
            }
            Some(other) => {
                return Err(shape_error(format!(
                    "'attrs' must be an object, got {}",
                    kind_of(other)
                )));
            }
            None => return Err(shape_error(format!("<{}> is missing 'attrs'", tag))),
        };

        let content = match obj.get("content") {
            Some(Value::String(content)) => content.clone(),
            Some(other) => {
                return Err(shape_error(format!(
                    "'content' of <{}> must be a string, got {}",
                    tag,
                    kind_of(other)
                )));
            }
            None => return Err(shape_error(format!("<{}> is missing 'content'", tag))),
        };

        Ok(Self {
            tag,
            attrs,
            content,
        })
    }

    /// Validates a whole producer result: it must be an array of records.
    pub fn list_from_value(value: &Value) -> Result<Vec<Self>> {
        let items = value.as_array().ok_or_else(|| {
            AppError::InvalidGatherResult(format!("expected an array, got {}", kind_of(value)))
        })?;
        items.iter().map(Self::from_value).collect()
    }
}

fn shape_error(reason: impl Into<String>) -> AppError {
    AppError::InvalidGatherResult(reason.into())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
