//! Path-tracking reads over a `serde_json::Value` tree.
//!
//! `Node` pairs a value with its dotted path so every failed read turns into
//! a `ConfigError` that names exactly where the document went wrong.

use serde_json::{Map, Value};

use super::error::ConfigError;

#[derive(Clone, Debug)]
pub(crate) struct Node<'a> {
    value: &'a Value,
    path: String,
}

/// Name of a JSON value's type, for mismatch messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<'a> Node<'a> {
    pub(crate) fn root(value: &'a Value) -> Self {
        Self {
            value,
            path: String::new(),
        }
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    fn mismatch(&self, expected: &'static str) -> ConfigError {
        ConfigError::TypeMismatch {
            path: self.path.clone(),
            expected,
            found: type_name(self.value),
        }
    }

    /// Required member `key`; `null` counts as missing.
    pub(crate) fn field(&self, key: &str) -> Result<Node<'a>, ConfigError> {
        self.optional(key)?.ok_or_else(|| ConfigError::MissingField {
            path: self.child_path(key),
        })
    }

    /// Optional member `key`; `null` counts as absent.
    pub(crate) fn optional(&self, key: &str) -> Result<Option<Node<'a>>, ConfigError> {
        let object = self.as_object()?;
        Ok(object.get(key).filter(|v| !v.is_null()).map(|value| Node {
            value,
            path: self.child_path(key),
        }))
    }

    /// Members of an object, in document order.
    pub(crate) fn entries(&self) -> Result<Vec<(&'a str, Node<'a>)>, ConfigError> {
        Ok(self
            .as_object()?
            .iter()
            .map(|(key, value)| {
                (
                    key.as_str(),
                    Node {
                        value,
                        path: self.child_path(key),
                    },
                )
            })
            .collect())
    }

    /// Elements of an array.
    pub(crate) fn elements(&self) -> Result<Vec<Node<'a>>, ConfigError> {
        Ok(self
            .as_array()?
            .iter()
            .enumerate()
            .map(|(index, value)| Node {
                value,
                path: format!("{}[{index}]", self.path),
            })
            .collect())
    }

    pub(crate) fn as_object(&self) -> Result<&'a Map<String, Value>, ConfigError> {
        self.value.as_object().ok_or_else(|| self.mismatch("object"))
    }

    pub(crate) fn as_array(&self) -> Result<&'a [Value], ConfigError> {
        self.value
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| self.mismatch("array"))
    }

    pub(crate) fn as_str(&self) -> Result<&'a str, ConfigError> {
        self.value.as_str().ok_or_else(|| self.mismatch("string"))
    }

    pub(crate) fn as_i64(&self) -> Result<i64, ConfigError> {
        self.value.as_i64().ok_or_else(|| self.mismatch("integer"))
    }

    /// Integer `>= 1` that fits in `u32`.
    pub(crate) fn as_positive(&self) -> Result<u32, ConfigError> {
        let raw = self.as_i64()?;
        match u32::try_from(raw) {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::invalid(
                &self.path,
                format!("expected a positive integer, got {raw}"),
            )),
        }
    }

    /// Integer `>= 0` that fits in `u32`.
    pub(crate) fn as_non_negative(&self) -> Result<u32, ConfigError> {
        let raw = self.as_i64()?;
        u32::try_from(raw).map_err(|_| {
            ConfigError::invalid(
                &self.path,
                format!("expected a non-negative integer, got {raw}"),
            )
        })
    }

    /// Integer that fits in `i32`.
    pub(crate) fn as_i32(&self) -> Result<i32, ConfigError> {
        let raw = self.as_i64()?;
        i32::try_from(raw)
            .map_err(|_| ConfigError::invalid(&self.path, format!("{raw} is out of range")))
    }

    /// A string naming one variant of an enumeration.
    pub(crate) fn as_enum<T>(
        &self,
        what: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T, ConfigError> {
        let raw = self.as_str()?;
        parse(raw).ok_or_else(|| ConfigError::invalid(&self.path, format!("unknown {what} `{raw}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_field_reports_path() {
        let doc = json!({ "characters": { "cafe": { "max_hp": 15 } } });
        let cafe = Node::root(&doc).field("characters").unwrap().field("cafe").unwrap();

        let err = cafe.field("skills").unwrap_err();
        assert_eq!(err.kind(), "missing_field");
        assert_eq!(err.path(), Some("characters.cafe.skills"));
    }

    #[test]
    fn test_null_counts_as_missing() {
        let doc = json!({ "max_hp": null });
        let root = Node::root(&doc);
        assert!(matches!(root.field("max_hp"), Err(ConfigError::MissingField { .. })));
        assert!(root.optional("max_hp").unwrap().is_none());
    }

    #[test]
    fn test_type_mismatch() {
        let doc = json!({ "max_hp": "fifteen" });
        let err = Node::root(&doc).field("max_hp").unwrap().as_i64().unwrap_err();
        match err {
            ConfigError::TypeMismatch { path, expected, found } => {
                assert_eq!(path, "max_hp");
                assert_eq!(expected, "integer");
                assert_eq!(found, "string");
            }
            other => panic!("Expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_field_on_non_object() {
        let doc = json!([1, 2]);
        let err = Node::root(&doc).field("max_hp").unwrap_err();
        assert_eq!(err.kind(), "type_mismatch");
    }

    #[test]
    fn test_elements_paths() {
        let doc = json!({ "skills": [ {}, {} ] });
        let skills = Node::root(&doc).field("skills").unwrap().elements().unwrap();
        assert_eq!(skills[1].path(), "skills[1]");
    }

    #[test]
    fn test_positive_and_non_negative() {
        let doc = json!({ "zero": 0, "negative": -1, "three": 3 });
        let root = Node::root(&doc);

        assert!(root.field("zero").unwrap().as_positive().is_err());
        assert_eq!(root.field("zero").unwrap().as_non_negative().unwrap(), 0);
        assert!(root.field("negative").unwrap().as_non_negative().is_err());
        assert_eq!(root.field("three").unwrap().as_positive().unwrap(), 3);
    }

    #[test]
    fn test_as_enum() {
        let doc = json!({ "trigger": "on_heal" });
        let err = Node::root(&doc)
            .field("trigger")
            .unwrap()
            .as_enum("trigger", |raw| (raw == "take_damage").then_some(()))
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_value");
        assert!(err.to_string().contains("on_heal"));
    }
}
