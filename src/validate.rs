//! Shape checks for JSON documents before they are turned into typed records.
//!
//! Each check appends a human-readable entry to a [`Violations`] list instead of
//! stopping at the first problem, so a single error can describe everything
//! that is wrong with a document.

use serde_json::{Map, Value};

#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, problem: impl std::fmt::Display) {
        self.0.push(format!("`{}`: {}", field, problem));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Requires the document root to be an object.
    pub fn root<'a>(&mut self, value: &'a Value) -> Option<&'a Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            other => {
                self.push("<root>", mismatch("object", other));
                None
            }
        }
    }

    pub fn string(&mut self, obj: &Map<String, Value>, field: &str, required: bool) {
        match obj.get(field) {
            Some(Value::String(_)) => {}
            Some(other) => self.push(field, mismatch("string", other)),
            None if required => self.push(field, "required field is missing"),
            None => {}
        }
    }

    /// Checks `field` is an object whose values are all strings.
    pub fn string_map(&mut self, obj: &Map<String, Value>, field: &str, required: bool) {
        self.object_map(obj, field, required, |violations, path, entry| {
            if !entry.is_string() {
                violations.push(path, mismatch("string", entry));
            }
        });
    }

    /// Checks `field` is an object and runs `check` on every entry, passing
    /// the dotted path of the entry.
    pub fn object_map<F>(
        &mut self,
        obj: &Map<String, Value>,
        field: &str,
        required: bool,
        mut check: F,
    ) where
        F: FnMut(&mut Self, &str, &Value),
    {
        match obj.get(field) {
            Some(Value::Object(entries)) => {
                for (key, entry) in entries {
                    let path = format!("{}.{}", field, key);
                    check(self, &path, entry);
                }
            }
            Some(other) => self.push(field, mismatch("object", other)),
            None if required => self.push(field, "required field is missing"),
            None => {}
        }
    }
}

fn mismatch(expected: &str, found: &Value) -> String {
    format!("expected {}, found {}", expected, type_name(found))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_must_be_object() {
        let mut violations = Violations::new();
        assert!(violations.root(&json!([1, 2])).is_none());
        assert_eq!(
            violations.into_vec(),
            vec!["`<root>`: expected object, found array"]
        );
    }

    #[test]
    fn test_collects_every_violation() {
        let doc = json!({
            "name": 42,
            "deps": { "a": "1.0.0", "b": null }
        });
        let mut violations = Violations::new();
        let obj = violations.root(&doc).unwrap();

        violations.string(obj, "name", true);
        violations.string(obj, "version", true);
        violations.string_map(obj, "deps", true);
        violations.string_map(obj, "devDeps", false);

        assert_eq!(
            violations.into_vec(),
            vec![
                "`name`: expected string, found number",
                "`version`: required field is missing",
                "`deps.b`: expected string, found null",
            ]
        );
    }

    #[test]
    fn test_optional_field_present_with_wrong_type() {
        let doc = json!({ "devDeps": "nope" });
        let mut violations = Violations::new();
        let obj = violations.root(&doc).unwrap();
        violations.string_map(obj, "devDeps", false);

        assert!(!violations.is_empty());
        assert_eq!(
            violations.into_vec(),
            vec!["`devDeps`: expected object, found string"]
        );
    }
}
