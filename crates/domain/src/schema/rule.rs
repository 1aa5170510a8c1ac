//! Validation-rule cleaning.
//!
//! Schema documents may annotate rule properties with `optional` and
//! `default` hints. The store rejects those keywords, so they are removed at
//! every nesting depth before a rule is attached. `required` arrays are left
//! untouched.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::DomainError;

pub const DEFAULT_RULE_LEVEL: &str = "none";
pub const DEFAULT_RULE_MESSAGE: &str = "Document does not match schema";

const ANNOTATION_KEYS: [&str; 2] = ["optional", "default"];

/// Validation settings as attached to a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationSettings {
    pub rule: Value,
    pub level: String,
    pub message: String,
}

impl ValidationSettings {
    /// Build from a stored schema value.
    ///
    /// Accepts the store's `{rule, level, message}` envelope or a bare rule.
    /// Missing level and message fall back to the defaults.
    pub fn from_stored(stored: &Value) -> Result<Self, DomainError> {
        let (rule, level, message) = match stored.get("rule") {
            Some(rule) => (
                rule,
                non_empty_str(stored.get("level")),
                non_empty_str(stored.get("message")),
            ),
            None => (stored, None, None),
        };

        Ok(Self {
            rule: strip_annotations(rule)?,
            level: level.unwrap_or(DEFAULT_RULE_LEVEL).to_string(),
            message: message.unwrap_or(DEFAULT_RULE_MESSAGE).to_string(),
        })
    }

    pub fn to_value(&self) -> Value {
        json!(self)
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Remove `optional` / `default` hints from a rule and all nested properties.
pub fn strip_annotations(rule: &Value) -> Result<Value, DomainError> {
    let Value::Object(root) = rule else {
        return Err(DomainError::validation(
            "validation rule must be a JSON object",
        ));
    };

    let mut cleaned = root.clone();
    if let Some(properties) = root.get("properties") {
        cleaned.insert("properties".into(), clean_properties(properties)?);
    }
    Ok(Value::Object(cleaned))
}

fn clean_properties(properties: &Value) -> Result<Value, DomainError> {
    let props = match properties {
        Value::Object(props) => props,
        Value::Null => return Ok(Value::Null),
        other => {
            return Err(DomainError::validation(format!(
                "`properties` must be an object, got {other}"
            )))
        }
    };

    let mut cleaned = Map::with_capacity(props.len());
    for (name, spec) in props {
        cleaned.insert(name.clone(), clean_property(spec)?);
    }
    Ok(Value::Object(cleaned))
}

fn clean_property(spec: &Value) -> Result<Value, DomainError> {
    let Value::Object(fields) = spec else {
        return Ok(spec.clone());
    };

    let mut fields = fields.clone();
    for key in ANNOTATION_KEYS {
        fields.remove(key);
    }

    if let Some(nested) = fields.get("properties").cloned() {
        fields.insert("properties".into(), clean_properties(&nested)?);
    }

    if let Some(Value::Object(items)) = fields.get_mut("items") {
        if let Some(nested) = items.get("properties").cloned() {
            items.insert("properties".into(), clean_properties(&nested)?);
        }
    }

    Ok(Value::Object(fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_annotations_at_every_depth_and_keeps_required() {
        let rule = json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "default": ""},
                "address": {
                    "type": "object",
                    "properties": {
                        "zip": {"type": "string", "optional": true},
                        "city": {"type": "string"}
                    },
                    "required": ["city"]
                },
                "tags": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {"label": {"type": "string", "optional": true, "default": "x"}},
                        "required": ["label"]
                    }
                }
            },
            "required": ["name", "address"]
        });

        let cleaned = strip_annotations(&rule).unwrap();
        let text = cleaned.to_string();

        assert!(!text.contains("optional"));
        assert!(!text.contains("default"));
        assert_eq!(cleaned["required"], json!(["name", "address"]));
        assert_eq!(cleaned["properties"]["address"]["required"], json!(["city"]));
        assert_eq!(
            cleaned["properties"]["tags"]["items"]["required"],
            json!(["label"])
        );
        assert_eq!(
            cleaned["properties"]["address"]["properties"]["zip"],
            json!({"type": "string"})
        );
    }

    #[test]
    fn source_rule_is_not_modified() {
        let rule = json!({"properties": {"a": {"type": "number", "optional": true}}});
        let _ = strip_annotations(&rule).unwrap();
        assert_eq!(rule["properties"]["a"]["optional"], true);
    }

    #[test]
    fn rejects_non_object_rule() {
        assert!(strip_annotations(&json!("not a rule")).is_err());
        assert!(strip_annotations(&json!({"properties": [1, 2]})).is_err());
    }

    #[test]
    fn settings_default_level_and_message() {
        let stored = json!({"rule": {"type": "object"}});
        let settings = ValidationSettings::from_stored(&stored).unwrap();
        assert_eq!(settings.level, DEFAULT_RULE_LEVEL);
        assert_eq!(settings.message, DEFAULT_RULE_MESSAGE);

        let stored = json!({"rule": {"type": "object"}, "level": "strict", "message": "bad"});
        let settings = ValidationSettings::from_stored(&stored).unwrap();
        assert_eq!(settings.to_value()["level"], "strict");
        assert_eq!(settings.to_value()["message"], "bad");
    }

    #[test]
    fn bare_rule_is_wrapped() {
        let stored = json!({"type": "object", "properties": {}});
        let settings = ValidationSettings::from_stored(&stored).unwrap();
        assert_eq!(settings.rule, stored);
    }
}
