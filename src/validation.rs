use axum::{extract::rejection::JsonRejection, Json};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::shared::AppError;

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const REQUIRED: &str = "This field is required.";
pub const NULL: &str = "This field may not be null.";
pub const INVALID_BOOLEAN: &str = "Must be a valid boolean.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const INVALID_STRING: &str = "Not a valid string.";
pub const BLANK: &str = "This field may not be blank.";

/// Field name -> error messages, serialized as a plain JSON object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an error set holding a single message for one field
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Folds in the rule failures reported by a `#[derive(Validate)]` form
    pub fn extend_from(&mut self, result: Result<(), validator::ValidationErrors>) {
        let Err(errors) = result else {
            return;
        };
        for (field, failures) in errors.field_errors() {
            for failure in failures {
                let message = match &failure.message {
                    Some(message) => message.to_string(),
                    None => failure.code.to_string(),
                };
                self.add(&field, message);
            }
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Unwraps an axum JSON body into an object, reporting parse failures as
/// validation errors instead of axum's default rejection responses
pub fn json_object(payload: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, AppError> {
    let Json(value) = payload.map_err(|rejection| {
        AppError::Validation(ValidationErrors::single(
            NON_FIELD_ERRORS,
            format!("JSON parse error - {}", rejection.body_text()),
        ))
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Validation(ValidationErrors::single(
            NON_FIELD_ERRORS,
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type_name(&other)
            ),
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Reads a required JSON boolean
pub fn required_bool(
    data: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<bool> {
    match data.get(field) {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(Value::Null) => {
            errors.add(field, NULL);
            None
        }
        Some(Value::Bool(value)) => Some(*value),
        Some(_) => {
            errors.add(field, INVALID_BOOLEAN);
            None
        }
    }
}

/// Reads an optional JSON boolean, falling back to `default` when absent
pub fn optional_bool(
    data: &Map<String, Value>,
    field: &str,
    default: bool,
    errors: &mut ValidationErrors,
) -> bool {
    match data.get(field) {
        None | Some(Value::Null) => default,
        Some(Value::Bool(value)) => *value,
        Some(_) => {
            errors.add(field, INVALID_BOOLEAN);
            default
        }
    }
}

/// Reads a required JSON integer that fits in an i32
pub fn required_integer(
    data: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<i32> {
    match data.get(field) {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(Value::Null) => {
            errors.add(field, NULL);
            None
        }
        Some(Value::Number(number)) => match number.as_i64().and_then(|n| i32::try_from(n).ok()) {
            Some(value) => Some(value),
            None => {
                errors.add(field, INVALID_INTEGER);
                None
            }
        },
        Some(_) => {
            errors.add(field, INVALID_INTEGER);
            None
        }
    }
}

/// Reads a required JSON string; `allow_blank` controls whether an empty
/// or whitespace-only string is accepted
pub fn required_string(
    data: &Map<String, Value>,
    field: &str,
    allow_blank: bool,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match data.get(field) {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(Value::Null) => {
            errors.add(field, NULL);
            None
        }
        Some(Value::String(value)) => {
            if !allow_blank && value.trim().is_empty() {
                errors.add(field, BLANK);
                None
            } else {
                Some(value.clone())
            }
        }
        Some(_) => {
            errors.add(field, INVALID_STRING);
            None
        }
    }
}

/// Reads an optional JSON string; absent, null and empty all map to `None`
pub fn optional_string(
    data: &Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match data.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) if value.is_empty() => None,
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            errors.add(field, INVALID_STRING);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("Expected JSON object"),
        }
    }

    #[test]
    fn test_errors_serialize_as_field_map() {
        let mut errors = ValidationErrors::new();
        errors.add("votes_to_skip", REQUIRED);
        errors.add("votes_to_skip", "second");
        errors.add("guest_can_pause", INVALID_BOOLEAN);

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            json!({
                "guest_can_pause": [INVALID_BOOLEAN],
                "votes_to_skip": [REQUIRED, "second"],
            })
        );
    }

    #[derive(validator::Validate)]
    struct VotesForm {
        #[validate(range(min = 1, message = "too few"))]
        votes: Option<i32>,
    }

    #[test]
    fn test_extend_from_validator_errors() {
        use validator::Validate;

        let mut errors = ValidationErrors::single("votes", REQUIRED);
        errors.extend_from(VotesForm { votes: Some(0) }.validate());
        assert_eq!(
            errors.get("votes"),
            Some(&vec![REQUIRED.to_string(), "too few".to_string()])
        );

        let mut errors = ValidationErrors::new();
        errors.extend_from(VotesForm { votes: None }.validate());
        errors.extend_from(VotesForm { votes: Some(3) }.validate());
        assert!(errors.is_empty());
    }

    #[rstest]
    #[case(json!({"flag": true}), Some(true), None)]
    #[case(json!({"flag": false}), Some(false), None)]
    #[case(json!({}), None, Some(REQUIRED))]
    #[case(json!({"flag": null}), None, Some(NULL))]
    #[case(json!({"flag": "yes"}), None, Some(INVALID_BOOLEAN))]
    #[case(json!({"flag": 1}), None, Some(INVALID_BOOLEAN))]
    fn test_required_bool(
        #[case] data: Value,
        #[case] expected: Option<bool>,
        #[case] error: Option<&str>,
    ) {
        let mut errors = ValidationErrors::new();
        let value = required_bool(&object(data), "flag", &mut errors);

        assert_eq!(value, expected);
        assert_eq!(errors.get("flag").map(|e| e[0].as_str()), error);
    }

    #[rstest]
    #[case(json!({"n": 3}), Some(3), None)]
    #[case(json!({"n": -4}), Some(-4), None)]
    #[case(json!({}), None, Some(REQUIRED))]
    #[case(json!({"n": null}), None, Some(NULL))]
    #[case(json!({"n": 2.5}), None, Some(INVALID_INTEGER))]
    #[case(json!({"n": "3"}), None, Some(INVALID_INTEGER))]
    #[case(json!({"n": 10_000_000_000_i64}), None, Some(INVALID_INTEGER))]
    fn test_required_integer(
        #[case] data: Value,
        #[case] expected: Option<i32>,
        #[case] error: Option<&str>,
    ) {
        let mut errors = ValidationErrors::new();
        let value = required_integer(&object(data), "n", &mut errors);

        assert_eq!(value, expected);
        assert_eq!(errors.get("n").map(|e| e[0].as_str()), error);
    }

    #[rstest]
    #[case(json!({"s": "hello"}), true, Some("hello"), None)]
    #[case(json!({"s": ""}), true, Some(""), None)]
    #[case(json!({"s": "  "}), false, None, Some(BLANK))]
    #[case(json!({"s": 12}), true, None, Some(INVALID_STRING))]
    #[case(json!({}), true, None, Some(REQUIRED))]
    #[case(json!({"s": null}), true, None, Some(NULL))]
    fn test_required_string(
        #[case] data: Value,
        #[case] allow_blank: bool,
        #[case] expected: Option<&str>,
        #[case] error: Option<&str>,
    ) {
        let mut errors = ValidationErrors::new();
        let value = required_string(&object(data), "s", allow_blank, &mut errors);

        assert_eq!(value.as_deref(), expected);
        assert_eq!(errors.get("s").map(|e| e[0].as_str()), error);
    }

    #[test]
    fn test_optional_fields_default_when_absent() {
        let mut errors = ValidationErrors::new();
        let data = object(json!({"description": ""}));

        assert!(!optional_bool(&data, "featured", false, &mut errors));
        assert_eq!(optional_string(&data, "description", &mut errors), None);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_json_object_rejects_non_objects() {
        let result = json_object(Ok(Json(json!([1, 2, 3]))));

        match result {
            Err(AppError::Validation(errors)) => {
                let messages = errors.get(NON_FIELD_ERRORS).unwrap();
                assert!(messages[0].contains("got list"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }
}
