//! Input schemas and parameter validation.
//!
//! Each tool declares an ordered list of named parameters with a primitive
//! type and a required flag. Validation walks the declaration in order and
//! reports the first mismatch, so error messages are reproducible for a
//! given schema.

use serde_json::{Map, Value, json};
use thiserror::Error;

/// Primitive parameter types a tool schema can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// A JSON number (integer or float).
    Number,
    /// A JSON string.
    String,
}

impl ParamType {
    /// The JSON-Schema type name for this parameter type.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
        }
    }

    /// Check whether a JSON value matches this type.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Number => value.is_number(),
            Self::String => value.is_string(),
        }
    }
}

/// Describe a JSON value's type for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A single named parameter in a tool's input schema.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    /// Parameter name as it appears in the request params object.
    pub name: String,

    /// Human-readable description shown in tool metadata.
    pub description: String,

    /// Declared primitive type.
    pub ty: ParamType,

    /// Whether the parameter must be present.
    pub required: bool,
}

/// Validation failure for a single parameter.
///
/// Carries the offending parameter name so callers (and calling agents) can
/// branch on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid parameter '{parameter}': {reason}")]
pub struct ValidationError {
    /// The parameter that failed validation.
    pub parameter: String,

    /// Why it failed.
    pub reason: String,
}

/// An ordered tool input schema.
///
/// Declaration order is preserved and drives validation order.
#[derive(Debug, Clone, Default)]
pub struct InputSchema {
    params: Vec<ParamSpec>,
}

impl InputSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required parameter.
    pub fn required(mut self, name: impl Into<String>, ty: ParamType, description: impl Into<String>) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            description: description.into(),
            ty,
            required: true,
        });
        self
    }

    /// Declare an optional parameter.
    pub fn optional(mut self, name: impl Into<String>, ty: ParamType, description: impl Into<String>) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            description: description.into(),
            ty,
            required: false,
        });
        self
    }

    /// The declared parameters, in declaration order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Validate request params against this schema.
    ///
    /// Checks, in declaration order, that every required parameter is present
    /// and that every present declared parameter matches its declared type.
    /// Undeclared extra parameters are ignored. On success the params are
    /// returned unchanged; no coercion is performed.
    pub fn validate(&self, params: Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
        for spec in &self.params {
            match params.get(&spec.name) {
                None => {
                    if spec.required {
                        return Err(ValidationError {
                            parameter: spec.name.clone(),
                            reason: "required parameter is missing".to_string(),
                        });
                    }
                }
                Some(value) => {
                    if !spec.ty.matches(value) {
                        return Err(ValidationError {
                            parameter: spec.name.clone(),
                            reason: format!(
                                "expected {}, got {}",
                                spec.ty.type_name(),
                                json_type_name(value)
                            ),
                        });
                    }
                }
            }
        }

        Ok(params)
    }

    /// Render the schema as a JSON-Schema object for tool metadata listings.
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for spec in &self.params {
            properties.insert(
                spec.name.clone(),
                json!({
                    "type": spec.ty.type_name(),
                    "description": spec.description,
                }),
            );
            if spec.required {
                required.push(Value::String(spec.name.clone()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> InputSchema {
        InputSchema::new()
            .required("amount", ParamType::Number, "The transaction amount")
            .required("jurisdiction", ParamType::String, "The tax jurisdiction")
            .optional("note", ParamType::String, "Free-form note")
    }

    fn params(json: &str) -> Map<String, Value> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_validate_happy_path_returns_input_unchanged() {
        let input = params(r#"{"amount": 100, "jurisdiction": "Texas"}"#);
        let validated = schema().validate(input.clone()).unwrap();
        assert_eq!(validated, input);
    }

    #[test]
    fn test_validate_missing_required_names_parameter() {
        let err = schema()
            .validate(params(r#"{"amount": 100}"#))
            .unwrap_err();
        assert_eq!(err.parameter, "jurisdiction");
        assert!(err.reason.contains("missing"));
    }

    #[test]
    fn test_validate_type_mismatch() {
        let err = schema()
            .validate(params(r#"{"amount": "100", "jurisdiction": "Texas"}"#))
            .unwrap_err();
        assert_eq!(err.parameter, "amount");
        assert_eq!(err.reason, "expected number, got string");
    }

    #[test]
    fn test_validate_reports_first_mismatch_in_declaration_order() {
        // Both params are wrong; "amount" is declared first and must win.
        let err = schema()
            .validate(params(r#"{"amount": "x", "jurisdiction": 5}"#))
            .unwrap_err();
        assert_eq!(err.parameter, "amount");
    }

    #[test]
    fn test_validate_optional_absent_is_ok() {
        let input = params(r#"{"amount": 1, "jurisdiction": "Texas"}"#);
        assert!(schema().validate(input).is_ok());
    }

    #[test]
    fn test_validate_optional_present_is_typechecked() {
        let err = schema()
            .validate(params(r#"{"amount": 1, "jurisdiction": "Texas", "note": 7}"#))
            .unwrap_err();
        assert_eq!(err.parameter, "note");
    }

    #[test]
    fn test_validate_ignores_undeclared_params() {
        let input = params(r#"{"amount": 1, "jurisdiction": "Texas", "extra": [1, 2]}"#);
        assert!(schema().validate(input).is_ok());
    }

    #[test]
    fn test_schema_to_json() {
        let rendered = schema().to_json();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["properties"]["amount"]["type"], "number");
        assert_eq!(
            rendered["required"],
            serde_json::json!(["amount", "jurisdiction"])
        );
    }
}
