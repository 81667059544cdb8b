//! In-process evaluation of a `TypeDefinition` against JSON data.
//!
//! Same contract as the generated TypeScript validator: the input comes back
//! unchanged on success, the first failing property stops evaluation.
use serde_json::{Map, Value};

use crate::ir::{Assertion, LiteralValue, PropertySpec, TypeDefinition};

/// Location used when the input itself (not one of its properties) fails.
pub const ROOT: &str = "$";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required property `{0}`")]
    MissingRequiredProperty(String),

    #[error("`{property}`: expected type '{expected}', found '{found}'")]
    TypeMismatch {
        property: String,
        expected: String,
        found: String,
    },

    #[error("`{property}`: element {index} failed inner-type validation with: {cause}")]
    ElementValidationFailed {
        property: String,
        index: usize,
        cause: Box<ValidationError>,
    },

    #[error("`{property}`: {found} is not one of the valid values")]
    NoVariantMatched { property: String, found: String },

    #[error("too many props to marshal '{0}'")]
    UnexpectedProperty(String),
}

pub fn validate(def: &TypeDefinition, input: Value) -> Result<Value, ValidationError> {
    let Value::Object(map) = &input else {
        return Err(ValidationError::TypeMismatch {
            property: ROOT.to_string(),
            expected: "object".to_string(),
            found: type_of(Some(&input)).to_string(),
        });
    };

    for prop in &def.properties {
        check_property(prop, map.get(&prop.name))?;
    }

    if def.closed && !unexpected_keys(def, map).is_empty() {
        return Err(ValidationError::UnexpectedProperty(def.name.clone()));
    }

    Ok(input)
}

fn check_property(prop: &PropertySpec, value: Option<&Value>) -> Result<(), ValidationError> {
    match prop.assertions.first() {
        Some(Assertion::Nullish) if is_nullish(value) => return Ok(()),
        Some(Assertion::Required) if is_nullish(value) => {
            return Err(ValidationError::MissingRequiredProperty(prop.name.clone()));
        }
        _ => {}
    }
    for assertion in prop.checks() {
        check(assertion, &prop.name, value)?;
    }
    Ok(())
}

/// Apply one assertion to the value found at `at`.
pub fn check(assertion: &Assertion, at: &str, value: Option<&Value>) -> Result<(), ValidationError> {
    match assertion {
        Assertion::Nullish => Ok(()),
        Assertion::Required => {
            if is_nullish(value) {
                Err(ValidationError::MissingRequiredProperty(at.to_string()))
            } else {
                Ok(())
            }
        }
        Assertion::IsString => expect_type(at, value, "string", |v| v.is_string()),
        Assertion::IsNumber => expect_type(at, value, "number", |v| v.is_number()),
        Assertion::IsBoolean => expect_type(at, value, "boolean", |v| v.is_boolean()),
        Assertion::IsLiteral(lit) => {
            if value.is_some_and(|v| literal_matches(lit, v)) {
                Ok(())
            } else {
                Err(ValidationError::TypeMismatch {
                    property: at.to_string(),
                    expected: lit.to_string(),
                    found: render(value),
                })
            }
        }
        Assertion::IsArray(inner) => {
            let Some(Value::Array(items)) = value else {
                return Err(mismatch(at, "array", value));
            };
            for (index, item) in items.iter().enumerate() {
                let item_at = format!("{at}[{index}]");
                if let Err(cause) = check(inner, &item_at, Some(item)) {
                    return Err(ValidationError::ElementValidationFailed {
                        property: at.to_string(),
                        index,
                        cause: Box::new(cause),
                    });
                }
            }
            Ok(())
        }
        Assertion::IsOneOf(arms) => {
            if arms.iter().any(|arm| check(arm, at, value).is_ok()) {
                Ok(())
            } else {
                Err(ValidationError::NoVariantMatched { property: at.to_string(), found: render(value) })
            }
        }
    }
}

fn expect_type(
    at: &str,
    value: Option<&Value>,
    expected: &str,
    pred: impl Fn(&Value) -> bool,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if pred(v) => Ok(()),
        _ => Err(mismatch(at, expected, value)),
    }
}

fn mismatch(at: &str, expected: &str, value: Option<&Value>) -> ValidationError {
    ValidationError::TypeMismatch {
        property: at.to_string(),
        expected: expected.to_string(),
        found: type_of(value).to_string(),
    }
}

fn literal_matches(lit: &LiteralValue, v: &Value) -> bool {
    match (lit, v) {
        (LiteralValue::String(s), Value::String(x)) => s == x,
        (LiteralValue::Number(n), Value::Number(x)) => x.as_f64() == Some(n.0),
        (LiteralValue::Boolean(b), Value::Bool(x)) => b == x,
        _ => false,
    }
}

/// Absent and `null` both count as nullish.
pub fn is_nullish(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn type_of(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

fn render(value: Option<&Value>) -> String {
    value.map_or_else(|| "undefined".to_string(), |v| v.to_string())
}

/// Collect the keys of `input` that a closed definition would reject.
pub fn unexpected_keys<'a>(def: &TypeDefinition, input: &'a Map<String, Value>) -> Vec<&'a str> {
    input
        .keys()
        .filter(|k| !def.property_names().any(|p| p == k.as_str()))
        .map(String::as_str)
        .collect()
}

// ------------------------------- Tests ------------------------------------ //
