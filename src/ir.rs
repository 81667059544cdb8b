// Assertion IR: what a generated validator checks, independent of how it is rendered.
use std::fmt;

use ordered_float::OrderedFloat;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    Number,
    Boolean,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::String => f.write_str("string"),
            Primitive::Number => f.write_str("number"),
            Primitive::Boolean => f.write_str("boolean"),
        }
    }
}

/// A literal captured from a literal type (`"yacht"`, `3`, `true`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum LiteralValue {
    String(String),
    Number(OrderedFloat<f64>),
    Boolean(bool),
}

impl fmt::Display for LiteralValue {
    /// Renders the literal as it is written in source: strings quoted and escaped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::String(s) => f.write_str(&serde_json::Value::String(s.clone()).to_string()),
            LiteralValue::Number(n) => write!(f, "{}", n.0),
            LiteralValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// Structural description of a property's declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeShape {
    Primitive(Primitive),
    ArrayOf(Box<TypeShape>),
    LiteralUnion(Vec<LiteralValue>), // source order, duplicates removed
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "check", content = "of", rename_all = "snake_case")]
pub enum Assertion {
    Nullish, // presence marker: skip the rest when nullish
    Required,
    IsString,
    IsNumber,
    IsBoolean,
    IsArray(Box<Assertion>),
    IsLiteral(LiteralValue),
    IsOneOf(Vec<Assertion>),
}

impl TypeShape {
    pub fn assertion(&self) -> Assertion {
        match self {
            TypeShape::Primitive(Primitive::String) => Assertion::IsString,
            TypeShape::Primitive(Primitive::Number) => Assertion::IsNumber,
            TypeShape::Primitive(Primitive::Boolean) => Assertion::IsBoolean,
            TypeShape::ArrayOf(inner) => Assertion::IsArray(Box::new(inner.assertion())),
            TypeShape::LiteralUnion(lits) => Assertion::IsOneOf(
                lits.iter().cloned().map(Assertion::IsLiteral).collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySpec {
    pub name: String,
    pub optional: bool,
    pub shape: Option<TypeShape>,
    /// Presence marker first, then the structural check (if any).
    pub assertions: Vec<Assertion>,
}

impl PropertySpec {
    pub fn new(name: impl Into<String>, optional: bool, shape: Option<TypeShape>) -> Self {
        let mut assertions = Vec::with_capacity(2);
        assertions.push(if optional { Assertion::Nullish } else { Assertion::Required });
        if let Some(shape) = &shape {
            assertions.push(shape.assertion());
        }
        PropertySpec { name: name.into(), optional, shape, assertions }
    }

    /// Assertions after the presence marker.
    pub fn checks(&self) -> &[Assertion] {
        match self.assertions.first() {
            Some(Assertion::Nullish | Assertion::Required) => &self.assertions[1..],
            _ => &self.assertions,
        }
    }
}

/// One declared object type. `closed` = type-alias semantics (no extra props).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDefinition {
    pub name: String,
    pub closed: bool,
    pub properties: Vec<PropertySpec>, // declaration order
}

impl TypeDefinition {
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }
}

// ------------------------------- Tests ------------------------------------ //
