//! Renders `ir::TypeDefinition`s as TypeScript validator functions.
//!
//! Output is deterministic: the same definition always yields byte-identical source.
use crate::ir::{Assertion, TypeDefinition};

const INDENT: &str = "  ";

pub struct Codegen {
    prefix: String,
    out: String,
}

impl Codegen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Codegen { prefix: prefix.into(), out: String::new() }
    }

    pub fn validator_name(&self, type_name: &str) -> String {
        format!("{}{}", self.prefix, type_name)
    }

    pub fn emit(&mut self, def: &TypeDefinition) {
        let name = self.validator_name(&def.name);
        self.line(0, &format!("function {name}(input: any): any {{"));
        self.line(1, "isObject(input);");

        for prop in &def.properties {
            let target = format!("input[{}]", quote(&prop.name));
            match prop.assertions.first() {
                Some(Assertion::Nullish) if prop.checks().is_empty() => {}
                Some(Assertion::Nullish) => {
                    // absent optional property: skip everything below
                    self.line(1, &format!("if (!isNullish({target})) {{"));
                    for assertion in prop.checks() {
                        self.line(2, &format!("{};", applied(assertion, &target)));
                    }
                    self.line(1, "}");
                }
                _ => {
                    for assertion in &prop.assertions {
                        self.line(1, &format!("{};", applied(assertion, &target)));
                    }
                }
            }
        }

        if def.closed {
            let expected = def.property_names().map(quote).collect::<Vec<_>>().join(", ");
            self.line(1, &format!("const expectedProps = new Set([{expected}]);"));
            self.line(1, &format!(
                "if (!Object.keys(input).every((key) => expectedProps.has(key))) throw new UnexpectedProperty({});",
                quote(&def.name)
            ));
        }

        self.line(1, "return input;");
        self.line(0, "}");
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }
}

/// Convenience: one definition → one function.
pub fn render_validator(prefix: &str, def: &TypeDefinition) -> String {
    let mut cg = Codegen::new(prefix);
    cg.emit(def);
    cg.into_string()
}

/// A check applied directly to `target`.
fn applied(assertion: &Assertion, target: &str) -> String {
    match assertion {
        Assertion::Nullish => format!("isNullish({target})"),
        Assertion::Required => format!("isRequired({target})"),
        Assertion::IsString => format!("isString({target})"),
        Assertion::IsNumber => format!("isNumber({target})"),
        Assertion::IsBoolean => format!("isBoolean({target})"),
        Assertion::IsLiteral(lit) => format!("isLiteral({lit})({target})"),
        Assertion::IsArray(inner) => format!("isArray({target}, {})", unapplied(inner)),
        Assertion::IsOneOf(arms) => format!("isOneOf({target}, [{}])", unapplied_list(arms)),
    }
}

/// A check as a value, handed to a combinator that applies it later.
fn unapplied(assertion: &Assertion) -> String {
    match assertion {
        Assertion::Nullish => "isNullish".to_string(),
        Assertion::Required => "isRequired".to_string(),
        Assertion::IsString => "isString".to_string(),
        Assertion::IsNumber => "isNumber".to_string(),
        Assertion::IsBoolean => "isBoolean".to_string(),
        Assertion::IsLiteral(lit) => format!("isLiteral({lit})"),
        Assertion::IsArray(_) | Assertion::IsOneOf(_) => format!("(v: any) => {}", applied(assertion, "v")),
    }
}

fn unapplied_list(arms: &[Assertion]) -> String {
    arms.iter().map(unapplied).collect::<Vec<_>>().join(", ")
}

fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

// ------------------------------- Tests ------------------------------------ //
