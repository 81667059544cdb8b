//! Where generated validators go.
//!
//! The driver hands each rendered function to a `ValidatorSink` as soon as the
//! declaration is analyzed. `ModuleBuffer` collects them into one TypeScript module.
use indexmap::IndexSet;

use crate::config::CompileOptions;
use crate::error::CompileError;

/// Append-only destination for generated code.
pub trait ValidatorSink {
    /// Called once per compilation, before any validator.
    fn write_preamble(&mut self, preamble: &str) -> Result<(), CompileError>;

    /// Called once per declaration, in traversal order.
    fn append_validator(&mut self, name: &str, source: &str) -> Result<(), CompileError>;
}

#[derive(Debug, Default)]
pub struct ModuleBuffer {
    source: String,
    names: IndexSet<String>,
}

impl ModuleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn into_string(self) -> String {
        self.source
    }
}

impl ValidatorSink for ModuleBuffer {
    fn write_preamble(&mut self, preamble: &str) -> Result<(), CompileError> {
        self.source.push_str(preamble);
        Ok(())
    }

    fn append_validator(&mut self, name: &str, source: &str) -> Result<(), CompileError> {
        if !self.names.insert(name.to_string()) {
            return Err(CompileError::DuplicateValidator(name.to_string()));
        }
        self.source.push_str("export ");
        self.source.push_str(source);
        self.source.push('\n');
        Ok(())
    }
}

/// Header of the generated module: predicate imports and the stub entry point.
pub fn preamble(options: &CompileOptions) -> String {
    let stub = &options.stub_ident;
    let module = serde_json::Value::String(options.assertions_module.clone());
    format!(
        r#"// This file is generated and should not be edited by humans
import {{
  isObject,
  isRequired,
  isNullish,
  isString,
  isNumber,
  isBoolean,
  isArray,
  isLiteral,
  isOneOf,
  UnexpectedProperty,
}} from {module};

// {stub} only exists so call sites type-check before the transform runs.
function {stub}<T>(src: any): T {{
  throw new Error("{stub} has not been replaced for this call site");
}}

export default {stub};

// GENERATED MARSHALERS
"#
    )
}

/// Predicate library the generated module imports from.
pub const PREDICATES_SOURCE: &str = r#"// This file is generated and should not be edited by humans
export type Validator = (input: any) => void;

export class ValidationFailure extends Error {}

export class MissingRequiredProperty extends ValidationFailure {
  constructor() {
    super("missing required property");
  }
}

export class TypeMismatch extends ValidationFailure {
  constructor(public expected: string, public found: string) {
    super(`expected type '${expected}', found '${found}'`);
  }
}

export class ElementValidationFailed extends ValidationFailure {
  constructor(public index: number, public cause: unknown) {
    super(`element ${index} failed inner-type validation with: ${cause}`);
  }
}

export class NoVariantMatched extends ValidationFailure {
  constructor(public found: unknown) {
    super(`${found} is not one of the valid values`);
  }
}

export class UnexpectedProperty extends ValidationFailure {
  constructor(public typeName: string) {
    super(`too many props to marshal '${typeName}'`);
  }
}

function typeOf(input: any): string {
  if (input === null) return "null";
  if (Array.isArray(input)) return "array";
  return typeof input;
}

export function isNullish(input: any): boolean {
  return input == null;
}

export function isRequired(input: any) {
  if (isNullish(input)) throw new MissingRequiredProperty();
}

export function isObject(input: any) {
  if (typeOf(input) !== "object") throw new TypeMismatch("object", typeOf(input));
}

export function isString(input: any) {
  if (typeof input !== "string") throw new TypeMismatch("string", typeOf(input));
}

export function isNumber(input: any) {
  if (typeof input !== "number") throw new TypeMismatch("number", typeOf(input));
}

export function isBoolean(input: any) {
  if (typeof input !== "boolean") throw new TypeMismatch("boolean", typeOf(input));
}

export function isArray(input: any, validator: Validator) {
  if (!Array.isArray(input)) throw new TypeMismatch("array", typeOf(input));
  input.forEach((element, index) => {
    try {
      validator(element);
    } catch (e) {
      throw new ElementValidationFailed(index, e);
    }
  });
}

export function isLiteral(value: any): Validator {
  return (input: any) => {
    if (input !== value) throw new TypeMismatch(JSON.stringify(value), String(input));
  };
}

export function isOneOf(input: any, validators: Validator[]) {
  const matched = validators.some((validator) => {
    try {
      validator(input);
      return true;
    } catch {
      return false;
    }
  });
  if (!matched) throw new NoVariantMatched(input);
}
"#;

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_are_exported_in_append_order() {
        let mut buf = ModuleBuffer::new();
        buf.write_preamble("// head\n").unwrap();
        buf.append_validator("marshalA", "function marshalA(input: any): any {\n}\n").unwrap();
        buf.append_validator("marshalB", "function marshalB(input: any): any {\n}\n").unwrap();
        assert_eq!(
            buf.as_str(),
            "// head\nexport function marshalA(input: any): any {\n}\n\nexport function marshalB(input: any): any {\n}\n\n"
        );
        assert_eq!(buf.names().collect::<Vec<_>>(), ["marshalA", "marshalB"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut buf = ModuleBuffer::new();
        buf.append_validator("marshalA", "a").unwrap();
        assert!(matches!(
            buf.append_validator("marshalA", "b"),
            Err(CompileError::DuplicateValidator(name)) if name == "marshalA"
        ));
        assert_eq!(buf.into_string(), "export a\n");
    }

    #[test]
    fn preamble_follows_options() {
        let options = CompileOptions {
            stub_ident: "parse".into(),
            assertions_module: "../runtime/assertions".into(),
            ..CompileOptions::default()
        };
        let head = preamble(&options);
        assert!(head.contains(r#"} from "../runtime/assertions";"#), "{head}");
        assert!(head.contains("function parse<T>(src: any): T {"), "{head}");
        assert!(head.contains("export default parse;"), "{head}");
        assert!(head.ends_with("// GENERATED MARSHALERS\n"));
    }

    #[test]
    fn predicate_library_exports_every_imported_name() {
        let head = preamble(&CompileOptions::default());
        for name in [
            "isObject", "isRequired", "isNullish", "isString", "isNumber", "isBoolean", "isArray",
            "isLiteral", "isOneOf",
        ] {
            assert!(head.contains(&format!("  {name},\n")), "{name}");
            assert!(PREDICATES_SOURCE.contains(&format!("export function {name}(")), "{name}");
        }
        assert!(PREDICATES_SOURCE.contains("export class UnexpectedProperty "));
    }
}
