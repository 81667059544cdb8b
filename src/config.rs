//! Compile options, loadable from a JSON file and overridable from the CLI.
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CompileError;

static JS_IDENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid")
});

/// How the binding table treats nested blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scoping {
    /// One table for the whole program; inner declarations leak to later code.
    #[default]
    Flat,
    /// A frame per block/function body.
    Lexical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    /// Identifier of the stub that call sites invoke (`$marshal(raw)`).
    pub stub_ident: String,
    /// Import specifier of the generated module. A path (`./marshal`) must match
    /// exactly; a bare name (`marshal`) matches the last segment of any path.
    /// Script extensions are ignored.
    pub marshal_module: String,
    /// Generated validators are named `<prefix><TypeName>`.
    pub validator_prefix: String,
    /// Module the generated code imports its predicates from.
    pub assertions_module: String,
    pub scoping: Scoping,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            stub_ident: "$marshal".to_string(),
            marshal_module: "./marshal".to_string(),
            validator_prefix: "marshal".to_string(),
            assertions_module: "./assertions".to_string(),
            scoping: Scoping::Flat,
        }
    }
}

impl CompileOptions {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CompileError> {
        let bytes = std::fs::read(path)?;
        let options: CompileOptions = crate::path_de::from_slice_with_path(&bytes)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), CompileError> {
        if !JS_IDENT.is_match(&self.stub_ident) {
            return Err(CompileError::InvalidOption {
                option: "stub_ident",
                reason: format!("`{}` is not an identifier", self.stub_ident),
            });
        }
        if !JS_IDENT.is_match(&self.validator_prefix) {
            return Err(CompileError::InvalidOption {
                option: "validator_prefix",
                reason: format!("`{}` is not an identifier", self.validator_prefix),
            });
        }
        if self.marshal_module.is_empty() {
            return Err(CompileError::InvalidOption {
                option: "marshal_module",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn validator_name(&self, type_name: &str) -> String {
        format!("{}{}", self.validator_prefix, type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let options: CompileOptions =
            crate::path_de::from_str_with_path(r#"{ "scoping": "lexical", "validator_prefix": "parse" }"#).unwrap();
        assert_eq!(options.scoping, Scoping::Lexical);
        assert_eq!(options.stub_ident, "$marshal");
        assert_eq!(options.marshal_module, "./marshal");
        assert_eq!(options.validator_name("Captain"), "parseCaptain");
        options.validate().unwrap();
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = crate::path_de::from_str_with_path::<CompileOptions>(r#"{ "stub": "x" }"#).unwrap_err();
        assert!(err.message.contains("unknown field"), "{}", err.message);
    }

    #[test]
    fn non_identifier_prefix_is_invalid() {
        let options = CompileOptions { validator_prefix: "to-".into(), ..CompileOptions::default() };
        assert!(matches!(
            options.validate(),
            Err(CompileError::InvalidOption { option: "validator_prefix", .. })
        ));
    }
}
