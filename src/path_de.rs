use serde::de::DeserializeOwned;

use crate::ast::Program;

/// A JSON document that did not match the expected shape, with the path to the offending node.
#[derive(Debug, thiserror::Error)]
#[error("at JSON path {path} → {message}")]
pub struct AstError {
    pub path: String,
    pub message: String,
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, AstError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| AstError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AstError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| AstError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

pub fn program_from_str(src: &str) -> Result<Program, AstError> {
    from_str_with_path(src)
}

pub fn program_from_slice(bytes: &[u8]) -> Result<Program, AstError> {
    from_slice_with_path(bytes)
}
