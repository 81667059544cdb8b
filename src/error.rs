use crate::ast::Span;
use crate::path_de::AstError;

/// Compile-time failures. Any of these aborts the whole pass.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("property `{property}` of `{type_name}` has an unmappable type: {shape}")]
    UnmappableType {
        type_name: String,
        property: String,
        shape: String,
    },

    #[error("malformed declaration `{name}`: {reason}")]
    MalformedDeclaration { name: String, reason: String },

    #[error("cannot resolve the target type of the `{callee}` call at {span}; add a type argument or annotate the binding")]
    UnresolvedMarshalTarget { callee: String, span: Span },

    #[error("validator `{0}` would be generated more than once")]
    DuplicateValidator(String),

    #[error("invalid option `{option}`: {reason}")]
    InvalidOption { option: &'static str, reason: String },

    #[error(transparent)]
    Ast(#[from] AstError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
