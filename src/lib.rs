//! Compile TypeScript type declarations into runtime validators and redirect
//! `$marshal(raw)` call sites to them.
//!
//! ```text
//! AST (JSON) → lower → ir::TypeDefinition → codegen → sink
//!                 \→ bindings + rewrite → rewritten AST
//! ```
pub mod ast;
pub mod bindings;
pub mod codegen;
pub mod config;
pub mod driver;
pub mod error;
pub mod ir;
pub mod logging;
pub mod lower;
pub mod path_de;
pub mod rewrite;
pub mod sink;
pub mod validate;

pub use config::{CompileOptions, Scoping};
pub use driver::{Compiled, RewrittenCall, analyze_program, compile_program};
pub use error::CompileError;
pub use ir::{Assertion, TypeDefinition};
pub use sink::{ModuleBuffer, ValidatorSink};

use ast::Program;

/// Compile one program into `sink`: preamble first, then its validators.
///
/// On error the sink may hold the preamble only; nothing in it should be used.
pub fn compile(
    program: Program,
    options: &CompileOptions,
    sink: &mut dyn ValidatorSink,
) -> Result<Compiled, CompileError> {
    options.validate()?;
    sink.write_preamble(&sink::preamble(options))?;
    compile_program(program, options, sink)
}

/// Generated module plus the rewritten programs it serves.
#[derive(Debug)]
pub struct CompiledModule {
    pub source: String,
    pub programs: Vec<Compiled>,
}

/// Compile several programs into one generated module, each with its own pass.
///
/// Validator names must be unique across all programs.
pub fn compile_to_module(
    programs: impl IntoIterator<Item = Program>,
    options: &CompileOptions,
) -> Result<CompiledModule, CompileError> {
    options.validate()?;
    let mut buffer = ModuleBuffer::new();
    buffer.write_preamble(&sink::preamble(options))?;
    let programs = programs
        .into_iter()
        .map(|program| compile_program(program, options, &mut buffer))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CompiledModule { source: buffer.into_string(), programs })
}
