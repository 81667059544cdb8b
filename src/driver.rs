//! The single traversal that ties analysis, generation and rewriting together.
//!
//! One pre-order walk over the program. Declarations are lowered and rendered as
//! they are met; marshal calls are rewritten against the binding context in
//! effect at that point. The first failure is recorded and every later event is
//! ignored, so nothing after it can observe a half-rewritten tree.
use derive_visitor::{Drive, DriveMut, Visitor, VisitorMut};
use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, trace};

use crate::ast::{
    ArrowExpr, AssignExpr, BlockStmt, CallExpr, Expr, FnDecl, ImportDecl, InterfaceDecl,
    OpaqueNode, Pat, Program, Span, TypeAliasDecl, VarDeclarator,
};
use crate::bindings::BindingTable;
use crate::codegen::render_validator;
use crate::config::CompileOptions;
use crate::error::CompileError;
use crate::ir::TypeDefinition;
use crate::lower::{lower_interface, lower_type_alias};
use crate::rewrite::{
    annotation_type_name, marshal_call_site, opaque_declaration_error, opaque_node_error,
    redirect_callee, rewrite_marshal_import,
};
use crate::sink::ValidatorSink;

/// One call site the pass redirected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewrittenCall {
    pub span: Span,
    pub type_name: String,
    pub validator: String,
}

#[derive(Debug)]
pub struct Compiled {
    pub program: Program,
    pub definitions: Vec<TypeDefinition>,
    pub rewritten: Vec<RewrittenCall>,
}

/// Run the pass over `program`, handing generated validators to `sink`.
///
/// The sink only sees output once the whole walk has succeeded. The preamble is
/// not written here; see `crate::compile`.
pub fn compile_program(
    mut program: Program,
    options: &CompileOptions,
    sink: &mut dyn ValidatorSink,
) -> Result<Compiled, CompileError> {
    let mut visitor = MarshalVisitor::new(options);
    program.drive_mut(&mut visitor);

    let MarshalVisitor { error, validators, definitions, rewritten, .. } = visitor;
    if let Some(err) = error {
        return Err(err);
    }
    for (name, source) in &validators {
        sink.append_validator(name, source)?;
    }
    Ok(Compiled { program, definitions, rewritten })
}

/// Lower every declaration in `program` without touching it.
pub fn analyze_program(program: &Program) -> Result<Vec<TypeDefinition>, CompileError> {
    let mut collector = DeclarationCollector::default();
    program.drive(&mut collector);
    match collector.error {
        Some(err) => Err(err),
        None => Ok(collector.definitions),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// REWRITING VISITOR
// ————————————————————————————————————————————————————————————————————————————

#[derive(VisitorMut)]
#[visitor(
    ImportDecl(enter),
    VarDeclarator,
    AssignExpr,
    CallExpr(enter),
    BlockStmt,
    FnDecl,
    ArrowExpr,
    InterfaceDecl(enter),
    TypeAliasDecl(enter),
    OpaqueNode(enter)
)]
struct MarshalVisitor {
    options: CompileOptions,
    bindings: BindingTable,
    // Type name supplied by each enclosing declarator/assignment; innermost last.
    contexts: Vec<Option<String>>,
    // Callee names that denote the marshal stub.
    stubs: IndexSet<String>,
    validators: Vec<(String, String)>,
    definitions: Vec<TypeDefinition>,
    rewritten: Vec<RewrittenCall>,
    error: Option<CompileError>,
}

impl MarshalVisitor {
    fn new(options: &CompileOptions) -> Self {
        MarshalVisitor {
            options: options.clone(),
            bindings: BindingTable::new(options.scoping),
            contexts: Vec::new(),
            stubs: IndexSet::from([options.stub_ident.clone()]),
            validators: Vec::new(),
            definitions: Vec::new(),
            rewritten: Vec::new(),
            error: None,
        }
    }

    fn fail(&mut self, err: CompileError) {
        if self.error.is_none() {
            debug!(error = %err, "aborting pass");
            self.error = Some(err);
        }
    }

    fn emit(&mut self, def: TypeDefinition) {
        let name = self.options.validator_name(&def.name);
        debug!(type_name = %def.name, closed = def.closed, validator = %name, "generated validator");
        let source = render_validator(&self.options.validator_prefix, &def);
        self.validators.push((name, source));
        self.definitions.push(def);
    }

    /// Destructuring patterns bind nothing the pass can type.
    fn bind_pattern(&mut self, pat: &Pat) -> Option<String> {
        let Pat::Ident(id) = pat else {
            return None;
        };
        let annotated = id.type_annotation.as_ref().and_then(annotation_type_name);
        let type_name = self.bindings.declare(&id.value, annotated);
        trace!(ident = %id.value, type_name = ?type_name, depth = self.bindings.depth(), "bound");
        type_name
    }

    fn enter_import_decl(&mut self, decl: &mut ImportDecl) {
        if self.error.is_some() {
            return;
        }
        if let Some(local) = rewrite_marshal_import(decl, &self.options.marshal_module) {
            debug!(source = %decl.source.value, local = %local, "marshal module import");
            self.stubs.insert(local);
        }
    }

    fn enter_var_declarator(&mut self, decl: &mut VarDeclarator) {
        let type_name = self.bind_pattern(&decl.id);
        self.contexts.push(type_name);
    }

    fn exit_var_declarator(&mut self, _: &mut VarDeclarator) {
        self.contexts.pop();
    }

    fn enter_assign_expr(&mut self, assign: &mut AssignExpr) {
        let type_name = match assign.left.as_ref() {
            Expr::Ident(target) if assign.operator == "=" => {
                let found = self.bindings.lookup(&target.value).map(str::to_string);
                trace!(ident = %target.value, type_name = ?found, "assignment context");
                found
            }
            _ => None,
        };
        self.contexts.push(type_name);
    }

    fn exit_assign_expr(&mut self, _: &mut AssignExpr) {
        self.contexts.pop();
    }

    fn enter_call_expr(&mut self, call: &mut CallExpr) {
        if self.error.is_some() {
            return;
        }
        let context = self.contexts.last().cloned().flatten();
        let Some(site) = marshal_call_site(call, &self.stubs, context.as_deref()) else {
            return;
        };
        let Some(type_name) = site.target().map(str::to_string) else {
            self.fail(CompileError::UnresolvedMarshalTarget { callee: site.callee, span: call.span });
            return;
        };
        let validator = self.options.validator_name(&type_name);
        redirect_callee(call, &site.callee, &validator);
        debug!(span = %call.span, explicit = site.explicit_type_argument.is_some(), validator = %validator, "rewrote call");
        self.rewritten.push(RewrittenCall { span: call.span, type_name, validator });
    }

    fn enter_block_stmt(&mut self, _: &mut BlockStmt) {
        self.bindings.push_frame();
    }

    fn exit_block_stmt(&mut self, _: &mut BlockStmt) {
        self.bindings.pop_frame();
    }

    fn enter_fn_decl(&mut self, decl: &mut FnDecl) {
        self.bindings.push_frame();
        for param in &decl.params {
            self.bind_pattern(&param.pat);
        }
    }

    fn exit_fn_decl(&mut self, _: &mut FnDecl) {
        self.bindings.pop_frame();
    }

    fn enter_arrow_expr(&mut self, arrow: &mut ArrowExpr) {
        self.bindings.push_frame();
        for param in &arrow.params {
            self.bind_pattern(param);
        }
    }

    fn exit_arrow_expr(&mut self, _: &mut ArrowExpr) {
        self.bindings.pop_frame();
    }

    fn enter_interface_decl(&mut self, decl: &mut InterfaceDecl) {
        if self.error.is_some() {
            return;
        }
        match lower_interface(decl) {
            Ok(def) => self.emit(def),
            Err(err) => self.fail(err),
        }
    }

    fn enter_type_alias_decl(&mut self, decl: &mut TypeAliasDecl) {
        if self.error.is_some() {
            return;
        }
        match lower_type_alias(decl) {
            Ok(Some(def)) => self.emit(def),
            Ok(None) => debug!(type_name = %decl.id.value, "alias is not an object type; skipped"),
            Err(err) => self.fail(err),
        }
    }

    fn enter_opaque_node(&mut self, node: &mut OpaqueNode) {
        if self.error.is_some() {
            return;
        }
        match opaque_node_error(node, &self.stubs) {
            Some(err) => self.fail(err),
            None => trace!(kind = node.kind(), span = %node.span(), "passed through unmodeled node"),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// READ-ONLY ANALYSIS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Default, Visitor)]
#[visitor(InterfaceDecl(enter), TypeAliasDecl(enter), OpaqueNode(enter))]
struct DeclarationCollector {
    definitions: Vec<TypeDefinition>,
    error: Option<CompileError>,
}

impl DeclarationCollector {
    fn enter_interface_decl(&mut self, decl: &InterfaceDecl) {
        if self.error.is_none() {
            match lower_interface(decl) {
                Ok(def) => self.definitions.push(def),
                Err(err) => self.error = Some(err),
            }
        }
    }

    fn enter_type_alias_decl(&mut self, decl: &TypeAliasDecl) {
        if self.error.is_none() {
            match lower_type_alias(decl) {
                Ok(def) => self.definitions.extend(def),
                Err(err) => self.error = Some(err),
            }
        }
    }

    fn enter_opaque_node(&mut self, node: &OpaqueNode) {
        if self.error.is_none() {
            self.error = opaque_declaration_error(node);
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
