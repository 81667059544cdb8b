//! Call-site resolution and the tree edits that redirect marshal calls.
use indexmap::IndexSet;
use serde_json::Value;

use crate::ast::{
    CallExpr, Expr, Extra, Ident, ImportDecl, ImportSpec, InterfaceDecl, MemberExpr, MemberProp,
    OpaqueNode, Span, TsEntityName, TsType, TsTypeAnn, TypeAliasDecl, node_kind, node_span,
};
use crate::error::CompileError;

/// A marshal call being resolved. Never stored past the rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub callee: String,
    pub callee_span: Span,
    pub explicit_type_argument: Option<String>,
    pub contextual_type_name: Option<String>,
}

impl CallSite {
    /// An explicit `<T>` wins over the enclosing binding's type.
    pub fn target(&self) -> Option<&str> {
        self.explicit_type_argument
            .as_deref()
            .or(self.contextual_type_name.as_deref())
    }
}

/// Name of a plain type reference (`Captain`), if the annotation is one.
pub fn type_reference_name(ty: &TsType) -> Option<String> {
    match ty {
        TsType::Reference(r) => match &r.type_name {
            TsEntityName::Ident(id) => Some(id.value.clone()),
            TsEntityName::Qualified(_) => None,
        },
        TsType::Parenthesized(p) => type_reference_name(&p.type_annotation),
        _ => None,
    }
}

pub fn annotation_type_name(ann: &TsTypeAnn) -> Option<String> {
    type_reference_name(&ann.type_annotation)
}

/// Build the call site if `call` invokes one of the stub names; `None` otherwise.
pub fn marshal_call_site(
    call: &CallExpr,
    stubs: &IndexSet<String>,
    contextual_type_name: Option<&str>,
) -> Option<CallSite> {
    let Expr::Ident(callee) = call.callee.as_ref() else {
        return None;
    };
    if !stubs.contains(&callee.value) {
        return None;
    }
    let explicit_type_argument = call
        .type_arguments
        .as_ref()
        .and_then(|args| args.params.first())
        .and_then(type_reference_name);
    Some(CallSite {
        callee: callee.value.clone(),
        callee_span: callee.span,
        explicit_type_argument,
        contextual_type_name: contextual_type_name.map(str::to_string),
    })
}

/// `stub(raw)` → `stub.<validator>(raw)`.
pub fn redirect_callee(call: &mut CallExpr, stub: &str, validator: &str) {
    let span = call.callee.span();
    call.callee = Box::new(Expr::Member(MemberExpr {
        span,
        object: Box::new(Expr::Ident(Ident::spanned(stub, span))),
        property: MemberProp::Ident(Ident::spanned(validator, span)),
        rest: Extra::new(),
    }));
}

/// `import m from "./marshal"` → `import * as m from "./marshal"`.
///
/// Returns the local name bound to the generated module when `decl` imports it,
/// whether or not an edit was needed.
pub fn rewrite_marshal_import(decl: &mut ImportDecl, marshal_module: &str) -> Option<String> {
    if decl.type_only || !is_marshal_module(&decl.source.value, marshal_module) {
        return None;
    }
    for spec in decl.specifiers.iter_mut() {
        match spec {
            ImportSpec::Default(local) => {
                let local = local.clone();
                let name = local.local.value.clone();
                *spec = ImportSpec::Namespace(local);
                return Some(name);
            }
            ImportSpec::Namespace(local) => return Some(local.local.value.clone()),
            ImportSpec::Named(_) | ImportSpec::Opaque(_) => {}
        }
    }
    None
}

/// A configured path (`./marshal`) must equal the specifier; a bare name
/// (`marshal`) matches its last path segment. Script extensions are ignored
/// on both sides.
pub fn is_marshal_module(specifier: &str, marshal_module: &str) -> bool {
    let specifier = strip_script_extension(specifier);
    let module = strip_script_extension(marshal_module);
    if module.contains('/') {
        specifier == module
    } else {
        specifier.rsplit('/').next() == Some(module)
    }
}

fn strip_script_extension(path: &str) -> &str {
    const EXTENSIONS: [&str; 6] = [".ts", ".tsx", ".mts", ".js", ".mjs", ".cjs"];
    EXTENSIONS.iter().find_map(|ext| path.strip_suffix(ext)).unwrap_or(path)
}

// ————————————————————————————————————————————————————————————————————————————
// UNMODELED NODES
// ————————————————————————————————————————————————————————————————————————————

/// An opaque node is carried through untouched unless it hides something the
/// pass must act on: a type declaration or a call to a stub name.
pub fn opaque_node_error(node: &OpaqueNode, stubs: &IndexSet<String>) -> Option<CompileError> {
    if let Some(err) = opaque_declaration_error(node) {
        return Some(err);
    }
    let call = find_node(&node.node, &|map: &Extra| stub_callee(map, stubs).is_some())?;
    Some(CompileError::UnresolvedMarshalTarget {
        callee: stub_callee(call, stubs)?.to_string(),
        span: node_span(call),
    })
}

/// A declaration that failed to load as a modeled node, or one nested inside
/// syntax the pass does not walk (`declare module`, `export default interface`).
pub fn opaque_declaration_error(node: &OpaqueNode) -> Option<CompileError> {
    let decl = find_node(&node.node, &|map: &Extra| {
        matches!(node_kind(map), Some("TsInterfaceDeclaration" | "TsTypeAliasDeclaration"))
    })?;
    let name = decl
        .get("id")
        .and_then(|id| id.get("value"))
        .and_then(Value::as_str)
        .unwrap_or("<anonymous>")
        .to_string();
    let reason = if std::ptr::eq(decl, &node.node) {
        let value = Value::Object(decl.clone());
        let loaded = match node_kind(decl) {
            Some("TsInterfaceDeclaration") => serde_json::from_value::<InterfaceDecl>(value).err(),
            _ => serde_json::from_value::<TypeAliasDecl>(value).err(),
        };
        match loaded {
            Some(err) => format!("unsupported declaration syntax: {err}"),
            None => "unsupported declaration syntax".to_string(),
        }
    } else {
        format!("declared inside `{}`, which is not walked", node.kind())
    };
    Some(CompileError::MalformedDeclaration { name, reason })
}

fn stub_callee<'a>(map: &'a Extra, stubs: &IndexSet<String>) -> Option<&'a str> {
    if node_kind(map) != Some("CallExpression") {
        return None;
    }
    let callee = map.get("callee")?.as_object()?;
    if node_kind(callee) != Some("Identifier") {
        return None;
    }
    callee.get("value")?.as_str().filter(|name| stubs.contains(*name))
}

/// Depth-first, in document order.
fn find_node<'a>(map: &'a Extra, pred: &impl Fn(&Extra) -> bool) -> Option<&'a Extra> {
    if pred(map) {
        return Some(map);
    }
    map.values().find_map(|value| find_in_value(value, pred))
}

fn find_in_value<'a>(value: &'a Value, pred: &impl Fn(&Extra) -> bool) -> Option<&'a Extra> {
    match value {
        Value::Object(map) => find_node(map, pred),
        Value::Array(items) => items.iter().find_map(|item| find_in_value(item, pred)),
        _ => None,
    }
}
