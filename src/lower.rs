//! Lowering: declared type syntax → `ir::TypeDefinition`.
use indexmap::IndexSet;
use ordered_float::OrderedFloat;

use crate::ast::{
    Expr, InterfaceDecl, TsEntityName, TsKeywordKind, TsLit, TsPropertySignature, TsType,
    TsTypeElement, TypeAliasDecl,
};
use crate::error::CompileError;
use crate::ir::{LiteralValue, Primitive, PropertySpec, TypeDefinition, TypeShape};

/// Interfaces are open: extra properties on the input are allowed.
pub fn lower_interface(decl: &InterfaceDecl) -> Result<TypeDefinition, CompileError> {
    let name = &decl.id.value;
    if decl.type_params.as_ref().is_some_and(|p| !p.parameters.is_empty()) {
        return Err(malformed(name, "generic interfaces are not supported"));
    }
    if let Some(parent) = decl.extends.first() {
        let parent = match parent.expression.as_ref() {
            Expr::Ident(id) => id.value.clone(),
            _ => "an expression".to_string(),
        };
        return Err(malformed(name, &format!("interface extends `{parent}`; referenced types are not supported")));
    }
    lower_members(name, &decl.body.body, false)
}

/// Type aliases of an object literal are closed. Any other alias (`type Id = string`)
/// has nothing to validate as an object and yields `None`.
pub fn lower_type_alias(decl: &TypeAliasDecl) -> Result<Option<TypeDefinition>, CompileError> {
    let name = &decl.id.value;
    let TsType::TypeLiteral(lit) = unparen(&decl.type_annotation) else {
        return Ok(None);
    };
    if decl.type_params.as_ref().is_some_and(|p| !p.parameters.is_empty()) {
        return Err(malformed(name, "generic type aliases are not supported"));
    }
    lower_members(name, &lit.members, true).map(Some)
}

fn lower_members(
    type_name: &str,
    members: &[TsTypeElement],
    closed: bool,
) -> Result<TypeDefinition, CompileError> {
    let mut properties = Vec::with_capacity(members.len());
    for member in members {
        let sig = match member {
            TsTypeElement::Property(sig) => sig,
            TsTypeElement::Method(_) => {
                return Err(malformed(type_name, "method signatures cannot be validated"));
            }
            TsTypeElement::Index(_) => {
                return Err(malformed(type_name, "index signatures cannot be validated"));
            }
            TsTypeElement::Opaque(node) => {
                return Err(malformed(type_name, &format!("`{}` members cannot be validated", node.kind())));
            }
        };
        properties.push(lower_property(type_name, sig)?);
    }
    Ok(TypeDefinition { name: type_name.to_string(), closed, properties })
}

fn lower_property(type_name: &str, sig: &TsPropertySignature) -> Result<PropertySpec, CompileError> {
    let name = property_key(type_name, sig)?;
    let shape = match &sig.type_annotation {
        None => None,
        Some(ann) => Some(shape_of(type_name, &name, &ann.type_annotation)?),
    };
    Ok(PropertySpec::new(name, sig.optional, shape))
}

fn property_key(type_name: &str, sig: &TsPropertySignature) -> Result<String, CompileError> {
    if sig.computed {
        return Err(malformed(type_name, "computed property keys are not supported"));
    }
    match sig.key.as_ref() {
        Expr::Ident(id) => Ok(id.value.clone()),
        Expr::Str(s) => Ok(s.value.clone()),
        _ => Err(malformed(type_name, "property keys must be identifiers or string literals")),
    }
}

/// Map one property's declared type to a shape.
pub fn shape_of(type_name: &str, property: &str, ty: &TsType) -> Result<TypeShape, CompileError> {
    let unmappable = |shape: String| CompileError::UnmappableType {
        type_name: type_name.to_string(),
        property: property.to_string(),
        shape,
    };

    match unparen(ty) {
        TsType::Keyword(kw) => match kw.kind {
            TsKeywordKind::String => Ok(TypeShape::Primitive(Primitive::String)),
            TsKeywordKind::Number => Ok(TypeShape::Primitive(Primitive::Number)),
            TsKeywordKind::Boolean => Ok(TypeShape::Primitive(Primitive::Boolean)),
            other => Err(unmappable(format!("keyword type `{other}`"))),
        },
        TsType::Array(arr) => {
            Ok(TypeShape::ArrayOf(Box::new(shape_of(type_name, property, &arr.elem_type)?)))
        }
        TsType::Reference(r) => match (&r.type_name, &r.type_params) {
            (TsEntityName::Ident(id), Some(args)) if id.value == "Array" && args.params.len() == 1 => {
                Ok(TypeShape::ArrayOf(Box::new(shape_of(type_name, property, &args.params[0])?)))
            }
            (name, _) => Err(unmappable(format!("reference to `{name}`"))),
        },
        TsType::Union(union) => {
            let mut lits = IndexSet::with_capacity(union.types.len());
            for arm in &union.types {
                match unparen(arm) {
                    TsType::Literal(lit) => {
                        lits.insert(literal_value(&lit.literal));
                    }
                    other => {
                        return Err(unmappable(format!(
                            "union with non-literal arm ({})",
                            describe(other)
                        )));
                    }
                }
            }
            Ok(TypeShape::LiteralUnion(lits.into_iter().collect()))
        }
        // A lone literal is a one-armed union.
        TsType::Literal(lit) => Ok(TypeShape::LiteralUnion(vec![literal_value(&lit.literal)])),
        other => Err(unmappable(describe(other))),
    }
}

fn literal_value(lit: &TsLit) -> LiteralValue {
    match lit {
        TsLit::Str(s) => LiteralValue::String(s.value.clone()),
        TsLit::Number(n) => LiteralValue::Number(OrderedFloat(n.value)),
        TsLit::Bool(b) => LiteralValue::Boolean(b.value),
    }
}

fn unparen(ty: &TsType) -> &TsType {
    match ty {
        TsType::Parenthesized(p) => unparen(&p.type_annotation),
        other => other,
    }
}

fn describe(ty: &TsType) -> String {
    match ty {
        TsType::Keyword(kw) => format!("keyword type `{}`", kw.kind),
        TsType::Array(_) => "array type".to_string(),
        TsType::Union(_) => "union type".to_string(),
        TsType::Intersection(_) => "intersection type".to_string(),
        TsType::Literal(_) => "literal type".to_string(),
        TsType::Reference(r) => format!("reference to `{}`", r.type_name),
        TsType::TypeLiteral(_) => "object type literal".to_string(),
        TsType::Parenthesized(p) => describe(&p.type_annotation),
        TsType::Opaque(node) => format!("`{}`", node.kind()),
    }
}

fn malformed(name: &str, reason: &str) -> CompileError {
    CompileError::MalformedDeclaration { name: name.to_string(), reason: reason.to_string() }
}

// ------------------------------- Tests ------------------------------------ //
