//! Syntax tree consumed by the transform.
//!
//! Node tags (`"type"`) and field names follow the JSON that SWC's TypeScript
//! parser emits. Fields a node does not model (`ctxt`, `raw`, `declare`,
//! `generator`, `returnType`, ...) land in its `rest` map and are written back
//! unchanged. Node kinds outside the modeled set load as [`OpaqueNode`] and
//! pass through verbatim; the driver only inspects them for stub calls and
//! type declarations it would otherwise miss.
use std::fmt;

use derive_visitor::{Drive, DriveMut};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unmodeled fields of a node, in input order.
pub type Extra = serde_json::Map<String, Value>;

// ————————————————————————————————————————————————————————————————————————————
// COMMON
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    #[serde(default)]
    pub start: u32,
    #[serde(default)]
    pub end: u32,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Identifier in expression position (also used for names of declarations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct Ident {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[drive(skip)]
    pub value: String,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

impl Ident {
    pub fn new(value: impl Into<String>) -> Self {
        Ident { span: Span::default(), value: value.into(), rest: Extra::new() }
    }

    pub fn spanned(value: impl Into<String>, span: Span) -> Self {
        Ident { span, ..Ident::new(value) }
    }
}

/// Node of a kind the pass does not model, kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Drive, DriveMut)]
#[serde(transparent)]
pub struct OpaqueNode {
    #[drive(skip)]
    pub node: Extra,
}

impl OpaqueNode {
    pub fn kind(&self) -> &str {
        node_kind(&self.node).unwrap_or("<untagged>")
    }

    pub fn span(&self) -> Span {
        node_span(&self.node)
    }
}

pub fn node_kind(node: &Extra) -> Option<&str> {
    node.get("type").and_then(Value::as_str)
}

pub fn node_span(node: &Extra) -> Span {
    node.get("span").and_then(|span| Span::deserialize(span).ok()).unwrap_or_default()
}

/// Identifier in binding position: carries the declared annotation, if any.
#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct BindingIdent {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[drive(skip)]
    pub value: String,
    #[drive(skip)]
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub type_annotation: Option<TsTypeAnn>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(tag = "type")]
pub enum Pat {
    #[serde(rename = "Identifier")]
    Ident(BindingIdent),
    /// Destructuring and other binding forms.
    #[serde(untagged)]
    Opaque(OpaqueNode),
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct Str {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[drive(skip)]
    pub value: String,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct Number {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[drive(skip)]
    pub value: f64,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct Bool {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[drive(skip)]
    pub value: bool,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct Null {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

// ————————————————————————————————————————————————————————————————————————————
// PROGRAM & STATEMENTS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub body: Vec<Stmt>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(tag = "type")]
pub enum Stmt {
    #[serde(rename = "ImportDeclaration")]
    Import(ImportDecl),
    #[serde(rename = "VariableDeclaration")]
    Var(VarDecl),
    #[serde(rename = "ExpressionStatement")]
    Expr(ExprStmt),
    #[serde(rename = "BlockStatement")]
    Block(BlockStmt),
    #[serde(rename = "IfStatement")]
    If(IfStmt),
    #[serde(rename = "ReturnStatement")]
    Return(ReturnStmt),
    #[serde(rename = "FunctionDeclaration")]
    Fn(FnDecl),
    #[serde(rename = "ExportDeclaration")]
    Export(ExportDecl),
    #[serde(rename = "TsInterfaceDeclaration")]
    Interface(InterfaceDecl),
    #[serde(rename = "TsTypeAliasDeclaration")]
    TypeAlias(TypeAliasDecl),
    #[serde(rename = "EmptyStatement")]
    Empty(EmptyStmt),
    #[serde(rename = "ExportDefaultExpression")]
    ExportDefault(ExportDefaultExpr),
    #[serde(rename = "ThrowStatement")]
    Throw(ThrowStmt),
    #[serde(rename = "WhileStatement")]
    While(WhileStmt),
    #[serde(rename = "DoWhileStatement")]
    DoWhile(WhileStmt),
    #[serde(rename = "ForStatement")]
    For(ForStmt),
    #[serde(rename = "ForOfStatement")]
    ForOf(ForEachStmt),
    #[serde(rename = "ForInStatement")]
    ForIn(ForEachStmt),
    #[serde(rename = "TryStatement")]
    Try(TryStmt),
    #[serde(untagged)]
    Opaque(OpaqueNode),
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct ImportDecl {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub specifiers: Vec<ImportSpec>,
    pub source: Str,
    #[drive(skip)]
    #[serde(default)]
    pub type_only: bool,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(tag = "type")]
pub enum ImportSpec {
    #[serde(rename = "ImportDefaultSpecifier")]
    Default(ImportLocal),
    #[serde(rename = "ImportNamespaceSpecifier")]
    Namespace(ImportLocal),
    #[serde(rename = "ImportSpecifier")]
    Named(ImportNamed),
    #[serde(untagged)]
    Opaque(OpaqueNode),
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct ImportLocal {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub local: Ident,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct ImportNamed {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub local: Ident,
    #[serde(default)]
    pub imported: Option<Ident>,
    #[drive(skip)]
    #[serde(default)]
    pub is_type_only: bool,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarDeclKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct VarDecl {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[drive(skip)]
    pub kind: VarDeclKind,
    pub declarations: Vec<VarDeclarator>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct VarDeclarator {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub id: Pat,
    #[serde(default)]
    pub init: Option<Box<Expr>>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct ExprStmt {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub expression: Box<Expr>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct BlockStmt {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub stmts: Vec<Stmt>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct IfStmt {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub test: Box<Expr>,
    pub consequent: Box<Stmt>,
    #[serde(default)]
    pub alternate: Option<Box<Stmt>>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct ReturnStmt {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[serde(default)]
    pub argument: Option<Box<Expr>>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub pat: Pat,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct FnDecl {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub identifier: Ident,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub body: Option<BlockStmt>,
    #[drive(skip)]
    #[serde(default, rename = "async")]
    pub is_async: bool,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

/// `export <declaration>`; the wrapped node is any declaration statement.
#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct ExportDecl {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub declaration: Box<Stmt>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct EmptyStmt {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

/// `export default <expression>`.
#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct ExportDefaultExpr {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub expression: Box<Expr>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct ThrowStmt {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub argument: Box<Expr>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

/// Shared by `while` and `do ... while`.
#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct WhileStmt {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub test: Box<Expr>,
    pub body: Box<Stmt>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct ForStmt {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[serde(default)]
    pub init: Option<ForInit>,
    #[serde(default)]
    pub test: Option<Box<Expr>>,
    #[serde(default)]
    pub update: Option<Box<Expr>>,
    pub body: Box<Stmt>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

/// Shared by `for ... of` and `for ... in`; `isAwait` stays in `rest`.
#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct ForEachStmt {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub left: ForHead,
    pub right: Box<Expr>,
    pub body: Box<Stmt>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

/// Loop heads: a declaration keeps its `"type"` tag in `rest`, since these
/// enums are untagged.
#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(untagged)]
pub enum ForHead {
    Var(VarDecl),
    Pat(Pat),
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(untagged)]
pub enum ForInit {
    Var(VarDecl),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TryStmt {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub block: BlockStmt,
    #[serde(default)]
    pub handler: Option<CatchClause>,
    #[serde(default)]
    pub finalizer: Option<BlockStmt>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct CatchClause {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[serde(default)]
    pub param: Option<Pat>,
    pub body: BlockStmt,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

// ————————————————————————————————————————————————————————————————————————————
// TYPE DECLARATIONS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDecl {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub id: Ident,
    #[serde(default)]
    pub type_params: Option<TsTypeParamDecl>,
    #[serde(default)]
    pub extends: Vec<TsExprWithTypeArgs>,
    pub body: TsInterfaceBody,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsInterfaceBody {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub body: Vec<TsTypeElement>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsExprWithTypeArgs {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub expression: Box<Expr>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsTypeParamDecl {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub parameters: Vec<TsTypeParam>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsTypeParam {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub name: Ident,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TypeAliasDecl {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub id: Ident,
    #[serde(default)]
    pub type_params: Option<TsTypeParamDecl>,
    pub type_annotation: Box<TsType>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(tag = "type")]
pub enum TsTypeElement {
    #[serde(rename = "TsPropertySignature")]
    Property(TsPropertySignature),
    #[serde(rename = "TsMethodSignature")]
    Method(TsMethodSignature),
    #[serde(rename = "TsIndexSignature")]
    Index(TsIndexSignature),
    #[serde(untagged)]
    Opaque(OpaqueNode),
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsPropertySignature {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[drive(skip)]
    #[serde(default)]
    pub readonly: bool,
    pub key: Box<Expr>,
    #[drive(skip)]
    #[serde(default)]
    pub computed: bool,
    #[drive(skip)]
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub type_annotation: Option<TsTypeAnn>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsMethodSignature {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub key: Box<Expr>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsIndexSignature {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[serde(default)]
    pub type_annotation: Option<TsTypeAnn>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// `: T` wrapper (`TsTypeAnnotation`).
#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsTypeAnn {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub type_annotation: Box<TsType>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(tag = "type")]
pub enum TsType {
    #[serde(rename = "TsKeywordType")]
    Keyword(TsKeywordType),
    #[serde(rename = "TsArrayType")]
    Array(TsArrayType),
    #[serde(rename = "TsUnionType")]
    Union(TsUnionType),
    #[serde(rename = "TsIntersectionType")]
    Intersection(TsUnionType),
    #[serde(rename = "TsLiteralType")]
    Literal(TsLiteralType),
    #[serde(rename = "TsTypeReference")]
    Reference(TsTypeRef),
    #[serde(rename = "TsTypeLiteral")]
    TypeLiteral(TsTypeLit),
    #[serde(rename = "TsParenthesizedType")]
    Parenthesized(TsParenthesizedType),
    /// Function, tuple, mapped, conditional types and the like.
    #[serde(untagged)]
    Opaque(OpaqueNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TsKeywordKind {
    Any,
    Unknown,
    Number,
    Object,
    Boolean,
    Bigint,
    String,
    Symbol,
    Void,
    Undefined,
    Null,
    Never,
    Intrinsic,
}

impl fmt::Display for TsKeywordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TsKeywordKind::Any => "any",
            TsKeywordKind::Unknown => "unknown",
            TsKeywordKind::Number => "number",
            TsKeywordKind::Object => "object",
            TsKeywordKind::Boolean => "boolean",
            TsKeywordKind::Bigint => "bigint",
            TsKeywordKind::String => "string",
            TsKeywordKind::Symbol => "symbol",
            TsKeywordKind::Void => "void",
            TsKeywordKind::Undefined => "undefined",
            TsKeywordKind::Null => "null",
            TsKeywordKind::Never => "never",
            TsKeywordKind::Intrinsic => "intrinsic",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsKeywordType {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[drive(skip)]
    pub kind: TsKeywordKind,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsArrayType {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub elem_type: Box<TsType>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

/// Shared by union and intersection types.
#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsUnionType {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub types: Vec<TsType>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsLiteralType {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub literal: TsLit,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(tag = "type")]
pub enum TsLit {
    #[serde(rename = "StringLiteral")]
    Str(Str),
    #[serde(rename = "NumericLiteral")]
    Number(Number),
    #[serde(rename = "BooleanLiteral")]
    Bool(Bool),
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(tag = "type")]
pub enum TsEntityName {
    #[serde(rename = "Identifier")]
    Ident(Ident),
    #[serde(rename = "TsQualifiedName")]
    Qualified(TsQualifiedName),
}

impl fmt::Display for TsEntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TsEntityName::Ident(id) => f.write_str(&id.value),
            TsEntityName::Qualified(q) => write!(f, "{}.{}", q.left, q.right.value),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsQualifiedName {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub left: Box<TsEntityName>,
    pub right: Ident,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsTypeRef {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub type_name: TsEntityName,
    #[serde(default)]
    pub type_params: Option<TsTypeParamInstantiation>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

/// `<A, B>` at a use site (type reference or call).
#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsTypeParamInstantiation {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub params: Vec<TsType>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsTypeLit {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub members: Vec<TsTypeElement>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsParenthesizedType {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub type_annotation: Box<TsType>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

// ————————————————————————————————————————————————————————————————————————————
// EXPRESSIONS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(tag = "type")]
pub enum Expr {
    #[serde(rename = "Identifier")]
    Ident(Ident),
    #[serde(rename = "CallExpression")]
    Call(CallExpr),
    #[serde(rename = "AssignmentExpression")]
    Assign(AssignExpr),
    #[serde(rename = "MemberExpression")]
    Member(MemberExpr),
    #[serde(rename = "StringLiteral")]
    Str(Str),
    #[serde(rename = "NumericLiteral")]
    Number(Number),
    #[serde(rename = "BooleanLiteral")]
    Bool(Bool),
    #[serde(rename = "NullLiteral")]
    Null(Null),
    #[serde(rename = "ArrayExpression")]
    Array(ArrayLit),
    #[serde(rename = "ObjectExpression")]
    Object(ObjectLit),
    #[serde(rename = "ArrowFunctionExpression")]
    Arrow(ArrowExpr),
    #[serde(rename = "ParenthesisExpression")]
    Paren(ParenExpr),
    #[serde(rename = "TsAsExpression")]
    TsAs(TsAsExpr),
    #[serde(rename = "AwaitExpression")]
    Await(AwaitExpr),
    #[serde(rename = "TemplateLiteral")]
    Template(TemplateLit),
    #[serde(rename = "BinaryExpression")]
    Binary(BinaryExpr),
    #[serde(rename = "UnaryExpression")]
    Unary(UnaryExpr),
    #[serde(rename = "ConditionalExpression")]
    Cond(CondExpr),
    #[serde(rename = "NewExpression")]
    New(NewExpr),
    #[serde(untagged)]
    Opaque(OpaqueNode),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Assign(e) => e.span,
            Expr::Member(e) => e.span,
            Expr::Str(e) => e.span,
            Expr::Number(e) => e.span,
            Expr::Bool(e) => e.span,
            Expr::Null(e) => e.span,
            Expr::Array(e) => e.span,
            Expr::Object(e) => e.span,
            Expr::Arrow(e) => e.span,
            Expr::Paren(e) => e.span,
            Expr::TsAs(e) => e.span,
            Expr::Await(e) => e.span,
            Expr::Template(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Cond(e) => e.span,
            Expr::New(e) => e.span,
            Expr::Opaque(e) => e.span(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct ExprOrSpread {
    #[drive(skip)]
    #[serde(default)]
    pub spread: Option<Span>,
    pub expression: Box<Expr>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct CallExpr {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub callee: Box<Expr>,
    #[serde(default)]
    pub arguments: Vec<ExprOrSpread>,
    #[serde(default)]
    pub type_arguments: Option<TsTypeParamInstantiation>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct AssignExpr {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[drive(skip)]
    pub operator: String,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct MemberExpr {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub object: Box<Expr>,
    pub property: MemberProp,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(tag = "type")]
pub enum MemberProp {
    #[serde(rename = "Identifier")]
    Ident(Ident),
    #[serde(rename = "Computed")]
    Computed(ComputedPropName),
    /// `#private` names.
    #[serde(untagged)]
    Opaque(OpaqueNode),
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct ComputedPropName {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub expression: Box<Expr>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct ArrayLit {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub elements: Vec<Option<ExprOrSpread>>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct ObjectLit {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub properties: Vec<Prop>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(tag = "type")]
pub enum Prop {
    #[serde(rename = "KeyValueProperty")]
    KeyValue(KeyValueProp),
    /// Shorthand `{ a }`.
    #[serde(rename = "Identifier")]
    Shorthand(Ident),
    #[serde(rename = "SpreadElement")]
    Spread(SpreadElement),
    /// Methods, getters and setters.
    #[serde(untagged)]
    Opaque(OpaqueNode),
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct KeyValueProp {
    pub key: PropName,
    pub value: Box<Expr>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct SpreadElement {
    #[drive(skip)]
    #[serde(default)]
    pub spread: Span,
    pub arguments: Box<Expr>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(tag = "type")]
pub enum PropName {
    #[serde(rename = "Identifier")]
    Ident(Ident),
    #[serde(rename = "StringLiteral")]
    Str(Str),
    #[serde(rename = "NumericLiteral")]
    Number(Number),
    #[serde(rename = "Computed")]
    Computed(ComputedPropName),
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct ArrowExpr {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[serde(default)]
    pub params: Vec<Pat>,
    pub body: ArrowBody,
    #[drive(skip)]
    #[serde(default, rename = "async")]
    pub is_async: bool,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

/// SWC serializes an arrow body either as a `BlockStatement` or as a bare
/// expression node; only the block form carries `stmts`.
#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(untagged)]
pub enum ArrowBody {
    Block(BlockStmt),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct ParenExpr {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub expression: Box<Expr>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TsAsExpr {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub expression: Box<Expr>,
    pub type_annotation: Box<TsType>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct AwaitExpr {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub argument: Box<Expr>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct TemplateLit {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[serde(default)]
    pub expressions: Vec<Expr>,
    #[drive(skip)]
    #[serde(default)]
    pub quasis: Vec<Value>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct BinaryExpr {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[drive(skip)]
    pub operator: String,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct UnaryExpr {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    #[drive(skip)]
    pub operator: String,
    pub argument: Box<Expr>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct CondExpr {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub test: Box<Expr>,
    pub consequent: Box<Expr>,
    pub alternate: Box<Expr>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize, Drive, DriveMut)]
#[serde(rename_all = "camelCase")]
pub struct NewExpr {
    #[drive(skip)]
    #[serde(default)]
    pub span: Span,
    pub callee: Box<Expr>,
    #[serde(default)]
    pub arguments: Option<Vec<ExprOrSpread>>,
    #[serde(default)]
    pub type_arguments: Option<TsTypeParamInstantiation>,
    #[drive(skip)]
    #[serde(flatten)]
    pub rest: Extra,
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_swc_shaped_declarator_and_keeps_extra_fields() {
        let src = json!({
            "type": "VariableDeclaration",
            "span": { "start": 1, "end": 30, "ctxt": 0 },
            "ctxt": 2,
            "kind": "let",
            "declare": false,
            "declarations": [{
                "type": "VariableDeclarator",
                "id": {
                    "type": "Identifier",
                    "value": "c",
                    "optional": false,
                    "typeAnnotation": {
                        "type": "TsTypeAnnotation",
                        "typeAnnotation": {
                            "type": "TsTypeReference",
                            "typeName": { "type": "Identifier", "value": "Captain" },
                            "typeParams": null
                        }
                    }
                },
                "init": null,
                "definite": false
            }]
        });
        let stmt: Stmt = serde_json::from_value(src).unwrap();
        let Stmt::Var(decl) = stmt else { panic!("expected a variable declaration") };
        assert_eq!(decl.kind, VarDeclKind::Let);
        assert_eq!(decl.span, Span { start: 1, end: 30 });
        let Pat::Ident(id) = &decl.declarations[0].id else { panic!("expected an identifier pattern") };
        assert_eq!(id.value, "c");
        assert!(id.type_annotation.is_some());
        assert_eq!(decl.rest["ctxt"], 2);
        assert_eq!(decl.rest["declare"], false);
        assert_eq!(decl.declarations[0].rest["definite"], false);
    }

    #[test]
    fn unmodeled_kinds_load_as_opaque_and_write_back_verbatim() {
        let src = json!({
            "type": "ClassDeclaration",
            "span": { "start": 4, "end": 9 },
            "identifier": { "type": "Identifier", "value": "Dock" },
            "body": [],
            "declare": false
        });
        let stmt: Stmt = serde_json::from_value(src.clone()).unwrap();
        let Stmt::Opaque(node) = &stmt else { panic!("expected an opaque statement, got {stmt:?}") };
        assert_eq!(node.kind(), "ClassDeclaration");
        assert_eq!(node.span(), Span { start: 4, end: 9 });
        assert_eq!(serde_json::to_value(&stmt).unwrap(), src);

        let destructured: Pat = serde_json::from_value(json!({
            "type": "ObjectPattern", "properties": [], "optional": false
        })).unwrap();
        assert!(matches!(destructured, Pat::Opaque(_)));
    }

    #[test]
    fn async_flag_uses_the_swc_field_name() {
        let src = json!({
            "type": "ArrowFunctionExpression",
            "params": [],
            "body": { "type": "BlockStatement", "stmts": [] },
            "async": true,
            "generator": false
        });
        let expr: Expr = serde_json::from_value(src.clone()).unwrap();
        let Expr::Arrow(arrow) = &expr else { panic!("expected an arrow, got {expr:?}") };
        assert!(arrow.is_async);

        let back = serde_json::to_value(&expr).unwrap();
        assert_eq!(back["async"], true);
        assert_eq!(back["generator"], false);
        assert_eq!(back["body"]["type"], "BlockStatement");
        assert!(back.get("isAsync").is_none());
    }

    #[test]
    fn arrow_body_accepts_block_or_expression() {
        let block: ArrowBody = serde_json::from_value(json!({
            "type": "BlockStatement", "stmts": []
        })).unwrap();
        assert!(matches!(block, ArrowBody::Block(_)));

        let expr: ArrowBody = serde_json::from_value(json!({
            "type": "Identifier", "value": "x"
        })).unwrap();
        assert!(matches!(expr, ArrowBody::Expr(_)));
    }

    #[test]
    fn qualified_entity_names_display_dotted() {
        let name: TsEntityName = serde_json::from_value(json!({
            "type": "TsQualifiedName",
            "left": { "type": "Identifier", "value": "Fleet" },
            "right": { "type": "Identifier", "value": "Ship" }
        })).unwrap();
        assert_eq!(name.to_string(), "Fleet.Ship");
    }
}
