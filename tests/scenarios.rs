//! End-to-end: SWC-shaped AST JSON in, generated module + rewritten AST out.
use martian::ast::Program;
use martian::validate::{ValidationError, validate};
use martian::{CompileError, CompileOptions, ModuleBuffer, Scoping, compile, compile_to_module};
use serde_json::{Value, json};

// ————————————————————————————————————————————————————————————————————————————
// AST BUILDERS
// ————————————————————————————————————————————————————————————————————————————

fn ident(value: &str) -> Value {
    json!({ "type": "Identifier", "value": value })
}

fn keyword(kind: &str) -> Value {
    json!({ "type": "TsKeywordType", "kind": kind })
}

fn type_ref(name: &str) -> Value {
    json!({ "type": "TsTypeReference", "typeName": ident(name), "typeParams": null })
}

fn string_lit(value: &str) -> Value {
    json!({ "type": "TsLiteralType", "literal": { "type": "StringLiteral", "value": value } })
}

fn prop(key: &str, optional: bool, ty: Value) -> Value {
    json!({
        "type": "TsPropertySignature",
        "key": ident(key),
        "computed": false,
        "optional": optional,
        "typeAnnotation": { "type": "TsTypeAnnotation", "typeAnnotation": ty }
    })
}

fn interface(name: &str, props: Vec<Value>) -> Value {
    json!({
        "type": "TsInterfaceDeclaration",
        "id": ident(name),
        "declare": false,
        "typeParams": null,
        "extends": [],
        "body": { "type": "TsInterfaceBody", "body": props }
    })
}

fn alias(name: &str, props: Vec<Value>) -> Value {
    json!({
        "type": "TsTypeAliasDeclaration",
        "id": ident(name),
        "typeAnnotation": { "type": "TsTypeLiteral", "members": props }
    })
}

fn marshal(callee: &str, type_arg: Option<&str>) -> Value {
    json!({
        "type": "CallExpression",
        "callee": ident(callee),
        "arguments": [{ "spread": null, "expression": ident("raw") }],
        "typeArguments": type_arg.map(|t| json!({ "type": "TsTypeParameterInstantiation", "params": [type_ref(t)] })),
    })
}

fn declare(kind: &str, name: &str, annotation: Option<&str>, init: Option<Value>) -> Value {
    json!({
        "type": "VariableDeclaration",
        "kind": kind,
        "declarations": [{
            "type": "VariableDeclarator",
            "id": {
                "type": "Identifier",
                "value": name,
                "optional": false,
                "typeAnnotation": annotation.map(|t| json!({ "type": "TsTypeAnnotation", "typeAnnotation": type_ref(t) })),
            },
            "init": init,
        }]
    })
}

fn assign(name: &str, right: Value) -> Value {
    json!({
        "type": "ExpressionStatement",
        "expression": { "type": "AssignmentExpression", "operator": "=", "left": ident(name), "right": right }
    })
}

fn load(body: Vec<Value>) -> Program {
    let src = json!({ "type": "Module", "span": { "start": 0, "end": 0 }, "body": body }).to_string();
    martian::path_de::program_from_str(&src).unwrap()
}

// ————————————————————————————————————————————————————————————————————————————
// FIXTURES
// ————————————————————————————————————————————————————————————————————————————

fn space_ship() -> Value {
    alias("SpaceShip", vec![
        prop("id", false, keyword("number")),
        prop("name", false, keyword("string")),
        prop("class", false, json!({
            "type": "TsUnionType",
            "types": [string_lit("freighter"), string_lit("destroyer"), string_lit("yacht")]
        })),
    ])
}

fn crew_member() -> Value {
    interface("CrewMember", vec![
        prop("id", false, keyword("number")),
        prop("name", false, keyword("string")),
        prop("nickName", true, keyword("string")),
    ])
}

fn captain() -> Value {
    interface("Captain", vec![
        prop("id", false, keyword("number")),
        prop("name", false, keyword("string")),
        prop("crewIds", false, json!({ "type": "TsArrayType", "elemType": keyword("number") })),
    ])
}

fn marshal_import() -> Value {
    json!({
        "type": "ImportDeclaration",
        "specifiers": [{ "type": "ImportDefaultSpecifier", "local": ident("$marshal") }],
        "source": { "type": "StringLiteral", "value": "./marshal" },
        "typeOnly": false
    })
}

/// The stub declaration, two declarations, a template-literal payload and both
/// call forms, as a user's entry file has them.
fn thing_program() -> Program {
    let stub = json!({
        "type": "FunctionDeclaration",
        "identifier": ident("$marshal"),
        "declare": false,
        "params": [{
            "type": "Parameter",
            "decorators": [],
            "pat": {
                "type": "Identifier",
                "value": "src",
                "optional": false,
                "typeAnnotation": { "type": "TsTypeAnnotation", "typeAnnotation": keyword("any") }
            }
        }],
        "decorators": [],
        "body": {
            "type": "BlockStatement",
            "stmts": [
                {
                    "type": "ThrowStatement",
                    "argument": {
                        "type": "NewExpression",
                        "callee": ident("Error"),
                        "arguments": [{ "spread": null, "expression": {
                            "type": "StringLiteral",
                            "value": "marshal has not been replaced for this callsite",
                            "raw": "\"marshal has not been replaced for this callsite\""
                        } }],
                        "typeArguments": null
                    }
                },
                {
                    "type": "ReturnStatement",
                    "argument": {
                        "type": "TsAsExpression",
                        "expression": ident("undefined"),
                        "typeAnnotation": type_ref("T")
                    }
                }
            ]
        },
        "generator": false,
        "async": false,
        "typeParameters": {
            "type": "TsTypeParameterDeclaration",
            "parameters": [{ "type": "TsTypeParameter", "name": ident("T"), "in": false, "out": false }]
        },
        "returnType": { "type": "TsTypeAnnotation", "typeAnnotation": type_ref("T") }
    });
    let raw_thing = json!({
        "type": "TemplateLiteral",
        "expressions": [],
        "quasis": [{
            "type": "TemplateElement",
            "tail": true,
            "cooked": "{\n  \"id\": 1,\n  \"name\": \"Test\"\n}",
            "raw": "{\n  \"id\": 1,\n  \"name\": \"Test\"\n}"
        }]
    });
    let mut thing_type = marshal("$marshal", Some("ThingType"));
    thing_type["arguments"][0]["expression"] = ident("rawThing");
    let mut thing_interface = marshal("$marshal", None);
    thing_interface["arguments"][0]["expression"] = ident("rawThing");

    load(vec![
        stub,
        interface("ThingInterface", vec![prop("id", false, keyword("number")), prop("name", false, keyword("string"))]),
        alias("ThingType", vec![prop("id", false, keyword("number")), prop("name", false, keyword("string"))]),
        declare("const", "rawThing", None, Some(raw_thing)),
        declare("const", "thingInterface", Some("ThingInterface"), Some(thing_interface)),
        declare("const", "thingType", None, Some(thing_type)),
    ])
}

fn fleet_program() -> Program {
    load(vec![
        marshal_import(),
        json!({ "type": "ExportDeclaration", "declaration": space_ship() }),
        crew_member(),
        captain(),
        declare("const", "ship", None, Some(marshal("$marshal", Some("SpaceShip")))),
        declare("const", "chewie", Some("CrewMember"), Some(marshal("$marshal", None))),
        declare("let", "c", Some("Captain"), None),
        assign("c", marshal("$marshal", None)),
    ])
}

// ————————————————————————————————————————————————————————————————————————————
// SCENARIOS
// ————————————————————————————————————————————————————————————————————————————

#[test]
fn fleet_module_has_one_validator_per_declaration_in_order() {
    let mut module = ModuleBuffer::new();
    let compiled = compile(fleet_program(), &CompileOptions::default(), &mut module).unwrap();

    assert_eq!(
        module.names().collect::<Vec<_>>(),
        ["marshalSpaceShip", "marshalCrewMember", "marshalCaptain"]
    );
    let src = module.as_str();
    assert!(src.starts_with("// This file is generated"), "{src}");
    let ship = src.find("export function marshalSpaceShip(").unwrap();
    let crew = src.find("export function marshalCrewMember(").unwrap();
    let captain = src.find("export function marshalCaptain(").unwrap();
    assert!(ship < crew && crew < captain);
    assert!(src.contains(r#"throw new UnexpectedProperty("SpaceShip");"#));
    assert!(src.contains("  if (!isNullish(input[\"nickName\"])) {\n    isString(input[\"nickName\"]);\n  }\n"));
    assert!(src.contains(r#"  isArray(input["crewIds"], isNumber);"#));

    let targets: Vec<_> = compiled.rewritten.iter().map(|r| r.type_name.as_str()).collect();
    assert_eq!(targets, ["SpaceShip", "CrewMember", "Captain"]);
}

#[test]
fn rewritten_tree_addresses_validators_through_the_namespace_import() {
    let mut module = ModuleBuffer::new();
    let compiled = compile(fleet_program(), &CompileOptions::default(), &mut module).unwrap();
    let tree = serde_json::to_value(&compiled.program).unwrap();

    assert_eq!(tree["body"][0]["specifiers"][0]["type"], "ImportNamespaceSpecifier");
    assert_eq!(tree["body"][0]["specifiers"][0]["local"]["value"], "$marshal");

    let captain_call = &tree["body"][7]["expression"]["right"];
    assert_eq!(captain_call["callee"]["type"], "MemberExpression");
    assert_eq!(captain_call["callee"]["object"]["value"], "$marshal");
    assert_eq!(captain_call["callee"]["property"]["value"], "marshalCaptain");
    assert_eq!(captain_call["arguments"][0]["expression"]["value"], "raw");
}

#[test]
fn generated_definitions_validate_sample_data() {
    let mut module = ModuleBuffer::new();
    let compiled = compile(fleet_program(), &CompileOptions::default(), &mut module).unwrap();
    let [ship, crew, captain] = &compiled.definitions[..] else {
        panic!("expected three definitions, got {:?}", compiled.definitions);
    };

    let falcon = json!({ "id": 1, "name": "Millenium Falcon", "class": "freighter" });
    assert_eq!(validate(ship, falcon.clone()).unwrap(), falcon);
    let crowded = json!({ "id": 1, "name": "Millenium Falcon", "class": "freighter", "crew": 5 });
    assert_eq!(validate(ship, crowded), Err(ValidationError::UnexpectedProperty("SpaceShip".into())));
    assert!(validate(ship, json!({ "id": 1, "name": "x", "class": "yachts" })).is_err());

    assert!(validate(crew, json!({ "id": 2, "name": "Chewbacca" })).is_ok());
    assert!(validate(crew, json!({ "id": 2, "name": "Chewbacca", "species": "wookiee" })).is_ok());
    assert!(matches!(
        validate(crew, json!({ "id": 2, "name": "Chewbacca", "nickName": 7 })),
        Err(ValidationError::TypeMismatch { ref property, .. }) if property == "nickName"
    ));

    assert!(validate(captain, json!({ "id": 3, "name": "Han", "crewIds": [1, 2] })).is_ok());
    assert!(matches!(
        validate(captain, json!({ "id": 3, "name": "Han", "crewIds": [1, "x"] })),
        Err(ValidationError::ElementValidationFailed { index: 1, .. })
    ));
}

#[test]
fn entry_file_with_stub_and_template_literal_compiles() {
    let before = serde_json::to_value(thing_program()).unwrap();
    let module = compile_to_module([thing_program()], &CompileOptions::default()).unwrap();
    let compiled = &module.programs[0];

    let targets: Vec<_> = compiled.rewritten.iter().map(|r| r.validator.as_str()).collect();
    assert_eq!(targets, ["marshalThingInterface", "marshalThingType"]);
    assert!(module.source.contains("export function marshalThingInterface("));
    assert!(module.source.contains("export function marshalThingType("));

    let tree = serde_json::to_value(&compiled.program).unwrap();
    // untouched parts come back exactly as they went in
    assert_eq!(tree["body"][0], before["body"][0]);
    assert_eq!(tree["body"][3], before["body"][3]);
    assert_eq!(tree["body"][3]["declarations"][0]["init"]["quasis"][0]["type"], "TemplateElement");

    let interface_call = &tree["body"][4]["declarations"][0]["init"];
    assert_eq!(interface_call["callee"]["property"]["value"], "marshalThingInterface");
    assert_eq!(interface_call["arguments"][0]["expression"]["value"], "rawThing");
    let type_call = &tree["body"][5]["declarations"][0]["init"];
    assert_eq!(type_call["callee"]["property"]["value"], "marshalThingType");
    assert_eq!(type_call["typeArguments"]["params"][0]["typeName"]["value"], "ThingType");
}

#[test]
fn unresolved_call_fails_the_whole_compile() {
    let program = load(vec![captain(), declare("const", "c", None, Some(marshal("$marshal", None)))]);
    let err = compile_to_module([program], &CompileOptions::default()).unwrap_err();
    assert!(matches!(err, CompileError::UnresolvedMarshalTarget { ref callee, .. } if callee == "$marshal"));
}

#[test]
fn literal_union_with_reference_arm_is_unmappable() {
    let program = load(vec![alias("Dock", vec![prop("ship", false, json!({
        "type": "TsUnionType",
        "types": [string_lit("none"), type_ref("SpaceShip")]
    }))])]);
    let err = compile_to_module([program], &CompileOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnmappableType { ref type_name, ref property, .. } if type_name == "Dock" && property == "ship"
    ));
}

#[test]
fn shadowed_binding_depends_on_scoping_mode() {
    let body = || {
        vec![
            declare("let", "x", Some("Captain"), None),
            json!({ "type": "BlockStatement", "stmts": [declare("let", "x", Some("CrewMember"), None)] }),
            assign("x", marshal("$marshal", None)),
        ]
    };
    let flat = compile_to_module([load(body())], &CompileOptions::default()).unwrap();
    assert_eq!(flat.programs[0].rewritten[0].type_name, "CrewMember");

    let options = CompileOptions { scoping: Scoping::Lexical, ..CompileOptions::default() };
    let lexical = compile_to_module([load(body())], &options).unwrap();
    assert_eq!(lexical.programs[0].rewritten[0].type_name, "Captain");
}

#[test]
fn programs_share_one_module_but_not_bindings() {
    let first = load(vec![captain(), declare("let", "c", Some("Captain"), None)]);
    let second = load(vec![crew_member(), assign("c", marshal("$marshal", None))]);
    let err = compile_to_module([first, second], &CompileOptions::default()).unwrap_err();
    assert!(matches!(err, CompileError::UnresolvedMarshalTarget { .. }));

    let module = compile_to_module(
        [load(vec![captain()]), load(vec![crew_member()])],
        &CompileOptions::default(),
    )
    .unwrap();
    assert_eq!(module.source.matches("// GENERATED MARSHALERS").count(), 1);
    assert!(module.source.contains("export function marshalCaptain("));
    assert!(module.source.contains("export function marshalCrewMember("));
}

#[test]
fn same_type_declared_twice_is_rejected() {
    let err = compile_to_module(
        [load(vec![captain()]), load(vec![captain()])],
        &CompileOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::DuplicateValidator(ref name) if name == "marshalCaptain"));
}

#[test]
fn generation_is_deterministic() {
    let a = compile_to_module([fleet_program()], &CompileOptions::default()).unwrap();
    let b = compile_to_module([fleet_program()], &CompileOptions::default()).unwrap();
    assert_eq!(a.source, b.source);
}

#[test]
fn invalid_options_are_rejected_before_compiling() {
    let options = CompileOptions { stub_ident: "not valid".into(), ..CompileOptions::default() };
    let err = compile_to_module([fleet_program()], &options).unwrap_err();
    assert!(matches!(err, CompileError::InvalidOption { option: "stub_ident", .. }));
}
