//! Integration tests for tool analysis over parsed packages.

use toolsmith_syntax::{DocumentKind, Package, PackageBuilder};
use toolsmith_tools::{
    AgentDeclarationScanner, AnnotationSite, ConfigStore, DiagnosticCode, DiagnosticSink,
    InitFunctionScanner, ModuleInitTracking, SymbolNames, ToolValidator,
};

struct Analyzed {
    package: Package,
    sink: DiagnosticSink,
    store: ConfigStore,
}

fn analyze(source: &str) -> Analyzed {
    let package = Package::from_source("main.bal", source).unwrap();
    let sink = DiagnosticSink::new();
    let store = ConfigStore::new();
    let names = SymbolNames::default();
    let semantics = package.semantics();
    for unit in package.units() {
        ToolValidator::new(&semantics, &names).analyze_unit(unit, &sink, &store);
        AgentDeclarationScanner::new(&names).scan(unit, &sink, &store);
    }
    Analyzed {
        package,
        sink,
        store,
    }
}

fn codes(analyzed: &Analyzed) -> Vec<&'static str> {
    codes_of(&analyzed.sink)
}

fn codes_of(sink: &DiagnosticSink) -> Vec<&'static str> {
    sink.snapshot()
        .iter()
        .map(|diagnostic| diagnostic.code.code())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────
// 1. Parameter legality
// ─────────────────────────────────────────────────────────────────────

#[test]
fn non_anydata_parameters_block_configuration() {
    let analyzed = analyze(
        r#"import ballerinax/ai.agent;

@agent:Tool
isolated function process(any data, map<any> anyMap) returns string {
    return "";
}
"#,
    );
    assert_eq!(codes(&analyzed), ["AI_102", "AI_102"]);
    assert!(analyzed.store.is_empty());

    let diagnostics = analyzed.sink.snapshot();
    assert_eq!(
        (diagnostics[0].location.line(), diagnostics[0].location.column()),
        (4, 31)
    );
    assert!(diagnostics[0].message.contains("'process'"));
    assert!(diagnostics[0].message.contains("'data'"));
}

#[test]
fn xml_bearing_parameters() {
    let analyzed = analyze(
        r#"import ballerinax/ai.agent;

type RecordWithXmlField record {|
    string name;
    xml content;
|};

@agent:Tool
function ingest(xml one, xml[] two, RecordWithXmlField three) {
}
"#,
    );
    assert_eq!(codes(&analyzed), ["AI_103", "AI_103", "AI_103"]);
    let messages: Vec<_> = analyzed
        .sink
        .snapshot()
        .into_iter()
        .map(|diagnostic| diagnostic.message)
        .collect();
    assert!(messages[2].contains("'three'"));
}

// ─────────────────────────────────────────────────────────────────────
// 2. Recognition
// ─────────────────────────────────────────────────────────────────────

#[test]
fn only_the_agent_package_tool_annotation_is_analyzed() {
    let analyzed = analyze(
        r#"import ballerinax/ai.agent;
import my/tools;

@tools:Tool
function a(any x) {}

@Tool
function b(any x) {}

@agent:Tool
function c(string x) {}
"#,
    );
    assert!(analyzed.sink.is_empty());
    assert_eq!(analyzed.store.len(), 1);

    let unit = &analyzed.package.units()[0];
    let function = unit.functions().nth(2).unwrap();
    let site = AnnotationSite::of(unit, &function.annotations[0]);
    assert_eq!(analyzed.store.tool_config(site).unwrap().name, "\"c\"");
}

#[test]
fn unimported_agent_package_is_not_recognized() {
    let analyzed = analyze("@agent:Tool\nfunction a(any x) {}\n");
    assert!(analyzed.sink.is_empty());
    assert!(analyzed.store.is_empty());
}

// ─────────────────────────────────────────────────────────────────────
// 3. Configuration
// ─────────────────────────────────────────────────────────────────────

#[test]
fn generated_configuration() {
    let analyzed = analyze(
        r#"import ballerinax/ai.agent;

# Sends a "greeting".
# + name - who to greet
# + polite - whether to say please
@agent:Tool {name: "hello"}
function greet(string name, boolean polite = true) returns string|error => name;
"#,
    );
    assert!(analyzed.sink.is_empty());

    let unit = &analyzed.package.units()[0];
    let state = analyzed.store.take(unit.id).unwrap();
    let config = state.annotations.values().next().unwrap();
    assert_eq!(config.name, "\"hello\"");
    assert_eq!(config.description.as_deref(), Some(r#""Sends a \"greeting\".""#));
    assert_eq!(
        config.parameter_schema,
        r#"{"type":"object","required":["name"],"properties":{"name":{"type":"string","description":"who to greet"},"polite":{"type":"boolean","description":"whether to say please"}}}"#
    );
}

#[test]
fn linked_list_parameters_unfold_once() {
    let analyzed = analyze(
        r#"import ballerinax/ai.agent;

type Node record {|
    string value;
    Node? next;
|};

@agent:Tool
function walk(Node head, Node tail) {}
"#,
    );
    assert!(analyzed.sink.is_empty());

    let unit = &analyzed.package.units()[0];
    let state = analyzed.store.take(unit.id).unwrap();
    let schema = &state.annotations.values().next().unwrap().parameter_schema;
    let node = r#"{"type":"object","required":["value","next"],"properties":{"value":{"type":"string"},"next":{"oneOf":[{},{"type":"null"}]}}}"#;
    assert_eq!(
        schema,
        &format!(r#"{{"type":"object","required":["head","tail"],"properties":{{"head":{node},"tail":{node}}}}}"#)
    );
}

// ─────────────────────────────────────────────────────────────────────
// 4. Class methods
// ─────────────────────────────────────────────────────────────────────

#[test]
fn method_tools_are_checked() {
    let analyzed = analyze(
        r#"import ballerinax/ai.agent;

class Toolbox {
    @agent:Tool
    function inspect(any value) returns string => "";

    @agent:Tool
    isolated function fetch(string url) returns stream<string> => new;
}
"#,
    );
    assert_eq!(codes(&analyzed), ["AI_102", "AI_104"]);
    let diagnostics = analyzed.sink.snapshot();
    assert_eq!(
        (diagnostics[0].location.line(), diagnostics[0].location.column()),
        (5, 26)
    );
    assert!(diagnostics[0].message.contains("'inspect'"));
}

#[test]
fn valid_method_tools_are_not_recorded() {
    let analyzed = analyze(
        r#"import ballerinax/ai.agent;

class Toolbox {
    @agent:Tool
    function lookup(string key) returns string => key;
}
"#,
    );
    assert!(analyzed.sink.is_empty());
    assert!(analyzed.store.is_empty());
}

// ─────────────────────────────────────────────────────────────────────
// 5. Module scans
// ─────────────────────────────────────────────────────────────────────

#[test]
fn agents_across_documents_of_a_module() {
    let mut builder = PackageBuilder::new();
    let module = builder.add_module("main");
    builder
        .add_document(
            module,
            "agents.bal",
            DocumentKind::Source,
            "import ballerinax/ai.agent;\nfinal agent:Agent a = check new ();\n",
        )
        .unwrap();
    builder
        .add_document(
            module,
            "more.bal",
            DocumentKind::Source,
            "import ballerinax/ai.agent as ai;\nai:Agent b = check new ();\nfunction init() {}\n",
        )
        .unwrap();
    let package = builder.build().unwrap();

    let names = SymbolNames::default();
    let sink = DiagnosticSink::new();
    let store = ConfigStore::new();
    let tracking = ModuleInitTracking::new();
    for unit in package.units() {
        AgentDeclarationScanner::new(&names).scan(unit, &sink, &store);
        InitFunctionScanner::new(&names).scan(unit, &tracking);
    }

    let agents: Vec<_> = store
        .agents_in_module(module)
        .into_iter()
        .map(|agent| agent.statement)
        .collect();
    assert_eq!(agents, ["a = check new ();", "b = check new ();"]);
    assert_eq!(codes_of(&sink), ["AI_105"]);
    assert!(tracking.has_user_defined(module));
    assert!(!tracking.claim_synthesis(module));
}

// ─────────────────────────────────────────────────────────────────────
// 6. Properties
// ─────────────────────────────────────────────────────────────────────

mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// `required` holds exactly the parameters without defaults, in
        /// declaration order; `properties` holds every parameter in
        /// declaration order.
        #[test]
        fn required_lists_non_defaulted_parameters(defaults in prop::collection::vec(any::<bool>(), 1..8usize)) {
            let params: Vec<String> = defaults
                .iter()
                .enumerate()
                .map(|(i, has_default)| {
                    if *has_default {
                        format!("int p{i} = {i}")
                    } else {
                        format!("string p{i}")
                    }
                })
                .collect();
            let source = format!(
                "import ballerinax/ai.agent;\n@agent:Tool\nfunction f({}) {{}}\n",
                params.join(", ")
            );
            let analyzed = analyze(&source);
            prop_assert!(analyzed.sink.is_empty());

            let unit = &analyzed.package.units()[0];
            let state = analyzed.store.take(unit.id).unwrap();
            let config = state.annotations.values().next().unwrap();
            let schema: serde_json::Value = serde_json::from_str(&config.parameter_schema).unwrap();

            let expected_required: Vec<String> = defaults
                .iter()
                .enumerate()
                .filter(|(_, has_default)| !**has_default)
                .map(|(i, _)| format!("p{i}"))
                .collect();
            let required: Vec<String> = schema["required"]
                .as_array()
                .unwrap()
                .iter()
                .map(|name| name.as_str().unwrap().to_string())
                .collect();
            prop_assert_eq!(required, expected_required);

            let properties: Vec<String> = schema["properties"]
                .as_object()
                .unwrap()
                .keys()
                .cloned()
                .collect();
            let expected_properties: Vec<String> = (0..defaults.len()).map(|i| format!("p{i}")).collect();
            prop_assert_eq!(properties, expected_properties);
        }
    }
}
