//! End-to-end compilation passes through the toolsmith plugin.

use toolsmith_plugin::{
    AnalysisContext, AnalysisTask, CompilationPass, CompilerPlugin, PassOutput, PluginConfig,
    TaskRegistry, ToolsmithPlugin,
};
use toolsmith_syntax::{DocumentKind, Package, PackageBuilder, SourceUnit};

fn run(source: &str) -> PassOutput {
    let package = Package::from_source("main.bal", source).unwrap();
    ToolsmithPlugin::default().run(&package).unwrap()
}

fn codes(output: &PassOutput) -> Vec<&'static str> {
    output
        .diagnostics
        .iter()
        .map(|diagnostic| diagnostic.code.code())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────
// 1. Tool annotations
// ─────────────────────────────────────────────────────────────────────

#[test]
fn illegal_parameters_leave_the_annotation_unchanged() {
    let output = run(
        r#"import ballerinax/ai.agent;

@agent:Tool
isolated function process(any data, map<any> anyMap) returns string {
    return "";
}
"#,
    );
    assert_eq!(codes(&output), ["AI_102", "AI_102"]);
    assert!(output.documents.is_empty());
    assert_eq!(
        output.diagnostics[0].to_string(),
        format!(
            "ERROR [AI_102] (module_0/doc_0:4:31): {}",
            output.diagnostics[0].message
        )
    );
}

#[test]
fn xml_parameters_are_reported_per_parameter() {
    let output = run(
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
    assert_eq!(codes(&output), ["AI_103", "AI_103", "AI_103"]);
}

#[test]
fn undocumented_tool_gets_a_full_annotation() {
    let output = run(
        "import ballerinax/ai.agent;\n\n@agent:Tool\nisolated function greet(string name) returns string => name;\n",
    );
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.documents.len(), 1);
    assert!(output.documents[0].text.contains(
        "@agent:Tool{name:\"greet\",description:\"greet\",parameters:{\"type\":\"object\",\"required\":[\"name\"],\"properties\":{\"name\":{\"type\":\"string\"}}}}\n"
    ));
}

#[test]
fn documented_tool_describes_its_parameters() {
    let output = run(
        r#"import ballerinax/ai.agent;

# Searches the catalog.
# + query - free text
# + maxHits - maximum number of hits
@agent:Tool
function search(string query, int maxHits = 10) returns string[]|error {
    return [];
}
"#,
    );
    assert!(output.diagnostics.is_empty());
    let text = &output.documents[0].text;
    assert!(text.contains("description:\"Searches the catalog.\""));
    assert!(text.contains("\"required\":[\"query\"]"));
    assert!(text.contains("\"query\":{\"type\":\"string\",\"description\":\"free text\"}"));
}

#[test]
fn invalid_return_type_is_reported() {
    let output = run(
        "import ballerinax/ai.agent;\n\n@agent:Tool\nfunction run(string s) returns stream<int> => s;\n",
    );
    assert_eq!(codes(&output), ["AI_104"]);
    assert!(output.documents.is_empty());
}

#[test]
fn self_referential_parameter_gets_a_bounded_schema() {
    let output = run(
        "import ballerinax/ai.agent;\ntype Tree record {| string label; Tree[] children; |};\n@agent:Tool\nfunction walk(Tree tree) {}\n",
    );
    assert!(output.diagnostics.is_empty());
    assert!(output.documents[0].text.contains(
        "\"children\":{\"type\":\"array\",\"items\":{}}"
    ));
    assert!(!output.documents[0].text.contains("parameters:()"));
}

#[test]
fn method_tools_report_without_rewriting() {
    let output = run(
        r#"import ballerinax/ai.agent;

class Assistant {
    @agent:Tool
    isolated function process(any data) returns string => "";

    @agent:Tool
    function greet(string name) returns string => name;
}
"#,
    );
    assert_eq!(codes(&output), ["AI_102"]);
    assert_eq!(
        (output.diagnostics[0].location.line(), output.diagnostics[0].location.column()),
        (5, 35)
    );
    assert!(output.documents.is_empty());
}

// ─────────────────────────────────────────────────────────────────────
// 2. Agent declarations
// ─────────────────────────────────────────────────────────────────────

#[test]
fn agents_across_documents_share_one_initializer() {
    let mut builder = PackageBuilder::new();
    let module = builder.add_module("main");
    builder
        .add_document(
            module,
            "agents.bal",
            DocumentKind::Source,
            "import ballerinax/ai.agent;\n\nfinal agent:Agent first = check new (model);\nfinal agent:Agent second = check new (model);\n",
        )
        .unwrap();
    builder
        .add_document(
            module,
            "more.bal",
            DocumentKind::Source,
            "import ballerinax/ai.agent;\n\nagent:Agent third = check new (model);\n",
        )
        .unwrap();
    let package = builder.build().unwrap();

    let output = ToolsmithPlugin::default().run(&package).unwrap();
    assert_eq!(codes(&output), ["AI_105"]);
    assert_eq!(output.diagnostics[0].location.line(), 3);

    assert_eq!(output.documents.len(), 2);
    let first = &output.documents[0].text;
    assert!(first.ends_with(
        "function init() returns error? {\n    first = check new (model);\n    second = check new (model);\n    third = check new (model);\n}\n"
    ));
    assert_eq!(
        output.documents[1].text,
        "import ballerinax/ai.agent;\n\nagent:Agent third;\n"
    );
}

#[test]
fn agent_type_from_another_package_is_left_alone() {
    let output = run("import myorg/agent;\nagent:Agent helper = new ();\n");
    assert!(output.diagnostics.is_empty());
    assert!(output.documents.is_empty());
}

#[test]
fn user_initializer_disables_desugaring() {
    let output = run(
        "import ballerinax/ai.agent;\n\nfinal agent:Agent helper = check new (model);\n\nfunction init() returns error? {}\n",
    );
    assert!(output.diagnostics.is_empty());
    assert!(output.documents.is_empty());
}

#[test]
fn test_documents_keep_their_kind() {
    let mut builder = PackageBuilder::new();
    let module = builder.add_module("main");
    builder
        .add_document(
            module,
            "tools_test.bal",
            DocumentKind::Test,
            "import ballerinax/ai.agent;\n\n@agent:Tool\nfunction probe() {}\n",
        )
        .unwrap();
    let package = builder.build().unwrap();

    let output = ToolsmithPlugin::default().run(&package).unwrap();
    assert_eq!(output.documents[0].kind, DocumentKind::Test);
}

// ─────────────────────────────────────────────────────────────────────
// 3. Positions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn diagnostics_point_at_the_rewritten_text() {
    let source = r#"import ballerinax/ai.agent;

@agent:Tool
function greet(string name) {}

agent:Agent helper = check new (model,
    tools = [greet]);

@agent:Tool
function broken(any value) {}
"#;
    let output = run(source);
    assert_eq!(codes(&output), ["AI_105", "AI_102"]);

    let text = &output.documents[0].text;
    let lines: Vec<_> = text.lines().collect();
    for diagnostic in &output.diagnostics {
        let line = diagnostic.location.line() as usize - 1;
        let column = diagnostic.location.column() as usize - 1;
        let original = source.lines().nth(line).unwrap();
        let rewritten = lines[line];
        assert_eq!(
            original.get(..column),
            rewritten.get(..column),
            "{diagnostic}"
        );
    }
    assert_eq!(lines[9], "function broken(any value) {}");
}

// ─────────────────────────────────────────────────────────────────────
// 4. Registration
// ─────────────────────────────────────────────────────────────────────

struct NameCheckTask;

impl AnalysisTask for NameCheckTask {
    fn analyze(&self, unit: &SourceUnit, ctx: &AnalysisContext<'_>) {
        assert!(!unit.text.is_empty());
        assert_eq!(ctx.names.tool_annotation, "Tool");
    }
}

struct NameCheckPlugin;

impl CompilerPlugin for NameCheckPlugin {
    fn build(&self, registry: &mut TaskRegistry) {
        registry.add_analysis_task(NameCheckTask);
    }
}

#[test]
fn plugins_compose_in_one_registry() {
    let config = PluginConfig::default();
    let mut registry = TaskRegistry::new();
    registry
        .add_plugin(&NameCheckPlugin)
        .add_plugin(&ToolsmithPlugin::new(config.clone()));
    assert_eq!(registry.task_names().len(), 5);
    assert!(registry.task_names()[0].ends_with("NameCheckTask"));

    let package = Package::from_source(
        "main.bal",
        "import ballerinax/ai.agent;\n\n@agent:Tool\nfunction ping() {}\n",
    )
    .unwrap();
    let analyzed = CompilationPass::new(&package, &config.names, &registry)
        .analyze()
        .unwrap();
    assert!(analyzed.diagnostics().is_empty());
    assert_eq!(analyzed.store().len(), 1);

    let output = analyzed.modify().unwrap();
    assert_eq!(output.documents.len(), 1);
}

#[test]
fn custom_names_change_what_is_recognized() {
    let config = PluginConfig::default().with_agent_package("acme", "bots");
    let source = "import acme/bots;\nimport ballerinax/ai.agent;\n\n@agent:Tool\nfunction a() {}\n\n@bots:Tool\nfunction b() {}\n";
    let package = Package::from_source("main.bal", source).unwrap();

    let output = ToolsmithPlugin::new(config).run(&package).unwrap();
    let text = &output.documents[0].text;
    assert!(text.contains("@agent:Tool\nfunction a() {}"));
    assert!(text.contains("@bots:Tool{name:\"b\""));
}

#[test]
fn pass_output_serializes() {
    let output = run(
        "import ballerinax/ai.agent;\n\nagent:Agent helper = check new ();\n",
    );
    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["diagnostics"][0]["code"], "ModuleLevelAgentMustBeFinal");
    assert_eq!(json["documents"][0]["kind"], "Source");
}
