//! Moving agent initialization into a synthesized module initializer.

use crate::edit::TextEdit;
use toolsmith_syntax::{SourceUnit, Span};
use toolsmith_tools::AgentDeclaration;

/// Desugars module-level agent declarations.
///
/// `final ai:Agent helper = check new (...);` keeps everything up to the
/// variable name and becomes `final ai:Agent helper;`, followed by as many line
/// breaks as the removed initializer spanned. The initialization moves into
/// `function init() returns error? { ... }`.
#[derive(Debug, Clone)]
pub struct ModuleInitSynthesizer {
    init_function: String,
}

impl Default for ModuleInitSynthesizer {
    fn default() -> Self {
        Self::new("init")
    }
}

impl ModuleInitSynthesizer {
    /// Creates a synthesizer emitting initializers called `init_function`.
    pub fn new(init_function: impl Into<String>) -> Self {
        Self {
            init_function: init_function.into(),
        }
    }

    /// Returns the edit turning `declaration` into a declaration without an
    /// initializer.
    #[must_use]
    pub fn desugar(&self, unit: &SourceUnit, declaration: &AgentDeclaration) -> TextEdit {
        let kept = unit.slice(Span::new(declaration.span.start, declaration.name_span.end));
        let removed = unit.slice(Span::new(declaration.name_span.end, declaration.span.end));
        let replacement = format!("{kept};{}", "\n".repeat(line_breaks(removed)));
        TextEdit::replace(declaration.span, replacement)
    }

    /// Renders the initializer assigning every agent, in the given order.
    #[must_use]
    pub fn initializer(&self, agents: &[AgentDeclaration]) -> String {
        let mut function = format!("function {}() returns error? {{\n", self.init_function);
        for agent in agents {
            function.push_str("    ");
            function.push_str(&agent.statement);
            function.push('\n');
        }
        function.push_str("}\n");
        function
    }

    /// Returns the edit appending the initializer to the end of `unit`.
    #[must_use]
    pub fn append_initializer(&self, unit: &SourceUnit, agents: &[AgentDeclaration]) -> TextEdit {
        let separator = if unit.text.is_empty() || unit.text.ends_with('\n') {
            "\n"
        } else {
            "\n\n"
        };
        TextEdit::insert(
            unit.text.len(),
            format!("{separator}{}", self.initializer(agents)),
        )
    }
}

/// Counts line breaks, treating `\r\n` as one.
fn line_breaks(text: &str) -> usize {
    let bytes = text.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|&(i, &b)| b == b'\n' || (b == b'\r' && bytes.get(i + 1) != Some(&b'\n')))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::EditBuffer;
    use toolsmith_syntax::Package;
    use toolsmith_tools::{AgentDeclarationScanner, SymbolNames};

    const SOURCE: &str = "import ballerinax/ai.agent;\n\nfinal agent:Agent helper = check new (model,\n    tools = [greet]); // keep\nint after = 1;\n";

    fn agents(package: &Package) -> Vec<AgentDeclaration> {
        let names = SymbolNames::default();
        AgentDeclarationScanner::new(&names).find(&package.units()[0])
    }

    #[test]
    fn line_breaks_count_crlf_once() {
        assert_eq!(line_breaks("a\r\nb\nc\rd"), 3);
        assert_eq!(line_breaks("none"), 0);
    }

    #[test]
    fn declaration_keeps_its_lines() {
        let package = Package::from_source("main.bal", SOURCE).unwrap();
        let unit = &package.units()[0];
        let agents = agents(&package);

        let mut buffer = EditBuffer::new(&unit.text);
        buffer
            .push(ModuleInitSynthesizer::default().desugar(unit, &agents[0]))
            .unwrap();
        let output = buffer.apply().unwrap();

        assert_eq!(
            output,
            "import ballerinax/ai.agent;\n\nfinal agent:Agent helper;\n // keep\nint after = 1;\n"
        );
        assert_eq!(output.lines().count(), SOURCE.lines().count());
    }

    #[test]
    fn initializer_assigns_in_order() {
        let package = Package::from_source(
            "main.bal",
            "import ballerinax/ai.agent;\nfinal agent:Agent a = check new ();\nfinal agent:Agent b = check new (x);",
        )
        .unwrap();
        let unit = &package.units()[0];
        let synthesizer = ModuleInitSynthesizer::default();
        let edit = synthesizer.append_initializer(unit, &agents(&package));

        assert_eq!(edit.span, Span::empty(unit.text.len()));
        assert_eq!(
            edit.replacement,
            "\n\nfunction init() returns error? {\n    a = check new ();\n    b = check new (x);\n}\n"
        );
    }
}
