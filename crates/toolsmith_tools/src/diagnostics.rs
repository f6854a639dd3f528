//! Diagnostics reported while analyzing tool functions and agent declarations.
//!
//! Problems in user code are never Rust errors. Each one becomes a
//! [`Diagnostic`] collected in a [`DiagnosticSink`]; analysis carries on and
//! rewriting still runs.

use core::fmt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use toolsmith_syntax::Location;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// The compilation fails.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("ERROR"),
        }
    }
}

/// Every diagnostic this plugin can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// No parameter schema could be generated for a tool.
    UnableToGenerateSchemaForFunction,
    /// A tool parameter is not a subtype of `anydata`.
    ParameterIsNotASubtypeOfAnydata,
    /// A tool parameter reaches `xml`.
    XmlParameterNotSupportedByTool,
    /// A tool returns something other than `anydata|error`.
    InvalidReturnTypeInTool,
    /// A module-level agent is not declared `final`.
    ModuleLevelAgentMustBeFinal,
}

impl DiagnosticCode {
    /// Returns the stable code, such as `AI_101`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnableToGenerateSchemaForFunction => "AI_101",
            Self::ParameterIsNotASubtypeOfAnydata => "AI_102",
            Self::XmlParameterNotSupportedByTool => "AI_103",
            Self::InvalidReturnTypeInTool => "AI_104",
            Self::ModuleLevelAgentMustBeFinal => "AI_105",
        }
    }

    /// Returns the message template. `{0}`, `{1}` are positional arguments.
    #[must_use]
    pub fn template(&self) -> &'static str {
        match self {
            Self::UnableToGenerateSchemaForFunction => {
                "failed to generate the parameter schema definition for the function '{0}'. \
                 Specify the parameter schema manually using the `@ai:Tool` annotation's \
                 parameter field."
            }
            Self::ParameterIsNotASubtypeOfAnydata => {
                "the function '{0}' has a parameter '{1}' that is not a subtype of `anydata`. \
                 Only `anydata` types are allowed in a tool."
            }
            Self::XmlParameterNotSupportedByTool => {
                "the function '{0}' has a parameter '{1}' that includes the type xml, either \
                 as its type or within its fields, which is not supported by the tool."
            }
            Self::InvalidReturnTypeInTool => {
                "the return type of the function '{0}' is not a subtype of `anydata|error`. \
                 The tool must return a value of type `anydata`."
            }
            Self::ModuleLevelAgentMustBeFinal => {
                "the module level agent '{0}' must be declared as `final`."
            }
        }
    }

    /// Returns the severity diagnostics with this code are reported at.
    #[must_use]
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A reported problem with its rendered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What was reported.
    pub code: DiagnosticCode,
    /// The template with its arguments filled in.
    pub message: String,
    /// Severity of the problem.
    pub severity: Severity,
    /// Where the problem is.
    pub location: Location,
}

impl Diagnostic {
    /// Creates a diagnostic, filling `{0}`, `{1}`, ... in the code's template
    /// from `args`.
    #[must_use]
    pub fn new(code: DiagnosticCode, location: Location, args: &[&str]) -> Self {
        let mut message = code.template().to_string();
        for (index, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{index}}}"), arg);
        }
        Self {
            code,
            message,
            severity: code.severity(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] ({}): {}",
            self.severity, self.code, self.location, self.message
        )
    }
}

/// Pass-wide, append-only collection of diagnostics.
///
/// Safe to report into from several analysis threads at once.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic.
    pub fn report(&self, diagnostic: Diagnostic) {
        tracing::debug!(
            code = diagnostic.code.code(),
            location = %diagnostic.location,
            "reported diagnostic"
        );
        self.diagnostics.lock().push(diagnostic);
    }

    /// Returns the number of diagnostics reported so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    /// Returns true if nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }

    /// Returns a copy of every diagnostic, ordered by document and offset.
    ///
    /// Diagnostics at the same position keep the order they were reported in.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics.lock().clone();
        sort_by_position(&mut diagnostics);
        diagnostics
    }

    /// Consumes the sink, returning every diagnostic ordered like
    /// [`snapshot`](Self::snapshot).
    #[must_use]
    pub fn into_sorted(self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics.into_inner();
        sort_by_position(&mut diagnostics);
        diagnostics
    }
}

fn sort_by_position(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by_key(|d| (d.location.document, d.location.span.start));
}
