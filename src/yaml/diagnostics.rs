//! YAML error types with source locations for miette

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors raised while reading YAML input
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(YamlSyntaxError),
}

/// A YAML syntax or shape error pointing into the offending file
#[derive(Debug, Error, Diagnostic)]
#[error("{filename}: {message}")]
#[diagnostic(code(vsm::yaml::syntax))]
pub struct YamlSyntaxError {
    pub message: String,
    pub filename: String,
    /// 1-based line, when serde_yml reports one
    pub line: Option<usize>,
    /// 1-based column, when serde_yml reports one
    pub column: Option<usize>,

    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: Option<SourceSpan>,
}

impl YamlSyntaxError {
    /// Build from a serde_yml error and the content it was parsing
    pub fn from_serde_error(err: &serde_yml::Error, content: &str, filename: &str) -> Self {
        let location = err.location();
        let span = location
            .as_ref()
            .map(|loc| SourceSpan::from((loc.index().min(content.len()), 1)));

        Self {
            message: err.to_string(),
            filename: filename.to_string(),
            line: location.as_ref().map(|loc| loc.line()),
            column: location.as_ref().map(|loc| loc.column()),
            src: NamedSource::new(filename, content.to_string()),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_carries_location() {
        let content = "id: P1\nct_sec: [unclosed\n";
        let err = serde_yml::from_str::<serde_yml::Value>(content).unwrap_err();
        let diag = YamlSyntaxError::from_serde_error(&err, content, "steps.yaml");

        assert_eq!(diag.filename, "steps.yaml");
        assert!(diag.line.is_some());
        assert!(diag.to_string().starts_with("steps.yaml: "));
    }
}
