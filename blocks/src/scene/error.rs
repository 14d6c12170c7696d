use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

/// A problem found while loading a scene file, located by byte span.
#[derive(Debug, Clone)]
pub struct SceneError {
    pub message: String,
    pub span: Range<usize>,
    pub file_id: usize,
    pub severity: Severity,
    pub notes: Vec<String>,
}

impl SceneError {
    pub fn error(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        SceneError {
            message: message.into(),
            span,
            file_id,
            severity: Severity::Error,
            notes: Vec::new(),
        }
    }

    pub fn warning(message: impl Into<String>, span: Range<usize>, file_id: usize) -> Self {
        SceneError {
            severity: Severity::Warning,
            ..SceneError::error(message, span, file_id)
        }
    }

    /// Wrap a TOML syntax or shape error. Errors without a location point at
    /// the start of the file.
    pub fn from_toml(err: &toml::de::Error, file_id: usize) -> Self {
        SceneError::error(err.message(), err.span().unwrap_or(0..0), file_id)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(self.severity)
            .with_message(&self.message)
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_warning() {
            write!(f, "warning: {}", self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for SceneError {}
