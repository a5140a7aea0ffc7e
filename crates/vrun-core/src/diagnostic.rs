use crate::error::{ErrorKind, RunnerError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    Warning,
}

/// Outcome of a single validator check.
///
/// Every error this engine defines is fatal; warnings only flag likely typos
/// and never change whether a run may start.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    Fatal(RunnerError),
    Warning { kind: ErrorKind, message: String },
}

impl Diagnostic {
    pub fn warning(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Warning {
            kind,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Fatal(_) => Severity::Fatal,
            Self::Warning { .. } => Severity::Warning,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fatal(err) => err.kind(),
            Self::Warning { kind, .. } => *kind,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Fatal(err) => err.to_string(),
            Self::Warning { message, .. } => message.clone(),
        }
    }

    /// Line(s) as written to the error stream.
    ///
    /// Pre-flight failures use `Error:`, post-run threshold failures `ERROR:`.
    pub fn render(&self) -> String {
        match self {
            Self::Fatal(err) if err.is_post_run() => format!("ERROR: {err}"),
            Self::Fatal(err) => format!("Error: {err}"),
            Self::Warning { message, .. } => format!("warning: {message}"),
        }
    }
}

impl From<RunnerError> for Diagnostic {
    fn from(err: RunnerError) -> Self {
        Self::Fatal(err)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}
