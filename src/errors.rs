use std::fmt;
use thiserror::Error;

/// Closed set of failure categories a backend operation may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainErrorKind {
    Validation,
    Workbook,
    Sheet,
    Data,
    Formatting,
    Calculation,
    Pivot,
    Chart,
}

impl DomainErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Workbook => "workbook",
            Self::Sheet => "sheet",
            Self::Data => "data",
            Self::Formatting => "formatting",
            Self::Calculation => "calculation",
            Self::Pivot => "pivot",
            Self::Chart => "chart",
        }
    }
}

impl fmt::Display for DomainErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Workbook(String),
    #[error("{0}")]
    Sheet(String),
    #[error("{0}")]
    Data(String),
    #[error("{0}")]
    Formatting(String),
    #[error("{0}")]
    Calculation(String),
    #[error("{0}")]
    Pivot(String),
    #[error("{0}")]
    Chart(String),
}

impl DomainError {
    pub fn kind(&self) -> DomainErrorKind {
        match self {
            Self::Validation(_) => DomainErrorKind::Validation,
            Self::Workbook(_) => DomainErrorKind::Workbook,
            Self::Sheet(_) => DomainErrorKind::Sheet,
            Self::Data(_) => DomainErrorKind::Data,
            Self::Formatting(_) => DomainErrorKind::Formatting,
            Self::Calculation(_) => DomainErrorKind::Calculation,
            Self::Pivot(_) => DomainErrorKind::Pivot,
            Self::Chart(_) => DomainErrorKind::Chart,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m)
            | Self::Workbook(m)
            | Self::Sheet(m)
            | Self::Data(m)
            | Self::Formatting(m)
            | Self::Calculation(m)
            | Self::Pivot(m)
            | Self::Chart(m) => m,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn workbook(message: impl Into<String>) -> Self {
        Self::Workbook(message.into())
    }

    pub fn sheet(message: impl Into<String>) -> Self {
        Self::Sheet(message.into())
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::Data(message.into())
    }

    pub fn formatting(message: impl Into<String>) -> Self {
        Self::Formatting(message.into())
    }

    pub fn calculation(message: impl Into<String>) -> Self {
        Self::Calculation(message.into())
    }

    pub fn pivot(message: impl Into<String>) -> Self {
        Self::Pivot(message.into())
    }

    pub fn chart(message: impl Into<String>) -> Self {
        Self::Chart(message.into())
    }
}

pub type BackendResult<T> = Result<T, DomainError>;

/// Failures detected while decoding a tool call, before any backend work.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Missing required parameters")]
    MissingParameters {
        tool: &'static str,
        names: Vec<&'static str>,
    },
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid parameter '{name}': expected {expected}")]
    InvalidParameter {
        tool: &'static str,
        name: &'static str,
        expected: &'static str,
    },
    #[error("Invalid arguments: {message}")]
    InvalidArguments { tool: &'static str, message: String },
}
