//! Turns operation outcomes into the single text block returned to clients.

use crate::backend::{CellValue, WorkbookMetadata};
use crate::errors::{DomainError, DomainErrorKind, RequestError};
use crate::paths::WorkbookPath;

const NO_DATA: &str = "No data found in specified range";

#[derive(Debug, Clone, PartialEq)]
pub struct Success {
    pub message: String,
}

impl Success {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn created_workbook(path: &WorkbookPath) -> Self {
        Self::message(format!("Created workbook at {path}"))
    }

    /// One JSON array per row, newline separated.
    pub fn rows(rows: &[Vec<CellValue>]) -> Self {
        if rows.is_empty() {
            return Self::message(NO_DATA);
        }
        let lines: Vec<String> = rows
            .iter()
            .map(|row| serde_json::to_string(row).unwrap_or_else(|_| "[]".to_string()))
            .collect();
        Self::message(lines.join("\n"))
    }

    pub fn metadata(metadata: &WorkbookMetadata) -> Self {
        let message = serde_json::to_string_pretty(metadata)
            .unwrap_or_else(|_| format!("{metadata:?}"));
        Self { message }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MissingParameter,
    InvalidParameter,
    UnknownTool,
    Domain(DomainErrorKind),
    /// A failure the tool reports under its own context, e.g. "reading data".
    Reported(&'static str),
    /// Anything the tool did not declare; rendered with the generic prefix.
    Unexpected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    Success(Success),
    Failure(Failure),
}

impl OperationResult {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Failure(Failure {
            kind: FailureKind::Unexpected,
            message: message.into(),
        })
    }

    pub fn reported(context: &'static str, message: impl Into<String>) -> Self {
        Self::Failure(Failure {
            kind: FailureKind::Reported(context),
            message: message.into(),
        })
    }

    pub fn render(&self) -> String {
        match self {
            Self::Success(success) => success.message.clone(),
            Self::Failure(Failure {
                kind: FailureKind::UnknownTool,
                message,
            }) => format!("Unknown tool: {message}"),
            Self::Failure(Failure {
                kind: FailureKind::Unexpected,
                message,
            }) => format!("Error executing tool: {message}"),
            Self::Failure(Failure {
                kind: FailureKind::Reported(context),
                message,
            }) => format!("Error {context}: {message}"),
            Self::Failure(Failure { message, .. }) => format!("Error: {message}"),
        }
    }
}

impl From<Success> for OperationResult {
    fn from(success: Success) -> Self {
        Self::Success(success)
    }
}

impl From<DomainError> for OperationResult {
    fn from(error: DomainError) -> Self {
        Self::Failure(Failure {
            kind: FailureKind::Domain(error.kind()),
            message: error.message().to_string(),
        })
    }
}

impl From<RequestError> for OperationResult {
    fn from(error: RequestError) -> Self {
        let kind = match &error {
            RequestError::MissingParameters { .. } => FailureKind::MissingParameter,
            RequestError::UnknownTool(name) => {
                return Self::Failure(Failure {
                    kind: FailureKind::UnknownTool,
                    message: name.clone(),
                });
            }
            RequestError::InvalidParameter { .. } | RequestError::InvalidArguments { .. } => {
                FailureKind::InvalidParameter
            }
        };
        Self::Failure(Failure {
            kind,
            message: error.to_string(),
        })
    }
}
