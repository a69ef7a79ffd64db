use crate::validation::ValidationIssue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {}", summarize_issues(.0))]
    Validation(Vec<ValidationIssue>),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Transform error: {0}")]
    Transform(String),

    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Logic error: {0}")]
    Logic(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

fn summarize_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.field, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}
