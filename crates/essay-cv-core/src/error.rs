//! Error types and exit codes for essay-cv
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure
//! - 2: Usage or configuration error (bad flags, unknown prompt, bad rubric)
//! - 3: Data or contract error (score outside rubric, model output shape)

mod macros;

use std::sync::Arc;
use thiserror::Error;

/// Operational context attached to a chained error.
///
/// The orchestrator records the fold, epoch and item that were being
/// processed so that failures deep into a long run can be located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// The operation being performed when the error occurred
    pub operation: String,
    /// Additional contextual key-value data
    pub metadata: Vec<(String, String)>,
}

impl ErrorContext {
    /// Create a new error context for an operation
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            metadata: Vec::new(),
        }
    }

    /// Add metadata key-value pair
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.metadata.push((key.into(), value.to_string()));
        self
    }

    /// Look up a metadata value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "operation": self.operation.clone(),
            "metadata": self
                .metadata
                .iter()
                .map(|(k, v)| serde_json::json!({"key": k, "value": v}))
                .collect::<Vec<_>>(),
        })
    }
}

/// A single entry in an error chain.
#[derive(Debug, Clone)]
pub struct ErrorChainEntry {
    /// The error message
    pub message: String,
    /// Error type identifier
    pub error_type: String,
}

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage or configuration error (2)
    Usage = 2,
    /// Data integrity or contract violation (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur during a cross-validation run
#[derive(Error, Debug)]
pub enum EssayCvError {
    // Configuration errors (exit code 2)
    #[error("unknown prompt id: {prompt_id}")]
    UnknownPrompt { prompt_id: u32 },

    #[error("invalid score range for prompt {prompt_id} item {item}: [{min}, {max}] (min must be below max, at most 1000 categories)")]
    InvalidRange {
        prompt_id: u32,
        item: String,
        min: i64,
        max: i64,
    },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("{0}")]
    UsageError(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    #[error("unsupported {context}: {value} (supported: {supported})")]
    Unsupported {
        context: String,
        value: String,
        supported: String,
    },

    // Data integrity errors (exit code 3)
    #[error("score {value} for prompt {prompt_id} item {item} is outside rubric range [{min}, {max}]")]
    ScoreOutOfRange {
        prompt_id: u32,
        item: usize,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("invalid data: {reason}")]
    InvalidData { reason: String },

    // Contract violations (exit code 3)
    #[error("model output shape mismatch: expected {expected_rows}x{expected_cols}, got {actual_rows}x{actual_cols}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to {operation} {target}: {reason}")]
    FailedOperationWithTarget {
        operation: String,
        target: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),

    /// Chained error with context and cause chain
    #[error("{message}")]
    Chained {
        /// Error message
        message: String,
        /// Error type identifier of the root cause
        error_type: String,
        /// Chain of errors leading to this one (oldest first)
        chain: Arc<Vec<ErrorChainEntry>>,
        /// Operational context when error occurred
        context: Option<ErrorContext>,
    },
}

impl EssayCvError {
    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        EssayCvError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an unsupported value
    pub fn unsupported(
        context: &str,
        value: impl std::fmt::Display,
        supported: impl std::fmt::Display,
    ) -> Self {
        EssayCvError::Unsupported {
            context: context.to_string(),
            value: value.to_string(),
            supported: supported.to_string(),
        }
    }

    /// Create an error for a failed IO operation with context
    pub fn io_operation(
        operation: &str,
        path: impl std::fmt::Display,
        error: impl std::fmt::Display,
    ) -> Self {
        EssayCvError::FailedOperationWithTarget {
            operation: operation.to_string(),
            target: path.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create a data integrity error
    pub fn invalid_data(reason: impl Into<String>) -> Self {
        EssayCvError::InvalidData {
            reason: reason.into(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            EssayCvError::Chained { error_type, .. } => exit_code_for_type(error_type),
            other => exit_code_for_type(&other.error_type()),
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> String {
        match self {
            EssayCvError::UnknownPrompt { .. } => "unknown_prompt".to_string(),
            EssayCvError::InvalidRange { .. } => "invalid_range".to_string(),
            EssayCvError::InvalidConfig { .. } => "invalid_config".to_string(),
            EssayCvError::UsageError(_) => "usage_error".to_string(),
            EssayCvError::InvalidValue { .. } => "invalid_value".to_string(),
            EssayCvError::Unsupported { .. } => "unsupported".to_string(),
            EssayCvError::ScoreOutOfRange { .. } => "score_out_of_range".to_string(),
            EssayCvError::InvalidData { .. } => "invalid_data".to_string(),
            EssayCvError::ShapeMismatch { .. } => "shape_mismatch".to_string(),
            EssayCvError::Io(_) => "io_error".to_string(),
            EssayCvError::Json(_) => "json_error".to_string(),
            EssayCvError::Toml(_) => "toml_error".to_string(),
            EssayCvError::FailedOperationWithTarget { .. } => {
                "failed_operation_with_target".to_string()
            }
            EssayCvError::Other(_) => "other".to_string(),
            EssayCvError::Chained { error_type, .. } => error_type.clone(),
        }
    }

    /// Chain this error with additional context.
    ///
    /// The root cause's error type is preserved so the exit code stays the
    /// same no matter how many layers of context are added.
    pub fn chain(self, message: impl Into<String>, context: Option<ErrorContext>) -> Self {
        let error_type = self.error_type();

        let mut chain = match &self {
            EssayCvError::Chained { chain, .. } => (**chain).clone(),
            _ => Vec::new(),
        };

        chain.push(ErrorChainEntry {
            message: self.to_string(),
            error_type: error_type.clone(),
        });

        // Outer context wins; inner metadata (e.g. the failing item) is kept
        let inner = self.error_context().cloned();
        let context = match (context, inner) {
            (Some(mut outer), Some(inner)) => {
                for (key, value) in inner.metadata {
                    if outer.get(&key).is_none() {
                        outer.metadata.push((key, value));
                    }
                }
                Some(outer)
            }
            (outer, inner) => outer.or(inner),
        };

        EssayCvError::Chained {
            message: message.into(),
            error_type,
            chain: Arc::new(chain),
            context,
        }
    }

    /// Get the error chain if this is a chained error
    pub fn error_chain(&self) -> Option<&[ErrorChainEntry]> {
        match self {
            EssayCvError::Chained { chain, .. } => Some(chain.as_ref()),
            _ => None,
        }
    }

    /// Get the error context if available
    pub fn error_context(&self) -> Option<&ErrorContext> {
        match self {
            EssayCvError::Chained { context, .. } => context.as_ref(),
            _ => None,
        }
    }

    /// Human-readable rendering including the cause chain.
    pub fn describe(&self) -> String {
        let mut out = self.to_string();
        if let Some(ctx) = self.error_context() {
            let fields: Vec<String> = ctx
                .metadata
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            if !fields.is_empty() {
                out.push_str(&format!(" ({})", fields.join(", ")));
            }
        }
        if let Some(chain) = self.error_chain() {
            for entry in chain.iter().rev() {
                out.push_str(&format!("\n  caused by: {}", entry.message));
            }
        }
        out
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        let mut error_obj = serde_json::json!({
            "code": self.exit_code() as i32,
            "type": self.error_type(),
            "message": self.to_string(),
        });

        if let EssayCvError::Chained { chain, context, .. } = self {
            let chain_array: Vec<serde_json::Value> = chain
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "type": entry.error_type.clone(),
                        "message": entry.message.clone(),
                    })
                })
                .collect();
            error_obj["chain"] = serde_json::json!(chain_array);

            if let Some(ctx) = context {
                error_obj["context"] = ctx.to_json();
            }
        }

        serde_json::json!({ "error": error_obj })
    }
}

fn exit_code_for_type(error_type: &str) -> ExitCode {
    match error_type {
        "unknown_prompt" | "invalid_range" | "invalid_config" | "usage_error"
        | "invalid_value" | "unsupported" => ExitCode::Usage,
        "score_out_of_range" | "invalid_data" | "shape_mismatch" => ExitCode::Data,
        _ => ExitCode::Failure,
    }
}

/// Result type alias for essay-cv operations
pub type Result<T> = std::result::Result<T, EssayCvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_family() {
        assert_eq!(
            EssayCvError::UnknownPrompt { prompt_id: 99 }.exit_code(),
            ExitCode::Usage
        );
        assert_eq!(
            EssayCvError::ScoreOutOfRange {
                prompt_id: 1,
                item: 0,
                value: 13,
                min: 2,
                max: 12
            }
            .exit_code(),
            ExitCode::Data
        );
        assert_eq!(
            EssayCvError::ShapeMismatch {
                expected_rows: 2,
                expected_cols: 3,
                actual_rows: 2,
                actual_cols: 2
            }
            .exit_code(),
            ExitCode::Data
        );
        assert_eq!(
            EssayCvError::Other("boom".into()).exit_code(),
            ExitCode::Failure
        );
    }

    #[test]
    fn test_chain_keeps_root_exit_code() {
        let err = EssayCvError::ShapeMismatch {
            expected_rows: 4,
            expected_cols: 3,
            actual_rows: 4,
            actual_cols: 1,
        }
        .chain(
            "evaluation failed",
            Some(
                ErrorContext::new("evaluate")
                    .with_metadata("fold", 2)
                    .with_metadata("epoch", 7),
            ),
        )
        .chain("cross-validation aborted", None);

        assert_eq!(err.exit_code(), ExitCode::Data);
        assert_eq!(err.error_type(), "shape_mismatch");
        assert_eq!(err.error_context().and_then(|c| c.get("epoch")), Some("7"));
        assert_eq!(err.error_chain().map(|c| c.len()), Some(2));
        assert!(err.describe().contains("caused by: evaluation failed"));
    }

    #[test]
    fn test_chain_merges_inner_metadata() {
        let err = EssayCvError::invalid_data("bad score")
            .chain(
                "item failed",
                Some(ErrorContext::new("descale").with_metadata("item", 2)),
            )
            .chain(
                "epoch failed",
                Some(
                    ErrorContext::new("evaluate")
                        .with_metadata("fold", 0)
                        .with_metadata("epoch", 3),
                ),
            );

        let ctx = err.error_context().unwrap();
        assert_eq!(ctx.operation, "evaluate");
        assert_eq!(ctx.get("fold"), Some("0"));
        assert_eq!(ctx.get("item"), Some("2"));
        assert!(err.describe().contains("fold=0, epoch=3, item=2"));
    }

    #[test]
    fn test_to_json_includes_context() {
        let err = EssayCvError::invalid_data("missing features").chain(
            "failed to load fold",
            Some(ErrorContext::new("load_fold").with_metadata("fold", 1)),
        );

        let json = err.to_json();
        assert_eq!(json["error"]["code"], 3);
        assert_eq!(json["error"]["type"], "invalid_data");
        assert_eq!(json["error"]["context"]["operation"], "load_fold");
        assert_eq!(json["error"]["context"]["metadata"][0]["value"], "1");
        assert_eq!(err.error_context().and_then(|c| c.get("fold")), Some("1"));
    }
}
