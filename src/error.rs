//! Error taxonomy for discovery, binding, argument resolution and dispatch.
//!
//! Every variant is terminal for a run: the dispatcher prints it and exits
//! with a failure status. `HelpRequested` is the one exception and is turned
//! into a task usage listing.

use crate::parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Failed to read source file {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in source file\n{0}")]
    Parse(#[from] Box<ParseError>),

    #[error("Task {task}: parameter `{param}` has unsupported signature: {reason}")]
    UnsupportedSignature {
        task: String,
        param: String,
        reason: String,
    },

    #[error("Unsupported parameter type `{ty}` (expected String, an integer type or bool)")]
    UnsupportedType { ty: String },

    #[error("Duplicate task name `{name}`")]
    DuplicateTaskName { name: String },

    #[error("Bad command arguments: {reason}")]
    Argument { token: String, reason: String },

    #[error("Cannot convert {value:?} for parameter `{param}` to {expected}: {reason}")]
    Conversion {
        param: String,
        value: String,
        expected: &'static str,
        reason: String,
    },

    #[error("Task {task}: required parameter `{param}` is a bool; bools can only be passed as flags")]
    UnsupportedPositionalType { task: String, param: String },

    #[error("Cannot derive a task name from `{type_name}`; register closures with an explicit name")]
    AnonymousHandler { type_name: String },

    #[error("Task not found: {name}")]
    TaskNotFound { name: String },

    #[error("Task {task} is declared but no function was registered for it")]
    Binding { task: String },

    #[error("Task {task} could not be invoked: {reason}")]
    Invocation { task: String, reason: String },

    #[error("Task {task} failed: {message}")]
    TaskFailed { task: String, message: String },

    #[error("Help requested for task {task}")]
    HelpRequested { task: String },

    #[error(transparent)]
    Cli(#[from] clap::Error),
}

impl From<ParseError> for TaskError {
    fn from(error: ParseError) -> Self {
        Self::Parse(Box::new(error))
    }
}

impl TaskError {
    pub(crate) fn argument(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Argument {
            token: token.into(),
            reason: reason.into(),
        }
    }
}
