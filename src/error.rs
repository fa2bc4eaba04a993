use thiserror::Error;

/// A failure reported by the guest while evaluating an expression.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum EvaluationError {
    /// The guest raised an error. The message is the guest's own description.
    #[error("{0}")]
    Raised(String),

    #[error("the expression `{expression}` produced no value")]
    NoValue { expression: String },
}

/// A malformed log message template. Offsets are byte offsets into the
/// template.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TemplateError {
    #[error("empty expression `{{}}` at offset {offset} in log message")]
    EmptyExpression { offset: usize },
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum LogMessageError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
