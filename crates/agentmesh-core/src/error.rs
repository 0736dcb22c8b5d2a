use thiserror::Error;

/// A convenience `Result` alias using [`MeshError`].
pub type MeshResult<T> = Result<T, MeshError>;

/// Top-level error type for the agentmesh coordination core.
///
/// The first three variants form the domain taxonomy: a malformed entity
/// rejected before it is stored, a reference to an unknown id, and a task
/// state-machine violation. Queue overflow is deliberately *not* an error —
/// the event queue drops and counts instead.
#[derive(Debug, Error)]
pub enum MeshError {
    /// An entity failed validation before being stored.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A task, context, or agent id that does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A task status transition outside the allowed table.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Status the task currently holds.
        from: String,
        /// Status that was requested.
        to: String,
    },

    /// A task id that is already taken.
    #[error("Task already exists: {0}")]
    DuplicateTask(String),

    /// A context id that is already taken.
    #[error("Context already exists: {0}")]
    DuplicateContext(String),

    /// An error from the orchestration engine.
    #[error("Orchestration error: {0}")]
    Orchestration(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A lower-level failure re-raised by a manager-level operation,
    /// carrying the operation name and the original cause.
    #[error("{operation} failed: {source}")]
    Operation {
        /// Name of the manager operation that failed.
        operation: String,
        /// The underlying error.
        #[source]
        source: Box<MeshError>,
    },
}

impl MeshError {
    /// Wraps this error with the name of the manager operation that hit it.
    pub fn in_operation(self, operation: impl Into<String>) -> Self {
        MeshError::Operation {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// True if this error is a [`MeshError::NotFound`], looking through any
    /// [`MeshError::Operation`] wrapping. Hosting layers use this to map to
    /// a not-found response; everything else maps to an internal error.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), MeshError::NotFound(_))
    }

    /// The innermost error, unwrapping any [`MeshError::Operation`] layers.
    pub fn root_cause(&self) -> &MeshError {
        match self {
            MeshError::Operation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
