//! Error types for the flow engine

use thiserror::Error;

/// Result type alias using FlowEngineError
pub type Result<T> = std::result::Result<T, FlowEngineError>;

/// Errors that can occur in the flow engine
///
/// Most authoring failures (invalid connections, protected deletions,
/// blank renames) are rejected mutations reported through the console sink
/// and never surface here. This enum covers the remainder: external
/// collaborators failing and malformed template recipes.
#[derive(Debug, Error)]
pub enum FlowEngineError {
    /// The external id provider failed
    #[error("Id provider error: {0}")]
    Identity(#[from] tapflow_runtime_identity::IdentityError),

    /// A template edge referenced a node index outside the recipe
    #[error("Template '{template}' edge references node index {index} out of range")]
    TemplateEdge { template: String, index: usize },
}
