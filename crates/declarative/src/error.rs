//! Error types for plan construction

use thiserror::Error;

/// Errors raised while ordering an execution plan
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Two resources share an id
    #[error("duplicate resource id: {0}")]
    DuplicateId(String),

    /// A resource depends on an id that is not in the plan
    #[error("{resource} depends on unknown resource {dependency}")]
    UnknownDependency {
        /// The dependent resource
        resource: String,
        /// The missing dependency
        dependency: String,
    },

    /// A resource lists itself as a dependency
    #[error("{0} depends on itself")]
    SelfDependency(String),

    /// The dependency edges form a cycle
    #[error("dependency cycle between: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

/// Result type for plan operations
pub type Result<T> = std::result::Result<T, PlanError>;
