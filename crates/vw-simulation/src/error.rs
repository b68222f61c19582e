use vw_core::{CoreError, EntityId, EntityKind};

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised while seeding or dispatching actions.
///
/// Apart from [`SimError::InvalidConfig`], these indicate a logic defect
/// rather than a runtime condition the simulation could recover from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// A world-model invariant was violated.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An activity fired for a kind that has no activity rule.
    #[error("activity not supported for {0}")]
    UnsupportedActivity(EntityKind),

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// An event referenced an arena slot that does not exist.
    #[error("entity not found in world: {0}")]
    UnknownEntity(EntityId),
}
