use crate::entity::EntityKind;
use crate::point::Point;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the world model and entity accessors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Strict placement onto an in-bounds cell that already holds an entity.
    #[error("position occupied: {0}")]
    OccupiedPosition(Point),

    /// Grid dimensions whose cell count overflows or whose coordinates do not
    /// fit in a [`Point`].
    #[error("grid of {rows}x{cols} cells is too large")]
    GridTooLarge {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
    },

    /// An operation was requested for a kind that does not define it.
    #[error("{operation} not supported for {kind}")]
    UnsupportedOperation {
        /// The operation that was attempted.
        operation: &'static str,
        /// The kind of the entity it was attempted on.
        kind: EntityKind,
    },
}
