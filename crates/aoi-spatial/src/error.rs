//! Grid error types.

use thiserror::Error;

use crate::CellId;

/// Errors raised while building a grid.
///
/// Membership operations on a built grid cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Non-positive map or cell dimensions, or bounds that overflow.
    #[error("invalid grid configuration: {0}")]
    InvalidConfiguration(String),

    /// A neighbor was linked twice to the same cell.
    #[error("cell {cell} already links neighbor {neighbor}")]
    DuplicateNeighbor { cell: CellId, neighbor: CellId },

    /// A cell was linked to more than 9 neighbors.
    #[error("cell {0} has more than {size} neighbors", size = crate::NEIGHBORHOOD_SIZE)]
    NeighborhoodOverflow(CellId),
}

/// Result type for grid construction.
pub type GridResult<T> = Result<T, GridError>;
