//! AOI Spatial Partitioning
//!
//! Divides a rectangular map into a uniform grid of cells. Every cell knows
//! which objects stand in it, which of those are observers, and which cells
//! form its 3x3 neighborhood (itself plus up to 8 adjacent cells).
//!
//! Neighborhoods are linked once at construction and never change, so the
//! difference between two neighborhoods is a pair of O(1) membership tests
//! per cell instead of a scan of the world.
//!
//! ```text
//!      col0 col1 col2 col3
//!     +----+----+----+----+
//! row2|  8 |  9 | 10 | 11 |
//!     +----+----+----+----+
//! row1|  4 |  5 |  6 |  7 |
//!     +----+----+----+----+
//! row0|  0 |  1 |  2 |  3 |
//!     +----+----+----+----+
//!  ^y
//!  |
//!  0---->x          id = row * cols + col
//! ```

pub mod cell;
pub mod config;
pub mod error;
pub mod grid;

use core::fmt::Debug;
use core::hash::Hash;

pub use cell::{Bounds, CellId, GridCell, NEIGHBORHOOD_SIZE, NEIGHBORHOOD_SPAN};
pub use config::GridConfig;
pub use error::{GridError, GridResult};
pub use grid::SpatialGrid;

/// Marker trait for identifiers stored in grid cells.
///
/// Any small copyable key works: integers, entity handles, newtypes.
pub trait ObjectId: Copy + Eq + Hash + Debug {}

// Blanket implementation: any Copy + Eq + Hash + Debug type can be an object id
impl<T: Copy + Eq + Hash + Debug> ObjectId for T {}
