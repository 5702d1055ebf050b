//! AOI: grid-based Area of Interest management
//!
//! Decides, incrementally, who must hear about an object appearing,
//! disappearing or moving. Visibility is approximated by the 3x3 block of
//! grid cells around an object's cell.
//!
//! # Capabilities
//!
//! - `TriggerOnly` objects (NPCs) are seen by observers but see nothing.
//! - `ObserverOnly` objects (an invisible GM) see triggers but are never seen.
//! - `TriggerAndObserver` objects (players) both see and are seen.
//!
//! # Events
//!
//! Every mutating call has a `_with` form taking a callback that receives
//! `(AoiEvent, other)` once per affected object, synchronously, never with
//! the mover's own id:
//!
//! - `Enter`: the pair can now see each other (in whichever direction their
//!   capabilities allow)
//! - `Leave`: the pair lost sight of each other
//! - `Update`: the mover moved while staying in view of `other`
//!
//! # Example
//!
//! ```
//! use aoi::prelude::*;
//!
//! let mut aoi = AoiManager::new(GridConfig::new(100, 100, 10, 10)).unwrap();
//!
//! // An NPC standing at (10, 10), nobody to notify yet
//! assert!(aoi.enter(1, 10, 10, Capability::TriggerOnly));
//!
//! // A player arriving next to it sees it
//! let mut seen = Vec::new();
//! assert!(aoi.enter_with(2, 12, 12, Capability::TriggerAndObserver, |event, other| {
//!     seen.push((event, other));
//! }));
//! assert_eq!(seen, vec![(AoiEvent::Enter, 1)]);
//!
//! // The player walks far away and loses it
//! seen.clear();
//! assert!(aoi.move_to_with(2, 90, 90, |event, other| seen.push((event, other))));
//! assert_eq!(seen, vec![(AoiEvent::Leave, 1)]);
//! ```
//!
//! # Threading
//!
//! Everything is synchronous. Mutation needs `&mut AoiManager`, so callbacks
//! cannot re-enter the manager they are called from.

mod capability;
mod event;
mod manager;

pub use aoi_spatial::{
    Bounds, CellId, GridCell, GridConfig, GridError, GridResult, ObjectId, SpatialGrid,
};
pub use capability::Capability;
pub use event::AoiEvent;
pub use manager::{AoiManager, MovePlan};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AoiEvent, AoiManager, Bounds, Capability, CellId, GridCell, GridConfig, GridError,
        MovePlan, ObjectId,
    };
}
