//! Grid cells holding object membership and a fixed neighborhood.

use core::fmt;

use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::{GridError, GridResult, ObjectId};

/// Cells per side of a neighborhood.
pub const NEIGHBORHOOD_SPAN: u32 = 3;

/// Maximum cells in a neighborhood (the cell itself plus 8 adjacent cells).
pub const NEIGHBORHOOD_SIZE: usize = (NEIGHBORHOOD_SPAN * NEIGHBORHOOD_SPAN) as usize;

/// Unique identifier for a grid cell (row-major index).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u32);

impl CellId {
    /// Index into the grid's cell array.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis-aligned bounding box in world coordinates, half-open on the max side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    #[must_use]
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Check whether `(x, y)` lies in `[min_x, max_x) x [min_y, max_y)`.
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    #[must_use]
    pub const fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.max_y - self.min_y
    }
}

/// A single cell of the grid.
///
/// The shape (id, position, bounds, neighborhood) is fixed at construction.
/// Only the membership sets change over the cell's lifetime.
#[derive(Debug, Clone)]
pub struct GridCell<T> {
    id: CellId,
    row: u32,
    col: u32,
    bounds: Bounds,
    /// Every object standing in this cell.
    objects: HashSet<T>,
    /// Subset of `objects` that receive notifications.
    observers: HashSet<T>,
    /// The cell itself plus in-bounds adjacent cells, in link order.
    neighborhood: SmallVec<[CellId; NEIGHBORHOOD_SIZE]>,
    /// Same ids as `neighborhood`, for O(1) membership tests.
    neighborhood_set: HashSet<CellId>,
}

impl<T: ObjectId> GridCell<T> {
    pub(crate) fn new(id: CellId, row: u32, col: u32, bounds: Bounds) -> Self {
        Self {
            id,
            row,
            col,
            bounds,
            objects: HashSet::new(),
            observers: HashSet::new(),
            neighborhood: SmallVec::new(),
            neighborhood_set: HashSet::with_capacity(NEIGHBORHOOD_SIZE),
        }
    }

    /// Register `other` as part of this cell's neighborhood.
    ///
    /// Only called while the grid is being built.
    pub(crate) fn link_neighbor(&mut self, other: CellId) -> GridResult<()> {
        if self.neighborhood_set.contains(&other) {
            return Err(GridError::DuplicateNeighbor {
                cell: self.id,
                neighbor: other,
            });
        }
        if self.neighborhood.len() >= NEIGHBORHOOD_SIZE {
            return Err(GridError::NeighborhoodOverflow(self.id));
        }
        self.neighborhood_set.insert(other);
        self.neighborhood.push(other);
        Ok(())
    }

    #[must_use]
    pub const fn id(&self) -> CellId {
        self.id
    }

    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    #[must_use]
    pub const fn col(&self) -> u32 {
        self.col
    }

    /// `(row, col)` position in the grid matrix.
    #[must_use]
    pub const fn row_col(&self) -> (u32, u32) {
        (self.row, self.col)
    }

    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Insert an object; observers are also tracked in the observer set.
    pub fn add(&mut self, id: T, is_observer: bool) {
        self.objects.insert(id);
        if is_observer {
            self.observers.insert(id);
        }
    }

    /// Remove an object from both sets. Removing an absent object is a no-op.
    pub fn remove(&mut self, id: &T) {
        self.objects.remove(id);
        self.observers.remove(id);
    }

    /// Drop all membership, keeping the neighborhood.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.observers.clear();
    }

    #[must_use]
    pub fn contains(&self, id: &T) -> bool {
        self.objects.contains(id)
    }

    #[must_use]
    pub fn is_observer(&self, id: &T) -> bool {
        self.observers.contains(id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &T> + '_ {
        self.objects.iter()
    }

    pub fn observers(&self) -> impl Iterator<Item = &T> + '_ {
        self.observers.iter()
    }

    /// Number of objects standing in this cell.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The cell itself plus every in-bounds adjacent cell.
    #[must_use]
    pub fn neighborhood(&self) -> &[CellId] {
        &self.neighborhood
    }

    /// Check whether `cell` belongs to this cell's neighborhood in O(1).
    #[inline]
    #[must_use]
    pub fn is_in_neighborhood(&self, cell: CellId) -> bool {
        self.neighborhood_set.contains(&cell)
    }

    /// Fan `event` out to the members of this cell.
    ///
    /// Visits the observers, or every object when `deliver_to_all` is set,
    /// and calls `sink(event, other)` for each member except `trigger`.
    pub fn notify<E, F>(&self, trigger: T, deliver_to_all: bool, event: E, sink: &mut F)
    where
        E: Copy,
        F: FnMut(E, T) + ?Sized,
    {
        let members = if deliver_to_all {
            &self.objects
        } else {
            &self.observers
        };
        for &other in members {
            if other != trigger {
                sink(event, other);
            }
        }
    }
}

impl<T> fmt::Display for GridCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{},{})", self.id, self.row, self.col)
    }
}
