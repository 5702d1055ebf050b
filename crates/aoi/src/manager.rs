//! The AOI manager: object tracking and the enter/leave/move protocol.
//!
//! A move from cell `A` to cell `B` only touches the two 3x3 neighborhoods:
//!
//! ```text
//! +---+---+---+---+
//! | L | U | U | E |     L = A's neighborhood - B's   -> Leave
//! +---+---+---+---+     U = A's neighborhood & B's   -> Update
//! | L | A | B | E |     E = B's neighborhood - A's   -> Enter
//! +---+---+---+---+
//! | L | U | U | E |
//! +---+---+---+---+
//! ```

use core::fmt;

use aoi_spatial::{
    CellId, GridCell, GridConfig, GridResult, NEIGHBORHOOD_SIZE, NEIGHBORHOOD_SPAN, ObjectId,
    SpatialGrid,
};
use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{AoiEvent, Capability};

/// Cells that hear about a move, tagged with the event they get, in emission order.
pub type MovePlan = SmallVec<[(CellId, AoiEvent); 2 * NEIGHBORHOOD_SIZE]>;

/// Callback receiving `(event, other)` for each affected object.
type Sink<'a, T> = &'a mut dyn FnMut(AoiEvent, T);

/// Per-object state kept by the manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Tracked {
    x: i32,
    y: i32,
    cell: CellId,
    capability: Capability,
}

/// Tracks objects on a grid and reports who must hear about their moves.
///
/// Mutating operations come in two forms: a silent one that only updates
/// bookkeeping, and a `_with` form that also calls `on_event(event, other)`
/// once per affected object, synchronously. The mover itself is never passed
/// as `other`.
///
/// # Example
///
/// ```
/// use aoi::prelude::*;
///
/// let mut aoi = AoiManager::new(GridConfig::new(100, 100, 10, 10)).unwrap();
/// assert!(aoi.enter(1, 5, 5, Capability::TriggerOnly));
///
/// let mut seen = Vec::new();
/// assert!(aoi.enter_with(2, 15, 15, Capability::TriggerAndObserver, |event, other| {
///     seen.push((event, other));
/// }));
/// assert_eq!(seen, vec![(AoiEvent::Enter, 1)]);
/// ```
#[derive(Debug, Clone)]
pub struct AoiManager<T> {
    grid: SpatialGrid<T>,
    objects: HashMap<T, Tracked>,
}

impl<T: ObjectId> AoiManager<T> {
    /// Create a manager over a freshly built grid.
    pub fn new(config: GridConfig) -> GridResult<Self> {
        Ok(Self {
            grid: SpatialGrid::new(&config)?,
            objects: HashMap::new(),
        })
    }

    /// Create a manager from min/max map corners. Corners may be negative.
    pub fn from_bounds(
        min_x: i32,
        min_y: i32,
        max_x: i32,
        max_y: i32,
        cell_width: i32,
        cell_height: i32,
    ) -> GridResult<Self> {
        Self::new(GridConfig::from_bounds(
            min_x,
            min_y,
            max_x,
            max_y,
            cell_width,
            cell_height,
        )?)
    }

    // ========================================================================
    // Enter
    // ========================================================================

    /// Start tracking `id` at `(x, y)` without notifying anyone.
    ///
    /// Returns `false` if `id` is already tracked.
    #[must_use]
    pub fn enter(&mut self, id: T, x: i32, y: i32, capability: Capability) -> bool {
        self.enter_inner(id, x, y, capability, None)
    }

    /// Start tracking `id` at `(x, y)` and report `Enter` for everyone
    /// related to it in the surrounding 3x3 cells.
    ///
    /// Returns `false` if `id` is already tracked.
    #[must_use]
    pub fn enter_with<F>(
        &mut self,
        id: T,
        x: i32,
        y: i32,
        capability: Capability,
        mut on_event: F,
    ) -> bool
    where
        F: FnMut(AoiEvent, T),
    {
        self.enter_inner(id, x, y, capability, Some(&mut on_event))
    }

    fn enter_inner(
        &mut self,
        id: T,
        x: i32,
        y: i32,
        capability: Capability,
        sink: Option<Sink<'_, T>>,
    ) -> bool {
        if self.objects.contains_key(&id) {
            debug!(?id, "enter rejected: already tracked");
            return false;
        }

        let cell = self.grid.cell_index_for(x, y);
        self.grid
            .cell_mut(cell)
            .add(id, capability.receives_events());
        self.objects.insert(
            id,
            Tracked {
                x,
                y,
                cell,
                capability,
            },
        );
        trace!(?id, x, y, %cell, ?capability, "enter");

        if let Some(sink) = sink {
            self.broadcast(id, capability, cell, AoiEvent::Enter, sink);
        }
        true
    }

    // ========================================================================
    // Leave
    // ========================================================================

    /// Stop tracking `id` without notifying anyone.
    ///
    /// Returns `false` if `id` is not tracked.
    #[must_use]
    pub fn leave(&mut self, id: T) -> bool {
        self.leave_inner(id, None)
    }

    /// Stop tracking `id` and report `Leave` for everyone related to it in
    /// the surrounding 3x3 cells.
    ///
    /// Returns `false` if `id` is not tracked.
    #[must_use]
    pub fn leave_with<F>(&mut self, id: T, mut on_event: F) -> bool
    where
        F: FnMut(AoiEvent, T),
    {
        self.leave_inner(id, Some(&mut on_event))
    }

    fn leave_inner(&mut self, id: T, sink: Option<Sink<'_, T>>) -> bool {
        let Some(state) = self.objects.remove(&id) else {
            debug!(?id, "leave rejected: not tracked");
            return false;
        };

        self.grid.cell_mut(state.cell).remove(&id);
        trace!(?id, cell = %state.cell, "leave");

        if let Some(sink) = sink {
            self.broadcast(id, state.capability, state.cell, AoiEvent::Leave, sink);
        }
        true
    }

    // ========================================================================
    // Move
    // ========================================================================

    /// Move `id` to `(x, y)` without notifying anyone.
    ///
    /// Returns `false` if `id` is not tracked.
    #[must_use]
    pub fn move_to(&mut self, id: T, x: i32, y: i32) -> bool {
        self.move_inner(id, x, y, None)
    }

    /// Move `id` to `(x, y)` and report the resulting events.
    ///
    /// Cells that come into view get `Enter`, cells that stay in view get
    /// `Update` (only when `id` is a trigger), cells that drop out of view get
    /// `Leave`, in that order. See [`move_plan`](Self::move_plan).
    ///
    /// Returns `false` if `id` is not tracked.
    #[must_use]
    pub fn move_to_with<F>(&mut self, id: T, x: i32, y: i32, mut on_event: F) -> bool
    where
        F: FnMut(AoiEvent, T),
    {
        self.move_inner(id, x, y, Some(&mut on_event))
    }

    fn move_inner(&mut self, id: T, x: i32, y: i32, sink: Option<Sink<'_, T>>) -> bool {
        let Some(state) = self.objects.get_mut(&id) else {
            debug!(?id, "move rejected: not tracked");
            return false;
        };

        let from = state.cell;
        let to = self.grid.cell_index_for(x, y);
        let capability = state.capability;
        state.x = x;
        state.y = y;
        state.cell = to;

        if from != to {
            self.grid.cell_mut(from).remove(&id);
            self.grid
                .cell_mut(to)
                .add(id, capability.receives_events());
        }
        trace!(?id, x, y, %from, %to, "move");

        if let Some(sink) = sink {
            for (cell, event) in self.move_plan(from, to) {
                if event == AoiEvent::Update && !capability.emits_events() {
                    continue;
                }
                self.fan_out(id, capability, cell, event, sink);
            }
        }
        true
    }

    /// Which cells hear about a move from `from` to `to`, and with which event.
    ///
    /// - Same cell: the whole neighborhood gets `Update`.
    /// - Neighborhoods too far apart to overlap: the new neighborhood gets
    ///   `Enter`, then the old one gets `Leave`.
    /// - Otherwise: new-only cells get `Enter`, shared cells get `Update`,
    ///   old-only cells get `Leave`.
    ///
    /// Every cell of either neighborhood appears exactly once.
    ///
    /// # Panics
    ///
    /// If either id was not produced by this manager's grid.
    #[must_use]
    pub fn move_plan(&self, from: CellId, to: CellId) -> MovePlan {
        let from_cell = self.grid.cell(from);
        let to_cell = self.grid.cell(to);
        let mut plan = MovePlan::new();

        if from == to {
            plan.extend(to_cell.neighborhood().iter().map(|&c| (c, AoiEvent::Update)));
        } else if Self::disjoint(from_cell, to_cell) {
            plan.extend(to_cell.neighborhood().iter().map(|&c| (c, AoiEvent::Enter)));
            plan.extend(from_cell.neighborhood().iter().map(|&c| (c, AoiEvent::Leave)));
        } else {
            for &cell in to_cell.neighborhood() {
                if !from_cell.is_in_neighborhood(cell) {
                    plan.push((cell, AoiEvent::Enter));
                }
            }
            for &cell in to_cell.neighborhood() {
                if from_cell.is_in_neighborhood(cell) {
                    plan.push((cell, AoiEvent::Update));
                }
            }
            for &cell in from_cell.neighborhood() {
                if !to_cell.is_in_neighborhood(cell) {
                    plan.push((cell, AoiEvent::Leave));
                }
            }
        }
        plan
    }

    /// Two 3x3 neighborhoods cannot share a cell once their centers are three
    /// rows or three columns apart.
    fn disjoint(a: &GridCell<T>, b: &GridCell<T>) -> bool {
        a.row().abs_diff(b.row()) >= NEIGHBORHOOD_SPAN
            || a.col().abs_diff(b.col()) >= NEIGHBORHOOD_SPAN
    }

    // ========================================================================
    // Fan-out
    // ========================================================================

    /// Send `event` to every cell in the neighborhood of `center`.
    fn broadcast(
        &self,
        id: T,
        capability: Capability,
        center: CellId,
        event: AoiEvent,
        sink: Sink<'_, T>,
    ) {
        for &cell in self.grid.cell(center).neighborhood() {
            self.fan_out(id, capability, cell, event, sink);
        }
    }

    /// Send `event` about `id` to the members of one cell.
    ///
    /// `Update` only reaches observers. `Enter` and `Leave` reach every
    /// member when `id` is itself an observer, and are then filtered down to
    /// the objects that actually relate to `id`.
    fn fan_out(
        &self,
        id: T,
        capability: Capability,
        cell: CellId,
        event: AoiEvent,
        sink: Sink<'_, T>,
    ) {
        let cell = self.grid.cell(cell);
        if event == AoiEvent::Update {
            cell.notify(id, false, event, sink);
            return;
        }

        let objects = &self.objects;
        cell.notify(
            id,
            capability.receives_events(),
            event,
            &mut |event, other| {
                let related = objects
                    .get(&other)
                    .is_some_and(|o| capability.relates_to(o.capability));
                if related {
                    sink(event, other);
                }
            },
        );
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The cell containing `(x, y)`, clamped to the map.
    #[must_use]
    pub fn cell_at(&self, x: i32, y: i32) -> &GridCell<T> {
        self.grid.cell_at(x, y)
    }

    /// The cell `id` currently stands in.
    #[must_use]
    pub fn cell_of(&self, id: &T) -> Option<&GridCell<T>> {
        self.objects.get(id).map(|state| self.grid.cell(state.cell))
    }

    /// Every cell in row-major order.
    #[must_use]
    pub fn all_cells(&self) -> &[GridCell<T>] {
        self.grid.cells()
    }

    #[must_use]
    pub const fn grid(&self) -> &SpatialGrid<T> {
        &self.grid
    }

    #[must_use]
    pub fn contains(&self, id: &T) -> bool {
        self.objects.contains_key(id)
    }

    /// Last position passed to `enter` or `move_to`, unclamped.
    #[must_use]
    pub fn position_of(&self, id: &T) -> Option<(i32, i32)> {
        self.objects.get(id).map(|state| (state.x, state.y))
    }

    #[must_use]
    pub fn capability_of(&self, id: &T) -> Option<Capability> {
        self.objects.get(id).map(|state| state.capability)
    }

    /// Call `f` for every other object in the 3x3 cells around `id`,
    /// regardless of capability.
    ///
    /// Returns `false` if `id` is not tracked.
    pub fn for_each_nearby<F>(&self, id: &T, mut f: F) -> bool
    where
        F: FnMut(T),
    {
        let Some(cell) = self.cell_of(id) else {
            return false;
        };
        for &near in cell.neighborhood() {
            for &other in self.grid.cell(near).objects() {
                if other != *id {
                    f(other);
                }
            }
        }
        true
    }

    /// Number of tracked objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Forget every object. The grid's shape is kept.
    pub fn clear(&mut self) {
        debug!(objects = self.objects.len(), "clearing aoi manager");
        self.objects.clear();
        self.grid.clear();
    }
}

impl<T: ObjectId> fmt::Display for AoiManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.grid, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use Capability::{ObserverOnly, TriggerAndObserver, TriggerOnly};

    fn manager() -> AoiManager<u32> {
        AoiManager::new(GridConfig::new(100, 100, 10, 10)).unwrap()
    }

    fn sorted(mut events: Vec<(AoiEvent, u32)>) -> Vec<(AoiEvent, u32)> {
        events.sort_by_key(|&(event, other)| (event as u8, other));
        events
    }

    #[test]
    fn test_enter_rejects_duplicate() {
        let mut aoi = manager();
        assert!(aoi.enter(1, 5, 5, TriggerOnly));
        assert!(!aoi.enter(1, 55, 55, ObserverOnly));

        // First registration untouched
        assert_eq!(aoi.position_of(&1), Some((5, 5)));
        assert_eq!(aoi.capability_of(&1), Some(TriggerOnly));
        assert_eq!(aoi.len(), 1);
        assert_eq!(aoi.all_cells().iter().map(GridCell::len).sum::<usize>(), 1);
    }

    #[test]
    fn test_leave_and_move_reject_untracked() {
        let mut aoi = manager();
        let mut called = false;

        assert!(!aoi.leave(7));
        assert!(!aoi.move_to(7, 10, 10));
        assert!(!aoi.leave_with(7, |_, _| called = true));
        assert!(!aoi.move_to_with(7, 10, 10, |_, _| called = true));

        assert!(!called);
        assert!(aoi.is_empty());
    }

    #[test]
    fn test_silent_operations_keep_bookkeeping() {
        let mut aoi = manager();
        assert!(aoi.enter(1, 5, 5, TriggerAndObserver));
        assert!(aoi.move_to(1, 45, 72));

        assert_eq!(aoi.position_of(&1), Some((45, 72)));
        assert_eq!(aoi.cell_of(&1).map(GridCell::id), Some(CellId(74)));
        assert!(aoi.cell_at(45, 72).is_observer(&1));
        assert!(!aoi.cell_at(5, 5).contains(&1));

        assert!(aoi.leave(1));
        assert!(aoi.cell_of(&1).is_none());
        assert!(aoi.all_cells().iter().all(GridCell::is_empty));
    }

    #[test]
    fn test_position_is_not_clamped() {
        let mut aoi = manager();
        assert!(aoi.enter(1, -30, 500, TriggerOnly));

        assert_eq!(aoi.position_of(&1), Some((-30, 500)));
        assert_eq!(aoi.cell_of(&1).map(GridCell::id), Some(CellId(90)));
    }

    #[test]
    fn test_same_cell_move_updates_observers() {
        let mut aoi = manager();
        assert!(aoi.enter(1, 15, 15, TriggerAndObserver));
        assert!(aoi.enter(2, 25, 25, TriggerOnly));
        assert!(aoi.enter(3, 35, 35, ObserverOnly));
        assert!(aoi.enter(4, 5, 5, ObserverOnly));

        let mut events = Vec::new();
        assert!(aoi.move_to_with(2, 26, 27, |e, o| events.push((e, o))));

        assert_eq!(
            sorted(events),
            vec![(AoiEvent::Update, 1), (AoiEvent::Update, 3)]
        );
    }

    #[test]
    fn test_same_cell_move_of_observer_is_silent() {
        let mut aoi = manager();
        assert!(aoi.enter(1, 15, 15, TriggerAndObserver));
        assert!(aoi.enter(2, 25, 25, ObserverOnly));

        let mut events = Vec::new();
        assert!(aoi.move_to_with(2, 21, 22, |e, o| events.push((e, o))));

        assert!(events.is_empty());
        assert_eq!(aoi.position_of(&2), Some((21, 22)));
    }

    #[test]
    fn test_disjoint_move() {
        let mut aoi = manager();
        assert!(aoi.enter(1, 5, 5, TriggerAndObserver));
        assert!(aoi.enter(2, 95, 95, TriggerAndObserver));
        assert!(aoi.enter(3, 0, 0, TriggerOnly));

        let mut events = Vec::new();
        assert!(aoi.move_to_with(3, 90, 90, |e, o| events.push((e, o))));

        // New view first, then the old one
        assert_eq!(events, vec![(AoiEvent::Enter, 2), (AoiEvent::Leave, 1)]);
    }

    #[test]
    fn test_move_plan_disjoint_order() {
        let aoi = manager();
        let plan = aoi.move_plan(CellId(0), CellId(99));

        let enter: Vec<u32> = plan
            .iter()
            .take_while(|(_, e)| *e == AoiEvent::Enter)
            .map(|(c, _)| c.0)
            .collect();
        assert_eq!(enter.len(), 4);
        assert!(enter.iter().all(|c| [88, 89, 98, 99].contains(c)));
        assert!(plan[4..].iter().all(|(_, e)| *e == AoiEvent::Leave));
        assert_eq!(plan.len(), 8);
    }

    #[test]
    fn test_move_plan_overlap_order() {
        let aoi = manager();
        let plan = aoi.move_plan(CellId(11), CellId(12));

        let events: Vec<AoiEvent> = plan.iter().map(|&(_, e)| e).collect();
        let first_update = events.iter().position(|&e| e == AoiEvent::Update).unwrap();
        let first_leave = events.iter().position(|&e| e == AoiEvent::Leave).unwrap();

        assert!(events[..first_update].iter().all(|&e| e == AoiEvent::Enter));
        assert!(events[first_update..first_leave].iter().all(|&e| e == AoiEvent::Update));
        assert!(events[first_leave..].iter().all(|&e| e == AoiEvent::Leave));
        assert_eq!(first_update, 3);
        assert_eq!(first_leave - first_update, 6);
        assert_eq!(events.len() - first_leave, 3);
    }

    #[test]
    fn test_observer_only_is_invisible() {
        let mut aoi = manager();
        assert!(aoi.enter(1, 15, 15, ObserverOnly));
        assert!(aoi.enter(2, 15, 15, TriggerOnly));

        // The GM sees the NPC but not another GM
        let mut events = Vec::new();
        assert!(aoi.enter_with(3, 16, 16, ObserverOnly, |e, o| events.push((e, o))));
        assert_eq!(events, vec![(AoiEvent::Enter, 2)]);

        // An NPC entering is seen by both GMs
        events.clear();
        assert!(aoi.enter_with(4, 17, 17, TriggerOnly, |e, o| events.push((e, o))));
        assert_eq!(
            sorted(events),
            vec![(AoiEvent::Enter, 1), (AoiEvent::Enter, 3)]
        );
    }

    #[test]
    fn test_trigger_only_pair_ignores_each_other() {
        let mut aoi = manager();
        assert!(aoi.enter(1, 15, 15, TriggerOnly));

        let mut events = Vec::new();
        assert!(aoi.enter_with(2, 15, 15, TriggerOnly, |e, o| events.push((e, o))));
        assert!(aoi.move_to_with(2, 35, 15, |e, o| events.push((e, o))));
        assert!(aoi.leave_with(2, |e, o| events.push((e, o))));

        assert!(events.is_empty());
    }

    #[test]
    fn test_for_each_nearby() {
        let mut aoi = manager();
        assert!(aoi.enter(1, 15, 15, TriggerAndObserver));
        assert!(aoi.enter(2, 5, 25, ObserverOnly));
        assert!(aoi.enter(3, 15, 15, TriggerOnly));
        assert!(aoi.enter(4, 35, 15, TriggerOnly));

        let mut nearby = Vec::new();
        assert!(aoi.for_each_nearby(&1, |other| nearby.push(other)));
        nearby.sort_unstable();

        assert_eq!(nearby, vec![2, 3]);
        assert!(!aoi.for_each_nearby(&9, |_| {}));
    }

    #[test]
    fn test_clear_keeps_grid() {
        let mut aoi = manager();
        for id in 0..20 {
            assert!(aoi.enter(id, id as i32 * 5, id as i32 * 3, TriggerAndObserver));
        }

        aoi.clear();

        assert!(aoi.is_empty());
        assert!(aoi.all_cells().iter().all(GridCell::is_empty));
        assert_eq!(aoi.all_cells().len(), 100);
        assert_eq!(aoi.cell_at(15, 15).neighborhood().len(), 9);
        assert!(aoi.enter(3, 50, 50, TriggerOnly));
    }

    #[test]
    fn test_from_bounds() {
        let aoi = AoiManager::<u32>::from_bounds(-100, -100, 100, 100, 20, 20).unwrap();
        assert_eq!(aoi.grid().cols(), 10);
        assert_eq!(aoi.grid().rows(), 10);
        assert_eq!(aoi.cell_at(-100, -100).id(), CellId(0));
        assert_eq!(aoi.cell_at(0, 0).id(), CellId(55));

        assert!(AoiManager::<u32>::from_bounds(0, 0, 0, 100, 10, 10).is_err());
    }
}
