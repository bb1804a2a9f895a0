//! Single-source shortest-path search over the pixel grid.
//!
//! [`SearchState`] holds the per-cell arrays (tentative cost, settled
//! flag, predecessor) sized to the grid and reusable across searches.
//! [`Search`] is one in-flight Dijkstra expansion from an anchor pixel
//! toward a target, decomposed into [`step`](Search::step) calls that
//! settle one cell each so a caller can interleave the search with
//! other work (cursor tracking, cancellation checks, visualization).
//!
//! # Convergence
//!
//! The search does not stop the first time the target is popped.  It
//! records the reconstructed path as the best candidate and keeps
//! expanding until no unsettled cell could beat it: once the popped
//! cell's cost exceeds the best completed cost (or equals it while the
//! frontier minimum is no better), no cheaper completion exists and the
//! search converges.  Plain Dijkstra optimality is preserved; the check
//! only prunes expansion that cannot change the answer.

use serde::{Deserialize, Serialize};

use crate::cost::CostField;
use crate::frontier::PriorityFrontier;
use crate::types::{CellIndex, Dimensions, LiveWireConfig, LiveWireError, PathSegment, Pixel, RgbaImage};

/// Per-search mutable arrays, sized to the grid.
///
/// Reused across searches via [`reset`](Self::reset) to avoid
/// reallocating three `W*H` vectors per cursor move.
#[derive(Debug, Default)]
pub struct SearchState {
    /// Best known cost from anchor to each cell; `+inf` until relaxed,
    /// monotonically non-increasing during a search.
    total_cost: Vec<f64>,
    /// True once a cell is popped and settled; never cleared mid-search.
    visited: Vec<bool>,
    /// Settled predecessor on the lowest-cost path; `None` until the
    /// cell's cost is first improved. Set only together with
    /// `total_cost`, and always references a cell of no greater cost.
    predecessor: Vec<Option<CellIndex>>,
}

impl SearchState {
    /// Create an empty state; arrays are sized on first reset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize to `cell_count` cells and clear all three arrays.
    pub fn reset(&mut self, cell_count: usize) {
        self.total_cost.clear();
        self.total_cost.resize(cell_count, f64::INFINITY);
        self.visited.clear();
        self.visited.resize(cell_count, false);
        self.predecessor.clear();
        self.predecessor.resize(cell_count, None);
    }

    /// Best known cost for a cell.
    #[must_use]
    pub fn total_cost(&self, cell: CellIndex) -> f64 {
        self.total_cost[cell]
    }

    /// Whether a cell has been settled.
    #[must_use]
    pub fn visited(&self, cell: CellIndex) -> bool {
        self.visited[cell]
    }

    /// Predecessor of a cell on its current lowest-cost path.
    #[must_use]
    pub fn predecessor(&self, cell: CellIndex) -> Option<CellIndex> {
        self.predecessor[cell]
    }
}

/// Outcome of settling one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchStep {
    /// A cell was popped and settled at the given final cost.
    Settled {
        /// The settled cell.
        pixel: Pixel,
        /// Its finalized total cost from the anchor.
        cost: f64,
    },
    /// The search has converged or exhausted; call
    /// [`Search::finish`] to obtain the result.
    Finished,
}

/// Terminal condition of a completed search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Still expanding; more [`Search::step`] calls are needed.
    Expanding,
    /// Early exit: no unsettled cell can beat the best completed path.
    Converged,
    /// The frontier emptied.
    Exhausted,
}

/// Counters and timing for one search, for diagnostics display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDiagnostics {
    /// Cells popped and settled.
    pub cells_settled: usize,
    /// Stale frontier entries discarded (cell already settled).
    pub stale_entries: usize,
    /// Total frontier pushes, duplicates included.
    pub frontier_pushes: usize,
}

/// 8-connected neighbor offsets.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// One in-flight shortest-path search from `anchor` toward `target`.
///
/// Borrows the image read-only and the [`SearchState`] exclusively;
/// state and frontier are private to this search, so no
/// synchronization is involved.
#[derive(Debug)]
pub struct Search<'a> {
    cost: CostField<'a>,
    dims: Dimensions,
    state: &'a mut SearchState,
    frontier: PriorityFrontier,
    anchor: Pixel,
    target: Pixel,
    anchor_index: CellIndex,
    target_index: CellIndex,
    penalty: f64,
    /// Best completed path so far: `(total cost, pixels)`.
    best: Option<(f64, Vec<Pixel>)>,
    status: SearchStatus,
    diagnostics: SearchDiagnostics,
}

impl<'a> Search<'a> {
    /// Start a search: validates both endpoints, resets the state, and
    /// seeds the frontier with the anchor at cost zero.
    ///
    /// # Errors
    ///
    /// Returns [`LiveWireError::InvalidPixel`] if either endpoint lies
    /// outside the image; no state is mutated in that case.
    pub fn new(
        image: &'a RgbaImage,
        state: &'a mut SearchState,
        anchor: Pixel,
        target: Pixel,
        config: &LiveWireConfig,
    ) -> Result<Self, LiveWireError> {
        let dims = Dimensions::of(image);
        for pixel in [anchor, target] {
            if !dims.contains(pixel) {
                return Err(LiveWireError::InvalidPixel {
                    pixel,
                    dimensions: dims,
                });
            }
        }

        state.reset(dims.cell_count());
        let anchor_index = anchor.to_index(dims.width);
        state.total_cost[anchor_index] = 0.0;

        let mut frontier = PriorityFrontier::new();
        frontier.push(anchor_index, 0.0);

        Ok(Self {
            cost: CostField::new(image),
            dims,
            state,
            frontier,
            anchor,
            target,
            anchor_index,
            target_index: target.to_index(dims.width),
            penalty: config.path_length_penalty,
            best: None,
            status: SearchStatus::Expanding,
            diagnostics: SearchDiagnostics {
                frontier_pushes: 1,
                ..SearchDiagnostics::default()
            },
        })
    }

    /// The search anchor.
    #[must_use]
    pub const fn anchor(&self) -> Pixel {
        self.anchor
    }

    /// The search target.
    #[must_use]
    pub const fn target(&self) -> Pixel {
        self.target
    }

    /// Current terminal condition.
    #[must_use]
    pub const fn status(&self) -> SearchStatus {
        self.status
    }

    /// Counters accumulated so far.
    #[must_use]
    pub const fn diagnostics(&self) -> SearchDiagnostics {
        self.diagnostics
    }

    /// Read access to the per-cell arrays, for hosts that inspect
    /// costs or reachability while stepping the search themselves.
    #[must_use]
    pub fn state(&self) -> &SearchState {
        self.state
    }

    /// Settle at most one cell.
    ///
    /// Stale frontier entries are discarded without counting as a step,
    /// so every `Settled` return corresponds to exactly one newly
    /// finalized cell. Returns `Finished` once the search has converged
    /// or the frontier is exhausted; further calls keep returning
    /// `Finished`.
    pub fn step(&mut self) -> SearchStep {
        if self.status != SearchStatus::Expanding {
            return SearchStep::Finished;
        }

        let cell = loop {
            let Some(cell) = self.frontier.pop_min() else {
                self.status = SearchStatus::Exhausted;
                return SearchStep::Finished;
            };
            if self.state.visited[cell] {
                self.diagnostics.stale_entries += 1;
                continue;
            }
            break cell;
        };

        self.state.visited[cell] = true;
        self.diagnostics.cells_settled += 1;
        let cell_cost = self.state.total_cost[cell];
        let pixel = Pixel::from_index(cell, self.dims.width);

        if cell == self.target_index {
            self.offer_candidate(cell_cost);
        }

        if self.converged(cell_cost) {
            self.status = SearchStatus::Converged;
        } else {
            self.expand_neighbors(cell, cell_cost, pixel);
        }

        SearchStep::Settled {
            pixel,
            cost: cell_cost,
        }
    }

    /// Run the remaining expansion to completion and reconstruct the
    /// result, invoking `observer` for every settled cell and checking
    /// `cancelled` between expansions.
    ///
    /// # Errors
    ///
    /// Returns [`LiveWireError::Cancelled`] if `cancelled()` turns true
    /// mid-search, or [`LiveWireError::PathNotFound`] if the frontier
    /// exhausts without reaching the target.
    pub fn run(
        mut self,
        mut cancelled: impl FnMut() -> bool,
        mut observer: Option<&mut dyn FnMut(Pixel, f64)>,
    ) -> Result<PathSegment, LiveWireError> {
        loop {
            if cancelled() {
                return Err(LiveWireError::Cancelled);
            }
            match self.step() {
                SearchStep::Settled { pixel, cost } => {
                    if let Some(ref mut observer) = observer {
                        observer(pixel, cost);
                    }
                }
                SearchStep::Finished => return self.finish(),
            }
        }
    }

    /// Consume the search and produce the resulting path.
    ///
    /// Valid once [`step`](Self::step) has returned `Finished`.
    ///
    /// # Errors
    ///
    /// Returns [`LiveWireError::PathNotFound`] if the target was never
    /// reached.
    pub fn finish(mut self) -> Result<PathSegment, LiveWireError> {
        if let Some((cost, pixels)) = self.best.take() {
            return Ok(PathSegment::new(pixels, cost));
        }
        // Exhausted without settling the target. Defensively attempt a
        // reconstruction anyway: on a degenerate grid the predecessor
        // chain may still describe a usable path.
        self.reconstruct(self.target_index).map_or(
            Err(LiveWireError::PathNotFound {
                anchor: self.anchor,
                target: self.target,
            }),
            |pixels| {
                let cost = self.state.total_cost[self.target_index];
                Ok(PathSegment::new(pixels, cost))
            },
        )
    }

    /// Record a freshly settled target as a candidate best path.
    ///
    /// Tie-break: lower total cost wins; equal cost prefers the path
    /// with fewer pixels.
    fn offer_candidate(&mut self, cost: f64) {
        let Some(pixels) = self.reconstruct(self.target_index) else {
            return;
        };
        let wins = match &self.best {
            None => true,
            Some((best_cost, best_pixels)) => {
                cost < *best_cost || (cost == *best_cost && pixels.len() < best_pixels.len())
            }
        };
        if wins {
            self.best = Some((cost, pixels));
        }
    }

    /// Early-exit check for the cell just settled at `cell_cost`.
    ///
    /// An empty frontier counts as minimum priority `+inf`, so a search
    /// whose best path is already recorded converges immediately.
    fn converged(&self, cell_cost: f64) -> bool {
        let Some((best_cost, _)) = &self.best else {
            return false;
        };
        let frontier_min = self.frontier.peek_min_priority().unwrap_or(f64::INFINITY);
        cell_cost > *best_cost || (cell_cost == *best_cost && frontier_min >= *best_cost)
    }

    /// Relax all unsettled in-bounds neighbors of the settled cell.
    fn expand_neighbors(&mut self, cell: CellIndex, cell_cost: f64, pixel: Pixel) {
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let nx = i64::from(pixel.x) + dx;
            let ny = i64::from(pixel.y) + dy;
            if nx < 0 || ny < 0 || nx >= i64::from(self.dims.width) || ny >= i64::from(self.dims.height)
            {
                continue;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let neighbor = Pixel::new(nx as u32, ny as u32);
            let neighbor_index = neighbor.to_index(self.dims.width);
            if self.state.visited[neighbor_index] {
                continue;
            }

            let candidate = cell_cost + self.cost.link_cost(pixel, neighbor) + self.penalty;
            if candidate < self.state.total_cost[neighbor_index] {
                self.state.total_cost[neighbor_index] = candidate;
                self.state.predecessor[neighbor_index] = Some(cell);
                self.frontier.push(neighbor_index, candidate);
                self.diagnostics.frontier_pushes += 1;
            }
        }
    }

    /// Walk the predecessor chain from `cell` back to the anchor.
    ///
    /// Returns `None` when the chain is broken: the cell was never
    /// reached, or the walk ends somewhere other than the anchor.
    fn reconstruct(&self, cell: CellIndex) -> Option<Vec<Pixel>> {
        if self.state.total_cost[cell].is_infinite() {
            return None;
        }

        let mut pixels = Vec::new();
        let mut current = cell;
        loop {
            pixels.push(Pixel::from_index(current, self.dims.width));
            match self.state.predecessor[current] {
                Some(prev) => current = prev,
                // The anchor is the only cell with cost set but no
                // predecessor; anything else means a broken chain.
                None => {
                    if current != self.anchor_index {
                        return None;
                    }
                    break;
                }
            }
        }
        pixels.reverse();
        Some(pixels)
    }
}
