//! Uniform spatial grid with sort-based bucket indexing.
//!
//! Every rebuild sorts a permutation of particle ids by cell, so that all
//! particles of one cell form a contiguous run, and records for each cell
//! the offset where its run starts. Queries then walk a run until the cell
//! changes.

use crate::{
    error::SimError,
    particle::Particle,
    types::{CellIndex, ParticleId, TypeFilter},
};
use glam::Vec2;

/// How the per-cell start offset is recorded during a rebuild scan.
///
/// Both policies yield the same offsets because the scan is ascending;
/// `FirstOccurrence` is the canonical one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BucketOffsetPolicy {
    /// Store the offset the first time a cell is seen.
    #[default]
    FirstOccurrence,
    /// Keep the smallest offset seen for the cell.
    MinimumIndex,
}

#[derive(Debug)]
pub struct SpatialGrid {
    cell_size: f32,
    grid_width: usize,
    grid_height: usize,
    policy: BucketOffsetPolicy,
    /// One entry per cell: `None` if empty, else the offset into `order`
    /// where the cell's run begins.
    cell_start: Vec<Option<usize>>,
    /// Particle ids sorted by cell index.
    order: Vec<ParticleId>,
}

impl SpatialGrid {
    /// Creates an empty grid covering `[0, world_size.x) x [0, world_size.y)`.
    ///
    /// The grid has `ceil(width / cell_size) x ceil(height / cell_size)`
    /// cells, all initially empty.
    ///
    /// ### Parameters
    /// - `world_size` - Extent of the simulated plane.
    /// - `cell_size` - Side length of one square cell.
    /// - `policy` - Bucket-offset recording policy used by [`SpatialGrid::rebuild`].
    ///
    /// ### Returns
    /// The grid, or [`SimError`] if either size is non-finite or non-positive.
    pub fn new(
        world_size: Vec2,
        cell_size: f32,
        policy: BucketOffsetPolicy,
    ) -> Result<Self, SimError> {
        if !(world_size.is_finite() && world_size.x > 0.0 && world_size.y > 0.0) {
            return Err(SimError::InvalidWorldSize {
                width: world_size.x,
                height: world_size.y,
            });
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(SimError::InvalidCellSize(cell_size));
        }

        let grid_width = (world_size.x / cell_size).ceil() as usize;
        let grid_height = (world_size.y / cell_size).ceil() as usize;

        Ok(Self {
            cell_size,
            grid_width,
            grid_height,
            policy,
            cell_start: vec![None; grid_width * grid_height],
            order: Vec::new(),
        })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn grid_width(&self) -> usize {
        self.grid_width
    }

    pub fn grid_height(&self) -> usize {
        self.grid_height
    }

    pub fn policy(&self) -> BucketOffsetPolicy {
        self.policy
    }

    /// Total number of cells, i.e. the exclusive upper bound of valid indices.
    pub fn cell_count(&self) -> usize {
        self.cell_start.len()
    }

    /// Particle ids in the order produced by the last rebuild.
    pub fn order(&self) -> &[ParticleId] {
        &self.order
    }

    /// Start offset of a cell's run, or `None` if the cell is empty or out
    /// of bounds.
    pub fn cell_start(&self, cell: CellIndex) -> Option<usize> {
        self.slot(cell).and_then(|slot| self.cell_start[slot])
    }

    /// Maps a position to its flattened cell index.
    ///
    /// Positions outside the plane produce indices outside
    /// `[0, cell_count)`; they are valid to compute but never stored.
    /// Arithmetic saturates, so arbitrarily far positions stay out of
    /// bounds instead of overflowing.
    #[inline]
    pub fn cell_index_of(&self, pos: Vec2) -> CellIndex {
        let x = (pos.x / self.cell_size).floor() as CellIndex;
        let y = (pos.y / self.cell_size).floor() as CellIndex;
        x.saturating_add(y.saturating_mul(self.grid_width as CellIndex))
    }

    #[inline]
    fn slot(&self, cell: CellIndex) -> Option<usize> {
        usize::try_from(cell)
            .ok()
            .filter(|&slot| slot < self.cell_start.len())
    }

    /// Rebuilds the bucket index from current particle positions.
    ///
    /// 1. Recomputes every particle's cached cell.
    /// 2. Stably sorts the id permutation by cell, so ties keep their
    ///    previous relative order.
    /// 3. Scans once, recording each in-bounds cell's start offset
    ///    according to the configured [`BucketOffsetPolicy`].
    ///
    /// After this call every cell's particles occupy one contiguous run of
    /// [`SpatialGrid::order`], and the stored offset is the first index of
    /// that run.
    pub fn rebuild(&mut self, particles: &mut [Particle]) {
        for p in particles.iter_mut() {
            p.cell = self.cell_index_of(p.pos);
        }

        if self.order.len() != particles.len() {
            self.order.clear();
            self.order.extend(0..particles.len());
        }
        self.order.sort_by_key(|&id| particles[id].cell);

        self.cell_start.fill(None);
        let cell_count = self.cell_start.len();
        for (offset, &id) in self.order.iter().enumerate() {
            let Some(slot) = usize::try_from(particles[id].cell)
                .ok()
                .filter(|&slot| slot < cell_count)
            else {
                continue;
            };

            let start = &mut self.cell_start[slot];
            match self.policy {
                BucketOffsetPolicy::FirstOccurrence => {
                    if start.is_none() {
                        *start = Some(offset);
                    }
                }
                BucketOffsetPolicy::MinimumIndex => {
                    *start = Some(start.map_or(offset, |s| s.min(offset)));
                }
            }
        }

        log::trace!(
            "grid rebuilt: {} particles, {} occupied cells",
            particles.len(),
            self.cell_start.iter().filter(|s| s.is_some()).count()
        );
    }

    /// Appends the ids of all particles in `cell` whose tag passes `filter`.
    ///
    /// Nothing is appended if the cell is empty or out of bounds.
    ///
    /// ### Parameters
    /// - `cell` - Flattened cell index.
    /// - `particles` - The particle slice the grid was last rebuilt from.
    /// - `filter` - Tags to keep.
    /// - `out` - Buffer the matching ids are pushed onto.
    pub fn query_cell_into(
        &self,
        cell: CellIndex,
        particles: &[Particle],
        filter: &TypeFilter,
        out: &mut Vec<ParticleId>,
    ) {
        let Some(start) = self.cell_start(cell) else {
            return;
        };

        for &id in &self.order[start..] {
            let p = &particles[id];
            if p.cell != cell {
                break;
            }
            if filter.contains(&p.tag) {
                out.push(id);
            }
        }
    }

    /// Returns all particles in `cell` whose tag passes `filter`.
    pub fn query_cell(
        &self,
        cell: CellIndex,
        particles: &[Particle],
        filter: &TypeFilter,
    ) -> Vec<ParticleId> {
        let mut out = Vec::new();
        self.query_cell_into(cell, particles, filter, &mut out);
        out
    }

    /// Appends the filtered contents of the 3x3 block of cells around
    /// `particle`'s cached cell.
    ///
    /// Neighbor cells are addressed on the flattened index
    /// (`cell + dx + dy * grid_width`), and any index outside
    /// `[0, cell_count)` is skipped. At the left and right edges the column
    /// offset therefore spills into the neighboring row, which only adds
    /// candidates.
    ///
    /// This is an approximate radius query: only particles within one cell
    /// of the particle's own cell are found, so `cell_size` must be at least
    /// the largest radius a caller cares about.
    pub fn query_neighborhood_into(
        &self,
        particle: &Particle,
        particles: &[Particle],
        filter: &TypeFilter,
        out: &mut Vec<ParticleId>,
    ) {
        let width = self.grid_width as CellIndex;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let cell = particle.cell.saturating_add(dx + dy * width);
                self.query_cell_into(cell, particles, filter, out);
            }
        }
    }

    /// Returns the filtered contents of the 3x3 neighborhood of `particle`.
    pub fn query_neighborhood(
        &self,
        particle: &Particle,
        particles: &[Particle],
        filter: &TypeFilter,
    ) -> Vec<ParticleId> {
        let mut out = Vec::new();
        self.query_neighborhood_into(particle, particles, filter, &mut out);
        out
    }
}
