use crate::{error::SimError, grid::BucketOffsetPolicy};
use glam::Vec2;

#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Size of the simulated plane; the grid covers `[0, w) x [0, h)`.
    pub world_size: Vec2,
    /// Side length of one grid cell. Should be at least the largest
    /// interaction radius, otherwise in-range neighbors can be missed.
    pub cell_size: f32,
    /// Per-step velocity multiplier, in `(0, 1)`.
    pub damping: f32,
    pub bucket_policy: BucketOffsetPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world_size: Vec2::new(1600.0, 1000.0),
            cell_size: 200.0,
            damping: 0.8,
            bucket_policy: BucketOffsetPolicy::FirstOccurrence,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), SimError> {
        let Vec2 {
            x: width,
            y: height,
        } = self.world_size;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SimError::InvalidWorldSize { width, height });
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(SimError::InvalidCellSize(self.cell_size));
        }
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(SimError::InvalidDamping(self.damping));
        }
        Ok(())
    }
}
