use crate::types::{CellIndex, TypeTag};
use glam::Vec2;

#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub tag: TypeTag,
    pub visible: bool,
    /// Pinned particles still act as neighbors and spring anchors but are
    /// neither pushed by kernels nor moved by the integrator.
    pub pinned: bool,
    /// Grid cell cached by the last rebuild. Stale as soon as `pos` changes.
    pub(crate) cell: CellIndex,
}

impl Particle {
    pub fn new(pos: Vec2, tag: impl Into<TypeTag>, visible: bool) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            tag: tag.into(),
            visible,
            pinned: false,
            cell: 0,
        }
    }

    /// Cell index assigned by the most recent grid rebuild.
    pub fn cell(&self) -> CellIndex {
        self.cell
    }
}
