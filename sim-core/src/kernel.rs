//! Force kernels: pure functions from a target position and its neighbor
//! positions to a velocity delta for the target.
//!
//! Kernels are plain parameter values tagged by kind, so a registry entry
//! can be inspected, compared and logged.

use glam::Vec2;

/// Softening term added to every distance normalization.
pub const EPSILON: f32 = 0.1;

/// Parameters of the pairwise and averaged kernels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceParams {
    /// Neighbors at or beyond this Euclidean distance are ignored.
    pub threshold: f32,
    /// Positive pushes the target away, negative pulls it in.
    pub strength: f32,
}

/// Parameters of the boundary containment kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryParams {
    pub width: f32,
    pub height: f32,
    /// Width of the band along each edge in which the push applies.
    pub padding: f32,
    pub force: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Kernel {
    /// Independent contribution per in-range neighbor.
    Pairwise(ForceParams),
    /// Mean contribution over in-range neighbors, applied once.
    Averaged(ForceParams),
    /// Inward push near the plane's edges; neighbors are ignored.
    Boundary(BoundaryParams),
}

impl Kernel {
    pub fn pairwise(threshold: f32, strength: f32) -> Self {
        Self::Pairwise(ForceParams {
            threshold,
            strength,
        })
    }

    pub fn averaged(threshold: f32, strength: f32) -> Self {
        Self::Averaged(ForceParams {
            threshold,
            strength,
        })
    }

    pub fn boundary(width: f32, height: f32, padding: f32, force: f32) -> Self {
        Self::Boundary(BoundaryParams {
            width,
            height,
            padding,
            force,
        })
    }

    /// Whether the kernel reads its neighbor list at all. Dispatch skips the
    /// grid query for kernels that don't.
    pub fn uses_neighbors(&self) -> bool {
        !matches!(self, Self::Boundary(_))
    }

    /// Interaction radius, if the kernel has one.
    pub fn radius(&self) -> Option<f32> {
        match self {
            Self::Pairwise(p) | Self::Averaged(p) => Some(p.threshold),
            Self::Boundary(_) => None,
        }
    }

    /// Computes the velocity delta for a particle at `target`.
    ///
    /// ### Parameters
    /// - `target` - Position of the particle being pushed.
    /// - `neighbors` - Positions of candidate sources. Candidates may lie
    ///   outside the kernel's threshold; they are filtered by true distance.
    ///
    /// ### Returns
    /// The delta to add to the target's velocity.
    pub fn delta(&self, target: Vec2, neighbors: impl IntoIterator<Item = Vec2>) -> Vec2 {
        match self {
            Self::Pairwise(params) => pairwise_delta(params, target, neighbors),
            Self::Averaged(params) => averaged_delta(params, target, neighbors),
            Self::Boundary(params) => boundary_delta(params, target),
        }
    }
}

/// Direction from `target` to `source`, scaled by `1 / (d^2 + EPSILON)`,
/// together with the true distance.
#[inline]
fn falloff(target: Vec2, source: Vec2) -> (Vec2, f32) {
    let offset = source - target;
    let d2 = offset.length_squared();
    (offset / (d2 + EPSILON), d2.sqrt())
}

fn pairwise_delta(
    params: &ForceParams,
    target: Vec2,
    neighbors: impl IntoIterator<Item = Vec2>,
) -> Vec2 {
    let mut delta = Vec2::ZERO;
    for source in neighbors {
        let (dir, d) = falloff(target, source);
        if d < params.threshold {
            delta -= dir * params.strength;
        }
    }
    delta
}

fn averaged_delta(
    params: &ForceParams,
    target: Vec2,
    neighbors: impl IntoIterator<Item = Vec2>,
) -> Vec2 {
    let mut sum = Vec2::ZERO;
    let mut count = 0u32;
    for source in neighbors {
        let (dir, d) = falloff(target, source);
        if d < params.threshold {
            sum -= dir * params.strength;
            count += 1;
        }
    }

    if count == 0 {
        Vec2::ZERO
    } else {
        sum / (count as f32)
    }
}

fn boundary_delta(params: &BoundaryParams, target: Vec2) -> Vec2 {
    let mut delta = Vec2::ZERO;
    if target.x < params.padding {
        delta.x += params.force;
    }
    if target.x > params.width - params.padding {
        delta.x -= params.force;
    }
    if target.y < params.padding {
        delta.y += params.force;
    }
    if target.y > params.height - params.padding {
        delta.y -= params.force;
    }
    delta
}
