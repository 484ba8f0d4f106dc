//! Helpers for populating a [`Simulation`] with common structures.

use crate::{
    error::SimError,
    simulation::Simulation,
    spring::Spring,
    types::{Color, ParticleId, TypeTag},
};
use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

/// Tag given to blob membrane and cilia particles.
pub const BLOB: &str = "blob";

/// A ring of hidden particles held together by springs, optionally fringed
/// with cilia.
#[derive(Clone, Copy, Debug)]
pub struct BlobSpec {
    pub center: Vec2,
    pub count: usize,
    pub radius: f32,
    /// Adds one particle per member at `1.3 * radius`, tied to it by a
    /// visible spring.
    pub cilia: bool,
    pub cilia_color: Color,
}

impl BlobSpec {
    pub fn new(center: Vec2, count: usize, radius: f32) -> Self {
        Self {
            center,
            count,
            radius,
            cilia: false,
            cilia_color: [255, 255, 255, 255],
        }
    }

    /// A blob with `7..19` members, radius `5 * count`, and cilia about
    /// 30% of the time.
    pub fn random(center: Vec2, rng: &mut impl Rng) -> Self {
        let count = rng.random_range(7..19);
        Self {
            cilia: rng.random_bool(0.3),
            ..Self::new(center, count, count as f32 * 5.0)
        }
    }
}

/// Spawns a blob and registers its ring as an outline.
///
/// Members are placed evenly on the circle, consecutive members are joined
/// by hidden springs of rest length `radius / 4` and stiffness `0.2`, and
/// cilia (if any) hang off their member with rest length `count` and
/// stiffness `0.4`.
///
/// ### Returns
/// The ids of the ring members in outline order, or [`SimError`] if the
/// blob has no members or its ring rest length is not a finite positive
/// number. Nothing is added to `sim` on error.
pub fn spawn_blob(sim: &mut Simulation, spec: &BlobSpec) -> Result<Vec<ParticleId>, SimError> {
    if spec.count == 0 {
        return Err(SimError::EmptyOutline);
    }
    let ring_length = spec.radius / 4.0;
    if !(ring_length.is_finite() && ring_length > 0.0) {
        return Err(SimError::InvalidRestLength(ring_length));
    }

    let tag = TypeTag::new(BLOB);
    let mut members = Vec::with_capacity(spec.count);

    for i in 0..spec.count {
        let angle = i as f32 * TAU / spec.count as f32;
        let dir = Vec2::from_angle(angle);
        let member = sim.add_particle(spec.center + dir * spec.radius, tag.clone(), false);
        members.push(member);

        if spec.cilia {
            let tip = sim.add_particle(spec.center + dir * spec.radius * 1.3, tag.clone(), false);
            sim.add_spring(
                Spring::new(member, tip, spec.count as f32, 0.4)
                    .visible(true)
                    .with_color(spec.cilia_color),
            )?;
        }
    }

    for i in 0..spec.count {
        let next = members[(i + 1) % spec.count];
        if next != members[i] {
            sim.add_spring(Spring::new(members[i], next, ring_length, 0.2))?;
        }
    }

    sim.add_outline(members.clone())?;
    log::debug!(
        "spawned blob at {:?}: {} members, radius {}, cilia {}",
        spec.center,
        spec.count,
        spec.radius,
        spec.cilia
    );
    Ok(members)
}

/// Scatters `count` visible particles uniformly over the world.
pub fn scatter(
    sim: &mut Simulation,
    count: usize,
    tag: impl Into<TypeTag>,
    rng: &mut impl Rng,
) -> Vec<ParticleId> {
    let tag = tag.into();
    let size = sim.config().world_size;
    (0..count)
        .map(|_| {
            let x = rng.random_range(0.0..size.x);
            let y = rng.random_range(0.0..size.y);
            sim.add_particle(Vec2::new(x, y), tag.clone(), true)
        })
        .collect()
}
