//! The default scene: soft blobs drifting among loose dots.

use glam::Vec2;
use particle_sim_core::{
    config::Config,
    error::SimError,
    kernel::Kernel,
    scene::{self, BLOB, BlobSpec},
    simulation::Simulation,
    types::Color,
};
use rand::Rng;

pub const DOT: &str = "dot";

pub const BACKGROUND: Color = [15, 3, 38, 255];
pub const BLOB_INNER: Color = [255, 105, 120, 255];
pub const BLOB_STROKE: Color = [250, 76, 60, 255];
pub const DOT_FILL: Color = [171, 201, 115, 255];

const RANDOM_BLOBS: usize = 20;
const DOTS: usize = 200;

/// Registers the interaction table of the default scene.
///
/// Blobs keep each other at arm's length with two short-range repulsions
/// and drift together under a weak long-range pull. Dots repel dots and
/// blobs up close, clump loosely at mid range and are drawn towards blobs
/// from far away. Both types are pushed back from the edges.
pub fn register_interactions(sim: &mut Simulation) {
    let size = sim.config().world_size;
    let contain = Kernel::boundary(size.x, size.y, 100.0, 0.6);
    sim.register(contain, [BLOB], [DOT]);
    sim.register(contain, [DOT], [DOT]);

    sim.register(Kernel::pairwise(70.0, 0.5), [BLOB], [BLOB]);
    sim.register(Kernel::pairwise(30.0, 1.0), [BLOB], [BLOB]);
    sim.register(Kernel::pairwise(400.0, -0.05), [BLOB], [BLOB]);

    sim.register(Kernel::pairwise(50.0, 0.7), [DOT], [DOT, BLOB]);
    sim.register(Kernel::pairwise(40.0, 0.7), [DOT], [DOT]);
    sim.register(Kernel::pairwise(100.0, -0.4), [DOT], [DOT]);
    sim.register(Kernel::pairwise(400.0, -0.03), [DOT], [BLOB]);
}

fn blob(center: Vec2, count: usize, radius: f32, rng: &mut impl Rng) -> BlobSpec {
    BlobSpec {
        cilia: rng.random_bool(0.3),
        cilia_color: BLOB_STROKE,
        ..BlobSpec::new(center, count, radius)
    }
}

/// Builds the default scene for `cfg`.
pub fn build(cfg: Config, rng: &mut impl Rng) -> Result<Simulation, SimError> {
    let mut sim = Simulation::new(cfg)?;
    register_interactions(&mut sim);

    let size = cfg.world_size;
    for _ in 0..RANDOM_BLOBS {
        let center = Vec2::new(rng.random_range(0.0..size.x), rng.random_range(0.0..size.y));
        let spec = BlobSpec {
            cilia_color: BLOB_STROKE,
            ..BlobSpec::random(center, rng)
        };
        scene::spawn_blob(&mut sim, &spec)?;
    }

    // Nested clusters: a large membrane with two smaller blobs inside.
    let mid = size / 2.0;
    for origin in [mid, mid - Vec2::splat(400.0)] {
        scene::spawn_blob(&mut sim, &blob(origin, 15, 150.0, rng))?;
        scene::spawn_blob(&mut sim, &blob(origin, 13, 50.0, rng))?;
    }
    scene::spawn_blob(&mut sim, &blob(mid + Vec2::splat(30.0), 13, 50.0, rng))?;
    scene::spawn_blob(&mut sim, &blob(mid + Vec2::splat(50.0 - 400.0), 13, 50.0, rng))?;
    scene::spawn_blob(&mut sim, &blob(mid, 10, 30.0, rng))?;
    scene::spawn_blob(&mut sim, &blob(mid + Vec2::new(0.0, 50.0), 8, 20.0, rng))?;

    scene::scatter(&mut sim, DOTS, DOT, rng);

    sim.rebuild();
    log::info!(
        "built default scene: {} particles, {} springs, {} blobs",
        sim.particles().len(),
        sim.springs().len(),
        sim.outlines().len()
    );
    Ok(sim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use particle_sim_core::types::TypeTag;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn build_populates_blobs_dots_and_interactions() {
        let mut rng = StdRng::seed_from_u64(1);
        let sim = build(Config::default(), &mut rng).unwrap();

        assert_eq!(sim.outlines().len(), RANDOM_BLOBS + 8);
        let dots = sim
            .particles()
            .iter()
            .filter(|p| p.tag.as_str() == DOT)
            .count();
        assert_eq!(dots, DOTS);

        assert_eq!(sim.registry().for_type(&TypeTag::new(BLOB)).len(), 4);
        assert_eq!(sim.registry().for_type(&TypeTag::new(DOT)).len(), 5);
    }

    #[test]
    fn build_rejects_invalid_config() {
        let mut rng = StdRng::seed_from_u64(1);
        let cfg = Config {
            cell_size: -3.0,
            ..Config::default()
        };
        assert_eq!(
            build(cfg, &mut rng).unwrap_err(),
            SimError::InvalidCellSize(-3.0)
        );
    }
}
