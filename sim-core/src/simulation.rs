//! The owned simulation context and its per-tick phases.
//!
//! A tick is two phases:
//! 1. [`Simulation::rebuild`] — re-bucket every particle into the
//!    [`SpatialGrid`] from its current position.
//! 2. The advance pass — walk particles in the grid's sorted order; for
//!    each one dispatch its registered kernels against its neighborhood,
//!    integrate it, and run the spring stored at the same pass index.
//!
//! Neighbor queries read the cell snapshot taken at rebuild time, so a
//! particle that already moved earlier in the pass is still found in its
//! old cell (with its new position).

use crate::{
    config::Config,
    error::SimError,
    grid::SpatialGrid,
    integrator::Integrator,
    kernel::Kernel,
    outline::Outline,
    particle::Particle,
    registry::InteractionRegistry,
    spring::Spring,
    types::{OutlineId, ParticleId, SpringId, TypeFilter, TypeTag},
};
use glam::Vec2;

#[derive(Debug)]
pub struct Simulation {
    cfg: Config,
    particles: Vec<Particle>,
    springs: Vec<Spring>,
    outlines: Vec<Outline>,
    grid: SpatialGrid,
    registry: InteractionRegistry,
    integrator: Integrator,
    /// Reused neighbor id buffer, so dispatch doesn't allocate per query.
    scratch: Vec<ParticleId>,
    tick: u64,
}

impl Simulation {
    /// Creates an empty simulation with a built, all-empty grid.
    ///
    /// ### Returns
    /// The simulation, or the first [`SimError`] found by
    /// [`Config::validate`].
    pub fn new(cfg: Config) -> Result<Self, SimError> {
        cfg.validate()?;
        let mut grid = SpatialGrid::new(cfg.world_size, cfg.cell_size, cfg.bucket_policy)?;
        let integrator = Integrator::new(cfg.damping)?;

        let mut particles = Vec::new();
        grid.rebuild(&mut particles);

        log::debug!(
            "simulation created: {}x{} cells of size {}, damping {}",
            grid.grid_width(),
            grid.grid_height(),
            cfg.cell_size,
            cfg.damping
        );

        Ok(Self {
            cfg,
            particles,
            springs: Vec::new(),
            outlines: Vec::new(),
            grid,
            registry: InteractionRegistry::new(),
            integrator,
            scratch: Vec::with_capacity(64),
            tick: 0,
        })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id)
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    pub fn outlines(&self) -> &[Outline] {
        &self.outlines
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn registry(&self) -> &InteractionRegistry {
        &self.registry
    }

    /// Number of completed [`Simulation::step`] calls.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn add_particle(&mut self, pos: Vec2, tag: impl Into<TypeTag>, visible: bool) -> ParticleId {
        let id = self.particles.len();
        self.particles.push(Particle::new(pos, tag, visible));
        id
    }

    fn check_particle(&self, id: ParticleId) -> Result<(), SimError> {
        if id < self.particles.len() {
            Ok(())
        } else {
            Err(SimError::UnknownParticle(id))
        }
    }

    /// Adds a spring between two existing, distinct particles.
    ///
    /// Springs run in storage order: spring `i` is applied right after the
    /// `i`-th particle of each advance pass is integrated.
    pub fn add_spring(&mut self, spring: Spring) -> Result<SpringId, SimError> {
        self.check_particle(spring.a)?;
        self.check_particle(spring.b)?;
        if spring.a == spring.b {
            return Err(SimError::SelfSpring(spring.a));
        }
        if !(spring.rest_length.is_finite() && spring.rest_length > 0.0) {
            return Err(SimError::InvalidRestLength(spring.rest_length));
        }

        let id = self.springs.len();
        self.springs.push(spring);
        Ok(id)
    }

    pub fn add_outline(&mut self, members: Vec<ParticleId>) -> Result<OutlineId, SimError> {
        if members.is_empty() {
            return Err(SimError::EmptyOutline);
        }
        for &id in &members {
            self.check_particle(id)?;
        }

        let id = self.outlines.len();
        self.outlines.push(Outline { members });
        Ok(id)
    }

    /// Registers `kernel` for every tag in `targets`, fed by neighbors whose
    /// tags are in `sources`. Registration order is application order.
    pub fn register<I, T, J, S>(&mut self, kernel: Kernel, targets: I, sources: J)
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeTag>,
        J: IntoIterator<Item = S>,
        S: Into<TypeTag>,
    {
        if let Some(radius) = kernel.radius()
            && radius > self.cfg.cell_size
        {
            log::debug!(
                "kernel radius {} exceeds cell size {}; neighbors beyond one cell are not seen",
                radius,
                self.cfg.cell_size
            );
        }
        self.registry
            .register(kernel, targets, TypeFilter::new(sources));
    }

    pub fn set_pinned(&mut self, id: ParticleId, pinned: bool) -> Result<(), SimError> {
        self.check_particle(id)?;
        self.particles[id].pinned = pinned;
        Ok(())
    }

    /// Positions of a spring's endpoints.
    pub fn spring_endpoints(&self, spring: &Spring) -> (Vec2, Vec2) {
        (self.particles[spring.a].pos, self.particles[spring.b].pos)
    }

    /// Member positions of an outline in ring order; empty if `id` is unknown.
    pub fn outline_points(&self, id: OutlineId) -> impl Iterator<Item = Vec2> + '_ {
        self.outlines
            .get(id)
            .into_iter()
            .flat_map(|o| o.members.iter().map(|&m| self.particles[m].pos))
    }

    /// Removes all particles, springs and outlines. Registered interactions
    /// are kept.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.springs.clear();
        self.outlines.clear();
        self.grid.rebuild(&mut self.particles);
    }

    /// Re-buckets all particles from their current positions.
    pub fn rebuild(&mut self) {
        self.grid.rebuild(&mut self.particles);
    }

    /// Applies every interaction registered for particle `id`'s type.
    ///
    /// For each entry in registration order, the particle's 3x3 neighborhood
    /// is queried with the entry's source filter (the particle itself is
    /// excluded) and the kernel's delta is added to the velocity. Pinned
    /// particles and unregistered types are left untouched.
    ///
    /// Uses the cells from the last [`Simulation::rebuild`].
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds.
    pub fn dispatch(&mut self, id: ParticleId) {
        let Self {
            particles,
            grid,
            registry,
            scratch,
            ..
        } = self;

        let target = &particles[id];
        if target.pinned {
            return;
        }

        let mut dv = Vec2::ZERO;
        for entry in registry.for_type(&target.tag) {
            scratch.clear();
            if entry.kernel.uses_neighbors() {
                grid.query_neighborhood_into(target, particles, &entry.sources, scratch);
                scratch.retain(|&n| n != id);
            }
            dv += entry
                .kernel
                .delta(target.pos, scratch.iter().map(|&n| particles[n].pos));
        }

        particles[id].vel += dv;
    }

    /// Advances the simulation by one tick.
    pub fn step(&mut self) {
        self.rebuild();

        for pass in 0..self.grid.order().len() {
            let id = self.grid.order()[pass];
            self.dispatch(id);
            self.integrator.advance(&mut self.particles[id]);
            if let Some(spring) = self.springs.get(pass) {
                spring.apply(&mut self.particles);
            }
        }

        self.tick += 1;
        log::trace!(
            "tick {}: {} particles, {} springs",
            self.tick,
            self.particles.len(),
            self.springs.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> Simulation {
        Simulation::new(Config {
            world_size: Vec2::new(1000.0, 1000.0),
            cell_size: 100.0,
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn new_starts_empty_with_built_grid() {
        let sim = sim();
        assert!(sim.particles().is_empty());
        assert!(sim.springs().is_empty());
        assert!(sim.grid().order().is_empty());
        assert_eq!(sim.grid().cell_count(), 100);
        assert_eq!(sim.tick(), 0);
    }

    #[test]
    fn new_propagates_config_errors() {
        let cfg = Config {
            damping: 2.0,
            ..Config::default()
        };
        assert_eq!(Simulation::new(cfg).unwrap_err(), SimError::InvalidDamping(2.0));
    }

    #[test]
    fn close_pair_pushes_apart_symmetrically() {
        let mut sim = sim();
        let a = sim.add_particle(Vec2::new(500.0, 500.0), "dot", true);
        let b = sim.add_particle(Vec2::new(505.0, 500.0), "dot", true);
        sim.register(Kernel::pairwise(10.0, 1.0), ["dot"], ["dot"]);

        sim.rebuild();
        sim.dispatch(a);
        sim.dispatch(b);

        let va = sim.particles()[a].vel;
        let vb = sim.particles()[b].vel;
        assert!(va.x < 0.0, "a should move away from b, got {va:?}");
        assert!(vb.x > 0.0, "b should move away from a, got {vb:?}");
        assert!((va + vb).length() < 1e-6);
        assert_eq!(va.y, 0.0);
    }

    #[test]
    fn distant_pair_is_unaffected() {
        let mut sim = sim();
        let a = sim.add_particle(Vec2::new(500.0, 500.0), "dot", true);
        let b = sim.add_particle(Vec2::new(550.0, 500.0), "dot", true);
        sim.register(Kernel::pairwise(10.0, 1.0), ["dot"], ["dot"]);

        sim.rebuild();
        sim.dispatch(a);
        sim.dispatch(b);

        assert_eq!(sim.particles()[a].vel, Vec2::ZERO);
        assert_eq!(sim.particles()[b].vel, Vec2::ZERO);
    }

    #[test]
    fn dispatch_for_unregistered_type_is_noop() {
        let mut sim = sim();
        let a = sim.add_particle(Vec2::new(500.0, 500.0), "vine", true);
        sim.add_particle(Vec2::new(502.0, 500.0), "dot", true);
        sim.register(Kernel::pairwise(10.0, 1.0), ["dot"], ["dot", "vine"]);

        sim.rebuild();
        sim.dispatch(a);

        assert_eq!(sim.particles()[a].vel, Vec2::ZERO);
    }

    #[test]
    fn dispatch_respects_source_filter() {
        let mut sim = sim();
        let a = sim.add_particle(Vec2::new(500.0, 500.0), "dot", true);
        sim.add_particle(Vec2::new(503.0, 500.0), "blob", false);
        sim.register(Kernel::pairwise(10.0, 1.0), ["dot"], ["dot"]);

        sim.rebuild();
        sim.dispatch(a);
        assert_eq!(sim.particles()[a].vel, Vec2::ZERO);

        sim.register(Kernel::pairwise(10.0, 1.0), ["dot"], ["blob"]);
        sim.dispatch(a);
        assert!(sim.particles()[a].vel.x < 0.0);
    }

    #[test]
    fn averaged_kernel_excludes_the_target_itself() {
        let mut sim = sim();
        let a = sim.add_particle(Vec2::new(500.0, 500.0), "vine", true);
        sim.add_particle(Vec2::new(504.0, 500.0), "vine", true);
        sim.register(Kernel::averaged(10.0, 1.0), ["vine"], ["vine"]);

        sim.rebuild();
        sim.dispatch(a);

        let expected = Kernel::averaged(10.0, 1.0)
            .delta(Vec2::new(500.0, 500.0), [Vec2::new(504.0, 500.0)]);
        assert!((sim.particles()[a].vel - expected).length() < 1e-6);
    }

    #[test]
    fn boundary_kernel_applies_without_neighbors() {
        let mut sim = sim();
        let a = sim.add_particle(Vec2::new(20.0, 500.0), "blob", false);
        sim.register(Kernel::boundary(1000.0, 1000.0, 100.0, 0.6), ["blob"], ["dot"]);

        sim.rebuild();
        sim.dispatch(a);

        assert_eq!(sim.particles()[a].vel, Vec2::new(0.6, 0.0));
    }

    #[test]
    fn interactions_accumulate_in_registration_order() {
        let mut sim = sim();
        let a = sim.add_particle(Vec2::new(500.0, 500.0), "blob", false);
        sim.add_particle(Vec2::new(520.0, 500.0), "blob", false);
        sim.register(Kernel::pairwise(70.0, 0.5), ["blob"], ["blob"]);
        sim.register(Kernel::pairwise(30.0, 1.0), ["blob"], ["blob"]);
        sim.register(Kernel::pairwise(400.0, -0.05), ["blob"], ["blob"]);

        sim.rebuild();
        sim.dispatch(a);

        let src = [Vec2::new(520.0, 500.0)];
        let at = Vec2::new(500.0, 500.0);
        let expected = Kernel::pairwise(70.0, 0.5).delta(at, src)
            + Kernel::pairwise(30.0, 1.0).delta(at, src)
            + Kernel::pairwise(400.0, -0.05).delta(at, src);
        assert!((sim.particles()[a].vel - expected).length() < 1e-6);
    }

    #[test]
    fn spring_ring_at_rest_length_stays_in_equilibrium() {
        let mut sim = sim();
        let side = 30.0_f32;
        let h = side * 3.0_f32.sqrt() / 2.0;
        let ids = [
            sim.add_particle(Vec2::new(400.0, 400.0), "blob", false),
            sim.add_particle(Vec2::new(400.0 + side, 400.0), "blob", false),
            sim.add_particle(Vec2::new(400.0 + side / 2.0, 400.0 + h), "blob", false),
        ];
        for i in 0..3 {
            sim.add_spring(Spring::new(ids[i], ids[(i + 1) % 3], side, 0.2))
                .unwrap();
        }

        let springs = sim.springs().to_vec();
        for spring in &springs {
            spring.apply(&mut sim.particles);
        }

        for &id in &ids {
            assert!(sim.particles()[id].vel.length() < 1e-4);
        }
        let net: Vec2 = ids.iter().map(|&id| sim.particles()[id].vel).sum();
        assert!(net.length() < 1e-6);
    }

    #[test]
    fn step_runs_springs_and_integrates() {
        let mut sim = sim();
        let a = sim.add_particle(Vec2::new(300.0, 300.0), "blob", false);
        let b = sim.add_particle(Vec2::new(340.0, 300.0), "blob", false);
        sim.add_spring(Spring::new(a, b, 10.0, 0.2)).unwrap();

        let before = sim.particles()[a].pos.distance(sim.particles()[b].pos);
        sim.step();
        sim.step();
        let after = sim.particles()[a].pos.distance(sim.particles()[b].pos);

        assert!(after < before);
        assert_eq!(sim.tick(), 2);
    }

    #[test]
    fn step_walks_sorted_order_and_pairs_springs_by_pass_index() {
        let mut sim = sim();
        // Id 0 sits in the last cell, so it is visited last.
        let far = sim.add_particle(Vec2::new(950.0, 950.0), "blob", false);
        let first = sim.add_particle(Vec2::new(10.0, 10.0), "blob", false);
        let second = sim.add_particle(Vec2::new(40.0, 10.0), "blob", false);
        sim.add_spring(Spring::new(first, second, 5.0, 0.2)).unwrap();

        let p_first = sim.particles()[first].pos;
        let p_second = sim.particles()[second].pos;
        let impulse = sim.springs()[0].impulse(p_first, p_second);

        sim.step();

        assert_eq!(sim.grid().order(), &[first, second, far]);
        // Spring 0 runs after pass 0 integrated `first`, so `first` only
        // gained velocity while `second` already moved on pass 1.
        assert_eq!(sim.particles()[first].pos, p_first);
        assert!((sim.particles()[first].vel - impulse).length() < 1e-6);
        assert!((sim.particles()[second].pos - (p_second - impulse)).length() < 1e-4);
        assert_eq!(sim.particles()[far].pos, Vec2::new(950.0, 950.0));
        assert_eq!(sim.particles()[far].vel, Vec2::ZERO);
    }

    #[test]
    fn springs_beyond_the_pass_length_never_run() {
        let mut sim = sim();
        let a = sim.add_particle(Vec2::new(100.0, 100.0), "blob", false);
        let b = sim.add_particle(Vec2::new(130.0, 140.0), "blob", false);
        let rest = (sim.particles()[b].pos - sim.particles()[a].pos).length();
        sim.add_spring(Spring::new(a, b, rest, 0.5)).unwrap();
        sim.add_spring(Spring::new(a, b, rest, 0.5)).unwrap();
        sim.add_spring(Spring::new(a, b, 1.0, 1.0)).unwrap();

        for _ in 0..3 {
            sim.step();
        }

        assert_eq!(sim.particles()[a].vel, Vec2::ZERO);
        assert_eq!(sim.particles()[b].vel, Vec2::ZERO);
        assert_eq!(sim.particles()[a].pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn step_survives_particles_far_outside_the_plane() {
        let mut sim = sim();
        sim.add_particle(Vec2::new(10.0, 1e30), "dot", true);
        sim.add_particle(Vec2::new(-1e30, 5.0), "dot", true);
        let near = sim.add_particle(Vec2::new(500.0, 500.0), "dot", true);
        sim.register(Kernel::pairwise(10.0, 1.0), ["dot"], ["dot"]);

        sim.step();

        assert_eq!(sim.tick(), 1);
        assert_eq!(sim.particles()[near].vel, Vec2::ZERO);
    }

    #[test]
    fn step_damps_free_particles() {
        let mut sim = sim();
        let a = sim.add_particle(Vec2::new(300.0, 300.0), "dot", true);
        sim.particles[a].vel = Vec2::new(10.0, 0.0);

        sim.step();

        assert_eq!(sim.particles()[a].pos, Vec2::new(310.0, 300.0));
        assert!((sim.particles()[a].vel.x - 8.0).abs() < 1e-6);
    }

    #[test]
    fn pinned_particle_ignores_forces() {
        let mut sim = sim();
        let a = sim.add_particle(Vec2::new(500.0, 500.0), "dot", true);
        sim.add_particle(Vec2::new(503.0, 500.0), "dot", true);
        sim.register(Kernel::pairwise(10.0, 1.0), ["dot"], ["dot"]);
        sim.set_pinned(a, true).unwrap();

        for _ in 0..5 {
            sim.step();
        }

        assert_eq!(sim.particles()[a].pos, Vec2::new(500.0, 500.0));
        assert!(sim.particles()[1].pos.x > 503.0);
    }

    #[test]
    fn add_spring_validates_endpoints_and_length() {
        let mut sim = sim();
        let a = sim.add_particle(Vec2::ZERO, "blob", false);
        let b = sim.add_particle(Vec2::ONE, "blob", false);

        assert_eq!(
            sim.add_spring(Spring::new(a, 9, 1.0, 0.2)).unwrap_err(),
            SimError::UnknownParticle(9)
        );
        assert_eq!(
            sim.add_spring(Spring::new(a, a, 1.0, 0.2)).unwrap_err(),
            SimError::SelfSpring(a)
        );
        assert_eq!(
            sim.add_spring(Spring::new(a, b, 0.0, 0.2)).unwrap_err(),
            SimError::InvalidRestLength(0.0)
        );
        assert_eq!(sim.add_spring(Spring::new(a, b, 1.0, 0.2)), Ok(0));
        assert_eq!(sim.set_pinned(5, true), Err(SimError::UnknownParticle(5)));
    }

    #[test]
    fn outlines_report_member_positions_in_order() {
        let mut sim = sim();
        let ids: Vec<ParticleId> = (0..4)
            .map(|i| sim.add_particle(Vec2::new(i as f32, 0.0), "blob", false))
            .collect();

        assert_eq!(sim.add_outline(Vec::new()), Err(SimError::EmptyOutline));
        assert_eq!(
            sim.add_outline(vec![0, 17]),
            Err(SimError::UnknownParticle(17))
        );

        let outline = sim.add_outline(vec![ids[2], ids[0], ids[3]]).unwrap();
        let points: Vec<Vec2> = sim.outline_points(outline).collect();
        assert_eq!(
            points,
            vec![Vec2::new(2.0, 0.0), Vec2::new(0.0, 0.0), Vec2::new(3.0, 0.0)]
        );
        assert_eq!(sim.outline_points(99).count(), 0);
    }

    #[test]
    fn clear_keeps_registry_but_drops_content() {
        let mut sim = sim();
        let a = sim.add_particle(Vec2::new(1.0, 1.0), "dot", true);
        let b = sim.add_particle(Vec2::new(2.0, 1.0), "dot", true);
        sim.add_spring(Spring::new(a, b, 1.0, 0.5)).unwrap();
        sim.register(Kernel::pairwise(10.0, 1.0), ["dot"], ["dot"]);
        sim.step();

        sim.clear();

        assert!(sim.particles().is_empty());
        assert!(sim.springs().is_empty());
        assert!(sim.outlines().is_empty());
        assert!(sim.grid().order().is_empty());
        assert_eq!(sim.registry().len(), 1);
        sim.step();
    }
}
