use crate::{
    kernel::EPSILON,
    particle::Particle,
    types::{Color, ParticleId},
};
use glam::Vec2;

/// Hookean spring between two particles of the same simulation.
///
/// The spring does not own its endpoints; it refers to them by id and is
/// only meaningful against the particle set it was created for.
#[derive(Clone, Debug)]
pub struct Spring {
    pub a: ParticleId,
    pub b: ParticleId,
    pub rest_length: f32,
    pub stiffness: f32,
    pub visible: bool,
    pub color: Color,
}

impl Spring {
    pub fn new(a: ParticleId, b: ParticleId, rest_length: f32, stiffness: f32) -> Self {
        Self {
            a,
            b,
            rest_length,
            stiffness,
            visible: false,
            color: [255, 255, 255, 255],
        }
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Velocity change for endpoint A given both endpoint positions;
    /// endpoint B receives the negation.
    ///
    /// Points from A towards B when stretched beyond the rest length and
    /// away from B when compressed.
    #[inline]
    pub fn impulse(&self, pos_a: Vec2, pos_b: Vec2) -> Vec2 {
        let offset = pos_b - pos_a;
        let d = offset.length();
        let dir = offset / (d + EPSILON);
        dir * ((d - self.rest_length) * self.stiffness)
    }

    /// Applies equal and opposite velocity deltas to both endpoints.
    ///
    /// ### Panics
    /// Panics if either endpoint id is out of bounds for `particles`.
    pub fn apply(&self, particles: &mut [Particle]) {
        let impulse = self.impulse(particles[self.a].pos, particles[self.b].pos);
        particles[self.a].vel += impulse;
        particles[self.b].vel -= impulse;
    }
}
