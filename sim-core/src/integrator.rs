use crate::{error::SimError, particle::Particle};

/// Unit-step explicit Euler with exponential velocity damping.
#[derive(Clone, Copy, Debug)]
pub struct Integrator {
    damping: f32,
}

impl Integrator {
    /// ### Returns
    /// The integrator, or [`SimError::InvalidDamping`] unless `0 < damping < 1`.
    pub fn new(damping: f32) -> Result<Self, SimError> {
        if !(damping > 0.0 && damping < 1.0) {
            return Err(SimError::InvalidDamping(damping));
        }
        Ok(Self { damping })
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// `pos += vel`, then `vel *= damping`. Pinned particles stay put and
    /// lose whatever velocity they accumulated.
    #[inline]
    pub fn advance(&self, p: &mut Particle) {
        if p.pinned {
            p.vel = glam::Vec2::ZERO;
            return;
        }
        p.pos += p.vel;
        p.vel *= self.damping;
    }
}
