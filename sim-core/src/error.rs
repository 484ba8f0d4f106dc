use crate::types::ParticleId;
use thiserror::Error;

/// Errors raised while constructing a simulation or its scene.
///
/// The per-tick path never produces these; everything that can go wrong
/// during a step degrades to a no-op instead.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("cell size must be a finite positive number, got {0}")]
    InvalidCellSize(f32),
    #[error("world size must be finite and positive, got {width} x {height}")]
    InvalidWorldSize { width: f32, height: f32 },
    #[error("damping factor must lie in (0, 1), got {0}")]
    InvalidDamping(f32),
    #[error("particle {0} does not exist")]
    UnknownParticle(ParticleId),
    #[error("spring endpoints must differ, both are particle {0}")]
    SelfSpring(ParticleId),
    #[error("spring rest length must be a finite positive number, got {0}")]
    InvalidRestLength(f32),
    #[error("outline must contain at least one particle")]
    EmptyOutline,
}
