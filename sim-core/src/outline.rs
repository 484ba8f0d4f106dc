use crate::types::ParticleId;

/// An ordered ring of particles a renderer draws as one closed contour,
/// e.g. the membrane of a blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outline {
    pub members: Vec<ParticleId>,
}

impl Outline {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
