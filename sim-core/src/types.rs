use std::{fmt, sync::Arc};

/// Identifier for a particle in a [`crate::simulation::Simulation`].
///
/// This is an index into `Simulation::particles`, and is only meaningful
/// within the lifetime of a given `Simulation` instance. Ids never move when
/// the spatial grid re-sorts; the grid sorts a permutation of ids instead.
pub type ParticleId = usize;

/// Index into `Simulation::springs`.
pub type SpringId = usize;

/// Index into `Simulation::outlines`.
pub type OutlineId = usize;

/// Flattened grid cell index (`cell_x + cell_y * grid_width`).
///
/// Signed because positions left of or above the plane map to negative
/// cells, which are never stored but still need a well-defined index.
pub type CellIndex = i64;

/// RGBA display color carried through to the renderer untouched.
pub type Color = [u8; 4];

/// Particle type tag from an open set, e.g. `"blob"`, `"dot"`, `"vine"`.
///
/// Cloning is a reference-count bump, so tags can be stored on every
/// particle and in every registry filter without copying strings.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(Arc<str>);

impl TypeTag {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A set of type tags a query or kernel is allowed to see.
///
/// Filters are tiny (one to three tags in practice), so a linear scan over
/// a `Vec` beats hashing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeFilter {
    tags: Vec<TypeTag>,
}

impl TypeFilter {
    pub fn new<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeTag>,
    {
        let mut filter = Self::default();
        for tag in tags {
            let tag = tag.into();
            if !filter.tags.contains(&tag) {
                filter.tags.push(tag);
            }
        }
        filter
    }

    #[inline]
    pub fn contains(&self, tag: &TypeTag) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn tags(&self) -> &[TypeTag] {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
