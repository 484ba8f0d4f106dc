use crate::{
    kernel::Kernel,
    types::{TypeFilter, TypeTag},
};
use std::collections::HashMap;

/// One registered interaction: a kernel acting on some target type, fed by
/// neighbors whose tags pass `sources`.
#[derive(Clone, Debug, PartialEq)]
pub struct Interaction {
    pub kernel: Kernel,
    pub sources: TypeFilter,
}

/// Maps a target type to the interactions applied to it, in registration
/// order.
#[derive(Debug, Default)]
pub struct InteractionRegistry {
    by_target: HashMap<TypeTag, Vec<Interaction>>,
}

impl InteractionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `kernel` to the list of every tag in `targets`, each entry
    /// sharing the same source filter.
    pub fn register<I, T>(&mut self, kernel: Kernel, targets: I, sources: TypeFilter)
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeTag>,
    {
        for target in targets {
            self.by_target
                .entry(target.into())
                .or_default()
                .push(Interaction {
                    kernel,
                    sources: sources.clone(),
                });
        }
    }

    /// Interactions registered for `tag`, or an empty slice.
    pub fn for_type(&self, tag: &TypeTag) -> &[Interaction] {
        self.by_target.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of entries across all target types.
    pub fn len(&self) -> usize {
        self.by_target.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_target.clear();
    }
}
