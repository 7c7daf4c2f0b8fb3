//! Records tracked by identity rather than by value.

/// A record whose identity survives revisions (an expense edited in place
/// keeps its id).
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Display;

    fn id(&self) -> &Self::Id;

    /// Owned copy of the id, used as the key when indexing records.
    fn key(&self) -> Self::Id {
        self.id().clone()
    }
}
