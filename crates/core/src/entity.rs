//! Identity of long-lived domain objects.

/// Something that keeps its identity while its attributes change.
///
/// Products and inventory records are identified by product code; actors,
/// bills and movements by generated ids.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Same identity, whatever the current attribute values.
    fn is_same_entity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
