use crate::containers::StorageKey;

/// An identifier to a stage instance within a pipeline.
/// Each stage is assigned a unique identifier when it is added.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct StageId(pub(crate) u32);

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StageId({})", self.0)
    }
}

impl StorageKey for StageId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        StageId(index as u32)
    }
}
