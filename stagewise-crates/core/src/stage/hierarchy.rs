use std::rc::Rc;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;

use super::StageData;
use crate::interface::InterfaceId;
use crate::solutions::Introspection;

static NEXT_CONTAINER_ID: AtomicU32 = AtomicU32::new(0);

/// Identifies a container which owns child stages.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct ContainerId(u32);

impl ContainerId {
    pub(crate) fn fresh() -> ContainerId {
        ContainerId(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The place of a stage within its parent container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hierarchy {
    pub parent: ContainerId,
    /// The index of the stage among the children of `parent`.
    pub position: usize,
}

/// The capability to change the structural fields of a stage.
///
/// Only the container which owns the stage can construct one; stages themselves and domain code
/// can only read these fields through [`StageData`].
#[derive(Debug)]
pub struct HierarchyWiring<'a> {
    stage: &'a mut StageData,
}

impl<'a> HierarchyWiring<'a> {
    pub(crate) fn new(stage: &'a mut StageData) -> Self {
        HierarchyWiring { stage }
    }

    pub fn set_hierarchy(&mut self, parent: ContainerId, position: usize) {
        self.stage.hierarchy = Some(Hierarchy { parent, position });
    }

    pub fn clear_hierarchy(&mut self) {
        self.stage.hierarchy = None;
    }

    /// Set the interface into which backward states are pushed.
    pub fn set_prev_ends(&mut self, interface: Option<InterfaceId>) {
        self.stage.prev_ends = interface;
    }

    /// Set the interface into which forward states are pushed.
    pub fn set_next_starts(&mut self, interface: Option<InterfaceId>) {
        self.stage.next_starts = interface;
    }

    pub fn set_introspection(&mut self, introspection: Option<Rc<Introspection>>) {
        self.stage.introspection = introspection;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageId;

    #[test]
    fn wiring_sets_the_structural_fields() {
        let mut data = StageData::new(StageId(0), "stage");
        let container = ContainerId::fresh();

        let mut wiring = HierarchyWiring::new(&mut data);
        wiring.set_hierarchy(container, 2);
        wiring.set_next_starts(Some(InterfaceId(4)));

        assert_eq!(
            Some(Hierarchy {
                parent: container,
                position: 2
            }),
            data.hierarchy()
        );
        assert_eq!(Some(InterfaceId(4)), data.next_starts());
        assert_eq!(None, data.prev_ends());
    }

    #[test]
    fn containers_are_distinct() {
        assert_ne!(ContainerId::fresh(), ContainerId::fresh());
    }
}
