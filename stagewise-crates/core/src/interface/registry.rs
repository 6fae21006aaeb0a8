use std::collections::VecDeque;

use log::warn;

use super::Direction;
use super::Interface;
use super::InterfaceId;
use super::InterfaceNotification;
use super::InterfaceOwner;
use super::InterfaceState;
use crate::containers::KeyedVec;

/// Owns every interface of a pipeline.
///
/// Stages refer to the interfaces they push into by [`InterfaceId`] only; such a reference is
/// resolved through [`InterfaceRegistry::resolve`], which yields [`None`] once the owner has
/// released the interface.
#[derive(Debug, Default)]
pub struct InterfaceRegistry {
    interfaces: KeyedVec<InterfaceId, Option<Interface>>,
    notifications: VecDeque<InterfaceNotification>,
}

impl InterfaceRegistry {
    pub(crate) fn create(&mut self, direction: Direction, owner: InterfaceOwner) -> InterfaceId {
        let slot = self.interfaces.new_slot();
        let id = slot.key();
        slot.populate(Some(Interface::new(id, direction, owner)))
    }

    /// Drops the interface; every reference to it resolves to [`None`] afterwards.
    pub(crate) fn release(&mut self, id: InterfaceId) -> Option<Interface> {
        self.interfaces.get_mut(id).and_then(Option::take)
    }

    pub fn get(&self, id: InterfaceId) -> Option<&Interface> {
        self.interfaces.get(id).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: InterfaceId) -> Option<&mut Interface> {
        self.interfaces.get_mut(id).and_then(Option::as_mut)
    }

    /// Resolve a possibly absent reference to an interface.
    pub fn resolve(&self, id: Option<InterfaceId>) -> Option<&Interface> {
        id.and_then(|id| self.get(id))
    }

    /// Find the live interface which currently holds `state`.
    pub fn find_holder(&self, state: &InterfaceState) -> Option<InterfaceId> {
        self.interfaces
            .iter()
            .flatten()
            .find(|interface| {
                interface.direction() == state.direction() && interface.contains(state.id())
            })
            .map(Interface::id)
    }

    /// Insert `state` into the interface referred to by `target`.
    ///
    /// Returns `false` when there is no such interface anymore, in which case the state is
    /// discarded.
    pub(crate) fn insert(&mut self, target: Option<InterfaceId>, state: &InterfaceState) -> bool {
        let Some(interface) = target.and_then(|id| self.get_mut(id)) else {
            warn!(
                "No interface available to receive {} ({}), discarding it",
                state.id(),
                state.direction()
            );
            return false;
        };

        if let Some(notification) = interface.insert(state) {
            self.notifications.push_back(notification);
        }
        true
    }

    pub(crate) fn update(&mut self, id: InterfaceId, state: &InterfaceState) -> bool {
        let Some(interface) = self.get_mut(id) else {
            return false;
        };
        if !interface.contains(state.id()) {
            return false;
        }

        if let Some(notification) = interface.update(state) {
            self.notifications.push_back(notification);
        }
        true
    }

    /// The oldest notification which has not been delivered yet.
    pub(crate) fn take_notification(&mut self) -> Option<InterfaceNotification> {
        self.notifications.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::StateDraft;
    use crate::interface::StateId;
    use crate::stage::StageId;

    #[test]
    fn released_interface_resolves_to_nothing() {
        let mut registry = InterfaceRegistry::default();
        let id = registry.create(Direction::Forward, InterfaceOwner::Stage(StageId(0)));
        assert!(registry.resolve(Some(id)).is_some());

        let _ = registry.release(id);

        assert!(registry.resolve(Some(id)).is_none());
        let state = InterfaceState::new(StateId(0), Direction::Forward, StateDraft::new((), 1.0));
        assert!(!registry.insert(Some(id), &state));
        assert!(!registry.insert(None, &state));
    }

    #[test]
    fn notifications_are_queued_in_insertion_order() {
        let mut registry = InterfaceRegistry::default();
        let id = registry.create(Direction::Backward, InterfaceOwner::Stage(StageId(1)));
        registry.get_mut(id).expect("just created").subscribe();

        for index in 0..3 {
            let state = InterfaceState::new(
                StateId(index),
                Direction::Backward,
                StateDraft::new((), f64::from(3 - index)),
            );
            assert!(registry.insert(Some(id), &state));
        }

        let delivered = std::iter::from_fn(|| registry.take_notification())
            .map(|notification| notification.state)
            .collect::<Vec<_>>();
        assert_eq!(vec![StateId(0), StateId(1), StateId(2)], delivered);
        assert!(registry.take_notification().is_none());
    }
}
