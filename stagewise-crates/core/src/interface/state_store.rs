use std::rc::Rc;

use super::Direction;
use super::InterfaceState;
use super::StateDraft;
use super::StateId;
use crate::basic_types::Cost;
use crate::containers::HashSet;
use crate::containers::KeyedVec;

/// Holds every state created in a pipeline.
///
/// States outlive their presence on an interface, since solutions keep referring to the states
/// they connect.
#[derive(Debug, Default)]
pub struct StateStore {
    states: KeyedVec<StateId, Rc<InterfaceState>>,
    pruned: HashSet<StateId>,
}

impl StateStore {
    pub(crate) fn create(&mut self, direction: Direction, draft: StateDraft) -> Rc<InterfaceState> {
        let slot = self.states.new_slot();
        let state = Rc::new(InterfaceState::new(slot.key(), direction, draft));
        let _ = slot.populate(Rc::clone(&state));

        state
    }

    /// Replace `state` by a copy with the given priority.
    pub(crate) fn reprioritise(
        &mut self,
        state: StateId,
        priority: Cost,
    ) -> Option<Rc<InterfaceState>> {
        let current = self.states.get_mut(state)?;
        let copy = Rc::new(current.with_priority(priority));
        *current = Rc::clone(&copy);

        Some(copy)
    }

    pub(crate) fn mark_pruned(&mut self, state: StateId) {
        let _ = self.pruned.insert(state);
    }

    pub fn get(&self, state: StateId) -> Option<&InterfaceState> {
        self.states.get(state).map(Rc::as_ref)
    }

    pub fn shared(&self, state: StateId) -> Option<Rc<InterfaceState>> {
        self.states.get(state).map(Rc::clone)
    }

    /// Whether `state` caused a failure and was removed from further consideration.
    pub fn is_pruned(&self, state: StateId) -> bool {
        self.pruned.contains(&state)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
