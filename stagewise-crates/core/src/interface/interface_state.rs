use std::fmt::Display;
use std::rc::Rc;

use super::Direction;
use crate::basic_types::Cost;
use crate::basic_types::Payload;
use crate::containers::StorageKey;

/// An identifier of a state within a pipeline.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct StateId(pub(crate) u32);

impl Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StateId({})", self.0)
    }
}

impl StorageKey for StateId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        StateId(index as u32)
    }
}

/// An immutable snapshot placed on an interface.
///
/// A state is never changed after it has been created; re-prioritising a state creates a copy
/// (see [`InterfaceState::with_priority`]) which replaces the original under the same id.
#[derive(Clone, Debug)]
pub struct InterfaceState {
    id: StateId,
    direction: Direction,
    priority: Cost,
    payload: Rc<dyn Payload>,
}

impl InterfaceState {
    pub(crate) fn new(id: StateId, direction: Direction, draft: StateDraft) -> Self {
        InterfaceState {
            id,
            direction,
            priority: draft.priority,
            payload: draft.payload,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    /// The kind of interface this state lives on.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn priority(&self) -> Cost {
        self.priority
    }

    pub fn payload(&self) -> &dyn Payload {
        &*self.payload
    }

    /// Returns the payload if it is of type `T`.
    pub fn payload_as<T: Payload>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// A shared handle to the payload, used to derive new states from this one.
    pub fn shared_payload(&self) -> Rc<dyn Payload> {
        Rc::clone(&self.payload)
    }

    pub(crate) fn with_priority(&self, priority: Cost) -> InterfaceState {
        InterfaceState {
            priority,
            ..self.clone()
        }
    }
}

/// The description of a state which a domain hook wants to create; the engine turns it into an
/// [`InterfaceState`] once it knows on which interface the state will be placed.
#[derive(Clone, Debug)]
pub struct StateDraft {
    pub payload: Rc<dyn Payload>,
    pub priority: Cost,
}

impl StateDraft {
    pub fn new(payload: impl Payload, priority: impl Into<Cost>) -> Self {
        StateDraft {
            payload: Rc::new(payload),
            priority: priority.into(),
        }
    }

    /// Derive a draft which shares its payload with an existing state.
    pub fn from_shared(payload: Rc<dyn Payload>, priority: impl Into<Cost>) -> Self {
        StateDraft {
            payload,
            priority: priority.into(),
        }
    }
}
