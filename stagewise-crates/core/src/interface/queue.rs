use super::Direction;
use super::InterfaceState;
use super::StateId;
use crate::basic_types::Cost;
use crate::containers::CostQueue;
use crate::containers::HashMap;
use crate::containers::QueueKey;
use crate::containers::StorageKey;
use crate::stage::StageId;
use crate::stagewise_asserts::stagewise_assert_extreme;
use crate::stagewise_asserts::stagewise_assert_moderate;
use crate::stagewise_asserts::stagewise_assert_simple;

/// An identifier of an interface within a pipeline.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct InterfaceId(pub(crate) u32);

impl std::fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InterfaceId({})", self.0)
    }
}

impl StorageKey for InterfaceId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        InterfaceId(index as u32)
    }
}

/// Who is responsible for releasing an interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterfaceOwner {
    /// The stage which pulls from the interface.
    Stage(StageId),
    /// The pipeline itself; used for the boundary interfaces which collect the states pushed past
    /// the first and the last stage.
    Pipeline,
}

/// Describes an insertion into (or an update of) an interface whose owner asked to be notified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterfaceNotification {
    pub interface: InterfaceId,
    pub owner: StageId,
    pub state: StateId,
    pub direction: Direction,
    /// Whether an existing state changed its priority rather than a new state arriving.
    pub updated: bool,
}

/// A queue of states sorted ascending by priority; states with equal priority are consumed in
/// the order in which they arrived.
#[derive(Debug)]
pub struct Interface {
    id: InterfaceId,
    direction: Direction,
    owner: InterfaceOwner,
    queue: CostQueue<StateId>,
    positions: HashMap<StateId, QueueKey>,
    notify_owner: bool,
}

impl Interface {
    pub(crate) fn new(id: InterfaceId, direction: Direction, owner: InterfaceOwner) -> Self {
        Interface {
            id,
            direction,
            owner,
            queue: CostQueue::default(),
            positions: HashMap::default(),
            notify_owner: false,
        }
    }

    pub fn id(&self) -> InterfaceId {
        self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn owner(&self) -> InterfaceOwner {
        self.owner
    }

    /// Ask for a notification on every insertion and update. Only stage owners can be notified.
    pub(crate) fn subscribe(&mut self) {
        stagewise_assert_simple!(matches!(self.owner, InterfaceOwner::Stage(_)));
        self.notify_owner = true;
    }

    pub fn is_subscribed(&self) -> bool {
        self.notify_owner
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn contains(&self, state: StateId) -> bool {
        self.positions.contains_key(&state)
    }

    /// The state with the lowest priority, without removing it.
    pub fn cheapest(&self) -> Option<StateId> {
        self.queue.peek().map(|(_, state)| *state)
    }

    /// The priority under which `state` is currently queued.
    pub fn priority_of(&self, state: StateId) -> Option<Cost> {
        self.positions.get(&state).map(QueueKey::cost)
    }

    /// Iterate over the states in ascending order of priority.
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.queue.iter().map(|(_, state)| *state)
    }

    /// Place `state` according to its priority.
    ///
    /// Returns the notification for the owner if it subscribed to this interface.
    pub(crate) fn insert(&mut self, state: &InterfaceState) -> Option<InterfaceNotification> {
        stagewise_assert_simple!(state.direction() == self.direction);
        stagewise_assert_simple!(!self.contains(state.id()));

        let key = self.queue.push(state.priority(), state.id());
        let _ = self.positions.insert(state.id(), key);
        self.check_invariants();

        self.notification(state.id(), false)
    }

    /// Move an already queued state to the position of its new priority.
    pub(crate) fn update(&mut self, state: &InterfaceState) -> Option<InterfaceNotification> {
        let key = *self.positions.get(&state.id())?;
        let new_key = self.queue.rekey(key, state.priority())?;
        let _ = self.positions.insert(state.id(), new_key);
        self.check_invariants();

        self.notification(state.id(), true)
    }

    /// Remove and return the cheapest state.
    pub(crate) fn pop_cheapest(&mut self) -> Option<StateId> {
        let (_, state) = self.queue.pop()?;
        let _ = self.positions.remove(&state);
        self.check_invariants();

        Some(state)
    }

    /// Remove `state` from the queue; the order of the remaining states is unaffected.
    pub(crate) fn prune(&mut self, state: StateId) -> bool {
        let Some(key) = self.positions.remove(&state) else {
            return false;
        };
        let removed = self.queue.remove(key);
        stagewise_assert_moderate!(removed == Some(state));
        self.check_invariants();

        true
    }

    fn notification(&self, state: StateId, updated: bool) -> Option<InterfaceNotification> {
        match self.owner {
            InterfaceOwner::Stage(owner) if self.notify_owner => Some(InterfaceNotification {
                interface: self.id,
                owner,
                state,
                direction: self.direction,
                updated,
            }),
            _ => None,
        }
    }

    fn check_invariants(&self) {
        stagewise_assert_moderate!(self.queue.len() == self.positions.len());
        stagewise_assert_extreme!(self
            .queue
            .iter()
            .zip(self.queue.iter().skip(1))
            .all(|((first, _), (second, _))| first.cost() <= second.cost()));
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::Rng;
    use rand::SeedableRng;

    use super::*;
    use crate::interface::StateDraft;

    fn state(id: u32, priority: f64) -> InterfaceState {
        InterfaceState::new(
            StateId(id),
            Direction::Forward,
            StateDraft::new(id, priority),
        )
    }

    fn interface(owner: InterfaceOwner) -> Interface {
        Interface::new(InterfaceId(0), Direction::Forward, owner)
    }

    #[test]
    fn cheapest_is_the_minimum_after_every_operation() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut interface = interface(InterfaceOwner::Pipeline);
        let mut present: Vec<(f64, u32)> = vec![];

        for id in 0..200 {
            if !present.is_empty() && rng.gen_bool(0.3) {
                let index = rng.gen_range(0..present.len());
                let (_, removed) = present.swap_remove(index);
                assert!(interface.prune(StateId(removed)));
            } else {
                let priority = f64::from(rng.gen_range(0..50_u32));
                let _ = interface.insert(&state(id, priority));
                present.push((priority, id));
            }

            let minimum = present
                .iter()
                .map(|(priority, _)| Cost::new(*priority))
                .min();
            assert_eq!(
                minimum,
                interface
                    .cheapest()
                    .and_then(|cheapest| interface.priority_of(cheapest))
            );
            assert_eq!(present.len(), interface.len());
        }
    }

    #[test]
    fn equal_priorities_are_consumed_in_arrival_order() {
        let mut interface = interface(InterfaceOwner::Pipeline);
        let _ = interface.insert(&state(0, 1.0));
        let _ = interface.insert(&state(1, 1.0));
        let _ = interface.insert(&state(2, 0.5));

        assert_eq!(Some(StateId(2)), interface.pop_cheapest());
        assert_eq!(Some(StateId(0)), interface.pop_cheapest());
        assert_eq!(Some(StateId(1)), interface.pop_cheapest());
        assert_eq!(None, interface.pop_cheapest());
    }

    #[test]
    fn only_subscribed_stage_owners_are_notified() {
        let owner = StageId(3);
        let mut interface = interface(InterfaceOwner::Stage(owner));
        assert_eq!(None, interface.insert(&state(0, 1.0)));

        interface.subscribe();
        let notification = interface.insert(&state(1, 2.0)).expect("owner subscribed");
        assert_eq!(owner, notification.owner);
        assert_eq!(StateId(1), notification.state);
        assert!(!notification.updated);

        let update = interface
            .update(&state(1, 0.5))
            .expect("state is queued");
        assert!(update.updated);
        assert_eq!(Some(StateId(1)), interface.cheapest());
    }

    #[test]
    fn pruning_an_absent_state_is_a_no_op() {
        let mut interface = interface(InterfaceOwner::Pipeline);
        let _ = interface.insert(&state(0, 1.0));

        assert!(!interface.prune(StateId(7)));
        assert!(interface.prune(StateId(0)));
        assert!(interface.is_empty());
    }
}
