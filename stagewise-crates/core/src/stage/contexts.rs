use std::rc::Rc;

use log::debug;

use super::PropertyMap;
use super::StageData;
use super::StageId;
use crate::containers::KeyGenerator;
use crate::containers::KeyedVec;
use crate::interface::Direction;
use crate::interface::Interface;
use crate::interface::InterfaceId;
use crate::interface::InterfaceOwner;
use crate::interface::InterfaceRegistry;
use crate::interface::InterfaceState;
use crate::interface::StateDraft;
use crate::interface::StateId;
use crate::interface::StateStore;
use crate::solutions::SolutionBase;
use crate::solutions::SolutionCallback;
use crate::solutions::SolutionCallbackId;
use crate::solutions::SolutionId;
use crate::solutions::SubTrajectory;
#[cfg(doc)]
use crate::stage::Stage;

/// Provided to [`Stage::initialise`]; allows a stage to create and subscribe to its pull
/// interfaces and to listen to the solutions of other stages.
#[derive(Debug)]
pub struct InitialisationContext<'a> {
    stage: StageId,
    data: &'a mut KeyedVec<StageId, Option<StageData>>,
    registry: &'a mut InterfaceRegistry,
}

impl<'a> InitialisationContext<'a> {
    pub(crate) fn new(
        stage: StageId,
        data: &'a mut KeyedVec<StageId, Option<StageData>>,
        registry: &'a mut InterfaceRegistry,
    ) -> Self {
        InitialisationContext {
            stage,
            data,
            registry,
        }
    }

    pub fn stage_id(&self) -> StageId {
        self.stage
    }

    /// Returns the own interface holding states which travel in `direction`, creating it if the
    /// stage does not have one yet.
    pub fn create_pull_interface(&mut self, direction: Direction) -> InterfaceId {
        let existing = self
            .own_data()
            .and_then(|data| data.pull_interface(direction))
            .filter(|id| self.registry.get(*id).is_some());
        if let Some(id) = existing {
            return id;
        }

        let id = self
            .registry
            .create(direction, InterfaceOwner::Stage(self.stage));
        if let Some(data) = self.data.get_mut(self.stage).and_then(Option::as_mut) {
            data.set_pull_interface(direction, id);
        }
        id
    }

    /// Ask to be notified, through [`Stage::notify`], about every state inserted into (or updated
    /// on) the own interface of `direction`.
    pub fn subscribe(&mut self, direction: Direction) {
        let id = self.create_pull_interface(direction);
        if let Some(interface) = self.registry.get_mut(id) {
            interface.subscribe();
        }
    }

    /// Whether `stage` is part of the same pipeline.
    pub fn contains_stage(&self, stage: StageId) -> bool {
        self.data.get(stage).is_some_and(Option::is_some)
    }

    /// Register `callback` to be invoked with every successful solution of `stage`.
    ///
    /// The registration is recorded on the initialising stage and withdrawn when that stage is
    /// removed from the pipeline. Returns [`None`] if there is no such stage.
    pub fn add_solution_callback(
        &mut self,
        stage: StageId,
        callback: Box<dyn SolutionCallback>,
    ) -> Option<SolutionCallbackId> {
        let id = self
            .data
            .get_mut(stage)
            .and_then(Option::as_mut)
            .map(|data| data.solutions_mut().add_callback(callback))?;

        if let Some(own) = self.data.get_mut(self.stage).and_then(Option::as_mut) {
            own.record_registration(stage, id);
        }
        Some(id)
    }

    /// The properties of the initialising stage.
    pub fn properties(&self) -> Option<&PropertyMap> {
        self.own_data().map(StageData::properties)
    }

    fn own_data(&self) -> Option<&StageData> {
        self.data.get(self.stage).and_then(Option::as_ref)
    }
}

/// A read-only view on a stage and the interfaces around it.
///
/// Provided to [`Stage::can_compute`], [`Stage::validate_connectivity`] and [`Stage::notify`].
#[derive(Clone, Copy, Debug)]
pub struct ReadContext<'a> {
    stage: &'a StageData,
    registry: &'a InterfaceRegistry,
    states: &'a StateStore,
}

impl<'a> ReadContext<'a> {
    pub(crate) fn new(
        stage: &'a StageData,
        registry: &'a InterfaceRegistry,
        states: &'a StateStore,
    ) -> Self {
        ReadContext {
            stage,
            registry,
            states,
        }
    }

    pub fn stage(&self) -> &'a StageData {
        self.stage
    }

    /// The own interface holding the states which travel in `direction`.
    pub fn pull_interface(&self, direction: Direction) -> Option<&'a Interface> {
        self.registry.resolve(self.stage.pull_interface(direction))
    }

    /// The neighbouring interface into which states travelling in `direction` are pushed;
    /// [`None`] if it was never wired or has been released since.
    pub fn push_interface(&self, direction: Direction) -> Option<&'a Interface> {
        self.registry.resolve(self.stage.push_interface(direction))
    }

    /// Whether the own interface of `direction` holds at least one state.
    pub fn has_state(&self, direction: Direction) -> bool {
        self.pull_interface(direction)
            .is_some_and(|interface| !interface.is_empty())
    }

    pub fn state(&self, state: StateId) -> Option<&'a InterfaceState> {
        self.states.get(state)
    }

    pub fn states(&self) -> &'a StateStore {
        self.states
    }
}

/// Provided to [`Stage::compute`]; gives access to the pull interfaces of the stage and the
/// operations which emit states and solutions.
///
/// Every operation which records a solution informs the registered solution callbacks before it
/// returns.
#[derive(Debug)]
pub struct ComputeContext<'a> {
    stage: &'a mut StageData,
    registry: &'a mut InterfaceRegistry,
    states: &'a mut StateStore,
    solution_ids: &'a mut KeyGenerator<SolutionId>,
}

impl<'a> ComputeContext<'a> {
    pub(crate) fn new(
        stage: &'a mut StageData,
        registry: &'a mut InterfaceRegistry,
        states: &'a mut StateStore,
        solution_ids: &'a mut KeyGenerator<SolutionId>,
    ) -> Self {
        ComputeContext {
            stage,
            registry,
            states,
            solution_ids,
        }
    }

    pub fn as_readonly(&self) -> ReadContext<'_> {
        ReadContext::new(&*self.stage, &*self.registry, &*self.states)
    }

    pub fn stage(&self) -> &StageData {
        &*self.stage
    }

    pub fn states(&self) -> &StateStore {
        &*self.states
    }

    pub fn has_state(&self, direction: Direction) -> bool {
        self.as_readonly().has_state(direction)
    }

    /// The current version of `state`.
    pub fn state(&self, state: StateId) -> Option<Rc<InterfaceState>> {
        self.states.shared(state)
    }

    /// Removes and returns the cheapest state of the own interface of `direction`.
    pub fn fetch_state(&mut self, direction: Direction) -> Option<Rc<InterfaceState>> {
        let interface = self
            .stage
            .pull_interface(direction)
            .and_then(|id| self.registry.get_mut(id))?;
        let state = interface.pop_cheapest()?;

        self.states.shared(state)
    }

    /// Remove `state`, which caused a failure, from further consideration; it is taken off the
    /// own interface of `direction` if it is still queued there.
    pub fn drop_failed(&mut self, direction: Direction, state: StateId) {
        if let Some(interface) = self
            .stage
            .pull_interface(direction)
            .and_then(|id| self.registry.get_mut(id))
        {
            let _ = interface.prune(state);
        }

        self.states.mark_pruned(state);
        self.stage.statistics_mut().num_states_pruned += 1;
        debug!("{}: pruned {state} after a failure", self.stage.name());
    }

    /// Emit a new state in both directions, together with the solution which produced it.
    ///
    /// The copy pushed backward is the start of the solution, the copy pushed forward its end. A
    /// failing `solution` is recorded without pushing anything.
    pub fn spawn(&mut self, state: StateDraft, solution: SubTrajectory) -> SolutionId {
        if solution.is_failure() {
            return self.store(None, None, solution);
        }

        let start = self.push(Direction::Backward, state.clone());
        let end = self.push(Direction::Forward, state);
        self.store(Some(start), Some(end), solution)
    }

    /// Push `to` into the next stage and record the solution `from → to`.
    pub fn send_forward(
        &mut self,
        from: &InterfaceState,
        to: StateDraft,
        solution: SubTrajectory,
    ) -> SolutionId {
        if solution.is_failure() {
            return self.store(Some(from.id()), None, solution);
        }

        let to = self.push(Direction::Forward, to);
        self.store(Some(from.id()), Some(to), solution)
    }

    /// Push `from` into the previous stage and record the solution `from → to`.
    pub fn send_backward(
        &mut self,
        from: StateDraft,
        to: &InterfaceState,
        solution: SubTrajectory,
    ) -> SolutionId {
        if solution.is_failure() {
            return self.store(None, Some(to.id()), solution);
        }

        let from = self.push(Direction::Backward, from);
        self.store(Some(from), Some(to.id()), solution)
    }

    /// Record a solution linking two states which were pulled from the own interfaces; no new
    /// state is emitted.
    pub fn connect(
        &mut self,
        from: &InterfaceState,
        to: &InterfaceState,
        solution: SubTrajectory,
    ) -> SolutionId {
        self.store(Some(from.id()), Some(to.id()), solution)
    }

    /// Record a failing solution between the given states, whatever the cost of `solution`.
    pub fn store_failure(
        &mut self,
        start: Option<StateId>,
        end: Option<StateId>,
        solution: SubTrajectory,
    ) -> SolutionId {
        self.store(start, end, solution.into_failure())
    }

    fn push(&mut self, direction: Direction, draft: StateDraft) -> StateId {
        let state = self.states.create(direction, draft);
        if self
            .registry
            .insert(self.stage.push_interface(direction), &state)
        {
            self.stage.statistics_mut().num_states_sent += 1;
        }

        state.id()
    }

    fn store(
        &mut self,
        start: Option<StateId>,
        end: Option<StateId>,
        solution: SubTrajectory,
    ) -> SolutionId {
        let id = self.solution_ids.next_key();
        let solution = Rc::new(SolutionBase::new(id, self.stage.id(), start, end, solution));

        let introspection = self.stage.introspection.as_ref().map(Rc::clone);
        let name = self.stage.name().to_owned();
        if self
            .stage
            .solutions_mut()
            .store_solution(&solution, &name, introspection.as_deref())
        {
            self.stage.statistics_mut().num_solutions += 1;
            self.stage.solutions_mut().new_solution(&solution);
        } else {
            self.stage.statistics_mut().num_failures += 1;
        }

        id
    }
}
