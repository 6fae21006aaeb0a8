//! A linear container of stages.
//!
//! The [`Pipeline`] owns its stages together with every interface and state they exchange. It
//! wires the stages to their neighbours on [`Pipeline::initialise`] and drives them by polling
//! ([`Pipeline::compute`], [`Pipeline::step`] and [`Pipeline::run`]).
//!
//! States pushed past the first stage (backward) or past the last stage (forward) are collected
//! in two boundary interfaces owned by the pipeline, see [`Pipeline::front_sink`] and
//! [`Pipeline::back_sink`]. States can be fed into the pipeline through [`Pipeline::insert_start`]
//! and [`Pipeline::insert_end`].
mod connectivity;

use std::fmt::Debug;
use std::rc::Rc;

use log::debug;

use crate::basic_types::ConfigurationError;
use crate::basic_types::Cost;
use crate::basic_types::DebugDyn;
use crate::containers::KeyGenerator;
use crate::containers::KeyedVec;
use crate::interface::Direction;
use crate::interface::FlagsDisplay;
use crate::interface::Interface;
use crate::interface::InterfaceFlag;
use crate::interface::InterfaceFlags;
use crate::interface::InterfaceId;
use crate::interface::InterfaceOwner;
use crate::interface::InterfaceRegistry;
use crate::interface::StateDraft;
use crate::interface::StateId;
use crate::interface::StateStore;
use crate::interface::UNKNOWN;
use crate::solutions::Introspection;
use crate::solutions::SolutionCallback;
use crate::solutions::SolutionCallbackId;
use crate::solutions::SolutionId;
use crate::stage::ComputeContext;
use crate::stage::ContainerId;
use crate::stage::HierarchyWiring;
use crate::stage::InitialisationContext;
use crate::stage::PropertyMap;
use crate::stage::ReadContext;
use crate::stage::Stage;
use crate::stage::StageData;
use crate::stage::StageId;
use crate::stagewise_asserts::stagewise_assert_simple;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::termination::TerminationCondition;

/// An ordered sequence of stages, each of which exchanges states with its direct neighbours.
pub struct Pipeline {
    name: String,
    container: ContainerId,
    /// The stages in the order in which they are connected.
    children: Vec<StageId>,
    stages: KeyedVec<StageId, Option<Box<dyn Stage>>>,
    data: KeyedVec<StageId, Option<StageData>>,
    registry: InterfaceRegistry,
    states: StateStore,
    solution_ids: KeyGenerator<SolutionId>,
    front_sink: Option<InterfaceId>,
    back_sink: Option<InterfaceId>,
    introspection: Option<Rc<Introspection>>,
    initialised: bool,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Pipeline {
            name: name.into(),
            container: ContainerId::fresh(),
            children: vec![],
            stages: KeyedVec::default(),
            data: KeyedVec::default(),
            registry: InterfaceRegistry::default(),
            states: StateStore::default(),
            solution_ids: KeyGenerator::default(),
            front_sink: None,
            back_sink: None,
            introspection: None,
            initialised: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// Append `stage` behind the current last stage.
    ///
    /// The pipeline has to be initialised again before it can compute.
    pub fn add_stage(&mut self, stage: impl Stage) -> StageId {
        let mut properties = PropertyMap::default();
        stage.declare_properties(&mut properties);
        let name = stage.name().to_owned();
        let id = self.stages.push(Some(Box::new(stage)));
        let data_id = self.data.push(Some(StageData::new(id, name)));
        stagewise_assert_simple!(id == data_id);

        let position = self.children.len();
        self.children.push(id);
        if let Some(data) = self.data[id].as_mut() {
            *data.properties_mut() = properties;
            let mut wiring = HierarchyWiring::new(data);
            wiring.set_hierarchy(self.container, position);
            wiring.set_introspection(self.introspection.as_ref().map(Rc::clone));
        }

        self.initialised = false;
        id
    }

    /// Remove `stage` from the pipeline and release its interfaces.
    ///
    /// The solution callbacks which the stage registered on other stages are withdrawn. The
    /// neighbours of the removed stage lose their push target: until the pipeline is
    /// initialised again, the states they send towards the removed stage are discarded.
    pub fn remove_stage(&mut self, stage: StageId) -> Option<Box<dyn Stage>> {
        let position = self.children.iter().position(|child| *child == stage)?;
        let _ = self.children.remove(position);

        if let Some(mut data) = self.data.get_mut(stage).and_then(Option::take) {
            for direction in [Direction::Forward, Direction::Backward] {
                if let Some(interface) = data.pull_interface(direction) {
                    let _ = self.registry.release(interface);
                }
            }
            HierarchyWiring::new(&mut data).clear_hierarchy();

            for (target, callback) in data.take_registrations() {
                if let Some(target) = self.data.get_mut(target).and_then(Option::as_mut) {
                    let _ = target.solutions_mut().remove_callback(callback);
                }
            }
        }
        for data in self.data.iter_mut().flatten() {
            data.forget_registrations_on(stage);
        }

        for (position, child) in self.children.iter().enumerate() {
            if let Some(data) = self.data.get_mut(*child).and_then(Option::as_mut) {
                HierarchyWiring::new(data).set_hierarchy(self.container, position);
            }
        }

        debug!("{}: removed {stage}", self.name);
        self.stages.get_mut(stage).and_then(Option::take)
    }

    /// Prepare the stages for computation.
    ///
    /// Checks that every declared property of every stage is defined, decides the interface of
    /// every stage, lets the stages create their pull interfaces, wires every stage to the
    /// interfaces of its neighbours and validates the result. Initialising
    /// again re-wires the stages; stages keep the interfaces and registrations they already
    /// have.
    pub fn initialise(&mut self) -> Result<(), ConfigurationError> {
        for data in self.children.iter().filter_map(|id| self.stage_data(*id)) {
            data.properties()
                .validate()
                .map_err(|source| ConfigurationError::Property {
                    stage: data.name().to_owned(),
                    source,
                })?;
        }
        self.resolve_interfaces()?;

        for id in self.children.clone() {
            let Some(stage) = self.stages.get_mut(id).and_then(Option::as_mut) else {
                continue;
            };
            let flags = stage.required_interface();
            if let Some(data) = self.data.get_mut(id).and_then(Option::as_mut) {
                data.set_interface_flags(flags);
            }

            stage.initialise(InitialisationContext::new(
                id,
                &mut self.data,
                &mut self.registry,
            ))?;
        }

        let front_sink = self.boundary_sink(Direction::Backward);
        let back_sink = self.boundary_sink(Direction::Forward);
        self.wire(front_sink, back_sink);

        self.validate_neighbours()?;
        for id in self.children.iter() {
            let (Some(stage), Some(data)) = (
                self.stages.get(*id).and_then(Option::as_ref),
                self.data.get(*id).and_then(Option::as_ref),
            ) else {
                continue;
            };
            stage.validate_connectivity(ReadContext::new(data, &self.registry, &self.states))?;
        }

        self.initialised = true;
        debug!("{}: initialised {} stages", self.name, self.children.len());
        self.dispatch_notifications();
        Ok(())
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    /// Attach or detach an introspection; while one is attached, every stage retains its failing
    /// solutions.
    pub fn set_introspection(&mut self, introspection: Option<Introspection>) {
        self.introspection = introspection.map(Rc::new);

        for data in self.data.iter_mut().flatten() {
            HierarchyWiring::new(data)
                .set_introspection(self.introspection.as_ref().map(Rc::clone));
        }
    }

    pub fn introspection(&self) -> Option<&Introspection> {
        self.introspection.as_deref()
    }

    /// Whether `stage` has pending work; `false` for unknown stages and before initialisation.
    pub fn can_compute(&self, stage: StageId) -> bool {
        if !self.initialised {
            return false;
        }

        match (
            self.stages.get(stage).and_then(Option::as_ref),
            self.data.get(stage).and_then(Option::as_ref),
        ) {
            (Some(stage), Some(data)) => {
                stage.can_compute(ReadContext::new(data, &self.registry, &self.states))
            }
            _ => false,
        }
    }

    /// Let `stage` perform one unit of work if it has any.
    ///
    /// Returns whether the stage computed.
    pub fn compute(&mut self, stage: StageId) -> Result<bool, ConfigurationError> {
        if !self.initialised {
            return Err(ConfigurationError::NotInitialised);
        }

        let (Some(computing), Some(data)) = (
            self.stages.get_mut(stage).and_then(Option::as_mut),
            self.data.get_mut(stage).and_then(Option::as_mut),
        ) else {
            return Err(ConfigurationError::UnknownStage(stage));
        };

        if !computing.can_compute(ReadContext::new(data, &self.registry, &self.states)) {
            return Ok(false);
        }

        data.statistics_mut().num_computes += 1;
        computing.compute(ComputeContext::new(
            data,
            &mut self.registry,
            &mut self.states,
            &mut self.solution_ids,
        ));

        self.dispatch_notifications();
        Ok(true)
    }

    /// Poll every stage once, in order. Returns the number of stages which computed.
    pub fn step(&mut self) -> Result<usize, ConfigurationError> {
        let mut num_computes = 0;
        for id in self.children.clone() {
            if self.compute(id)? {
                num_computes += 1;
            }
        }
        Ok(num_computes)
    }

    /// Poll the stages in rounds until none of them can compute anymore, or until `termination`
    /// triggers. Returns the number of computations performed.
    pub fn run(
        &mut self,
        mut termination: impl TerminationCondition,
    ) -> Result<usize, ConfigurationError> {
        if !self.initialised {
            return Err(ConfigurationError::NotInitialised);
        }

        let mut num_computes = 0;
        loop {
            let mut computed = false;

            for id in self.children.clone() {
                if termination.should_stop() {
                    debug!("{}: stopped after {num_computes} computations", self.name);
                    return Ok(num_computes);
                }

                if self.compute(id)? {
                    num_computes += 1;
                    computed = true;
                    termination.compute_has_been_performed();
                }
            }

            if !computed {
                break;
            }
        }

        debug!("{}: exhausted after {num_computes} computations", self.name);
        Ok(num_computes)
    }

    /// Place a new state on the own interface of `stage` which holds the states travelling in
    /// `direction`.
    pub fn insert_state(
        &mut self,
        stage: StageId,
        direction: Direction,
        draft: StateDraft,
    ) -> Result<StateId, ConfigurationError> {
        if !self.initialised {
            return Err(ConfigurationError::NotInitialised);
        }

        let data = self
            .stage_data(stage)
            .ok_or(ConfigurationError::UnknownStage(stage))?;
        let interface = data
            .pull_interface(direction)
            .filter(|id| self.registry.get(*id).is_some())
            .ok_or_else(|| ConfigurationError::UnconnectedInterface {
                stage: data.name().to_owned(),
                flag: InterfaceFlag::reads(direction),
            })?;

        let state = self.states.create(direction, draft);
        let _ = self.registry.insert(Some(interface), &state);
        self.dispatch_notifications();

        Ok(state.id())
    }

    /// Feed a state into the start side of the first stage.
    pub fn insert_start(&mut self, draft: StateDraft) -> Result<StateId, ConfigurationError> {
        let first = *self
            .children
            .first()
            .ok_or(ConfigurationError::EmptyPipeline)?;
        self.insert_state(first, Direction::Forward, draft)
    }

    /// Feed a state into the end side of the last stage.
    pub fn insert_end(&mut self, draft: StateDraft) -> Result<StateId, ConfigurationError> {
        let last = *self
            .children
            .last()
            .ok_or(ConfigurationError::EmptyPipeline)?;
        self.insert_state(last, Direction::Backward, draft)
    }

    /// Replace `state` by a copy with the given priority and move it accordingly on the interface
    /// holding it. Returns `false` if the state is not queued on any interface.
    pub fn update_state_priority(&mut self, state: StateId, priority: Cost) -> bool {
        let Some(holder) = self
            .states
            .get(state)
            .and_then(|current| self.registry.find_holder(current))
        else {
            return false;
        };
        let Some(copy) = self.states.reprioritise(state, priority) else {
            return false;
        };

        let updated = self.registry.update(holder, &copy);
        self.dispatch_notifications();
        updated
    }

    /// Register `callback` to be invoked with every successful solution of `stage`.
    pub fn add_solution_callback(
        &mut self,
        stage: StageId,
        callback: impl SolutionCallback + 'static,
    ) -> Result<SolutionCallbackId, ConfigurationError> {
        self.data
            .get_mut(stage)
            .and_then(Option::as_mut)
            .map(|data| data.solutions_mut().add_callback(Box::new(callback)))
            .ok_or(ConfigurationError::UnknownStage(stage))
    }

    pub fn remove_solution_callback(
        &mut self,
        stage: StageId,
        callback: SolutionCallbackId,
    ) -> bool {
        self.data
            .get_mut(stage)
            .and_then(Option::as_mut)
            .is_some_and(|data| data.solutions_mut().remove_callback(callback))
    }

    /// The stages in the order in which they are connected.
    pub fn stage_ids(&self) -> &[StageId] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn stage_data(&self, stage: StageId) -> Option<&StageData> {
        self.data.get(stage).and_then(Option::as_ref)
    }

    /// The properties of `stage`, to be set before the pipeline is initialised.
    pub fn properties_mut(&mut self, stage: StageId) -> Option<&mut PropertyMap> {
        self.data
            .get_mut(stage)
            .and_then(Option::as_mut)
            .map(StageData::properties_mut)
    }

    /// Returns the stage if it is of type `S`.
    pub fn stage<S: Stage>(&self, stage: StageId) -> Option<&S> {
        self.stages
            .get(stage)
            .and_then(Option::as_ref)
            .and_then(|stage| stage.downcast_ref::<S>())
    }

    pub fn stage_mut<S: Stage>(&mut self, stage: StageId) -> Option<&mut S> {
        self.stages
            .get_mut(stage)
            .and_then(Option::as_mut)
            .and_then(|stage| stage.downcast_mut::<S>())
    }

    pub fn interface(&self, interface: InterfaceId) -> Option<&Interface> {
        self.registry.get(interface)
    }

    pub fn states(&self) -> &StateStore {
        &self.states
    }

    /// The interface collecting the states which the first stage sends backward.
    pub fn front_sink(&self) -> Option<&Interface> {
        self.registry.resolve(self.front_sink)
    }

    /// The interface collecting the states which the last stage sends forward.
    pub fn back_sink(&self) -> Option<&Interface> {
        self.registry.resolve(self.back_sink)
    }

    /// Logs the statistics of every stage, prefixed by the names of the pipeline and the stage.
    pub fn log_statistics(&self) {
        for id in self.children.iter() {
            let (Some(stage), Some(data)) = (
                self.stages.get(*id).and_then(Option::as_ref),
                self.stage_data(*id),
            ) else {
                continue;
            };

            let statistic_logger = StatisticLogger::new([self.name.as_str(), data.name()]);
            data.statistics().log(statistic_logger.clone());
            stage.log_statistics(statistic_logger);
        }
    }

    fn boundary_sink(&mut self, direction: Direction) -> InterfaceId {
        let sink = match direction {
            Direction::Forward => &mut self.back_sink,
            Direction::Backward => &mut self.front_sink,
        };

        match sink.filter(|id| self.registry.get(*id).is_some()) {
            Some(id) => id,
            None => {
                let id = self.registry.create(direction, InterfaceOwner::Pipeline);
                *sink = Some(id);
                id
            }
        }
    }

    /// Point every stage to the pull interfaces of its neighbours; the boundaries of the pipeline
    /// are served by the sinks.
    fn wire(&mut self, front_sink: InterfaceId, back_sink: InterfaceId) {
        let children = self.children.clone();

        for (position, id) in children.iter().enumerate() {
            let prev_ends = match position.checked_sub(1) {
                Some(previous) => self.stage_data(children[previous]).and_then(StageData::ends),
                None => Some(front_sink),
            };
            let next_starts = match children.get(position + 1) {
                Some(next) => self.stage_data(*next).and_then(StageData::starts),
                None => Some(back_sink),
            };

            if let Some(data) = self.data.get_mut(*id).and_then(Option::as_mut) {
                let mut wiring = HierarchyWiring::new(data);
                wiring.set_hierarchy(self.container, position);
                wiring.set_prev_ends(prev_ends);
                wiring.set_next_starts(next_starts);
                debug!("{}: wired {data}", self.name);
            }
        }
    }

    /// Deliver the pending interface notifications to the stages which subscribed to them.
    fn dispatch_notifications(&mut self) {
        while let Some(notification) = self.registry.take_notification() {
            let owner = notification.owner;
            let (Some(stage), Some(data)) = (
                self.stages.get_mut(owner).and_then(Option::as_mut),
                self.data.get(owner).and_then(Option::as_ref),
            ) else {
                continue;
            };

            stage.notify(
                ReadContext::new(data, &self.registry, &self.states),
                notification,
            );
        }
    }

    fn required_interface(&self, stage: StageId) -> InterfaceFlags {
        self.stages
            .get(stage)
            .and_then(Option::as_ref)
            .map_or(UNKNOWN, |stage| stage.required_interface())
    }

    fn stage_name(&self, stage: StageId) -> String {
        self.stage_data(stage)
            .map_or_else(|| stage.to_string(), |data| data.name().to_owned())
    }
}

impl Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stages: Vec<_> = self
            .stages
            .iter()
            .map(|_| DebugDyn::from("Stage"))
            .collect();
        let interfaces: Vec<_> = self
            .children
            .iter()
            .filter_map(|id| self.stage_data(*id))
            .map(|data| format!("{} {}", data.name(), FlagsDisplay(data.interface_flags())))
            .collect();

        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("children", &interfaces)
            .field("stages", &stages)
            .field("initialised", &self.initialised)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::interface::InterfaceState;
    use crate::interface::GENERATE;
    use crate::interface::PROPAGATE_FORWARDS;
    use crate::solutions::SolutionBase;
    use crate::solutions::SubTrajectory;
    use crate::stage::PropertyError;
    use crate::stages::Generate;
    use crate::stages::Generated;
    use crate::stages::Generator;
    use crate::stages::Propagate;
    use crate::stages::Propagated;
    use crate::stages::PropagatingEitherWay;
    use crate::termination::ComputeBudget;
    use crate::termination::Indefinite;

    #[derive(Debug)]
    struct Seeds(Vec<f64>);

    impl Generate for Seeds {
        fn can_compute(&self) -> bool {
            !self.0.is_empty()
        }

        fn compute(&mut self) -> Generated {
            let priority = self.0.remove(0);
            Generated::new(StateDraft::new(priority, priority), SubTrajectory::new(0.0))
        }
    }

    /// Fails on states whose priority is at least the limit.
    #[derive(Debug)]
    struct Below(f64);

    impl Propagate for Below {
        fn compute_forward(&mut self, from: &InterfaceState) -> Propagated {
            if from.priority().value() < self.0 {
                Propagated::success(
                    StateDraft::from_shared(from.shared_payload(), from.priority()),
                    SubTrajectory::new(from.priority().value()),
                )
            } else {
                Propagated::failure(SubTrajectory::failure().with_comment("too expensive"))
            }
        }
    }

    /// Generates `count` states with the priority `seed`.
    #[derive(Debug)]
    struct Configured;

    impl Stage for Configured {
        fn name(&self) -> &str {
            "configured"
        }

        fn required_interface(&self) -> InterfaceFlags {
            GENERATE
        }

        fn declare_properties(&self, properties: &mut PropertyMap) {
            properties.declare::<f64>("seed", "the priority of the generated states");
            properties.declare_with_default("count", 1_usize, "how many states to generate");
        }

        fn can_compute(&self, context: ReadContext) -> bool {
            let data = context.stage();
            let count = data
                .properties()
                .get::<usize>("count")
                .ok()
                .flatten()
                .copied()
                .unwrap_or(0);
            data.solutions().num_solutions() < count
        }

        fn compute(&mut self, mut context: ComputeContext) {
            let Ok(Some(&seed)) = context.stage().properties().get::<f64>("seed") else {
                return;
            };
            let _ = context.spawn(StateDraft::new((), seed), SubTrajectory::new(0.0));
        }
    }

    fn seeded(seeds: Vec<f64>, limit: f64) -> (Pipeline, StageId, StageId) {
        let mut pipeline = Pipeline::new("pipeline");
        let generator = pipeline.add_stage(Generator::new("seeds", Seeds(seeds)));
        let forward = pipeline.add_stage(PropagatingEitherWay::forward("below", Below(limit)));
        pipeline.initialise().expect("generator feeds the propagator");
        (pipeline, generator, forward)
    }

    #[test]
    fn computing_requires_initialisation() {
        let mut pipeline = Pipeline::new("pipeline");
        let generator = pipeline.add_stage(Generator::new("seeds", Seeds(vec![1.0])));

        assert_eq!(Err(ConfigurationError::NotInitialised), pipeline.compute(generator));
        assert!(!pipeline.can_compute(generator));
        assert_eq!(
            Err(ConfigurationError::NotInitialised),
            pipeline.run(Indefinite)
        );
    }

    #[test]
    fn unknown_stages_are_reported() {
        let (mut pipeline, _, _) = seeded(vec![], 1.0);

        assert_eq!(
            Err(ConfigurationError::UnknownStage(StageId(9))),
            pipeline.compute(StageId(9))
        );
    }

    #[test]
    fn run_drains_every_stage() {
        let (mut pipeline, generator, forward) = seeded(vec![1.0, 5.0, 2.0], 3.0);

        let num_computes = pipeline.run(Indefinite).expect("initialised");

        assert_eq!(6, num_computes);
        assert!(!pipeline.can_compute(generator));
        assert!(!pipeline.can_compute(forward));
        let data = pipeline.stage_data(forward).expect("stage exists");
        assert_eq!(2, data.solutions().num_solutions());
        assert_eq!(1, data.solutions().num_failures());
        assert_eq!(2, pipeline.back_sink().map_or(0, Interface::len));
    }

    #[test]
    fn run_respects_the_compute_budget() {
        let (mut pipeline, _, _) = seeded(vec![1.0, 2.0, 3.0], 10.0);

        let num_computes = pipeline.run(ComputeBudget::new(4)).expect("initialised");

        assert_eq!(4, num_computes);
    }

    #[test]
    fn step_polls_every_stage_once() {
        let (mut pipeline, _, _) = seeded(vec![1.0, 2.0], 10.0);

        // The propagator is polled after the generator, so it consumes the fresh state at once.
        assert_eq!(2, pipeline.step().expect("initialised"));
        assert_eq!(2, pipeline.step().expect("initialised"));
        assert_eq!(0, pipeline.step().expect("initialised"));
    }

    #[test]
    fn introspection_retains_failures() {
        let (mut pipeline, _, forward) = seeded(vec![7.0, 8.0], 3.0);
        pipeline.set_introspection(Some(Introspection::new("task")));
        let _ = pipeline.step().expect("initialised");

        pipeline.set_introspection(None);
        let _ = pipeline.run(Indefinite).expect("initialised");

        let data = pipeline.stage_data(forward).expect("stage exists");
        assert_eq!(2, data.solutions().num_failures());
        assert_eq!(1, data.solutions().failures().len());
        assert_eq!("too expensive", data.solutions().failures()[0].comment());
    }

    #[test]
    fn callbacks_see_successes_only() {
        let (mut pipeline, _, forward) = seeded(vec![1.0, 9.0, 2.0], 3.0);
        let seen = Rc::new(RefCell::new(vec![]));
        let seen_by_callback = Rc::clone(&seen);
        let callback = pipeline
            .add_solution_callback(forward, move |solution: &Rc<SolutionBase>| {
                seen_by_callback.borrow_mut().push(solution.cost())
            })
            .expect("stage exists");

        let _ = pipeline.run(Indefinite).expect("initialised");

        assert_eq!(vec![Cost::new(1.0), Cost::new(2.0)], *seen.borrow());
        assert!(pipeline.remove_solution_callback(forward, callback));
        assert!(!pipeline.remove_solution_callback(forward, callback));
    }

    #[test]
    fn consumed_states_keep_their_priority() {
        let (mut pipeline, generator, forward) = seeded(vec![1.0], 10.0);
        assert!(pipeline.compute(generator).expect("initialised"));
        let queued = pipeline
            .stage_data(forward)
            .and_then(StageData::starts)
            .and_then(|starts| pipeline.interface(starts))
            .and_then(Interface::cheapest)
            .expect("the seed reached the propagator");

        assert!(pipeline.compute(forward).expect("initialised"));

        assert!(!pipeline.update_state_priority(queued, Cost::new(0.5)));
        assert_eq!(
            Some(Cost::new(1.0)),
            pipeline.states().get(queued).map(InterfaceState::priority)
        );
    }

    #[test]
    fn stages_are_wired_to_their_neighbours() {
        let (pipeline, generator, forward) = seeded(vec![], 1.0);
        let generator = pipeline.stage_data(generator).expect("stage exists");
        let forward = pipeline.stage_data(forward).expect("stage exists");

        assert_eq!(forward.starts(), generator.next_starts());
        assert_eq!(
            pipeline.front_sink().map(Interface::id),
            generator.prev_ends()
        );
        assert_eq!(pipeline.back_sink().map(Interface::id), forward.next_starts());
        assert_eq!(Some(1), forward.hierarchy().map(|hierarchy| hierarchy.position));
        assert_eq!(PROPAGATE_FORWARDS, forward.interface_flags());
    }

    #[test]
    fn removed_stage_leaves_no_push_target() {
        let (mut pipeline, generator, forward) = seeded(vec![1.0], 10.0);
        let starts = pipeline
            .stage_data(forward)
            .and_then(StageData::starts)
            .expect("propagator reads starts");

        assert!(pipeline.remove_stage(forward).is_some());

        assert!(pipeline.interface(starts).is_none());
        assert_eq!(&[generator], pipeline.stage_ids());
        assert!(pipeline.compute(generator).expect("still initialised"));
        assert_eq!(2, pipeline.states().len());
        assert_eq!(1, pipeline.front_sink().map_or(0, Interface::len));
        let data = pipeline.stage_data(generator).expect("stage exists");
        assert_eq!(1, data.statistics().num_states_sent);

        pipeline.initialise().expect("a lone generator is valid");
        assert_eq!(
            pipeline.back_sink().map(Interface::id),
            pipeline
                .stage_data(generator)
                .and_then(StageData::next_starts)
        );
    }

    #[test]
    fn undefined_properties_prevent_initialisation() {
        let mut pipeline = Pipeline::new("pipeline");
        let configured = pipeline.add_stage(Configured);

        assert_eq!(
            Err(ConfigurationError::Property {
                stage: "configured".to_owned(),
                source: PropertyError::Undefined(vec![
                    "'seed' (the priority of the generated states)".to_owned()
                ]),
            }),
            pipeline.initialise()
        );
        assert!(!pipeline.is_initialised());

        let properties = pipeline.properties_mut(configured).expect("stage exists");
        properties.set("seed", 4.0_f64).expect("declared as f64");
        properties.set("count", 2_usize).expect("declared as usize");
        pipeline.initialise().expect("every property is defined");

        assert_eq!(2, pipeline.run(Indefinite).expect("initialised"));
        assert_eq!(2, pipeline.back_sink().map_or(0, Interface::len));
        assert_eq!(
            Some(Cost::new(4.0)),
            pipeline
                .back_sink()
                .and_then(Interface::cheapest)
                .and_then(|state| pipeline.states().get(state))
                .map(InterfaceState::priority)
        );
    }

    #[test]
    fn feeding_an_empty_pipeline_fails() {
        let mut pipeline = Pipeline::new("empty");
        pipeline.initialise().expect("nothing to validate");

        assert_eq!(
            Err(ConfigurationError::EmptyPipeline),
            pipeline.insert_start(StateDraft::new((), 0.0))
        );
    }

    #[test]
    fn feeding_a_stage_which_does_not_read_fails() {
        let (mut pipeline, generator, _) = seeded(vec![], 1.0);

        assert_eq!(
            Err(ConfigurationError::UnconnectedInterface {
                stage: "seeds".to_owned(),
                flag: InterfaceFlag::ReadsStart
            }),
            pipeline.insert_state(generator, Direction::Forward, StateDraft::new((), 0.0))
        );
    }
}
