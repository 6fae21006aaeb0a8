use std::fmt::Display;
use std::rc::Rc;

use crate::basic_types::Cost;
use crate::basic_types::Payload;
use crate::containers::StorageKey;
use crate::interface::StateId;
use crate::stage::StageId;

/// An identifier of a solution within a pipeline.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SolutionId(pub(crate) u32);

impl Display for SolutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SolutionId({})", self.0)
    }
}

impl StorageKey for SolutionId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        SolutionId(index as u32)
    }
}

/// A directed, costed edge between two states.
///
/// A finite cost marks a viable solution, [`Cost::INFINITE`] marks a failure. Solutions of a
/// generator connect the two copies of the spawned state (the one pushed backward is the start,
/// the one pushed forward is the end). Once created, a solution is shared by reference and never
/// changed.
#[derive(Debug)]
pub struct SolutionBase {
    id: SolutionId,
    creator: StageId,
    cost: Cost,
    start: Option<StateId>,
    end: Option<StateId>,
    payload: Option<Rc<dyn Payload>>,
    comment: String,
}

impl SolutionBase {
    pub(crate) fn new(
        id: SolutionId,
        creator: StageId,
        start: Option<StateId>,
        end: Option<StateId>,
        trajectory: SubTrajectory,
    ) -> Self {
        SolutionBase {
            id,
            creator,
            cost: trajectory.cost,
            start,
            end,
            payload: trajectory.payload,
            comment: trajectory.comment,
        }
    }

    pub fn id(&self) -> SolutionId {
        self.id
    }

    /// The stage which computed this solution.
    pub fn creator(&self) -> StageId {
        self.creator
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn is_failure(&self) -> bool {
        self.cost.is_infinite()
    }

    pub fn start(&self) -> Option<StateId> {
        self.start
    }

    pub fn end(&self) -> Option<StateId> {
        self.end
    }

    pub fn payload(&self) -> Option<&dyn Payload> {
        self.payload.as_deref()
    }

    pub fn payload_as<T: Payload>(&self) -> Option<&T> {
        self.payload.as_ref()?.downcast_ref::<T>()
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }
}

/// The outcome of a domain computation: its cost and the computed result.
///
/// The engine turns it into a [`SolutionBase`] once the states it connects are known.
#[derive(Clone, Debug, Default)]
pub struct SubTrajectory {
    cost: Cost,
    payload: Option<Rc<dyn Payload>>,
    comment: String,
}

impl SubTrajectory {
    pub fn new(cost: impl Into<Cost>) -> Self {
        SubTrajectory {
            cost: cost.into(),
            ..Default::default()
        }
    }

    /// A failed computation.
    pub fn failure() -> Self {
        SubTrajectory::new(Cost::INFINITE)
    }

    /// Turn this outcome into a failure, keeping its payload and comment for introspection.
    pub fn into_failure(mut self) -> Self {
        self.cost = Cost::INFINITE;
        self
    }

    pub fn with_payload(mut self, payload: impl Payload) -> Self {
        self.payload = Some(Rc::new(payload));
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn is_failure(&self) -> bool {
        self.cost.is_infinite()
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }
}
