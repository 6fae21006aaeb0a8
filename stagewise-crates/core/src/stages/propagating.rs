use enumset::EnumSet;
use log::debug;

use crate::basic_types::ConfigurationError;
use crate::interface::propagation_flags;
use crate::interface::Direction;
use crate::interface::FlagsDisplay;
use crate::interface::InterfaceFlags;
use crate::interface::InterfaceState;
use crate::interface::StateDraft;
use crate::interface::UNKNOWN;
use crate::solutions::SubTrajectory;
use crate::stage::validate_required_interface;
use crate::stage::ComputeContext;
use crate::stage::ReadContext;
use crate::stage::Stage;

/// The outcome of propagating a single state.
#[derive(Clone, Debug)]
pub struct Propagated {
    /// The derived state; [`None`] if the propagation failed.
    pub state: Option<StateDraft>,
    pub solution: SubTrajectory,
}

impl Propagated {
    pub fn success(state: StateDraft, solution: SubTrajectory) -> Self {
        Propagated {
            state: Some(state),
            solution,
        }
    }

    pub fn failure(solution: SubTrajectory) -> Self {
        Propagated {
            state: None,
            solution: solution.into_failure(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.state.is_some() && !self.solution.is_failure()
    }
}

/// The domain computation of a [`PropagatingEitherWay`] stage.
///
/// Only the directions in which the stage is configured to propagate are ever called; by default
/// both report a failure.
pub trait Propagate {
    /// Derive the state at the end of a solution starting in `from`.
    fn compute_forward(&mut self, _from: &InterfaceState) -> Propagated {
        Propagated::failure(SubTrajectory::failure())
    }

    /// Derive the state at the start of a solution ending in `to`.
    fn compute_backward(&mut self, _to: &InterfaceState) -> Propagated {
        Propagated::failure(SubTrajectory::failure())
    }
}

/// The directions in which a [`PropagatingEitherWay`] stage may propagate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropagationDirection {
    Forward,
    Backward,
    /// Decided once the neighbours of the stage are known.
    Either,
}

/// A stage which pulls a state from one side, transforms it and pushes the result to the other
/// side.
///
/// A stage created with [`PropagationDirection::Either`] reports an [`UNKNOWN`] interface until
/// its container restricts it through [`Stage::prune_interface`]; once narrowed, the set of
/// directions never widens again.
#[derive(Debug)]
pub struct PropagatingEitherWay<P> {
    name: String,
    directions: EnumSet<Direction>,
    resolved: bool,
    hook: P,
}

impl<P: Propagate> PropagatingEitherWay<P> {
    pub fn new(name: impl Into<String>, direction: PropagationDirection, hook: P) -> Self {
        let (directions, resolved) = match direction {
            PropagationDirection::Forward => (EnumSet::only(Direction::Forward), true),
            PropagationDirection::Backward => (EnumSet::only(Direction::Backward), true),
            PropagationDirection::Either => (EnumSet::all(), false),
        };

        PropagatingEitherWay {
            name: name.into(),
            directions,
            resolved,
            hook,
        }
    }

    /// A stage which only propagates forward.
    pub fn forward(name: impl Into<String>, hook: P) -> Self {
        Self::new(name, PropagationDirection::Forward, hook)
    }

    /// A stage which only propagates backward.
    pub fn backward(name: impl Into<String>, hook: P) -> Self {
        Self::new(name, PropagationDirection::Backward, hook)
    }

    pub fn either(name: impl Into<String>, hook: P) -> Self {
        Self::new(name, PropagationDirection::Either, hook)
    }

    /// The directions the stage currently propagates in.
    pub fn directions(&self) -> EnumSet<Direction> {
        self.directions
    }

    pub fn hook(&self) -> &P {
        &self.hook
    }

    /// The side to serve next; the start side is preferred when both sides have states.
    fn next_direction(&self, context: ReadContext) -> Option<Direction> {
        [Direction::Forward, Direction::Backward]
            .into_iter()
            .find(|direction| {
                self.directions.contains(*direction) && context.has_state(*direction)
            })
    }
}

impl<P: Propagate + 'static> Stage for PropagatingEitherWay<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_interface(&self) -> InterfaceFlags {
        if !self.resolved {
            return UNKNOWN;
        }

        self.directions
            .iter()
            .fold(UNKNOWN, |flags, direction| flags | propagation_flags(direction))
    }

    fn prune_interface(&mut self, accepted: InterfaceFlags) -> Result<(), ConfigurationError> {
        let remaining = self
            .directions
            .iter()
            .filter(|direction| accepted.is_superset(propagation_flags(*direction)))
            .collect::<EnumSet<_>>();

        if remaining.is_empty() {
            return Err(ConfigurationError::RejectedInterface {
                stage: self.name.clone(),
                accepted: FlagsDisplay(accepted).to_string(),
            });
        }

        debug!(
            "{}: restricted to {}",
            self.name,
            FlagsDisplay(
                remaining
                    .iter()
                    .fold(UNKNOWN, |flags, direction| flags | propagation_flags(direction))
            )
        );
        self.directions = remaining;
        self.resolved = true;
        Ok(())
    }

    fn validate_connectivity(&self, context: ReadContext) -> Result<(), ConfigurationError> {
        let required = self.required_interface();
        if required.is_empty() {
            return Err(ConfigurationError::NoPropagationDirection {
                stage: self.name.clone(),
            });
        }

        validate_required_interface(&self.name, required, context)
    }

    fn can_compute(&self, context: ReadContext) -> bool {
        self.next_direction(context).is_some()
    }

    fn compute(&mut self, mut context: ComputeContext) {
        let Some(direction) = self.next_direction(context.as_readonly()) else {
            return;
        };
        let Some(state) = context.fetch_state(direction) else {
            return;
        };

        let Propagated {
            state: derived,
            solution,
        } = match direction {
            Direction::Forward => self.hook.compute_forward(&state),
            Direction::Backward => self.hook.compute_backward(&state),
        };

        match derived {
            Some(derived) if !solution.is_failure() => {
                debug!(
                    "{}: propagated {} {direction} with cost {}",
                    self.name,
                    state.id(),
                    solution.cost()
                );
                let _ = match direction {
                    Direction::Forward => context.send_forward(&state, derived, solution),
                    Direction::Backward => context.send_backward(derived, &state, solution),
                };
            }
            _ => {
                let _ = match direction {
                    Direction::Forward => context.store_failure(Some(state.id()), None, solution),
                    Direction::Backward => context.store_failure(None, Some(state.id()), solution),
                };
                context.drop_failed(direction, state.id());
            }
        }
    }
}
