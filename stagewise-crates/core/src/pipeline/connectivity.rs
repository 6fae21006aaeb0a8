use enumset::EnumSet;
use log::debug;

use super::Pipeline;
use crate::basic_types::ConfigurationError;
use crate::interface::propagation_flags;
use crate::interface::Direction;
use crate::interface::FlagsDisplay;
use crate::interface::InterfaceFlag;
use crate::interface::InterfaceFlags;
use crate::interface::PROPAGATE_BACKWARDS;
use crate::interface::PROPAGATE_FORWARDS;
use crate::interface::UNKNOWN;
use crate::stage::StageId;

impl Pipeline {
    /// Decide the interface of every stage which reported [`UNKNOWN`].
    ///
    /// A stage which can only propagate in one direction given its neighbours is restricted to
    /// that direction; since this may in turn settle its neighbours, this is repeated until
    /// nothing changes. The stages which are still undecided afterwards are restricted to every
    /// direction their neighbours allow.
    pub(super) fn resolve_interfaces(&mut self) -> Result<(), ConfigurationError> {
        loop {
            let mut changed = false;

            for position in 0..self.children.len() {
                let id = self.children[position];
                if !self.required_interface(id).is_empty() {
                    continue;
                }

                let accepted = self.accepted_interface(position);
                let viable = [Direction::Forward, Direction::Backward]
                    .into_iter()
                    .filter(|direction| accepted.is_superset(propagation_flags(*direction)))
                    .collect::<EnumSet<_>>();

                match viable.len() {
                    0 => {
                        return Err(ConfigurationError::NoPropagationDirection {
                            stage: self.stage_name(id),
                        })
                    }
                    1 => {
                        let flags = viable.iter().fold(UNKNOWN, |flags, direction| {
                            flags | propagation_flags(direction)
                        });
                        self.prune_interface(id, flags)?;
                        changed |= !self.required_interface(id).is_empty();
                    }
                    _ => {}
                }
            }

            if !changed {
                break;
            }
        }

        for position in 0..self.children.len() {
            let id = self.children[position];
            if self.required_interface(id).is_empty() {
                let accepted = self.accepted_interface(position);
                self.prune_interface(id, accepted)?;
            }
        }

        Ok(())
    }

    /// The interface the neighbours of the stage at `position` can serve. The boundaries of the
    /// pipeline, as well as undecided neighbours, can serve anything.
    pub(super) fn accepted_interface(&self, position: usize) -> InterfaceFlags {
        let previous = self.neighbour_interface(position.checked_sub(1));
        let next = self.neighbour_interface(Some(position + 1));

        let forward_viable = previous.contains(InterfaceFlag::WritesNextStart)
            && next.contains(InterfaceFlag::ReadsStart);
        let backward_viable = next.contains(InterfaceFlag::WritesPrevEnd)
            && previous.contains(InterfaceFlag::ReadsEnd);

        let mut accepted = UNKNOWN;
        if forward_viable {
            accepted |= PROPAGATE_FORWARDS;
        }
        if backward_viable {
            accepted |= PROPAGATE_BACKWARDS;
        }
        accepted
    }

    /// Adjacent stages must agree on the interface they share: states sent forward by the first
    /// must be read by the second, and states sent backward by the second must be read by the
    /// first.
    pub(super) fn validate_neighbours(&self) -> Result<(), ConfigurationError> {
        for pair in self.children.windows(2) {
            let (first, second) = (pair[0], pair[1]);
            let first_flags = self.configured_interface(first);
            let second_flags = self.configured_interface(second);

            let forward_agrees = first_flags.contains(InterfaceFlag::WritesNextStart)
                == second_flags.contains(InterfaceFlag::ReadsStart);
            let backward_agrees = second_flags.contains(InterfaceFlag::WritesPrevEnd)
                == first_flags.contains(InterfaceFlag::ReadsEnd);

            if !forward_agrees || !backward_agrees {
                return Err(ConfigurationError::InterfaceMismatch {
                    first: self.stage_name(first),
                    second: self.stage_name(second),
                });
            }
        }

        Ok(())
    }

    fn neighbour_interface(&self, position: Option<usize>) -> InterfaceFlags {
        match position.and_then(|position| self.children.get(position)) {
            Some(id) => match self.required_interface(*id) {
                flags if flags.is_empty() => EnumSet::all(),
                flags => flags,
            },
            None => EnumSet::all(),
        }
    }

    fn prune_interface(
        &mut self,
        id: StageId,
        accepted: InterfaceFlags,
    ) -> Result<(), ConfigurationError> {
        debug!(
            "{}: pruning interface to {}",
            self.stage_name(id),
            FlagsDisplay(accepted)
        );
        match self.stages.get_mut(id).and_then(Option::as_mut) {
            Some(stage) => stage.prune_interface(accepted),
            None => Err(ConfigurationError::UnknownStage(id)),
        }
    }

    fn configured_interface(&self, id: StageId) -> InterfaceFlags {
        self.stage_data(id).map_or(UNKNOWN, |data| data.interface_flags())
    }
}
