use std::fmt::Display;
use std::rc::Rc;

use super::Hierarchy;
use super::PropertyMap;
use super::StageId;
use crate::interface::Direction;
use crate::interface::FlagsDisplay;
use crate::interface::InterfaceFlags;
use crate::interface::InterfaceId;
use crate::interface::UNKNOWN;
use crate::solutions::Introspection;
use crate::solutions::SolutionCallbackId;
use crate::solutions::SolutionStore;
use crate::statistics::StageStatistics;

/// The data which the engine keeps for every stage, independent of the kind of stage.
///
/// The pull interfaces (`starts` and `ends`) are owned by the stage. The push targets
/// (`prev_ends` and `next_starts`) belong to the neighbouring stages and may have been released
/// since they were wired; they are resolved through the
/// [`InterfaceRegistry`](crate::interface::InterfaceRegistry) on every use.
#[derive(Debug)]
pub struct StageData {
    id: StageId,
    name: String,
    pub(crate) hierarchy: Option<Hierarchy>,
    starts: Option<InterfaceId>,
    ends: Option<InterfaceId>,
    pub(crate) prev_ends: Option<InterfaceId>,
    pub(crate) next_starts: Option<InterfaceId>,
    pub(crate) introspection: Option<Rc<Introspection>>,
    solutions: SolutionStore,
    statistics: StageStatistics,
    interface_flags: InterfaceFlags,
    properties: PropertyMap,
    /// The callbacks this stage registered on the solution stores of other stages.
    registrations: Vec<(StageId, SolutionCallbackId)>,
}

impl StageData {
    pub(crate) fn new(id: StageId, name: impl Into<String>) -> Self {
        StageData {
            id,
            name: name.into(),
            hierarchy: None,
            starts: None,
            ends: None,
            prev_ends: None,
            next_starts: None,
            introspection: None,
            solutions: SolutionStore::default(),
            statistics: StageStatistics::default(),
            interface_flags: UNKNOWN,
            properties: PropertyMap::default(),
            registrations: vec![],
        }
    }

    pub fn id(&self) -> StageId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hierarchy(&self) -> Option<Hierarchy> {
        self.hierarchy
    }

    /// The interface from which forward states are pulled.
    pub fn starts(&self) -> Option<InterfaceId> {
        self.starts
    }

    /// The interface from which backward states are pulled.
    pub fn ends(&self) -> Option<InterfaceId> {
        self.ends
    }

    pub fn prev_ends(&self) -> Option<InterfaceId> {
        self.prev_ends
    }

    pub fn next_starts(&self) -> Option<InterfaceId> {
        self.next_starts
    }

    /// The own interface holding the states which travel in `direction`.
    pub fn pull_interface(&self, direction: Direction) -> Option<InterfaceId> {
        match direction {
            Direction::Forward => self.starts,
            Direction::Backward => self.ends,
        }
    }

    /// The neighbouring interface which receives the states this stage sends in `direction`.
    pub fn push_interface(&self, direction: Direction) -> Option<InterfaceId> {
        match direction {
            Direction::Forward => self.next_starts,
            Direction::Backward => self.prev_ends,
        }
    }

    pub(crate) fn set_pull_interface(&mut self, direction: Direction, interface: InterfaceId) {
        match direction {
            Direction::Forward => self.starts = Some(interface),
            Direction::Backward => self.ends = Some(interface),
        }
    }

    pub fn introspection(&self) -> Option<&Introspection> {
        self.introspection.as_deref()
    }

    pub fn solutions(&self) -> &SolutionStore {
        &self.solutions
    }

    pub(crate) fn solutions_mut(&mut self) -> &mut SolutionStore {
        &mut self.solutions
    }

    pub fn statistics(&self) -> &StageStatistics {
        &self.statistics
    }

    pub(crate) fn statistics_mut(&mut self) -> &mut StageStatistics {
        &mut self.statistics
    }

    /// The interface the stage settled on during initialisation.
    pub fn interface_flags(&self) -> InterfaceFlags {
        self.interface_flags
    }

    pub(crate) fn set_interface_flags(&mut self, flags: InterfaceFlags) {
        self.interface_flags = flags;
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub(crate) fn properties_mut(&mut self) -> &mut PropertyMap {
        &mut self.properties
    }

    /// The solution callbacks which this stage registered during initialisation, together with
    /// the stage each of them listens to.
    pub fn registrations(&self) -> &[(StageId, SolutionCallbackId)] {
        &self.registrations
    }

    pub(crate) fn record_registration(&mut self, target: StageId, callback: SolutionCallbackId) {
        self.registrations.push((target, callback));
    }

    pub(crate) fn take_registrations(&mut self) -> Vec<(StageId, SolutionCallbackId)> {
        std::mem::take(&mut self.registrations)
    }

    /// Drop the registrations on `target`, whose solution store is gone.
    pub(crate) fn forget_registrations_on(&mut self, target: StageId) {
        self.registrations.retain(|(stage, _)| *stage != target);
    }
}

impl Display for StageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, FlagsDisplay(self.interface_flags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;
    use crate::interface::PROPAGATE_BACKWARDS;

    #[test]
    fn display_shows_name_and_arrows() {
        let mut data = StageData::new(StageId(1), "retreat");
        assert_eq!("retreat ?", data.to_string());

        data.set_interface_flags(PROPAGATE_BACKWARDS);

        assert_eq!("retreat ←↑", data.to_string());
    }

    #[test]
    fn registrations_on_a_removed_stage_are_forgotten() {
        let mut data = StageData::new(StageId(2), "derived");
        let callback = SolutionCallbackId::create_from_index(0);
        data.record_registration(StageId(0), callback);
        data.record_registration(StageId(1), callback);

        data.forget_registrations_on(StageId(0));

        assert_eq!(&[(StageId(1), callback)], data.registrations());
        assert_eq!(1, data.take_registrations().len());
        assert!(data.registrations().is_empty());
    }

    #[test]
    fn pull_interfaces_follow_the_direction() {
        let mut data = StageData::new(StageId(0), "connect");
        data.set_pull_interface(Direction::Backward, InterfaceId(3));

        assert_eq!(None, data.pull_interface(Direction::Forward));
        assert_eq!(Some(InterfaceId(3)), data.ends());
    }
}
