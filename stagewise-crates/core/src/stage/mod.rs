//! Contains the [`Stage`] trait which every kind of stage implements, together with the data the
//! engine keeps per stage and the contexts through which a stage interacts with its interfaces.
//!
//! A stage pulls states from its own interfaces (`starts` for states travelling forward, `ends`
//! for states travelling backward) and pushes states into the interfaces of its neighbours. Which
//! of these a stage does is described by its [`InterfaceFlags`].
mod contexts;
mod hierarchy;
mod properties;
mod stage_data;
mod stage_id;

pub use contexts::ComputeContext;
pub use contexts::InitialisationContext;
pub use contexts::ReadContext;
use downcast_rs::impl_downcast;
use downcast_rs::Downcast;
pub use hierarchy::ContainerId;
pub use hierarchy::Hierarchy;
pub use hierarchy::HierarchyWiring;
pub use properties::Property;
pub use properties::PropertyError;
pub use properties::PropertyMap;
pub use stage_data::StageData;
pub use stage_id::StageId;

use crate::basic_types::ConfigurationError;
use crate::interface::Direction;
use crate::interface::InterfaceFlag;
use crate::interface::InterfaceFlags;
use crate::interface::InterfaceNotification;
#[cfg(doc)]
use crate::interface::UNKNOWN;
#[cfg(doc)]
use crate::pipeline::Pipeline;
use crate::statistics::StatisticLogger;

// Allows retrieving the concrete stage from a `Box<dyn Stage>`.
impl_downcast!(Stage);

/// A node of a pipeline which consumes states from its own interfaces and produces states and
/// solutions.
///
/// The only required functions are [`Stage::name`], [`Stage::required_interface`],
/// [`Stage::can_compute`] and [`Stage::compute`]; all other functions have default
/// implementations.
///
/// A stage is driven by polling: [`Stage::compute`] is only called while [`Stage::can_compute`]
/// holds, and performs a single bounded unit of work.
pub trait Stage: Downcast {
    /// Return the name of the stage.
    ///
    /// This is a convenience method that is used for printing and statistics.
    fn name(&self) -> &str;

    /// The interface this stage needs; [`UNKNOWN`] if it can only be determined once the stage
    /// knows its neighbours.
    fn required_interface(&self) -> InterfaceFlags;

    /// Declare the properties through which the stage is configured.
    ///
    /// Called once when the stage is added to a pipeline. Every declared property needs a value
    /// or a default when the pipeline is initialised. By default nothing is declared.
    fn declare_properties(&self, _properties: &mut PropertyMap) {}

    /// Restrict the stage to (a subset of) the `accepted` interface.
    ///
    /// Called by the container for stages whose [`Stage::required_interface`] is [`UNKNOWN`],
    /// once it determined what the neighbours can provide. By default this does nothing.
    fn prune_interface(&mut self, _accepted: InterfaceFlags) -> Result<(), ConfigurationError> {
        Ok(())
    }

    /// Called by the container before the push targets are wired. A stage creates its pull
    /// interfaces and registers any listeners here.
    ///
    /// This may be called more than once; an implementation should not register twice.
    ///
    /// By default the pull interfaces demanded by [`Stage::required_interface`] are created.
    fn initialise(&mut self, mut context: InitialisationContext) -> Result<(), ConfigurationError> {
        for direction in [Direction::Forward, Direction::Backward] {
            if self
                .required_interface()
                .contains(InterfaceFlag::reads(direction))
            {
                let _ = context.create_pull_interface(direction);
            }
        }
        Ok(())
    }

    /// Fails if the wiring of the stage does not satisfy [`Stage::required_interface`].
    fn validate_connectivity(&self, context: ReadContext) -> Result<(), ConfigurationError> {
        validate_required_interface(self.name(), self.required_interface(), context)
    }

    /// Called for every state inserted into (or updated on) a pull interface to which the stage
    /// subscribed in [`Stage::initialise`].
    ///
    /// By default the stage does nothing when this method is called.
    fn notify(&mut self, _context: ReadContext, _notification: InterfaceNotification) {}

    /// Whether there is pending work; must not have any side effects.
    fn can_compute(&self, context: ReadContext) -> bool;

    /// Perform exactly one unit of work.
    fn compute(&mut self, context: ComputeContext);

    /// Logs statistics specific to this kind of stage using the provided [`StatisticLogger`].
    ///
    /// The statistics every stage keeps are logged by the [`Pipeline`].
    fn log_statistics(&self, _statistic_logger: StatisticLogger) {}
}

/// Checks that every flag of `required` is backed by an interface: the own pull interfaces must
/// exist and the push targets must still resolve.
pub fn validate_required_interface(
    name: &str,
    required: InterfaceFlags,
    context: ReadContext,
) -> Result<(), ConfigurationError> {
    for flag in required.iter() {
        let connected = match flag {
            InterfaceFlag::ReadsStart => context.pull_interface(Direction::Forward).is_some(),
            InterfaceFlag::ReadsEnd => context.pull_interface(Direction::Backward).is_some(),
            InterfaceFlag::WritesPrevEnd => context.push_interface(Direction::Backward).is_some(),
            InterfaceFlag::WritesNextStart => context.push_interface(Direction::Forward).is_some(),
        };

        if !connected {
            return Err(ConfigurationError::UnconnectedInterface {
                stage: name.to_owned(),
                flag,
            });
        }
    }

    Ok(())
}
