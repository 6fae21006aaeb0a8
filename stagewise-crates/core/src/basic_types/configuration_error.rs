use thiserror::Error;

use crate::interface::InterfaceFlag;
#[cfg(doc)]
use crate::pipeline::Pipeline;
use crate::stage::PropertyError;
use crate::stage::StageId;

/// Structural errors detected while assembling a [`Pipeline`].
///
/// These are reported before any computation takes place and cannot be recovered from at
/// runtime; failing computations are never reported through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A stage requires an interface which its wiring does not provide.
    #[error("stage '{stage}' requires the interface '{flag}' but it is not connected")]
    UnconnectedInterface { stage: String, flag: InterfaceFlag },
    /// A propagating stage cannot propagate in any direction given its neighbours.
    #[error("stage '{stage}' cannot propagate in any direction")]
    NoPropagationDirection { stage: String },
    /// A stage was asked to restrict its interface to something it does not support.
    #[error("stage '{stage}' cannot be restricted to the interface [{accepted}]")]
    RejectedInterface { stage: String, accepted: String },
    /// Two adjacent stages disagree on the interface they share.
    #[error("stages '{first}' and '{second}' disagree on their shared interface")]
    InterfaceMismatch { first: String, second: String },
    /// A monitoring generator refers to a stage which is not part of the pipeline.
    #[error("monitoring generator '{stage}' monitors a stage which is not part of the pipeline")]
    MissingMonitoredStage { stage: String },
    /// The properties of a stage are incomplete or inconsistent.
    #[error("stage '{stage}': {source}")]
    Property {
        stage: String,
        source: PropertyError,
    },
    /// The pipeline has no stage which could receive a state from its boundary.
    #[error("the pipeline does not contain any stage")]
    EmptyPipeline,
    /// Computation was requested before the pipeline was initialised.
    #[error("the pipeline has not been initialised")]
    NotInitialised,
    /// The given stage is not part of the pipeline.
    #[error("{0} is not part of the pipeline")]
    UnknownStage(StageId),
}
