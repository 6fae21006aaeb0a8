mod configuration_error;
mod cost;
mod debug_dyn;
mod payload;

pub use configuration_error::ConfigurationError;
pub use cost::Cost;
pub(crate) use debug_dyn::DebugDyn;
pub use payload::Payload;
