//! The kinds of stages the engine provides. Each of them delegates the domain computation to a
//! hook trait implemented outside of this crate.
mod connecting;
mod generator;
mod monitoring_generator;
mod propagating;

pub use connecting::*;
pub use generator::*;
pub use monitoring_generator::*;
pub use propagating::*;
