//! Costed edges between states, and the per-stage bookkeeping of those edges.
mod introspection;
mod solution;
mod solution_callback;
mod solution_store;

pub use introspection::Introspection;
pub use solution::*;
pub use solution_callback::*;
pub use solution_store::SolutionStore;
