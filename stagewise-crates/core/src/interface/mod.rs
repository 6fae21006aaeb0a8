//! The cost-ordered queues of states which connect adjacent stages.
//!
//! Every directional edge between two stages has exactly one [`Interface`]; it is owned by the
//! stage which pulls from it, while the neighbour pushing into it only remembers its
//! [`InterfaceId`]. Resolving that id through the [`InterfaceRegistry`] yields [`None`] once the
//! owner has released the interface.
mod direction;
mod interface_flags;
mod interface_state;
mod queue;
mod registry;
mod state_store;

pub use direction::Direction;
pub use interface_flags::*;
pub use interface_state::*;
pub use queue::*;
pub use registry::*;
pub use state_store::StateStore;
