//! # Stagewise
//! A pipeline engine for composing planning computations out of independently implemented
//! stages.
//!
//! Every stage consumes states from its own interfaces and produces states onto the interfaces of
//! its neighbours. States and solutions carry a [`Cost`]; the cheapest pending work is always
//! explored first, and an infinite cost marks a failure.
//!
//! The engine provides four kinds of stages, each of which delegates its domain computation to a
//! hook trait:
//! - a [`Generator`](stages::Generator) synthesizes states ([`Generate`](stages::Generate));
//! - a [`PropagatingEitherWay`](stages::PropagatingEitherWay) stage transforms a state into a
//!   state on its other side ([`Propagate`](stages::Propagate));
//! - a [`Connecting`](stages::Connecting) stage links pairs of states from both of its sides
//!   ([`Connect`](stages::Connect));
//! - a [`MonitoringGenerator`](stages::MonitoringGenerator) derives states from the solutions of
//!   another stage ([`Monitor`](stages::Monitor)).
//!
//! The stages are assembled in a [`Pipeline`], which wires them and drives them by polling.
//!
//! ```rust
//! use stagewise_core::stages::Generate;
//! use stagewise_core::stages::Generated;
//! use stagewise_core::stages::Generator;
//! use stagewise_core::termination::Indefinite;
//! use stagewise_core::Pipeline;
//! use stagewise_core::StateDraft;
//! use stagewise_core::SubTrajectory;
//!
//! #[derive(Debug)]
//! struct Seeds(Vec<u32>);
//!
//! impl Generate for Seeds {
//!     fn can_compute(&self) -> bool {
//!         !self.0.is_empty()
//!     }
//!
//!     fn compute(&mut self) -> Generated {
//!         let seed = self.0.remove(0);
//!         Generated::new(StateDraft::new(seed, seed), SubTrajectory::new(0.0))
//!     }
//! }
//!
//! let mut pipeline = Pipeline::new("example");
//! let seeds = pipeline.add_stage(Generator::new("seeds", Seeds(vec![5, 1, 3])));
//! pipeline.initialise().expect("a single generator is a valid pipeline");
//!
//! let num_computes = pipeline.run(Indefinite).expect("the pipeline is initialised");
//!
//! assert_eq!(3, num_computes);
//! assert_eq!(
//!     3,
//!     pipeline
//!         .stage_data(seeds)
//!         .map_or(0, |data| data.solutions().num_solutions())
//! );
//! ```
pub(crate) mod basic_types;
pub mod containers;
pub mod interface;
pub mod pipeline;
pub mod solutions;
pub mod stage;
pub mod stages;
pub(crate) mod stagewise_asserts;
pub mod statistics;
pub mod termination;

pub use convert_case;

pub use crate::basic_types::ConfigurationError;
pub use crate::basic_types::Cost;
pub use crate::basic_types::Payload;
pub use crate::interface::Direction;
pub use crate::interface::InterfaceState;
pub use crate::interface::StateDraft;
pub use crate::pipeline::Pipeline;
pub use crate::solutions::SolutionBase;
pub use crate::solutions::SubTrajectory;
pub use crate::stage::Stage;
pub use crate::stage::StageId;
