//! Shallow-water simulators built on a checked init/step lifecycle.
//!
//! The [`sim::Simulator`] type owns the lifecycle of a discrete-step
//! simulation: it must be initialized exactly once, after which it can be
//! stepped until its final step, queried for results and asked to report
//! status. All numerical work is delegated to a [`sim::SimulatorImpl`].
//!
//! The crate ships one family of engines: the Forward-Backward Linear
//! scheme for the linearized shallow-water equations on an Arakawa C grid,
//! in a single-threaded reference variant and a multi-threaded variant.
//!
//! ```no_run
//! use std::sync::Arc;
//! use swesim::sim::{Engine, InitialConditions, ProgramOptions, Simulator};
//!
//! let mut options = ProgramOptions::new(64, 64, 20_000.0, 20_000.0, 90.0);
//! options.set_steps(100);
//! let init_cond = InitialConditions::gaussian_bump(64, 64, 60.0, 1.0, 4.0);
//!
//! let options = Arc::new(options);
//! let engine = Engine::for_options(&options);
//! let mut sim = Simulator::new(engine, options, Arc::new(init_cond));
//! sim.init().unwrap();
//! while !sim.is_finished() {
//!     sim.exec_next_step();
//! }
//! sim.print_status();
//! ```

pub mod arrays;
pub mod error;
pub mod sim;

pub use error::{Error, Result};
