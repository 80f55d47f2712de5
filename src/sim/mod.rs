//! Simulation lifecycle, configuration and the FBL shallow-water engines.

mod engine;
pub mod fbl;
mod fbl_basic;
mod fbl_parallel;
mod init_cond;
mod options;
mod runner;
mod simulator;

#[cfg(test)]
pub mod engine_testing;

pub use engine::{Engine, EngineType};
pub use fbl_basic::FblBasicEngine;
pub use fbl_parallel::FblParallelEngine;
pub use init_cond::InitialConditions;
pub use options::{
    Boundary, BoundaryConditions, EndCondition, ProgramOptions, StepPlan, WindStress, DEFAULT_F,
    DEFAULT_G, DEFAULT_R,
};
pub use runner::{RunStats, Runner};
pub use simulator::{Simulator, SimulatorImpl};
