//! Simulator lifecycle.
//!
//! [`Simulator`] wraps a concrete engine and enforces the order in which it
//! may be driven:
//!
//! 1. Construct it (uninitialized) with shared options and initial conditions.
//! 2. Call [`Simulator::init`] once. If the engine rejects its inputs the
//!    simulator stays uninitialized and `init` may be retried.
//! 3. Step with [`Simulator::exec_next_step`] while
//!    `next_step() <= final_step()`, reading [`Simulator::results`] and
//!    calling [`Simulator::print_status`] as needed.
//!
//! Misuse of this order is a caller bug and panics: initializing twice,
//! touching engine state before a successful `init`, or stepping past the
//! final step.
//!
//! A simulator is not meant for concurrent use. `init` and `exec_next_step`
//! mutate it in place through `&mut self`; callers that share one across
//! threads must serialize access (e.g. behind a `Mutex`) or build one
//! simulator per thread.

use std::sync::Arc;

use log::{debug, warn};

use crate::sim::{InitialConditions, ProgramOptions};
use crate::Result;

/// Hooks a concrete engine implements to be driven by a [`Simulator`].
///
/// Each hook backs the public [`Simulator`] operation of the same name. The
/// simulator checks lifecycle preconditions before calling any of them, so
/// implementations may assume `init` succeeded before any other hook runs.
pub trait SimulatorImpl {
    /// Short human-readable engine name.
    fn name(&self) -> &str;

    /// Prepare internal state from the run configuration.
    ///
    /// Returning an error leaves the engine unusable until a later call
    /// succeeds.
    fn init(&mut self, options: &ProgramOptions, init_cond: &InitialConditions) -> Result<()>;

    /// Index of the next step to execute.
    fn next_step(&self) -> u64;

    /// Index of the last step the run will execute.
    fn final_step(&self) -> u64;

    /// Advance the simulation by one step.
    fn exec_next_step(&mut self);

    /// Snapshot of the current results.
    fn results(&self) -> Vec<f32>;

    /// Report human-readable status.
    fn print_status(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Initialized,
}

/// A discrete-step simulation with a checked init/step lifecycle.
///
/// Generic over the engine type so dispatch to the hooks is static; use
/// [`crate::sim::Engine`] to pick an engine at runtime.
#[derive(Debug)]
pub struct Simulator<E> {
    engine: E,
    options: Arc<ProgramOptions>,
    init_cond: Arc<InitialConditions>,
    lifecycle: Lifecycle,
}

impl<E: SimulatorImpl> Simulator<E> {
    /// Create an uninitialized simulator.
    pub fn new(engine: E, options: Arc<ProgramOptions>, init_cond: Arc<InitialConditions>) -> Self {
        Self {
            engine,
            options,
            init_cond,
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    /// Initialize the engine.
    ///
    /// On error the simulator stays uninitialized and `init` may be called
    /// again.
    ///
    /// # Panics
    /// If the simulator is already initialized.
    #[track_caller]
    pub fn init(&mut self) -> Result<()> {
        assert!(
            self.lifecycle == Lifecycle::Uninitialized,
            "double initialization: {} simulator is already initialized",
            self.engine.name()
        );

        match self.engine.init(&self.options, &self.init_cond) {
            Ok(()) => {
                self.lifecycle = Lifecycle::Initialized;
                debug!(
                    "{} simulator initialized: steps {}..={}",
                    self.engine.name(),
                    self.engine.next_step(),
                    self.engine.final_step()
                );
                Ok(())
            }
            Err(e) => {
                warn!("{} simulator failed to initialize: {}", self.engine.name(), e);
                Err(e)
            }
        }
    }

    /// Whether `init` has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.lifecycle == Lifecycle::Initialized
    }

    /// Index of the next step to execute.
    ///
    /// # Panics
    /// If the simulator is not initialized.
    #[track_caller]
    pub fn next_step(&self) -> u64 {
        self.assert_initialized("next_step");
        self.engine.next_step()
    }

    /// Index of the last step the run will execute.
    ///
    /// # Panics
    /// If the simulator is not initialized.
    #[track_caller]
    pub fn final_step(&self) -> u64 {
        self.assert_initialized("final_step");
        self.engine.final_step()
    }

    /// True once every step up to and including `final_step` has run.
    ///
    /// # Panics
    /// If the simulator is not initialized.
    #[track_caller]
    pub fn is_finished(&self) -> bool {
        self.assert_initialized("is_finished");
        self.engine.next_step() > self.engine.final_step()
    }

    /// Advance the simulation by one step.
    ///
    /// # Panics
    /// If the simulator is not initialized, or if the final step has
    /// already been executed.
    #[track_caller]
    pub fn exec_next_step(&mut self) {
        self.assert_initialized("exec_next_step");
        let next = self.engine.next_step();
        let last = self.engine.final_step();
        assert!(
            next <= last,
            "step past end: next step {} is beyond final step {}",
            next,
            last
        );
        self.engine.exec_next_step();
    }

    /// Snapshot of the current results.
    ///
    /// # Panics
    /// If the simulator is not initialized.
    #[track_caller]
    pub fn results(&self) -> Vec<f32> {
        self.assert_initialized("results");
        self.engine.results()
    }

    /// Report engine status through the log.
    ///
    /// # Panics
    /// If the simulator is not initialized.
    #[track_caller]
    pub fn print_status(&self) {
        self.assert_initialized("print_status");
        self.engine.print_status();
    }

    /// Borrow the concrete engine.
    ///
    /// # Panics
    /// If the simulator is not initialized.
    #[track_caller]
    pub fn engine(&self) -> &E {
        self.assert_initialized("engine");
        &self.engine
    }

    /// Options supplied at construction. Available in any state.
    pub fn options(&self) -> &Arc<ProgramOptions> {
        &self.options
    }

    /// Initial conditions supplied at construction. Available in any state.
    pub fn init_cond(&self) -> &Arc<InitialConditions> {
        &self.init_cond
    }

    #[track_caller]
    fn assert_initialized(&self, operation: &str) {
        assert!(
            self.lifecycle == Lifecycle::Initialized,
            "use before initialization: {}() called on an uninitialized {} simulator",
            operation,
            self.engine.name()
        );
    }
}
