//! High-level run control.
//!
//! [`Runner`] is the usual caller of a [`Simulator`]: it initializes it
//! once, drives the step loop to the final step, reports status
//! periodically and returns timing statistics.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use instant::Instant;
use log::info;

use crate::sim::{Engine, InitialConditions, ProgramOptions, Simulator, SimulatorImpl, StepPlan};
use crate::{Error, Result};

/// Statistics from a completed run.
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Steps executed by this call to `run`
    pub steps: u64,
    /// Simulated time at the end of the run (seconds)
    pub sim_time: f64,
    /// Wall clock time (seconds)
    pub wall_time: f64,
    /// Average speed (million cell updates per second)
    pub speed_mcells_per_sec: f64,
}

/// Drives a simulator from initialization to its final step.
pub struct Runner<E = Engine> {
    simulator: Simulator<E>,
    show_progress: bool,
}

impl Runner<Engine> {
    /// Build a runner around the engine selected by `options`.
    pub fn from_options(options: Arc<ProgramOptions>, init_cond: Arc<InitialConditions>) -> Self {
        let engine = Engine::for_options(&options);
        Self::new(Simulator::new(engine, options, init_cond))
    }
}

impl<E: SimulatorImpl> Runner<E> {
    /// Wrap an existing simulator (initialized or not).
    pub fn new(simulator: Simulator<E>) -> Self {
        Self {
            simulator,
            show_progress: false,
        }
    }

    /// Enable/disable the progress bar.
    pub fn set_show_progress(&mut self, show: bool) -> &mut Self {
        self.show_progress = show;
        self
    }

    /// Run every remaining step.
    ///
    /// Initializes the simulator first if needed; initialization errors are
    /// returned and leave the simulator uninitialized. Fails if the
    /// simulator has already reached its final step.
    pub fn run(&mut self) -> Result<RunStats> {
        if !self.simulator.is_initialized() {
            self.simulator.init()?;
        }

        if self.simulator.is_finished() {
            return Err(Error::Config("Simulation already finished".into()));
        }

        let options = Arc::clone(self.simulator.options());
        let plan = StepPlan::from_options(&options)?;
        let status_interval = options.status_interval();

        let first_step = self.simulator.next_step();
        let total_steps = self.simulator.final_step() + 1;

        info!(
            "{} simulation: {}x{} cells, dt = {} s, steps {}..{}",
            self.simulator.engine().name(),
            options.nx(),
            options.ny(),
            options.dt(),
            first_step,
            total_steps
        );

        let progress = if self.show_progress {
            let pb = ProgressBar::new(total_steps);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({per_sec})")
                    .map_err(|e| Error::Config(format!("progress template: {}", e)))?
                    .progress_chars("##-"),
            );
            pb.set_position(first_step);
            Some(pb)
        } else {
            None
        };

        let start_time = Instant::now();

        while !self.simulator.is_finished() {
            self.simulator.exec_next_step();
            let done = self.simulator.next_step();

            if let Some(ref pb) = progress {
                pb.set_position(done);
            }

            if status_interval > 0 && done % status_interval == 0 {
                self.simulator.print_status();
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message("Simulation complete");
        }

        let wall_time = start_time.elapsed().as_secs_f64();
        let steps = self.simulator.next_step() - first_step;
        let num_cells = (options.nx() * options.ny()) as f64;
        let speed = if wall_time > 0.0 {
            steps as f64 * num_cells / wall_time / 1e6
        } else {
            0.0
        };

        let stats = RunStats {
            steps,
            sim_time: plan.time_after(self.simulator.next_step()),
            wall_time,
            speed_mcells_per_sec: speed,
        };

        info!(
            "Completed {} steps ({:.1} s simulated) in {:.2}s ({:.2} MC/s)",
            stats.steps, stats.sim_time, stats.wall_time, stats.speed_mcells_per_sec
        );

        Ok(stats)
    }

    /// The driven simulator.
    pub fn simulator(&self) -> &Simulator<E> {
        &self.simulator
    }

    /// Mutable access to the driven simulator.
    pub fn simulator_mut(&mut self) -> &mut Simulator<E> {
        &mut self.simulator
    }

    /// Give back the simulator.
    pub fn into_simulator(self) -> Simulator<E> {
        self.simulator
    }
}
