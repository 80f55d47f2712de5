//! Multi-threaded FBL engine.
//!
//! Uses Rayon to spread each field update across CPU cores. Rows of the
//! field being written are handed out as disjoint mutable chunks while the
//! other fields are shared read-only, so a step needs no synchronization
//! beyond the implicit join between the three phases.

use log::{info, trace};
use rayon::prelude::*;

use crate::sim::fbl::{self, FblState};
use crate::sim::{InitialConditions, ProgramOptions, SimulatorImpl};
use crate::Result;

/// Multi-threaded Forward-Backward Linear engine.
#[derive(Debug)]
pub struct FblParallelEngine {
    state: Option<FblState>,
    /// Number of threads in the Rayon pool (informational only)
    num_threads: usize,
}

impl Default for FblParallelEngine {
    fn default() -> Self {
        Self {
            state: None,
            num_threads: rayon::current_num_threads(),
        }
    }
}

impl FblParallelEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulation state, once initialized.
    pub fn state(&self) -> Option<&FblState> {
        self.state.as_ref()
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    fn initialized(&self) -> &FblState {
        self.state
            .as_ref()
            .expect("FBL engine used before successful init")
    }

    fn step(state: &mut FblState) {
        let dt = state.next_dt();
        let fields = state.fields_mut();
        let p = fields.params;
        let (h_u, h_v) = (fields.h_u, fields.h_v);

        {
            let eta = &*fields.eta;
            let hv = &*fields.hv;
            fields
                .hu
                .as_mut_slice()
                .par_chunks_mut(p.nx + 1)
                .enumerate()
                .for_each(|(j, hu_row)| {
                    fbl::update_hu_row(p, dt, j, hu_row, h_u.row(j), eta, hv);
                });
        }

        {
            let eta = &*fields.eta;
            let hu = &*fields.hu;
            fields
                .hv
                .as_mut_slice()
                .par_chunks_mut(p.nx)
                .enumerate()
                .for_each(|(j, hv_row)| {
                    fbl::update_hv_row(p, dt, j, hv_row, h_v.row(j), eta, hu);
                });
        }
        fbl::wrap_hv(p, fields.hv);

        {
            let hu = &*fields.hu;
            let hv = &*fields.hv;
            fields
                .eta
                .as_mut_slice()
                .par_chunks_mut(p.nx)
                .enumerate()
                .for_each(|(j, eta_row)| {
                    fbl::update_eta_row(p, dt, j, eta_row, hu, hv);
                });
        }

        state.advance_counter();
    }
}

impl SimulatorImpl for FblParallelEngine {
    fn name(&self) -> &str {
        "fbl-parallel"
    }

    fn init(&mut self, options: &ProgramOptions, init_cond: &InitialConditions) -> Result<()> {
        self.state = Some(FblState::new(options, init_cond)?);
        Ok(())
    }

    fn next_step(&self) -> u64 {
        self.initialized().step()
    }

    fn final_step(&self) -> u64 {
        self.initialized().plan().final_step()
    }

    fn exec_next_step(&mut self) {
        let state = self
            .state
            .as_mut()
            .expect("FBL engine used before successful init");
        Self::step(state);
        trace!("fbl-parallel: completed step {}", state.step() - 1);
    }

    fn results(&self) -> Vec<f32> {
        self.initialized().results()
    }

    fn print_status(&self) {
        info!(
            "{} [{} threads]",
            self.initialized().status_line(self.name()),
            self.num_threads
        );
    }
}
