//! Single-threaded FBL engine.
//!
//! Reference implementation of the Forward-Backward Linear scheme. Rows
//! are updated one after another; the parallel engine is checked against
//! this one.

use log::{info, trace};

use crate::sim::fbl::{self, FblState};
use crate::sim::{InitialConditions, ProgramOptions, SimulatorImpl};
use crate::Result;

/// Single-threaded Forward-Backward Linear engine.
#[derive(Debug, Default)]
pub struct FblBasicEngine {
    state: Option<FblState>,
}

impl FblBasicEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulation state, once initialized.
    pub fn state(&self) -> Option<&FblState> {
        self.state.as_ref()
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

        // U: forward in time using the old hv and eta
        let hu_width = p.nx + 1;
        for (j, hu_row) in fields.hu.as_mut_slice().chunks_mut(hu_width).enumerate() {
            fbl::update_hu_row(p, dt, j, hu_row, fields.h_u.row(j), fields.eta, fields.hv);
        }

        // V: Coriolis term from the freshly updated hu
        for (j, hv_row) in fields.hv.as_mut_slice().chunks_mut(p.nx).enumerate() {
            fbl::update_hv_row(p, dt, j, hv_row, fields.h_v.row(j), fields.eta, fields.hu);
        }
        fbl::wrap_hv(p, fields.hv);

        // eta: backward, from the divergence of the new momenta
        for (j, eta_row) in fields.eta.as_mut_slice().chunks_mut(p.nx).enumerate() {
            fbl::update_eta_row(p, dt, j, eta_row, fields.hu, fields.hv);
        }

        state.advance_counter();
    }
}

impl SimulatorImpl for FblBasicEngine {
    fn name(&self) -> &str {
        "fbl-basic"
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
        trace!("fbl-basic: completed step {}", state.step() - 1);
    }

    fn results(&self) -> Vec<f32> {
        self.initialized().results()
    }

    fn print_status(&self) {
        info!("{}", self.initialized().status_line(self.name()));
    }
}
