//! Run configuration shared between a simulator and its caller.
//!
//! A [`ProgramOptions`] is assembled with chaining setters and then frozen
//! behind an `Arc`; simulators only ever read it.

use crate::sim::EngineType;
use crate::{Error, Result};

/// Default gravitational acceleration (m/s^2).
pub const DEFAULT_G: f32 = 9.81;
/// Default Coriolis parameter (1/s).
pub const DEFAULT_F: f32 = 1.2e-4;
/// Default bottom friction coefficient (m/s).
pub const DEFAULT_R: f32 = 2.4e-3;

/// When a run ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EndCondition {
    /// Run exactly this many steps of size `dt`
    Steps(u64),
    /// Run until this much simulated time (seconds) has elapsed; the last
    /// step is shortened so the run ends exactly on it
    Duration(f64),
}

impl Default for EndCondition {
    fn default() -> Self {
        Self::Steps(1000)
    }
}

/// Boundary treatment along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Boundary {
    /// Closed wall: no normal flux through the domain edge
    #[default]
    Wall,
    /// Flow leaving one side re-enters on the opposite side
    Periodic,
}

/// Boundary conditions for both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundaryConditions {
    /// West/east edges
    pub x: Boundary,
    /// South/north edges
    pub y: Boundary,
}

impl BoundaryConditions {
    /// Walls on all four sides.
    pub fn closed() -> Self {
        Self::default()
    }

    /// Periodic in both directions.
    pub fn periodic() -> Self {
        Self {
            x: Boundary::Periodic,
            y: Boundary::Periodic,
        }
    }
}

/// Surface wind forcing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WindStress {
    #[default]
    None,
    /// Spatially uniform stress of magnitude `tau0` (N/m^2) blowing at angle
    /// `alpha` (radians, counter-clockwise from +x) over water of density `rho`
    Uniform { tau0: f32, rho: f32, alpha: f32 },
}

impl WindStress {
    /// Kinematic forcing `(X, Y)` added to the momentum equations.
    pub fn forcing(&self) -> (f32, f32) {
        match *self {
            WindStress::None => (0.0, 0.0),
            WindStress::Uniform { tau0, rho, alpha } => {
                let magnitude = tau0 / rho;
                (magnitude * alpha.cos(), magnitude * alpha.sin())
            }
        }
    }
}

/// Configuration for one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramOptions {
    nx: usize,
    ny: usize,
    dx: f32,
    dy: f32,
    dt: f32,
    g: f32,
    f: f32,
    r: f32,
    end_condition: EndCondition,
    wind_stress: WindStress,
    boundary_conditions: BoundaryConditions,
    engine_type: EngineType,
    status_interval: u64,
}

impl ProgramOptions {
    /// Create options for an `nx` x `ny` grid with the given spacing and timestep.
    ///
    /// Physical constants start at their defaults ([`DEFAULT_G`],
    /// [`DEFAULT_F`], [`DEFAULT_R`]).
    pub fn new(nx: usize, ny: usize, dx: f32, dy: f32, dt: f32) -> Self {
        Self {
            nx,
            ny,
            dx,
            dy,
            dt,
            g: DEFAULT_G,
            f: DEFAULT_F,
            r: DEFAULT_R,
            end_condition: EndCondition::default(),
            wind_stress: WindStress::default(),
            boundary_conditions: BoundaryConditions::default(),
            engine_type: EngineType::default(),
            status_interval: 0,
        }
    }

    /// Set gravitational acceleration.
    pub fn set_gravity(&mut self, g: f32) -> &mut Self {
        self.g = g;
        self
    }

    /// Set the Coriolis parameter.
    pub fn set_coriolis(&mut self, f: f32) -> &mut Self {
        self.f = f;
        self
    }

    /// Set the bottom friction coefficient.
    pub fn set_friction(&mut self, r: f32) -> &mut Self {
        self.r = r;
        self
    }

    /// Set the end condition.
    pub fn set_end_condition(&mut self, condition: EndCondition) -> &mut Self {
        self.end_condition = condition;
        self
    }

    /// Shorthand for `set_end_condition(EndCondition::Steps(n))`.
    pub fn set_steps(&mut self, n: u64) -> &mut Self {
        self.set_end_condition(EndCondition::Steps(n))
    }

    /// Shorthand for `set_end_condition(EndCondition::Duration(t_end))`.
    pub fn set_duration(&mut self, t_end: f64) -> &mut Self {
        self.set_end_condition(EndCondition::Duration(t_end))
    }

    /// Set wind forcing.
    pub fn set_wind_stress(&mut self, wind_stress: WindStress) -> &mut Self {
        self.wind_stress = wind_stress;
        self
    }

    /// Set boundary conditions.
    pub fn set_boundary_conditions(&mut self, bc: BoundaryConditions) -> &mut Self {
        self.boundary_conditions = bc;
        self
    }

    /// Select the engine implementation.
    pub fn set_engine_type(&mut self, engine_type: EngineType) -> &mut Self {
        self.engine_type = engine_type;
        self
    }

    /// Report status every `n` steps while running (0 = never).
    pub fn set_status_interval(&mut self, n: u64) -> &mut Self {
        self.status_interval = n;
        self
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn dx(&self) -> f32 {
        self.dx
    }

    pub fn dy(&self) -> f32 {
        self.dy
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn g(&self) -> f32 {
        self.g
    }

    pub fn f(&self) -> f32 {
        self.f
    }

    pub fn r(&self) -> f32 {
        self.r
    }

    pub fn end_condition(&self) -> EndCondition {
        self.end_condition
    }

    pub fn wind_stress(&self) -> WindStress {
        self.wind_stress
    }

    pub fn boundary_conditions(&self) -> BoundaryConditions {
        self.boundary_conditions
    }

    pub fn engine_type(&self) -> EngineType {
        self.engine_type
    }

    pub fn status_interval(&self) -> u64 {
        self.status_interval
    }

    /// Grid size as `(nx, ny)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Check that the options describe a runnable simulation.
    pub fn validate(&self) -> Result<()> {
        if self.nx == 0 || self.ny == 0 {
            return Err(Error::Config(format!(
                "grid must have at least one cell in each direction, got {}x{}",
                self.nx, self.ny
            )));
        }

        for (name, value) in [("dx", self.dx), ("dy", self.dy), ("dt", self.dt), ("g", self.g)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }

        if !self.f.is_finite() {
            return Err(Error::Config(format!("f must be finite, got {}", self.f)));
        }
        if !(self.r.is_finite() && self.r >= 0.0) {
            return Err(Error::Config(format!(
                "r must be non-negative and finite, got {}",
                self.r
            )));
        }

        if let WindStress::Uniform { tau0, rho, alpha } = self.wind_stress {
            if !(rho.is_finite() && rho > 0.0) {
                return Err(Error::Config(format!(
                    "wind stress rho must be positive, got {}",
                    rho
                )));
            }
            if !(tau0.is_finite() && alpha.is_finite()) {
                return Err(Error::Config("wind stress parameters must be finite".into()));
            }
        }

        StepPlan::from_options(self).map(|_| ())
    }
}

/// How many steps a run takes and how long each one is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPlan {
    num_steps: u64,
    dt: f64,
    t_end: f64,
}

impl StepPlan {
    /// Derive the plan from the end condition and nominal timestep.
    ///
    /// Fails if the run would contain no steps.
    pub fn from_options(options: &ProgramOptions) -> Result<Self> {
        let dt = options.dt as f64;
        let plan = match options.end_condition {
            EndCondition::Steps(n) => Self {
                num_steps: n,
                dt,
                t_end: n as f64 * dt,
            },
            EndCondition::Duration(t_end) => {
                if !t_end.is_finite() {
                    return Err(Error::Config(format!("duration must be finite, got {}", t_end)));
                }
                let steps = (t_end / dt).ceil();
                Self {
                    num_steps: if steps > 0.0 { steps as u64 } else { 0 },
                    dt,
                    t_end,
                }
            }
        };

        if plan.num_steps == 0 {
            return Err(Error::Config(format!(
                "end condition {:?} yields no steps",
                options.end_condition
            )));
        }

        Ok(plan)
    }

    /// Total number of steps.
    pub fn num_steps(&self) -> u64 {
        self.num_steps
    }

    /// Index of the last step.
    pub fn final_step(&self) -> u64 {
        self.num_steps - 1
    }

    /// Simulated time at which the run ends.
    pub fn t_end(&self) -> f64 {
        self.t_end
    }

    /// Length of step `step`.
    pub fn dt_for(&self, step: u64) -> f64 {
        self.dt.min(self.t_end - step as f64 * self.dt)
    }

    /// Simulated time after `steps_done` steps.
    pub fn time_after(&self, steps_done: u64) -> f64 {
        if steps_done >= self.num_steps {
            self.t_end
        } else {
            steps_done as f64 * self.dt
        }
    }
}
