//! Forward-Backward Linear scheme for the shallow-water equations.
//!
//! Implements the linearized shallow-water equations with Coriolis force,
//! linear bottom friction and wind forcing on an Arakawa C grid, following
//! L. P. Røed, "Documentation of simple ocean models for use in ensemble
//! predictions", Met.no report 2012/3 and 2012/5.
//!
//! Each step is forward-backward: `hu` is updated from the old state, `hv`
//! uses the new `hu` for its Coriolis term, and `eta` uses both new momenta.
//! Friction is treated semi-implicitly.
//!
//! The update rules are written as row kernels so the single-threaded and
//! multi-threaded engines share the exact arithmetic and differ only in how
//! rows are scheduled.

use crate::arrays::{Dimensions, Field2D};
use crate::sim::{Boundary, BoundaryConditions, InitialConditions, ProgramOptions, StepPlan};
use crate::{Error, Result};

/// Constants used by the update kernels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FblParams {
    /// Number of cells along x
    pub nx: usize,
    /// Number of cells along y
    pub ny: usize,
    pub dx: f32,
    pub dy: f32,
    pub g: f32,
    pub f: f32,
    pub r: f32,
    /// Kinematic wind forcing along x
    pub wind_x: f32,
    /// Kinematic wind forcing along y
    pub wind_y: f32,
    pub boundaries: BoundaryConditions,
}

impl FblParams {
    fn from_options(options: &ProgramOptions) -> Self {
        let (wind_x, wind_y) = options.wind_stress().forcing();
        Self {
            nx: options.nx(),
            ny: options.ny(),
            dx: options.dx(),
            dy: options.dy(),
            g: options.g(),
            f: options.f(),
            r: options.r(),
            wind_x,
            wind_y,
            boundaries: options.boundary_conditions(),
        }
    }
}

/// Courant number of the fastest gravity wave for the given depth and timestep.
///
/// The scheme is stable for values up to 1.
pub fn courant_number(options: &ProgramOptions, max_depth: f32) -> f32 {
    let c = (options.g() * max_depth).sqrt();
    let inv_dx = 1.0 / options.dx();
    let inv_dy = 1.0 / options.dy();
    options.dt() * c * (inv_dx * inv_dx + inv_dy * inv_dy).sqrt()
}

/// Complete FBL simulation state after a successful initialization.
#[derive(Debug, Clone)]
pub struct FblState {
    params: FblParams,
    plan: StepPlan,
    /// Depth interpolated to x-faces, (nx+1) x ny
    h_u: Field2D,
    /// Depth interpolated to y-faces, nx x (ny+1)
    h_v: Field2D,
    eta: Field2D,
    hu: Field2D,
    hv: Field2D,
    step: u64,
}

impl FblState {
    /// Validate the inputs and build the initial state.
    pub fn new(options: &ProgramOptions, init_cond: &InitialConditions) -> Result<Self> {
        options.validate()?;
        let plan = StepPlan::from_options(options)?;

        if init_cond.dimensions() != options.dimensions() {
            return Err(Error::ShapeMismatch {
                field: "eta",
                expected: options.dimensions(),
                actual: init_cond.dimensions(),
            });
        }

        let h = init_cond.h();
        let (min_depth, max_depth) = match (h.min(), h.max()) {
            (Some(min), Some(max)) => (min, max),
            _ => return Err(Error::InitialConditions("depth field is empty".into())),
        };
        if min_depth <= 0.0 {
            return Err(Error::InitialConditions(format!(
                "water depth must be positive everywhere, minimum is {}",
                min_depth
            )));
        }

        let courant = courant_number(options, max_depth);
        if courant > 1.0 {
            return Err(Error::Unstable { courant });
        }

        let params = FblParams::from_options(options);

        Ok(Self {
            params,
            plan,
            h_u: face_depth_u(h, params.boundaries.x),
            h_v: face_depth_v(h, params.boundaries.y),
            eta: init_cond.eta().clone(),
            hu: init_cond.hu().clone(),
            hv: init_cond.hv().clone(),
            step: 0,
        })
    }

    pub fn params(&self) -> &FblParams {
        &self.params
    }

    pub fn plan(&self) -> &StepPlan {
        &self.plan
    }

    /// Index of the next step.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Simulated time in seconds.
    pub fn time(&self) -> f64 {
        self.plan.time_after(self.step)
    }

    /// Timestep length for the next step.
    pub fn next_dt(&self) -> f32 {
        self.plan.dt_for(self.step) as f32
    }

    pub fn eta(&self) -> &Field2D {
        &self.eta
    }

    pub fn hu(&self) -> &Field2D {
        &self.hu
    }

    pub fn hv(&self) -> &Field2D {
        &self.hv
    }

    pub fn h_u(&self) -> &Field2D {
        &self.h_u
    }

    pub fn h_v(&self) -> &Field2D {
        &self.h_v
    }

    /// Disjoint borrows for the momentum/elevation update.
    pub(crate) fn fields_mut(&mut self) -> FieldsMut<'_> {
        FieldsMut {
            params: &self.params,
            h_u: &self.h_u,
            h_v: &self.h_v,
            eta: &mut self.eta,
            hu: &mut self.hu,
            hv: &mut self.hv,
        }
    }

    pub(crate) fn advance_counter(&mut self) {
        self.step += 1;
    }

    /// Sum of surface elevation over all cells (proportional to excess volume).
    pub fn mass(&self) -> f64 {
        self.eta.sum()
    }

    /// Concatenation of `eta`, `hu` and `hv` in row-major order.
    pub fn results(&self) -> Vec<f32> {
        let mut out =
            Vec::with_capacity(self.eta.dims().total() + self.hu.dims().total() + self.hv.dims().total());
        out.extend_from_slice(self.eta.as_slice());
        out.extend_from_slice(self.hu.as_slice());
        out.extend_from_slice(self.hv.as_slice());
        out
    }

    /// One-line status summary.
    pub fn status_line(&self, name: &str) -> String {
        format!(
            "{}: step {}/{}, t = {:.1} s, mass = {:.6e}, max |eta| = {:.4e}, max |hu| = {:.4e}, max |hv| = {:.4e}",
            name,
            self.step,
            self.plan.num_steps(),
            self.time(),
            self.mass(),
            self.eta.max_abs(),
            self.hu.max_abs(),
            self.hv.max_abs()
        )
    }
}

pub(crate) struct FieldsMut<'a> {
    pub params: &'a FblParams,
    pub h_u: &'a Field2D,
    pub h_v: &'a Field2D,
    pub eta: &'a mut Field2D,
    pub hu: &'a mut Field2D,
    pub hv: &'a mut Field2D,
}

fn face_depth_u(h: &Field2D, boundary: Boundary) -> Field2D {
    let Dimensions { nx, ny } = h.dims();
    Field2D::from_fn(Dimensions::new(nx + 1, ny), |i, j| {
        if i > 0 && i < nx {
            0.5 * (h.get(i - 1, j) + h.get(i, j))
        } else {
            match boundary {
                Boundary::Periodic => 0.5 * (h.get(nx - 1, j) + h.get(0, j)),
                Boundary::Wall => h.get(i.min(nx - 1), j),
            }
        }
    })
}

fn face_depth_v(h: &Field2D, boundary: Boundary) -> Field2D {
    let Dimensions { nx, ny } = h.dims();
    Field2D::from_fn(Dimensions::new(nx, ny + 1), |i, j| {
        if j > 0 && j < ny {
            0.5 * (h.get(i, j - 1) + h.get(i, j))
        } else {
            match boundary {
                Boundary::Periodic => 0.5 * (h.get(i, ny - 1) + h.get(i, 0)),
                Boundary::Wall => h.get(i, j.min(ny - 1)),
            }
        }
    })
}

/// Update one row (fixed `j`) of `hu` from the old `hv` and `eta`.
///
/// With walls the edge faces stay zero. With periodic x the west face is
/// computed against the wrapped cell and the east face copies it.
pub(crate) fn update_hu_row(
    p: &FblParams,
    dt: f32,
    j: usize,
    hu_row: &mut [f32],
    h_u_row: &[f32],
    eta: &Field2D,
    hv: &Field2D,
) {
    let nx = p.nx;
    let periodic = p.boundaries.x == Boundary::Periodic;
    let first = if periodic { 0 } else { 1 };

    for i in first..nx {
        let iw = if i == 0 { nx - 1 } else { i - 1 };
        let ie = i;

        let h_m = h_u_row[i];
        let v_m = 0.25 * (hv.get(iw, j) + hv.get(ie, j) + hv.get(iw, j + 1) + hv.get(ie, j + 1));
        let deta_dx = (eta.get(ie, j) - eta.get(iw, j)) / p.dx;

        let b = 1.0 + p.r * dt / h_m;
        let p_term = p.f * v_m - p.g * h_m * deta_dx + p.wind_x;
        hu_row[i] = (hu_row[i] + dt * p_term) / b;
    }

    if periodic {
        hu_row[nx] = hu_row[0];
    } else {
        hu_row[0] = 0.0;
        hu_row[nx] = 0.0;
    }
}

/// Update one row (face index `j`) of `hv` from the new `hu` and old `eta`.
///
/// Returns without touching the row for wall faces.
pub(crate) fn update_hv_row(
    p: &FblParams,
    dt: f32,
    j: usize,
    hv_row: &mut [f32],
    h_v_row: &[f32],
    eta: &Field2D,
    hu: &Field2D,
) {
    let ny = p.ny;
    let periodic = p.boundaries.y == Boundary::Periodic;

    if j == ny || (j == 0 && !periodic) {
        // Walls, or the periodic duplicate of row 0
        if !periodic {
            hv_row.fill(0.0);
        }
        return;
    }

    let js = if j == 0 { ny - 1 } else { j - 1 };
    let jn = j;

    for i in 0..p.nx {
        let h_m = h_v_row[i];
        let u_m = 0.25 * (hu.get(i, js) + hu.get(i + 1, js) + hu.get(i, jn) + hu.get(i + 1, jn));
        let deta_dy = (eta.get(i, jn) - eta.get(i, js)) / p.dy;

        let b = 1.0 + p.r * dt / h_m;
        let p_term = -p.f * u_m - p.g * h_m * deta_dy + p.wind_y;
        hv_row[i] = (hv_row[i] + dt * p_term) / b;
    }
}

/// Copy row 0 of `hv` onto row `ny` when y is periodic.
pub(crate) fn wrap_hv(p: &FblParams, hv: &mut Field2D) {
    if p.boundaries.y == Boundary::Periodic {
        let south: Vec<f32> = hv.row(0).to_vec();
        hv.row_mut(p.ny).copy_from_slice(&south);
    }
}

/// Update one row of `eta` from the divergence of the new momenta.
pub(crate) fn update_eta_row(
    p: &FblParams,
    dt: f32,
    j: usize,
    eta_row: &mut [f32],
    hu: &Field2D,
    hv: &Field2D,
) {
    for (i, eta) in eta_row.iter_mut().enumerate() {
        let dhu_dx = (hu.get(i + 1, j) - hu.get(i, j)) / p.dx;
        let dhv_dy = (hv.get(i, j + 1) - hv.get(i, j)) / p.dy;
        *eta -= dt * (dhu_dx + dhv_dy);
    }
}
