//! Starting state of a shallow-water simulation.
//!
//! Quantities live on a staggered Arakawa C grid without ghost cells:
//!
//! | field | location     | shape            |
//! |-------|--------------|------------------|
//! | `h`   | cell centres | `nx` x `ny`      |
//! | `eta` | cell centres | `nx` x `ny`      |
//! | `hu`  | x-faces      | `(nx+1)` x `ny`  |
//! | `hv`  | y-faces      | `nx` x `(ny+1)`  |

use crate::arrays::{Dimensions, Field2D};
use crate::{Error, Result};

/// Water depth, surface deviation and momenta at time zero.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialConditions {
    h: Field2D,
    eta: Field2D,
    hu: Field2D,
    hv: Field2D,
}

impl InitialConditions {
    /// Assemble initial conditions from individual fields.
    ///
    /// Shapes are checked against `eta`, which defines the cell count.
    pub fn new(h: Field2D, eta: Field2D, hu: Field2D, hv: Field2D) -> Result<Self> {
        let (nx, ny) = eta.dims().as_tuple();
        if nx == 0 || ny == 0 {
            return Err(Error::InitialConditions("eta must not be empty".into()));
        }

        check_shape("h", &h, (nx, ny))?;
        check_shape("hu", &hu, (nx + 1, ny))?;
        check_shape("hv", &hv, (nx, ny + 1))?;

        for (name, field) in [("h", &h), ("eta", &eta), ("hu", &hu), ("hv", &hv)] {
            if field.has_non_finite() {
                return Err(Error::InitialConditions(format!(
                    "{} contains NaN or infinite values",
                    name
                )));
            }
        }

        Ok(Self { h, eta, hu, hv })
    }

    /// Lake at rest: constant depth, flat surface, no flow.
    pub fn flat(nx: usize, ny: usize, depth: f32) -> Self {
        Self::at_rest(nx, ny, depth, Field2D::new(Dimensions::new(nx, ny)))
    }

    /// Lake at rest with a Gaussian hump in the surface centred on the domain.
    ///
    /// `sigma_cells` is the standard deviation measured in cells.
    pub fn gaussian_bump(nx: usize, ny: usize, depth: f32, amplitude: f32, sigma_cells: f32) -> Self {
        let cx = nx as f32 / 2.0;
        let cy = ny as f32 / 2.0;
        let two_sigma_sq = 2.0 * sigma_cells * sigma_cells;
        let eta = Field2D::from_fn(Dimensions::new(nx, ny), |i, j| {
            let x = i as f32 + 0.5 - cx;
            let y = j as f32 + 0.5 - cy;
            amplitude * (-(x * x + y * y) / two_sigma_sq).exp()
        });
        Self::at_rest(nx, ny, depth, eta)
    }

    fn at_rest(nx: usize, ny: usize, depth: f32, eta: Field2D) -> Self {
        Self {
            h: Field2D::filled(Dimensions::new(nx, ny), depth),
            eta,
            hu: Field2D::new(Dimensions::new(nx + 1, ny)),
            hv: Field2D::new(Dimensions::new(nx, ny + 1)),
        }
    }

    /// Cell counts `(nx, ny)`.
    pub fn dimensions(&self) -> (usize, usize) {
        self.eta.dims().as_tuple()
    }

    /// Water depth at cell centres.
    pub fn h(&self) -> &Field2D {
        &self.h
    }

    /// Surface deviation from mean sea level at cell centres.
    pub fn eta(&self) -> &Field2D {
        &self.eta
    }

    /// Momentum along x on x-faces.
    pub fn hu(&self) -> &Field2D {
        &self.hu
    }

    /// Momentum along y on y-faces.
    pub fn hv(&self) -> &Field2D {
        &self.hv
    }
}

fn check_shape(field: &'static str, value: &Field2D, expected: (usize, usize)) -> Result<()> {
    let actual = value.dims().as_tuple();
    if actual != expected {
        return Err(Error::ShapeMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}
