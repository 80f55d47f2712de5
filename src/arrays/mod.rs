//! Dense 2D field storage.
//!
//! Every grid quantity (water depth, surface elevation, momenta) is a
//! [`Field2D`]: a row-major `f32` array where `i` runs along x and `j`
//! along y, so a row is one contiguous slice of `nx` values.

use crate::{Error, Result};

/// Size of a 2D field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// Number of values along x
    pub nx: usize,
    /// Number of values along y
    pub ny: usize,
}

impl Dimensions {
    /// Create new dimensions.
    pub const fn new(nx: usize, ny: usize) -> Self {
        Self { nx, ny }
    }

    /// Total number of values.
    #[inline]
    pub const fn total(&self) -> usize {
        self.nx * self.ny
    }

    /// Convert (i, j) to a linear row-major index.
    #[inline]
    pub const fn to_linear(&self, i: usize, j: usize) -> usize {
        j * self.nx + i
    }

    /// Dimensions as an `(nx, ny)` tuple.
    #[inline]
    pub const fn as_tuple(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }
}

/// Row-major 2D array of `f32` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Field2D {
    dims: Dimensions,
    data: Vec<f32>,
}

impl Field2D {
    /// Create a zero-filled field.
    pub fn new(dims: Dimensions) -> Self {
        Self {
            dims,
            data: vec![0.0; dims.total()],
        }
    }

    /// Create a field filled with a constant.
    pub fn filled(dims: Dimensions, value: f32) -> Self {
        Self {
            dims,
            data: vec![value; dims.total()],
        }
    }

    /// Wrap existing row-major data.
    ///
    /// Fails if `data.len()` does not match `dims`.
    pub fn from_vec(dims: Dimensions, data: Vec<f32>) -> Result<Self> {
        if data.len() != dims.total() {
            return Err(Error::Config(format!(
                "expected {} values for a {}x{} field, got {}",
                dims.total(),
                dims.nx,
                dims.ny,
                data.len()
            )));
        }
        Ok(Self { dims, data })
    }

    /// Build a field by evaluating `f(i, j)` at every point.
    pub fn from_fn(dims: Dimensions, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(dims.total());
        for j in 0..dims.ny {
            for i in 0..dims.nx {
                data.push(f(i, j));
            }
        }
        Self { dims, data }
    }

    /// Field dimensions.
    #[inline]
    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[self.dims.to_linear(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f32) {
        let idx = self.dims.to_linear(i, j);
        self.data[idx] = value;
    }

    #[inline]
    pub fn add(&mut self, i: usize, j: usize, value: f32) {
        let idx = self.dims.to_linear(i, j);
        self.data[idx] += value;
    }

    /// Set every value to `value`.
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Reset all values to zero.
    pub fn clear(&mut self) {
        self.fill(0.0);
    }

    /// One row (fixed `j`) as a slice.
    #[inline]
    pub fn row(&self, j: usize) -> &[f32] {
        let start = j * self.dims.nx;
        &self.data[start..start + self.dims.nx]
    }

    /// One row (fixed `j`) as a mutable slice.
    #[inline]
    pub fn row_mut(&mut self, j: usize) -> &mut [f32] {
        let start = j * self.dims.nx;
        &mut self.data[start..start + self.dims.nx]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Sum of all values, accumulated in f64.
    pub fn sum(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }

    /// Sum of squares, accumulated in f64.
    pub fn energy(&self) -> f64 {
        self.data.iter().map(|&v| (v as f64) * (v as f64)).sum()
    }

    /// Largest value, or `None` for an empty field.
    pub fn max(&self) -> Option<f32> {
        self.data.iter().copied().reduce(f32::max)
    }

    /// Smallest value, or `None` for an empty field.
    pub fn min(&self) -> Option<f32> {
        self.data.iter().copied().reduce(f32::min)
    }

    /// Largest absolute value (0 for an empty field).
    pub fn max_abs(&self) -> f32 {
        self.data.iter().fold(0.0f32, |acc, &v| acc.max(v.abs()))
    }

    /// True if any value is NaN or infinite.
    pub fn has_non_finite(&self) -> bool {
        self.data.iter().any(|v| !v.is_finite())
    }
}
