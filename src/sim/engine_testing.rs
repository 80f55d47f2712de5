//! Scenario-based testing for simulator engines.
//!
//! A [`SimulationScenario`] describes a complete run (options and initial
//! conditions) plus the physical checks its outcome must pass. The runner is
//! generic over [`SimulatorImpl`], and the `test_all_engines!` /
//! `test_cross_engine!` macros stamp out one test per engine, so every
//! engine is held to the same scenarios and compared against the
//! single-threaded reference.

use std::sync::Arc;

use crate::arrays::{Dimensions, Field2D};
use crate::sim::{
    BoundaryConditions, EndCondition, InitialConditions, ProgramOptions, Simulator,
    SimulatorImpl, StepPlan, WindStress,
};
use crate::{Error, Result};

/// A complete simulation test scenario with physics verification.
pub trait SimulationScenario {
    /// Scenario name for test identification.
    fn name(&self) -> &str;

    /// Build the complete simulation setup.
    fn build(&self) -> SimulationSetup;

    /// Verify physical correctness after the run completes.
    fn verify(&self, result: &SimulationResult) -> Result<()>;
}

/// Inputs for one scenario run.
pub struct SimulationSetup {
    pub options: ProgramOptions,
    pub init_cond: InitialConditions,
}

/// Outcome of running a scenario to its final step.
pub struct SimulationResult {
    pub options: Arc<ProgramOptions>,
    pub init_cond: Arc<InitialConditions>,
    /// Total surface elevation after each step (index 0 = initial state)
    pub mass_history: Vec<f64>,
    /// Steps executed
    pub steps: u64,
    /// Simulated time at the end of the run
    pub final_time: f64,
    /// `eta | hu | hv` after the final step
    pub final_results: Vec<f32>,
}

impl SimulationResult {
    fn split(&self) -> (Field2D, Field2D, Field2D) {
        let (nx, ny) = self.options.dimensions();
        let n_eta = nx * ny;
        let n_hu = (nx + 1) * ny;
        let data = &self.final_results;

        let field = |dims: Dimensions, range: std::ops::Range<usize>| {
            Field2D::from_vec(dims, data[range].to_vec())
                .expect("results length matches grid dimensions")
        };
        (
            field(Dimensions::new(nx, ny), 0..n_eta),
            field(Dimensions::new(nx + 1, ny), n_eta..n_eta + n_hu),
            field(Dimensions::new(nx, ny + 1), n_eta + n_hu..data.len()),
        )
    }

    pub fn eta(&self) -> Field2D {
        self.split().0
    }

    pub fn hu(&self) -> Field2D {
        self.split().1
    }

    pub fn hv(&self) -> Field2D {
        self.split().2
    }

    fn assert_finite(&self) -> Result<()> {
        if let Some(idx) = self.final_results.iter().position(|v| !v.is_finite()) {
            return Err(Error::Numerical(format!(
                "non-finite value at results index {}",
                idx
            )));
        }
        Ok(())
    }

    fn assert_mass_conserved(&self, rel_tol: f64, abs_tol: f64) -> Result<()> {
        let initial = self.mass_history[0];
        for (step, &mass) in self.mass_history.iter().enumerate() {
            let tol = abs_tol + rel_tol * initial.abs();
            if (mass - initial).abs() > tol {
                return Err(Error::Numerical(format!(
                    "mass drifted at step {}: initial={:.6e}, now={:.6e}",
                    step, initial, mass
                )));
            }
        }
        Ok(())
    }
}

/// Run a scenario with a specific engine and verify it.
pub fn test_scenario_with_engine_impl<E: SimulatorImpl + Default>(
    scenario: &dyn SimulationScenario,
) -> Result<()> {
    let result = run_scenario_with_engine::<E>(scenario)?;
    scenario.verify(&result)
}

/// Run a scenario with a specific engine and return the result.
pub fn run_scenario_with_engine<E: SimulatorImpl + Default>(
    scenario: &dyn SimulationScenario,
) -> Result<SimulationResult> {
    let setup = scenario.build();
    let options = Arc::new(setup.options);
    let init_cond = Arc::new(setup.init_cond);
    let plan = StepPlan::from_options(&options)?;

    let mut sim = Simulator::new(E::default(), Arc::clone(&options), Arc::clone(&init_cond));
    sim.init()?;

    let (nx, ny) = options.dimensions();
    let mass = |results: &[f32]| results[..nx * ny].iter().map(|&v| v as f64).sum::<f64>();

    let mut mass_history = vec![mass(sim.results().as_slice())];
    while sim.next_step() <= sim.final_step() {
        sim.exec_next_step();
        mass_history.push(mass(sim.results().as_slice()));
    }

    Ok(SimulationResult {
        steps: sim.next_step(),
        final_time: plan.time_after(sim.next_step()),
        final_results: sim.results(),
        mass_history,
        options,
        init_cond,
    })
}

// =============================================================================
// CROSS-ENGINE COMPARISON TESTING
// =============================================================================

/// Tolerances for comparing floating-point arrays.
///
/// Uses the allclose formula `|a - b| <= atol + rtol * max(|a|, |b|)`.
#[derive(Debug, Clone)]
pub struct ComparisonConfig {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            rtol: 1e-5,
            atol: 1e-8,
        }
    }
}

impl ComparisonConfig {
    #[inline]
    pub fn is_close(&self, a: f64, b: f64) -> bool {
        let diff = (a - b).abs();
        diff <= self.atol + self.rtol * a.abs().max(b.abs())
    }
}

/// Summary of an element-wise comparison.
#[derive(Debug, Default)]
pub struct FieldComparisonStats {
    pub max_abs_diff: f64,
    pub num_mismatches: usize,
    pub total_values: usize,
}

impl FieldComparisonStats {
    pub fn compute(reference: &[f32], test: &[f32], config: &ComparisonConfig) -> Self {
        assert_eq!(reference.len(), test.len(), "Field lengths must match");

        let mut stats = FieldComparisonStats {
            total_values: reference.len(),
            ..Default::default()
        };
        for (i, (&r, &t)) in reference.iter().zip(test).enumerate() {
            let (r, t) = (r as f64, t as f64);
            stats.max_abs_diff = stats.max_abs_diff.max((r - t).abs());
            if !config.is_close(r, t) {
                stats.num_mismatches += 1;
                if stats.num_mismatches <= 10 {
                    eprintln!("  Mismatch at index {}: ref={:.6e}, test={:.6e}", i, r, t);
                }
            }
        }
        stats
    }

    pub fn passed(&self) -> bool {
        self.num_mismatches == 0
    }
}

/// Check that two engines produce matching results for a scenario.
pub fn test_cross_engine_comparison<Reference, Test>(
    scenario: &dyn SimulationScenario,
    config: &ComparisonConfig,
) -> Result<()>
where
    Reference: SimulatorImpl + Default,
    Test: SimulatorImpl + Default,
{
    eprintln!("\n=== Cross-engine comparison: {} ===", scenario.name());
    let reference = run_scenario_with_engine::<Reference>(scenario)?;
    let test = run_scenario_with_engine::<Test>(scenario)?;

    if reference.steps != test.steps {
        return Err(Error::Numerical(format!(
            "step count differs: reference={}, test={}",
            reference.steps, test.steps
        )));
    }

    let stats =
        FieldComparisonStats::compute(&reference.final_results, &test.final_results, config);
    if !stats.passed() {
        return Err(Error::Numerical(format!(
            "{}: {} of {} values differ (max abs diff {:.3e})",
            scenario.name(),
            stats.num_mismatches,
            stats.total_values,
            stats.max_abs_diff
        )));
    }
    Ok(())
}

// =============================================================================
// TEST SCENARIOS
// =============================================================================

fn base_options(nx: usize, ny: usize, steps: u64) -> ProgramOptions {
    let mut opts = ProgramOptions::new(nx, ny, 20_000.0, 20_000.0, 90.0);
    opts.set_steps(steps);
    opts
}

/// Lake at rest must stay exactly at rest.
pub struct LakeAtRestScenario;

impl SimulationScenario for LakeAtRestScenario {
    fn name(&self) -> &str {
        "lake_at_rest"
    }

    fn build(&self) -> SimulationSetup {
        SimulationSetup {
            options: base_options(20, 16, 100),
            init_cond: InitialConditions::flat(20, 16, 60.0),
        }
    }

    fn verify(&self, result: &SimulationResult) -> Result<()> {
        assert_eq!(result.steps, 100);
        assert!(
            result.final_results.iter().all(|&v| v == 0.0),
            "lake at rest developed motion"
        );
        Ok(())
    }
}

/// Gaussian bump in a closed basin: spreads outwards, conserves mass.
pub struct ClosedBasinBumpScenario;

impl SimulationScenario for ClosedBasinBumpScenario {
    fn name(&self) -> &str {
        "closed_basin_bump"
    }

    fn build(&self) -> SimulationSetup {
        SimulationSetup {
            options: base_options(32, 32, 60),
            init_cond: InitialConditions::gaussian_bump(32, 32, 60.0, 1.0, 3.0),
        }
    }

    fn verify(&self, result: &SimulationResult) -> Result<()> {
        result.assert_finite()?;
        result.assert_mass_conserved(1e-4, 1e-3)?;

        let eta = result.eta();
        let peak_before = result.init_cond.eta().get(16, 16);
        assert!(
            eta.get(16, 16) < 0.5 * peak_before,
            "bump did not collapse: {} -> {}",
            peak_before,
            eta.get(16, 16)
        );

        let hu = result.hu();
        for j in 0..32 {
            assert_eq!(hu.get(0, j), 0.0, "flux through west wall");
            assert_eq!(hu.get(32, j), 0.0, "flux through east wall");
        }
        Ok(())
    }
}

/// Gaussian bump on a doubly periodic domain.
pub struct PeriodicBumpScenario;

impl SimulationScenario for PeriodicBumpScenario {
    fn name(&self) -> &str {
        "periodic_bump"
    }

    fn build(&self) -> SimulationSetup {
        let mut options = base_options(24, 20, 120);
        options.set_boundary_conditions(BoundaryConditions::periodic());
        SimulationSetup {
            options,
            init_cond: InitialConditions::gaussian_bump(24, 20, 60.0, 1.0, 2.5),
        }
    }

    fn verify(&self, result: &SimulationResult) -> Result<()> {
        result.assert_finite()?;
        result.assert_mass_conserved(1e-4, 1e-3)?;

        let hu = result.hu();
        let hv = result.hv();
        for j in 0..20 {
            assert_eq!(hu.get(0, j), hu.get(24, j), "periodic x faces differ");
        }
        for i in 0..24 {
            assert_eq!(hv.get(i, 0), hv.get(i, 20), "periodic y faces differ");
        }
        Ok(())
    }
}

/// Steady wind over a closed basin piles water up on the downwind side.
pub struct WindSetupScenario;

impl SimulationScenario for WindSetupScenario {
    fn name(&self) -> &str {
        "wind_setup"
    }

    fn build(&self) -> SimulationSetup {
        let mut options = base_options(24, 12, 200);
        options.set_coriolis(0.0).set_wind_stress(WindStress::Uniform {
            tau0: 0.1,
            rho: 1025.0,
            alpha: 0.0,
        });
        SimulationSetup {
            options,
            init_cond: InitialConditions::flat(24, 12, 60.0),
        }
    }

    fn verify(&self, result: &SimulationResult) -> Result<()> {
        result.assert_finite()?;
        result.assert_mass_conserved(0.0, 1e-3)?;

        let eta = result.eta();
        let west = eta.get(0, 6);
        let east = eta.get(23, 6);
        assert!(
            east > 0.0 && west < 0.0,
            "no wind setup: west={:.3e}, east={:.3e}",
            west,
            east
        );
        Ok(())
    }
}

/// Strong rotation: geostrophic adjustment must stay stable.
pub struct RotatingBumpScenario;

impl SimulationScenario for RotatingBumpScenario {
    fn name(&self) -> &str {
        "rotating_bump"
    }

    fn build(&self) -> SimulationSetup {
        let mut options = base_options(24, 24, 150);
        options.set_coriolis(1e-3);
        SimulationSetup {
            options,
            init_cond: InitialConditions::gaussian_bump(24, 24, 60.0, 1.0, 3.0),
        }
    }

    fn verify(&self, result: &SimulationResult) -> Result<()> {
        result.assert_finite()?;
        result.assert_mass_conserved(1e-4, 1e-3)?;
        assert!(
            result.eta().max_abs() < 2.0,
            "surface grew beyond the initial amplitude"
        );
        Ok(())
    }
}

/// A duration that is not a multiple of dt ends exactly on time.
pub struct FractionalDurationScenario;

impl SimulationScenario for FractionalDurationScenario {
    fn name(&self) -> &str {
        "fractional_duration"
    }

    fn build(&self) -> SimulationSetup {
        let mut options = base_options(12, 12, 1);
        options.set_end_condition(EndCondition::Duration(1000.0));
        SimulationSetup {
            options,
            init_cond: InitialConditions::gaussian_bump(12, 12, 60.0, 0.5, 2.0),
        }
    }

    fn verify(&self, result: &SimulationResult) -> Result<()> {
        // ceil(1000 / 90) = 12 steps, the last one 10 s long
        assert_eq!(result.steps, 12);
        assert_eq!(result.final_time, 1000.0);
        assert_eq!(result.mass_history.len(), 13);
        result.assert_finite()
    }
}

// =============================================================================
// MACROS TO GENERATE TESTS FOR ALL ENGINES
// =============================================================================

/// Generate one test per engine for a scenario.
///
/// `test_all_engines!(LakeAtRestScenario, test_lake_at_rest)` expands to
/// `test_lake_at_rest_basic()` and `test_lake_at_rest_parallel()`.
#[macro_export]
macro_rules! test_all_engines {
    ($scenario:expr, $test_name_base:ident) => {
        paste::paste! {
            #[test]
            fn [<$test_name_base _basic>]() {
                let scenario = $scenario;
                $crate::sim::engine_testing::test_scenario_with_engine_impl::<$crate::sim::FblBasicEngine>(&scenario).unwrap();
            }

            #[test]
            fn [<$test_name_base _parallel>]() {
                let scenario = $scenario;
                $crate::sim::engine_testing::test_scenario_with_engine_impl::<$crate::sim::FblParallelEngine>(&scenario).unwrap();
            }
        }
    };
}

/// Generate a comparison test of each optimized engine against the basic one.
#[macro_export]
macro_rules! test_cross_engine {
    ($scenario:expr, $test_name_base:ident) => {
        paste::paste! {
            #[test]
            fn [<$test_name_base _parallel_vs_basic>]() {
                let scenario = $scenario;
                let config = $crate::sim::engine_testing::ComparisonConfig::default();
                $crate::sim::engine_testing::test_cross_engine_comparison::<
                    $crate::sim::FblBasicEngine,
                    $crate::sim::FblParallelEngine
                >(&scenario, &config).unwrap();
            }
        }
    };
}

#[cfg(test)]
mod tests {
    test_all_engines!(super::LakeAtRestScenario, test_lake_at_rest);
    test_all_engines!(super::ClosedBasinBumpScenario, test_closed_basin_bump);
    test_all_engines!(super::PeriodicBumpScenario, test_periodic_bump);
    test_all_engines!(super::WindSetupScenario, test_wind_setup);
    test_all_engines!(super::RotatingBumpScenario, test_rotating_bump);
    test_all_engines!(super::FractionalDurationScenario, test_fractional_duration);

    test_cross_engine!(super::ClosedBasinBumpScenario, compare_closed_basin_bump);
    test_cross_engine!(super::PeriodicBumpScenario, compare_periodic_bump);
    test_cross_engine!(super::WindSetupScenario, compare_wind_setup);
    test_cross_engine!(super::RotatingBumpScenario, compare_rotating_bump);

    #[test]
    fn test_comparison_config_is_close() {
        let config = super::ComparisonConfig::default();
        assert!(config.is_close(1.0, 1.0 + 1e-7));
        assert!(!config.is_close(1.0, 1.001));
        assert!(config.is_close(0.0, 1e-9));
    }
}
