//! Nelder-Mead downhill simplex minimiser.
//!
//! Derivative-free minimisation of a scalar objective over `R^n`. Useful when
//! the objective is not a sum of squares (absolute-error fits) or is too noisy
//! for finite-difference Jacobians.
//!
//! The simplex is built from the start point plus one vertex per coordinate,
//! offset by `initial_step · max(|x_i|, 1)`. Each iteration reflects the worst
//! vertex through the centroid of the others, then expands, contracts or
//! shrinks the simplex. Non-finite objective values are treated as `+∞`.
//!
//! # Example
//!
//! ```
//! use pricer_core::math::solvers::{NelderMeadConfig, NelderMeadSolver};
//!
//! let solver = NelderMeadSolver::new(NelderMeadConfig::default());
//! let f = |x: &[f64]| (x[0] - 1.0).powi(2) + (x[1] + 2.0).powi(2);
//! let result = solver.minimize(f, vec![0.0, 0.0]).unwrap();
//! assert!(result.converged);
//! assert!((result.params[0] - 1.0).abs() < 1e-4);
//! assert!((result.params[1] + 2.0).abs() < 1e-4);
//! ```

use crate::types::SolverError;

/// Configuration for the Nelder-Mead simplex optimizer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Convergence threshold on simplex diameter.
    pub diameter_tolerance: f64,
    /// Convergence threshold on objective value spread.
    pub fvalue_tolerance: f64,
    /// Relative offset of the initial simplex vertices.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            diameter_tolerance: 1e-8,
            fvalue_tolerance: 1e-12,
            initial_step: 0.1,
        }
    }
}

impl NelderMeadConfig {
    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the initial simplex offset.
    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    /// Set the diameter and spread tolerances.
    pub fn with_tolerances(mut self, diameter: f64, fvalue: f64) -> Self {
        self.diameter_tolerance = diameter;
        self.fvalue_tolerance = fvalue;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidConfig(
                "max_iterations must be > 0".to_string(),
            ));
        }
        if !(self.initial_step > 0.0 && self.initial_step.is_finite()) {
            return Err(SolverError::InvalidConfig(format!(
                "initial_step must be positive, got {}",
                self.initial_step
            )));
        }
        Ok(())
    }
}

/// Result of a Nelder-Mead minimisation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NelderMeadResult {
    /// Best vertex.
    pub params: Vec<f64>,
    /// Objective value at the best vertex.
    pub fval: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Objective evaluations.
    pub evaluations: usize,
    /// Whether a tolerance was met before the iteration cap.
    pub converged: bool,
}

/// Nelder-Mead simplex minimiser over `R^n`.
#[derive(Debug, Clone, Default)]
pub struct NelderMeadSolver {
    config: NelderMeadConfig,
}

impl NelderMeadSolver {
    /// Create a solver with the given configuration.
    pub fn new(config: NelderMeadConfig) -> Self {
        Self { config }
    }

    /// Get the solver configuration.
    pub fn config(&self) -> &NelderMeadConfig {
        &self.config
    }

    /// Minimise `objective` starting from `initial_params`.
    ///
    /// # Errors
    ///
    /// * `SolverError::InvalidConfig` - invalid configuration
    /// * `SolverError::NumericalInstability` - empty parameter vector
    /// * `SolverError::NonFinite` - objective is not finite at the start point
    pub fn minimize<F>(&self, objective: F, initial_params: Vec<f64>) -> Result<NelderMeadResult, SolverError>
    where
        F: Fn(&[f64]) -> f64,
    {
        self.config.validate()?;
        let n = initial_params.len();
        if n == 0 {
            return Err(SolverError::NumericalInstability(
                "Empty parameter vector".to_string(),
            ));
        }

        let mut evaluations = 0;
        let mut eval = |x: &[f64]| -> f64 {
            evaluations += 1;
            let v = objective(x);
            if v.is_finite() {
                v
            } else {
                f64::INFINITY
            }
        };

        let f0 = eval(&initial_params);
        if !f0.is_finite() {
            return Err(SolverError::NonFinite {
                x: initial_params[0],
                evaluations: 1,
            });
        }

        let mut simplex = Vec::with_capacity(n + 1);
        let mut f_vals = Vec::with_capacity(n + 1);
        simplex.push(initial_params.clone());
        f_vals.push(f0);
        for i in 0..n {
            let mut vertex = initial_params.clone();
            vertex[i] += self.config.initial_step * vertex[i].abs().max(1.0);
            f_vals.push(eval(&vertex));
            simplex.push(vertex);
        }

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_iterations {
            order(&mut simplex, &mut f_vals);

            let f_spread = f_vals[n] - f_vals[0];
            if diameter(&simplex) < self.config.diameter_tolerance
                || f_spread <= self.config.fvalue_tolerance * f_vals[0].abs().max(1.0)
            {
                converged = true;
                break;
            }
            iterations += 1;

            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|v| v[j]).sum::<f64>() / n as f64)
                .collect();
            let along = |t: f64, worst: &[f64]| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(worst)
                    .map(|(c, w)| c + t * (w - c))
                    .collect()
            };

            // Reflection
            let reflected = along(-1.0, &simplex[n]);
            let fr = eval(&reflected);

            if fr < f_vals[0] {
                // Expansion
                let expanded = along(-2.0, &simplex[n]);
                let fe = eval(&expanded);
                if fe < fr {
                    simplex[n] = expanded;
                    f_vals[n] = fe;
                } else {
                    simplex[n] = reflected;
                    f_vals[n] = fr;
                }
            } else if fr < f_vals[n - 1] {
                simplex[n] = reflected;
                f_vals[n] = fr;
            } else {
                // Contraction, outside if the reflection improved on the worst
                let (contracted, bound) = if fr < f_vals[n] {
                    (along(-0.5, &simplex[n]), fr)
                } else {
                    (along(0.5, &simplex[n]), f_vals[n])
                };
                let fc = eval(&contracted);
                if fc < bound {
                    simplex[n] = contracted;
                    f_vals[n] = fc;
                } else {
                    // Shrink toward best vertex
                    let best = simplex[0].clone();
                    for k in 1..=n {
                        for (x, b) in simplex[k].iter_mut().zip(&best) {
                            *x = b + 0.5 * (*x - b);
                        }
                        f_vals[k] = eval(&simplex[k]);
                    }
                }
            }
        }

        order(&mut simplex, &mut f_vals);
        Ok(NelderMeadResult {
            params: simplex.swap_remove(0),
            fval: f_vals[0],
            iterations,
            evaluations,
            converged,
        })
    }
}

/// Sort vertices by objective value, best first.
fn order(simplex: &mut Vec<Vec<f64>>, f_vals: &mut Vec<f64>) {
    let mut idx: Vec<usize> = (0..f_vals.len()).collect();
    idx.sort_by(|&a, &b| f_vals[a].total_cmp(&f_vals[b]));
    *simplex = idx.iter().map(|&i| simplex[i].clone()).collect();
    *f_vals = idx.iter().map(|&i| f_vals[i]).collect();
}

/// Largest distance from the best vertex.
fn diameter(simplex: &[Vec<f64>]) -> f64 {
    let best = &simplex[0];
    simplex[1..]
        .iter()
        .map(|v| {
            v.iter()
                .zip(best)
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .fold(0.0_f64, f64::max)
}
