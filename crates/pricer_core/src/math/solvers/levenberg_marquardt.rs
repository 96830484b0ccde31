//! Levenberg-Marquardt nonlinear least-squares solver.
//!
//! This module provides the [`LevenbergMarquardtSolver`] for solving nonlinear
//! least-squares problems such as fitting model parameters to market prices.
//!
//! # Algorithm
//!
//! The Levenberg-Marquardt algorithm interpolates between Gauss-Newton and
//! gradient descent:
//!
//! ```text
//! (J^T J + λI) δ = -J^T r
//! p_{n+1} = p_n + δ
//! ```
//!
//! where:
//! - `J` is the forward-difference Jacobian of the residuals
//! - `r` is the residual vector
//! - `λ` is the damping factor, shrunk on accepted steps and grown on rejected ones
//! - `δ` is the parameter update step
//!
//! Residual functions may return non-finite values for parameters they cannot
//! evaluate; such trial steps are rejected like any other uphill step.
//!
//! # Example
//!
//! ```
//! use pricer_core::math::solvers::{LevenbergMarquardtSolver, LMConfig};
//!
//! // Fit y = a * exp(-b * x)
//! let x_data = [0.0, 1.0, 2.0, 3.0, 4.0];
//! let y_data: Vec<f64> = x_data.iter().map(|x: &f64| 2.0 * (-0.5 * x).exp()).collect();
//!
//! let solver = LevenbergMarquardtSolver::new(LMConfig::default());
//! let residuals = |p: &[f64]| -> Vec<f64> {
//!     x_data.iter().zip(&y_data).map(|(&x, &y)| p[0] * (-p[1] * x).exp() - y).collect()
//! };
//!
//! let result = solver.solve(residuals, vec![1.0, 1.0]).unwrap();
//! assert!(result.converged);
//! assert!((result.params[0] - 2.0).abs() < 1e-6);
//! assert!((result.params[1] - 0.5).abs() < 1e-6);
//! ```

use crate::types::SolverError;

/// Configuration for Levenberg-Marquardt solver.
///
/// # Fields
///
/// * `tolerance` - Absolute tolerance on the residual norm
/// * `max_iterations` - Maximum number of iterations (Jacobian evaluations)
/// * `initial_lambda` - Initial damping factor
/// * `lambda_up` - Factor to increase lambda when step is rejected
/// * `lambda_down` - Factor to decrease lambda when step is accepted
/// * `min_lambda` / `max_lambda` - Damping bounds
/// * `param_tolerance` - Relative step size below which the search stops
/// * `fd_step` - Relative forward-difference step for the Jacobian
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LMConfig {
    /// Tolerance on the residual norm.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Initial damping factor.
    pub initial_lambda: f64,
    /// Factor to increase lambda on rejected step.
    pub lambda_up: f64,
    /// Factor to decrease lambda on accepted step.
    pub lambda_down: f64,
    /// Minimum damping factor.
    pub min_lambda: f64,
    /// Maximum damping factor.
    pub max_lambda: f64,
    /// Tolerance for parameter change convergence.
    pub param_tolerance: f64,
    /// Relative finite-difference step.
    pub fd_step: f64,
}

impl Default for LMConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            min_lambda: 1e-10,
            max_lambda: 1e10,
            param_tolerance: 1e-10,
            fd_step: 1e-7,
        }
    }
}

impl LMConfig {
    /// Create a new LM configuration.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
            ..Default::default()
        }
    }

    /// Create a fast configuration with relaxed tolerances.
    pub fn fast() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 50,
            param_tolerance: 1e-8,
            ..Default::default()
        }
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the residual-norm tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the step-size tolerance.
    pub fn with_param_tolerance(mut self, tolerance: f64) -> Self {
        self.param_tolerance = tolerance;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidConfig(
                "max_iterations must be > 0".to_string(),
            ));
        }
        if !(self.lambda_up > 1.0 && self.lambda_down > 0.0 && self.lambda_down < 1.0) {
            return Err(SolverError::InvalidConfig(format!(
                "lambda factors must satisfy up > 1 and 0 < down < 1, got {} and {}",
                self.lambda_up, self.lambda_down
            )));
        }
        if !(self.fd_step > 0.0 && self.initial_lambda > 0.0) {
            return Err(SolverError::InvalidConfig(
                "fd_step and initial_lambda must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of Levenberg-Marquardt optimization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LMResult {
    /// Final optimized parameters.
    pub params: Vec<f64>,
    /// Final residual sum of squares.
    pub residual_ss: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Residual function evaluations.
    pub evaluations: usize,
    /// Whether convergence was achieved.
    pub converged: bool,
    /// Final lambda value.
    pub final_lambda: f64,
}

impl LMResult {
    /// Get the root mean square error.
    pub fn rmse(&self, n_observations: usize) -> f64 {
        if n_observations == 0 {
            return 0.0;
        }
        (self.residual_ss / n_observations as f64).sqrt()
    }
}

/// Levenberg-Marquardt nonlinear least-squares solver.
///
/// Solves `min_p ||f(p)||^2` where `f(p)` is a vector of residuals.
#[derive(Debug, Clone)]
pub struct LevenbergMarquardtSolver {
    config: LMConfig,
}

impl LevenbergMarquardtSolver {
    /// Create a new LM solver with the given configuration.
    pub fn new(config: LMConfig) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LMConfig::default())
    }

    /// Get the solver configuration.
    pub fn config(&self) -> &LMConfig {
        &self.config
    }

    /// Solve the nonlinear least-squares problem.
    ///
    /// Hitting the iteration cap is not an error: the best parameters found
    /// are returned with `converged = false`. The same holds when a step is
    /// rejected at `max_lambda`.
    ///
    /// # Errors
    ///
    /// * `SolverError::InvalidConfig` - invalid configuration
    /// * `SolverError::NumericalInstability` - empty parameter or residual vector
    /// * `SolverError::NonFinite` - residuals at the initial point are not finite
    pub fn solve<F>(&self, residuals: F, initial_params: Vec<f64>) -> Result<LMResult, SolverError>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        self.config.validate()?;
        let n_params = initial_params.len();
        if n_params == 0 {
            return Err(SolverError::NumericalInstability(
                "Empty parameter vector".to_string(),
            ));
        }

        let mut params = initial_params;
        let mut lambda = self.config.initial_lambda;
        let mut evaluations = 1;

        let mut r = residuals(&params);
        if r.is_empty() {
            return Err(SolverError::NumericalInstability(
                "Empty residual vector".to_string(),
            ));
        }
        let mut ss = sum_of_squares(&r);
        if !ss.is_finite() {
            return Err(SolverError::NonFinite {
                x: params[0],
                evaluations,
            });
        }

        let mut jacobian: Option<Vec<Vec<f64>>> = None;

        for iteration in 0..self.config.max_iterations {
            if ss.sqrt() < self.config.tolerance {
                return Ok(self.finish(params, ss, iteration, evaluations, true, lambda));
            }

            // Jacobian is only refreshed after an accepted step
            let jac = match jacobian.take() {
                Some(j) => j,
                None => {
                    evaluations += n_params;
                    compute_jacobian(&residuals, &params, &r, self.config.fd_step)
                }
            };

            let delta = match solve_normal_equations(&jac, &r, lambda) {
                Some(d) => d,
                None => {
                    lambda = (lambda * self.config.lambda_up).min(self.config.max_lambda);
                    jacobian = Some(jac);
                    continue;
                }
            };

            let step_norm = norm(&delta);
            let param_norm = norm(&params).max(1.0);
            if step_norm / param_norm < self.config.param_tolerance {
                return Ok(self.finish(params, ss, iteration, evaluations, true, lambda));
            }

            let trial: Vec<f64> = params.iter().zip(&delta).map(|(p, d)| p + d).collect();
            let trial_r = residuals(&trial);
            evaluations += 1;
            let trial_ss = sum_of_squares(&trial_r);

            if trial_ss.is_finite() && trial_ss < ss {
                params = trial;
                r = trial_r;
                ss = trial_ss;
                lambda = (lambda * self.config.lambda_down).max(self.config.min_lambda);
            } else {
                if lambda >= self.config.max_lambda {
                    // No descent direction left at maximum damping
                    return Ok(self.finish(params, ss, iteration + 1, evaluations, false, lambda));
                }
                lambda = (lambda * self.config.lambda_up).min(self.config.max_lambda);
                jacobian = Some(jac);
            }
        }

        Ok(self.finish(
            params,
            ss,
            self.config.max_iterations,
            evaluations,
            false,
            lambda,
        ))
    }

    fn finish(
        &self,
        params: Vec<f64>,
        residual_ss: f64,
        iterations: usize,
        evaluations: usize,
        converged: bool,
        final_lambda: f64,
    ) -> LMResult {
        LMResult {
            params,
            residual_ss,
            iterations,
            evaluations,
            converged,
            final_lambda,
        }
    }
}

/// Solve the normal equations (J^T J + λI) δ = -J^T r.
fn solve_normal_equations(jacobian: &[Vec<f64>], residuals: &[f64], lambda: f64) -> Option<Vec<f64>> {
    let n_params = jacobian.first().map_or(0, |row| row.len());

    let mut jtj = vec![vec![0.0; n_params]; n_params];
    let mut jtr = vec![0.0; n_params];
    for (row, &res) in jacobian.iter().zip(residuals) {
        for i in 0..n_params {
            jtr[i] -= row[i] * res;
            for j in 0..=i {
                jtj[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..n_params {
        for j in 0..i {
            jtj[j][i] = jtj[i][j];
        }
        jtj[i][i] += lambda;
    }

    solve_cholesky(&jtj, &jtr)
}

/// Compute the Jacobian by forward differences.
fn compute_jacobian<F>(residuals: &F, params: &[f64], r0: &[f64], fd_step: f64) -> Vec<Vec<f64>>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let mut jacobian = vec![vec![0.0; params.len()]; r0.len()];

    for j in 0..params.len() {
        let h = fd_step * params[j].abs().max(1.0);
        let mut bumped = params.to_vec();
        bumped[j] += h;
        let r_plus = residuals(&bumped);

        for (i, row) in jacobian.iter_mut().enumerate() {
            let diff = (r_plus[i] - r0[i]) / h;
            row[j] = if diff.is_finite() { diff } else { 0.0 };
        }
    }

    jacobian
}

#[inline]
fn sum_of_squares(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum()
}

#[inline]
fn norm(v: &[f64]) -> f64 {
    sum_of_squares(v).sqrt()
}

/// Solve Ax = b for symmetric positive definite A.
fn solve_cholesky(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum = a[i][j] - (0..j).map(|k| l[i][k] * l[j][k]).sum::<f64>();
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][i] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let sum = b[i] - (0..i).map(|j| l[i][j] * y[j]).sum::<f64>();
        y[i] = sum / l[i][i];
    }

    // L^T x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum = y[i] - ((i + 1)..n).map(|j| l[j][i] * x[j]).sum::<f64>();
        x[i] = sum / l[i][i];
    }

    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_config_default() {
        let config = LMConfig::default();
        assert!((config.tolerance - 1e-10).abs() < 1e-15);
        assert_eq!(config.max_iterations, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_invalid() {
        assert!(LMConfig::default().with_max_iterations(0).validate().is_err());
        let config = LMConfig {
            lambda_down: 2.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_result_rmse() {
        let result = LMResult {
            params: vec![1.0],
            residual_ss: 4.0,
            iterations: 10,
            evaluations: 30,
            converged: true,
            final_lambda: 1e-5,
        };
        assert_relative_eq!(result.rmse(4), 1.0);
        assert_eq!(result.rmse(0), 0.0);
    }

    #[test]
    fn test_solve_linear() {
        let residuals = |p: &[f64]| -> Vec<f64> { vec![p[0] - 2.0, p[1] - 3.0] };
        let result = LevenbergMarquardtSolver::with_defaults()
            .solve(residuals, vec![0.0, 0.0])
            .unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.params[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(result.params[1], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_solve_rosenbrock() {
        let residuals =
            |p: &[f64]| -> Vec<f64> { vec![10.0 * (p[1] - p[0] * p[0]), 1.0 - p[0]] };
        let config = LMConfig::default().with_max_iterations(500);
        let result = LevenbergMarquardtSolver::new(config)
            .solve(residuals, vec![-1.2, 1.0])
            .unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.params[0], 1.0, epsilon = 1e-5);
        assert_relative_eq!(result.params[1], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_solve_overdetermined_with_noise() {
        // y = 1.5 x + 0.5 with alternating +/- 0.01
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs
            .iter()
            .enumerate()
            .map(|(i, x)| 1.5 * x + 0.5 + if i % 2 == 0 { 0.01 } else { -0.01 })
            .collect();
        let residuals = |p: &[f64]| -> Vec<f64> {
            xs.iter().zip(&ys).map(|(x, y)| p[0] * x + p[1] - y).collect()
        };

        let result = LevenbergMarquardtSolver::with_defaults()
            .solve(residuals, vec![0.0, 0.0])
            .unwrap();
        assert!(result.converged);
        assert_relative_eq!(result.params[0], 1.5, epsilon = 1e-2);
        assert_relative_eq!(result.params[1], 0.5, epsilon = 5e-2);
        assert!(result.residual_ss > 0.0);
    }

    #[test]
    fn test_iteration_cap_returns_best_found() {
        let residuals =
            |p: &[f64]| -> Vec<f64> { vec![10.0 * (p[1] - p[0] * p[0]), 1.0 - p[0]] };
        let config = LMConfig::default().with_max_iterations(2);
        let result = LevenbergMarquardtSolver::new(config)
            .solve(residuals, vec![-1.2, 1.0])
            .unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 2);
        assert!(result.residual_ss <= 24.2 + 1e-12);
    }

    #[test]
    fn test_rejects_non_finite_trial_steps() {
        // residual undefined for p <= 0
        let residuals = |p: &[f64]| -> Vec<f64> {
            if p[0] <= 0.0 {
                vec![f64::NAN]
            } else {
                vec![p[0].ln() - 1.0]
            }
        };
        let result = LevenbergMarquardtSolver::with_defaults()
            .solve(residuals, vec![0.5])
            .unwrap();
        assert!(result.converged);
        assert_relative_eq!(result.params[0], std::f64::consts::E, epsilon = 1e-6);
    }

    #[test]
    fn test_stall_at_max_lambda_not_converged() {
        // only the start and its Jacobian bump are evaluable
        let residuals = |p: &[f64]| -> Vec<f64> {
            if p[0] <= 1.0 + 2e-7 {
                vec![p[0] - 10.0]
            } else {
                vec![f64::NAN]
            }
        };
        let config = LMConfig {
            max_lambda: 1e3,
            ..Default::default()
        };
        let result = LevenbergMarquardtSolver::new(config)
            .solve(residuals, vec![1.0])
            .unwrap();

        assert!(!result.converged);
        assert_eq!(result.params, vec![1.0]);
        assert_relative_eq!(result.residual_ss, 81.0);
        assert_relative_eq!(result.final_lambda, 1e3);
        assert!(result.iterations < 100);
    }

    #[test]
    fn test_empty_params_error() {
        let residuals = |_: &[f64]| -> Vec<f64> { vec![1.0] };
        let err = LevenbergMarquardtSolver::with_defaults()
            .solve(residuals, vec![])
            .unwrap_err();
        assert!(matches!(err, SolverError::NumericalInstability(_)));
    }

    #[test]
    fn test_non_finite_start_error() {
        let residuals = |_: &[f64]| -> Vec<f64> { vec![f64::INFINITY] };
        let err = LevenbergMarquardtSolver::with_defaults()
            .solve(residuals, vec![1.0])
            .unwrap_err();
        assert!(matches!(err, SolverError::NonFinite { .. }));
    }

    #[test]
    fn test_cholesky_solve() {
        let a = vec![vec![4.0, 2.0], vec![2.0, 3.0]];
        let x = solve_cholesky(&a, &[2.0, 1.0]).unwrap();
        assert_relative_eq!(4.0 * x[0] + 2.0 * x[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(2.0 * x[0] + 3.0 * x[1], 1.0, epsilon = 1e-12);
        assert!(solve_cholesky(&[vec![-1.0]], &[1.0]).is_none());
    }

    #[test]
    fn test_jacobian_linear() {
        let residuals = |p: &[f64]| -> Vec<f64> { vec![2.0 * p[0] + 3.0 * p[1]] };
        let params = vec![1.0, 1.0];
        let r0 = residuals(&params);
        let jacobian = compute_jacobian(&residuals, &params, &r0, 1e-7);
        assert_relative_eq!(jacobian[0][0], 2.0, epsilon = 1e-5);
        assert_relative_eq!(jacobian[0][1], 3.0, epsilon = 1e-5);
    }
}
