//! Derivative-free minimization with the Nelder–Mead simplex method

use crate::{MathError, Result};

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Nelder–Mead simplex optimizer
#[derive(Debug, Clone)]
pub struct NelderMead {
    max_iterations: usize,
    f_tolerance: f64,
    x_tolerance: f64,
    initial_step: f64,
}

/// Location and value of a minimum
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Argument of the minimum
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations used
    pub iterations: usize,
    /// Whether a stopping tolerance was met within the budget
    pub converged: bool,
}

impl Minimum {
    /// Reject a minimum found only because the budget ran out
    pub fn into_converged(self) -> Result<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(MathError::ConvergenceFailure {
                iterations: self.iterations,
            })
        }
    }
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            f_tolerance: 1e-10,
            x_tolerance: 1e-8,
            initial_step: 0.25,
        }
    }
}

impl NelderMead {
    /// Create an optimizer with the given iteration budget and tolerance
    pub fn new(max_iterations: usize, tolerance: f64) -> Result<Self> {
        if max_iterations == 0 {
            return Err(MathError::InvalidInput(
                "Iteration budget must be greater than zero".to_string(),
            ));
        }
        if tolerance.is_nan() || tolerance <= 0.0 {
            return Err(MathError::InvalidInput(
                "Tolerance must be positive".to_string(),
            ));
        }

        Ok(Self {
            max_iterations,
            f_tolerance: tolerance,
            x_tolerance: tolerance,
            ..Self::default()
        })
    }

    /// Change the iteration budget, keeping the tolerances
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Result<Self> {
        if max_iterations == 0 {
            return Err(MathError::InvalidInput(
                "Iteration budget must be greater than zero".to_string(),
            ));
        }

        self.max_iterations = max_iterations;
        Ok(self)
    }

    /// Minimize `objective` starting from `start`.
    ///
    /// Stops when the objective values across the simplex agree within the
    /// tolerance, or when the simplex has collapsed to a point. When the
    /// budget runs out first, the best vertex is returned with
    /// `converged == false`.
    pub fn minimize<F>(&self, mut objective: F, start: &[f64]) -> Result<Minimum>
    where
        F: FnMut(&[f64]) -> f64,
    {
        if start.is_empty() {
            return Err(MathError::InvalidInput(
                "Cannot optimize over zero parameters".to_string(),
            ));
        }

        let n = start.len();
        let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        simplex.push(start.to_vec());
        for i in 0..n {
            let mut vertex = start.to_vec();
            vertex[i] += self.initial_step;
            simplex.push(vertex);
        }

        let mut values = Vec::with_capacity(n + 1);
        for vertex in &simplex {
            values.push(evaluate(&mut objective, vertex)?);
        }

        for iteration in 0..self.max_iterations {
            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
            simplex = order.iter().map(|&i| simplex[i].clone()).collect();
            values = order.iter().map(|&i| values[i]).collect();

            let best = values[0];
            let worst = values[n];
            let f_spread = (worst - best).abs();
            let x_spread = simplex[1..]
                .iter()
                .flat_map(|v| v.iter().zip(&simplex[0]).map(|(a, b)| (a - b).abs()))
                .fold(0.0, f64::max);

            if f_spread <= self.f_tolerance * (1.0 + best.abs()) || x_spread <= self.x_tolerance {
                return Ok(Minimum {
                    point: simplex[0].clone(),
                    value: best,
                    iterations: iteration,
                    converged: true,
                });
            }

            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|v| v[j]).sum::<f64>() / n as f64)
                .collect();

            let reflected = towards(&centroid, &simplex[n], -REFLECTION);
            let f_reflected = evaluate(&mut objective, &reflected)?;

            if f_reflected < best {
                let expanded = towards(&centroid, &simplex[n], -EXPANSION);
                let f_expanded = evaluate(&mut objective, &expanded)?;
                if f_expanded < f_reflected {
                    simplex[n] = expanded;
                    values[n] = f_expanded;
                } else {
                    simplex[n] = reflected;
                    values[n] = f_reflected;
                }
                continue;
            }

            if f_reflected < values[n - 1] {
                simplex[n] = reflected;
                values[n] = f_reflected;
                continue;
            }

            let (contracted, f_contracted) = if f_reflected < worst {
                let outside = towards(&centroid, &reflected, CONTRACTION);
                let f = evaluate(&mut objective, &outside)?;
                (outside, f)
            } else {
                let inside = towards(&centroid, &simplex[n], CONTRACTION);
                let f = evaluate(&mut objective, &inside)?;
                (inside, f)
            };

            if f_contracted < worst.min(f_reflected) {
                simplex[n] = contracted;
                values[n] = f_contracted;
                continue;
            }

            let anchor = simplex[0].clone();
            for i in 1..=n {
                simplex[i] = towards(&anchor, &simplex[i], SHRINK);
                values[i] = evaluate(&mut objective, &simplex[i])?;
            }
        }

        let best = (0..=n)
            .min_by(|&a, &b| values[a].total_cmp(&values[b]))
            .unwrap_or(0);
        Ok(Minimum {
            point: simplex[best].clone(),
            value: values[best],
            iterations: self.max_iterations,
            converged: false,
        })
    }
}

/// Point `origin + factor * (target - origin)`
fn towards(origin: &[f64], target: &[f64], factor: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(target)
        .map(|(o, t)| o + factor * (t - o))
        .collect()
}

fn evaluate<F>(objective: &mut F, point: &[f64]) -> Result<f64>
where
    F: FnMut(&[f64]) -> f64,
{
    let value = objective(point);
    if value.is_nan() {
        return Err(MathError::CalculationError(format!(
            "Objective is undefined at {:?}",
            point
        )));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_minimize_quadratic() {
        let optimizer = NelderMead::default();
        let minimum = optimizer
            .minimize(
                |x| (x[0] - 1.5).powi(2) + 2.0 * (x[1] + 0.5).powi(2) + 3.0,
                &[0.0, 0.0],
            )
            .unwrap();

        assert_abs_diff_eq!(minimum.point[0], 1.5, epsilon = 1e-3);
        assert_abs_diff_eq!(minimum.point[1], -0.5, epsilon = 1e-3);
        assert_abs_diff_eq!(minimum.value, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_minimize_rosenbrock() {
        let optimizer = NelderMead::new(5000, 1e-12).unwrap();
        let minimum = optimizer
            .minimize(
                |x| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2),
                &[-1.2, 1.0],
            )
            .unwrap();

        assert_abs_diff_eq!(minimum.point[0], 1.0, epsilon = 1e-2);
        assert_abs_diff_eq!(minimum.point[1], 1.0, epsilon = 2e-2);
    }

    #[test]
    fn test_constant_objective_converges() {
        let minimum = NelderMead::default().minimize(|_| 0.0, &[0.1, 0.2, 0.3]).unwrap();
        assert_eq!(minimum.value, 0.0);
        assert!(minimum.converged);
    }

    #[test]
    fn test_budget_exhausted() {
        let optimizer = NelderMead::new(3, 1e-12).unwrap();
        let minimum = optimizer.minimize(|x| (x[0] - 10.0).powi(2), &[0.0]).unwrap();
        assert!(!minimum.converged);
        assert!(minimum.value < 100.0);
        assert_eq!(
            minimum.into_converged().unwrap_err(),
            MathError::ConvergenceFailure { iterations: 3 }
        );
    }

    #[test]
    fn test_with_max_iterations() {
        let optimizer = NelderMead::default().with_max_iterations(2).unwrap();
        let minimum = optimizer.minimize(|x| (x[0] - 10.0).powi(2), &[0.0]).unwrap();
        assert_eq!(minimum.iterations, 2);
        assert!(!minimum.converged);

        assert!(NelderMead::default().with_max_iterations(0).is_err());
    }

    #[test]
    fn test_nan_objective() {
        let result = NelderMead::default().minimize(|_| f64::NAN, &[0.0]);
        assert!(matches!(result, Err(MathError::CalculationError(_))));
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(NelderMead::new(0, 1e-6).is_err());
        assert!(NelderMead::new(10, 0.0).is_err());
        assert!(NelderMead::default().minimize(|_| 0.0, &[]).is_err());
    }
}
