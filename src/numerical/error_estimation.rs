//! Global error estimate of RK4 by Richardson extrapolation.
//!
//! The system is integrated with steps h and h/2; since the global error of RK4 is O(h^4),
//! err(h) ≈ |y_{h/2} - y_h| / (2^4 - 1).
//! Only the solution itself (state component 0) gets an estimate, not its derivatives.
use crate::errors::OdeError;
use crate::numerical::RK4::{Trajectory, runge_kutta};
use log::{debug, info};
use nalgebra::DVector;

/// 2^p - 1 for the order p = 4 of RK4
pub const RICHARDSON_FACTOR: f64 = 15.0;
/// tolerance of the x-grid comparison, in units of f64::EPSILON relative to |x|
const ALIGNMENT_ULPS: f64 = 4.0;

/// solution on the coarse (step h) grid with its pointwise error estimate
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorEstimate {
    pub x: DVector<f64>,
    pub y: DVector<f64>,
    pub error: DVector<f64>,
}

impl ErrorEstimate {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn max_error(&self) -> f64 {
        self.error.iter().cloned().fold(0.0, f64::max)
    }

    /// (x, y, error) triples
    pub fn rows(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.x
            .iter()
            .zip(self.y.iter())
            .zip(self.error.iter())
            .map(|((&x, &y), &e)| (x, y, e))
    }
}

/// Picks every second sample of the h/2 run so that it lines up with the h run.
///
/// Fails with `OdeError::Alignment` when the fine run does not have exactly twice as many steps
/// or when the picked x values differ from the coarse ones.
pub fn align_fine_to_coarse(
    coarse: &Trajectory,
    fine: &Trajectory,
) -> Result<Trajectory, OdeError> {
    let alignment_error = |detail: String| OdeError::Alignment {
        coarse: coarse.len(),
        fine: fine.len(),
        detail,
    };
    if coarse.is_empty() || fine.len() != 2 * (coarse.len() - 1) + 1 {
        return Err(alignment_error(format!(
            "the h/2 run must have exactly twice the {} steps of the h run",
            coarse.len().saturating_sub(1)
        )));
    }
    let aligned = fine.downsample(2);
    for (i, (xc, xf)) in coarse.x.iter().zip(aligned.x.iter()).enumerate() {
        let tolerance = ALIGNMENT_ULPS * f64::EPSILON * xc.abs().max(xf.abs()).max(1.0);
        if (xc - xf).abs() > tolerance {
            return Err(alignment_error(format!(
                "sample {}: coarse x = {} but fine x = {}",
                i, xc, xf
            )));
        }
    }
    Ok(aligned)
}

/// Runs RK4 with h and h/2 (in parallel) and returns the coarse solution with its error estimate
/// and the full coarse trajectory.
pub fn estimate_rk4_error_with_trajectory<F>(
    f: &F,
    order: usize,
    x0: f64,
    y0: &DVector<f64>,
    h: f64,
    x_end: f64,
) -> Result<(ErrorEstimate, Trajectory), OdeError>
where
    F: Fn(f64, &[f64]) -> f64 + Sync + ?Sized,
{
    let (coarse, fine) = rayon::join(
        || runge_kutta(f, order, x0, y0, h, x_end),
        || runge_kutta(f, order, x0, y0, 0.5 * h, x_end),
    );
    let coarse = coarse?;
    let fine = fine?;
    debug!(
        "Richardson: coarse run {} samples, fine run {} samples",
        coarse.len(),
        fine.len()
    );

    let aligned = align_fine_to_coarse(&coarse, &fine)?;
    let y_coarse = coarse.component(0);
    let y_fine = aligned.component(0);
    let error = (&y_fine - &y_coarse).abs() / RICHARDSON_FACTOR;

    let estimate = ErrorEstimate {
        x: coarse.x.clone(),
        y: y_coarse,
        error,
    };
    info!(
        "RK4 with h = {}: {} samples, max estimated error {:e}",
        h,
        estimate.len(),
        estimate.max_error()
    );
    Ok((estimate, coarse))
}

/// Estimates the global error of RK4 for the primary solution component.
///
/// # Returns
/// coarse x grid, coarse y values (component 0) and the error estimate, all of the same length
pub fn estimate_rk4_error<F>(
    f: &F,
    order: usize,
    x0: f64,
    y0: &DVector<f64>,
    h: f64,
    x_end: f64,
) -> Result<ErrorEstimate, OdeError>
where
    F: Fn(f64, &[f64]) -> f64 + Sync + ?Sized,
{
    estimate_rk4_error_with_trajectory(f, order, x0, y0, h, x_end).map(|(estimate, _)| estimate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::order_reduction::{OdeSpec, reduce_to_first_order};
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn second_order_example() -> (crate::numerical::order_reduction::RhsFunction, DVector<f64>) {
        let spec = OdeSpec::parse("y'' = 1 + 2*x*y - x^2*y'", 2).unwrap();
        let (f, _) = reduce_to_first_order(&spec).unwrap();
        (f, DVector::from_vec(vec![1.0, 0.0]))
    }

    #[test]
    fn test_end_to_end_second_order() {
        let (f, y0) = second_order_example();
        let res = estimate_rk4_error(&f, 2, 0.0, &y0, 0.1, 1.0).unwrap();
        assert_eq!(res.x.len(), 11);
        assert_eq!(res.y.len(), 11);
        assert_eq!(res.error.len(), 11);
        assert!(res.error.iter().all(|&e| e >= 0.0));
        assert_eq!(res.error[0], 0.0);
        assert_eq!(res.y[0], 1.0);
        assert!(res.max_error() > 0.0);
    }

    #[test]
    fn test_error_scales_as_fourth_power() {
        let (f, y0) = second_order_example();
        let coarse = estimate_rk4_error(&f, 2, 0.0, &y0, 0.1, 1.0).unwrap();
        let fine = estimate_rk4_error(&f, 2, 0.0, &y0, 0.05, 1.0).unwrap();
        assert_eq!(fine.len(), 21);
        // x = 1.0 is the last sample of both grids
        let ratio = coarse.error[10] / fine.error[20];
        assert!(ratio > 10.0 && ratio < 24.0, "ratio = {}", ratio);
    }

    #[test]
    fn test_estimate_close_to_true_error() {
        // y' = y: the difference over 15 approximates the error of the h/2 run,
        // which is 1/16 of the coarse one
        let f = |_x: f64, y: &[f64]| y[0];
        let y0 = DVector::from_vec(vec![1.0]);
        let res = estimate_rk4_error(&f, 1, 0.0, &y0, 0.1, 1.0).unwrap();
        for (x, y, e) in res.rows().skip(1) {
            let fine_error = (x.exp() - y).abs() / 16.0;
            assert!(e > 0.9 * fine_error && e < 1.1 * fine_error);
        }
    }

    #[test]
    fn test_grid_alignment() {
        let f = |_x: f64, y: &[f64]| -y[0];
        let y0 = DVector::from_vec(vec![1.0]);
        let coarse = runge_kutta(&f, 1, 0.0, &y0, 0.1, 1.0).unwrap();
        let fine = runge_kutta(&f, 1, 0.0, &y0, 0.05, 1.0).unwrap();
        assert_eq!(coarse.len(), 11);
        assert_eq!(fine.len(), 21);
        let aligned = align_fine_to_coarse(&coarse, &fine).unwrap();
        assert_eq!(aligned.len(), 11);
        for i in 0..11 {
            assert_relative_eq!(aligned.x[i], coarse.x[i], epsilon = f64::EPSILON);
            assert_relative_eq!(aligned.x[i], i as f64 / 10.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_misaligned_step_count_is_alignment_error() {
        // (x_end - x0)/h = 2.5: 2 coarse steps but 5 fine steps
        let f = |_x: f64, y: &[f64]| y[0];
        let y0 = DVector::from_vec(vec![1.0]);
        let res = estimate_rk4_error(&f, 1, 0.0, &y0, 0.4, 1.0);
        assert!(matches!(
            res,
            Err(OdeError::Alignment {
                coarse: 3,
                fine: 6,
                ..
            })
        ));
    }

    #[test]
    fn test_misaligned_x_values_are_alignment_error() {
        let coarse = Trajectory {
            x: DVector::from_vec(vec![0.0, 1.0]),
            y: DMatrix::zeros(1, 2),
        };
        let fine = Trajectory {
            x: DVector::from_vec(vec![0.0, 0.5, 1.1]),
            y: DMatrix::zeros(1, 3),
        };
        assert!(matches!(
            align_fine_to_coarse(&coarse, &fine),
            Err(OdeError::Alignment { .. })
        ));
    }

    #[test]
    fn test_parameter_errors_propagate() {
        let f = |_x: f64, y: &[f64]| y[0];
        let y0 = DVector::from_vec(vec![1.0]);
        assert!(matches!(
            estimate_rk4_error(&f, 1, 0.0, &y0, -0.1, 1.0),
            Err(OdeError::InvalidParameter(_))
        ));
        assert!(matches!(
            estimate_rk4_error(&f, 1, 1.0, &y0, 0.1, 0.0),
            Err(OdeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_first_order_degenerate_case() {
        // y' = x: RK4 is exact for polynomials of degree <= 3, so both runs agree
        let f = |x: f64, _y: &[f64]| x;
        let y0 = DVector::from_vec(vec![0.0]);
        let res = estimate_rk4_error(&f, 1, 0.0, &y0, 0.25, 1.0).unwrap();
        assert_relative_eq!(res.y[4], 0.5, epsilon = 1e-14);
        assert!(res.max_error() < 1e-15);
    }
}
