//! Classical fixed-step Runge-Kutta 4 for the first-order system obtained by order reduction
//!
//! k1 = F(x, Y)
//! k2 = F(x + h/2, Y + h/2*k1)
//! k3 = F(x + h/2, Y + h/2*k2)
//! k4 = F(x + h, Y + h*k3)
//! Y_next = Y + h/6*(k1 + 2*k2 + 2*k3 + k4)
use crate::errors::OdeError;
use log::debug;
use nalgebra::{DMatrix, DVector};

/// relative distance from an integer below which (x_end - x0)/h counts as that integer
pub const STEP_SNAP_TOLERANCE: f64 = 1e-9;
/// absolute bound of the snap distance, so that long runs never round up past x_end
pub const MAX_SNAP_DISTANCE: f64 = 1e-6;
/// largest number of steps a single run may take
pub const MAX_STEPS: usize = 100_000_000;

/// result of one integration run: x samples and the state grid indexed [component, step]
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    pub x: DVector<f64>,
    pub y: DMatrix<f64>,
}

impl Trajectory {
    /// number of samples, initial condition included
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// dimension of the state vector
    pub fn order(&self) -> usize {
        self.y.nrows()
    }

    /// state vector at sample i
    pub fn state(&self, i: usize) -> DVector<f64> {
        self.y.column(i).into_owned()
    }

    /// values of state component k over the whole grid (k = 0 is the solution itself)
    pub fn component(&self, k: usize) -> DVector<f64> {
        self.y.row(k).transpose()
    }

    /// keeps every `stride`-th sample starting from the first one
    pub fn downsample(&self, stride: usize) -> Trajectory {
        let indices: Vec<usize> = (0..self.len()).step_by(stride.max(1)).collect();
        Trajectory {
            x: DVector::from_iterator(indices.len(), indices.iter().map(|&i| self.x[i])),
            y: self.y.select_columns(indices.iter()),
        }
    }
}

/// Derivatives [y0', y1', ..., y_{n-1}'] of the first-order system.
///
/// y_i' = y_{i+1} for i < n-1, the last one is the genuine equation y_{n-1}' = f(x, y0, ..., y_{n-1}).
pub fn f_system<F>(f: &F, order: usize, x: f64, y: &DVector<f64>) -> DVector<f64>
where
    F: Fn(f64, &[f64]) -> f64 + ?Sized,
{
    debug_assert_eq!(y.len(), order);
    let mut derivs = DVector::zeros(order);
    for i in 0..order - 1 {
        derivs[i] = y[i + 1];
    }
    derivs[order - 1] = f(x, y.as_slice());
    derivs
}

/// Checks the inputs shared by the stepper and the error estimator.
pub fn validate_parameters(
    order: usize,
    x0: f64,
    y0: &DVector<f64>,
    h: f64,
    x_end: f64,
) -> Result<(), OdeError> {
    if order == 0 {
        return Err(OdeError::InvalidParameter(
            "order must be at least 1".to_string(),
        ));
    }
    if y0.len() != order {
        return Err(OdeError::InvalidParameter(format!(
            "initial state has {} components, order is {}",
            y0.len(),
            order
        )));
    }
    if !(h.is_finite() && h > 0.0) {
        return Err(OdeError::InvalidParameter(format!(
            "step size must be positive and finite, got {}",
            h
        )));
    }
    if !(x0.is_finite() && x_end.is_finite()) {
        return Err(OdeError::InvalidParameter(format!(
            "interval bounds must be finite, got [{}, {}]",
            x0, x_end
        )));
    }
    if x_end < x0 {
        return Err(OdeError::InvalidParameter(format!(
            "x_end = {} lies before x0 = {}",
            x_end, x0
        )));
    }
    Ok(())
}

/// floor((x_end - x0)/h), with ratios that are an integer up to rounding noise
/// (0.3/0.1 = 2.9999999999999996) snapped to that integer.
///
/// Fails when the ratio is not finite or exceeds `MAX_STEPS`.
pub fn step_count(x0: f64, h: f64, x_end: f64) -> Result<usize, OdeError> {
    let ratio = (x_end - x0) / h;
    if !ratio.is_finite() || ratio > MAX_STEPS as f64 {
        return Err(OdeError::InvalidParameter(format!(
            "(x_end - x0)/h = {:e} steps, at most {} are allowed",
            ratio, MAX_STEPS
        )));
    }
    let nearest = ratio.round();
    let tolerance = (STEP_SNAP_TOLERANCE * nearest.max(1.0)).min(MAX_SNAP_DISTANCE);
    if (ratio - nearest).abs() <= tolerance {
        Ok(nearest as usize)
    } else {
        Ok(ratio.floor() as usize)
    }
}

/// Integrates the reduced system from x0 to x_end with the fixed step h.
///
/// # Returns
/// trajectory with step_count + 1 samples, the first one being the initial condition.
/// Samples are placed at x0 + i*h; when h does not divide the interval the last sample
/// lies below x_end.
pub fn runge_kutta<F>(
    f: &F,
    order: usize,
    x0: f64,
    y0: &DVector<f64>,
    h: f64,
    x_end: f64,
) -> Result<Trajectory, OdeError>
where
    F: Fn(f64, &[f64]) -> f64 + ?Sized,
{
    validate_parameters(order, x0, y0, h, x_end)?;
    let n_steps = step_count(x0, h, x_end)?;
    debug!(
        "RK4: {} steps of h = {} from x0 = {} towards x_end = {}",
        n_steps, h, x0, x_end
    );

    let mut xs = DVector::zeros(n_steps + 1);
    let mut ys = DMatrix::zeros(order, n_steps + 1);
    xs[0] = x0;
    ys.set_column(0, y0);

    let mut y = y0.clone();
    for i in 0..n_steps {
        let x = xs[i];
        let k1 = f_system(f, order, x, &y);
        let k2 = f_system(f, order, x + 0.5 * h, &(&y + 0.5 * h * &k1));
        let k3 = f_system(f, order, x + 0.5 * h, &(&y + 0.5 * h * &k2));
        let k4 = f_system(f, order, x + h, &(&y + h * &k3));

        y += (h / 6.0) * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
        xs[i + 1] = x0 + (i + 1) as f64 * h;
        ys.set_column(i + 1, &y);
    }

    Ok(Trajectory { x: xs, y: ys })
}
