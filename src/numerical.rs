/// reduction of an nth-order ODE to the first-order system over [y, y', ..., y^(n-1)]
pub mod order_reduction;
/// classical fixed-step Runge-Kutta 4
pub mod RK4;
/// Richardson error estimate: runs with h and h/2
/// Example#
/// ```
/// use RustedRK4::numerical::error_estimation::estimate_rk4_error;
/// use nalgebra::DVector;
/// // y' = y
/// let f = |_x: f64, y: &[f64]| y[0];
/// let res = estimate_rk4_error(&f, 1, 0.0, &DVector::from_vec(vec![1.0]), 0.1, 1.0).unwrap();
/// assert_eq!(res.len(), 11);
/// assert!(res.max_error() < 1e-6);
/// ```
pub mod error_estimation;
/// general api: equation as a string, task documents, saving and plotting of results
pub mod RK4_api;
