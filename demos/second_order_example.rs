//! y'' = 1 + 2xy - x^2 y', y(0) = 1, y'(0) = 0 on [0, 1] with h = 0.1
use RustedRK4::numerical::error_estimation::estimate_rk4_error;
use RustedRK4::numerical::order_reduction::{OdeSpec, reduce_to_first_order};
use nalgebra::DVector;

fn main() {
    let spec = OdeSpec::parse("y'' = 1 + 2*x*y - x^2*y'", 2).unwrap();
    let (f, placeholders) = reduce_to_first_order(&spec).unwrap();
    println!("state vector: {:?}", placeholders);
    let y0 = DVector::from_vec(vec![1.0, 0.0]);
    let res = estimate_rk4_error(&f, 2, 0.0, &y0, 0.1, 1.0).unwrap();
    for (x, y, e) in res.rows() {
        println!("x = {:.2}, y ≈ {:.6}, error ≈ {:.2e}", x, y, e);
    }
}
