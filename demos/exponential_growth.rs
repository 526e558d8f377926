//! y' = y with a hand-written right-hand side: the estimated error against the true one
//! for decreasing steps
use RustedRK4::numerical::RK4::runge_kutta;
use RustedRK4::numerical::error_estimation::estimate_rk4_error;
use nalgebra::DVector;
use tabled::{builder::Builder, settings::Style};

fn main() {
    let f = |_x: f64, y: &[f64]| y[0];
    let y0 = DVector::from_vec(vec![1.0]);
    let mut builder = Builder::default();
    builder.push_record(
        ["h", "y(1)", "true error", "estimated error at h/2"].map(String::from),
    );
    for h in [0.2, 0.1, 0.05, 0.025] {
        let trajectory = runge_kutta(&f, 1, 0.0, &y0, h, 1.0).unwrap();
        let y_end = trajectory.y[(0, trajectory.len() - 1)];
        let estimate = estimate_rk4_error(&f, 1, 0.0, &y0, h, 1.0).unwrap();
        builder.push_record([
            h.to_string(),
            format!("{:.10}", y_end),
            format!("{:.3e}", (1f64.exp() - y_end).abs()),
            format!("{:.3e}", estimate.error[estimate.len() - 1]),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    println!("{}", table);
}
