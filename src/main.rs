#![allow(non_snake_case)]
use RustedRK4::Utils::task_parser::IVPTask;
use RustedRK4::errors::OdeError;
use RustedRK4::numerical::RK4_api::RK4solver;
use nalgebra::DVector;
use std::env;
use std::process::ExitCode;

fn print_result(solver: &RK4solver) -> Result<(), OdeError> {
    if let Some(result) = solver.get_result() {
        for (x, y, e) in result.rows() {
            println!("x = {:.2}, y ≈ {:.6}, error ≈ {:.2e}", x, y, e);
        }
    }
    println!("{}", solver.result_table()?);
    Ok(())
}

fn run_task(path: &str) -> Result<(), OdeError> {
    let task = IVPTask::from_file(path)?;
    let save_csv = task.save_csv.clone();
    let plot = task.plot;
    let mut solver = RK4solver::from_task(task);
    solver.solve()?;
    print_result(&solver)?;
    if let Some(filename) = save_csv {
        solver.save_result(&filename)?;
    }
    if plot {
        solver.plot_result(".")?;
    }
    Ok(())
}

fn run_example() -> Result<(), OdeError> {
    // y'' = 1 + 2xy - x^2 y', y(0) = 1, y'(0) = 0
    let mut solver = RK4solver::new(
        "y'' = 1 + 2*x*y - x^2*y'",
        2,
        0.0,
        DVector::from_vec(vec![1.0, 0.0]),
        0.1,
        1.0,
    );
    solver.loglevel = Some("warn".to_string());
    solver.solve()?;
    print_result(&solver)
}

fn main() -> ExitCode {
    let res = match env::args().nth(1) {
        Some(path) => run_task(&path),
        None => run_example(),
    };
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
