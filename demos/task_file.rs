//! solves the problem described in demos/task.txt and saves the result
use RustedRK4::Utils::task_parser::IVPTask;
use RustedRK4::numerical::RK4_api::RK4solver;

fn main() {
    let task = IVPTask::from_file("demos/task.txt").unwrap();
    let save_csv = task.save_csv.clone();
    let mut solver = RK4solver::from_task(task);
    solver.solve().unwrap();
    println!("{}", solver.result_table().unwrap());
    if let Some(filename) = save_csv {
        solver.save_result(&filename).unwrap();
    }
    solver.save_trajectory("trajectory.txt").unwrap();
}
