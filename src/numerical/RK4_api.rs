//! Front-end of the RK4 solver: string equation in, solution with its error estimate out.
//!
//! Example#
//! ```no_run
//! use RustedRK4::numerical::RK4_api::RK4solver;
//! use nalgebra::DVector;
//! let mut solver = RK4solver::new(
//!     "y'' = 1 + 2*x*y - x^2*y'",
//!     2,
//!     0.0,
//!     DVector::from_vec(vec![1.0, 0.0]),
//!     0.1,
//!     1.0,
//! );
//! solver.solve().unwrap();
//! println!("{}", solver.result_table().unwrap());
//! solver.save_result("result.csv").unwrap();
//! ```
use crate::Utils::logger::{LogLevel, init_logger, save_estimate_to_csv, save_trajectory_to_file};
use crate::Utils::plots::plot_estimate;
use crate::Utils::task_parser::IVPTask;
use crate::errors::OdeError;
use crate::numerical::RK4::Trajectory;
use crate::numerical::error_estimation::{ErrorEstimate, estimate_rk4_error_with_trajectory};
use crate::numerical::order_reduction::{OdeSpec, reduce_to_first_order};
use crate::symbolic::symbolic_engine::Expr;
use chrono::Local;
use log::{error, info};
use nalgebra::DVector;
use simplelog::LevelFilter;
use std::collections::BTreeMap;
use std::time::Instant;
use tabled::{builder::Builder, settings::Style};

pub struct RK4solver {
    equation: String,
    order: usize,
    function: String,
    arg: String,
    x0: f64,
    y0: DVector<f64>,
    h: f64,
    x_end: f64,
    /// "debug" | "info" | "warn" | "error" | "off" | "none"
    pub loglevel: Option<String>,
    /// None: terminal only, Some(None): timestamped file name, Some(Some(name)): given file name
    pub log_file: Option<Option<String>>,
    result: Option<ErrorEstimate>,
    trajectory: Option<Trajectory>,
    calc_statistics: BTreeMap<String, String>,
}

impl RK4solver {
    pub fn new(
        equation: &str,
        order: usize,
        // start point
        x0: f64,
        // initial condition [y, y', ..., y^(order-1)]
        y0: DVector<f64>,
        h: f64,
        x_end: f64,
    ) -> RK4solver {
        RK4solver {
            equation: equation.to_string(),
            order,
            function: "y".to_string(),
            arg: "x".to_string(),
            x0,
            y0,
            h,
            x_end,
            loglevel: None,
            log_file: None,
            result: None,
            trajectory: None,
            calc_statistics: BTreeMap::new(),
        }
    }

    pub fn from_task(task: IVPTask) -> RK4solver {
        let mut solver = RK4solver::new(
            &task.equation,
            task.order,
            task.x0,
            DVector::from_vec(task.y0),
            task.h,
            task.x_end,
        );
        solver.set_names(&task.function, &task.arg);
        solver.loglevel = task.loglevel;
        solver.log_file = task.log_file.map(Some);
        solver
    }

    /// names of the unknown function and of the argument (default y and x)
    pub fn set_names(&mut self, function: &str, arg: &str) {
        self.function = function.to_string();
        self.arg = arg.to_string();
    }

    pub fn set_loglevel(&mut self, loglevel: Option<String>, log_file: Option<Option<String>>) {
        self.loglevel = loglevel;
        self.log_file = log_file;
    }

    fn log_filter(&self) -> Result<LevelFilter, OdeError> {
        match &self.loglevel {
            Some(level) => Ok(LogLevel::parse(level)?.to_filter()),
            None => Ok(LevelFilter::Info),
        }
    }

    fn log_file_name(&self) -> Option<String> {
        match &self.log_file {
            None => None,
            Some(Some(name)) => Some(name.clone()),
            Some(None) => {
                let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
                Some(format!("log_{}.txt", date_and_time))
            }
        }
    }

    fn solver(&mut self) -> Result<(), OdeError> {
        self.result = None;
        self.trajectory = None;
        self.calc_statistics.clear();
        let start = Instant::now();
        let spec =
            OdeSpec::parse_with_names(&self.equation, self.order, &self.function, &self.arg)?;
        let (f, _placeholders) = reduce_to_first_order(&spec)?;
        let (estimate, trajectory) = estimate_rk4_error_with_trajectory(
            &*f,
            self.order,
            self.x0,
            &self.y0,
            self.h,
            self.x_end,
        )?;
        let duration = start.elapsed();

        self.calc_statistics
            .insert("time elapsed, ms".to_string(), duration.as_millis().to_string());
        self.calc_statistics
            .insert("number of steps".to_string(), (estimate.len() - 1).to_string());
        self.calc_statistics
            .insert("order of the ODE".to_string(), self.order.to_string());
        self.calc_statistics.insert(
            "max estimated error".to_string(),
            format!("{:e}", estimate.max_error()),
        );
        self.result = Some(estimate);
        self.trajectory = Some(trajectory);
        self.print_statistics();
        Ok(())
    }

    /// wrapper around solver function to implement logging
    pub fn solve(&mut self) -> Result<(), OdeError> {
        let log_option = self.log_filter()?;
        if log_option != LevelFilter::Off {
            init_logger(log_option, self.log_file_name().as_deref())?;
        }
        info!(
            "solving {} on [{}, {}] with h = {}",
            self.equation, self.x0, self.x_end, self.h
        );
        match self.solver() {
            Ok(()) => {
                info!("Program ended");
                Ok(())
            }
            Err(e) => {
                error!("{}", e);
                Err(e)
            }
        }
    }

    fn print_statistics(&self) {
        let mut builder = Builder::default();
        for (key, value) in &self.calc_statistics {
            builder.push_record([key.clone(), value.clone()]);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        info!("\n \n CALC STATISTICS \n \n {}", table);
    }

    /// coarse-grid solution with its error estimate, None before solve()
    pub fn get_result(&self) -> Option<&ErrorEstimate> {
        self.result.as_ref()
    }

    /// full state [y, y', ...] on the coarse grid
    pub fn get_trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    pub fn get_statistics(&self) -> &BTreeMap<String, String> {
        &self.calc_statistics
    }

    /// y, y', y'', ... for the current function name
    pub fn state_names(&self) -> Vec<String> {
        (0..self.order)
            .map(|k| Expr::Derivative(&self.function, k).to_string())
            .collect()
    }

    fn solved(&self) -> Result<&ErrorEstimate, OdeError> {
        self.result.as_ref().ok_or_else(|| {
            OdeError::InvalidParameter("no result yet, call solve() first".to_string())
        })
    }

    /// pretty table of x, y and error
    pub fn result_table(&self) -> Result<String, OdeError> {
        let estimate = self.solved()?;
        let mut builder = Builder::default();
        builder.push_record([self.arg.clone(), self.function.clone(), "error".to_string()]);
        for (x, y, e) in estimate.rows() {
            builder.push_record([format!("{:.2}", x), format!("{:.6}", y), format!("{:.2e}", e)]);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        Ok(table.to_string())
    }

    /// csv with the columns x, y, error
    pub fn save_result(&self, filename: &str) -> Result<(), OdeError> {
        let estimate = self.solved()?;
        save_estimate_to_csv(estimate, &self.arg, &self.function, filename)?;
        info!("result saved to {}", filename);
        Ok(())
    }

    /// tab separated file with the whole state on the coarse grid
    pub fn save_trajectory(&self, filename: &str) -> Result<(), OdeError> {
        let trajectory = self.trajectory.as_ref().ok_or_else(|| {
            OdeError::InvalidParameter("no result yet, call solve() first".to_string())
        })?;
        save_trajectory_to_file(trajectory, &self.state_names(), &self.arg, filename)
    }

    /// PNG plots of the solution and its error estimate in the directory `dir`
    pub fn plot_result(&self, dir: &str) -> Result<(), OdeError> {
        let estimate = self.solved()?;
        plot_estimate(estimate, &self.arg, &self.function, dir)?;
        info!("result plotted");
        Ok(())
    }
}
