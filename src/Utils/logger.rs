//! logger setup and saving of results into files
use crate::errors::OdeError;
use crate::numerical::RK4::Trajectory;
use crate::numerical::error_estimation::ErrorEstimate;
use csv::Writer;
use simplelog::*;
use std::fs::File;
use std::io::Write;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// verbosity accepted in task documents and by the solver API
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    #[strum(to_string = "off", serialize = "none")]
    Off,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Off => LevelFilter::Off,
        }
    }

    pub fn parse(level: &str) -> Result<LogLevel, OdeError> {
        LogLevel::from_str(level.trim()).map_err(|_| {
            OdeError::InvalidParameter(format!(
                "loglevel must be debug, info, warn, error, off or none, got {}",
                level
            ))
        })
    }
}

/// Terminal logger plus an optional file logger. A logger installed earlier stays in place
/// and no log file is created then.
pub fn init_logger(level: LevelFilter, log_file: Option<&str>) -> Result<(), OdeError> {
    if log::max_level() != LevelFilter::Off {
        return Ok(());
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(name) = log_file {
        loggers.push(WriteLogger::new(level, Config::default(), File::create(name)?));
    }
    // SetLoggerError only means that some logger is already active
    let _ = CombinedLogger::init(loggers);
    Ok(())
}

/// csv with the columns x, y, error
pub fn save_estimate_to_csv(
    estimate: &ErrorEstimate,
    arg: &str,
    function: &str,
    filename: &str,
) -> Result<(), OdeError> {
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);
    writer.write_record([arg, function, "error"])?;
    for (x, y, e) in estimate.rows() {
        writer.write_record(&[x.to_string(), y.to_string(), e.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// tab separated table: argument column followed by one column per state component
pub fn save_trajectory_to_file(
    trajectory: &Trajectory,
    headers: &[String],
    arg: &str,
    filename: &str,
) -> Result<(), OdeError> {
    if headers.len() != trajectory.order() {
        return Err(OdeError::InvalidParameter(format!(
            "{} headers for {} state components",
            headers.len(),
            trajectory.order()
        )));
    }
    let mut file = File::create(filename)?;
    let mut headers_with_x = vec![arg.to_string()];
    headers_with_x.extend(headers.iter().cloned());
    writeln!(file, "{}", headers_with_x.join("\t"))?;
    for (i, column) in trajectory.y.column_iter().enumerate() {
        let mut row_data = vec![trajectory.x[i].to_string()];
        row_data.extend(column.iter().map(|val| val.to_string()));
        writeln!(file, "{}", row_data.join("\t"))?;
    }
    Ok(())
}
