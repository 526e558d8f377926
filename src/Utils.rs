//! different utility modules used throughout the project
/// logger setup, saving of the solution and its error estimate into files
pub mod logger;
/// tiny module to plot the solution and its error estimate
pub mod plots;
/// parse task document with sections and "key: value" lines into HashMap and into IVPTask
pub mod task_parser;
