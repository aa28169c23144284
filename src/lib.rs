pub mod config;
pub mod display;
pub mod driver;
pub mod errors;
pub mod logging;
pub mod report;
pub mod runner;
pub mod types;
