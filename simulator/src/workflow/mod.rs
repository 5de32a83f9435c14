pub mod config;
pub mod grouping;
pub mod runner;
