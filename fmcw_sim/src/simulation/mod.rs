// fmcw_sim/src/simulation/mod.rs

pub mod config;
pub mod runner;
pub mod scenario;
