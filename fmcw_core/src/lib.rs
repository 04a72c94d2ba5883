// fmcw_core/src/lib.rs

// This file defines the public modules of the library.
pub mod config;
pub mod error;
pub mod logging;
pub mod messages;
pub mod models;
pub mod prelude;
pub mod sensor_model;
pub mod types;
pub mod utils;
