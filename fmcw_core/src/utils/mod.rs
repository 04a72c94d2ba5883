// fmcw_core/src/utils/mod.rs

pub mod stats;
pub mod window;
