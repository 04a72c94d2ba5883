// fmcw_core/src/models/mod.rs

pub mod perception;
