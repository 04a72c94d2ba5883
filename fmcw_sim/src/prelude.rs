// fmcw_sim/src/prelude.rs

pub use crate::cli::Cli;
pub use crate::error::SimError;
pub use crate::logging::init_tracing;
pub use crate::simulation::config::{
    dump_sensor_config, load_scenario, resolve_sensor_config, PrefabCatalog, ScenarioConfig,
};
pub use crate::simulation::runner::{run_scenario, RunReport};
pub use crate::simulation::scenario::Scenario;
