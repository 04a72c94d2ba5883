// fmcw_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// Runs an FMCW range-sensor model through a kinematic scenario.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/highway.toml")]
    pub scenario: PathBuf,

    /// Directory of sensor prefabs referenced by `[sensor] from = "..."`.
    #[arg(short, long, default_value = "assets/catalog")]
    pub catalog: PathBuf,

    /// Print the resolved sensor configuration as TOML and exit.
    #[arg(long, default_value_t = false)]
    pub dump_config: bool,

    /// More log output (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
