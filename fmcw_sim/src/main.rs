// fmcw_sim/src/main.rs

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use fmcw_core::logging::TracingSink;
use fmcw_sim::prelude::*;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), SimError> {
    // 1. Configuration.
    let scenario = load_scenario(&cli.scenario)?;
    let catalog = PrefabCatalog::load_from_dir(&cli.catalog);
    let sensor = resolve_sensor_config(&scenario.sensor, &scenario.simulation, &catalog)?;

    if cli.dump_config {
        print!("{}", dump_sensor_config(&sensor)?);
        return Ok(());
    }

    // 2. Run.
    let report = run_scenario(&scenario, &sensor, Arc::new(TracingSink))?;

    // 3. Per-step summary on stdout.
    for output in &report.outputs {
        println!("t={:.3}s detections={}", output.timestamp, output.detections.len());
        for d in &output.detections {
            println!(
                "  beam={:>4} range={:>8.3} m v={:>7.3} m/s az={:>7.2} el={:>6.2} deg strength={:.3e}",
                d.beam_idx,
                d.range,
                d.radial_velocity,
                d.azimuth.to_degrees(),
                d.elevation.to_degrees(),
                d.strength
            );
        }
    }
    Ok(())
}
