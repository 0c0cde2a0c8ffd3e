use anyhow::Context;
use rasterdose::{
    init_logging, run_simulation_file, BeamPreset, SimulationConfig, BUILD_DATE, VERSION,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const USAGE: &str = "usage: rasterdose <pattern-file> [preset|config-file] [report.json]";

/// Preset name, or a path to a `.json`/`.toml` configuration file
fn resolve_config(arg: Option<&str>) -> anyhow::Result<SimulationConfig> {
    let Some(arg) = arg else {
        return Ok(SimulationConfig::default());
    };

    let path = Path::new(arg);
    if path.extension().is_some() || path.exists() {
        return SimulationConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()));
    }

    let preset: BeamPreset = arg.parse()?;
    Ok(SimulationConfig::with_preset(preset))
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let mut args = std::env::args().skip(1);
    let pattern_path = PathBuf::from(args.next().context(USAGE)?);
    let config_arg = args.next();
    let report_path = args.next().map(PathBuf::from);

    info!(version = VERSION, build_date = BUILD_DATE, "RasterDose");

    let config = resolve_config(config_arg.as_deref())?;
    config.validate()?;

    let report = run_simulation_file(&pattern_path, &config)
        .with_context(|| format!("Simulation of '{}' failed", pattern_path.display()))?;

    if let Some(violation) = &report.closed_loop {
        warn!("{violation}");
    }
    info!(
        "Time for 1 round: {:.3} s = {:.3} min",
        report.pass_time_s, report.pass_time_min
    );
    info!("Passes in reference time: {:.3}", report.scale_factor);
    match (report.per_pass_average, report.stats.in_mask_average) {
        (Some(per_pass), Some(total)) => {
            info!("Average inside deposition area (per raster run): {per_pass:.4} %");
            info!("Average inside deposition area (total): {total:.4} %");
        }
        _ => warn!("No grid point lies inside the mask; mask average undefined"),
    }
    info!("Peak coverage: {:.4} %", report.stats.peak);
    match report.stats.charge_fraction {
        Some(fraction) => info!("Percent of charge within mask: {fraction:.2} %"),
        None => warn!("No charge deposited; charge fraction undefined"),
    }

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report '{}'", path.display()))?;
        info!(path = %path.display(), "Report written");
    }

    Ok(())
}
