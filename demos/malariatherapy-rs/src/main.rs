pub mod output;
pub mod parameters;
pub mod sweep;

use std::fs;

use anyhow::Context;
use malaria_calib::Environment;
use malaria_calib::analysis::{
    PatientReport, TRUE_ASEXUAL_PARASITES, infection_durations, linspace, summarize_durations,
};
use parameters::Parameters;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let ctx = Environment::<Parameters>::load()?;
    let parameters = ctx.input.clone().context("missing input section")?;

    let sweep = sweep::immune_forcing_sweep(&parameters)?;
    log::info!("built {} immune forcing simulations", sweep.len());
    ctx.write_json("sweep.json", &sweep)?;

    // Patient reports from finished simulations, one file per simulation
    let mut reports: Vec<(&String, _)> = ctx
        .files
        .iter()
        .filter(|(key, _)| key.starts_with("patient_report"))
        .collect();
    if reports.is_empty() {
        return Ok(());
    }
    reports.sort();

    let mut rows = Vec::new();
    for (key, path) in reports {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading patient report {}", path.display()))?;
        let report: PatientReport = serde_json::from_str(&text)?;
        let durations = infection_durations(&report, TRUE_ASEXUAL_PARASITES)?;
        let summary = summarize_durations(
            &durations,
            linspace(0.0, f64::from(parameters.histogram_days), 12),
        );
        log::info!("{key}: mean infection duration {:.1} days", summary.mean);
        rows.extend(output::duration_rows(key, &summary));
    }
    ctx.write_csv("infection_durations.csv", &output::DURATION_HEADERS, &rows)?;
    Ok(())
}
