pub mod output;
pub mod parameters;
pub mod sweep;

use std::fs;

use anyhow::Context;
use malaria_calib::Environment;
use malaria_calib::analysis::{
    SMEARED_TRUE_PFPR_CHANNEL, SummaryReport, prevalence_above_detection, prevalence_rows,
};
use output::PrevalenceByArm;
use parameters::Parameters;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let ctx = Environment::<Parameters>::load()?;
    let parameters = ctx.input.clone().context("missing input section")?;

    let sweep = sweep::smc_sweep(&parameters);
    log::info!("built {} SMC simulations", sweep.len());
    ctx.write_json("sweep.json", &sweep)?;

    if parameters.reports.is_empty() {
        return Ok(());
    }

    let mut arms = PrevalenceByArm::default();
    for report_ref in &parameters.reports {
        let path = ctx.file(&report_ref.file)?;
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading summary report {}", path.display()))?;
        let report: SummaryReport = serde_json::from_str(&text)?;
        let rows = prevalence_rows(&report, SMEARED_TRUE_PFPR_CHANNEL)?;
        log::debug!(
            "{}: coverage {}, run {}",
            report_ref.file,
            report_ref.coverage,
            report_ref.run_number
        );
        arms.add_run(report_ref.coverage, &prevalence_above_detection(&rows));
    }
    ctx.write_csv("prevalence_by_age.csv", &output::PREVALENCE_HEADERS, &arms.rows())?;
    Ok(())
}
