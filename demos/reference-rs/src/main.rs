pub mod manifest;
pub mod parameters;
pub mod site;

use anyhow::Context;
use malaria_calib::Environment;
use manifest::Manifest;
use parameters::Parameters;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let ctx = Environment::<Parameters>::load()?;
    let parameters = ctx.input.clone().context("missing input section")?;
    let output_dir = site::require_output_dir(&ctx)?;

    let site = site::resolve_site(&ctx.files, &parameters)?;
    let table = site
        .reference_data()
        .with_context(|| format!("building reference data for {}", site.name()))?;
    log::info!("{}: {} reference rows", site.name(), table.len());

    ctx.write_csv(
        &format!("reference_{}.csv", site.name()),
        &table.headers(),
        &table.records(),
    )?;

    let mut config = parameters.base_params.config();
    site.configure(&mut config);
    ctx.write_json("config.json", &config)?;

    ctx.write_json("manifest.json", &Manifest::new(&site, &table)?)?;
    log::info!("{}: outputs in {}", site.name(), output_dir.display());
    Ok(())
}
