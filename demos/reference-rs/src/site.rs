use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use malaria_calib::{Environment, RawCountTable, SiteDefinition, StudySite, sites};

use crate::parameters::Parameters;

/// The site to build: a `site` file takes precedence over `input.site`, and a
/// `reference_csv` file replaces whatever counts the site carries.
pub fn resolve_site(
    files: &HashMap<String, PathBuf>,
    parameters: &Parameters,
) -> anyhow::Result<StudySite> {
    let mut site = match files.get("site") {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading site file {}", path.display()))?;
            SiteDefinition::from_toml_str(&text)?.into_site()
        }
        None => match parameters.site.as_deref() {
            Some(name) => sites::builtin(name)?,
            None => bail!("no site given: set input.site or model.files.site"),
        },
    };

    if let Some(path) = files.get("reference_csv") {
        let counts = read_counts(path, &site)?;
        site = site.with_reference(counts);
    }
    Ok(site)
}

fn read_counts(path: &Path, site: &StudySite) -> anyhow::Result<RawCountTable> {
    let file = fs::File::open(path)
        .with_context(|| format!("opening reference counts {}", path.display()))?;
    Ok(RawCountTable::from_csv(file, &site.reference_bins())?)
}

/// A reference run writes several files, so stdout is not a usable sink.
pub fn require_output_dir<I>(ctx: &Environment<I>) -> anyhow::Result<PathBuf> {
    match ctx.output_dir() {
        Some(dir) => Ok(dir),
        None => bail!("reference runs write several files; configure a filesystem output"),
    }
}
