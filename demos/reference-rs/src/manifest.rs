use malaria_calib::{ReferenceTable, Result, StudySite};
use serde::Serialize;

/// Provenance record written next to a reference table.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub site: String,
    pub village: String,
    pub rows: usize,
    pub channels: Vec<String>,
    pub dates: Vec<u32>,
    pub sha256: String,
}

impl Manifest {
    pub fn new(site: &StudySite, table: &ReferenceTable) -> Result<Manifest> {
        Ok(Manifest {
            site: site.name().to_string(),
            village: site.metadata().village.clone(),
            rows: table.len(),
            channels: table.channels().into_iter().map(String::from).collect(),
            dates: table.dates(),
            sha256: table.digest()?,
        })
    }
}
