use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Parameters {
    #[serde(default = "default_coverages")]
    pub coverages: Vec<f64>,
    #[serde(default = "default_num_seeds")]
    pub num_seeds: u64,
    #[serde(default = "default_smc_start_day")]
    pub smc_start_day: u32,
    #[serde(default = "default_agemax")]
    pub agemax: u32,
    #[serde(default = "default_drug")]
    pub drug: String,
    /// Finished simulations to analyze.
    #[serde(default)]
    pub reports: Vec<ReportRef>,
}

/// A summary report file, by its key under `model.files`, with the sweep
/// values of the simulation that wrote it.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRef {
    pub file: String,
    #[serde(rename = "Coverage")]
    pub coverage: f64,
    #[serde(rename = "Run_Number")]
    pub run_number: u64,
}

fn default_coverages() -> Vec<f64> {
    vec![0.6, 0.7, 0.8, 0.9, 1.0]
}

fn default_num_seeds() -> u64 {
    10
}

fn default_smc_start_day() -> u32 {
    180
}

fn default_agemax() -> u32 {
    5
}

fn default_drug() -> String {
    "DP".to_string()
}
