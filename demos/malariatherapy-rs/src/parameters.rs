use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Parameters {
    pub transition_matrix: Vec<Vec<f64>>,
    #[serde(default = "default_scale_factors")]
    pub scale_factors: Vec<f64>,
    #[serde(default = "default_threshold")]
    pub immune_stim_threshold: usize,
    #[serde(default = "default_duration")]
    pub simulation_duration: u32,
    /// Days covered by the duration histogram.
    #[serde(default = "default_duration")]
    pub histogram_days: u32,
}

fn default_scale_factors() -> Vec<f64> {
    vec![2.0, 5.0, 10.0, 100.0]
}

fn default_threshold() -> usize {
    1
}

fn default_duration() -> u32 {
    365
}
