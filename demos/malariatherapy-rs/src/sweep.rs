use malaria_calib::{Result, SimConfig, set_transition_matrix};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::parameters::Parameters;

#[derive(Debug, Serialize)]
pub struct SweepEntry {
    pub tags: Map<String, Value>,
    pub config: SimConfig,
}

/// Challenge-bite configuration shared by every simulation in the sweep.
pub fn base_config(parameters: &Parameters) -> SimConfig {
    let mut config = SimConfig::new();
    config.set_param("Vector_Species_Names", json!([]));
    config.set_param("Simulation_Duration", parameters.simulation_duration);
    config.set_param(
        "Demographics_Filenames",
        json!(["Malariatherapy_demographics.json"]),
    );
    config.add_report(
        "Patient_Report",
        json!({ "class": "MalariaPatientReport" }),
    );
    config
}

/// One simulation per scale factor, each with its own forced transition
/// matrix.
pub fn immune_forcing_sweep(parameters: &Parameters) -> Result<Vec<SweepEntry>> {
    let base = base_config(parameters);
    parameters
        .scale_factors
        .iter()
        .map(|&scale_factor| {
            let mut config = base.clone();
            let tags = set_transition_matrix(
                &mut config,
                &parameters.transition_matrix,
                scale_factor,
                parameters.immune_stim_threshold,
            )?;
            log::debug!("scale factor {scale_factor}: configured");
            Ok(SweepEntry { tags, config })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use malaria_calib::transition::TRANSITION_MATRIX_PARAM;

    fn parameters() -> Parameters {
        serde_json::from_value(json!({
            "transition_matrix": [[0.5, 0.5], [0.2, 0.8]]
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let parameters = parameters();
        assert_eq!(parameters.scale_factors, vec![2.0, 5.0, 10.0, 100.0]);
        assert_eq!(parameters.immune_stim_threshold, 1);
        assert_eq!(parameters.simulation_duration, 365);
    }

    #[test]
    fn test_one_entry_per_scale_factor() {
        let sweep = immune_forcing_sweep(&parameters()).unwrap();
        assert_eq!(sweep.len(), 4);
        for (entry, scale) in sweep.iter().zip([2.0, 5.0, 10.0, 100.0]) {
            assert_eq!(entry.tags["scale_factor"], json!(scale));
            let tm = entry.config.param(TRANSITION_MATRIX_PARAM).unwrap();
            // row 0 is below the threshold
            assert_eq!(tm[0], json!([0.5, 0.5]));
            let row: Vec<f64> = tm[1]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_f64().unwrap())
                .collect();
            assert!(row.iter().all(|p| *p >= 0.0));
            // divisors are all at least 1 from scale 5 up
            if scale >= 5.0 {
                assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            }
            assert_eq!(entry.config.param("Simulation_Duration"), Some(&json!(365)));
        }
    }
}
