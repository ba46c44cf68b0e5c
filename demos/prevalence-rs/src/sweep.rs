use malaria_calib::SimConfig;
use malaria_calib::setup::{SummaryReportSpec, summary_report_fn};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::parameters::Parameters;

pub const SMC_REPETITIONS: u32 = 3;
pub const SMC_INTERVAL: u32 = 30;

#[derive(Debug, Serialize)]
pub struct Simulation {
    pub tags: Map<String, Value>,
    pub config: SimConfig,
}

/// Tags describing one SMC arm; the drug campaign itself is built by the
/// simulator's campaign tooling from these values.
pub fn smc_tags(parameters: &Parameters, coverage: f64) -> Map<String, Value> {
    let mut tags = Map::new();
    tags.insert("Coverage".to_string(), json!(coverage));
    tags.insert("Start".to_string(), json!(parameters.smc_start_day));
    tags.insert(
        "Intervention_type".to_string(),
        json!(format!("SMC{}", parameters.agemax)),
    );
    tags.insert("Drug".to_string(), json!(parameters.drug));
    tags.insert("Repetitions".to_string(), json!(SMC_REPETITIONS));
    tags.insert("Interval".to_string(), json!(SMC_INTERVAL));
    tags
}

/// Every coverage crossed with every seed.
pub fn smc_sweep(parameters: &Parameters) -> Vec<Simulation> {
    let daily_report = summary_report_fn(SummaryReportSpec {
        start: f64::from(parameters.smc_start_day + 1),
        interval: 1.0,
        description: "Daily_Report".to_string(),
        parasitemia_bins: Vec::new(),
        age_bins: vec![5.0, 10.0, 100.0],
    });

    let mut simulations = Vec::new();
    for &coverage in &parameters.coverages {
        for seed in 0..parameters.num_seeds {
            let mut config = SimConfig::new();
            config.set_param("Run_Number", seed);
            config.set_param("Simulation_Duration", parameters.smc_start_day + 365);
            daily_report.apply(&mut config);

            let mut tags = smc_tags(parameters, coverage);
            tags.insert("Run_Number".to_string(), json!(seed));
            tags.insert("report_start_day".to_string(), json!(parameters.smc_start_day));
            simulations.push(Simulation { tags, config });
        }
    }
    simulations
}

#[cfg(test)]
mod test {
    use super::*;

    fn parameters() -> Parameters {
        serde_json::from_value(json!({})).unwrap()
    }

    #[test]
    fn test_sweep_size_and_tags() {
        let sweep = smc_sweep(&parameters());
        assert_eq!(sweep.len(), 5 * 10);

        let last = sweep.last().unwrap();
        assert_eq!(last.tags["Coverage"], json!(1.0));
        assert_eq!(last.tags["Run_Number"], json!(9));
        assert_eq!(last.tags["Intervention_type"], json!("SMC5"));
        assert_eq!(last.config.param("Simulation_Duration"), Some(&json!(545)));
        assert_eq!(last.config.reports["Daily_Report"]["Start_Day"], json!(181.0));
    }
}
