use std::collections::BTreeMap;

use malaria_calib::analysis::{AgePrevalence, run_stats};

pub const PREVALENCE_HEADERS: [&str; 6] = ["age", "day", "Coverage", "min", "max", "mean"];

/// (age bin, day, coverage) keyed by bit patterns so floats can sort.
type ArmKey = (u64, usize, u64);

#[derive(Default)]
pub struct PrevalenceByArm {
    runs: BTreeMap<ArmKey, Vec<f64>>,
}

impl PrevalenceByArm {
    pub fn add_run(&mut self, coverage: f64, prevalence: &[AgePrevalence]) {
        for p in prevalence {
            self.runs
                .entry((p.age.to_bits(), p.day, coverage.to_bits()))
                .or_default()
                .push(p.prevalence);
        }
    }

    /// Min, max and mean across runs for every (age, day, coverage).
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.runs
            .iter()
            .filter_map(|((age, day, coverage), values)| {
                let stats = run_stats(values)?;
                Some(vec![
                    f64::from_bits(*age).to_string(),
                    day.to_string(),
                    f64::from_bits(*coverage).to_string(),
                    stats.min.to_string(),
                    stats.max.to_string(),
                    stats.mean.to_string(),
                ])
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_runs_are_pooled_per_arm() {
        let mut arms = PrevalenceByArm::default();
        let run = |p: f64| {
            vec![AgePrevalence {
                age: 5.0,
                day: 0,
                prevalence: p,
            }]
        };
        arms.add_run(0.6, &run(0.2));
        arms.add_run(0.6, &run(0.4));
        arms.add_run(1.0, &run(0.1));

        let rows = arms.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["5", "0", "0.6", "0.2", "0.4", "0.30000000000000004"]);
        assert_eq!(rows[1][2], "1");
    }
}
