//! Post-processing of simulator output reports.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{CalibError, Result};

pub const SMEARED_TRUE_PFPR_CHANNEL: &str = "Smeared True PfPR by Parasitemia and Age Bin";
pub const TRUE_ASEXUAL_PARASITES: &str = "true_asexual_parasites";

/// The summary report's open-ended last parasitemia bin is replaced by this.
pub const PARASITEMIA_DISPLAY_CAP: f64 = 1e7;

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryMetadata {
    #[serde(rename = "Age Bins")]
    pub age_bins: Vec<f64>,
    #[serde(rename = "Parasitemia Bins")]
    pub parasitemia_bins: Vec<f64>,
}

/// `MalariaSummaryReport_<description>.json`, reduced to what is analyzed here.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryReport {
    #[serde(rename = "Metadata")]
    pub metadata: SummaryMetadata,
    /// channel -> time -> parasitemia bin -> age bin
    #[serde(rename = "DataByTimeAndPfPRBinsAndAgeBins", default)]
    pub by_time_density_age: BTreeMap<String, Vec<Vec<Vec<f64>>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrevalenceRow {
    pub day: usize,
    pub age_index: usize,
    pub age: f64,
    pub density_bin: f64,
    pub value: f64,
}

/// Flattens one channel of a summary report. The last time slice is a
/// partial reporting interval and is dropped.
pub fn prevalence_rows(report: &SummaryReport, channel: &str) -> Result<Vec<PrevalenceRow>> {
    let data = report
        .by_time_density_age
        .get(channel)
        .ok_or_else(|| CalibError::InvalidInput(format!("summary report has no {channel:?}")))?;

    let age_bins = &report.metadata.age_bins;
    let mut parasite_bins = report.metadata.parasitemia_bins.clone();
    if let Some(last) = parasite_bins.last_mut()
        && *last > PARASITEMIA_DISPLAY_CAP
    {
        *last = PARASITEMIA_DISPLAY_CAP;
    }

    let complete = &data[..data.len().saturating_sub(1)];
    let mut rows = Vec::new();
    for (day, by_density) in complete.iter().enumerate() {
        for (density_index, by_age) in by_density.iter().enumerate() {
            let density_bin = *parasite_bins.get(density_index).ok_or_else(|| {
                CalibError::InvalidInput(format!(
                    "day {day}: parasitemia bin {density_index} missing from metadata"
                ))
            })?;
            for (age_index, value) in by_age.iter().enumerate() {
                let age = *age_bins.get(age_index).ok_or_else(|| {
                    CalibError::InvalidInput(format!(
                        "day {day}: age bin {age_index} missing from metadata"
                    ))
                })?;
                rows.push(PrevalenceRow {
                    day,
                    age_index,
                    age,
                    density_bin,
                    value: *value,
                });
            }
        }
    }
    log::debug!("{channel}: {} prevalence rows", rows.len());
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgePrevalence {
    pub age: f64,
    pub day: usize,
    pub prevalence: f64,
}

/// Sums prevalence over the parasitemia bins at or above the lowest
/// (detection) bin, per age bin and day.
pub fn prevalence_above_detection(rows: &[PrevalenceRow]) -> Vec<AgePrevalence> {
    let Some(detection) = rows.iter().map(|r| r.density_bin).reduce(f64::min) else {
        return Vec::new();
    };

    let mut sums: BTreeMap<(usize, usize), (f64, f64)> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.density_bin >= detection) {
        let entry = sums.entry((row.age_index, row.day)).or_insert((row.age, 0.0));
        entry.1 += row.value;
    }
    sums.into_iter()
        .map(|((_, day), (age, prevalence))| AgePrevalence {
            age,
            day,
            prevalence,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Spread of one quantity across replicate runs.
pub fn run_stats(values: &[f64]) -> Option<RunStats> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some(RunStats { min, max, mean })
}

#[derive(Debug, Clone, Deserialize)]
pub struct Patient {
    pub id: u64,
    #[serde(flatten)]
    pub channels: Map<String, Value>,
}

/// `MalariaPatientReport.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientReport {
    pub patient_array: Vec<Patient>,
}

/// Last day with a positive `channel` value, per patient. Patients that are
/// never positive are skipped.
pub fn infection_durations(report: &PatientReport, channel: &str) -> Result<Vec<usize>> {
    let mut durations = Vec::with_capacity(report.patient_array.len());
    for patient in &report.patient_array {
        let series = patient
            .channels
            .get(channel)
            .and_then(|v| v.get(0))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                CalibError::InvalidInput(format!("patient {} has no {channel:?} series", patient.id))
            })?;
        let last_positive = series
            .iter()
            .rposition(|v| v.as_f64().is_some_and(|x| x > 0.0));
        match last_positive {
            Some(day) => durations.push(day),
            None => log::warn!("patient {} never had positive {channel}", patient.id),
        }
    }
    Ok(durations)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DurationSummary {
    pub count: usize,
    pub mean: f64,
    pub edges: Vec<f64>,
    pub histogram: Vec<usize>,
}

/// `n` evenly spaced points from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut points: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            points[n - 1] = stop;
            points
        }
    }
}

/// Counts per bin; every bin is half open except the last, which includes
/// its upper edge. Values outside the edges are not counted.
pub fn histogram(values: &[usize], edges: &[f64]) -> Vec<usize> {
    let mut counts = vec![0; edges.len().saturating_sub(1)];
    let Some(last) = edges.last() else {
        return counts;
    };
    for value in values.iter().map(|v| *v as f64) {
        if value == *last {
            if let Some(c) = counts.last_mut() {
                *c += 1;
            }
            continue;
        }
        if let Some(bin) = edges.windows(2).position(|w| w[0] <= value && value < w[1]) {
            counts[bin] += 1;
        }
    }
    counts
}

pub fn summarize_durations(durations: &[usize], edges: Vec<f64>) -> DurationSummary {
    let mean = if durations.is_empty() {
        f64::NAN
    } else {
        durations.iter().sum::<usize>() as f64 / durations.len() as f64
    };
    DurationSummary {
        count: durations.len(),
        mean,
        histogram: histogram(durations, &edges),
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn summary_report() -> SummaryReport {
        serde_json::from_value(json!({
            "Metadata": {
                "Age Bins": [5.0, 10.0, 100.0],
                "Parasitemia Bins": [0.0, 50.0, 1e9]
            },
            "DataByTimeAndPfPRBinsAndAgeBins": {
                "Smeared True PfPR by Parasitemia and Age Bin": [
                    [[0.5, 0.4, 0.3], [0.1, 0.1, 0.1], [0.05, 0.0, 0.0]],
                    [[0.6, 0.5, 0.4], [0.2, 0.1, 0.0], [0.0, 0.0, 0.1]],
                    [[9.0, 9.0, 9.0], [9.0, 9.0, 9.0], [9.0, 9.0, 9.0]]
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_prevalence_rows() {
        let rows = prevalence_rows(&summary_report(), SMEARED_TRUE_PFPR_CHANNEL).unwrap();
        // last (partial) slice dropped
        assert_eq!(rows.len(), 2 * 3 * 3);
        assert!(rows.iter().all(|r| r.day < 2));
        assert_eq!(rows[0].density_bin, 0.0);
        assert_eq!(rows[0].age, 5.0);
        let top = rows.iter().find(|r| r.day == 1 && r.age_index == 2 && r.density_bin > 50.0);
        assert_eq!(top.unwrap().density_bin, PARASITEMIA_DISPLAY_CAP);
        assert_relative_eq!(top.unwrap().value, 0.1);

        assert!(prevalence_rows(&summary_report(), "Missing Channel").is_err());
    }

    #[test]
    fn test_prevalence_above_detection() {
        let rows = prevalence_rows(&summary_report(), SMEARED_TRUE_PFPR_CHANNEL).unwrap();
        let prevalence = prevalence_above_detection(&rows);
        assert_eq!(prevalence.len(), 3 * 2);
        assert_eq!(prevalence[0].age, 5.0);
        assert_eq!(prevalence[0].day, 0);
        assert_relative_eq!(prevalence[0].prevalence, 0.65, epsilon = 1e-12);
        assert_relative_eq!(prevalence[5].prevalence, 0.5, epsilon = 1e-12);
        assert!(prevalence_above_detection(&[]).is_empty());
    }

    #[test]
    fn test_run_stats() {
        let stats = run_stats(&[0.2, 0.4, 0.9]).unwrap();
        assert_eq!(stats.min, 0.2);
        assert_eq!(stats.max, 0.9);
        assert_relative_eq!(stats.mean, 0.5, epsilon = 1e-12);
        assert!(run_stats(&[]).is_none());
    }

    #[test]
    fn test_infection_durations_skip_negative_patients() {
        let report: PatientReport = serde_json::from_value(json!({
            "patient_array": [
                {"id": 1, "initial_age": 20, "true_asexual_parasites": [[0.0, 10.0, 3.0, 0.0]]},
                {"id": 2, "true_asexual_parasites": [[0.0, 0.0, 0.0, 0.0]]},
                {"id": 3, "true_asexual_parasites": [[5.0, 0.0, 0.0, 1.0]]}
            ]
        }))
        .unwrap();
        let durations = infection_durations(&report, TRUE_ASEXUAL_PARASITES).unwrap();
        assert_eq!(durations, vec![2, 3]);
        assert!(infection_durations(&report, "true_gametocytes").is_err());
    }

    #[test]
    fn test_duration_histogram() {
        let edges = linspace(0.0, 365.0, 12);
        assert_eq!(edges.len(), 12);
        assert_eq!(edges[11], 365.0);

        let summary = summarize_durations(&[0, 10, 40, 365, 400], edges);
        assert_eq!(summary.count, 5);
        assert_relative_eq!(summary.mean, 163.0);
        assert_eq!(summary.histogram.len(), 11);
        assert_eq!(summary.histogram[0], 2);
        assert_eq!(summary.histogram[1], 1);
        assert_eq!(summary.histogram[10], 1);
        assert_eq!(summary.histogram.iter().sum::<usize>(), 4);
    }
}
