use serde_json::{Map, json};

use super::{SiteMetadata, StudySite};
use crate::bins::BinSpec;
use crate::error::Result;
use crate::seasons::{Month, SeasonMonthMap};
use crate::setup::{SummaryReportSpec, config_setup_fn, summary_report_fn, update_params_fn};

/// Birth cohort at Rafin Marke (Garki project), compared on the `(0, 1]` age
/// bin only. Counts come from the Garki parasitology CSV, attached with
/// [`StudySite::with_reference`].
pub fn rafin_marke_babies() -> Result<StudySite> {
    let metadata = SiteMetadata {
        village: "Matsari".to_string(),
        parasitemia_bins: BinSpec::new(vec![0.0, 16.0, 70.0, 409.0, f64::INFINITY])?,
        age_bins: BinSpec::new(vec![0.0, 1.0, 4.0, 8.0, 18.0, 28.0, 43.0, f64::INFINITY])?,
        seasons: vec!["DC2".to_string(), "DH2".to_string(), "W2".to_string()],
        seasons_by_month: SeasonMonthMap::new([
            (Month::May, "DH2"),
            (Month::September, "W2"),
            (Month::January, "DC2"),
        ])?,
    };

    let mut cohort = Map::new();
    cohort.insert(
        "Demographics_Filenames".to_string(),
        json!(["Calibration\\birth_cohort_demographics_babies.json"]),
    );
    cohort.insert(
        "Age_Initialization_Distribution_Type".to_string(),
        json!("DISTRIBUTION_SIMPLE"),
    );
    cohort.insert("Base_Population_Scale_Factor".to_string(), json!(10));
    cohort.insert("Birth_Rate_Dependence".to_string(), json!("FIXED_BIRTH_RATE"));
    cohort.insert(
        "Death_Rate_Dependence".to_string(),
        json!("NONDISEASE_MORTALITY_OFF"),
    );
    cohort.insert("Enable_Birth".to_string(), json!(1));
    cohort.insert("Enable_Vital_Dynamics".to_string(), json!(1));
    cohort.insert("Maternal_Antibodies_Type".to_string(), json!("SIMPLE_WANING"));

    let setup = vec![
        config_setup_fn(365 * 2),
        summary_report_fn(SummaryReportSpec {
            start: 365.0,
            interval: 365.0 / 12.0,
            description: "Monthly_Report".to_string(),
            parasitemia_bins: vec![0.0, 16.0, 70.0, 409.0, 4000000.0],
            age_bins: vec![1.0, 4.0, 8.0, 18.0, 28.0, 43.0, 400000.0],
        }),
        update_params_fn(cohort),
    ];

    Ok(StudySite::new("Rafin_Marke_babies", metadata)
        .with_age_filter(1.0)
        .with_setup(setup))
}
