//! Simulation setup steps.
//!
//! A site's setup is an ordered list of functions applied to a [`SimConfig`].
//! Sites start from [`density_site_setup`] and append their own steps; a
//! later step overwrites whatever an earlier one wrote under the same key.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::sites::SiteMetadata;

/// Upper bound written in place of an infinite age bin.
pub const AGE_BIN_CAP: f64 = 400000.0;
/// Upper bound written in place of an infinite parasitemia bin.
pub const PARASITEMIA_BIN_CAP: f64 = 4000000.0;

/// Simulator parameters plus custom reports, keyed by report description.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimConfig {
    pub params: Map<String, Value>,
    pub reports: BTreeMap<String, Value>,
}

impl SimConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_params(params: Map<String, Value>) -> Self {
        Self {
            params,
            reports: BTreeMap::new(),
        }
    }

    pub fn set_param(&mut self, name: &str, value: impl Into<Value>) {
        self.params.insert(name.to_string(), value.into());
    }

    pub fn update_params(&mut self, params: &Map<String, Value>) {
        for (name, value) in params {
            self.params.insert(name.clone(), value.clone());
        }
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn add_report(&mut self, description: &str, report: Value) {
        self.reports.insert(description.to_string(), report);
    }
}

#[derive(Clone)]
pub struct SetupFn(Arc<dyn Fn(&mut SimConfig) + Send + Sync>);

impl SetupFn {
    pub fn new(f: impl Fn(&mut SimConfig) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn apply(&self, config: &mut SimConfig) {
        (self.0)(config)
    }
}

impl fmt::Debug for SetupFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SetupFn")
    }
}

pub fn apply_all(steps: &[SetupFn], config: &mut SimConfig) {
    for step in steps {
        step.apply(config);
    }
}

pub fn config_setup_fn(duration: u32) -> SetupFn {
    SetupFn::new(move |config| config.set_param("Simulation_Duration", duration))
}

pub fn update_params_fn(params: Map<String, Value>) -> SetupFn {
    SetupFn::new(move |config| config.update_params(&params))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReportSpec {
    pub start: f64,
    pub interval: f64,
    pub description: String,
    pub parasitemia_bins: Vec<f64>,
    pub age_bins: Vec<f64>,
}

/// Empty bin lists are left out so the simulator falls back to its defaults.
pub fn summary_report_fn(spec: SummaryReportSpec) -> SetupFn {
    SetupFn::new(move |config| {
        let mut report = Map::new();
        report.insert("class".to_string(), json!("MalariaSummaryReport"));
        report.insert("Start_Day".to_string(), json!(spec.start));
        report.insert("Reporting_Interval".to_string(), json!(spec.interval));
        report.insert("Description".to_string(), json!(spec.description));
        if !spec.parasitemia_bins.is_empty() {
            report.insert("Parasitemia_Bins".to_string(), json!(spec.parasitemia_bins));
        }
        if !spec.age_bins.is_empty() {
            report.insert("Age_Bins".to_string(), json!(spec.age_bins));
        }
        config.add_report(&spec.description, Value::Object(report));
    })
}

/// Steps shared by every density site: a monthly summary report over the
/// site's own bins.
pub fn density_site_setup(metadata: &SiteMetadata) -> Vec<SetupFn> {
    vec![summary_report_fn(SummaryReportSpec {
        start: 1.0,
        interval: 365.0 / 12.0,
        description: "Monthly_Report".to_string(),
        parasitemia_bins: metadata.parasitemia_bins.capped(PARASITEMIA_BIN_CAP),
        age_bins: metadata.age_bins.capped(AGE_BIN_CAP),
    })]
}
