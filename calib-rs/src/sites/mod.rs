//! Study sites: field reference data plus the simulation setup used to
//! reproduce it.

mod dapelogo;
mod laye;
mod rafin_marke;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use dapelogo::dapelogo;
pub use laye::laye;
pub use rafin_marke::rafin_marke_babies;

use crate::bins::BinSpec;
use crate::error::{CalibError, Result};
use crate::reference::{RawCountTable, ReferenceBins, ReferenceTable, ReferenceTableBuilder};
use crate::seasons::{Month, SeasonMonthMap};
use crate::setup::{self, SetupFn, SimConfig};

pub const BUILTIN_SITES: [&str; 3] = ["Dapelogo", "Laye", "Rafin_Marke_babies"];

pub const PARASITEMIA_CHANNEL: &str = "Smeared PfPR by Parasitemia and Age Bin";
pub const GAMETOCYTEMIA_CHANNEL: &str = "Smeared PfPR by Gametocytemia and Age Bin";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteMetadata {
    pub village: String,
    pub parasitemia_bins: BinSpec,
    pub age_bins: BinSpec,
    pub seasons: Vec<String>,
    pub seasons_by_month: SeasonMonthMap,
}

#[derive(Debug, Clone)]
pub struct StudySite {
    name: String,
    metadata: SiteMetadata,
    reference: Option<RawCountTable>,
    age_filter: Option<f64>,
    setup: Vec<SetupFn>,
}

impl StudySite {
    pub fn new(name: impl Into<String>, metadata: SiteMetadata) -> Self {
        Self {
            name: name.into(),
            metadata,
            reference: None,
            age_filter: None,
            setup: Vec::new(),
        }
    }

    pub fn with_reference(mut self, raw: RawCountTable) -> Self {
        self.reference = Some(raw);
        self
    }

    /// Restrict the reference table to the age bin with this upper bound.
    pub fn with_age_filter(mut self, bound: f64) -> Self {
        self.age_filter = Some(bound);
        self
    }

    /// Steps run after the shared density-site setup.
    pub fn with_setup(mut self, steps: Vec<SetupFn>) -> Self {
        self.setup.extend(steps);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &SiteMetadata {
        &self.metadata
    }

    pub fn reference_bins(&self) -> ReferenceBins {
        ReferenceBins::new(
            self.metadata.age_bins.clone(),
            self.metadata.parasitemia_bins.clone(),
        )
    }

    pub fn reference_data(&self) -> Result<ReferenceTable> {
        let raw = self
            .reference
            .as_ref()
            .ok_or_else(|| CalibError::MissingReferenceData {
                site: self.name.clone(),
            })?;
        let bins = self.reference_bins();
        let mut builder =
            ReferenceTableBuilder::new(&self.name, &bins, &self.metadata.seasons_by_month);
        if let Some(bound) = self.age_filter {
            builder = builder.only_age_bin(bound)?;
        }
        builder.build(raw)
    }

    pub fn setup_functions(&self) -> Vec<SetupFn> {
        let mut steps = setup::density_site_setup(&self.metadata);
        steps.extend(self.setup.iter().cloned());
        steps
    }

    /// Applies every setup step to `config`.
    pub fn configure(&self, config: &mut SimConfig) {
        let steps = self.setup_functions();
        setup::apply_all(&steps, config);
        log::info!("{}: applied {} setup steps", self.name, steps.len());
    }
}

/// (season, parasitemia counts, gametocytemia counts), 3 age bins x 6 density bins.
type OuedraogoCounts = [(&'static str, [[u64; 6]; 3], [[u64; 6]; 3]); 3];

/// The Burkina Faso villages of Ouedraogo et al. share bins and collection
/// months and differ only in their counts.
fn ouedraogo_site(village: &str, counts: &OuedraogoCounts) -> Result<StudySite> {
    let metadata = SiteMetadata {
        village: village.to_string(),
        parasitemia_bins: BinSpec::new(vec![0.0, 50.0, 500.0, 5000.0, 50000.0, f64::INFINITY])?,
        age_bins: BinSpec::new(vec![5.0, 15.0, f64::INFINITY])?,
        seasons: ["end_wet", "start_wet", "peak_wet"]
            .map(String::from)
            .to_vec(),
        // Collection dates: 29 Jun - 30 Jul 2007, 3 Sep - 9 Oct 2007,
        // 10 Jan - 2 Feb 2008.
        seasons_by_month: SeasonMonthMap::new([
            (Month::July, "start_wet"),
            (Month::September, "peak_wet"),
            (Month::January, "end_wet"),
        ])?,
    };

    let mut raw = RawCountTable::new();
    for (season, parasitemia, gametocytemia) in counts {
        raw.insert(
            *season,
            PARASITEMIA_CHANNEL,
            parasitemia.iter().map(|row| row.to_vec()).collect(),
        );
        raw.insert(
            *season,
            GAMETOCYTEMIA_CHANNEL,
            gametocytemia.iter().map(|row| row.to_vec()).collect(),
        );
    }
    Ok(StudySite::new(village, metadata).with_reference(raw))
}

pub fn builtin(name: &str) -> Result<StudySite> {
    match name.to_ascii_lowercase().as_str() {
        "dapelogo" => dapelogo(),
        "laye" => laye(),
        "rafin_marke_babies" => rafin_marke_babies(),
        _ => Err(CalibError::UnknownSite(name.to_string())),
    }
}

/// A site kept outside the crate, usually as TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteDefinition {
    pub name: String,
    pub metadata: SiteMetadata,
    #[serde(default)]
    pub reference: Option<RawCountTable>,
    #[serde(default)]
    pub age_filter: Option<f64>,
    #[serde(default)]
    pub simulation_duration: Option<u32>,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl SiteDefinition {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn into_site(self) -> StudySite {
        let mut steps = Vec::new();
        if let Some(duration) = self.simulation_duration {
            steps.push(setup::config_setup_fn(duration));
        }
        if !self.params.is_empty() {
            steps.push(setup::update_params_fn(self.params));
        }

        let mut site = StudySite::new(self.name, self.metadata).with_setup(steps);
        if let Some(raw) = self.reference {
            site = site.with_reference(raw);
        }
        if let Some(bound) = self.age_filter {
            site = site.with_age_filter(bound);
        }
        site
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn assert_normalized(table: &ReferenceTable) {
        let mut shares: BTreeMap<(&str, u32, usize), f64> = BTreeMap::new();
        for row in table.rows() {
            *shares
                .entry((row.channel.as_str(), row.date, row.age_index))
                .or_default() += row.counts;
            assert!((0.0..=1.0).contains(&row.counts));
        }
        for share in shares.values() {
            assert_relative_eq!(*share, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_dapelogo_reference() {
        let table = dapelogo().unwrap().reference_data().unwrap();
        assert_eq!(table.len(), 2 * 3 * 3 * 6);
        assert_eq!(table.dates(), vec![15, 195, 255]);
        assert_normalized(&table);

        // start_wet, age (, 5]: [1, 0, 0, 2, 2, 3]
        assert_eq!(table.group_total(PARASITEMIA_CHANNEL, 195, 0), Some(8));
        let row = table.get(PARASITEMIA_CHANNEL, 195, 0, 5).unwrap();
        assert_relative_eq!(row.counts, 3.0 / 8.0);
        assert!(row.density_bin.is_infinite());
    }

    #[test]
    fn test_laye_reference() {
        let table = laye().unwrap().reference_data().unwrap();
        assert_eq!(table.len(), 108);
        assert_normalized(&table);
        // peak_wet, age (5, 15]: [13, 1, 0, 3, 0, 1]
        assert_eq!(table.group_total(PARASITEMIA_CHANNEL, 255, 1), Some(18));
        // end_wet gametocytemia, age (, 5]: [1, 0, 0, 1, 0, 0]
        assert_eq!(table.group_total(GAMETOCYTEMIA_CHANNEL, 15, 0), Some(2));
    }

    #[test]
    fn test_sites_differ_only_in_counts() {
        let dapelogo = dapelogo().unwrap();
        let laye = laye().unwrap();
        assert_eq!(dapelogo.metadata().age_bins, laye.metadata().age_bins);
        assert_eq!(
            dapelogo.metadata().seasons_by_month,
            laye.metadata().seasons_by_month
        );
        assert_ne!(
            dapelogo.reference_data().unwrap(),
            laye.reference_data().unwrap()
        );
    }

    #[test]
    fn test_builtin_lookup() {
        for name in BUILTIN_SITES {
            assert_eq!(builtin(name).unwrap().name(), name);
        }
        assert_eq!(builtin("LAYE").unwrap().name(), "Laye");
        assert!(matches!(builtin("Namawala"), Err(CalibError::UnknownSite(_))));
    }

    #[test]
    fn test_rafin_marke_needs_attached_counts() {
        let site = rafin_marke_babies().unwrap();
        assert!(matches!(
            site.reference_data(),
            Err(CalibError::MissingReferenceData { .. })
        ));

        let bins = site.reference_bins();
        let csv = "Season,Channel,Age Bin,PfPR Bin,Counts\n\
                   DC2,PfPR by Parasitemia and Age Bin,1,0,4\n\
                   DC2,PfPR by Parasitemia and Age Bin,1,16,1\n\
                   DC2,PfPR by Parasitemia and Age Bin,4,0,2\n\
                   DC2,PfPR by Parasitemia and Age Bin,4,inf,2\n\
                   W2,PfPR by Parasitemia and Age Bin,1,70,3\n";
        let raw = RawCountTable::from_csv(csv.as_bytes(), &bins).unwrap();

        // W2 has no counts outside the (0, 1] bin; those groups are dropped
        // before normalization rather than failing on a zero total
        let table = site.with_reference(raw).reference_data().unwrap();
        assert_eq!(table.len(), 2 * 5);
        assert!(table.rows().iter().all(|r| r.age_bin == 1.0));
        assert_eq!(table.dates(), vec![15, 255]);
        assert_eq!(table.group_total("PfPR by Parasitemia and Age Bin", 15, 1), Some(5));
        assert_relative_eq!(
            table.get("PfPR by Parasitemia and Age Bin", 255, 1, 2).unwrap().counts,
            1.0
        );
        assert_normalized(&table);
    }

    #[test]
    fn test_rafin_marke_setup_overrides_base_report() {
        let site = rafin_marke_babies().unwrap();
        let mut config = SimConfig::new();
        site.configure(&mut config);

        assert_eq!(config.param("Simulation_Duration"), Some(&json!(730)));
        assert_eq!(config.param("Enable_Birth"), Some(&json!(1)));
        assert_eq!(
            config.param("Maternal_Antibodies_Type"),
            Some(&json!("SIMPLE_WANING"))
        );
        assert_eq!(config.reports.len(), 1);
        let report = &config.reports["Monthly_Report"];
        assert_eq!(report["Start_Day"], json!(365.0));
        assert_eq!(report["Age_Bins"][6], json!(400000.0));
    }

    #[test]
    fn test_base_setup_caps_infinite_bins() {
        let mut config = SimConfig::new();
        laye().unwrap().configure(&mut config);
        let report = &config.reports["Monthly_Report"];
        assert_eq!(report["Start_Day"], json!(1.0));
        assert_eq!(report["Age_Bins"], json!([5.0, 15.0, 400000.0]));
        assert_eq!(report["Parasitemia_Bins"][5], json!(4000000.0));
    }

    #[test]
    fn test_site_definition_from_toml() {
        let text = r#"
            name = "Sugungum"
            simulation_duration = 1095
            age_filter = 15

            [metadata]
            village = "Sugungum"
            age_bins = [5, 15, inf]
            parasitemia_bins = [50, 500, inf]
            seasons = ["wet", "dry"]

            [metadata.seasons_by_month]
            August = "wet"
            February = "dry"

            [reference.wet]
            "Smeared PfPR by Parasitemia and Age Bin" = [[1, 2, 3], [4, 5, 6], [7, 8, 9]]

            [reference.dry]
            "Smeared PfPR by Parasitemia and Age Bin" = [[3, 2, 1], [6, 5, 4], [9, 8, 7]]

            [params]
            Enable_Vital_Dynamics = 0
        "#;
        let site = SiteDefinition::from_toml_str(text).unwrap().into_site();
        assert_eq!(site.name(), "Sugungum");

        let table = site.reference_data().unwrap();
        assert_eq!(table.len(), 2 * 3);
        assert_eq!(table.dates(), vec![45, 225]);
        assert_eq!(table.group_total(PARASITEMIA_CHANNEL, 225, 1), Some(15));

        let mut config = SimConfig::new();
        site.configure(&mut config);
        assert_eq!(config.param("Simulation_Duration"), Some(&json!(1095)));
        assert_eq!(config.param("Enable_Vital_Dynamics"), Some(&json!(0)));
    }

    #[test]
    fn test_site_definition_rejects_ambiguous_months() {
        let text = r#"
            name = "Bad"

            [metadata]
            village = "Bad"
            age_bins = [inf]
            parasitemia_bins = [inf]
            seasons = ["wet"]

            [metadata.seasons_by_month]
            July = "wet"
            August = "wet"
        "#;
        assert!(SiteDefinition::from_toml_str(text).is_err());
    }
}
