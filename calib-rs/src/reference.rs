//! Reference tables: field counts reshaped for comparison against simulator
//! output.
//!
//! Raw data comes in as season -> channel -> (age bin x density bin) count
//! matrices. [`ReferenceTableBuilder`] flattens that into one row per
//! `(Channel, Date, Age Bin, density bin)`, with each row's count turned into
//! its share of the `(Channel, Date, Age Bin)` group total.

use std::collections::{BTreeMap, BTreeSet};
use std::io;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::bins::BinSpec;
use crate::error::{CalibError, Result};
use crate::seasons::SeasonMonthMap;

pub const DEFAULT_DENSITY_LABEL: &str = "PfPR Bin";

/// Rows are age bins, columns are density bins.
pub type CountMatrix = Vec<Vec<u64>>;

fn default_density_label() -> String {
    DEFAULT_DENSITY_LABEL.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceBins {
    pub age: BinSpec,
    pub density: BinSpec,
    #[serde(default = "default_density_label")]
    pub density_label: String,
}

impl ReferenceBins {
    pub fn new(age: BinSpec, density: BinSpec) -> Self {
        Self {
            age,
            density,
            density_label: default_density_label(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawCountTable(BTreeMap<String, BTreeMap<String, CountMatrix>>);

impl RawCountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        season: impl Into<String>,
        channel: impl Into<String>,
        matrix: CountMatrix,
    ) {
        self.0
            .entry(season.into())
            .or_default()
            .insert(channel.into(), matrix);
    }

    pub fn seasons(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn matrix(&self, season: &str, channel: &str) -> Option<&CountMatrix> {
        self.0.get(season).and_then(|c| c.get(channel))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }

    /// Loads the long-form variant of a count table.
    ///
    /// Expects the columns `Season`, `Channel`, `Age Bin`, the density label
    /// of `bins` and `Counts`. Bin columns hold bin upper bounds; repeated
    /// cells are summed.
    pub fn from_csv<R: io::Read>(reader: R, bins: &ReferenceBins) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CalibError::InvalidInput(format!("missing CSV column {name:?}")))
        };
        let season_col = column("Season")?;
        let channel_col = column("Channel")?;
        let age_col = column("Age Bin")?;
        let density_col = column(&bins.density_label)?;
        let counts_col = column("Counts")?;

        let mut table = RawCountTable::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record?;
            let field = |i: usize| record.get(i).unwrap_or_default();
            let age_index = lookup_bin(&bins.age, "Age Bin", field(age_col))?;
            let density_index =
                lookup_bin(&bins.density, &bins.density_label, field(density_col))?;
            let count: u64 = field(counts_col).parse().map_err(|_| {
                CalibError::InvalidInput(format!(
                    "row {}: Counts value {:?} is not a whole number",
                    line + 1,
                    field(counts_col)
                ))
            })?;

            let matrix = table
                .0
                .entry(field(season_col).to_string())
                .or_default()
                .entry(field(channel_col).to_string())
                .or_insert_with(|| vec![vec![0; bins.density.len()]; bins.age.len()]);
            matrix[age_index][density_index] += count;
        }
        log::debug!(
            "loaded count table with {} seasons from CSV",
            table.0.len()
        );
        Ok(table)
    }
}

fn lookup_bin(spec: &BinSpec, axis: &str, text: &str) -> Result<usize> {
    let value: f64 = text.parse().map_err(|_| {
        CalibError::InvalidInput(format!("{axis} value {text:?} is not a number"))
    })?;
    spec.position(value).ok_or_else(|| CalibError::UnknownBin {
        axis: axis.to_string(),
        value,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongFormRow {
    pub channel: String,
    pub date: u32,
    pub age_index: usize,
    pub age_bin: f64,
    pub density_index: usize,
    pub density_bin: f64,
    /// Share of the group total, in `[0, 1]`.
    pub counts: f64,
    /// Un-normalized group total, the same for every row of the group.
    pub counts_total: u64,
}

impl LongFormRow {
    fn key(&self) -> (&str, u32, usize, usize) {
        (
            self.channel.as_str(),
            self.date,
            self.age_index,
            self.density_index,
        )
    }
}

/// Normalized long-form reference data, sorted by
/// `(Channel, Date, Age Bin, density bin)` with bins ordered by position.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    density_label: String,
    rows: Vec<LongFormRow>,
}

impl ReferenceTable {
    pub fn rows(&self) -> &[LongFormRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn density_label(&self) -> &str {
        &self.density_label
    }

    pub fn get(
        &self,
        channel: &str,
        date: u32,
        age_index: usize,
        density_index: usize,
    ) -> Option<&LongFormRow> {
        let key = (channel, date, age_index, density_index);
        self.rows
            .binary_search_by(|row| row.key().cmp(&key))
            .ok()
            .map(|i| &self.rows[i])
    }

    pub fn group_total(&self, channel: &str, date: u32, age_index: usize) -> Option<u64> {
        self.get(channel, date, age_index, 0)
            .map(|row| row.counts_total)
    }

    pub fn channels(&self) -> Vec<&str> {
        let mut channels: Vec<&str> = self.rows.iter().map(|r| r.channel.as_str()).collect();
        channels.dedup();
        channels
    }

    pub fn dates(&self) -> Vec<u32> {
        self.rows
            .iter()
            .map(|r| r.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn headers(&self) -> [&str; 6] {
        [
            "Channel",
            "Date",
            "Age Bin",
            self.density_label.as_str(),
            "Counts",
            "Counts_tot",
        ]
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.headers())?;
        for record in self.records() {
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                vec![
                    row.channel.clone(),
                    row.date.to_string(),
                    row.age_bin.to_string(),
                    row.density_bin.to_string(),
                    row.counts.to_string(),
                    row.counts_total.to_string(),
                ]
            })
            .collect()
    }

    /// SHA-256 of the CSV rendering, hex encoded.
    pub fn digest(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(hex::encode(Sha256::digest(&buf)))
    }
}

pub struct ReferenceTableBuilder<'a> {
    site: &'a str,
    bins: &'a ReferenceBins,
    seasons: &'a SeasonMonthMap,
    age_filter: Option<usize>,
}

impl<'a> ReferenceTableBuilder<'a> {
    pub fn new(site: &'a str, bins: &'a ReferenceBins, seasons: &'a SeasonMonthMap) -> Self {
        Self {
            site,
            bins,
            seasons,
            age_filter: None,
        }
    }

    /// Builds only the age bin whose upper bound is `bound`; other age bins
    /// are dropped before normalization.
    pub fn only_age_bin(mut self, bound: f64) -> Result<Self> {
        let index = self
            .bins
            .age
            .position(bound)
            .ok_or_else(|| CalibError::UnknownBin {
                axis: "Age Bin".to_string(),
                value: bound,
            })?;
        self.age_filter = Some(index);
        Ok(self)
    }

    pub fn build(&self, raw: &RawCountTable) -> Result<ReferenceTable> {
        if raw.is_empty() {
            return Err(CalibError::EmptyReferenceData {
                site: self.site.to_string(),
            });
        }

        log::debug!(
            "{}: age bins {}, {} {}",
            self.site,
            self.bins.age,
            self.bins.density_label,
            self.bins.density
        );

        // (channel, date, age index) -> counts across density bins
        let mut groups: BTreeMap<(&str, u32, usize), &[u64]> = BTreeMap::new();
        let mut expected_channels: Option<BTreeSet<&str>> = None;

        for (season, channels) in &raw.0 {
            let names: BTreeSet<&str> = channels.keys().map(String::as_str).collect();
            let expected = expected_channels.get_or_insert_with(|| names.clone());
            if *expected != names {
                return Err(CalibError::InconsistentChannels {
                    site: self.site.to_string(),
                    season: season.clone(),
                });
            }

            let date = self.seasons.date_for(season).ok_or_else(|| {
                CalibError::MissingSeasonMapping {
                    site: self.site.to_string(),
                    season: season.clone(),
                }
            })?;
            log::debug!("{}: season {season} -> date {date}", self.site);

            for (channel, matrix) in channels {
                self.check_shape(season, channel, matrix)?;
                for (age_index, counts) in matrix.iter().enumerate() {
                    if self.age_filter.is_some_and(|keep| keep != age_index) {
                        continue;
                    }
                    // Season labels map to distinct months, so keys never collide.
                    groups.insert((channel.as_str(), date, age_index), counts.as_slice());
                }
            }
        }

        let mut rows = Vec::with_capacity(groups.len() * self.bins.density.len());
        for ((channel, date, age_index), counts) in groups {
            let total: u64 = counts.iter().sum();
            if total == 0 {
                return Err(CalibError::ZeroTotalNormalization {
                    site: self.site.to_string(),
                    channel: channel.to_string(),
                    date,
                    age_bin: self.bins.age.bound(age_index),
                });
            }
            for (density_index, count) in counts.iter().enumerate() {
                rows.push(LongFormRow {
                    channel: channel.to_string(),
                    date,
                    age_index,
                    age_bin: self.bins.age.bound(age_index),
                    density_index,
                    density_bin: self.bins.density.bound(density_index),
                    counts: *count as f64 / total as f64,
                    counts_total: total,
                });
            }
        }

        log::info!(
            "{}: built reference table with {} rows",
            self.site,
            rows.len()
        );
        Ok(ReferenceTable {
            density_label: self.bins.density_label.clone(),
            rows,
        })
    }

    fn check_shape(&self, season: &str, channel: &str, matrix: &CountMatrix) -> Result<()> {
        let expected_rows = self.bins.age.len();
        let expected_cols = self.bins.density.len();
        let bad_row = matrix.iter().find(|row| row.len() != expected_cols);
        if matrix.len() != expected_rows || bad_row.is_some() {
            return Err(CalibError::ShapeMismatch {
                site: self.site.to_string(),
                season: season.to_string(),
                channel: channel.to_string(),
                expected_rows,
                expected_cols,
                rows: matrix.len(),
                cols: bad_row
                    .or(matrix.first())
                    .map_or(0, |row| row.len()),
            });
        }
        Ok(())
    }
}
