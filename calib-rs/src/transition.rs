//! Immune forcing of the parasite peak-density transition matrix.

use serde_json::{Map, Value, json};

use crate::error::{CalibError, Result};
use crate::setup::SimConfig;

/// Row `r` holds the weights of moving from density class `r` to each class.
/// Rows may differ in length.
pub type TransitionMatrix = Vec<Vec<f64>>;

pub const TRANSITION_MATRIX_PARAM: &str = "Parasite_Peak_Density_Probabilities";

/// Divides column `c >= 1` of every row at or above
/// `immune_stimulation_threshold` by `log10(row_scale * column_scale * c)`
/// and adds the absolute change of those columns to column 0.
///
/// A row keeps its total only while every divisor is at least 1, i.e. every
/// log argument is at least 10. Smaller factors grow the row. Column 0 is
/// never divided; its log argument would be zero.
pub fn probability_shifting(
    tm: &[Vec<f64>],
    immune_stimulation_threshold: usize,
    row_scale_factor: f64,
    column_scale_factor: f64,
) -> Result<TransitionMatrix> {
    let mut shifted = tm.to_vec();
    for (row_index, row) in tm.iter().enumerate().skip(immune_stimulation_threshold) {
        let Some(first) = row.first() else {
            continue;
        };

        let mut new_row = Vec::with_capacity(row.len());
        new_row.push(*first);
        let mut moved = 0.0;
        for (column, old) in row.iter().enumerate().skip(1) {
            let argument = row_scale_factor * column_scale_factor * column as f64;
            if argument <= 0.0 || argument == 1.0 || !argument.is_finite() {
                return Err(CalibError::InvalidRescaleDivisor {
                    row: row_index,
                    column,
                    argument,
                });
            }
            let new = old / argument.log10();
            moved += (new - old).abs();
            new_row.push(new);
        }
        new_row[0] += moved;
        log::debug!("row {row_index}: moved {moved} into column 0");
        shifted[row_index] = new_row;
    }
    Ok(shifted)
}

/// Writes the forced matrix into `config` and returns the sweep tags.
pub fn set_transition_matrix(
    config: &mut SimConfig,
    tm: &[Vec<f64>],
    scale_factor: f64,
    immune_stimulation_threshold: usize,
) -> Result<Map<String, Value>> {
    let shifted = probability_shifting(tm, immune_stimulation_threshold, scale_factor, scale_factor)?;
    config.set_param(TRANSITION_MATRIX_PARAM, json!(shifted));
    config.set_param(".Scale_Factor", scale_factor);

    let mut tags = Map::new();
    tags.insert("scale_factor".to_string(), json!(scale_factor));
    Ok(tags)
}
