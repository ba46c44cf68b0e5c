//! Bin boundaries for age and parasite density.
//!
//! A [`BinSpec`] is an ascending list of upper bounds. Bin `i` covers
//! `(bound(i - 1), bound(i)]`, and the first bin is open below.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CalibError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bound>", into = "Vec<Bound>")]
pub struct BinSpec(Vec<f64>);

/// One bound as written in a config file. JSON has no infinity literal, so
/// `"inf"` is accepted as text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Number(f64),
    Text(String),
}

impl Bound {
    pub fn value(&self) -> Result<f64> {
        match self {
            Bound::Number(value) => Ok(*value),
            Bound::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "inf" | "+inf" | "infinity" | "+infinity" => Ok(f64::INFINITY),
                _ => Err(CalibError::InvalidBins {
                    reason: format!("cannot read {text:?} as a bin bound"),
                }),
            },
        }
    }
}

impl TryFrom<Vec<Bound>> for BinSpec {
    type Error = CalibError;

    fn try_from(bounds: Vec<Bound>) -> Result<Self> {
        let bounds = bounds
            .iter()
            .map(Bound::value)
            .collect::<Result<Vec<_>>>()?;
        BinSpec::new(bounds)
    }
}

impl From<BinSpec> for Vec<Bound> {
    fn from(spec: BinSpec) -> Self {
        spec.0
            .into_iter()
            .map(|b| {
                if b.is_infinite() {
                    Bound::Text("inf".to_string())
                } else {
                    Bound::Number(b)
                }
            })
            .collect()
    }
}

impl BinSpec {
    pub fn new(bounds: Vec<f64>) -> Result<Self> {
        if bounds.is_empty() {
            return Err(CalibError::InvalidBins {
                reason: "no bounds given".to_string(),
            });
        }
        if let Some(i) = bounds.iter().position(|b| b.is_nan()) {
            return Err(CalibError::InvalidBins {
                reason: format!("bound {i} is NaN"),
            });
        }
        if let Some(i) = bounds[..bounds.len() - 1]
            .iter()
            .position(|b| b.is_infinite())
        {
            return Err(CalibError::InvalidBins {
                reason: format!("only the last bound may be infinite, found one at {i}"),
            });
        }
        if let Some(w) = bounds.windows(2).find(|w| w[0] >= w[1]) {
            return Err(CalibError::InvalidBins {
                reason: format!("bounds must be strictly ascending, {} then {}", w[0], w[1]),
            });
        }
        Ok(Self(bounds))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bound(&self, index: usize) -> f64 {
        self.0[index]
    }

    pub fn bounds(&self) -> &[f64] {
        &self.0
    }

    /// Position of a bound given by value, as printed in a long-form table.
    pub fn position(&self, value: f64) -> Option<usize> {
        self.0.iter().position(|b| *b == value)
    }

    /// Bin containing `value`, or `None` past a finite last bound.
    pub fn index_of(&self, value: f64) -> Option<usize> {
        self.0.iter().position(|b| value <= *b)
    }

    /// Copy with a trailing infinity replaced by `cap`.
    pub fn capped(&self, cap: f64) -> Vec<f64> {
        self.0
            .iter()
            .map(|b| if b.is_infinite() { cap } else { *b })
            .collect()
    }
}

impl fmt::Display for BinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.0.iter().map(|b| b.to_string()).collect();
        write!(f, "[{}]", labels.join(", "))
    }
}
