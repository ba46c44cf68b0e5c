use thiserror::Error;

use crate::seasons::Month;

pub type Result<T> = std::result::Result<T, CalibError>;

#[derive(Debug, Error)]
pub enum CalibError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error(
        "{site}: season {season:?}, channel {channel:?} has a {rows}x{cols} count matrix, \
         expected {expected_rows}x{expected_cols}"
    )]
    ShapeMismatch {
        site: String,
        season: String,
        channel: String,
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },
    #[error("{site}: season {season:?} has no month in seasons_by_month")]
    MissingSeasonMapping { site: String, season: String },
    #[error("season {season:?} is mapped from more than one month: {months:?}")]
    AmbiguousSeasonMapping { season: String, months: Vec<Month> },
    #[error(
        "{site}: counts for channel {channel:?}, date {date}, age bin {age_bin} sum to zero"
    )]
    ZeroTotalNormalization {
        site: String,
        channel: String,
        date: u32,
        age_bin: f64,
    },
    #[error("{site}: season {season:?} does not carry the same channels as the other seasons")]
    InconsistentChannels { site: String, season: String },
    #[error("{site}: reference count table is empty")]
    EmptyReferenceData { site: String },
    #[error("{site}: no reference counts attached to this site")]
    MissingReferenceData { site: String },
    #[error("unknown month name {0:?}")]
    UnknownMonth(String),
    #[error("unknown study site {0:?}")]
    UnknownSite(String),
    #[error("invalid bins: {reason}")]
    InvalidBins { reason: String },
    #[error("{axis} value {value} is not one of the {axis} bin bounds")]
    UnknownBin { axis: String, value: f64 },
    #[error("row {row}, column {column}: log10 argument {argument} gives an unusable divisor")]
    InvalidRescaleDivisor {
        row: usize,
        column: usize,
        argument: f64,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no file registered under {0:?}")]
    MissingFile(String),
}
