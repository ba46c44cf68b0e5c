pub mod analysis;
pub mod bins;
pub mod environment;
pub mod error;
pub mod params;
pub mod reference;
pub mod seasons;
pub mod setup;
pub mod sites;
pub mod transition;

pub use bins::BinSpec;
pub use environment::Environment;
pub use error::{CalibError, Result};
pub use reference::{
    LongFormRow, RawCountTable, ReferenceBins, ReferenceTable, ReferenceTableBuilder,
};
pub use seasons::{Month, SeasonMonthMap};
pub use setup::{SetupFn, SimConfig};
pub use sites::{SiteDefinition, SiteMetadata, StudySite};
pub use transition::{TransitionMatrix, probability_shifting, set_transition_matrix};
