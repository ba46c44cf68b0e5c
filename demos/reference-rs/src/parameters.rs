use malaria_calib::{SimConfig, params};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Parameters {
    /// Built-in site name; ignored when a `site` file is supplied.
    #[serde(default)]
    pub site: Option<String>,
    /// Parameter set the site setup starts from.
    #[serde(default)]
    pub base_params: BaseParams,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseParams {
    #[default]
    Disease,
    Drug,
    InnateOnly,
}

impl BaseParams {
    /// A fresh simulator config holding this parameter set.
    pub fn config(self) -> SimConfig {
        let params = match self {
            BaseParams::Disease => params::disease_params(),
            BaseParams::Drug => params::drug_params(),
            BaseParams::InnateOnly => params::innate_only(),
        };
        SimConfig::from_params(params)
    }
}
