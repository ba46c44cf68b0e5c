//! Malaria disease and drug parameter sets.

use serde_json::{Map, Value, json};

pub fn disease_params() -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("Malaria_Model".to_string(), json!("MALARIA_MECHANISTIC_MODEL"));
    params.insert(
        "Malaria_Strain_Model".to_string(),
        json!("FALCIPARUM_RANDOM_STRAIN"),
    );
    params
}

/// Disease parameters with concentration-versus-time drug PKPD.
pub fn drug_params() -> Map<String, Value> {
    let mut params = disease_params();
    params.insert("PKPD_Model".to_string(), json!("CONCENTRATION_VERSUS_TIME"));
    params.insert("Genome_Markers".to_string(), json!([]));
    params
}

/// Drug parameters with adaptive immunity switched off.
pub fn innate_only() -> Map<String, Value> {
    let mut params = drug_params();
    for name in [
        "Antibody_Capacity_Growth_Rate",
        "Max_MSP1_Antibody_Growthrate",
        "Min_Adapted_Response",
    ] {
        params.insert(name.to_string(), json!(0));
    }
    params
}
