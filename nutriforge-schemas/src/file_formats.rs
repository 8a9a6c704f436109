use crate::{fertilizer::Fertilizer, species::Species, water::WaterProfile};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SpeciesFile {
    pub schema_version: String,
    pub species: Vec<Species>,
}

#[derive(Debug, Deserialize)]
pub struct FertilizerFile {
    pub schema_version: String,
    pub fertilizers: Vec<Fertilizer>,
}

/// Water profiles are stored one per file, without a wrapper list.
pub type WaterProfileFile = WaterProfile;
