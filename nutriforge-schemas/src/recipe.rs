use crate::{concentration::RawWaterRecord, fertilizer::FertilizerDose};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhosphateSpecies {
    #[default]
    #[serde(alias = "h2po4")]
    H2PO4,
    #[serde(alias = "hpo4")]
    HPO4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilMode {
    #[default]
    #[serde(alias = "ackerland")]
    Arable,
    #[serde(alias = "gruenland", alias = "grünland", alias = "pasture")]
    Grassland,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SluijsmannConfig {
    #[serde(default)]
    pub mode: SoilMode,
    /// Overrides the nitrogen coefficient implied by `mode`.
    #[serde(default)]
    pub n: Option<f64>,
}

/// Switches that change how the engine interprets a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CalculationOptions {
    /// Count urea nitrogen as ammonium in the ion set.
    #[serde(default)]
    pub urea_as_nh4: bool,
    #[serde(default)]
    pub phosphate_species: PhosphateSpecies,
    #[serde(default)]
    pub sluijsmann: SluijsmannConfig,
}

/// A recipe file as written by users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default = "default_liters")]
    pub liters: f64,
    #[serde(default)]
    pub fertilizers: Vec<FertilizerDose>,
    #[serde(default)]
    pub water_profile: Option<String>,
    #[serde(default)]
    pub water_mg_per_l: Option<RawWaterRecord>,
    #[serde(default)]
    pub osmosis_percent: Option<f64>,
    #[serde(flatten)]
    pub options: CalculationOptions,
}

fn default_liters() -> f64 {
    10.0
}

/// Everything one calculation needs, with the water record already chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub liters: f64,
    #[serde(default)]
    pub fertilizers: Vec<FertilizerDose>,
    #[serde(default)]
    pub water_mg_per_l: RawWaterRecord,
    #[serde(default)]
    pub osmosis_percent: f64,
    #[serde(flatten)]
    pub options: CalculationOptions,
}

impl CalculationRequest {
    pub fn new(liters: f64) -> Self {
        Self {
            liters,
            fertilizers: Vec::new(),
            water_mg_per_l: RawWaterRecord::new(),
            osmosis_percent: 0.0,
            options: CalculationOptions::default(),
        }
    }

    pub fn with_dose(mut self, name: &str, grams: f64) -> Self {
        self.fertilizers.push(FertilizerDose::new(name, grams));
        self
    }

    pub fn with_water(mut self, water_mg_per_l: RawWaterRecord, osmosis_percent: f64) -> Self {
        self.water_mg_per_l = water_mg_per_l;
        self.osmosis_percent = osmosis_percent;
        self
    }

    pub fn with_options(mut self, options: CalculationOptions) -> Self {
        self.options = options;
        self
    }
}

impl Default for CalculationRequest {
    fn default() -> Self {
        Self::new(default_liters())
    }
}
