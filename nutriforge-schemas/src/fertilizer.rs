use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicalForm {
    #[default]
    #[serde(alias = "fest")]
    Solid,
    #[serde(alias = "flüssig", alias = "fluessig")]
    Liquid,
}

/// A catalog entry: guaranteed composition of one fertilizer product.
///
/// `composition_percent` maps an assay column (`NO3`, `NH4`, `Ur-N` as
/// nitrogen mass, oxides such as `P2O5`/`K2O`, ions such as `SO4`, or plain
/// elements such as `Ca`) to mass percent of the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fertilizer {
    pub name: String,
    #[serde(default)]
    pub form: PhysicalForm,
    /// Purity/density factor applied to the dosed mass (1.0 for most solids).
    #[serde(default = "default_weight_factor")]
    pub weight_factor: f64,
    pub composition_percent: BTreeMap<String, f64>,
}

fn default_weight_factor() -> f64 {
    1.0
}

/// One line of a recipe: a fertilizer name and the grams dosed into the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerDose {
    pub name: String,
    pub grams: f64,
}

impl FertilizerDose {
    pub fn new(name: &str, grams: f64) -> Self {
        Self {
            name: name.to_string(),
            grams,
        }
    }
}
