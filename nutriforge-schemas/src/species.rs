use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesCategory {
    Element,
    Oxide,
    Ion,
    CompoundHelper,
}

/// A chemical entity identified by a stable symbol such as `NO3`, `K2O` or `Ca`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub symbol: String,
    pub molar_mass_g_per_mol: f64,
    /// Signed ionic charge. Only meaningful for species that occur as ions.
    #[serde(default)]
    pub valence: Option<i32>,
    pub category: SpeciesCategory,
}

impl Species {
    pub fn new(symbol: &str, molar_mass_g_per_mol: f64, category: SpeciesCategory) -> Self {
        Self {
            symbol: symbol.to_string(),
            molar_mass_g_per_mol,
            valence: None,
            category,
        }
    }
}
