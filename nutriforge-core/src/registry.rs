//! Molar mass and valence reference table.
//!
//! Loaded once, never mutated. Every conversion in the engine reads from a
//! shared `&MolarMassRegistry`.

use crate::error::NutriforgeError;
use nutriforge_schemas::{
    file_formats::SpeciesFile,
    species::{Species, SpeciesCategory},
};
use std::{collections::HashMap, fs, path::Path};

use SpeciesCategory::{CompoundHelper, Element, Ion, Oxide};

/// (symbol, g/mol, valence, category)
const BUILTIN_SPECIES: &[(&str, f64, Option<i32>, SpeciesCategory)] = &[
    ("N", 14.007, None, Element),
    ("P", 30.974, None, Element),
    ("K", 39.098, Some(1), Element),
    ("Ca", 40.078, Some(2), Element),
    ("Mg", 24.305, Some(2), Element),
    ("Na", 22.990, Some(1), Element),
    ("S", 32.065, None, Element),
    ("Cl", 35.453, Some(-1), Element),
    ("C", 12.011, None, Element),
    ("Si", 28.086, None, Element),
    ("Fe", 55.845, None, Element),
    ("Mn", 54.938, None, Element),
    ("Cu", 63.546, None, Element),
    ("Zn", 65.38, None, Element),
    ("B", 10.811, None, Element),
    ("Mo", 95.95, None, Element),
    ("O", 15.999, None, Element),
    ("H", 1.008, None, Element),
    ("P2O5", 141.943, None, Oxide),
    ("K2O", 94.196, None, Oxide),
    ("CaO", 56.077, None, Oxide),
    ("MgO", 40.304, None, Oxide),
    ("Na2O", 61.979, None, Oxide),
    ("SiO2", 60.084, None, Oxide),
    ("SO3", 80.063, None, Oxide),
    ("NH4", 18.038, Some(1), Ion),
    ("NO3", 62.004, Some(-1), Ion),
    ("NO2", 46.005, Some(-1), Ion),
    ("SO4", 96.06, Some(-2), Ion),
    ("PO4", 94.971, Some(-3), Ion),
    ("H2PO4", 96.987, Some(-1), Ion),
    ("HPO4", 95.979, Some(-2), Ion),
    ("HCO3", 61.017, Some(-1), Ion),
    ("CO3", 60.008, Some(-2), Ion),
    ("NH3", 17.031, None, CompoundHelper),
    ("CaCO3", 100.086, None, CompoundHelper),
    ("UREA", 60.056, None, CompoundHelper),
];

#[derive(Debug, Clone)]
pub struct MolarMassRegistry {
    species: HashMap<String, Species>,
}

impl MolarMassRegistry {
    /// The table every nutrient calculation needs, without touching disk.
    pub fn builtin() -> Self {
        let species = BUILTIN_SPECIES
            .iter()
            .map(|&(symbol, mass, valence, category)| {
                let mut s = Species::new(symbol, mass, category);
                s.valence = valence;
                (symbol.to_string(), s)
            })
            .collect();
        Self { species }
    }

    /// Builds a registry from external reference data.
    ///
    /// # Errors
    ///
    /// Fails when a molar mass is not a positive finite number or a symbol
    /// appears twice.
    pub fn from_species(list: Vec<Species>) -> Result<Self, NutriforgeError> {
        let mut species = HashMap::with_capacity(list.len());
        for s in list {
            if !s.molar_mass_g_per_mol.is_finite() || s.molar_mass_g_per_mol <= 0.0 {
                return Err(NutriforgeError::InvalidReferenceData(format!(
                    "molar mass of '{}' must be positive, got {}",
                    s.symbol, s.molar_mass_g_per_mol
                )));
            }
            if species.contains_key(&s.symbol) {
                return Err(NutriforgeError::DuplicateSpecies(s.symbol));
            }
            species.insert(s.symbol.clone(), s);
        }
        Ok(Self { species })
    }

    pub fn from_yaml_path(path: &Path) -> Result<Self, NutriforgeError> {
        let display = path.display().to_string();
        let content =
            fs::read_to_string(path).map_err(|e| NutriforgeError::FileIO(display.clone(), e))?;
        let file: SpeciesFile = serde_yaml::from_str(&content)
            .map_err(|e| NutriforgeError::YamlParsing(display, e))?;
        Self::from_species(file.species)
    }

    pub fn lookup(&self, symbol: &str) -> Option<&Species> {
        self.species.get(symbol)
    }

    pub fn molar_mass(&self, symbol: &str) -> Option<f64> {
        self.lookup(symbol).map(|s| s.molar_mass_g_per_mol)
    }

    pub fn valence(&self, symbol: &str) -> Option<i32> {
        self.lookup(symbol).and_then(|s| s.valence)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.species.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.species.values()
    }
}

impl Default for MolarMassRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
