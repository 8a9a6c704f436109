//! Sluijsmann lime equivalent: the net acidifying (negative) or alkalizing
//! (positive) effect of a solution, expressed as mg CaO per liter.

use nutriforge_schemas::{
    concentration::{ElementReport, OxideReport},
    recipe::{SluijsmannConfig, SoilMode},
};
use serde::Serialize;
use std::collections::BTreeMap;

pub const SO3_FROM_SO4: f64 = 80.063 / 96.06;
pub const SO3_FROM_S: f64 = 80.063 / 32.065;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SluijsmannReport {
    pub mode: SoilMode,
    pub n: f64,
    pub e_mg_caoeq_per_l: f64,
    pub e_kg_caoeq_per_m3: f64,
    pub e_g_caoeq_for_batch: f64,
    pub inputs_mg_per_l: BTreeMap<String, f64>,
    pub terms_mg_per_l: BTreeMap<String, f64>,
}

fn default_n(mode: SoilMode) -> f64 {
    match mode {
        SoilMode::Arable => 1.0,
        SoilMode::Grassland => 0.8,
    }
}

fn resolve_so3(oxides: &OxideReport, elements: &ElementReport) -> f64 {
    if oxides.contains("SO3") {
        return oxides.get("SO3");
    }
    let so4 = oxides.get("SO4");
    if so4 != 0.0 {
        return so4 * SO3_FROM_SO4;
    }
    elements.get("S") * SO3_FROM_S
}

pub fn compute_sluijsmann(
    liters: f64,
    oxides: &OxideReport,
    elements: &ElementReport,
    config: &SluijsmannConfig,
) -> SluijsmannReport {
    let n = config.n.unwrap_or_else(|| default_n(config.mode));
    let cl = if oxides.get("Cl") != 0.0 {
        oxides.get("Cl")
    } else {
        elements.get("Cl")
    };
    let inputs: BTreeMap<String, f64> = [
        ("CaO", oxides.get("CaO")),
        ("MgO", oxides.get("MgO")),
        ("K2O", oxides.get("K2O")),
        ("Na2O", oxides.get("Na2O")),
        ("P2O5", oxides.get("P2O5")),
        ("SO3", resolve_so3(oxides, elements)),
        ("Cl", cl),
        ("N", elements.get("N_total")),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let terms: BTreeMap<String, f64> = [
        ("+CaO", inputs["CaO"]),
        ("+1.4*MgO", 1.4 * inputs["MgO"]),
        ("+0.6*K2O", 0.6 * inputs["K2O"]),
        ("+0.9*Na2O", 0.9 * inputs["Na2O"]),
        ("-0.4*P2O5", -0.4 * inputs["P2O5"]),
        ("-0.7*SO3", -0.7 * inputs["SO3"]),
        ("-0.8*Cl", -0.8 * inputs["Cl"]),
        ("-n*N", -n * inputs["N"]),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let e: f64 = terms.values().sum();
    SluijsmannReport {
        mode: config.mode,
        n,
        e_mg_caoeq_per_l: e,
        e_kg_caoeq_per_m3: e / 1000.0,
        e_g_caoeq_for_batch: e * liters / 1000.0,
        inputs_mg_per_l: inputs,
        terms_mg_per_l: terms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutriforge_schemas::concentration::Concentrations;

    fn reference_oxides() -> Concentrations {
        [
            ("CaO", 227.8977),
            ("MgO", 105.3953),
            ("K2O", 137.1243),
            ("Na2O", 7.1893),
            ("P2O5", 63.0),
            ("SO4", 257.0333),
            ("Cl", 10.6667),
        ]
        .into_iter()
        .collect()
    }

    fn reference_elements() -> Concentrations {
        [("N_total", 157.1558)].into_iter().collect()
    }

    #[test]
    fn arable_lime_equivalent() {
        let config = SluijsmannConfig {
            mode: SoilMode::Arable,
            n: None,
        };
        let report = compute_sluijsmann(10.0, &reference_oxides(), &reference_elements(), &config);
        assert!((report.inputs_mg_per_l["SO3"] - 214.2292).abs() < 1e-4);
        assert!((report.e_mg_caoeq_per_l - 123.3466).abs() < 1e-3);
        assert!((report.e_g_caoeq_for_batch - 1.233466).abs() < 1e-5);
        assert_eq!(report.n, 1.0);
    }

    #[test]
    fn grassland_lime_equivalent() {
        let config = SluijsmannConfig {
            mode: SoilMode::Grassland,
            n: None,
        };
        let report = compute_sluijsmann(10.0, &reference_oxides(), &reference_elements(), &config);
        assert!((report.e_mg_caoeq_per_l - 154.7777).abs() < 1e-3);
        assert!((report.e_g_caoeq_for_batch - 1.547777).abs() < 1e-5);
    }

    #[test]
    fn explicit_n_overrides_mode() {
        let config = SluijsmannConfig {
            mode: SoilMode::Arable,
            n: Some(0.0),
        };
        let report = compute_sluijsmann(1.0, &Concentrations::new(), &reference_elements(), &config);
        assert_eq!(report.e_mg_caoeq_per_l, 0.0);
    }

    #[test]
    fn sulfur_falls_back_to_element() {
        let elements: Concentrations = [("S", 32.065)].into_iter().collect();
        let report = compute_sluijsmann(
            1.0,
            &Concentrations::new(),
            &elements,
            &SluijsmannConfig::default(),
        );
        assert!((report.inputs_mg_per_l["SO3"] - 80.063).abs() < 1e-9);
    }
}
