//! Electrical conductivity estimate from an ion set.
//!
//! Per-ion molal conductivities follow McCleskey et al. (2012):
//! `k(T, I) = k0(T) - A(T) * sqrt(I) / (1 + B * sqrt(I))` with `k0` and `A`
//! quadratic in temperature (°C). Ions without McCleskey parameters may use
//! a limiting molar conductivity at 25 °C with a linear temperature term.
//! Contributions are `k * molality` in mS/cm.

use crate::{
    diagnostics::{Degradation, Diagnostics},
    ions::IonSet,
};
use serde::Serialize;
use std::collections::BTreeMap;

pub const METHOD: &str = "McCleskey2012 (eq. 7-9, table 1) + limiting conductivity fallback";

#[derive(Debug, Clone, Copy, PartialEq)]
struct McCleskeyParams {
    k0: [f64; 3],
    a: [f64; 3],
    b: f64,
    z: i32,
}

const fn mc(k0: [f64; 3], a: [f64; 3], b: f64, z: i32) -> McCleskeyParams {
    McCleskeyParams { k0, a, b, z }
}

const MCCLESKEY_PARAMS: &[(&str, McCleskeyParams)] = &[
    ("K+", mc([0.003046, 1.261, 40.70], [0.00535, 0.9316, 22.59], 1.5, 1)),
    ("Na+", mc([0.003763, 0.8770, 26.23], [0.00027, 1.141, 32.07], 1.7, 1)),
    ("NH4+", mc([0.003341, 1.285, 39.04], [0.00132, 0.6070, 11.19], 0.3, 1)),
    ("Ca2+", mc([0.009645, 1.984, 62.28], [0.03174, 2.334, 132.3], 2.8, 2)),
    ("Mg2+", mc([0.01068, 1.695, 57.16], [0.02453, 1.915, 80.50], 2.1, 2)),
    ("Cl-", mc([0.003817, 1.337, 40.99], [0.00613, 0.9469, 22.01], 1.5, -1)),
    ("SO4^2-", mc([0.01037, 2.838, 82.37], [0.03324, 5.889, 193.5], 2.6, -2)),
    ("NO3-", mc([0.001925, 1.214, 39.90], [0.00118, 0.5045, 23.31], 0.1, -1)),
    ("HCO3-", mc([0.000614, 0.9048, 21.14], [-0.00503, 0.8957, 10.97], 0.1, -1)),
    ("CO3^2-", mc([-0.000326, 2.998, 64.03], [-0.00181, 5.542, 120.2], 2.3, -2)),
];

/// Limiting molar conductivity at 25 °C, mS·L/(cm·mol).
const FALLBACK_LAMBDA_25: &[(&str, f64)] = &[("H2PO4-", 36.0)];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EcOptions {
    pub temperatures_c: Vec<f64>,
    pub density_kg_per_l: f64,
    /// Relative change of fallback conductivities per °C away from 25 °C.
    pub fallback_beta_per_c: f64,
    /// Linear compensation coefficient used to refer the 18 °C value to 25 °C.
    pub atc_alpha_per_c: f64,
}

impl Default for EcOptions {
    fn default() -> Self {
        Self {
            temperatures_c: vec![18.0, 25.0],
            density_kg_per_l: 1.0,
            fallback_beta_per_c: 0.022,
            atc_alpha_per_c: 0.019,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EcPoint {
    pub temperature_c: f64,
    pub ec_ms_per_cm: f64,
    pub ec_us_per_cm: f64,
    pub contributions_ms_per_cm: BTreeMap<String, f64>,
    pub transport_numbers: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EcCoverage {
    pub mccleskey: Vec<String>,
    pub fallback: Vec<String>,
    pub ignored: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EcReport {
    pub method: String,
    pub ionic_strength_mol_per_kg: f64,
    pub points: Vec<EcPoint>,
    /// 18 °C estimate compensated to 25 °C, when 18 °C was evaluated.
    pub ec25_from_18_ms_per_cm: Option<f64>,
    pub coverage: EcCoverage,
}

impl EcReport {
    pub fn at(&self, temperature_c: f64) -> Option<f64> {
        self.points
            .iter()
            .find(|p| (p.temperature_c - temperature_c).abs() < 1e-9)
            .map(|p| p.ec_ms_per_cm)
    }
}

fn poly(coeffs: [f64; 3], t: f64) -> f64 {
    coeffs[0] * t * t + coeffs[1] * t + coeffs[2]
}

fn mccleskey_k(params: &McCleskeyParams, temperature_c: f64, ionic_strength: f64) -> f64 {
    let k0 = poly(params.k0, temperature_c);
    if ionic_strength == 0.0 {
        return k0;
    }
    let sqrt_i = ionic_strength.sqrt();
    k0 - poly(params.a, temperature_c) * sqrt_i / (1.0 + params.b * sqrt_i)
}

/// `I = 1/2 * sum(m * z^2)` in mol/kg.
pub fn ionic_strength(ions: &IonSet, density_kg_per_l: f64) -> f64 {
    ions.ions()
        .iter()
        .map(|ion| {
            let molality = ion.mmol_per_l / 1000.0 / density_kg_per_l;
            0.5 * molality * f64::from(ion.charge * ion.charge)
        })
        .sum()
}

enum Model {
    McCleskey(McCleskeyParams),
    Fallback(f64),
}

fn model_for(label: &str) -> Option<Model> {
    MCCLESKEY_PARAMS
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, p)| Model::McCleskey(*p))
        .or_else(|| {
            FALLBACK_LAMBDA_25
                .iter()
                .find(|(l, _)| *l == label)
                .map(|(_, lambda)| Model::Fallback(*lambda))
        })
}

pub fn estimate_ec(ions: &IonSet, options: &EcOptions, diag: &mut Diagnostics) -> EcReport {
    let strength = ionic_strength(ions, options.density_kg_per_l);
    let mut coverage = EcCoverage::default();
    let mut modelled = Vec::new();

    for ion in ions.ions().iter().filter(|i| i.mmol_per_l > 0.0) {
        match model_for(&ion.label) {
            Some(model) => {
                if let Model::McCleskey(params) = &model {
                    if params.z != ion.charge {
                        diag.push(Degradation::missing(
                            ion.label.as_str(),
                            format!("charge {} differs from table charge {}; table used", ion.charge, params.z),
                        ));
                    }
                    coverage.mccleskey.push(ion.label.clone());
                } else {
                    coverage.fallback.push(ion.label.clone());
                }
                modelled.push((ion, model));
            }
            None => {
                diag.push(Degradation::missing(
                    ion.label.as_str(),
                    "no conductivity parameters; ignored in EC",
                ));
                coverage.ignored.push(ion.label.clone());
            }
        }
    }

    let points = options
        .temperatures_c
        .iter()
        .map(|&t| {
            let mut contributions = BTreeMap::new();
            for (ion, model) in &modelled {
                let mol_per_l = ion.mmol_per_l / 1000.0;
                let contribution = match model {
                    Model::McCleskey(params) => {
                        let k = mccleskey_k(params, t, strength);
                        if k < 0.0 {
                            diag.push(Degradation::OutsideModelRange {
                                subject: ion.label.clone(),
                                detail: format!(
                                    "conductivity {k:.3} at {t} °C and I = {strength:.3} mol/kg; contribution set to 0"
                                ),
                            });
                        }
                        k.max(0.0) * mol_per_l / options.density_kg_per_l
                    }
                    Model::Fallback(lambda_25) => {
                        lambda_25 * (1.0 + options.fallback_beta_per_c * (t - 25.0)) * mol_per_l
                    }
                };
                *contributions.entry(ion.label.clone()).or_insert(0.0) += contribution;
            }
            let total: f64 = contributions.values().sum();
            let transport_numbers = contributions
                .iter()
                .map(|(label, c)| (label.clone(), if total == 0.0 { 0.0 } else { c / total }))
                .collect();
            EcPoint {
                temperature_c: t,
                ec_ms_per_cm: total,
                ec_us_per_cm: total * 1000.0,
                contributions_ms_per_cm: contributions,
                transport_numbers,
            }
        })
        .collect::<Vec<_>>();

    let ec25_from_18_ms_per_cm = points
        .iter()
        .find(|p| (p.temperature_c - 18.0).abs() < 1e-9)
        .and_then(|p| {
            let denominator = 1.0 + options.atc_alpha_per_c * (18.0 - 25.0);
            (denominator != 0.0).then(|| p.ec_ms_per_cm / denominator)
        });

    coverage.mccleskey.sort();
    coverage.mccleskey.dedup();
    coverage.fallback.sort();
    coverage.fallback.dedup();
    coverage.ignored.sort();
    coverage.ignored.dedup();

    EcReport {
        method: METHOD.to_string(),
        ionic_strength_mol_per_kg: strength,
        points,
        ec25_from_18_ms_per_cm,
        coverage,
    }
}
