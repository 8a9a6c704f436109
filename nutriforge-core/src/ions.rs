//! Ionic view of a solution and its charge balance.

use crate::{
    diagnostics::{Degradation, Diagnostics},
    registry::MolarMassRegistry,
    units,
};
use nutriforge_schemas::{
    concentration::ElementReport,
    recipe::{CalculationOptions, PhosphateSpecies},
};
use serde::Serialize;
use std::collections::BTreeMap;

/// One dissolved ion. `meq_per_l` is always non-negative; the sign lives in
/// `charge`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ion {
    pub label: String,
    pub species: String,
    pub charge: i32,
    pub mg_per_l: f64,
    pub mmol_per_l: f64,
    pub meq_per_l: f64,
}

impl Ion {
    pub fn new(species: &str, charge: i32, mg_per_l: f64, mmol_per_l: f64) -> Self {
        Self {
            label: ion_label(species, charge),
            species: species.to_string(),
            charge,
            mg_per_l,
            mmol_per_l,
            meq_per_l: mmol_per_l * f64::from(charge.abs()),
        }
    }

    pub fn is_cation(&self) -> bool {
        self.charge > 0
    }

    pub fn is_anion(&self) -> bool {
        self.charge < 0
    }
}

/// Display label: `K+`, `Ca2+`, `NO3-`, `SO4^2-`.
pub fn ion_label(species: &str, charge: i32) -> String {
    let sign = if charge >= 0 { '+' } else { '-' };
    match charge.abs() {
        1 => format!("{species}{sign}"),
        n if charge > 0 => format!("{species}{n}{sign}"),
        n => format!("{species}^{n}{sign}"),
    }
}

/// Parses `SO4^2-`, `Ca+2`, `NO3-` and `Ca2+` into (species, signed charge).
///
/// `Ca2+` and `NH4+` look alike; a trailing digit is read as the charge only
/// when the registry knows the shorter formula and not the longer one.
pub fn parse_ion_label(registry: &MolarMassRegistry, label: &str) -> Option<(String, i32)> {
    let label = label.trim();
    if let Some((formula, rest)) = label.split_once('^') {
        let sign = rest.chars().last()?;
        let magnitude: i32 = rest[..rest.len() - sign.len_utf8()].parse().ok()?;
        return signed(formula, magnitude, sign);
    }

    let sign_pos = label.rfind(|c: char| c == '+' || c == '-')?;
    let (head, tail) = label.split_at(sign_pos);
    let sign = tail.chars().next()?;
    let digits = &tail[1..];
    if !digits.is_empty() {
        return signed(head, digits.parse().ok()?, sign);
    }

    let subscript_split = head
        .char_indices()
        .last()
        .filter(|(_, c)| c.is_ascii_digit())
        .map(|(i, _)| head.split_at(i));
    match subscript_split {
        Some((formula, digit))
            if !formula.is_empty()
                && registry.contains(formula)
                && !registry.contains(head) =>
        {
            signed(formula, digit.parse().ok()?, sign)
        }
        _ => signed(head, 1, sign),
    }
}

fn signed(formula: &str, magnitude: i32, sign: char) -> Option<(String, i32)> {
    if formula.is_empty() || magnitude == 0 || !formula.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    match sign {
        '+' => Some((formula.to_string(), magnitude)),
        '-' => Some((formula.to_string(), -magnitude)),
        _ => None,
    }
}

/// (element-report key, symbol the key is counted as, ion species)
const ION_SOURCES: &[(&str, &str, &str)] = &[
    ("N_NH4", "N", "NH4"),
    ("N_NO3", "N", "NO3"),
    ("K", "K", "K"),
    ("Ca", "Ca", "Ca"),
    ("Mg", "Mg", "Mg"),
    ("Na", "Na", "Na"),
    ("P", "P", "H2PO4"),
    ("S", "S", "SO4"),
    ("Cl", "Cl", "Cl"),
    ("HCO3", "HCO3", "HCO3"),
    ("C", "C", "CO3"),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IonSet {
    ions: Vec<Ion>,
}

impl IonSet {
    pub fn new(ions: Vec<Ion>) -> Self {
        Self { ions }
    }

    /// Derives the dissolved ions from an element report.
    pub fn from_elements(
        registry: &MolarMassRegistry,
        elements: &ElementReport,
        options: &CalculationOptions,
        diag: &mut Diagnostics,
    ) -> Self {
        let mut ions = Vec::new();
        for &(key, counted_as, species) in ION_SOURCES {
            let species = match (species, options.phosphate_species) {
                ("H2PO4", PhosphateSpecies::HPO4) => "HPO4",
                _ => species,
            };
            let mut mg = elements.get(key);
            if key == "N_NH4" && options.urea_as_nh4 {
                mg += elements.get("N_UREA");
            }
            if mg == 0.0 {
                continue;
            }
            let Some(charge) = registry.valence(species) else {
                diag.push(Degradation::missing(species, "no valence; ion left out of balance and EC"));
                continue;
            };
            let Some(mmol) = units::mg_to_mmol(registry, counted_as, mg).or_record(diag, counted_as)
            else {
                continue;
            };
            let Some(mg_ion) = units::mmol_to_mg(registry, species, mmol).or_record(diag, species)
            else {
                continue;
            };
            ions.push(Ion::new(species, charge, mg_ion, mmol));
        }
        if elements.get("N_OTHER") != 0.0 {
            diag.push(Degradation::missing(
                "N",
                "nitrogen given without NH4/NO3 form; left out of balance and EC",
            ));
        }
        Self { ions }
    }

    /// Builds a set from `label -> mmol/L`, as measured or typed in.
    pub fn from_mmol_labels(
        registry: &MolarMassRegistry,
        labels: &BTreeMap<String, f64>,
        diag: &mut Diagnostics,
    ) -> Self {
        let mut ions = Vec::new();
        for (label, &mmol) in labels {
            let mmol = diag.non_negative(label, mmol);
            if mmol == 0.0 {
                continue;
            }
            let Some((species, charge)) = parse_ion_label(registry, label) else {
                diag.push(Degradation::missing(label.as_str(), "unparseable ion label ignored"));
                continue;
            };
            let mg = units::mmol_to_mg(registry, &species, mmol)
                .or_record(diag, &species)
                .unwrap_or(0.0);
            ions.push(Ion::new(&species, charge, mg, mmol));
        }
        Self { ions }
    }

    pub fn ions(&self) -> &[Ion] {
        &self.ions
    }

    pub fn get(&self, label: &str) -> Option<&Ion> {
        self.ions.iter().find(|i| i.label == label)
    }

    pub fn is_empty(&self) -> bool {
        self.ions.is_empty()
    }

    pub fn cations_meq_per_l(&self) -> f64 {
        self.ions.iter().filter(|i| i.is_cation()).map(|i| i.meq_per_l).sum()
    }

    pub fn anions_meq_per_l(&self) -> f64 {
        self.ions.iter().filter(|i| i.is_anion()).map(|i| i.meq_per_l).sum()
    }

    pub fn mmol_per_l(&self) -> BTreeMap<String, f64> {
        self.ions.iter().map(|i| (i.label.clone(), i.mmol_per_l)).collect()
    }

    /// Uniformly scaled copy.
    pub fn scaled(&self, factor: f64) -> Self {
        let ions = self
            .ions
            .iter()
            .map(|i| Ion::new(&i.species, i.charge, i.mg_per_l * factor, i.mmol_per_l * factor))
            .collect();
        Self { ions }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IonBalanceReport {
    pub cations_meq_per_l: f64,
    pub anions_meq_per_l: f64,
    /// `200 (C - A) / (C + A)`; `None` when there are no ions at all.
    pub error_percent_signed: Option<f64>,
    pub error_percent_abs: Option<f64>,
}

pub fn ion_balance(ions: &IonSet) -> IonBalanceReport {
    let cations = ions.cations_meq_per_l();
    let anions = ions.anions_meq_per_l();
    let denominator = cations + anions;
    let signed = (denominator > 0.0).then(|| 200.0 * (cations - anions) / denominator);
    IonBalanceReport {
        cations_meq_per_l: cations,
        anions_meq_per_l: anions,
        error_percent_signed: signed,
        error_percent_abs: signed.map(f64::abs),
    }
}
