//! Raw water analysis to canonical record.
//!
//! A lab report or profile may give the same nutrient several ways (P as
//! element, PO4 or P2O5; hardness as HCO3, CaCO3 or °KH). Normalization
//! dilutes every raw field, folds the redundant fields into one canonical
//! form per species and drops what sums to zero.

use crate::{
    diagnostics::{Degradation, Diagnostics},
    registry::MolarMassRegistry,
    units::{self, Conversion},
};
use nutriforge_schemas::{
    concentration::{CanonicalWaterRecord, RawWaterRecord},
    water::WaterProfile,
};

/// Species a canonical water record may contain.
pub const CANONICAL_SPECIES: &[&str] = &[
    "NH4", "NO3", "P2O5", "K2O", "CaO", "MgO", "Na2O", "SO4", "Cl", "Fe", "Mn", "Cu", "Zn",
    "B", "Mo", "HCO3", "SiO2",
];

/// Raw fields added by mass to a canonical species.
const SAME_MASS_ALIASES: &[(&str, &str)] = &[("NH3", "NH4"), ("NO2", "NO3")];

/// Raw fields given as another compound or as the bare element, and the
/// canonical species they are re-expressed as.
const FORM_CHANGES: &[(&str, &str)] = &[
    ("PO4", "P2O5"),
    ("P", "P2O5"),
    ("S", "SO4"),
    ("K", "K2O"),
    ("Na", "Na2O"),
    ("Ca", "CaO"),
    ("Mg", "MgO"),
    ("Si", "SiO2"),
];

const KH_KEYS: &[&str] = &["KH", "°KH"];

/// Fraction of raw water left after blending with osmosis water.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DilutionFactor(f64);

impl DilutionFactor {
    pub const UNDILUTED: DilutionFactor = DilutionFactor(1.0);

    /// `1 - clamp(percent, 0, 100) / 100`. Out-of-range or non-finite input
    /// is clamped (NaN counts as 0 %) and recorded.
    pub fn from_osmosis_percent(percent: f64, diag: &mut Diagnostics) -> Self {
        let clamped = if percent.is_nan() {
            diag.push(Degradation::invalid("osmosis_percent", percent, "treated as 0 %"));
            0.0
        } else if !(0.0..=100.0).contains(&percent) {
            let c = percent.clamp(0.0, 100.0);
            diag.push(Degradation::invalid(
                "osmosis_percent",
                percent,
                format!("clamped to {c} %"),
            ));
            c
        } else {
            percent
        };
        Self(1.0 - clamped / 100.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn osmosis_percent(self) -> f64 {
        (1.0 - self.0) * 100.0
    }
}

/// Which carbonate-hardness representation is authoritative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CarbonateInput {
    /// HCO3 measured directly; everything else is ignored.
    Direct { hco3: f64 },
    /// Derived from CaCO3, °KH and CO3, summed as HCO3 equivalents.
    Derived { caco3: f64, kh: f64, co3: f64 },
}

impl CarbonateInput {
    /// Picks the representation from an already diluted raw record.
    pub fn from_raw(raw: &RawWaterRecord, diag: &mut Diagnostics) -> Self {
        let hco3 = raw.get("HCO3");
        let caco3 = raw.get("CaCO3");
        let given_kh: Vec<&str> = KH_KEYS.iter().copied().filter(|k| raw.get(k) != 0.0).collect();
        let kh = given_kh.first().map_or(0.0, |k| raw.get(k));
        if let [used, ignored @ ..] = given_kh.as_slice() {
            if !ignored.is_empty() {
                diag.push(Degradation::AmbiguousRedundantInput {
                    used: (*used).to_string(),
                    ignored: ignored.iter().map(|k| (*k).to_string()).collect(),
                });
            }
        }
        let co3 = raw.get("CO3");

        if hco3 == 0.0 {
            return Self::Derived { caco3, kh, co3 };
        }
        let ignored: Vec<String> = [("CaCO3", caco3), ("KH", kh), ("CO3", co3)]
            .iter()
            .filter(|(_, v)| *v != 0.0)
            .map(|(k, _)| (*k).to_string())
            .collect();
        if !ignored.is_empty() {
            diag.push(Degradation::AmbiguousRedundantInput {
                used: "HCO3".to_string(),
                ignored,
            });
        }
        Self::Direct { hco3 }
    }

    /// Alkalinity in mg/L HCO3.
    pub fn resolve(&self, registry: &MolarMassRegistry, diag: &mut Diagnostics) -> f64 {
        match *self {
            Self::Direct { hco3 } => hco3,
            Self::Derived { caco3, kh, co3 } => {
                let from_caco3 = units::caco3_to_hco3(registry, caco3).or_record(diag, "CaCO3");
                let from_kh = units::kh_to_hco3(registry, kh).or_record(diag, "KH");
                let from_co3 = co3_to_hco3(registry, co3).or_record(diag, "CO3");
                [from_caco3, from_kh, from_co3].into_iter().flatten().sum()
            }
        }
    }
}

/// Charge equivalent: one CO3 carries the alkalinity of two HCO3.
fn co3_to_hco3(registry: &MolarMassRegistry, mg_co3: f64) -> Conversion {
    if mg_co3 == 0.0 {
        return Conversion::Converted(0.0);
    }
    match (registry.molar_mass("CO3"), registry.molar_mass("HCO3")) {
        (Some(mm_co3), Some(mm_hco3)) => Conversion::Converted(mg_co3 * 2.0 * mm_hco3 / mm_co3),
        _ => Conversion::Unconvertible {
            raw: mg_co3,
            missing: "no molar mass for 'CO3' or 'HCO3'".to_string(),
        },
    }
}

fn is_known_raw_field(key: &str) -> bool {
    CANONICAL_SPECIES.contains(&key)
        || SAME_MASS_ALIASES.iter().any(|(k, _)| *k == key)
        || FORM_CHANGES.iter().any(|(k, _)| *k == key)
        || KH_KEYS.contains(&key)
        || matches!(key, "CaCO3" | "CO3")
}

/// Sanitizes and dilutes a raw record. Dilution is applied before any form
/// conversion.
fn diluted(raw: &RawWaterRecord, dilution: DilutionFactor, diag: &mut Diagnostics) -> RawWaterRecord {
    let mut out = RawWaterRecord::new();
    for (key, value) in raw.iter() {
        if !is_known_raw_field(key) {
            diag.push(Degradation::missing(key, "unrecognised water analyte ignored"));
            continue;
        }
        let value = diag.non_negative(key, value);
        out.add(key, value * dilution.value());
    }
    out
}

/// Resolves a raw water analysis into one mg/L value per canonical species.
pub fn normalize_water(
    registry: &MolarMassRegistry,
    raw: &RawWaterRecord,
    dilution: DilutionFactor,
    diag: &mut Diagnostics,
) -> CanonicalWaterRecord {
    let raw = diluted(raw, dilution, diag);
    let mut canonical = CanonicalWaterRecord::new();

    for &species in CANONICAL_SPECIES {
        if species != "HCO3" {
            canonical.add(species, raw.get(species));
        }
    }
    for &(alias, target) in SAME_MASS_ALIASES {
        canonical.add(target, raw.get(alias));
    }
    for &(from, target) in FORM_CHANGES {
        let value = raw.get(from);
        if value == 0.0 {
            continue;
        }
        let converted = if units::relation(from).is_some() {
            units::change_form(registry, from, target, value)
        } else {
            units::from_element(registry, target, value)
        };
        if let Some(mg) = converted.or_record(diag, from) {
            canonical.add(target, mg);
        }
    }

    let carbonate = CarbonateInput::from_raw(&raw, diag);
    canonical.add("HCO3", carbonate.resolve(registry, diag));

    canonical
}

/// Normalizes a stored profile. `osmosis_override` replaces the profile's
/// own blending percentage when given.
pub fn normalize_profile(
    registry: &MolarMassRegistry,
    profile: &WaterProfile,
    osmosis_override: Option<f64>,
    diag: &mut Diagnostics,
) -> CanonicalWaterRecord {
    let percent = osmosis_override.unwrap_or(profile.osmosis_percent);
    let dilution = DilutionFactor::from_osmosis_percent(percent, diag);
    normalize_water(registry, &profile.mg_per_l, dilution, diag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, f64)]) -> RawWaterRecord {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    fn normalize(pairs: &[(&str, f64)], osmosis: f64) -> (CanonicalWaterRecord, Diagnostics) {
        let registry = MolarMassRegistry::builtin();
        let mut diag = Diagnostics::new();
        let dilution = DilutionFactor::from_osmosis_percent(osmosis, &mut diag);
        let record = normalize_water(&registry, &raw(pairs), dilution, &mut diag);
        (record, diag)
    }

    #[test]
    fn dilution_factor_clamps_percent() {
        let mut diag = Diagnostics::new();
        assert_eq!(DilutionFactor::from_osmosis_percent(0.0, &mut diag).value(), 1.0);
        assert_eq!(DilutionFactor::from_osmosis_percent(100.0, &mut diag).value(), 0.0);
        assert!((DilutionFactor::from_osmosis_percent(25.0, &mut diag).value() - 0.75).abs() < 1e-12);
        assert!(diag.is_empty());

        assert_eq!(DilutionFactor::from_osmosis_percent(150.0, &mut diag).value(), 0.0);
        assert_eq!(DilutionFactor::from_osmosis_percent(-20.0, &mut diag).value(), 1.0);
        assert_eq!(DilutionFactor::from_osmosis_percent(f64::NAN, &mut diag).value(), 1.0);
        assert_eq!(diag.entries().len(), 3);
    }

    #[test]
    fn full_osmosis_yields_empty_record() {
        let (record, _) = normalize(
            &[("Ca", 40.0), ("Mg", 10.0), ("HCO3", 61.0), ("NO3", 5.0), ("KH", 8.0)],
            100.0,
        );
        assert!(record.is_empty());
        for species in CANONICAL_SPECIES {
            assert_eq!(record.get(species), 0.0);
        }
    }

    #[test]
    fn undiluted_record_keeps_canonical_values() {
        let (record, diag) = normalize(&[("NO3", 12.0), ("SO4", 30.0), ("Fe", 0.1)], 0.0);
        assert!((record.get("NO3") - 12.0).abs() < 1e-12);
        assert!((record.get("SO4") - 30.0).abs() < 1e-12);
        assert!((record.get("Fe") - 0.1).abs() < 1e-12);
        assert_eq!(record.len(), 3);
        assert!(diag.is_empty());
    }

    #[test]
    fn dilution_scales_linearly() {
        let (full, _) = normalize(&[("Ca", 40.0), ("HCO3", 61.0)], 0.0);
        let (half, _) = normalize(&[("Ca", 40.0), ("HCO3", 61.0)], 50.0);
        assert!((half.get("CaO") - full.get("CaO") / 2.0).abs() < 1e-9);
        assert!((half.get("HCO3") - 30.5).abs() < 1e-9);
    }

    #[test]
    fn redundant_nitrogen_and_phosphorus_fields_are_summed() {
        let registry = MolarMassRegistry::builtin();
        let (record, _) = normalize(
            &[("NH4", 1.0), ("NH3", 0.5), ("NO3", 10.0), ("NO2", 0.2), ("P", 1.0), ("PO4", 3.0)],
            0.0,
        );
        assert!((record.get("NH4") - 1.5).abs() < 1e-12);
        assert!((record.get("NO3") - 10.2).abs() < 1e-12);
        let expected = units::from_element(&registry, "P2O5", 1.0).value()
            + units::change_form(&registry, "PO4", "P2O5", 3.0).value();
        assert!((record.get("P2O5") - expected).abs() < 1e-9);
    }

    #[test]
    fn elemental_sulfur_adds_to_sulfate() {
        let (record, _) = normalize(&[("SO4", 10.0), ("S", 32.065)], 0.0);
        assert!((record.get("SO4") - (10.0 + 96.06)).abs() < 1e-9);
    }

    #[test]
    fn direct_hco3_takes_precedence_over_derived_hardness() {
        let (record, diag) = normalize(&[("HCO3", 50.0), ("CaCO3", 100.0), ("KH", 10.0)], 0.0);
        assert!((record.get("HCO3") - 50.0).abs() < 1e-12);
        assert!(diag.entries().iter().any(|d| matches!(
            d,
            Degradation::AmbiguousRedundantInput { used, ignored }
                if used == "HCO3" && ignored == &vec!["CaCO3".to_string(), "KH".to_string()]
        )));
    }

    #[test]
    fn derived_hardness_sums_caco3_and_kh() {
        let registry = MolarMassRegistry::builtin();
        let (record, diag) = normalize(&[("CaCO3", 100.0), ("°KH", 10.0)], 0.0);
        let expected = units::caco3_to_hco3(&registry, 100.0).value()
            + units::kh_to_hco3(&registry, 10.0).value();
        assert!((record.get("HCO3") - expected).abs() < 1e-9);
        assert!(diag.is_empty());
    }

    #[test]
    fn negative_and_unknown_fields_degrade() {
        let (record, diag) = normalize(&[("Ca", -5.0), ("Unobtainium", 3.0), ("Mg", 10.0)], 0.0);
        assert!(!record.contains("CaO"));
        assert!(record.contains("MgO"));
        assert_eq!(diag.entries().len(), 2);
    }

    #[test]
    fn profile_override_wins_over_stored_percent() {
        let registry = MolarMassRegistry::builtin();
        let profile = WaterProfile {
            name: "tap".to_string(),
            source: String::new(),
            osmosis_percent: 50.0,
            mg_per_l: raw(&[("NO3", 10.0)]),
        };
        let mut diag = Diagnostics::new();
        let stored = normalize_profile(&registry, &profile, None, &mut diag);
        let overridden = normalize_profile(&registry, &profile, Some(0.0), &mut diag);
        assert!((stored.get("NO3") - 5.0).abs() < 1e-12);
        assert!((overridden.get("NO3") - 10.0).abs() < 1e-12);
    }
}
