mod common;

use common::{assert_close, calculator, water};
use nutriforge_core::{
    diagnostics::Diagnostics,
    units,
    water::{normalize_water, DilutionFactor},
    Degradation, MolarMassRegistry,
};
use nutriforge_schemas::recipe::CalculationRequest;

fn hard_water() -> nutriforge_schemas::RawWaterRecord {
    water(&[
        ("NO3", 20.0),
        ("Ca", 90.0),
        ("Mg", 15.0),
        ("K", 3.0),
        ("Na", 12.0),
        ("SO4", 45.0),
        ("Cl", 25.0),
        ("CaCO3", 180.0),
        ("Fe", 0.05),
    ])
}

#[test]
fn full_osmosis_leaves_pure_water() {
    let request = CalculationRequest::new(10.0).with_water(hard_water(), 100.0);
    let report = calculator().calculate(&request).unwrap();
    assert!(report
        .water_canonical_mg_per_l
        .iter()
        .all(|(_, value)| value == 0.0));
    assert!(report.water.ions.is_empty());
    assert_eq!(report.water.ec.points[0].ec_ms_per_cm, 0.0);
}

#[test]
fn no_osmosis_keeps_the_record() {
    let registry = MolarMassRegistry::builtin();
    let mut diag = Diagnostics::new();
    let undiluted = normalize_water(&registry, &hard_water(), DilutionFactor::UNDILUTED, &mut diag);
    let zero = DilutionFactor::from_osmosis_percent(0.0, &mut diag);
    let same = normalize_water(&registry, &hard_water(), zero, &mut diag);
    assert_eq!(undiluted, same);
    assert!(diag.is_empty());
}

#[test]
fn half_osmosis_halves_everything() {
    let registry = MolarMassRegistry::builtin();
    let mut diag = Diagnostics::new();
    let full = normalize_water(&registry, &hard_water(), DilutionFactor::UNDILUTED, &mut diag);
    let half = DilutionFactor::from_osmosis_percent(50.0, &mut diag);
    let halved = normalize_water(&registry, &hard_water(), half, &mut diag);
    for (species, value) in full.iter() {
        assert_close(halved.get(species), value / 2.0, 1e-9, species);
    }
}

#[test]
fn direct_bicarbonate_wins_over_hardness() {
    let raw = water(&[("HCO3", 50.0), ("CaCO3", 100.0), ("KH", 10.0)]);
    let request = CalculationRequest::new(10.0).with_water(raw, 0.0);
    let report = calculator().calculate(&request).unwrap();
    assert_close(report.water_canonical_mg_per_l.get("HCO3"), 50.0, 1e-12, "HCO3");
    assert!(report
        .degradations
        .iter()
        .any(|d| matches!(d, Degradation::AmbiguousRedundantInput { .. })));
}

#[test]
fn both_hardness_keys_keep_the_first() {
    let registry = MolarMassRegistry::builtin();
    let raw = water(&[("KH", 10.0), ("°KH", 4.0)]);
    let mut diag = Diagnostics::new();
    let canonical = normalize_water(&registry, &raw, DilutionFactor::UNDILUTED, &mut diag);
    let expected = units::kh_to_hco3(&registry, 10.0).value();
    assert_close(canonical.get("HCO3"), expected, 1e-9, "HCO3 from KH only");
    assert!(diag.entries().iter().any(|d| matches!(
        d,
        Degradation::AmbiguousRedundantInput { used, ignored }
            if used == "KH" && ignored == &vec!["°KH".to_string()]
    )));
}

#[test]
fn hardness_alone_is_converted() {
    let registry = MolarMassRegistry::builtin();
    let raw = water(&[("KH", 10.0)]);
    let mut diag = Diagnostics::new();
    let canonical = normalize_water(&registry, &raw, DilutionFactor::UNDILUTED, &mut diag);
    let expected = units::kh_to_hco3(&registry, 10.0).value();
    assert_close(canonical.get("HCO3"), expected, 1e-9, "HCO3 from KH");
    assert_close(expected, 217.8, 0.5, "10 dKH is about 218 mg/L HCO3");
}

#[test]
fn out_of_range_osmosis_is_clamped() {
    let request = CalculationRequest::new(10.0).with_water(hard_water(), 140.0);
    let report = calculator().calculate(&request).unwrap();
    assert_eq!(report.osmosis_percent, 100.0);
    assert!(report
        .degradations
        .iter()
        .any(|d| matches!(d, Degradation::InvalidInput { .. })));
}

#[test]
fn mass_mol_round_trip() {
    let registry = MolarMassRegistry::builtin();
    for species in registry.iter() {
        for x in [0.0, 0.37, 12.5, 980.0] {
            let mol = units::mg_to_mol(&registry, &species.symbol, x).value();
            let back = units::mol_to_mg(&registry, &species.symbol, mol).value();
            assert_close(back, x, 1e-9 * x.max(1.0), &species.symbol);
        }
    }
}
