//! Shared fixtures for the integration tests

use nutriforge_core::{CalculatorBuilder, FertilizerCatalog, SolutionCalculator};
use nutriforge_schemas::concentration::RawWaterRecord;

/// A small catalog in the same CSV layout as the shipped one.
pub const CATALOG_CSV: &str = "\
name,form,weight_factor,NO3,NH4,Ur-N,P2O5,K2O,CaO,MgO,SO4,Ca,Fe
Calcium Nitrate,solid,1,15.5,,,,,,,,19,
Potassium Nitrate,solid,1,13,,,,46,,,,,
Mono Potassium Phosphate,solid,1,,,,52,34,,,,,
Epsom Salt,solid,1,,,,,,,16,39,,
Urea,solid,1,,,46,,,,,,,
Iron Chelate,solid,1,,,,,,,,,,6
";

pub fn sample_catalog() -> FertilizerCatalog {
    FertilizerCatalog::from_csv_reader(CATALOG_CSV.as_bytes(), "fixture").unwrap()
}

pub fn calculator() -> SolutionCalculator {
    CalculatorBuilder::new()
        .with_catalog(sample_catalog())
        .build()
        .unwrap()
}

pub fn water(pairs: &[(&str, f64)]) -> RawWaterRecord {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64, message: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff < tolerance,
        "{}: got {} expected {} (diff {}, tolerance {})",
        message,
        actual,
        expected,
        diff,
        tolerance
    );
}
