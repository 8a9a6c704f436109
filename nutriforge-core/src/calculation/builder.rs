use super::engine::SolutionCalculator;
use crate::{
    catalog::FertilizerCatalog, ec::EcOptions, error::NutriforgeError,
    registry::MolarMassRegistry,
};

/// A fluent builder for constructing a `SolutionCalculator`.
///
/// The registry defaults to the built-in species table and the EC options to
/// 18 °C / 25 °C; a fertilizer catalog is required.
#[derive(Default)]
pub struct CalculatorBuilder {
    registry: Option<MolarMassRegistry>,
    catalog: Option<FertilizerCatalog>,
    ec_options: Option<EcOptions>,
}

impl CalculatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the built-in molar-mass table.
    pub fn with_registry(mut self, registry: MolarMassRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_catalog(mut self, catalog: FertilizerCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_ec_options(mut self, options: EcOptions) -> Self {
        self.ec_options = Some(options);
        self
    }

    /// Consumes the builder and returns a ready `SolutionCalculator`.
    ///
    /// # Errors
    ///
    /// Returns a `NutriforgeError` if no catalog was given or the EC options
    /// cannot produce a conductivity.
    pub fn build(self) -> Result<SolutionCalculator, NutriforgeError> {
        let ec_options = self.ec_options.unwrap_or_default();
        if ec_options.temperatures_c.is_empty() {
            return Err(NutriforgeError::InvalidEcOptions(
                "at least one temperature is required".to_string(),
            ));
        }
        if let Some(t) = ec_options.temperatures_c.iter().find(|t| !t.is_finite()) {
            return Err(NutriforgeError::InvalidEcOptions(format!("temperature {t} °C")));
        }
        if !ec_options.density_kg_per_l.is_finite() || ec_options.density_kg_per_l <= 0.0 {
            return Err(NutriforgeError::InvalidEcOptions(format!(
                "density {} kg/L",
                ec_options.density_kg_per_l
            )));
        }

        Ok(SolutionCalculator {
            registry: self.registry.unwrap_or_default(),
            catalog: self.catalog.ok_or(NutriforgeError::CatalogNotDefined)?,
            ec_options,
        })
    }
}
