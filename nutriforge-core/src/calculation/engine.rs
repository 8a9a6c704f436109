use super::state::{DoseContribution, SolutionReport, SolutionState};
use crate::{
    catalog::{self, FertilizerCatalog},
    diagnostics::{Degradation, Diagnostics},
    ec::{self, EcOptions},
    error::NutriforgeError,
    ions::{self, IonSet},
    metrics,
    projector::{self, NitrogenBasis},
    registry::MolarMassRegistry,
    sluijsmann,
    water::{self, DilutionFactor},
};
use nutriforge_schemas::{
    concentration::{Concentrations, ElementReport},
    recipe::{CalculationOptions, CalculationRequest},
};

/// Turns fertilizer doses plus a water analysis into a full solution report.
///
/// Holds only read-only reference data, so one calculator can serve any
/// number of threads through a shared reference.
pub struct SolutionCalculator {
    pub(super) registry: MolarMassRegistry,
    pub(super) catalog: FertilizerCatalog,
    pub(super) ec_options: EcOptions,
}

impl SolutionCalculator {
    pub fn registry(&self) -> &MolarMassRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &FertilizerCatalog {
        &self.catalog
    }

    pub fn ec_options(&self) -> &EcOptions {
        &self.ec_options
    }

    /// Runs one calculation.
    ///
    /// # Errors
    ///
    /// Only a missing, zero, negative or non-finite volume is an error; every
    /// other problem is recorded in `SolutionReport::degradations`.
    pub fn calculate(&self, request: &CalculationRequest) -> Result<SolutionReport, NutriforgeError> {
        let liters = request.liters;
        if !liters.is_finite() || liters <= 0.0 {
            return Err(NutriforgeError::InvalidVolume(liters));
        }
        let mut diag = Diagnostics::new();

        let dilution = DilutionFactor::from_osmosis_percent(request.osmosis_percent, &mut diag);
        tracing::debug!(
            liters,
            doses = request.fertilizers.len(),
            osmosis_percent = dilution.osmosis_percent(),
            "calculating solution"
        );
        let water_canonical =
            water::normalize_water(&self.registry, &request.water_mg_per_l, dilution, &mut diag);

        let doses = self.dose_contributions(request, &mut diag);
        let fertilizer_forms = doses
            .iter()
            .fold(Concentrations::new(), |acc, dose| acc.merged(&dose.mg_per_l));

        let water_elements = projector::project_elements(
            &self.registry,
            &water_canonical,
            NitrogenBasis::Molecule,
            &mut diag,
        );
        let fertilizer_elements = projector::project_elements(
            &self.registry,
            &fertilizer_forms,
            NitrogenBasis::Element,
            &mut diag,
        );
        let combined_elements = water_elements.merged(&fertilizer_elements);

        let options = &request.options;
        let combined = self.solution_state(combined_elements, options, &mut diag);
        let water = self.solution_state(water_elements, options, &mut diag);
        let fertilizer = self.solution_state(fertilizer_elements, options, &mut diag);

        let npk = metrics::npk_metrics(&combined.elements_mg_per_l, &combined.oxides_mg_per_l);
        let sluijsmann = sluijsmann::compute_sluijsmann(
            liters,
            &combined.oxides_mg_per_l,
            &combined.elements_mg_per_l,
            &options.sluijsmann,
        );
        tracing::debug!(
            ions = combined.ions.ions().len(),
            degradations = diag.entries().len(),
            "solution calculated"
        );

        Ok(SolutionReport {
            liters,
            osmosis_percent: dilution.osmosis_percent(),
            water_canonical_mg_per_l: water_canonical,
            doses,
            combined,
            water,
            fertilizer,
            npk,
            sluijsmann,
            degradations: diag.into_vec(),
        })
    }

    fn dose_contributions(
        &self,
        request: &CalculationRequest,
        diag: &mut Diagnostics,
    ) -> Vec<DoseContribution> {
        request
            .fertilizers
            .iter()
            .map(|dose| {
                let name = dose.name.trim();
                let grams = diag.non_negative(&format!("grams of '{name}'"), dose.grams);
                match self.catalog.lookup(name) {
                    Some(fertilizer) => DoseContribution {
                        name: fertilizer.name.clone(),
                        grams,
                        effective_grams: grams * fertilizer.weight_factor,
                        resolved: true,
                        form: Some(fertilizer.form),
                        mg_per_l: catalog::dose_contribution(fertilizer, grams, request.liters),
                    },
                    None => {
                        diag.push(Degradation::missing(
                            name,
                            "not in the fertilizer catalog; contributes nothing",
                        ));
                        DoseContribution {
                            name: name.to_string(),
                            grams,
                            effective_grams: 0.0,
                            resolved: false,
                            form: None,
                            mg_per_l: Concentrations::new(),
                        }
                    }
                }
            })
            .collect()
    }

    fn solution_state(
        &self,
        elements: ElementReport,
        options: &CalculationOptions,
        diag: &mut Diagnostics,
    ) -> SolutionState {
        let oxides = projector::project_oxides(&self.registry, &elements, diag);
        let ions = IonSet::from_elements(&self.registry, &elements, options, diag);
        let ion_balance = ions::ion_balance(&ions);
        let ec = ec::estimate_ec(&ions, &self.ec_options, diag);
        SolutionState {
            elements_mg_per_l: elements,
            oxides_mg_per_l: oxides,
            ions,
            ion_balance,
            ec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::builder::CalculatorBuilder;
    use nutriforge_schemas::fertilizer::{Fertilizer, PhysicalForm};

    fn calculator() -> SolutionCalculator {
        let catalog = FertilizerCatalog::from_fertilizers(vec![Fertilizer {
            name: "Potassium Sulfate".to_string(),
            form: PhysicalForm::Solid,
            weight_factor: 1.0,
            composition_percent: [("K2O".to_string(), 50.0), ("SO4".to_string(), 54.0)]
                .into_iter()
                .collect(),
        }])
        .unwrap();
        CalculatorBuilder::new().with_catalog(catalog).build().unwrap()
    }

    #[test]
    fn rejects_non_positive_volume() {
        let calculator = calculator();
        for liters in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = calculator.calculate(&CalculationRequest::new(liters));
            assert!(matches!(result, Err(NutriforgeError::InvalidVolume(_))));
        }
    }

    #[test]
    fn negative_grams_are_coerced_to_zero() {
        let request = CalculationRequest::new(10.0).with_dose("Potassium Sulfate", -5.0);
        let report = calculator().calculate(&request).unwrap();
        assert_eq!(report.doses[0].grams, 0.0);
        assert_eq!(report.combined.elements_mg_per_l.get("K"), 0.0);
        assert!(report
            .degradations
            .iter()
            .any(|d| matches!(d, Degradation::InvalidInput { .. })));
    }

    #[test]
    fn fertilizer_view_excludes_water() {
        let water: Concentrations = [("Ca", 40.0)].into_iter().collect();
        let request = CalculationRequest::new(10.0)
            .with_dose("Potassium Sulfate", 1.0)
            .with_water(water, 0.0);
        let report = calculator().calculate(&request).unwrap();
        assert_eq!(report.fertilizer.elements_mg_per_l.get("Ca"), 0.0);
        assert!((report.water.elements_mg_per_l.get("Ca") - 40.0).abs() < 1e-9);
        assert!((report.combined.elements_mg_per_l.get("Ca") - 40.0).abs() < 1e-9);
        assert!((report.fertilizer.oxides_mg_per_l.get("K2O") - 50.0).abs() < 1e-9);
        assert!((report.combined.oxides_mg_per_l.get("K2O") - 50.0).abs() < 1e-9);
    }
}
