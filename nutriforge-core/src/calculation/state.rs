use crate::{
    diagnostics::Degradation,
    ec::EcReport,
    ions::{IonBalanceReport, IonSet},
    metrics::NpkMetrics,
    sluijsmann::SluijsmannReport,
};
use nutriforge_schemas::{
    concentration::{CanonicalWaterRecord, Concentrations, ElementReport, OxideReport},
    fertilizer::PhysicalForm,
};
use serde::Serialize;

/// One view of a solution (combined, water only or fertilizer only).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionState {
    pub elements_mg_per_l: ElementReport,
    pub oxides_mg_per_l: OxideReport,
    pub ions: IonSet,
    pub ion_balance: IonBalanceReport,
    pub ec: EcReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoseContribution {
    pub name: String,
    pub grams: f64,
    /// Dosed grams times the catalog weight factor.
    pub effective_grams: f64,
    pub resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<PhysicalForm>,
    /// Per assay column, in the column's own form.
    pub mg_per_l: Concentrations,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionReport {
    pub liters: f64,
    pub osmosis_percent: f64,
    pub water_canonical_mg_per_l: CanonicalWaterRecord,
    pub doses: Vec<DoseContribution>,
    pub combined: SolutionState,
    pub water: SolutionState,
    pub fertilizer: SolutionState,
    pub npk: NpkMetrics,
    pub sluijsmann: SluijsmannReport,
    pub degradations: Vec<Degradation>,
}

impl SolutionReport {
    pub fn views(&self) -> [(&'static str, &SolutionState); 3] {
        [
            ("combined", &self.combined),
            ("water", &self.water),
            ("fertilizer", &self.fertilizer),
        ]
    }

    pub fn unresolved_doses(&self) -> impl Iterator<Item = &DoseContribution> {
        self.doses.iter().filter(|d| !d.resolved)
    }
}
