//! Element and oxide views of a solution.
//!
//! [`project_elements`] accepts any form record (a canonical water record or
//! a fertilizer assay contribution) and returns elemental mg/L plus the
//! nitrogen sub-forms `N_NH4`, `N_NO3`, `N_UREA`, `N_OTHER` (total N given
//! without a form) and their sum `N_total`.
//! [`project_oxides`] goes the other way for the horticultural oxide view.

use crate::{
    diagnostics::{Degradation, Diagnostics},
    registry::MolarMassRegistry,
    units,
};
use nutriforge_schemas::concentration::{Concentrations, ElementReport, OxideReport};

pub const TRACE_ELEMENTS: &[&str] = &["Fe", "Mn", "Cu", "Zn", "B", "Mo"];

pub const NITROGEN_FORMS: &[&str] = &["N_NH4", "N_NO3", "N_UREA", "N_OTHER"];

/// Already in final elemental/ionic mass; copied as-is.
const PASS_THROUGH: &[&str] = &["Cl", "HCO3"];

/// Bare element keys an assay may use directly.
const PLAIN_ELEMENTS: &[&str] = &["P", "K", "Ca", "Mg", "Na", "S", "C", "Si"];

const ELEMENT_TO_OXIDE: &[(&str, &str)] = &[
    ("P", "P2O5"),
    ("K", "K2O"),
    ("Ca", "CaO"),
    ("Mg", "MgO"),
    ("Na", "Na2O"),
    ("S", "SO4"),
    ("Si", "SiO2"),
    ("C", "CO3"),
];

/// How the NH4/NO3 columns of a record are to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NitrogenBasis {
    /// Values are masses of the NH4/NO3 ions (water analyses).
    Molecule,
    /// Values are nitrogen masses (fertilizer assays: "N as NH4").
    Element,
}

fn nitrogen_target(form: &str) -> Option<&'static str> {
    match form {
        "NH4" | "NH3" => Some("N_NH4"),
        "NO3" | "NO2" => Some("N_NO3"),
        "Ur-N" | "UREA" => Some("N_UREA"),
        "N" => Some("N_OTHER"),
        _ => None,
    }
}

pub fn project_elements(
    registry: &MolarMassRegistry,
    forms: &Concentrations,
    basis: NitrogenBasis,
    diag: &mut Diagnostics,
) -> ElementReport {
    let mut elements = ElementReport::new();

    for (form, mg) in forms.iter() {
        if mg == 0.0 {
            continue;
        }
        if let Some(target) = nitrogen_target(form) {
            let already_nitrogen = matches!(form, "Ur-N" | "N")
                || (basis == NitrogenBasis::Element && matches!(form, "NH4" | "NO3"));
            let n = if already_nitrogen {
                Some(mg)
            } else {
                units::to_element(registry, form, mg).or_record(diag, form)
            };
            if let Some(n) = n {
                elements.add(target, n);
            }
        } else if TRACE_ELEMENTS.contains(&form)
            || PASS_THROUGH.contains(&form)
            || PLAIN_ELEMENTS.contains(&form)
        {
            elements.add(form, mg);
        } else if let Some(relation) = units::relation(form) {
            if let Some(el) = units::to_element(registry, form, mg).or_record(diag, form) {
                elements.add(relation.element, el);
            }
        } else {
            diag.push(Degradation::missing(form, "no elemental projection for this form; ignored"));
        }
    }

    let n_total: f64 = NITROGEN_FORMS.iter().map(|k| elements.get(k)).sum();
    elements.add("N_total", n_total);
    elements
}

pub fn project_oxides(
    registry: &MolarMassRegistry,
    elements: &ElementReport,
    diag: &mut Diagnostics,
) -> OxideReport {
    let mut oxides = OxideReport::new();
    for &(element, oxide) in ELEMENT_TO_OXIDE {
        let mg = elements.get(element);
        if let Some(v) = units::from_element(registry, oxide, mg).or_record(diag, oxide) {
            oxides.add(oxide, v);
        }
    }
    for &symbol in TRACE_ELEMENTS.iter().chain(PASS_THROUGH) {
        oxides.add(symbol, elements.get(symbol));
    }
    oxides.add("N_total", elements.get("N_total"));
    oxides
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forms(pairs: &[(&str, f64)]) -> Concentrations {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn water_nitrogen_is_read_as_ion_mass() {
        let registry = MolarMassRegistry::builtin();
        let mut diag = Diagnostics::new();
        let elements = project_elements(
            &registry,
            &forms(&[("NH4", 18.038), ("NO3", 62.004)]),
            NitrogenBasis::Molecule,
            &mut diag,
        );
        assert!((elements.get("N_NH4") - 14.007).abs() < 1e-9);
        assert!((elements.get("N_NO3") - 14.007).abs() < 1e-9);
        assert!((elements.get("N_total") - 28.014).abs() < 1e-9);
        assert!(diag.is_empty());
    }

    #[test]
    fn assay_nitrogen_is_read_as_nitrogen_mass() {
        let registry = MolarMassRegistry::builtin();
        let mut diag = Diagnostics::new();
        let elements = project_elements(
            &registry,
            &forms(&[("NH4", 10.0), ("NO3", 140.0), ("Ur-N", 5.0)]),
            NitrogenBasis::Element,
            &mut diag,
        );
        assert_eq!(elements.get("N_NH4"), 10.0);
        assert_eq!(elements.get("N_NO3"), 140.0);
        assert_eq!(elements.get("N_UREA"), 5.0);
        assert!((elements.get("N_total") - 155.0).abs() < 1e-12);
    }

    #[test]
    fn formless_nitrogen_counts_in_total() {
        let registry = MolarMassRegistry::builtin();
        let mut diag = Diagnostics::new();
        let elements = project_elements(
            &registry,
            &forms(&[("N", 155.0), ("NO3", 10.0)]),
            NitrogenBasis::Element,
            &mut diag,
        );
        assert_eq!(elements.get("N_OTHER"), 155.0);
        assert!((elements.get("N_total") - 165.0).abs() < 1e-12);
        assert!(diag.is_empty());
    }

    #[test]
    fn oxides_project_to_elements_and_back() {
        let registry = MolarMassRegistry::builtin();
        let mut diag = Diagnostics::new();
        let input = forms(&[
            ("P2O5", 50.0),
            ("K2O", 200.0),
            ("CaO", 150.0),
            ("MgO", 60.0),
            ("Na2O", 5.0),
            ("SO4", 90.0),
            ("SiO2", 12.0),
            ("Fe", 1.5),
            ("Cl", 8.0),
            ("HCO3", 61.0),
        ]);
        let elements = project_elements(&registry, &input, NitrogenBasis::Molecule, &mut diag);
        assert!((elements.get("Ca") - 150.0 * 40.078 / 56.077).abs() < 1e-9);
        assert!((elements.get("P") - 50.0 * 2.0 * 30.974 / 141.943).abs() < 1e-9);
        assert_eq!(elements.get("Fe"), 1.5);
        assert_eq!(elements.get("Cl"), 8.0);
        assert_eq!(elements.get("HCO3"), 61.0);

        let oxides = project_oxides(&registry, &elements, &mut diag);
        for (symbol, value) in input.iter() {
            assert!((oxides.get(symbol) - value).abs() < 1e-9, "{symbol}");
        }
        assert!(diag.is_empty());
    }

    #[test]
    fn plain_element_assay_columns_pass_through() {
        let registry = MolarMassRegistry::builtin();
        let mut diag = Diagnostics::new();
        let elements = project_elements(
            &registry,
            &forms(&[("Ca", 190.0), ("S", 20.0)]),
            NitrogenBasis::Element,
            &mut diag,
        );
        assert_eq!(elements.get("Ca"), 190.0);
        assert_eq!(elements.get("S"), 20.0);
        assert!(!elements.contains("N_total"));
    }

    #[test]
    fn unknown_form_is_reported_not_counted() {
        let registry = MolarMassRegistry::builtin();
        let mut diag = Diagnostics::new();
        let elements = project_elements(
            &registry,
            &forms(&[("Humic", 3.0), ("K2O", 10.0)]),
            NitrogenBasis::Element,
            &mut diag,
        );
        assert!(elements.contains("K"));
        assert_eq!(elements.len(), 1);
        assert_eq!(diag.entries().len(), 1);
    }
}
