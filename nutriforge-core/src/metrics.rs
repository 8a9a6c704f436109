//! NPK ratio metrics.
//!
//! Nitrogen is counted as element (sum of the N sub-forms), phosphorus and
//! potassium as P2O5 and K2O, following fertilizer labelling.

use crate::projector::NITROGEN_FORMS;
use nutriforge_schemas::concentration::{ElementReport, OxideReport};
use serde::Serialize;

/// Oxide-report keys counted in the "all nutrients" total, next to the N sub-forms.
const OXIDE_TOTAL_KEYS: &[&str] = &[
    "P2O5", "K2O", "CaO", "MgO", "Na2O", "SO4", "Cl", "Fe", "Mn", "Cu", "Zn", "B", "Mo", "CO3",
    "SiO2",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NpkRatio {
    pub n: f64,
    pub p: f64,
    pub k: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutrientShare {
    pub n: f64,
    pub p2o5: f64,
    pub k2o: f64,
    pub cao: f64,
    pub mgo: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NpkValues {
    pub n_total: f64,
    pub p2o5: f64,
    pub k2o: f64,
    pub cao: f64,
    pub mgo: f64,
    pub total_all: f64,
    pub total_npk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NpkMetrics {
    pub values: NpkValues,
    /// N : P2O5 : K2O as percent of their sum; sums to 100 unless all zero.
    pub npk_percent: NpkRatio,
    /// Scaled so that P2O5 = 3; zero when there is no phosphorus.
    pub p_normalized: NpkRatio,
    /// Share of the total of all nutrient forms.
    pub all_percent: NutrientShare,
    pub npk_npk_pct: String,
    pub npk_p_norm: String,
    pub npk_all_pct: String,
}

/// Half-up rounding to a whole number for labels.
fn round0(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn percent_of(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

pub fn npk_metrics(elements: &ElementReport, oxides: &OxideReport) -> NpkMetrics {
    let n_total: f64 = NITROGEN_FORMS.iter().map(|k| elements.get(k)).sum();
    let p2o5 = oxides.get("P2O5");
    let k2o = oxides.get("K2O");
    let cao = oxides.get("CaO");
    let mgo = oxides.get("MgO");

    let total_all = n_total + OXIDE_TOTAL_KEYS.iter().map(|k| oxides.get(k)).sum::<f64>();
    let total_npk = n_total + p2o5 + k2o;

    let npk_percent = NpkRatio {
        n: percent_of(n_total, total_npk),
        p: percent_of(p2o5, total_npk),
        k: percent_of(k2o, total_npk),
    };
    let p_normalized = if p2o5 > 0.0 {
        NpkRatio {
            n: n_total / p2o5 * 3.0,
            p: 3.0,
            k: k2o / p2o5 * 3.0,
        }
    } else {
        NpkRatio::default()
    };
    let all_percent = NutrientShare {
        n: percent_of(n_total, total_all),
        p2o5: percent_of(p2o5, total_all),
        k2o: percent_of(k2o, total_all),
        cao: percent_of(cao, total_all),
        mgo: percent_of(mgo, total_all),
    };

    NpkMetrics {
        values: NpkValues {
            n_total,
            p2o5,
            k2o,
            cao,
            mgo,
            total_all,
            total_npk,
        },
        npk_npk_pct: format!(
            "{}-{}-{}",
            round0(npk_percent.n),
            round0(npk_percent.p),
            round0(npk_percent.k)
        ),
        npk_p_norm: if p2o5 > 0.0 {
            format!("{}-3-{}", round0(p_normalized.n), round0(p_normalized.k))
        } else {
            "0-3-0".to_string()
        },
        npk_all_pct: format!(
            "{}-{}-{}(+{}CaO +{}MgO)",
            round0(all_percent.n),
            round0(all_percent.p2o5),
            round0(all_percent.k2o),
            round0(all_percent.cao),
            round0(all_percent.mgo)
        ),
        npk_percent,
        p_normalized,
        all_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutriforge_schemas::concentration::Concentrations;

    fn record(pairs: &[(&str, f64)]) -> Concentrations {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn npk_percent_sums_to_100() {
        let elements = record(&[("N_NO3", 150.0), ("N_NH4", 10.0)]);
        let oxides = record(&[("P2O5", 80.0), ("K2O", 250.0), ("CaO", 200.0)]);
        let metrics = npk_metrics(&elements, &oxides);
        let sum = metrics.npk_percent.n + metrics.npk_percent.p + metrics.npk_percent.k;
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((metrics.values.n_total - 160.0).abs() < 1e-12);
        assert!((metrics.values.total_npk - 490.0).abs() < 1e-12);
        assert!((metrics.values.total_all - 690.0).abs() < 1e-12);
    }

    #[test]
    fn single_nutrient_is_100_percent() {
        let metrics = npk_metrics(&record(&[]), &record(&[("K2O", 5.0)]));
        assert_eq!(metrics.npk_percent, NpkRatio { n: 0.0, p: 0.0, k: 100.0 });
        assert_eq!(metrics.npk_npk_pct, "0-0-100");
        assert_eq!(metrics.npk_p_norm, "0-3-0");
    }

    #[test]
    fn p_normalized_scales_to_three() {
        let elements = record(&[("N_NO3", 100.0)]);
        let oxides = record(&[("P2O5", 50.0), ("K2O", 150.0)]);
        let metrics = npk_metrics(&elements, &oxides);
        assert_eq!(metrics.p_normalized, NpkRatio { n: 6.0, p: 3.0, k: 9.0 });
        assert_eq!(metrics.npk_p_norm, "6-3-9");
        assert_eq!(metrics.npk_npk_pct, "33-17-50");
    }

    #[test]
    fn empty_solution_gives_zero_labels() {
        let metrics = npk_metrics(&record(&[]), &record(&[]));
        assert_eq!(metrics.npk_npk_pct, "0-0-0");
        assert_eq!(metrics.npk_all_pct, "0-0-0(+0CaO +0MgO)");
        assert_eq!(metrics.npk_percent, NpkRatio::default());
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round0(2.5), 3);
        assert_eq!(round0(2.4999), 2);
        assert_eq!(round0(0.0), 0);
    }
}
