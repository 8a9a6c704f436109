use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Species symbol to mass concentration in mg/L.
///
/// Ordered so serialized reports are stable between runs. Missing keys read
/// as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Concentrations(BTreeMap<String, f64>);

/// Raw analyte values as typed in or stored in a water profile.
pub type RawWaterRecord = Concentrations;
/// Post-dilution water record in canonical oxide/ion forms.
pub type CanonicalWaterRecord = Concentrations;
/// Elemental view of a solution (plus the nitrogen sub-forms).
pub type ElementReport = Concentrations;
/// Horticultural oxide view of a solution.
pub type OxideReport = Concentrations;

impl Concentrations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> f64 {
        self.0.get(symbol).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.0.contains_key(symbol)
    }

    /// Overwrites the value stored for `symbol`.
    pub fn set(&mut self, symbol: impl Into<String>, mg_per_l: f64) {
        self.0.insert(symbol.into(), mg_per_l);
    }

    /// Adds to the running value for `symbol`, skipping exact zeros so that
    /// absent species stay absent.
    pub fn add(&mut self, symbol: &str, mg_per_l: f64) {
        if mg_per_l == 0.0 {
            return;
        }
        *self.0.entry(symbol.to_string()).or_insert(0.0) += mg_per_l;
    }

    /// Key-wise sum of two records.
    pub fn merged(&self, other: &Concentrations) -> Concentrations {
        let mut out = self.clone();
        for (symbol, value) in other.iter() {
            out.add(symbol, value);
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Concentrations {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
