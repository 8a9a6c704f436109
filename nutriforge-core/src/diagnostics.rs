//! Recoverable problems found during a calculation.
//!
//! Nothing here aborts a calculation. Each [`Degradation`] is logged the
//! moment it is recorded and handed back to the caller with the report.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// A species or fertilizer had no registry/catalog entry; its
    /// contribution was dropped.
    ReferenceDataMissing { subject: String, detail: String },
    /// A number was out of range or not finite and was coerced.
    InvalidInput {
        field: String,
        value: String,
        action: String,
    },
    /// Several representations of the same quantity were given; only
    /// `used` counted.
    AmbiguousRedundantInput { used: String, ignored: Vec<String> },
    /// A model was evaluated outside the range where it gives physical
    /// results; the affected value was clamped.
    OutsideModelRange { subject: String, detail: String },
}

impl Degradation {
    pub fn missing(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ReferenceDataMissing {
            subject: subject.into(),
            detail: detail.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, value: f64, action: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            value: value.to_string(),
            action: action.into(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Degradation>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a degradation once; repeats from other report views are dropped.
    pub fn push(&mut self, degradation: Degradation) {
        if self.entries.contains(&degradation) {
            return;
        }
        match &degradation {
            Degradation::ReferenceDataMissing { subject, detail } => {
                tracing::warn!(subject = %subject, "reference data missing: {detail}");
            }
            Degradation::InvalidInput {
                field,
                value,
                action,
            } => {
                tracing::warn!(field = %field, value = %value, "invalid input: {action}");
            }
            Degradation::AmbiguousRedundantInput { used, ignored } => {
                tracing::warn!(used = %used, ?ignored, "redundant input ignored");
            }
            Degradation::OutsideModelRange { subject, detail } => {
                tracing::warn!(subject = %subject, "outside model range: {detail}");
            }
        }
        self.entries.push(degradation);
    }

    /// Coerces a user-supplied number to a finite, non-negative value,
    /// recording what was done to it.
    pub fn non_negative(&mut self, field: &str, value: f64) -> f64 {
        if !value.is_finite() {
            self.push(Degradation::invalid(field, value, "non-finite value treated as 0"));
            0.0
        } else if value < 0.0 {
            self.push(Degradation::invalid(field, value, "negative value treated as 0"));
            0.0
        } else {
            value
        }
    }

    pub fn entries(&self) -> &[Degradation] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Degradation> {
        self.entries
    }
}
