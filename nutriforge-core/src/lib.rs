//! Nutrient-solution chemistry for hydroponics.
//!
//! The entry point is [`SolutionCalculator::calculate`], built through
//! [`CalculatorBuilder`]. The lower modules (registry, units, water,
//! projector, ions, ec) are usable on their own.

pub mod calculation;
pub mod catalog;
pub mod diagnostics;
pub mod ec;
pub mod error;
pub mod ions;
pub mod logger;
pub mod metrics;
pub mod projector;
pub mod registry;
pub mod sluijsmann;
pub mod units;
pub mod water;

pub use calculation::{
    builder::CalculatorBuilder,
    engine::SolutionCalculator,
    state::{DoseContribution, SolutionReport, SolutionState},
};
pub use catalog::FertilizerCatalog;
pub use diagnostics::{Degradation, Diagnostics};
pub use error::NutriforgeError;
pub use registry::MolarMassRegistry;
