//! Serializable data model shared by the Nutriforge engine and its front ends.
//!
//! Every concentration map in the workspace is a [`Concentrations`] keyed by
//! species symbol with values in mg/L.

pub mod concentration;
pub mod fertilizer;
pub mod file_formats;
pub mod recipe;
pub mod species;
pub mod water;

pub use concentration::{
    CanonicalWaterRecord, Concentrations, ElementReport, OxideReport, RawWaterRecord,
};
