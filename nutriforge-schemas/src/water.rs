use crate::concentration::RawWaterRecord;
use serde::{Deserialize, Serialize};

/// A stored water analysis. The engine only ever reads these.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WaterProfile {
    pub name: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub osmosis_percent: f64,
    #[serde(default)]
    pub mg_per_l: RawWaterRecord,
}
