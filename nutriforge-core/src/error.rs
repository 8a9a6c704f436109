use thiserror::Error;

#[derive(Debug, Error)]
pub enum NutriforgeError {
    #[error("Solution volume must be a positive, finite number of liters (got {0})")]
    InvalidVolume(f64),

    #[error("Fertilizer catalog not defined for the calculator")]
    CatalogNotDefined,

    #[error("Invalid EC options: {0}")]
    InvalidEcOptions(String),

    #[error("Invalid reference data: {0}")]
    InvalidReferenceData(String),

    #[error("Species '{0}' is defined more than once")]
    DuplicateSpecies(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to parse YAML from '{0}': {1}")]
    YamlParsing(String, #[source] serde_yaml::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),

    #[error("Malformed CSV row in '{path}' at line {line}: {message}")]
    CsvParsing {
        path: String,
        line: u64,
        message: String,
    },
}
