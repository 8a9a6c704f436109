//! Fertilizer catalog: product name -> guaranteed composition.

use crate::error::NutriforgeError;
use nutriforge_schemas::{
    concentration::Concentrations,
    fertilizer::{Fertilizer, PhysicalForm},
    file_formats::FertilizerFile,
};
use std::{collections::BTreeMap, fs, io::Read, path::Path};

const NAME_HEADERS: &[&str] = &["name", "Düngername"];
const FORM_HEADERS: &[&str] = &["form", "Form"];
const WEIGHT_HEADERS: &[&str] = &["weight_factor", "Gewicht"];
const IGNORED_HEADERS: &[&str] = &["NR", "nr", "id"];

#[derive(Debug, Clone, Default)]
pub struct FertilizerCatalog {
    fertilizers: BTreeMap<String, Fertilizer>,
}

impl FertilizerCatalog {
    pub fn from_fertilizers(list: Vec<Fertilizer>) -> Result<Self, NutriforgeError> {
        let mut fertilizers = BTreeMap::new();
        for mut fertilizer in list {
            fertilizer.name = fertilizer.name.trim().to_string();
            validate(&fertilizer)?;
            if fertilizers.contains_key(&fertilizer.name) {
                return Err(NutriforgeError::InvalidReferenceData(format!(
                    "fertilizer '{}' is listed more than once",
                    fertilizer.name
                )));
            }
            fertilizers.insert(fertilizer.name.clone(), fertilizer);
        }
        Ok(Self { fertilizers })
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, NutriforgeError> {
        let display = path.display().to_string();
        let file = fs::File::open(path).map_err(|e| NutriforgeError::FileIO(display.clone(), e))?;
        Self::from_csv_reader(file, &display)
    }

    /// Reads the catalog table. `source` names the input in error messages.
    pub fn from_csv_reader<R: Read>(reader: R, source: &str) -> Result<Self, NutriforgeError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = reader
            .headers()
            .map_err(|e| NutriforgeError::CsvError(source.to_string(), e))?
            .clone();

        let column = |names: &[&str]| headers.iter().position(|h| names.contains(&h));
        let name_col = column(NAME_HEADERS).ok_or_else(|| NutriforgeError::CsvParsing {
            path: source.to_string(),
            line: 1,
            message: "missing 'name' column".to_string(),
        })?;
        let form_col = column(FORM_HEADERS);
        let weight_col = column(WEIGHT_HEADERS);

        let mut list = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| NutriforgeError::CsvError(source.to_string(), e))?;
            let line = record.position().map_or(0, |p| p.line());
            let parse_error = |message: String| NutriforgeError::CsvParsing {
                path: source.to_string(),
                line,
                message,
            };

            let name = record.get(name_col).unwrap_or_default();
            if name.is_empty() {
                continue;
            }
            let form = match form_col.and_then(|i| record.get(i)).unwrap_or_default() {
                "" => PhysicalForm::default(),
                other => serde_yaml::from_str::<PhysicalForm>(other)
                    .map_err(|_| parse_error(format!("unknown physical form '{other}'")))?,
            };
            let weight_factor = match weight_col.and_then(|i| record.get(i)).unwrap_or_default() {
                "" => 1.0,
                other => other
                    .parse::<f64>()
                    .map_err(|_| parse_error(format!("weight factor '{other}' is not a number")))?,
            };

            let mut composition_percent = BTreeMap::new();
            for (i, header) in headers.iter().enumerate() {
                if i == name_col
                    || Some(i) == form_col
                    || Some(i) == weight_col
                    || IGNORED_HEADERS.contains(&header)
                {
                    continue;
                }
                let cell = record.get(i).unwrap_or_default();
                if cell.is_empty() {
                    continue;
                }
                let value = cell.parse::<f64>().map_err(|_| {
                    parse_error(format!("'{header}' for '{name}' is not a number: '{cell}'"))
                })?;
                composition_percent.insert(header.to_string(), value);
            }

            list.push(Fertilizer {
                name: name.to_string(),
                form,
                weight_factor,
                composition_percent,
            });
        }
        Self::from_fertilizers(list)
    }

    pub fn from_yaml_path(path: &Path) -> Result<Self, NutriforgeError> {
        let display = path.display().to_string();
        let content =
            fs::read_to_string(path).map_err(|e| NutriforgeError::FileIO(display.clone(), e))?;
        let file: FertilizerFile = serde_yaml::from_str(&content)
            .map_err(|e| NutriforgeError::YamlParsing(display, e))?;
        Self::from_fertilizers(file.fertilizers)
    }

    pub fn lookup(&self, name: &str) -> Option<&Fertilizer> {
        self.fertilizers.get(name.trim())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fertilizers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fertilizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fertilizers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fertilizer> {
        self.fertilizers.values()
    }
}

fn validate(fertilizer: &Fertilizer) -> Result<(), NutriforgeError> {
    if fertilizer.name.is_empty() {
        return Err(NutriforgeError::InvalidReferenceData(
            "fertilizer without a name".to_string(),
        ));
    }
    if !fertilizer.weight_factor.is_finite() || fertilizer.weight_factor <= 0.0 {
        return Err(NutriforgeError::InvalidReferenceData(format!(
            "fertilizer '{}' has weight factor {}",
            fertilizer.name, fertilizer.weight_factor
        )));
    }
    for (column, pct) in &fertilizer.composition_percent {
        if !pct.is_finite() || *pct < 0.0 || *pct > 100.0 {
            return Err(NutriforgeError::InvalidReferenceData(format!(
                "fertilizer '{}' has {column} = {pct}%",
                fertilizer.name
            )));
        }
    }
    Ok(())
}

/// mg/L that `grams` of `fertilizer` add per assay column when dissolved in
/// `liters`. Zero-percent columns are left out.
pub fn dose_contribution(fertilizer: &Fertilizer, grams: f64, liters: f64) -> Concentrations {
    let effective_grams = grams * fertilizer.weight_factor;
    fertilizer
        .composition_percent
        .iter()
        .filter(|(_, pct)| **pct != 0.0)
        .map(|(column, pct)| (column.as_str(), effective_grams * pct / 100.0 / liters * 1000.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TABLE: &str = "\
NR,Düngername,Form,Gewicht,NO3,NH4,Ca,P2O5,K2O
1,Calcium Nitrate,fest,1,14.4,1.1,19,,
2,Mono Potassium Phosphate,fest,,,,,52,34
3,Liquid Blend,flüssig,1.3,5,,,,
";

    #[test]
    fn reads_german_headers() {
        let catalog = FertilizerCatalog::from_csv_reader(TABLE.as_bytes(), "inline").unwrap();
        assert_eq!(catalog.len(), 3);

        let can = catalog.lookup("Calcium Nitrate").unwrap();
        assert_eq!(can.form, PhysicalForm::Solid);
        assert_eq!(can.weight_factor, 1.0);
        assert_eq!(can.composition_percent.get("Ca"), Some(&19.0));
        assert!(!can.composition_percent.contains_key("P2O5"));
        assert!(!can.composition_percent.contains_key("NR"));

        let mkp = catalog.lookup("  Mono Potassium Phosphate ").unwrap();
        assert_eq!(mkp.weight_factor, 1.0);
        assert_eq!(mkp.composition_percent.len(), 2);

        let blend = catalog.lookup("Liquid Blend").unwrap();
        assert_eq!(blend.form, PhysicalForm::Liquid);
        assert_eq!(blend.weight_factor, 1.3);
    }

    #[test]
    fn non_numeric_cell_names_the_line() {
        let table = "name,Ca\nGypsum,lots\n";
        let err = FertilizerCatalog::from_csv_reader(table.as_bytes(), "bad.csv").unwrap_err();
        match err {
            NutriforgeError::CsvParsing { path, line, .. } => {
                assert_eq!(path, "bad.csv");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let table = "name,Ca\nGypsum,23\nGypsum,22\n";
        assert!(matches!(
            FertilizerCatalog::from_csv_reader(table.as_bytes(), "dup.csv"),
            Err(NutriforgeError::InvalidReferenceData(_))
        ));
    }

    #[test]
    fn contribution_scales_with_grams_weight_and_volume() {
        let fertilizer = Fertilizer {
            name: "Calcium Nitrate".to_string(),
            form: PhysicalForm::Solid,
            weight_factor: 1.0,
            composition_percent: [("NO3".to_string(), 15.5), ("Ca".to_string(), 19.0)]
                .into_iter()
                .collect(),
        };
        let mg = dose_contribution(&fertilizer, 10.0, 10.0);
        assert!((mg.get("Ca") - 190.0).abs() < 1e-9);
        assert!((mg.get("NO3") - 155.0).abs() < 1e-9);

        let heavier = Fertilizer {
            weight_factor: 1.25,
            ..fertilizer
        };
        assert!((dose_contribution(&heavier, 10.0, 20.0).get("Ca") - 118.75).abs() < 1e-9);
    }

    #[test]
    fn loads_yaml_catalog_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "schema_version: \"1.0\"\nfertilizers:\n  - name: Epsom Salt\n    composition_percent: {{ MgO: 16, SO4: 39 }}\n"
        )
        .unwrap();
        let catalog = FertilizerCatalog::from_yaml_path(file.path()).unwrap();
        let epsom = catalog.lookup("Epsom Salt").unwrap();
        assert_eq!(epsom.weight_factor, 1.0);
        assert_eq!(epsom.composition_percent.get("MgO"), Some(&16.0));
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Epsom Salt"]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = FertilizerCatalog::from_csv_path(Path::new("/nonexistent/fertilizers.csv"))
            .unwrap_err();
        assert!(matches!(err, NutriforgeError::FileIO(..)));
    }
}
