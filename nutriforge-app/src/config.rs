use anyhow::{anyhow, Context, Result};
use nutriforge_core::{FertilizerCatalog, MolarMassRegistry};
use nutriforge_schemas::{file_formats::WaterProfileFile, water::WaterProfile};
use std::{collections::BTreeMap, fs, path::Path};

/// All reference data a run needs, loaded once and then only read.
pub struct KnowledgeBase {
    pub registry: MolarMassRegistry,
    pub catalog: FertilizerCatalog,
    pub water_profiles: BTreeMap<String, WaterProfile>,
}

impl KnowledgeBase {
    /// Loads all data from the specified base directory.
    ///
    /// `species.yaml` is optional (the built-in table is used without it),
    /// the catalog is read from `fertilizers.csv` or `fertilizers.yaml`, and
    /// every YAML file under `water_profiles/` holds one profile.
    pub fn load(base_path: &Path) -> Result<Self> {
        eprintln!("Loading knowledge base from '{}'...", base_path.display());

        let species_path = base_path.join("species.yaml");
        let registry = if species_path.is_file() {
            MolarMassRegistry::from_yaml_path(&species_path)
                .with_context(|| format!("Failed to load species from {:?}", species_path))?
        } else {
            MolarMassRegistry::builtin()
        };

        let csv_path = base_path.join("fertilizers.csv");
        let yaml_path = base_path.join("fertilizers.yaml");
        let catalog = if csv_path.is_file() {
            FertilizerCatalog::from_csv_path(&csv_path)
                .with_context(|| format!("Failed to load fertilizers from {:?}", csv_path))?
        } else if yaml_path.is_file() {
            FertilizerCatalog::from_yaml_path(&yaml_path)
                .with_context(|| format!("Failed to load fertilizers from {:?}", yaml_path))?
        } else {
            return Err(anyhow!(
                "No fertilizer catalog (fertilizers.csv or fertilizers.yaml) in {:?}",
                base_path
            ));
        };

        let profiles_dir = base_path.join("water_profiles");
        let water_profiles = if profiles_dir.is_dir() {
            load_yaml_files_into_map(
                &profiles_dir,
                |file: WaterProfileFile| vec![file],
                |item: &WaterProfile| item.name.clone(),
            )?
        } else {
            BTreeMap::new()
        };

        tracing::info!(
            species = registry.len(),
            fertilizers = catalog.len(),
            water_profiles = water_profiles.len(),
            "knowledge base loaded"
        );
        Ok(Self {
            registry,
            catalog,
            water_profiles,
        })
    }

    pub fn water_profile(&self, name: &str) -> Result<&WaterProfile> {
        self.water_profiles.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.water_profiles.keys().map(String::as_str).collect();
            anyhow!("Unknown water profile '{}' (known: {})", name, known.join(", "))
        })
    }
}

/// Generic helper to load all YAML files in a directory into a map.
fn load_yaml_files_into_map<P, F, E, T, K>(
    dir_path: P,
    extract_vec: E,
    get_key: K,
) -> Result<BTreeMap<String, T>>
where
    P: AsRef<Path>,
    F: for<'de> serde::Deserialize<'de>, // The file wrapper struct
    E: Fn(F) -> Vec<T>,                  // Extracts the items from the wrapper
    K: Fn(&T) -> String,                 // Map key of one item
{
    let mut map = BTreeMap::new();
    for entry in fs::read_dir(dir_path.as_ref())
        .with_context(|| format!("Failed to read directory: {:?}", dir_path.as_ref()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |s| s == "yaml" || s == "yml") {
            let content = fs::read_to_string(&path)?;
            let file_wrapper: F = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML from {:?}", path))?;

            for item in extract_vec(file_wrapper) {
                let key = get_key(&item);
                if map.insert(key.clone(), item).is_some() {
                    return Err(anyhow!("Duplicate entry '{}' in {:?}", key, dir_path.as_ref()));
                }
            }
        }
    }
    Ok(map)
}
