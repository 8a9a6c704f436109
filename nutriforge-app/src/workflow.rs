use crate::config::KnowledgeBase;
use anyhow::{Context, Result};
use nutriforge_core::{
    diagnostics::{Degradation, Diagnostics},
    ec, ions,
    ions::IonSet,
    logger::ReportLogger,
    projector::{self, NitrogenBasis},
    water, CalculatorBuilder, SolutionReport,
};
use nutriforge_schemas::{
    concentration::{CanonicalWaterRecord, ElementReport, OxideReport, RawWaterRecord},
    fertilizer::Fertilizer,
    recipe::{CalculationRequest, Recipe},
};
use serde::Serialize;
use std::{collections::BTreeMap, fs, path::Path};

#[derive(Serialize)]
struct CalculationOutput<'a> {
    generated_at: String,
    recipe: &'a Recipe,
    report: &'a SolutionReport,
}

#[derive(Serialize)]
struct WaterOutput<'a> {
    profile: &'a str,
    osmosis_percent: f64,
    canonical_mg_per_l: CanonicalWaterRecord,
    elements_mg_per_l: ElementReport,
    oxides_mg_per_l: OxideReport,
    degradations: Vec<Degradation>,
}

#[derive(Serialize)]
struct EcOutput {
    ions: IonSet,
    ion_balance: ions::IonBalanceReport,
    ec: ec::EcReport,
    degradations: Vec<Degradation>,
}

pub fn load_recipe(path: &Path) -> Result<Recipe> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read recipe {:?}", path))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse recipe {:?}", path))
}

/// Picks the water record for a recipe: the named profile, overlaid key by
/// key with any inline values. Osmosis falls back to the profile's own value.
pub fn resolve_request(recipe: &Recipe, kb: &KnowledgeBase) -> Result<CalculationRequest> {
    let (mut water_mg_per_l, profile_osmosis) = match &recipe.water_profile {
        Some(name) => {
            let profile = kb.water_profile(name)?;
            (profile.mg_per_l.clone(), profile.osmosis_percent)
        }
        None => (RawWaterRecord::new(), 0.0),
    };
    if let Some(inline) = &recipe.water_mg_per_l {
        for (species, value) in inline.iter() {
            water_mg_per_l.set(species, value);
        }
    }

    tracing::debug!(
        profile = recipe.water_profile.as_deref().unwrap_or("-"),
        species = water_mg_per_l.len(),
        "water record resolved"
    );
    Ok(CalculationRequest {
        liters: recipe.liters,
        fertilizers: recipe.fertilizers.clone(),
        water_mg_per_l,
        osmosis_percent: recipe.osmosis_percent.unwrap_or(profile_osmosis),
        options: recipe.options,
    })
}

pub fn run_calculate(
    kb: &KnowledgeBase,
    recipe_path: &Path,
    out: Option<&Path>,
    pretty: bool,
    csv: Option<&Path>,
) -> Result<()> {
    eprintln!("\n--- Calculating '{}' ---", recipe_path.display());
    let recipe = load_recipe(recipe_path)?;
    let request = resolve_request(&recipe, kb)?;

    let calculator = CalculatorBuilder::new()
        .with_registry(kb.registry.clone())
        .with_catalog(kb.catalog.clone())
        .build()?;
    tracing::info!(
        liters = request.liters,
        doses = request.fertilizers.len(),
        osmosis_percent = request.osmosis_percent,
        "running calculation"
    );
    let report = calculator.calculate(&request)?;

    for dose in report.unresolved_doses() {
        tracing::warn!(fertilizer = %dose.name, "fertilizer not in the catalog; skipped");
    }

    let output = CalculationOutput {
        generated_at: chrono::Utc::now().to_rfc3339(),
        recipe: &recipe,
        report: &report,
    };
    write_json(&output, out, pretty)?;

    if let Some(csv_path) = csv {
        let label = recipe_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recipe".to_string());
        let csv_display = csv_path.display().to_string();
        let mut logger = ReportLogger::new(&csv_display)
            .with_context(|| format!("Failed to create report CSV {:?}", csv_path))?;
        logger.log_report(&label, &report)?;
        tracing::info!(path = %csv_display, "report rows written");
    }

    eprintln!(
        "Done: EC25 {:.2} mS/cm, NPK {}, {} degradation(s).",
        report.combined.ec.at(25.0).unwrap_or(0.0),
        report.npk.npk_npk_pct,
        report.degradations.len()
    );
    Ok(())
}

pub fn run_water(kb: &KnowledgeBase, name: &str, osmosis: Option<f64>) -> Result<()> {
    let profile = kb.water_profile(name)?;
    let mut diag = Diagnostics::new();
    let percent = osmosis.unwrap_or(profile.osmosis_percent);
    let dilution = water::DilutionFactor::from_osmosis_percent(percent, &mut diag);
    let canonical = water::normalize_water(&kb.registry, &profile.mg_per_l, dilution, &mut diag);
    let elements =
        projector::project_elements(&kb.registry, &canonical, NitrogenBasis::Molecule, &mut diag);
    let oxides = projector::project_oxides(&kb.registry, &elements, &mut diag);

    let output = WaterOutput {
        profile: &profile.name,
        osmosis_percent: dilution.osmosis_percent(),
        canonical_mg_per_l: canonical,
        elements_mg_per_l: elements,
        oxides_mg_per_l: oxides,
        degradations: diag.into_vec(),
    };
    write_json(&output, None, true)
}

pub fn run_ec(kb: &KnowledgeBase, ions_path: &Path) -> Result<()> {
    let content = fs::read_to_string(ions_path)
        .with_context(|| format!("Failed to read ion table {:?}", ions_path))?;
    let labels: BTreeMap<String, f64> = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse ion table {:?}", ions_path))?;
    tracing::debug!(ions = labels.len(), "ion table loaded");

    let mut diag = Diagnostics::new();
    let ions = IonSet::from_mmol_labels(&kb.registry, &labels, &mut diag);
    let ion_balance = ions::ion_balance(&ions);
    let ec = ec::estimate_ec(&ions, &ec::EcOptions::default(), &mut diag);

    let output = EcOutput {
        ions,
        ion_balance,
        ec,
        degradations: diag.into_vec(),
    };
    write_json(&output, None, true)
}

pub fn run_fertilizers(kb: &KnowledgeBase) -> Result<()> {
    let fertilizers: Vec<&Fertilizer> = kb.catalog.iter().collect();
    write_json(&fertilizers, None, true)
}

fn write_json<T: Serialize>(value: &T, out: Option<&Path>, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    match out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
