use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod workflow;

#[derive(Parser)]
#[command(name = "nutriforge", about = "Hydroponic nutrient-solution calculator")]
struct Cli {
    /// Directory holding fertilizers.csv, water_profiles/ and an optional species.yaml.
    #[arg(long, default_value = "./data/knowledge_base")]
    data_dir: PathBuf,
    /// Log filter (e.g. `debug`, `nutriforge_core=debug`); defaults to RUST_LOG, then `warn`.
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate a recipe and print the report as JSON.
    Calculate {
        recipe: PathBuf,
        /// Write the JSON report to a file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
        /// Also write the report as flat CSV rows.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show the canonical and elemental view of one water profile.
    Water {
        profile: String,
        /// Osmosis share in percent; defaults to the profile's own value.
        #[arg(long)]
        osmosis: Option<f64>,
    },
    /// Estimate EC and ion balance from a YAML map of ion label to mmol/L.
    Ec { ions: PathBuf },
    /// List the fertilizer catalog.
    Fertilizers,
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    eprintln!("--- Nutriforge ---");
    let kb = config::KnowledgeBase::load(&cli.data_dir)?;

    match cli.command {
        Commands::Calculate {
            recipe,
            out,
            pretty,
            csv,
        } => workflow::run_calculate(&kb, &recipe, out.as_deref(), pretty, csv.as_deref()),
        Commands::Water { profile, osmosis } => workflow::run_water(&kb, &profile, osmosis),
        Commands::Ec { ions } => workflow::run_ec(&kb, &ions),
        Commands::Fertilizers => workflow::run_fertilizers(&kb),
    }
}
