//! Fire behavior calculator
//!
//! Runs saved scenarios through the surface fire catalog and prints the
//! result tables.

mod render;

use clap::{Parser, Subcommand};
use fire_behavior_core::{
    catalog, default_configuration, default_outputs, GraphError, ResultTable, ScenarioFile,
    StoreError, UnitError, UnitSystem, UnitsRegistry, VariableKind,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "fire-behavior")]
#[command(about = "Surface fire behavior calculator", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one or more scenario files
    Run {
        /// Scenario JSON files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Report in metric units
        #[arg(short, long)]
        metric: bool,

        /// Print tables as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a value between unit phrases
    Convert {
        value: f64,
        from: String,
        to: String,
    },

    /// List the catalog variables with their native and display units
    Variables,

    /// Write a scenario with default inputs
    Template {
        /// Destination file
        path: PathBuf,

        /// Enable the fire size, spotting and scorch modules
        #[arg(long)]
        all_modules: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Units(#[from] UnitError),

    #[error("failed to encode table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{path}: {source}")]
    Scenario {
        path: PathBuf,
        #[source]
        source: Box<CliError>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load, configure and evaluate one scenario
fn run_scenario(
    units: &Arc<UnitsRegistry>,
    path: &Path,
    metric: bool,
) -> Result<(String, ResultTable), CliError> {
    let scenario = ScenarioFile::load(path)?;
    let mut graph = catalog::standard_graph(Arc::clone(units), scenario.configuration.clone())?;
    scenario.apply(&mut graph)?;
    if scenario.outputs.is_empty() {
        let outputs = default_outputs(graph.configuration());
        graph.request_outputs_by_name(&outputs[..])?;
    }
    if metric {
        let configuration = graph
            .configuration()
            .clone()
            .with_unit_system(UnitSystem::Metric);
        graph.configure(configuration)?;
    }
    let table = graph.run_from_stores()?;
    info!(
        "Scenario '{}': {} outputs, {} ranging variables, {} invocations",
        scenario.name,
        table.outputs.len(),
        table.rank(),
        graph.invocations()
    );
    Ok((scenario.name, table))
}

fn run(files: &[PathBuf], metric: bool, json: bool) -> Result<(), CliError> {
    let units = Arc::new(UnitsRegistry::standard());
    let results: Vec<Result<(String, ResultTable), CliError>> = files
        .par_iter()
        .map(|path| {
            run_scenario(&units, path, metric).map_err(|e| CliError::Scenario {
                path: path.clone(),
                source: Box::new(e),
            })
        })
        .collect();

    let mut failed = None;
    for result in results {
        match result {
            Ok((name, table)) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&table)?);
                } else {
                    println!("=== {name} ===");
                    println!("{}", render::render(&table));
                }
            }
            Err(e) => {
                error!("{}", e);
                failed.get_or_insert(e);
            }
        }
    }
    failed.map_or(Ok(()), Err)
}

fn convert(value: f64, from: &str, to: &str) -> Result<(), CliError> {
    let units = UnitsRegistry::standard();
    let converted = units.convert(value, from, to)?;
    println!("{value} {from} = {converted} {to}");
    Ok(())
}

fn variables() -> Result<(), CliError> {
    let graph = catalog::standard_graph(
        Arc::new(UnitsRegistry::standard()),
        default_configuration(),
    )?;
    for (id, variable) in graph.variables() {
        let role = if graph.is_leaf(id) { "input" } else { "computed" };
        match variable.kind() {
            VariableKind::Continuous(c) => println!(
                "{:<28} {:<9} {} [{} .. {}] {}, shown as {}",
                variable.name(),
                role,
                variable.store(),
                c.minimum(),
                c.maximum(),
                c.native_units(),
                c.display_units()
            ),
            VariableKind::Discrete(d) => println!(
                "{:<28} {:<9} {} of {}",
                variable.name(),
                role,
                d.active_item(),
                d.items().join(", ")
            ),
            VariableKind::Text(t) => println!("{:<28} {:<9} {}", variable.name(), role, t),
        }
    }
    Ok(())
}

fn template(path: &Path, all_modules: bool) -> Result<(), CliError> {
    let mut configuration = default_configuration();
    if all_modules {
        configuration = configuration
            .with_choice(catalog::properties::WIND_SPEED, "twenty_foot")
            .with_flag(catalog::properties::MODULE_SIZE, true)
            .with_flag(catalog::properties::MODULE_SPOT, true)
            .with_flag(catalog::properties::MODULE_SCORCH, true);
    }
    let mut graph = catalog::standard_graph(Arc::new(UnitsRegistry::standard()), configuration)?;
    let outputs = default_outputs(graph.configuration());
    graph.request_outputs_by_name(&outputs[..])?;

    // Keep only the inputs this configuration reads
    let mut scenario = ScenarioFile::capture("template", &graph);
    scenario.inputs.retain(|entry| {
        graph
            .variable_id(&entry.name)
            .is_ok_and(|id| graph.is_required(id))
    });
    scenario.save(path)?;
    info!("Wrote template scenario to {}", path.display());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            files,
            metric,
            json,
        } => run(&files, metric, json),
        Commands::Convert { value, from, to } => convert(value, &from, &to),
        Commands::Variables => variables(),
        Commands::Template { path, all_modules } => template(&path, all_modules),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
