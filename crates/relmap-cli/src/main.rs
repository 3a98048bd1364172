//! relmap Command-Line Inspector
//!
//! Infers relation schemas from a SQLite database and prints them, together
//! with the associations their foreign keys suggest.

mod formatter;

use clap::Parser;
use formatter::{OutputFormat, RelationReport};
use relmap_core::{
    suggest_associations, CatalogSource, InferenceConfig, RegistryBuilder, RegistryConfig,
    RelationDeclaration, SchemaInferrer, SqliteCatalog, TypeMapping,
};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// relmap Command-Line Inspector
#[derive(Parser, Debug)]
#[command(name = "relmap")]
#[command(version, about = "Infer relation schemas and associations from a database")]
pub struct Args {
    /// SQLite database file
    pub database: PathBuf,

    /// Only show these relations (repeatable; default: all)
    #[arg(short, long = "relation", value_name = "NAME")]
    pub relations: Vec<String>,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Fail on column types with no semantic mapping
    #[arg(long)]
    pub strict: bool,

    /// Resolve the associations suggested by foreign keys
    #[arg(short, long)]
    pub associations: bool,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("relmap_core=info,relmap_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<String, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => RegistryConfig::from_path(path)?,
        None => RegistryConfig::default()
            .with_inference(InferenceConfig::new(TypeMapping::sqlite())),
    };
    if args.strict {
        config.inference.strict_types = true;
    }

    if !args.database.exists() {
        return Err(format!("database not found: {}", args.database.display()).into());
    }
    let catalog = SqliteCatalog::open(&args.database)?;

    let all = catalog.relation_names()?;
    let selected = if args.relations.is_empty() {
        all.clone()
    } else {
        args.relations.clone()
    };

    let mut builder = RegistryBuilder::new(config.clone());
    if args.associations {
        // Association targets must be registered too, so every relation is
        // declared even when only a few are shown.
        let inferrer = SchemaInferrer::new(&catalog, config.inference.clone());
        let schemas: Vec<_> = inferrer
            .infer_all()?
            .into_iter()
            .map(|inferred| inferred.schema)
            .collect();
        let suggestions = suggest_associations(&schemas, &config.naming);
        debug!(relations = schemas.len(), "Suggested associations");

        for name in all.iter().chain(selected.iter()) {
            let definitions = suggestions.get(name).cloned().unwrap_or_default();
            builder = builder.declare(
                RelationDeclaration::new(name.as_str())
                    .infer()
                    .with_definitions(definitions),
            );
        }
    } else {
        for name in &selected {
            builder = builder.declare(RelationDeclaration::new(name.as_str()).infer());
        }
    }

    let registry = builder.build(Some(&catalog))?;

    let reports: Vec<RelationReport<'_>> = selected
        .iter()
        .filter_map(|name| {
            registry.schema(name).map(|schema| RelationReport {
                schema,
                associations: if args.associations {
                    registry.associations(name).map(|associations| &**associations)
                } else {
                    None
                },
            })
        })
        .collect();

    let formatter = formatter::create_formatter(args.format);
    Ok(formatter.format_report(&reports, registry.degraded()))
}
