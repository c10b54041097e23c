use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use loom_engine::{ActivityResolver, parse_activity_file};
use loom_registry::{RegistryConfig, ServiceBuilder};
use loom_types::DefaultTypeSystem;
use serde_json::{Value as JsonValue, json};
use tracing::{Level, info};

const DEFAULT_SERVICE_ID: &str = "Loom::Service";

#[derive(Parser)]
#[command(name = "loom")]
#[command(about = "Resolve activity documents into service metadata", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a document into a fresh registry and print its metadata as JSON
    Resolve {
        /// YAML or JSON activity document
        file: PathBuf,
        /// Service identifier, overriding the configured one
        #[arg(long)]
        service: Option<String>,
    },
    /// Resolve a document and report the first error, if any
    Check {
        /// YAML or JSON activity document
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { file, service } => {
            let mut config = RegistryConfig::load();
            if service.is_some() {
                config.service_id = service;
            }
            let metadata = resolve_document(&file, &config)?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
        Commands::Check { file } => {
            let count = check_document(&file)?;
            println!("{}: {} activities ok", file.display(), count);
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_max_level(Level::INFO)
        .try_init();
}

/// Registers every activity of the document with a new service and renders its metadata.
fn resolve_document(file: &PathBuf, config: &RegistryConfig) -> Result<JsonValue> {
    let descriptors = parse_activity_file(file)?;
    let mut builder = ServiceBuilder::from_config(Arc::new(DefaultTypeSystem::new()), DEFAULT_SERVICE_ID, config);
    for descriptor in descriptors {
        builder.register_activity(descriptor);
    }
    let registry = builder
        .build()
        .with_context(|| format!("Failed to resolve activities in {}", file.display()))?;

    let (type_set, definitions) = registry.metadata()?;
    info!(service = %registry.identifier().name, definitions = definitions.len(), "metadata produced");
    Ok(json!({
        "typeSet": type_set.to_json(),
        "definitions": definitions.iter().map(|definition| definition.to_json()).collect::<Vec<_>>(),
    }))
}

fn check_document(file: &PathBuf) -> Result<usize> {
    let descriptors = parse_activity_file(file)?;
    let resolver = ActivityResolver::new(Arc::new(DefaultTypeSystem::new()));
    for descriptor in &descriptors {
        resolver
            .resolve(descriptor, "")
            .with_context(|| format!("Invalid {} '{}'", descriptor.type_name(), descriptor.name()))?;
    }
    Ok(descriptors.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"
- kind: workflow
  name: Deploy
  activities:
    - kind: action
      name: build
      interface: Builder
    - kind: collect
      name: Pings
      times: 2
      as: attempt
      activity:
        kind: action
        name: ping
"#;

    fn write_document(content: &str) -> (tempfile::TempDir, PathBuf) {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("activities.yaml");
        std::fs::write(&path, content).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn resolve_prints_definitions_in_post_order() {
        let (_temp_dir, path) = write_document(DOCUMENT);
        let config = RegistryConfig {
            service_id: Some("Acme::Deployer".into()),
            ..Default::default()
        };

        let metadata = resolve_document(&path, &config).unwrap();
        assert_eq!(metadata["typeSet"]["name"], json!("Acme"));
        let names: Vec<&str> = metadata["definitions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|definition| definition["identifier"]["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Deploy::build", "Deploy::Pings", "Deploy"]);
        assert_eq!(metadata["definitions"][0]["serviceId"]["name"], json!("Acme::Deployer"));
    }

    #[test]
    fn check_reports_the_failing_activity() {
        let (_temp_dir, path) = write_document(DOCUMENT);
        assert_eq!(check_document(&path).unwrap(), 1);

        let (_temp_dir, path) = write_document("kind: resource\nname: Orphan\n");
        let error = check_document(&path).unwrap_err();
        assert!(format!("{error:#}").contains("Orphan"));
    }
}
