//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::schema::SchemaInferrer;
use crate::types::JsonValue;
use crate::warehouse::{Ingestor, TableCreator};
use serde_json::json;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Schema { kind } => self.schema(kind).await,
            Commands::CreateTable { kind } => self.create_table(kind).await,
            Commands::Ingest { path } => self.ingest(path).await,
            Commands::Serve { port } => {
                let config = self.load_config()?;
                config.validate()?;
                crate::cli::serve(crate::cli::ServerConfig::from_config(&config)?, *port).await
            }
        }
    }

    /// Load the config file and apply command line overrides
    fn load_config(&self) -> Result<SyncConfig> {
        let mut config = match &self.cli.config {
            Some(path) => SyncConfig::from_file(path)?,
            None => SyncConfig::default(),
        };
        config.apply_overrides(
            self.cli.project.clone(),
            self.cli.dataset.clone(),
            self.cli.exclude.clone(),
        );
        Ok(config)
    }

    async fn schema(&self, kind: &str) -> Result<()> {
        let config = self.load_config()?;
        let inferrer = SchemaInferrer::new(config.stats_source()?);

        let schema = inferrer.infer(kind).await?;
        println!("{}", schema.to_json_pretty());
        Ok(())
    }

    async fn create_table(&self, kind: &str) -> Result<()> {
        let config = self.load_config()?;
        config.validate()?;

        let creator = TableCreator::new(
            SchemaInferrer::new(config.stats_source()?),
            config.client_provider()?,
            config.target(),
        );

        let table = creator.create_table_for_kind(kind).await?;
        println!("{}", serde_json::to_string_pretty(&table)?);
        Ok(())
    }

    async fn ingest(&self, path: &Path) -> Result<()> {
        let config = self.load_config()?;
        config.validate()?;

        let raw = read_records(path)?;
        let count = raw.len();
        let ingestor =
            Ingestor::new(config.client_provider()?, config.target()).with_exclude(&config.exclude);

        let start = Instant::now();
        ingestor.ingest_json(raw).await?;
        let duration = start.elapsed();

        info!("Ingested {} records in {:?}", count, duration);
        println!(
            "{}",
            json!({
                "ingested": count,
                "duration_ms": duration.as_millis() as u64
            })
        );
        Ok(())
    }
}

fn read_records(path: &Path) -> Result<Vec<JsonValue>> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    parse_records(&contents)
}

/// Parse a records file: a JSON array, a single JSON object, or one JSON
/// value per line
pub fn parse_records(contents: &str) -> Result<Vec<JsonValue>> {
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if let Ok(value) = serde_json::from_str::<JsonValue>(trimmed) {
        return Ok(match value {
            JsonValue::Array(items) => items,
            other => vec![other],
        });
    }

    trimmed
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|e| Error::record_decode(format!("line {}: {e}", i + 1)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_records_array() {
        let records = parse_records(r#"[{"a": 1}, {"a": 2}]"#).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_records_single_object() {
        let records = parse_records(r#"{"a": 1}"#).unwrap();
        assert_eq!(records, vec![json!({"a": 1})]);
    }

    #[test]
    fn test_parse_records_jsonl() {
        let records = parse_records("{\"a\": 1}\n\n{\"a\": 2}\n").unwrap();
        assert_eq!(records, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn test_parse_records_empty() {
        assert!(parse_records("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_records_bad_line() {
        let err = parse_records("{\"a\": 1}\nnot json\n").unwrap_err();
        assert!(matches!(err, Error::RecordDecode { .. }));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_records(Path::new("/definitely/not/here.jsonl")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
