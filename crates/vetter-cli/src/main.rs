//! Command-line front end for vetter.
//!
//! Loads subjects from a YAML file into the in-memory store, wires up the
//! decision engine, and prints decision records as JSON. With
//! `ANTHROPIC_API_KEY` set the semantic leg calls the live provider;
//! without it the leg degrades to neutral and decisions lean toward review.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vetter_core::{ScoringConfig, Subject};
use vetter_runtime::{
    AnthropicConfig, AnthropicProvider, BatchOptions, DecisionEngine, MemoryStore, ProviderError,
    RuntimeConfig, SemanticPayload, SemanticProvider,
};

#[derive(Parser)]
#[command(name = "vetter", version, about = "Profile legitimacy scoring")]
struct Cli {
    /// Scoring configuration file (YAML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one subject and print its decision record
    Decide {
        /// YAML file containing the subjects
        #[arg(long)]
        subjects: PathBuf,

        /// Subject id to score
        id: String,
    },
    /// Score many subjects under a concurrency limit
    Batch {
        /// YAML file containing the subjects
        #[arg(long)]
        subjects: PathBuf,

        /// Subject ids to score; all subjects in the file when omitted
        #[arg(long, value_delimiter = ',')]
        ids: Option<Vec<String>>,

        /// Maximum subjects in flight at once
        #[arg(long)]
        limit: Option<usize>,

        /// Stop scheduling new work after the first failure
        #[arg(long)]
        abort_on_error: bool,
    },
    /// Print the effective scoring configuration
    Config,
}

/// Stands in when no semantic provider is configured. Always errors, so the
/// semantic leg degrades to its neutral fallback.
struct OfflineSemantic;

#[async_trait]
impl SemanticProvider for OfflineSemantic {
    async fn assess(
        &self,
        _subject: &Subject,
        _rule_context: Option<&str>,
    ) -> Result<SemanticPayload, ProviderError> {
        Err(ProviderError::NotConfigured(
            "no semantic provider; set ANTHROPIC_API_KEY for live assessment".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "offline"
    }
}

fn semantic_provider() -> Arc<dyn SemanticProvider> {
    match AnthropicProvider::from_env(AnthropicConfig::default()) {
        Ok(provider) => Arc::new(provider),
        Err(_) => {
            tracing::warn!(
                "ANTHROPIC_API_KEY not set; semantic assessment will degrade to neutral"
            );
            Arc::new(OfflineSemantic)
        }
    }
}

fn load_scoring_config(path: Option<&PathBuf>) -> Result<ScoringConfig> {
    match path {
        Some(path) => ScoringConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(ScoringConfig::default()),
    }
}

fn load_subjects(path: &PathBuf) -> Result<Vec<Subject>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read subjects from {}", path.display()))?;
    serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse subjects in {}", path.display()))
}

fn build_engine(subjects: Vec<Subject>, scoring: ScoringConfig) -> (DecisionEngine, MemoryStore) {
    let store = MemoryStore::new();
    for subject in subjects {
        store.insert_subject(subject);
    }

    let config = RuntimeConfig {
        scoring,
        ..RuntimeConfig::default()
    };

    let engine = DecisionEngine::builder(semantic_provider())
        .subject_store(Arc::new(store.clone()))
        .decision_store(Arc::new(store.clone()))
        .config(config)
        .build();

    (engine, store)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let scoring = load_scoring_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Decide { subjects, id } => {
            let (engine, _store) = build_engine(load_subjects(&subjects)?, scoring);
            let record = engine.decide(&id).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Batch {
            subjects,
            ids,
            limit,
            abort_on_error,
        } => {
            let loaded = load_subjects(&subjects)?;
            let ids = ids.unwrap_or_else(|| loaded.iter().map(|s| s.id.clone()).collect());
            let (engine, _store) = build_engine(loaded, scoring);

            let outcome = engine
                .decide_many(
                    &ids,
                    BatchOptions {
                        concurrency_limit: limit,
                        continue_on_error: !abort_on_error,
                    },
                )
                .await;

            let items: Vec<serde_json::Value> = outcome
                .items
                .iter()
                .map(|item| match &item.result {
                    Ok(record) => serde_json::json!({
                        "subject_id": item.subject_id,
                        "decision": record.decision,
                        "final_score": record.final_score,
                        "confidence": record.confidence,
                    }),
                    Err(e) => serde_json::json!({
                        "subject_id": item.subject_id,
                        "error": e.to_string(),
                    }),
                })
                .collect();

            let summary = serde_json::json!({
                "total": outcome.total,
                "successful": outcome.successful,
                "failed": outcome.failed,
                "items": items,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);

            if outcome.failed > 0 {
                std::process::exit(1);
            }
        }
        Commands::Config => {
            print!("{}", serde_yaml::to_string(&scoring)?);
        }
    }

    Ok(())
}
