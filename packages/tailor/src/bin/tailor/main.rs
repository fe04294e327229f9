//! CLI for the tailoring pipelines.
//!
//! Reads inputs from files, prints pretty JSON on stdout, logs to stderr.
//! Uses Pinecone when `PINECONE_API_KEY` is set, otherwise an in-memory index.

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tailor::ai::OpenAI;
use tailor::{
    normalize_candidate_data, MemoryIndex, Persona, PineconeConfig, PineconeIndex, SectionType,
    Tailor, VectorIndex,
};

use crate::config::{load_tailor_config, Config};

#[derive(Parser)]
#[command(name = "tailor")]
#[command(about = "Tailor a CV to a job description")]
struct Cli {
    /// JSON file overriding pipeline settings (chunking, top-k, token budgets)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the CV, extract structured data and attach an evaluation
    Tailor { cv: PathBuf, job: PathBuf },

    /// Extract structured data only
    Extract { cv: PathBuf, job: PathBuf },

    /// Rephrase one CV section for the job
    Rephrase {
        /// professional-summary, experience, project, education, skills, certification
        section: String,
        content: PathBuf,
        job: PathBuf,
    },

    /// Recommend a CV template from structured data (JSON)
    Recommend { data: PathBuf, job: PathBuf },

    /// Evaluate CV content with the persona committee
    Committee { cv: PathBuf, job: PathBuf },

    /// Write a CV from an experience description
    Generate {
        job: PathBuf,
        experience: PathBuf,
        /// Treat the input as an existing CV to improve
        #[arg(long)]
        improve: bool,
    },
}

async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

fn output<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_tailor(config: &Config, cli_config: Option<&Path>) -> Result<Tailor> {
    let mut ai = OpenAI::new(config.openai_api_key.clone())
        .context("failed to create OpenAI client")?
        .with_model(&config.chat_model)
        .with_embedding_model(&config.embedding_model)
        .with_timeout(config.request_timeout)?;
    if let Some(base_url) = &config.openai_base_url {
        ai = ai.with_base_url(base_url);
    }
    let ai = Arc::new(ai);

    let index: Arc<dyn VectorIndex> = match &config.pinecone {
        Some(settings) => {
            let mut pinecone = PineconeConfig::new(&settings.api_key, &settings.index_host)
                .with_timeout(config.request_timeout);
            if let Some(namespace) = &settings.namespace {
                pinecone = pinecone.with_namespace(namespace);
            }
            tracing::info!(host = %settings.index_host, "Using Pinecone index");
            Arc::new(PineconeIndex::new(pinecone)?)
        }
        None => {
            tracing::info!("PINECONE_API_KEY not set, using in-memory index");
            Arc::new(MemoryIndex::new())
        }
    };

    let tailor_config = load_tailor_config(cli_config)?;
    Ok(Tailor::new(ai.clone(), ai, Some(index), tailor_config)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, stdout carries the JSON result)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tailor=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    let tailor = build_tailor(&config, cli.config.as_deref())?;

    match cli.command {
        Commands::Tailor { cv, job } => {
            let tailored = tailor.tailor(&read(&cv).await?, &read(&job).await?).await?;
            output(&tailored)
        }
        Commands::Extract { cv, job } => {
            let data = tailor
                .extract_cv_data(&read(&cv).await?, &read(&job).await?)
                .await?;
            output(&data)
        }
        Commands::Rephrase {
            section,
            content,
            job,
        } => {
            let section = SectionType::parse(&section);
            let rephrased = tailor
                .rephraser()
                .rephrase_section(&read(&content).await?, &section, &read(&job).await?)
                .await?;
            output(&json!({ "sectionType": section.label(), "rephrasedContent": rephrased }))
        }
        Commands::Recommend { data, job } => {
            let value: serde_json::Value = serde_json::from_str(&read(&data).await?)
                .with_context(|| format!("{} is not valid JSON", data.display()))?;
            let data = normalize_candidate_data(value)?;
            let recommendation = tailor
                .recommender()
                .recommend_template(&read(&job).await?, &data)
                .await;
            output(&recommendation)
        }
        Commands::Committee { cv, job } => {
            let result = tailor
                .committee()
                .evaluate_committee(
                    &read(&job).await?,
                    &read(&cv).await?,
                    &Persona::default_committee(),
                )
                .await;
            let report = result.report();
            output(&json!({ "evaluations": result, "report": report }))
        }
        Commands::Generate {
            job,
            experience,
            improve,
        } => {
            let job = read(&job).await?;
            let input = read(&experience).await?;
            let cv = if improve {
                tailor.writer().improve_cv(&input, &job).await?
            } else {
                tailor.writer().generate_cv(&job, &input).await?
            };
            output(&json!({ "cv": cv }))
        }
    }
}
