use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use manualqa_cli::{
    display_banner, handle_input_with_history, print_answer, print_help, run_server,
};
use manualqa_core::{DistanceMetric, LanguageModel};
use manualqa_groq::{EmbeddingClient, GroqClient};
use manualqa_rag::{AnswerPipeline, PipelineConfig, QdrantVectorIndex, SystemClock};

#[derive(Parser)]
#[command(name = "manualqa")]
#[command(about = "Ask questions about your equipment manuals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Qdrant gRPC endpoint
    #[arg(long, env = "QDRANT_URL", default_value = "http://localhost:6334", global = true)]
    qdrant_url: String,

    /// Qdrant API key
    #[arg(long, env = "QDRANT_API_KEY", hide_env_values = true, global = true)]
    qdrant_api_key: Option<String>,

    /// Hits requested per collection
    #[arg(long, global = true)]
    top_k: Option<usize>,

    /// Distance metric the collections were built with (cosine or l2)
    #[arg(long, global = true)]
    metric: Option<DistanceMetric>,

    /// Maximum distance for a hit to be used
    #[arg(long, global = true)]
    max_distance: Option<f32>,

    /// Language model timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Skip the startup collection check
    #[arg(long, global = true)]
    no_verify: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question and exit
    Ask {
        question: String,
    },
    /// Interactive question loop (default)
    Interactive,
    /// Serve the HTTP API
    Serve {
        #[arg(long, env = "MANUALQA_BIND", default_value = "127.0.0.1:8000")]
        bind: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (pipeline, model_id) = build_pipeline(&cli).await?;
    let pipeline = Arc::new(pipeline);

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Ask { question } => {
            let answer = pipeline.answer(&question).await?;
            println!("{}", answer);
        }
        Commands::Serve { bind } => run_server(pipeline, bind).await?,
        Commands::Interactive => interactive(&pipeline, model_id.as_deref()).await?,
    }

    Ok(())
}

async fn build_pipeline(cli: &Cli) -> Result<(AnswerPipeline, Option<String>)> {
    let mut config = PipelineConfig::from_env()?;
    if let Some(metric) = cli.metric {
        config.metric = metric;
        config.max_distance = metric.default_max_distance();
    }
    if let Some(max_distance) = cli.max_distance {
        config.max_distance = max_distance;
    }
    if let Some(top_k) = cli.top_k {
        config.top_k = top_k;
    }
    if let Some(secs) = cli.timeout {
        config.generation.timeout = Duration::from_secs(secs);
    }

    let embedder = EmbeddingClient::from_env().context("embedding service configuration")?;

    let index = QdrantVectorIndex::new(&cli.qdrant_url, cli.qdrant_api_key.clone(), config.metric)?
        .with_payload_field(config.text_collection.clone(), "text")
        .with_payload_field(config.image_collection.clone(), "image_path");

    let mut pipeline = AnswerPipeline::new(
        config,
        Arc::new(embedder),
        Arc::new(index),
        Arc::new(SystemClock),
    )?;

    let model_id = match GroqClient::from_env() {
        Ok(client) => {
            let model_id = client.model_id().to_string();
            info!(model = %model_id, "language model configured");
            pipeline = pipeline.with_language_model(Arc::new(client));
            Some(model_id)
        }
        Err(err) => {
            warn!(error = %err, "no language model available, answers will be extractive");
            None
        }
    };

    if !cli.no_verify {
        pipeline.verify().await?;
    }

    Ok((pipeline, model_id))
}

async fn interactive(pipeline: &AnswerPipeline, model_id: Option<&str>) -> Result<()> {
    display_banner(model_id);

    let mut history = Vec::new();

    loop {
        let Some(input) = handle_input_with_history(&mut history).await? else {
            println!("{}", "Goodbye!".green());
            break;
        };

        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" | "quit" => {
                println!("{}", "Goodbye!".green());
                break;
            }
            "help" => {
                print_help();
                continue;
            }
            _ => {}
        }

        match pipeline.answer_with_outcome(&input).await {
            Ok(outcome) => print_answer(&outcome.answer, outcome.source),
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err) => eprintln!("{} {}", "Error:".red().bold(), err),
        }
    }

    Ok(())
}
