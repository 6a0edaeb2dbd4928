use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use kbqa_core::config::{Config, Settings};
use kbqa_core::intent::classify_intent;
use kbqa_core::knowledge::KnowledgeStore;
use kbqa_core::loader::KnowledgeLoader;
use kbqa_core::planner::plan_search;
use kbqa_core::taxonomy::Taxonomy;
use kbqa_core::types::{ChatResponse, PageId};
use kbqa_engine::{BackfillMode, CandleModelLoader, KeywordEngine, SmartEngine};

#[derive(Parser)]
#[command(name = "kbqa")]
#[command(about = "Answer questions from the site knowledge base")]
#[command(version)]
struct Cli {
    /// Enable debug logging (default: info, or RUST_LOG)
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding config.toml and config.<env>.toml
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question
    Ask {
        question: String,
        /// Use embeddings and the extractive QA model
        #[arg(long)]
        semantic: bool,
        /// Wait for the embedding index before answering (with --semantic)
        #[arg(long)]
        wait: bool,
        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the topics a question is classified into
    Classify { question: String },
    /// Show the search plan for a question
    Plan { question: String },
    /// List knowledge sections, optionally for one page
    Sections {
        #[arg(long)]
        page: Option<String>,
    },
    /// Load the models and build the embedding index
    Warm,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Config::load(&cli.config_dir).settings()?;
    let store = KnowledgeLoader::new().from_settings(&settings.knowledge)?;
    let taxonomy = Taxonomy::builtin()?;
    tracing::debug!(sections = store.len(), topics = taxonomy.topics().len(), "knowledge base ready");

    match cli.command {
        Commands::Ask { question, semantic, wait, json } => {
            let started = Instant::now();
            let response = if semantic {
                let engine = smart_engine(store, taxonomy, settings);
                engine.load().await?;
                tracing::info!(ms = started.elapsed().as_millis() as u64, "models loaded");
                if wait {
                    let state = engine.wait_for_index().await;
                    tracing::info!(?state, filled = engine.index().filled(), "embedding index settled");
                }
                engine.answer(&question).await?
            } else {
                KeywordEngine::new(store, taxonomy, settings).answer(&question)
            };
            tracing::info!(
                source = ?response.source,
                confidence = response.confidence,
                ms = started.elapsed().as_millis() as u64,
                "answered"
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_response(&response);
            }
        }
        Commands::Classify { question } => {
            for (i, id) in classify_intent(&taxonomy, &question).iter().enumerate() {
                let name = taxonomy.get(id).map_or("", |t| t.name.as_str());
                println!("  {}. {} ({})", i + 1, id, name);
            }
        }
        Commands::Plan { question } => {
            let steps = plan_search(&taxonomy, &classify_intent(&taxonomy, &question));
            for step in steps {
                println!("{}", step.reason);
                let pages: Vec<&str> = step.pages.iter().map(PageId::as_str).collect();
                println!("  pages: {}", if pages.is_empty() { "(none)".to_string() } else { pages.join(", ") });
            }
        }
        Commands::Sections { page } => {
            let pages: Vec<PageId> = page.map(|p| vec![PageId::from(p.as_str())]).unwrap_or_else(|| store.pages());
            for s in store.sections_for_pages(&pages) {
                println!("  [{}] {:<28} {}", s.id.0, s.page.as_str(), s.title);
            }
        }
        Commands::Warm => warm(smart_engine(store, taxonomy, settings)).await?,
    }
    Ok(())
}

fn smart_engine(store: KnowledgeStore, taxonomy: Taxonomy, settings: Settings) -> SmartEngine {
    let loader = Arc::new(CandleModelLoader::new(settings.models.clone()));
    SmartEngine::new(store, taxonomy, settings, loader).with_backfill_mode(BackfillMode::Background)
}

async fn warm(engine: SmartEngine) -> Result<()> {
    engine.load().await?;
    let pb = ProgressBar::new(engine.store().len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} sections")?
            .progress_chars("#>-"),
    );
    loop {
        pb.set_position(engine.index().filled() as u64);
        if engine.index_state().is_settled() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    pb.finish_and_clear();
    match engine.index_state() {
        kbqa_semantic::IndexState::Failed(e) => {
            tracing::error!(error = %e, "embedding backfill failed");
            anyhow::bail!("embedding backfill failed: {e}")
        }
        _ => println!("Indexed {} sections", engine.index().filled()),
    }
    Ok(())
}

fn print_response(r: &ChatResponse) {
    println!("{}\n", r.answer);
    println!("confidence: {:.2}", r.confidence);
    let sources: Vec<&str> = r.sources.iter().map(PageId::as_str).collect();
    println!("sources:    {}", sources.join(", "));
    println!("reasoning:");
    for line in &r.reasoning {
        println!("  {line}");
    }
}
