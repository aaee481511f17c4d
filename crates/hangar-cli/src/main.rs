//! Hangar CLI
//!
//! Terminal front end for the generation-and-history manager.
//!
//! # Usage
//! ```bash
//! hangar generate "swept wing with a root chord of 5"
//! hangar history [--json]
//! hangar show [ID]
//! hangar clear
//! ```

use clap::{Parser, Subcommand};
use hangar_core::{
    FileStore, GenerateOutcome, GeneratedModel, GenerationManager, HangarConfig,
    HttpGenerationClient, MemoryStore, ModelId, PersistentStore,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Hangar - prompt-to-3D-model generation with a local history
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file (default: environment variables)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the persisted history (default: ~/.hangar/store)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a model from a natural-language description
    Generate {
        /// Description of the part to generate
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },

    /// List generated models, newest first
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the selected model (the newest one unless ID is given)
    Show {
        /// Model ID to select
        id: Option<String>,
    },

    /// Delete the whole history
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_target(false)
            .init();
    }

    let mut config = match &cli.config {
        Some(path) => HangarConfig::from_file(&path.to_string_lossy())?,
        None => HangarConfig::from_env()?,
    };
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    config.validate()?;

    let store = open_store(&config).await;
    let client = Arc::new(
        HttpGenerationClient::from_settings(&config.generator)?
            .with_header("X-Hangar-Client", format!("hangar-cli/{}", hangar_core::VERSION)),
    );
    let manager = GenerationManager::open(store, client).await;

    match cli.command {
        Commands::Generate { prompt } => {
            let prompt = prompt.join(" ");
            println!("Generating: {}", prompt.trim());
            match manager.generate(&prompt).await? {
                GenerateOutcome::Committed(model) => print_model(&model),
                GenerateOutcome::Superseded => println!("Request superseded by a newer one."),
            }
        }
        Commands::History { json } => {
            let history = manager.history();
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else if history.is_empty() {
                println!("History is empty.");
            } else {
                for (i, model) in history.iter().enumerate() {
                    println!(
                        "{:>2}. {}  {}  {}",
                        i + 1,
                        model.created_at.format("%Y-%m-%d %H:%M:%S"),
                        model.id,
                        model.prompt
                    );
                }
            }
        }
        Commands::Show { id } => {
            if let Some(raw) = id {
                let id: ModelId = raw
                    .parse()
                    .map_err(|e| anyhow::anyhow!("invalid model id '{}': {}", raw, e))?;
                if !manager.history().contains(&id) {
                    println!("Model {} not found, showing the newest one.", id);
                }
                manager.select_model(id).await;
            }
            match manager.selected_model() {
                Some(model) => print_model(&model),
                None => println!("History is empty."),
            }
        }
        Commands::Clear => {
            let count = manager.history().len();
            manager.clear_history().await;
            println!("Removed {} model(s).", count);
        }
    }

    Ok(())
}

/// File store in the configured directory, or an in-memory store if that is unusable
async fn open_store(config: &HangarConfig) -> Arc<dyn PersistentStore> {
    let dir = match config.storage.data_dir.clone() {
        Some(dir) => Ok(dir),
        None => FileStore::default_dir(),
    };

    let opened = match dir {
        Ok(dir) => FileStore::open(dir).await,
        Err(e) => Err(e),
    };

    match opened {
        Ok(store) => {
            tracing::debug!("Using history store at {}", store.base_path().display());
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!("{}; history will not be saved this session", e);
            Arc::new(MemoryStore::new())
        }
    }
}

fn print_model(model: &GeneratedModel) {
    println!();
    println!("  id:        {}", model.id);
    println!("  prompt:    {}", model.prompt);
    println!("  url:       {}", model.url);
    if let Some(thumbnail) = &model.thumbnail_url {
        println!("  thumbnail: {}", thumbnail);
    }
    println!("  created:   {}", model.created_at.to_rfc3339());
    if let Some(metadata) = &model.metadata {
        for (key, value) in metadata {
            println!("  {:<10} {}", format!("{}:", key), value);
        }
    }
}
