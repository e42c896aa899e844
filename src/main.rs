//! justask CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use justask::{
    config::Config,
    embed::create_embedder,
    error::Result,
    llm::create_completion,
    models::{Question, Strategy},
    rag::RagPipeline,
    retrieve::{FanOutRetriever, QdrantSearch},
    router::Router,
    schema::SchemaDescriptor,
    sqlgen::{PgExecutor, SqlPipeline},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "justask")]
#[command(version, about = "Ask questions about demand and capacity data", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize justask configuration
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Ask a question
    Ask {
        /// The question, in plain English
        question: String,

        /// Force an answer strategy instead of automatic routing
        #[arg(short, long, value_enum)]
        strategy: Option<Strategy>,

        /// Print the generated SQL when the SQL path answered
        #[arg(long)]
        show_sql: bool,
    },

    /// Summarize the loaded relational schema descriptor
    Schema,

    /// Check the vector collections and schema file
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Init and completions work without an existing config
    if let Commands::Init { force } = cli.command {
        return handle_init(cli.config, force);
    }

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "justask", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),

        Commands::Ask {
            question,
            strategy,
            show_sql,
        } => {
            let router = build_router(&config).await?;
            let question = Question::new(question)?.with_strategy(strategy);

            let answer = router.route(&question).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                println!("{}", answer.text);
                if show_sql {
                    if let Some(sql) = &answer.sql {
                        println!("\n-- generated SQL --\n{}", sql);
                    }
                }
            }
        }

        Commands::Schema => {
            let schema = SchemaDescriptor::load(&config.schema_path())?;

            if cli.json {
                println!("{}", schema.to_prompt_json()?);
            } else {
                println!("Schema: {} tables", schema.len());
                for name in schema.table_names() {
                    let table = &schema.tables[name];
                    println!(
                        "  {} ({} columns, {} foreign keys)",
                        name,
                        table.columns.len(),
                        table.foreign_keys.len()
                    );
                }
            }
        }

        Commands::Status => {
            handle_status(&config, cli.json).await?;
        }
    }

    Ok(())
}

fn handle_init(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    // A .toml path means "put the config here"; anything else is a base dir
    let base_dir = match config_path {
        Some(path) if path.extension().map_or(false, |e| e == "toml") => path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(Config::default_base_dir),
        Some(path) => path,
        None => Config::default_base_dir(),
    };

    let mut config = Config::default();
    config.paths.base_dir = base_dir.clone();
    config.paths.config_file = base_dir.join("config.toml");

    if config.paths.config_file.exists() && !force {
        eprintln!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            config.paths.config_file.display()
        );
        std::process::exit(1);
    }

    config.save()?;

    println!("✓ justask initialized");
    println!("  Config: {}", config.paths.config_file.display());
    println!("\nNext steps:");
    println!("  1. Edit the config to point at your Qdrant and model backends");
    println!("  2. Export {} with the Postgres URL", config.database.url_env);
    println!("  3. Place the schema descriptor at {}", config.schema_path().display());

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(p) => Config::load(p),
        None => Config::load_from(None),
    }
}

async fn build_router(config: &Config) -> Result<Router> {
    let llm = create_completion(&config.completion)?;
    let embedder = create_embedder(&config.embedding)?;

    let search = QdrantSearch::connect(&config.qdrant_url, config.qdrant_api_key())?;
    let retriever = FanOutRetriever::new(
        Arc::new(search),
        config.collections.clone(),
        config.retrieval.per_collection_limit,
        config.retrieval.context_budget,
    );
    let rag = RagPipeline::new(embedder, retriever, Arc::clone(&llm));

    let schema = SchemaDescriptor::load(&config.schema_path())?;
    let executor = PgExecutor::connect(&config.database_url()?).await?;
    let sql = SqlPipeline::new(
        llm,
        Arc::new(executor),
        schema,
        config.database.dialect.clone(),
    );

    Ok(Router::new(
        sql,
        rag,
        config.router.fallback_enabled,
        config.router.default_strategy,
    ))
}

async fn handle_status(config: &Config, json: bool) -> Result<()> {
    let schema_status = match SchemaDescriptor::load(&config.schema_path()) {
        Ok(schema) => format!("ok ({} tables)", schema.len()),
        Err(e) => {
            warn!("Schema descriptor check failed: {}", e);
            "missing or invalid".to_string()
        }
    };

    let search = QdrantSearch::connect(&config.qdrant_url, config.qdrant_api_key())?;
    let mut collections = Vec::new();
    for name in &config.collections {
        let state = match search.collection_points(name).await {
            Ok(Some(points)) => format!("{} points", points),
            Ok(None) => "missing".to_string(),
            Err(e) => {
                warn!("Collection check failed for {}: {}", name, e);
                "unreachable".to_string()
            }
        };
        collections.push((name.clone(), state));
    }

    if json {
        let payload = serde_json::json!({
            "schema": schema_status,
            "collections": collections
                .iter()
                .map(|(name, state)| serde_json::json!({"name": name, "state": state}))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("Schema descriptor: {}", schema_status);
        println!("Collections:");
        for (name, state) in &collections {
            println!("  {}: {}", name, state);
        }
    }

    Ok(())
}
