use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shopping_list::{
    parse_shopping_list_with_diagnostics, ExecCtx, GeneratorConfig, InMemoryStore, RecipeService,
    ShoppingListGenerator, UserId,
};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "shopping-list")]
#[command(about = "Turn meal descriptions into categorized shopping lists", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a saved model reply into a shopping list (JSON on stdout)
    Parse {
        /// File holding the reply; reads stdin when omitted
        file: Option<PathBuf>,

        /// Print parse diagnostics to stderr
        #[arg(long)]
        diagnostics: bool,
    },
    /// Ask the configured model for a shopping list and print the stored recipe
    Generate {
        /// Meal or ingredient description
        description: String,

        /// Opaque user id to store the recipe under
        #[arg(long, default_value = "local")]
        user: String,

        /// Override the model name
        #[arg(long)]
        model: Option<String>,
    },
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read reply file '{}'", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read reply from stdin")?;
            Ok(buf)
        }
    }
}

fn run_parse(file: Option<&PathBuf>, show_diagnostics: bool) -> Result<()> {
    let text = read_input(file)?;
    let (list, diag) = parse_shopping_list_with_diagnostics(&text);

    if show_diagnostics {
        eprintln!(
            "outcome={} lines={} empty_headers={} dropped={} orphaned={}",
            diag.outcome.as_str(),
            diag.lines_scanned,
            diag.headers_discarded,
            diag.lines_dropped,
            diag.orphaned_items
        );
    }

    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}

async fn run_generate(description: &str, user: &str, model: Option<String>) -> Result<()> {
    let mut config = GeneratorConfig::from_env();
    if let Some(model) = model {
        config = config.with_model(model);
    }
    log::debug!("Using {:?}", config);

    let ctx = ExecCtx::from_config(&config)?;
    let service = RecipeService::new(
        ShoppingListGenerator::from_config(&config),
        Arc::new(InMemoryStore::new()),
    );

    let user = UserId::new(user);
    let id = service
        .generate_shopping_list(&ctx, Some(&user), description)
        .await
        .context("Failed to generate shopping list")?;
    let recipe = service.recipe_by_id(Some(&user), id).await?;

    println!("{}", serde_json::to_string_pretty(&recipe)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.command {
        Commands::Parse { file, diagnostics } => run_parse(file.as_ref(), diagnostics),
        Commands::Generate {
            description,
            user,
            model,
        } => run_generate(&description, &user, model).await,
    }
}
