use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use townlong_yak::{ApiGeneration, GameFlavour, Strategy};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// tyak - resolve Townlong Yak add-ons for retail and classic
#[derive(Parser)]
#[command(name = "tyak")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve add-ons to downloadable packages
    Resolve {
        /// Aliases (e.g., opie) or home-page URLs
        #[arg(required = true)]
        values: Vec<String>,

        /// Resolution strategy
        #[arg(short, long, default_value = "default")]
        strategy: Strategy,

        /// Override the configured game flavour (retail, classic)
        #[arg(short, long)]
        flavour: Option<GameFlavour>,

        /// Override the configured API generation (direct, catalogue)
        #[arg(long)]
        api: Option<ApiGeneration>,

        /// Print packages as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the alias a home-page URL refers to
    Alias {
        /// Add-on home-page URL
        url: String,

        /// Override the configured API generation (direct, catalogue)
        #[arg(long)]
        api: Option<ApiGeneration>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., game_flavour, cache.catalogue_ttl_minutes)
        key: String,
        /// Configuration value
        value: String,
    },

    /// Show the config file location
    Path,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove every cached response
    Clear,

    /// Show the cache location
    Path,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "townlong_yak=warn,tyak=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resolve {
            values,
            strategy,
            flavour,
            api,
            json,
        } => commands::resolve::run(values, strategy, flavour, api, json).await,
        Commands::Alias { url, api } => commands::alias::run(url, api),
        Commands::Config { action } => commands::config::run(&action),
        Commands::Cache { action } => commands::cache::run(&action).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "tyak", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
