mod extract;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use partscout_core::Category;
use partscout_extract::TextOrigin;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "partscout-cli")]
#[command(about = "Search for and extract auto-part details")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a search through the headless browser and print the results as JSON
    Search {
        /// Free-text query, e.g. "brake pads honda civic"
        query: String,
        /// Category to run; repeat to run several in order (default: general, specialized)
        #[arg(long = "source", value_enum)]
        sources: Vec<SourceArg>,
    },
    /// Extract fields from plain text and print them as JSON
    Extract {
        /// How the text was produced
        #[arg(long, value_enum, default_value_t = OriginArg::Ocr)]
        origin: OriginArg,
        /// File to read; stdin when omitted
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceArg {
    General,
    Specialized,
}

impl From<SourceArg> for Category {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::General => Category::General,
            SourceArg::Specialized => Category::Specialized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OriginArg {
    Ocr,
    Page,
}

impl From<OriginArg> for TextOrigin {
    fn from(arg: OriginArg) -> Self {
        match arg {
            OriginArg::Ocr => TextOrigin::Ocr,
            OriginArg::Page => TextOrigin::Page,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { query, sources } => {
            let config = partscout_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            let categories = (!sources.is_empty())
                .then(|| sources.into_iter().map(Category::from).collect());
            search::run_search(&config, &query, categories).await
        }
        Commands::Extract { origin, file } => {
            init_tracing("warn")?;
            extract::run_extract(origin.into(), file.as_deref())
        }
    }
}

/// Logs go to stderr so stdout stays valid JSON.
fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
