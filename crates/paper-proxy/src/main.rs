//! Paper Proxy - Entry Point

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use paper_proxy::{Config, SourceRegistry, server::PaperServer};

#[derive(Parser, Debug)]
#[command(name = "paper-proxy")]
#[command(about = "HTTP gateway normalizing PubMed and arXiv records")]
#[command(version)]
struct Cli {
    /// HTTP server port
    #[arg(long, default_value = "8000", env = "PORT")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is not an error.
    let dotenv_path = dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        dotenv = ?dotenv_path,
        "Starting paper proxy"
    );

    let config = Config::from_env()?;
    tracing::info!(
        api_key = config.has_api_key(),
        email = config.entrez_email.is_some(),
        arxiv_pdf = config.arxiv_pdf,
        "Loaded configuration"
    );

    let sources = SourceRegistry::new(&config)?;
    PaperServer::new(sources).run_http(cli.port).await
}
