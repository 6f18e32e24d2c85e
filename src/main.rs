use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formrelay::{Config, mailer::SmtpMailer};

/// formrelay - contact form relay
#[derive(Parser)]
#[command(name = "formrelay")]
#[command(about = "Validates contact form submissions and relays them by email", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Open a session with the SMTP relay and report whether it succeeded
    CheckSmtp,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.clone()).context("Failed to load configuration")?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    formrelay::observability::init_observability(
        "formrelay",
        env!("CARGO_PKG_VERSION"),
        &config,
    )?;

    match cli.command {
        Commands::Serve { host, port } => formrelay::server::serve(config, host, port).await,
        Commands::CheckSmtp => check_smtp_command(config).await,
    }
}

#[tracing::instrument(skip(config))]
async fn check_smtp_command(config: Config) -> Result<()> {
    let mailer = SmtpMailer::new(&config)?;

    if mailer.test_connection().await? {
        tracing::info!(smtp_host = %config.mail.host, "SMTP relay reachable");
        Ok(())
    } else {
        anyhow::bail!("SMTP relay {} did not accept the connection", config.mail.host)
    }
}
