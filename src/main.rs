//! flagwatch - evaluate a LaunchDarkly flag and follow its changes.
//!
//! ```text
//! flagwatch                          # use .env / environment
//! flagwatch --environment prod
//! flagwatch --flag-key dark-mode --context-name Robin
//! flagwatch --config flagwatch.toml -v
//! ```

use clap::Parser;
use flagwatch::app;
use flagwatch::logging;
use flagwatch::AppResult;
use flagwatch_config::{Environment, FlagwatchConfig, Validate};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

/// Watch a LaunchDarkly feature flag
#[derive(Parser, Debug)]
#[command(name = "flagwatch")]
#[command(version)]
#[command(about = "Evaluate a LaunchDarkly feature flag and follow its changes")]
struct Cli {
    /// Environment whose SDK key is used (dev, staging, prod)
    #[arg(short, long)]
    environment: Option<Environment>,

    /// Flag to watch
    #[arg(short, long)]
    flag_key: Option<String>,

    /// TOML or JSON file with settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// `.env` file to load instead of ./.env
    #[arg(long)]
    dotenv: Option<PathBuf>,

    /// Key of the evaluation context
    #[arg(long)]
    context_key: Option<String>,

    /// Display name of the evaluation context
    #[arg(long)]
    context_name: Option<String>,

    /// How often the flag is re-evaluated, in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn load_config(&self) -> AppResult<FlagwatchConfig> {
        let dotenv = self.dotenv.as_deref().and_then(|p| p.to_str());
        let mut config = FlagwatchConfig::load(dotenv)?;
        if let Some(ref path) = self.config {
            config = config.merge_file(path)?;
        }

        if let Some(environment) = self.environment {
            config.environment = environment;
        }
        if let Some(ref flag_key) = self.flag_key {
            config.flag_key = flag_key.clone();
        }
        if let Some(ref key) = self.context_key {
            config.context.key = key.clone();
        }
        if let Some(ref name) = self.context_name {
            config.context.name = Some(name.clone());
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval_ms = ms;
        }

        config.validate()?;
        Ok(config)
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = cli.load_config()?;
    app::run(config).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.status_line() {
                Some(line) => println!("{}", line),
                None => eprintln!("Error: {}", e),
            }
            error!(error = %e, "flagwatch exited with an error");
            ExitCode::FAILURE
        }
    }
}
