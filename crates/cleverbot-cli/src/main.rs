use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use cleverbot_core::state::Moods;
use cleverbot_interaction::ConfigLayer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "cleverbot")]
#[command(version, about = "Talk to Cleverbot and manage saved conversations", long_about = None)]
struct Cli {
    #[command(flatten)]
    client: ClientArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Settings that override the config file and environment.
#[derive(Args, Debug, Clone, Default)]
pub struct ClientArgs {
    /// API key (overrides CLEVERBOT_KEY)
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Continuation token to resume from
    #[arg(long, global = true)]
    pub cs: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<f64>,

    /// API endpoint
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Wackiness, 0 (sensible) to 100 (wacky)
    #[arg(long, global = true)]
    pub mood1: Option<f64>,

    /// Talkativeness, 0 (shy) to 100 (talkative)
    #[arg(long, global = true)]
    pub mood2: Option<f64>,

    /// Attentiveness, 0 (self-centred) to 100 (attentive)
    #[arg(long, global = true)]
    pub mood3: Option<f64>,
}

impl ClientArgs {
    pub fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            key: self.key.clone(),
            url: self.url.clone(),
            timeout: self.timeout,
            moods: Moods {
                mood1: self.mood1,
                mood2: self.mood2,
                mood3: self.mood3,
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive conversation (the default)
    Chat {
        /// Snapshot file to resume from and save to
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Send one message and print the reply
    Say {
        /// Message text; omit to let the bot speak first
        input: Option<String>,

        /// Override an earlier turn, e.g. `--vtext 2="Hello"`
        #[arg(long = "vtext", value_name = "N=TEXT")]
        history: Vec<String>,

        /// Snapshot file to resume from and save to
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Convert a saved snapshot to another schema version
    Migrate {
        /// Snapshot to read
        input: PathBuf,

        /// Schema version to produce (defaults to the current one)
        #[arg(short, long)]
        target: Option<semver::Version>,

        /// Where to write the result (`-` for stdout)
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        None => commands::chat::run(&cli.client, None).await?,
        Some(Commands::Chat { state }) => commands::chat::run(&cli.client, state).await?,
        Some(Commands::Say {
            input,
            history,
            state,
        }) => commands::say::run(&cli.client, input, &history, state).await?,
        Some(Commands::Migrate {
            input,
            target,
            output,
        }) => commands::migrate::run(&input, target, &output)?,
    }

    Ok(())
}
