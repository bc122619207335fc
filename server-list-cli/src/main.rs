use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use server_list::logging::{self, LoggingMode};
use server_list::{ChannelDelegate, LoadEvent, LoaderConfig, PublicServerList};

pub mod render;

use render::RenderOptions;

/// Public server list browser
///
/// Fetches the public voice-chat server list and prints it grouped by
/// continent and country.
#[derive(Parser, Debug)]
#[command(name = "server-list")]
#[command(about = "Browse the public voice-chat server list")]
#[command(version)]
pub struct Args {
    /// Feed URL (defaults to the public endpoint)
    #[arg(short, long)]
    pub url: Option<String>,

    /// Request timeout in seconds (overrides SERVER_LIST_TIMEOUT_SECS)
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// List individual servers under each country
    #[arg(short, long)]
    pub servers: bool,

    /// Only show this continent (code or name)
    #[arg(short, long)]
    pub continent: Option<String>,

    /// Log mode (silent, development, debug)
    #[arg(long, default_value = "development")]
    pub log_mode: String,

    /// Log filter directive, e.g. `debug` or `server_list=trace`
    /// (overrides SERVER_LIST_LOG_LEVEL and RUST_LOG)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Validate command line arguments
    pub fn validate(&self) -> Result<()> {
        if self.timeout == Some(0) {
            return Err(anyhow::anyhow!("Timeout must be positive"));
        }

        match self.log_mode.to_lowercase().as_str() {
            "silent" | "development" | "dev" | "debug" => Ok(()),
            _ => Err(anyhow::anyhow!(
                "Invalid log mode '{}'. Valid modes: silent, development, debug",
                self.log_mode
            )),
        }
    }

    /// Loader configuration: environment first, then command line overrides
    pub fn loader_config(&self) -> Result<LoaderConfig> {
        let mut config = LoaderConfig::from_env().context("Invalid loader environment")?;

        if let Some(url) = &self.url {
            config = config.with_url(url.clone());
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }

        config.validate().context("Invalid loader configuration")?;
        Ok(config)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_servers: self.servers,
            continent: self.continent.clone(),
        }
    }
}

/// How long to wait for the load callback: the request timeout plus a grace period
fn wait_budget(config: &LoaderConfig) -> Duration {
    config.timeout.saturating_add(Duration::from_secs(5))
}

fn main() -> Result<()> {
    let args = Args::parse();
    args.validate()?;

    let mode: LoggingMode = logging::mode_from_str(&args.log_mode);
    logging::init_logging_with_level(mode, args.log_level.as_deref())
        .context("Failed to initialize logging")?;

    let config = args.loader_config()?;
    info!("Fetching server list from {}", config.url);

    let budget = wait_budget(&config);
    let list = PublicServerList::with_config(config);
    let (delegate, events) = ChannelDelegate::new();
    let delegate = Arc::new(delegate);
    list.set_delegate(delegate.clone());

    list.load();
    let event = events
        .recv_timeout(budget)
        .context("Timed out waiting for the server list")?;
    list.wait();

    match event {
        LoadEvent::Loaded => debug!("Server list loaded"),
        LoadEvent::Failed(e) => return Err(e).context("Failed to load server list"),
    }

    let model = list
        .model()
        .context("Load reported success but no model is available")?;

    let options = args.render_options();
    if args.json {
        println!("{}", render::render_json(&model, &options)?);
    } else {
        print!("{}", render::render_text(&model, &options));
    }

    Ok(())
}
