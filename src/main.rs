//! Themed countdown timers in the terminal.

use anyhow::Context;
use bubbletea_rs::Program;
use clap::Parser;
use std::path::PathBuf;
use themed_timers::app::{self, App, Startup};
use themed_timers::config::Config;
use themed_timers::logging::{self, LogConfig};
use themed_timers::presets;
use themed_timers::theme::ThemeId;
use themed_timers::time;

#[derive(Parser, Debug)]
#[command(
    name = "themed-timers",
    version,
    about = "Countdown timers themed as an analog clock, a melting candle or a melting ice cube"
)]
struct Cli {
    /// Theme shown at startup (clock, candle or ice).
    #[arg(long, value_name = "THEME")]
    theme: Option<ThemeId>,

    /// JSON configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Start a countdown of this many minutes right away.
    #[arg(long, value_name = "MINUTES", value_parser = presets::parse_minutes)]
    start: Option<u32>,

    /// Write logs to a file. Logs are discarded otherwise.
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Never ring the alarm.
    #[arg(long)]
    no_alarm: bool,
}

impl Cli {
    fn startup(&self) -> anyhow::Result<Startup> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => Config::default(),
        };
        if self.no_alarm {
            config.alarm.enabled = false;
        }
        Ok(Startup {
            theme: self.theme.unwrap_or(config.default_theme),
            config,
            start_minutes: self.start,
            clock: time::system(),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose).with_log_file(cli.log_file.clone());
    logging::init(&log_config).context("initializing logging")?;

    let startup = cli.startup()?;
    tracing::info!(theme = %startup.theme, alarm = startup.config.alarm.enabled, "starting");
    app::configure(startup)?;

    let program = Program::<App>::builder().alt_screen(true).build()?;
    program.run().await?;
    Ok(())
}
