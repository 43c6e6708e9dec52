use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// One `--rc section.field=value` config override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOverride {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for ConfigOverride {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected section.field=value, got: {s}"))?;
        let key = key.trim();
        match key.split_once('.') {
            Some((section, field)) if !section.is_empty() && !field.is_empty() => {}
            _ => return Err(anyhow!("override key must look like section.field, got: {key}")),
        }
        Ok(Self {
            key: key.to_ascii_lowercase(),
            value: value.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "twogether",
    version,
    about = "Twogether shared calendar: month layout and diary schedules"
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Config file (defaults to $TWOGETHER_CONFIG or the user config dir).
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Config override such as `calendar.day_cap=2`; repeatable.
    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<ConfigOverride>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<ConfigOverride>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Lay out one month of schedules.
    Month(MonthArgs),
    /// Resolve a click on one day.
    Day(DayArgs),
    /// Inspect or edit the stored session.
    #[command(subcommand)]
    Session(SessionCommand),
}

#[derive(Args, Debug, Clone)]
pub struct MonthArgs {
    /// Month as YYYY-MM; defaults to the current month.
    pub month: Option<String>,

    /// Read schedules from a JSON file instead of the backend.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Print the computed layout as JSON.
    #[arg(long)]
    pub json: bool,

    /// Override "today" (YYYY-MM-DD) for state classification.
    #[arg(long)]
    pub today: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DayArgs {
    /// Day as YYYY-MM-DD.
    pub date: String,

    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    Show,
    Set {
        #[arg(long)]
        token: String,

        #[arg(long)]
        user_id: Option<String>,

        #[arg(long)]
        nickname: Option<String>,

        #[arg(long)]
        partner_code: Option<String>,
    },
    Clear,
}

const LOG_ENV_VAR: &str = "TWOGETHER_LOG";

fn default_log_level(verbose: u8, quiet: u8) -> &'static str {
    match (quiet, verbose) {
        (2.., _) => "error",
        (1, _) => "warn",
        (0, 3..) => "trace",
        (0, 2) => "debug",
        (0, 1) => "info",
        (0, 0) => "warn",
    }
}

/// Logs go to stderr so `month --json` output stays clean. `TWOGETHER_LOG`
/// wins over `RUST_LOG`, which wins over the flags.
pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(default_log_level(verbose, quiet)))
        .map_err(|e| anyhow!("invalid log filter: {e}"))?;

    let stderr_is_tty = std::io::stderr().is_terminal();
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_ansi(stderr_is_tty)
        .try_init()
    {
        debug!(error = %err, "tracing subscriber already installed");
    }

    Ok(())
}
