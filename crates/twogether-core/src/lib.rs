pub mod calendar;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod layout;
pub mod render;
pub mod schedule;
pub mod session;

use std::ffi::OsString;

use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting twogether CLI"
  );

  let mut cfg = config::AppConfig::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  )?;
  debug!(
    loaded_from = ?cfg.loaded_from,
    week_start = %cfg.calendar.week_start,
    day_cap = cfg.calendar.day_cap,
    "effective config"
  );

  let renderer =
    render::Renderer::new(&cfg);

  commands::dispatch(
    &cfg,
    &renderer,
    cli.command
  )?;

  info!("done");
  Ok(())
}
