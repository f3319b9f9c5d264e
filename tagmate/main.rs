mod cli;
mod commands;
mod config;

use anyhow::{
  Context,
  Result,
};

use crate::cli::{
  CliOptions,
  Command,
};

fn setup_logging(verbosity: u8) -> Result<()> {
  let mut base_config = fern::Dispatch::new();

  base_config = match verbosity {
    0 => base_config.level(log::LevelFilter::Warn),
    1 => base_config.level(log::LevelFilter::Info),
    2 => base_config.level(log::LevelFilter::Debug),
    _3_or_more => base_config.level(log::LevelFilter::Trace),
  };

  let file_config = fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "{} {} [{}] {}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
        record.target(),
        record.level(),
        message
      ))
    })
    .chain(fern::log_file(tagmate_loader::log_file())?);

  base_config.chain(file_config).apply()?;

  Ok(())
}

fn main() -> Result<()> {
  let options = CliOptions::parse()?;

  tagmate_loader::initialize_config_file(options.config_file.clone());
  tagmate_loader::initialize_log_file(options.log_file.clone());
  setup_logging(options.verbosity).context("failed to initialize logging")?;

  let config_file = tagmate_loader::config_file();
  log::debug!("config file: {}", config_file.display());

  match options.command {
    Command::Wrap {
      targets,
      policy,
      write,
    } => commands::wrap(targets, policy, write, config::load_user(&config_file)),
    Command::Type {
      file,
      position,
      text,
      write,
    } => commands::type_text(
      &file,
      position,
      &text,
      write,
      config::load_user(&config_file),
    ),
    Command::Settings => commands::settings(&config_file),
  }
}
