mod app_config;

use std::{error::Error, path::PathBuf};

use app_config::AppConfig;
use clap::{ArgAction, Args, Parser, Subcommand};
use descent::{subcommands, subcommands::ReportFormat, utils};
use tracing::{debug, Level};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
  /// YAML file with defaults for the training flags
  #[arg(short, long, value_name = "PATH", global = true)]
  config: Option<PathBuf>,
  /// More logging on stderr, repeat for trace
  #[arg(short, long, action = ArgAction::Count, global = true)]
  verbose: u8,
  /// Less logging on stderr
  #[arg(short, long, action = ArgAction::Count, global = true, conflicts_with = "verbose")]
  quiet: u8,
  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Fit `y = w*x + b` by gradient descent and print every epoch (the default)
  Train(TrainArgs),
}

#[derive(Args, Default)]
struct TrainArgs {
  /// File with one `x y` pair per line
  #[arg(short, long, value_name = "PATH")]
  data: Option<PathBuf>,
  #[arg(short, long, value_name = "INT", allow_negative_numbers = true)]
  epochs: Option<i64>,
  #[arg(short, long, value_name = "FLOAT")]
  learning_rate: Option<f64>,
  #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
  initial_w: Option<f64>,
  #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
  initial_b: Option<f64>,
  /// `text` or `json`
  #[arg(short, long)]
  format: Option<ReportFormat>,
  /// Fail once mse or the parameters stop being finite
  #[arg(long, overrides_with = "no_halt_on_divergence")]
  halt_on_divergence: bool,
  /// Keep reporting non-finite epochs, even if the config file enables the guard
  #[arg(long, overrides_with = "halt_on_divergence")]
  no_halt_on_divergence: bool,
}

impl TrainArgs {
  fn halt_on_divergence(&self) -> Option<bool> {
    match (self.halt_on_divergence, self.no_halt_on_divergence) {
      (true, _) => Some(true),
      (_, true) => Some(false),
      _ => None,
    }
  }
}

impl From<TrainArgs> for AppConfig {
  fn from(args: TrainArgs) -> Self {
    let halt_on_divergence = args.halt_on_divergence();
    Self {
      data: args.data,
      epochs: args.epochs,
      learning_rate: args.learning_rate,
      initial_w: args.initial_w,
      initial_b: args.initial_b,
      format: args.format,
      halt_on_divergence,
      log_level: None,
    }
  }
}

const LEVELS: [Level; 5] = [
  Level::ERROR,
  Level::WARN,
  Level::INFO,
  Level::DEBUG,
  Level::TRACE,
];

fn log_level(configured: Option<&str>, verbose: u8, quiet: u8) -> Result<Level, Box<dyn Error>> {
  let base = match configured {
    Some(level) => level.parse::<Level>()?,
    None => Level::INFO,
  };
  let index = LEVELS.iter().position(|l| *l == base).unwrap_or(2) as i32;
  let index = (index + verbose as i32 - quiet as i32).clamp(0, LEVELS.len() as i32 - 1);
  Ok(LEVELS[index as usize])
}

fn main() -> Result<(), Box<dyn Error>> {
  let args = Cli::parse();

  let file_config = match &args.config {
    Some(path) => AppConfig::from_file(path)?,
    None => AppConfig::default(),
  };
  let Command::Train(train_args) = args
    .command
    .unwrap_or_else(|| Command::Train(TrainArgs::default()));
  let config = file_config.merge(train_args.into());

  utils::init_logging_with(log_level(
    config.log_level.as_deref(),
    args.verbose,
    args.quiet,
  )?)?;
  debug!("{:?}", config);

  let (training_params, format) = config.into_training_params()?;
  subcommands::Train::new(training_params, format).run()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn test_cli_is_consistent() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_no_arguments_means_train() {
    let cli = Cli::try_parse_from(["descent"]).unwrap();
    assert!(cli.command.is_none());
    assert!(cli.config.is_none());
  }

  #[test]
  fn test_negative_epochs_are_accepted() {
    let cli = Cli::try_parse_from(["descent", "train", "--epochs", "-3", "-f", "json"]).unwrap();
    let Some(Command::Train(args)) = cli.command else {
      panic!("expected the train subcommand");
    };
    assert_eq!(args.epochs, Some(-3));
    assert_eq!(args.format, Some(ReportFormat::Json));
  }

  fn train_args(argv: &[&str]) -> TrainArgs {
    let cli = Cli::try_parse_from(argv.iter().copied()).unwrap();
    let Some(Command::Train(args)) = cli.command else {
      panic!("expected the train subcommand");
    };
    args
  }

  #[test]
  fn test_flags_can_turn_the_guard_off() {
    let file = AppConfig {
      halt_on_divergence: Some(true),
      ..Default::default()
    };
    let off = train_args(&["descent", "train", "--no-halt-on-divergence"]);
    assert_eq!(file.merge(off.into()).halt_on_divergence, Some(false));

    let file = AppConfig {
      halt_on_divergence: Some(true),
      ..Default::default()
    };
    let unset = train_args(&["descent", "train"]);
    assert_eq!(file.merge(unset.into()).halt_on_divergence, Some(true));

    let last_wins = train_args(&[
      "descent",
      "train",
      "--no-halt-on-divergence",
      "--halt-on-divergence",
    ]);
    assert_eq!(last_wins.halt_on_divergence(), Some(true));
  }

  #[test]
  fn test_log_level_counts() {
    assert_eq!(log_level(None, 0, 0).unwrap(), Level::INFO);
    assert_eq!(log_level(None, 1, 0).unwrap(), Level::DEBUG);
    assert_eq!(log_level(None, 5, 0).unwrap(), Level::TRACE);
    assert_eq!(log_level(Some("warn"), 0, 3).unwrap(), Level::ERROR);
    assert!(log_level(Some("loud"), 0, 0).is_err());
  }
}
