use std::{error::Error, path::PathBuf};

use descent::{
  model::{
    read_dataset, Dataset, LearningRate, ParameterState, TrainingParams, REFERENCE_EPOCHS,
    REFERENCE_LEARNING_RATE,
  },
  subcommands::ReportFormat,
};
use serde::Deserialize;

/// AppConfig - every field can be omitted and then falls back to the reference run.
/// Also defines the config file format (YAML).
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
  /// Dataset file with one `x y` pair per line, the literal reference data otherwise
  pub data: Option<PathBuf>,
  /// Number of epochs, negative values train for zero epochs
  pub epochs: Option<i64>,
  pub learning_rate: Option<f64>,
  pub initial_w: Option<f64>,
  pub initial_b: Option<f64>,
  pub format: Option<ReportFormat>,
  /// Stop with an error once mse or the parameters stop being finite
  pub halt_on_divergence: Option<bool>,
  /// One of `error`, `warn`, `info`, `debug`, `trace`
  pub log_level: Option<String>,
}

impl AppConfig {
  pub fn from_file(path: &std::path::Path) -> Result<Self, Box<dyn Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
  }

  // merge configs where the second overwrites the first
  pub fn merge(self, other: Self) -> Self {
    Self {
      data: other.data.or(self.data),
      epochs: other.epochs.or(self.epochs),
      learning_rate: other.learning_rate.or(self.learning_rate),
      initial_w: other.initial_w.or(self.initial_w),
      initial_b: other.initial_b.or(self.initial_b),
      format: other.format.or(self.format),
      halt_on_divergence: other.halt_on_divergence.or(self.halt_on_divergence),
      log_level: other.log_level.or(self.log_level),
    }
  }

  pub fn into_training_params(self) -> descent::Result<(TrainingParams, ReportFormat)> {
    let data = match self.data {
      Some(path) => read_dataset(&path)?,
      None => Dataset::reference(),
    };
    let params = TrainingParams {
      data,
      initial: ParameterState::new(
        self.initial_w.unwrap_or_default(),
        self.initial_b.unwrap_or_default(),
      ),
      learning_rate: LearningRate::new(self.learning_rate.unwrap_or(REFERENCE_LEARNING_RATE))?,
      epochs: self
        .epochs
        .map_or(REFERENCE_EPOCHS, |e| usize::try_from(e).unwrap_or(0)),
      halt_on_divergence: self.halt_on_divergence.unwrap_or(false),
    };
    Ok((params, self.format.unwrap_or_default()))
  }
}
