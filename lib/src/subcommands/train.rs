use std::{
  io::{self, Write},
  str::FromStr,
  time::Instant,
};

use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
  error::Result,
  model::{EpochMetric, ParameterState, Trainer, TrainingParams},
};

/// How each epoch is written to the report sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
  #[default]
  Text,
  /// One JSON object per line.
  Json,
}

impl FromStr for ReportFormat {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "text" => Ok(ReportFormat::Text),
      "json" => Ok(ReportFormat::Json),
      other => Err(format!("unknown report format `{other}`, expected `text` or `json`")),
    }
  }
}

pub struct Train {
  training_params: TrainingParams,
  format: ReportFormat,
}

impl Train {
  pub fn new(training_params: TrainingParams, format: ReportFormat) -> Self {
    Self {
      training_params,
      format,
    }
  }

  /// Trains and reports every epoch on stdout.
  pub fn run(self) -> Result<ParameterState> {
    let stdout = io::stdout();
    self.run_with(&mut stdout.lock())
  }

  #[instrument(level = "debug", skip_all, fields(epochs = self.training_params.epochs))]
  pub fn run_with<W: Write>(self, out: &mut W) -> Result<ParameterState> {
    let TrainingParams {
      data,
      initial,
      learning_rate,
      epochs,
      halt_on_divergence,
    } = self.training_params;
    let trainer = Trainer::new(data, learning_rate);
    let data = trainer.data();
    info!(
      "x: ({},), y: ({},), learning rate {}",
      data.x().len(),
      data.y().len(),
      trainer.learning_rate().get()
    );
    let start = Instant::now();
    let run = trainer.train(initial, epochs);

    let state = if halt_on_divergence {
      let mut run = run.halt_on_divergence();
      for metric in run.by_ref() {
        report(out, self.format, &metric?)?;
      }
      run.state()
    } else {
      let mut run = run;
      for metric in run.by_ref() {
        report(out, self.format, &metric)?;
      }
      run.state()
    };
    out.flush()?;

    if epochs > 0 {
      info!(
        "Finished {epochs} epochs in {:.2}ms, w:{}, b:{}",
        start.elapsed().as_secs_f64() * 1e3,
        state.w,
        state.b
      );
    }
    Ok(state)
  }
}

fn report<W: Write>(out: &mut W, format: ReportFormat, metric: &EpochMetric) -> Result<()> {
  match format {
    ReportFormat::Text => writeln!(out, "{metric}")?,
    ReportFormat::Json => {
      serde_json::to_writer(&mut *out, metric).map_err(io::Error::from)?;
      writeln!(out)?;
    }
  }
  Ok(())
}
