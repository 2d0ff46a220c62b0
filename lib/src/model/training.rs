use std::iter::FusedIterator;

use itertools::zip_eq;
use tracing::{debug, instrument, trace, warn};

use super::types::{check_shapes, Dataset, EpochMetric, LearningRate, ParameterState};
use crate::error::{Error, Result};

/// Validates the dataset shapes and the learning rate and returns the starting point `w = b = 0`.
pub fn initialize(x: &[f64], y: &[f64], learning_rate: f64) -> Result<ParameterState> {
  check_shapes(x, y)?;
  LearningRate::new(learning_rate)?;
  Ok(ParameterState::default())
}

pub fn predict(x: &[f64], w: f64, b: f64) -> Vec<f64> {
  x.iter().map(|xi| w * xi + b).collect()
}

/// Analytic gradient of the mean squared error with respect to `(w, b)`.
///
/// Residuals are accumulated in ascending index order, so runs over the same data are
/// bit-identical.
pub fn gradient(x: &[f64], y: &[f64], w: f64, b: f64) -> (f64, f64) {
  let y_pred = predict(x, w, b);
  let m = x.len() as f64;

  let mut sum_dw = 0.0;
  let mut sum_db = 0.0;
  for ((pred, target), xi) in zip_eq(zip_eq(&y_pred, y), x) {
    let residual = pred - target;
    sum_dw += residual * xi;
    sum_db += residual;
  }

  (sum_dw / m, sum_db / m)
}

/// One gradient descent update.
pub fn step(x: &[f64], y: &[f64], w: f64, b: f64, learning_rate: f64) -> (f64, f64) {
  let (dw, db) = gradient(x, y, w, b);
  (w - learning_rate * dw, b - learning_rate * db)
}

pub fn mse(y_pred: &[f64], y: &[f64]) -> f64 {
  let total: f64 = zip_eq(y_pred, y).map(|(p, t)| (p - t) * (p - t)).sum();
  total / y.len() as f64
}

/// Lazily trains for exactly `epochs` epochs starting from `(w0, b0)`.
///
/// Nothing is computed until the returned iterator is polled. Each item is the state right after
/// that epoch's update. There's no early stopping.
#[instrument(level = "debug", skip(x, y), fields(samples = x.len()))]
pub fn train<'a>(
  x: &'a [f64],
  y: &'a [f64],
  w0: f64,
  b0: f64,
  learning_rate: f64,
  epochs: usize,
) -> Result<Training<'a>> {
  check_shapes(x, y)?;
  let learning_rate = LearningRate::new(learning_rate)?;
  debug!("starting from w:{w0}, b:{b0}");
  Ok(Training::new(
    x,
    y,
    ParameterState::new(w0, b0),
    learning_rate,
    epochs,
  ))
}

/// Owns validated training inputs, so runs started from it can't fail.
#[derive(Debug, Clone)]
pub struct Trainer {
  data: Dataset,
  learning_rate: LearningRate,
}

impl Trainer {
  pub fn new(data: Dataset, learning_rate: LearningRate) -> Self {
    Self {
      data,
      learning_rate,
    }
  }

  pub fn initialize(&self) -> ParameterState {
    ParameterState::default()
  }

  pub fn data(&self) -> &Dataset {
    &self.data
  }

  pub fn learning_rate(&self) -> LearningRate {
    self.learning_rate
  }

  pub fn train(&self, initial: ParameterState, epochs: usize) -> Training<'_> {
    Training::new(
      self.data.x(),
      self.data.y(),
      initial,
      self.learning_rate,
      epochs,
    )
  }
}

/// Iterator over the epochs of one training run.
#[derive(Debug, Clone)]
pub struct Training<'a> {
  x: &'a [f64],
  y: &'a [f64],
  state: ParameterState,
  learning_rate: f64,
  epoch: usize,
  epochs: usize,
}

impl<'a> Training<'a> {
  fn new(
    x: &'a [f64],
    y: &'a [f64],
    initial: ParameterState,
    learning_rate: LearningRate,
    epochs: usize,
  ) -> Self {
    Self {
      x,
      y,
      state: initial,
      learning_rate: learning_rate.get(),
      epoch: 0,
      epochs,
    }
  }

  /// Parameters after the last yielded epoch, or the initial ones before the first.
  pub fn state(&self) -> ParameterState {
    self.state
  }

  /// Stops at the first epoch whose mse or parameters are no longer finite, yielding
  /// [`Error::Diverged`] in its place.
  pub fn halt_on_divergence(self) -> HaltOnDivergence<'a> {
    HaltOnDivergence {
      inner: self,
      halted: false,
    }
  }
}

impl Iterator for Training<'_> {
  type Item = EpochMetric;

  fn next(&mut self) -> Option<EpochMetric> {
    if self.epoch >= self.epochs {
      return None;
    }
    let ParameterState { w, b } = self.state;
    let (w, b) = step(self.x, self.y, w, b, self.learning_rate);
    self.state = ParameterState { w, b };

    let y_pred = predict(self.x, w, b);
    let metric = EpochMetric {
      epoch: self.epoch,
      mse: mse(&y_pred, self.y),
      w,
      b,
    };
    trace!(epoch = metric.epoch, mse = metric.mse, w = w, b = b, "epoch done");
    self.epoch += 1;
    Some(metric)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let left = self.epochs.saturating_sub(self.epoch);
    (left, Some(left))
  }
}

impl ExactSizeIterator for Training<'_> {}

impl FusedIterator for Training<'_> {}

pub struct HaltOnDivergence<'a> {
  inner: Training<'a>,
  halted: bool,
}

impl HaltOnDivergence<'_> {
  pub fn state(&self) -> ParameterState {
    self.inner.state()
  }
}

impl Iterator for HaltOnDivergence<'_> {
  type Item = Result<EpochMetric>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.halted {
      return None;
    }
    let metric = self.inner.next()?;
    if metric.is_finite() {
      return Some(Ok(metric));
    }
    warn!("{metric}");
    self.halted = true;
    Some(Err(Error::Diverged {
      epoch: metric.epoch,
    }))
  }
}

impl FusedIterator for HaltOnDivergence<'_> {}
