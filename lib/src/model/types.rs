use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

pub const REFERENCE_X: [f64; 11] = [0., 5., 10., 15., 20., 25., 30., 35., 40., 45., 50.];
pub const REFERENCE_Y: [f64; 11] = [5., 8., 16., 19., 30., 35., 30., 43., 41., 44., 39.];
pub const REFERENCE_LEARNING_RATE: f64 = 0.001;
pub const REFERENCE_EPOCHS: usize = 1000;

/// Paired observations, `x[i]` explains `y[i]`. Never empty, both sides the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
  x: Vec<f64>,
  y: Vec<f64>,
}

impl Dataset {
  pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
    check_shapes(&x, &y)?;
    Ok(Self { x, y })
  }

  /// The eleven literal points of the reference run.
  pub fn reference() -> Self {
    Self {
      x: REFERENCE_X.to_vec(),
      y: REFERENCE_Y.to_vec(),
    }
  }

  pub fn x(&self) -> &[f64] {
    &self.x
  }

  pub fn y(&self) -> &[f64] {
    &self.y
  }

  pub fn len(&self) -> usize {
    self.x.len()
  }

  pub fn is_empty(&self) -> bool {
    self.x.is_empty()
  }
}

pub(crate) fn check_shapes(x: &[f64], y: &[f64]) -> Result<()> {
  if x.len() != y.len() {
    return Err(Error::invalid_input(format!(
      "x has {} samples but y has {}",
      x.len(),
      y.len()
    )));
  }
  if x.is_empty() {
    return Err(Error::invalid_input("dataset is empty"));
  }
  Ok(())
}

/// Slope and intercept of `yhat = w*x + b`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParameterState {
  pub w: f64,
  pub b: f64,
}

impl ParameterState {
  pub fn new(w: f64, b: f64) -> Self {
    Self { w, b }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningRate(f64);

impl LearningRate {
  pub fn new(value: f64) -> Result<Self> {
    if !value.is_finite() || value <= 0.0 {
      return Err(Error::invalid_input(format!(
        "learning rate must be a finite positive number, got {value}"
      )));
    }
    Ok(Self(value))
  }

  pub fn get(self) -> f64 {
    self.0
  }
}

impl Default for LearningRate {
  fn default() -> Self {
    Self(REFERENCE_LEARNING_RATE)
  }
}

/// Snapshot emitted after each epoch's update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochMetric {
  pub epoch: usize,
  #[serde(serialize_with = "float_or_string")]
  pub mse: f64,
  #[serde(serialize_with = "float_or_string")]
  pub w: f64,
  #[serde(serialize_with = "float_or_string")]
  pub b: f64,
}

// JSON has no NaN or infinity, those are written as "NaN", "inf" and "-inf".
fn float_or_string<S: Serializer>(
  value: &f64,
  serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
  if value.is_finite() {
    serializer.serialize_f64(*value)
  } else {
    serializer.collect_str(value)
  }
}

impl EpochMetric {
  pub fn is_finite(&self) -> bool {
    self.mse.is_finite() && self.w.is_finite() && self.b.is_finite()
  }
}

// f64's Display never switches to exponent notation, so small values keep all their digits.
impl fmt::Display for EpochMetric {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} mse is {}, parameters w:{}, b:{}",
      self.epoch, self.mse, self.w, self.b
    )
  }
}

pub struct TrainingParams {
  pub data: Dataset,
  pub initial: ParameterState,
  pub learning_rate: LearningRate,
  pub epochs: usize,
  pub halt_on_divergence: bool,
}

impl TrainingParams {
  pub fn reference() -> Self {
    Self {
      data: Dataset::reference(),
      initial: ParameterState::default(),
      learning_rate: LearningRate::default(),
      epochs: REFERENCE_EPOCHS,
      halt_on_divergence: false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_dataset_rejects_mismatched_lengths() {
    let err = Dataset::new(vec![1.0, 2.0], vec![1.0]).unwrap_err();
    assert!(matches!(err, Error::InvalidInput { .. }));
  }

  #[test]
  fn test_dataset_rejects_empty() {
    let err = Dataset::new(Vec::new(), Vec::new()).unwrap_err();
    assert!(matches!(err, Error::InvalidInput { .. }));
  }

  #[test]
  fn test_learning_rate_must_be_positive() {
    assert!(LearningRate::new(0.0).is_err());
    assert!(LearningRate::new(-0.1).is_err());
    assert!(LearningRate::new(f64::NAN).is_err());
    assert_eq!(LearningRate::new(0.5).unwrap().get(), 0.5);
  }

  #[test]
  fn test_metric_display_has_no_exponent() {
    let metric = EpochMetric {
      epoch: 3,
      mse: 0.000001,
      w: 1.5,
      b: -0.25,
    };
    assert_eq!(metric.to_string(), "3 mse is 0.000001, parameters w:1.5, b:-0.25");
  }

  #[test]
  fn test_metric_json_keeps_non_finite_values() {
    let metric = EpochMetric {
      epoch: 7,
      mse: f64::NAN,
      w: f64::INFINITY,
      b: f64::NEG_INFINITY,
    };
    assert_eq!(
      serde_json::to_string(&metric).unwrap(),
      r#"{"epoch":7,"mse":"NaN","w":"inf","b":"-inf"}"#
    );
    let finite = EpochMetric {
      epoch: 0,
      mse: 2.5,
      w: 0.5,
      b: -1.0,
    };
    assert_eq!(
      serde_json::to_string(&finite).unwrap(),
      r#"{"epoch":0,"mse":2.5,"w":0.5,"b":-1.0}"#
    );
  }
}
