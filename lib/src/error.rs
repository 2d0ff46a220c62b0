use std::{
  error,
  fmt::{self, Display},
  io,
};

/// The result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
  /// Inconsistent dataset shapes or an unusable hyperparameter, caught before training.
  InvalidInput { reason: String },
  /// Raised only by the opt-in divergence guard.
  Diverged { epoch: usize },
  /// A dataset file line that isn't a pair of numbers. `line` is 1-based.
  Parse { line: usize, content: String },
  Io(io::Error),
}

impl Error {
  pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
    Error::InvalidInput {
      reason: reason.into(),
    }
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Error::InvalidInput { reason } => write!(f, "invalid input: {reason}"),
      Error::Diverged { epoch } => {
        write!(f, "training diverged at epoch {epoch}, parameters or mse are no longer finite")
      }
      Error::Parse { line, content } => {
        write!(f, "cannot parse dataset line {line}: {content:?}, expected `x y`")
      }
      Error::Io(e) => write!(f, "{e}"),
    }
  }
}

impl error::Error for Error {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      Error::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for Error {
  fn from(e: io::Error) -> Self {
    Error::Io(e)
  }
}
