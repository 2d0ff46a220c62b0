#[cfg(not(debug_assertions))]
use human_panic::setup_panic;
use tracing::{
  subscriber::{self, DefaultGuard, SetGlobalDefaultError},
  Level,
};

#[cfg(debug_assertions)]
extern crate better_panic;

// [NOTE] tracing
//
// Logs go to stderr; stdout is reserved for the per-epoch report so it can be piped.
// In code use `tracing::{trace, debug, info, warn, error}` and `#[tracing::instrument]`.

pub fn install_logger(level: Level) -> Result<(), SetGlobalDefaultError> {
  let subscriber = tracing_subscriber::fmt()
    .compact()
    .with_writer(std::io::stderr)
    .with_max_level(level)
    .finish();
  subscriber::set_global_default(subscriber)
}

pub fn init_logging_with(level: Level) -> Result<(), SetGlobalDefaultError> {
  // Human Panic. Only enabled when *not* debugging.
  #[cfg(not(debug_assertions))]
  {
    setup_panic!();
  }

  // Better Panic. Only enabled *when* debugging.
  #[cfg(debug_assertions)]
  {
    better_panic::Settings::debug()
      .most_recent_first(false)
      .lineno_suffix(true)
      .verbosity(better_panic::Verbosity::Full)
      .install();
  }

  install_logger(level)
}

/// Thread-local subscriber for tests, dropped with the returned guard.
pub fn init_logging_tests() -> DefaultGuard {
  let subscriber = tracing_subscriber::fmt()
    .compact()
    .with_test_writer()
    .with_max_level(Level::DEBUG)
    .finish();
  subscriber::set_default(subscriber)
}
