pub mod error;
pub mod model;
pub mod subcommands;
pub mod utils;

pub use error::{Error, Result};
