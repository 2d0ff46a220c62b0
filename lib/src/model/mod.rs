pub mod training;
pub mod types;
pub mod utils;

pub use training::*;
pub use types::*;
pub use utils::*;
