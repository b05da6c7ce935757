pub mod allocation;
pub mod config;
pub mod error;
pub mod objective;
pub mod optimizer;
pub mod scenario;
pub mod session;
pub mod stats;
pub mod validation;
// cmd and reports are binary modules (see main.rs).

pub use error::{FfResult, FloodFlyError};
