// Engine library root: indicator engine, pattern detector, report reducer and
// the data sources feeding them.

pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod patterns;
pub mod pipeline;
pub mod report;

pub use error::{EngineError, Result};
pub use pipeline::{Analysis, Analyzer};
