#![allow(clippy::derive_partial_eq_without_eq)]

pub mod analyzer;
pub mod config;
pub mod error;
pub mod insn;
pub mod plot;
pub mod trace;

pub use analyzer::{Analysis, Pipeline, Report};
pub use config::Config;
pub use error::{AnalysisError, ErrorKind};
pub use trace::{Trace, TraceRow};
