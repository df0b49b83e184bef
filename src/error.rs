//! Everything that can go wrong while analyzing a trace.
//!
//! Every variant is fatal for the reporter that hit it. [`ErrorKind`] groups
//! them the way the console tool talks about them.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing file, missing column, unreadable row
    Input,
    /// A program counter that is not an integer
    Format,
    /// An instruction without a mnemonic
    Value,
    /// Writing an image failed
    Render,
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("could not open trace file {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("trace is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("malformed trace")]
    Malformed(#[from] csv::Error),
    #[error("invalid program counter {value:?} at step {step}")]
    InvalidPc {
        value: String,
        step: i64,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("empty instruction at step {step}")]
    EmptyInstruction { step: i64 },
    #[error("failed to render {path:?}: {reason}")]
    Render { path: PathBuf, reason: String },
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Open { .. }
            | AnalysisError::MissingColumn(_)
            | AnalysisError::Malformed(_) => ErrorKind::Input,
            AnalysisError::InvalidPc { .. } => ErrorKind::Format,
            AnalysisError::EmptyInstruction { .. } => ErrorKind::Value,
            AnalysisError::Render { .. } => ErrorKind::Render,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalysisError, ErrorKind};

    #[test]
    fn taxonomy() {
        assert_eq!(
            AnalysisError::MissingColumn("instr").kind(),
            ErrorKind::Input
        );
        assert_eq!(
            AnalysisError::EmptyInstruction { step: 3 }.kind(),
            ErrorKind::Value
        );

        let source = u64::from_str_radix("zz", 16).unwrap_err();
        let err = AnalysisError::InvalidPc {
            value: "zz".to_string(),
            step: 0,
            source,
        };
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(err.to_string(), "invalid program counter \"zz\" at step 0");
    }
}
