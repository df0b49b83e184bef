//! Loading of csv execution traces.
//!
//! One row per retired instruction, in execution order. The loader only checks
//! the shape of the table; interpreting `pc` and `instr` is left to the
//! analyzers so a bad value is reported by the pass that needs it.

pub mod pc;

use crate::error::AnalysisError;
use serde::Deserialize;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};
use tracing::{debug, info};

/// Columns a trace must have. Order in the file doesn't matter and extra
/// columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 4] = ["step", "pc", "instr", "mem_access"];

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TraceRow {
    pub step: i64,
    /// Raw program counter, usually `0x`-prefixed hex
    pub pc: String,
    pub instr: String,
    /// `load:0x...`, `store:0x...` or nothing
    pub mem_access: Option<String>,
}

impl TraceRow {
    pub fn new(step: i64, pc: &str, instr: &str, mem_access: Option<&str>) -> Self {
        Self {
            step,
            pc: pc.to_string(),
            instr: instr.to_string(),
            mem_access: mem_access.map(str::to_string),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Trace {
    rows: Vec<TraceRow>,
}

impl Trace {
    pub fn from_rows(rows: Vec<TraceRow>) -> Self {
        Self { rows }
    }

    /// Reads the whole file, the handle is closed before returning.
    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let file = File::open(path).map_err(|source| AnalysisError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let trace = Self::from_reader(BufReader::new(file))?;
        info!("loaded {} rows from {:?}", trace.len(), path);

        Ok(trace)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AnalysisError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        debug!("columns: {:?}", headers);

        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|column| !headers.iter().any(|h| h == **column))
        {
            return Err(AnalysisError::MissingColumn(*missing));
        }

        let rows = reader
            .deserialize()
            .collect::<Result<Vec<TraceRow>, _>>()?;

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[TraceRow] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraceRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
