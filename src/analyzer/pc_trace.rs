use super::{Analysis, Reporter, Section};
use crate::{error::AnalysisError, plot, trace::pc::format_pc};
use itertools::{Itertools, MinMaxResult};
use serde::Serialize;
use std::{fmt, path::PathBuf};

/// Control flow over time: (step, pc) for every row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PcTraceSummary {
    pub points: usize,
    pub lowest: Option<u64>,
    pub highest: Option<u64>,
    pub image: Option<PathBuf>,
}

impl PcTraceSummary {
    pub fn from_points(points: &[(i64, u64)]) -> Self {
        let (lowest, highest) = match points.iter().map(|(_, pc)| *pc).minmax() {
            MinMaxResult::NoElements => (None, None),
            MinMaxResult::OneElement(pc) => (Some(pc), Some(pc)),
            MinMaxResult::MinMax(lo, hi) => (Some(lo), Some(hi)),
        };

        Self {
            points: points.len(),
            lowest,
            highest,
            image: None,
        }
    }
}

impl fmt::Display for PcTraceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(lowest), Some(highest)) = (self.lowest, self.highest) {
            writeln!(
                f,
                "  PC range: {} - {} over {} steps",
                format_pc(lowest),
                format_pc(highest),
                self.points
            )?;
        }
        if let Some(image) = &self.image {
            writeln!(f, "Saved PC plot to: {}", image.display())?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct PcTraceReporter {
    output: Option<PathBuf>,
    size: (u32, u32),
}

impl PcTraceReporter {
    pub fn new(output: Option<PathBuf>, size: (u32, u32)) -> Self {
        Self { output, size }
    }
}

impl Reporter for PcTraceReporter {
    fn name(&self) -> &'static str {
        "pc_trace"
    }

    fn progress(&self) -> Option<&'static str> {
        Some("Generating PC vs step plot...")
    }

    fn report(&self, analysis: &Analysis) -> Result<Section, AnalysisError> {
        let points: Vec<(i64, u64)> = analysis
            .trace()
            .iter()
            .map(|row| row.step)
            .zip(analysis.pc_values()?.iter().copied())
            .collect();

        let mut summary = PcTraceSummary::from_points(&points);

        if let Some(path) = &self.output {
            plot::pc_trace(path, &points, self.size)?;
            summary.image = Some(path.clone());
        }

        Ok(Section::PcTrace(summary))
    }
}
