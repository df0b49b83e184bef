use super::{Analysis, Reporter, Section};
use crate::{error::AnalysisError, trace::Trace};
use itertools::Itertools;
use serde::Serialize;
use std::{cmp::Reverse, fmt};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HotPc {
    pub pc: String,
    pub count: usize,
}

/// Naive loop detection: a pc that retires more than once is in a loop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoopSummary {
    /// Distinct pcs seen more than once
    pub repeated: usize,
    /// Most executed pc. Ties go to whichever executed first.
    pub hottest: Option<HotPc>,
}

impl LoopSummary {
    pub fn from_trace(trace: &Trace) -> Self {
        let pcs: Vec<&str> = trace.iter().map(|row| row.pc.trim()).collect();
        let counts = pcs.iter().copied().counts();

        let repeated = counts.values().filter(|count| **count > 1).count();

        // unique() keeps first-seen order and min_by_key keeps the first minimum
        let hottest = pcs
            .iter()
            .copied()
            .unique()
            .map(|pc| (pc, counts[pc]))
            .filter(|(_, count)| *count > 1)
            .min_by_key(|(_, count)| Reverse(*count))
            .map(|(pc, count)| HotPc {
                pc: pc.to_string(),
                count,
            });

        Self { repeated, hottest }
    }

    pub fn estimated_iterations(&self) -> Option<usize> {
        self.hottest.as_ref().map(|hot| hot.count)
    }
}

impl fmt::Display for LoopSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Loop Detection:")?;
        match (&self.hottest, self.estimated_iterations()) {
            (Some(HotPc { pc, count }), Some(iterations)) => {
                writeln!(f, "  Instructions executed multiple times: {}", self.repeated)?;
                writeln!(f, "  Most frequent PC: {} (executed {} times)", pc, count)?;
                writeln!(f, "  Estimated loop iterations: ~{}", iterations)
            }
            _ => writeln!(f, "  No loops detected (all PCs executed once)"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LoopDetector;

impl Reporter for LoopDetector {
    fn name(&self) -> &'static str {
        "loops"
    }

    fn report(&self, analysis: &Analysis) -> Result<Section, AnalysisError> {
        Ok(Section::Loops(LoopSummary::from_trace(analysis.trace())))
    }
}

#[cfg(test)]
mod tests {
    use super::{HotPc, LoopSummary};
    use crate::trace::{Trace, TraceRow};

    fn detect(pcs: &[&str]) -> LoopSummary {
        let rows = pcs
            .iter()
            .enumerate()
            .map(|(i, pc)| TraceRow::new(i as i64, pc, "nop", None))
            .collect();
        LoopSummary::from_trace(&Trace::from_rows(rows))
    }

    #[test]
    fn single_loop() {
        let summary = detect(&["0x100", "0x104", "0x100"]);
        assert_eq!(summary.repeated, 1);
        assert_eq!(
            summary.hottest,
            Some(HotPc {
                pc: "0x100".to_string(),
                count: 2
            })
        );
        assert_eq!(summary.estimated_iterations(), Some(2));
    }

    #[test]
    fn hottest_wins() {
        let summary = detect(&[
            "0x100", "0x104", "0x108", "0x104", "0x108", "0x104", "0x108", "0x10c",
        ]);
        assert_eq!(summary.repeated, 2);
        // both seen 3 times, 0x104 ran first
        assert_eq!(summary.hottest.unwrap().pc, "0x104");

        let summary = detect(&["0x200", "0x100", "0x200", "0x100", "0x100"]);
        assert_eq!(summary.hottest.unwrap().pc, "0x100");
    }

    #[test]
    fn no_loops() {
        let summary = detect(&["0x100", "0x104", "0x108"]);
        assert_eq!(summary.repeated, 0);
        assert_eq!(summary.hottest, None);
        assert_eq!(
            summary.to_string(),
            "Loop Detection:\n  No loops detected (all PCs executed once)\n"
        );

        assert_eq!(detect(&[]).hottest, None);
    }

    #[test]
    fn display() {
        assert_eq!(
            detect(&["0x10", "0x10", "0x10"]).to_string(),
            "Loop Detection:\n  Instructions executed multiple times: 1\n  \
             Most frequent PC: 0x10 (executed 3 times)\n  Estimated loop iterations: ~3\n"
        );
    }
}
