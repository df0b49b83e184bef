//! Read-only passes over a loaded trace.
//!
//! The [`Analysis`] owns the trace plus the two columns derived from it. Each
//! [`Reporter`] looks at it and produces a [`Section`]. The [`Pipeline`] runs
//! them in a fixed order.

pub mod histogram;
pub mod loops;
pub mod memory;
pub mod pc_trace;

use crate::{
    config::Config,
    error::AnalysisError,
    insn::{self, Category},
    trace::{pc::PcRadix, Trace},
};
use serde::Serialize;
use std::{cell::OnceCell, fmt};
use tracing::{debug, error};

pub use histogram::{CategoryHistogram, HistogramReporter};
pub use loops::{LoopDetector, LoopSummary};
pub use memory::{MemoryReporter, MemorySummary};
pub use pc_trace::{PcTraceReporter, PcTraceSummary};

/// The loaded trace with its derived columns. The columns are computed the
/// first time someone asks and never change afterwards.
#[derive(Debug)]
pub struct Analysis {
    trace: Trace,
    category: OnceCell<Vec<Category>>,
    pc_int: OnceCell<Vec<u64>>,
}

impl Analysis {
    pub fn new(trace: Trace) -> Self {
        Self {
            trace,
            category: OnceCell::new(),
            pc_int: OnceCell::new(),
        }
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Category of every row, in trace order
    pub fn categories(&self) -> Result<&[Category], AnalysisError> {
        if let Some(categories) = self.category.get() {
            return Ok(categories.as_slice());
        }

        let categories = self
            .trace
            .iter()
            .map(|row| {
                insn::categorize(&row.instr)
                    .map_err(|_| AnalysisError::EmptyInstruction { step: row.step })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!("categorized {} rows", categories.len());

        Ok(self.category.get_or_init(|| categories).as_slice())
    }

    /// Numeric pc of every row, in trace order
    pub fn pc_values(&self) -> Result<&[u64], AnalysisError> {
        if let Some(pcs) = self.pc_int.get() {
            return Ok(pcs.as_slice());
        }

        let radix = PcRadix::infer(self.trace.iter().map(|row| row.pc.as_str()));
        debug!("pc column is {:?}", radix);

        let pcs = self
            .trace
            .iter()
            .map(|row| {
                radix
                    .parse(&row.pc)
                    .map_err(|source| AnalysisError::InvalidPc {
                        value: row.pc.clone(),
                        step: row.step,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.pc_int.get_or_init(|| pcs).as_slice())
    }
}

pub trait Reporter {
    fn name(&self) -> &'static str;

    /// Printed before the reporter runs
    fn progress(&self) -> Option<&'static str> {
        None
    }

    fn report(&self, analysis: &Analysis) -> Result<Section, AnalysisError>;
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum Section {
    Histogram(CategoryHistogram),
    PcTrace(PcTraceSummary),
    Memory(MemorySummary),
    Loops(LoopSummary),
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Histogram(s) => fmt::Display::fmt(s, f),
            Section::PcTrace(s) => fmt::Display::fmt(s, f),
            Section::Memory(s) => fmt::Display::fmt(s, f),
            Section::Loops(s) => fmt::Display::fmt(s, f),
        }
    }
}

pub enum Event<'a> {
    Started(&'a dyn Reporter),
    Finished(&'a Section),
    /// Only seen when the pipeline keeps going after errors
    Failed(&'a dyn Reporter, &'a AnalysisError),
}

#[derive(Clone, Debug, Serialize)]
pub struct Failure {
    pub reporter: &'static str,
    pub error: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub rows: usize,
    pub sections: Vec<Section>,
    pub failures: Vec<Failure>,
}

pub struct Pipeline {
    reporters: Vec<Box<dyn Reporter>>,
    keep_going: bool,
}

impl Pipeline {
    pub fn new(keep_going: bool) -> Self {
        Self {
            reporters: Vec::new(),
            keep_going,
        }
    }

    pub fn with(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }

    /// histogram, pc plot, memory, loops
    pub fn standard(config: &Config) -> Self {
        let (histogram, pc_plot) = if config.plots {
            (Some(config.histogram_path()), Some(config.pc_plot_path()))
        } else {
            (None, None)
        };

        Self::new(config.keep_going)
            .with(HistogramReporter::new(histogram, config.chart_size))
            .with(PcTraceReporter::new(pc_plot, config.chart_size))
            .with(MemoryReporter)
            .with(LoopDetector)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.reporters.iter().map(|r| r.name()).collect()
    }

    pub fn run<F>(&self, analysis: &Analysis, mut on_event: F) -> Result<Report, AnalysisError>
    where
        F: FnMut(Event<'_>),
    {
        let mut report = Report {
            rows: analysis.trace().len(),
            sections: Vec::with_capacity(self.reporters.len()),
            failures: Vec::new(),
        };

        for reporter in &self.reporters {
            debug!("running {}", reporter.name());
            on_event(Event::Started(reporter.as_ref()));

            match reporter.report(analysis) {
                Ok(section) => {
                    on_event(Event::Finished(&section));
                    report.sections.push(section);
                }
                Err(err) if self.keep_going => {
                    error!("{} failed: {}", reporter.name(), chain(&err));
                    on_event(Event::Failed(reporter.as_ref(), &err));
                    report.failures.push(Failure {
                        reporter: reporter.name(),
                        error: chain(&err),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(report)
    }
}

/// `outer: inner: innermost`
fn chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        out.push_str(": ");
        out.push_str(&inner.to_string());
        source = inner.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{Analysis, Event, Pipeline, Section};
    use crate::{
        config::Config,
        error::AnalysisError,
        insn::Category,
        trace::{Trace, TraceRow},
    };

    fn analysis(rows: &[(&str, &str)]) -> Analysis {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, (pc, instr))| TraceRow::new(i as i64, pc, instr, None))
            .collect();
        Analysis::new(Trace::from_rows(rows))
    }

    fn no_plots(keep_going: bool) -> Config {
        Config {
            plots: false,
            keep_going,
            ..Config::default()
        }
    }

    #[test]
    fn derived_columns() {
        let analysis = analysis(&[("0x100", "lw a0, 0(sp)"), ("0x104", "ecall")]);
        assert_eq!(
            analysis.categories().unwrap(),
            [Category::Load, Category::System]
        );
        assert_eq!(analysis.pc_values().unwrap(), [0x100, 0x104]);

        // computed once
        let a = analysis.categories().unwrap().as_ptr();
        let b = analysis.categories().unwrap().as_ptr();
        assert_eq!(a, b);
    }

    #[test]
    fn decimal_pc_column() {
        let analysis = analysis(&[("256", "nop"), ("260", "nop")]);
        assert_eq!(analysis.pc_values().unwrap(), [0x100, 0x104]);
    }

    #[test]
    fn empty_instruction() {
        let analysis = analysis(&[("0x100", "nop"), ("0x104", "  ")]);
        let err = analysis.categories().unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyInstruction { step: 1 }));
        // the other column is unaffected
        assert_eq!(analysis.pc_values().unwrap(), [0x100, 0x104]);
    }

    #[test]
    fn bad_pc() {
        let analysis = analysis(&[("0x100", "nop"), ("0xzz", "nop")]);
        let err = analysis.pc_values().unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidPc { step: 1, .. }));
    }

    #[test]
    fn standard_order() {
        let pipeline = Pipeline::standard(&Config::default());
        assert_eq!(pipeline.names(), ["histogram", "pc_trace", "memory", "loops"]);
    }

    #[test]
    fn events_in_order() {
        let analysis = analysis(&[("0x100", "addi a0, a0, 1"), ("0x100", "addi a0, a0, 1")]);
        let pipeline = Pipeline::standard(&no_plots(false));

        let mut seen = Vec::new();
        let report = pipeline
            .run(&analysis, |event| match event {
                Event::Started(r) => seen.push(format!("start {}", r.name())),
                Event::Finished(_) => seen.push("done".to_string()),
                Event::Failed(r, _) => seen.push(format!("fail {}", r.name())),
            })
            .unwrap();

        assert_eq!(
            seen,
            [
                "start histogram",
                "done",
                "start pc_trace",
                "done",
                "start memory",
                "done",
                "start loops",
                "done"
            ]
        );
        assert_eq!(report.rows, 2);
        assert_eq!(report.sections.len(), 4);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn aborts_on_first_failure() {
        let analysis = analysis(&[("0x100", "nop"), ("nope", "nop")]);
        let pipeline = Pipeline::standard(&no_plots(false));

        let mut finished = 0;
        let err = pipeline
            .run(&analysis, |event| {
                if let Event::Finished(_) = event {
                    finished += 1;
                }
            })
            .unwrap_err();

        assert!(matches!(err, AnalysisError::InvalidPc { .. }));
        // only the histogram got through
        assert_eq!(finished, 1);
    }

    #[test]
    fn keep_going() {
        let analysis = analysis(&[("0x100", "nop"), ("nope", "nop")]);
        let pipeline = Pipeline::standard(&no_plots(true));

        let report = pipeline.run(&analysis, |_| ()).unwrap();

        assert_eq!(report.sections.len(), 3);
        assert!(matches!(report.sections[1], Section::Memory(_)));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].reporter, "pc_trace");
        assert!(report.failures[0]
            .error
            .starts_with("invalid program counter \"nope\" at step 1: "));
    }
}
