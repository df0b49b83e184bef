use super::{Analysis, Reporter, Section};
use crate::{error::AnalysisError, insn::Category, plot};
use itertools::Itertools;
use serde::Serialize;
use std::{fmt, path::PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bar {
    pub category: Category,
    pub count: usize,
    /// Share of all rows, 0 to 100
    pub percentage: f64,
}

/// Instruction mix. Only categories that occur get a bar, most frequent
/// first, ties in [`Category`] order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryHistogram {
    pub total: usize,
    pub bars: Vec<Bar>,
    pub image: Option<PathBuf>,
}

impl CategoryHistogram {
    pub fn from_categories(categories: &[Category]) -> Self {
        let total = categories.len();

        let bars = categories
            .iter()
            .counts()
            .into_iter()
            .sorted_by(|(a, a_count), (b, b_count)| b_count.cmp(a_count).then(a.cmp(b)))
            .map(|(category, count)| Bar {
                category: *category,
                count,
                percentage: 100.0 * count as f64 / total as f64,
            })
            .collect();

        Self {
            total,
            bars,
            image: None,
        }
    }

    pub fn count(&self, category: Category) -> usize {
        self.bars
            .iter()
            .find(|bar| bar.category == category)
            .map_or(0, |bar| bar.count)
    }
}

impl fmt::Display for CategoryHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Instruction category breakdown:")?;
        for Bar {
            category,
            count,
            percentage,
        } in &self.bars
        {
            writeln!(f, "  {}: {} ({:.1}%)", category, count, percentage)?;
        }
        if let Some(image) = &self.image {
            writeln!(f, "Saved histogram to: {}", image.display())?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct HistogramReporter {
    output: Option<PathBuf>,
    size: (u32, u32),
}

impl HistogramReporter {
    /// No `output` means no image, just the numbers.
    pub fn new(output: Option<PathBuf>, size: (u32, u32)) -> Self {
        Self { output, size }
    }
}

impl Reporter for HistogramReporter {
    fn name(&self) -> &'static str {
        "histogram"
    }

    fn progress(&self) -> Option<&'static str> {
        Some("Generating instruction category histogram...")
    }

    fn report(&self, analysis: &Analysis) -> Result<Section, AnalysisError> {
        let mut histogram = CategoryHistogram::from_categories(analysis.categories()?);

        // an empty trace still replaces the previous image, with empty axes
        if let Some(path) = &self.output {
            plot::histogram(path, &histogram, self.size)?;
            histogram.image = Some(path.clone());
        }

        Ok(Section::Histogram(histogram))
    }
}
