use std::path::{Path, PathBuf};

pub const DEFAULT_TRACE: &str = "trace.csv";
pub const HISTOGRAM_FILE: &str = "histogram.png";
pub const PC_PLOT_FILE: &str = "pc_plot.png";

/// What to read, where to write, and how hard to try.
#[derive(Clone, Debug)]
pub struct Config {
    pub trace: PathBuf,
    pub out_dir: PathBuf,
    /// Render the png charts. Summaries are produced either way.
    pub plots: bool,
    /// Keep running the remaining reporters after one fails
    pub keep_going: bool,
    /// Pixel size of both charts
    pub chart_size: (u32, u32),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trace: PathBuf::from(DEFAULT_TRACE),
            out_dir: PathBuf::from("."),
            plots: true,
            keep_going: false,
            // 10x6in at 300dpi
            chart_size: (3000, 1800),
        }
    }
}

impl Config {
    pub fn histogram_path(&self) -> PathBuf {
        self.output(HISTOGRAM_FILE)
    }

    pub fn pc_plot_path(&self) -> PathBuf {
        self.output(PC_PLOT_FILE)
    }

    fn output(&self, name: &str) -> PathBuf {
        // keep the bare file name when writing to the working directory
        if self.out_dir == Path::new(".") {
            PathBuf::from(name)
        } else {
            self.out_dir.join(name)
        }
    }
}
