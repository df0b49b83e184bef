use std::path::PathBuf;

use rvta::{
    analyzer::{Event, Section},
    config::DEFAULT_TRACE,
    Analysis, Config, Pipeline, Trace,
};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(argh::FromArgs)]
/// RISC-V trace analytics
struct Arguments {
    #[argh(positional, default = r#"PathBuf::from(DEFAULT_TRACE)"#)]
    /// csv trace with step, pc, instr and mem_access columns
    trace: PathBuf,

    #[argh(option, short = 'o', default = r#"PathBuf::from(".")"#)]
    /// directory the charts are written to
    out_dir: PathBuf,

    #[argh(switch)]
    /// don't render any images
    no_plots: bool,

    #[argh(switch)]
    /// run every analysis even if an earlier one failed
    keep_going: bool,

    #[argh(switch)]
    /// print the report as json instead of text
    json: bool,
}

const RULE: &str = "============================================================";

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let Arguments {
        trace,
        out_dir,
        no_plots,
        keep_going,
        json,
    } = argh::from_env();

    let config = Config {
        trace,
        out_dir,
        plots: !no_plots,
        keep_going,
        ..Config::default()
    };
    info!("{:?}", config);

    if config.plots {
        std::fs::create_dir_all(&config.out_dir)?;
    }

    if !json {
        println!("{}", RULE);
        println!("RISC-V Trace Analytics");
        println!("{}", RULE);
        println!("Reading trace file: {}", config.trace.display());
    }

    let trace = Trace::from_path(&config.trace)?;
    if !json {
        println!("Total instructions in trace: {}", trace.len());
    }

    let analysis = Analysis::new(trace);
    let pipeline = Pipeline::standard(&config);

    let report = pipeline.run(&analysis, |event| {
        if json {
            return;
        }
        match event {
            Event::Started(reporter) => {
                println!();
                if let Some(progress) = reporter.progress() {
                    println!("{}", progress);
                }
            }
            Event::Finished(section) => print!("{}", section),
            Event::Failed(reporter, err) => println!("  {} failed: {}", reporter.name(), err),
        }
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let images: Vec<String> = report
            .sections
            .iter()
            .filter_map(|section| match section {
                Section::Histogram(s) => s.image.as_ref(),
                Section::PcTrace(s) => s.image.as_ref(),
                _ => None,
            })
            .map(|image| image.display().to_string())
            .collect();

        println!();
        println!("{}", RULE);
        if report.failures.is_empty() {
            println!("Analysis complete!");
        } else {
            println!("Analysis finished with {} failure(s)", report.failures.len());
        }
        if images.is_empty() {
            println!("Generated files: none");
        } else {
            println!("Generated files: {}", images.join(", "));
        }
        println!("{}", RULE);
    }

    if !report.failures.is_empty() {
        let failed: Vec<_> = report.failures.iter().map(|f| f.reporter).collect();
        anyhow::bail!("failed: {}", failed.join(", "));
    }

    Ok(())
}
