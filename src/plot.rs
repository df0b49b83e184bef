//! png charts. Sizes are given in points of a 6in tall figure so the charts
//! look the same at any resolution.

use crate::{analyzer::CategoryHistogram, error::AnalysisError, trace::pc::format_pc};
use itertools::Itertools;
use plotters::{
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use std::{error::Error, path::Path};
use tracing::debug;

const FONT: &str = "sans-serif";

/// Bar colours, handed out left to right
const PALETTE: [RGBColor; 5] = [
    RGBColor(0x34, 0x98, 0xdb),
    RGBColor(0xe7, 0x4c, 0x3c),
    RGBColor(0x2e, 0xcc, 0x71),
    RGBColor(0xf3, 0x9c, 0x12),
    RGBColor(0x9b, 0x59, 0xb6),
];
const LINE: RGBColor = RGBColor(0x2c, 0x3e, 0x50);
const MARKER: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);

fn pt(size: (u32, u32), points: f64) -> f64 {
    points * size.1 as f64 / (6.0 * 72.0)
}

fn render_error(path: &Path) -> impl FnOnce(Box<dyn Error>) -> AnalysisError + '_ {
    move |err| AnalysisError::Render {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Bar chart of the instruction mix, overwrites `path`.
pub fn histogram(
    path: &Path,
    histogram: &CategoryHistogram,
    size: (u32, u32),
) -> Result<(), AnalysisError> {
    draw_histogram(path, histogram, size).map_err(render_error(path))?;
    debug!("wrote {:?}", path);
    Ok(())
}

/// Line and scatter plot of pc over step, overwrites `path`.
pub fn pc_trace(path: &Path, points: &[(i64, u64)], size: (u32, u32)) -> Result<(), AnalysisError> {
    draw_pc_trace(path, points, size).map_err(render_error(path))?;
    debug!("wrote {:?}", path);
    Ok(())
}

fn draw_histogram(
    path: &Path,
    histogram: &CategoryHistogram,
    size: (u32, u32),
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let labels: Vec<&str> = histogram.bars.iter().map(|b| b.category.as_ref()).collect();
    let max = histogram.bars.iter().map(|b| b.count).max().unwrap_or(0) as u64;

    // bar i is centered on x = i, an empty histogram still gets one slot
    let slots = labels.len().max(1);
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "RISC-V Instruction Category Distribution",
            (FONT, pt(size, 14.0), FontStyle::Bold).into_font(),
        )
        .margin(pt(size, 12.0) as u32)
        .x_label_area_size(pt(size, 36.0) as u32)
        .y_label_area_size(pt(size, 48.0) as u32)
        .build_cartesian_2d(-0.5f64..slots as f64 - 0.5, 0u64..max + max / 10 + 1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .bold_line_style(&BLACK.mix(0.3))
        .light_line_style(&WHITE)
        .x_labels(slots + 1)
        .x_label_formatter(&|x| {
            let idx = x.round();
            if (x - idx).abs() < 1e-6 && idx >= 0.0 {
                labels.get(idx as usize).unwrap_or(&"").to_string()
            } else {
                String::new()
            }
        })
        .x_desc("Instruction Category")
        .y_desc("Count")
        .label_style((FONT, pt(size, 10.0)))
        .axis_desc_style((FONT, pt(size, 12.0), FontStyle::Bold))
        .draw()?;

    chart.draw_series(histogram.bars.iter().enumerate().map(|(i, bar)| {
        let x = i as f64;
        Rectangle::new(
            [(x - 0.4, 0), (x + 0.4, bar.count as u64)],
            PALETTE[i % PALETTE.len()].filled(),
        )
    }))?;

    let value_style = TextStyle::from((FONT, pt(size, 10.0), FontStyle::Bold).into_font())
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(histogram.bars.iter().enumerate().map(|(i, bar)| {
        Text::new(
            bar.count.to_string(),
            (i as f64, bar.count as u64),
            value_style.clone(),
        )
    }))?;

    root.present()?;
    Ok(())
}

fn draw_pc_trace(path: &Path, points: &[(i64, u64)], size: (u32, u32)) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let (first, last) = points
        .iter()
        .map(|(step, _)| *step)
        .minmax()
        .into_option()
        .unwrap_or((0, 0));
    let (lowest, highest) = points
        .iter()
        .map(|(_, pc)| *pc)
        .minmax()
        .into_option()
        .unwrap_or((0, 0));

    // a flat line still needs a non-empty range
    let pad = ((highest - lowest) / 20).max(4);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Program Counter Trace - Control Flow Visualization",
            (FONT, pt(size, 14.0), FontStyle::Bold).into_font(),
        )
        .margin(pt(size, 12.0) as u32)
        .x_label_area_size(pt(size, 36.0) as u32)
        .y_label_area_size(pt(size, 72.0) as u32)
        .build_cartesian_2d(
            first..last.max(first.saturating_add(1)),
            lowest.saturating_sub(pad)..highest.saturating_add(pad),
        )?;

    chart
        .configure_mesh()
        .bold_line_style(&BLACK.mix(0.3))
        .light_line_style(&WHITE)
        .y_label_formatter(&|pc| format_pc(*pc))
        .x_desc("Step Index (Instruction Number)")
        .y_desc("Program Counter (PC)")
        .label_style((FONT, pt(size, 10.0)))
        .axis_desc_style((FONT, pt(size, 12.0), FontStyle::Bold))
        .draw()?;

    chart.draw_series(LineSeries::new(
        points.iter().copied(),
        LINE.mix(0.7).stroke_width(pt(size, 1.5) as u32),
    ))?;
    chart.draw_series(
        points
            .iter()
            .map(|point| Circle::new(*point, pt(size, 1.5) as u32, MARKER.mix(0.5).filled())),
    )?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{draw_pc_trace, pt};

    #[test]
    fn points_scale_with_height() {
        assert_eq!(pt((3000, 1800), 72.0), 300.0);
        assert_eq!(pt((1000, 432), 12.0), 12.0);
    }

    #[test]
    fn last_step_at_i64_max() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pc_plot.png");

        draw_pc_trace(&path, &[(i64::MAX, 0x10)], (300, 180)).unwrap();
        draw_pc_trace(&path, &[(i64::MAX - 1, 0x10), (i64::MAX, 0x14)], (300, 180)).unwrap();
        assert!(path.exists());
    }
}
