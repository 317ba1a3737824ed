//! Backend-independent drawing.
//!
//! Every chart is drawn by one routine that is generic over the plotters
//! backend, so the PNG and SVG encodings come from the same code.

use crate::charts::data::{Bin, ChartSpec, Plot};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

pub type DrawResult<T, DB> = Result<T, DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Blue, orange, green.
pub const PALETTE: [RGBColor; 3] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
];

const FONT: &str = "sans-serif";
const CAPTION_SIZE: u32 = 32;
const LABEL_SIZE: u32 = 20;
const BAR_WIDTH: f64 = 0.8;

/// Draw `spec` onto `root` and flush the backend.
pub fn draw<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, spec: &ChartSpec) -> DrawResult<(), DB> {
    root.fill(&WHITE)?;
    match &spec.plot {
        Plot::Scatter { points } => scatter(root, spec, points)?,
        Plot::Histogram { bins } => histogram(root, spec, bins)?,
        Plot::Bars {
            labels,
            values,
            color,
        } => {
            let series = [(String::new(), values.clone())];
            bars(root, spec, labels, &series, &[PALETTE[*color % PALETTE.len()]])?
        }
        Plot::Clustered { labels, series } => bars(root, spec, labels, series, &PALETTE)?,
        Plot::Heatmap { labels, matrix } => heatmap(root, spec, labels, matrix)?,
    }
    root.present()?;
    Ok(())
}

/// Bounds of the finite values, padded by 5% on each side.
fn padded_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return 0.0..1.0;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 0.5 };
    (lo - pad)..(hi + pad)
}

/// Label of the category whose centre is at integer position `x`.
fn category_label(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    points: &[(f64, f64)],
) -> DrawResult<(), DB> {
    let (x_desc, y_desc) = spec.chart.axes();
    let mut chart = ChartBuilder::on(root)
        .caption(spec.title(), (FONT, CAPTION_SIZE))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            padded_range(points.iter().map(|p| p.0)),
            padded_range(points.iter().map(|p| p.1)),
        )?;
    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style((FONT, LABEL_SIZE))
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|&(x, y)| Circle::new((x, y), 4, PALETTE[0].filled())),
    )?;
    Ok(())
}

fn histogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    bins: &[Bin],
) -> DrawResult<(), DB> {
    let (x_desc, y_desc) = spec.chart.axes();
    let x_range = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => first.lower..last.upper,
        _ => 0.0..1.0,
    };
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(spec.title(), (FONT, CAPTION_SIZE))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, 0.0..max_count * 1.05)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style((FONT, LABEL_SIZE))
        .draw()?;

    chart.draw_series(bins.iter().map(|bin| {
        Rectangle::new(
            [(bin.lower, 0.0), (bin.upper, bin.count as f64)],
            PALETTE[1].filled(),
        )
    }))?;
    Ok(())
}

/// Bar chart with one bar per series in each category. A single series
/// gives a plain bar chart.
fn bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    labels: &[String],
    series: &[(String, Vec<f64>)],
    colors: &[RGBColor],
) -> DrawResult<(), DB> {
    let (x_desc, y_desc) = spec.chart.axes();
    let max = series
        .iter()
        .flat_map(|(_, values)| values.iter().copied())
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);
    let y_top = if max > 0.0 { max * 1.1 } else { 1.0 };
    let n = labels.len().max(1);

    let mut chart = ChartBuilder::on(root)
        .caption(spec.title(), (FONT, CAPTION_SIZE))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), 0.0..y_top)?;

    let label_at = |x: &f64| category_label(labels, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&label_at)
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style((FONT, LABEL_SIZE))
        .draw()?;

    let width = BAR_WIDTH / series.len().max(1) as f64;
    for (k, (name, values)) in series.iter().enumerate() {
        let color = colors[k % colors.len()];
        let offset = -BAR_WIDTH / 2.0 + width * k as f64;
        let drawn = chart.draw_series(
            values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_finite())
                .map(|(i, &v)| {
                    let left = i as f64 + offset;
                    Rectangle::new([(left, 0.0), (left + width, v)], color.filled())
                }),
        )?;
        if !name.is_empty() {
            drawn.label(name.as_str()).legend(move |(x, y)| {
                Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled())
            });
        }
    }

    if series.iter().any(|(name, _)| !name.is_empty()) {
        chart
            .configure_series_labels()
            .label_font((FONT, LABEL_SIZE))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

/// Diverging blue-white-red ramp over [-1, 1]. Undefined cells are grey.
pub fn coolwarm(value: f64) -> RGBColor {
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    if !value.is_finite() {
        return RGBColor(160, 160, 160);
    }
    let t = value.clamp(-1.0, 1.0);
    let (from, to, f) = if t < 0.0 { (MID, COLD, -t) } else { (MID, WARM, t) };
    let mix = |a: f64, b: f64| (a + (b - a) * f).round() as u8;
    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

fn heatmap<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    labels: &[String],
    matrix: &[Vec<f64>],
) -> DrawResult<(), DB> {
    let n = labels.len().max(1);
    let extent = -0.5..(n as f64 - 0.5);
    // row 0 is drawn at the top
    let reversed: Vec<String> = labels.iter().rev().cloned().collect();

    let mut chart = ChartBuilder::on(root)
        .caption(spec.title(), (FONT, CAPTION_SIZE))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(140)
        .build_cartesian_2d(extent.clone(), extent)?;

    let x_label = |x: &f64| category_label(labels, *x);
    let y_label = |y: &f64| category_label(&reversed, *y);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .label_style((FONT, LABEL_SIZE))
        .draw()?;

    let cells: Vec<(f64, f64, f64)> = matrix
        .iter()
        .enumerate()
        .flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(move |(j, &r)| (j as f64, (n - 1 - i) as f64, r))
        })
        .collect();

    chart.draw_series(cells.iter().map(|&(x, y, r)| {
        Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], coolwarm(r).filled())
    }))?;

    let annotation = (FONT, LABEL_SIZE)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(cells.iter().map(|&(x, y, r)| {
        let text = if r.is_finite() { format!("{:.2}", r) } else { "NaN".to_string() };
        Text::new(text, (x, y), annotation.clone())
    }))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_coolwarm_endpoints() {
        assert_eq!(coolwarm(-1.0), RGBColor(59, 76, 192));
        assert_eq!(coolwarm(0.0), RGBColor(221, 221, 221));
        assert_eq!(coolwarm(1.0), RGBColor(180, 4, 38));
        assert_eq!(coolwarm(f64::NAN), RGBColor(160, 160, 160));
    }

    #[test]
    fn test_category_label() {
        let labels = vec!["Fri".to_string(), "Sat".to_string()];
        assert_eq!(category_label(&labels, 0.0), "Fri");
        assert_eq!(category_label(&labels, 1.0), "Sat");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }

    #[test]
    fn test_padded_range_skips_nan() {
        let range = padded_range([0.0, f64::NAN, 10.0].into_iter());
        assert_eq!(range, -0.5..10.5);
        assert_eq!(padded_range(std::iter::empty()), 0.0..1.0);
    }
}
