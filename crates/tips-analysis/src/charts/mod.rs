//! Chart rendering.
//!
//! Ten fixed charts are computed from the base table and written three times
//! each, under `<charts_dir>/png`, `<charts_dir>/pdf` and `<charts_dir>/svg`
//! with a shared base name:
//!
//! - PNG through the plotters bitmap backend
//! - SVG through the plotters SVG backend
//! - PDF by converting that same SVG drawing with `svg2pdf`
//!
//! The three files of a chart are staged as temporaries and renamed into
//! place together, so a failed chart leaves none of them behind.

pub mod data;
pub mod draw;

pub use data::{Bin, Chart, ChartSpec, Plot, chart_spec, histogram};

use crate::config::AnalysisConfig;
use crate::dataset::Table;
use crate::error::{AnalysisError, Result};
use plotters::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use svg2pdf::usvg;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Output encodings, each in its own subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartFormat {
    Png,
    Pdf,
    Svg,
}

impl ChartFormat {
    pub const ALL: [ChartFormat; 3] = [ChartFormat::Png, ChartFormat::Pdf, ChartFormat::Svg];

    pub fn extension(self) -> &'static str {
        match self {
            ChartFormat::Png => "png",
            ChartFormat::Pdf => "pdf",
            ChartFormat::Svg => "svg",
        }
    }
}

/// Paths written for one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedChart {
    pub chart: Chart,
    pub files: Vec<PathBuf>,
}

/// Renders the chart set into an output root.
pub struct ChartRenderer {
    out_dir: PathBuf,
    size: (u32, u32),
    histogram_bins: usize,
}

impl ChartRenderer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            out_dir: config.charts_dir.clone(),
            size: config.chart_size,
            histogram_bins: config.histogram_bins,
        }
    }

    /// Output directory of one encoding.
    pub fn format_dir(&self, format: ChartFormat) -> PathBuf {
        self.out_dir.join(format.extension())
    }

    pub fn output_path(&self, chart: Chart, format: ChartFormat) -> PathBuf {
        self.format_dir(format)
            .join(format!("{}.{}", chart.stem(), format.extension()))
    }

    /// Create the output root and its format subdirectories if absent.
    pub fn prepare_dirs(&self) -> Result<()> {
        for format in ChartFormat::ALL {
            let dir = self.format_dir(format);
            fs::create_dir_all(&dir).map_err(|e| AnalysisError::render(dir.display().to_string(), e))?;
        }
        Ok(())
    }

    /// Render all ten charts in all three encodings.
    pub fn render_all(&self, table: &Table) -> Result<Vec<RenderedChart>> {
        info!("Rendering {} charts into {}", Chart::ALL.len(), self.out_dir.display());
        self.prepare_dirs()?;

        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();

        let mut rendered = Vec::with_capacity(Chart::ALL.len());
        for chart in Chart::ALL {
            let spec = chart_spec(chart, table, self.histogram_bins)?;
            rendered.push(self.render(&spec, &options)?);
        }

        info!("All charts generated successfully");
        Ok(rendered)
    }

    /// Render one chart in all three encodings.
    ///
    /// All three files are staged as temporaries first and moved into place
    /// only once every encoding has succeeded.
    pub fn render(&self, spec: &ChartSpec, options: &usvg::Options) -> Result<RenderedChart> {
        let chart = spec.chart;

        let png = self.render_png(spec)?;
        let svg = self.render_svg(spec)?;
        let pdf = svg_to_pdf(chart, &svg, options)?;

        let staged = [
            (ChartFormat::Png, png),
            (ChartFormat::Pdf, self.stage(chart, ChartFormat::Pdf, &pdf)?),
            (ChartFormat::Svg, self.stage(chart, ChartFormat::Svg, svg.as_bytes())?),
        ];

        let mut files = Vec::with_capacity(staged.len());
        for (format, tmp) in staged {
            let path = self.output_path(chart, format);
            if let Err(e) = tmp.persist(&path) {
                for written in &files {
                    let _ = fs::remove_file(written);
                }
                return Err(AnalysisError::render(chart.stem(), e.error));
            }
            files.push(path);
        }

        debug!("Rendered {}", chart.stem());
        Ok(RenderedChart { chart, files })
    }

    /// Draw into an in-memory SVG document.
    pub fn render_svg(&self, spec: &ChartSpec) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, self.size).into_drawing_area();
            draw::draw(&root, spec).map_err(|e| AnalysisError::render(spec.chart.stem(), e))?;
        }
        Ok(svg)
    }

    /// Draw into a temporary PNG next to its final path.
    fn render_png(&self, spec: &ChartSpec) -> Result<NamedTempFile> {
        let tmp = self.temp_file(spec.chart, ChartFormat::Png)?;
        {
            let root = BitMapBackend::new(tmp.path(), self.size).into_drawing_area();
            draw::draw(&root, spec).map_err(|e| AnalysisError::render(spec.chart.stem(), e))?;
        }
        Ok(tmp)
    }

    fn stage(&self, chart: Chart, format: ChartFormat, bytes: &[u8]) -> Result<NamedTempFile> {
        let mut tmp = self.temp_file(chart, format)?;
        tmp.write_all(bytes)
            .and_then(|_| tmp.flush())
            .map_err(|e| AnalysisError::render(chart.stem(), e))?;
        Ok(tmp)
    }

    /// Empty temporary file in the format directory, created if absent.
    ///
    /// The suffix matters for PNG: the bitmap backend picks its encoder from
    /// the extension.
    fn temp_file(&self, chart: Chart, format: ChartFormat) -> Result<NamedTempFile> {
        let dir = self.format_dir(format);
        fs::create_dir_all(&dir).map_err(|e| AnalysisError::render(chart.stem(), e))?;
        tempfile::Builder::new()
            .prefix(".chart")
            .suffix(&format!(".{}", format.extension()))
            .tempfile_in(&dir)
            .map_err(|e| AnalysisError::render(chart.stem(), e))
    }
}

/// Convert an SVG drawing to a single-page vector PDF.
pub fn svg_to_pdf(chart: Chart, svg: &str, options: &usvg::Options) -> Result<Vec<u8>> {
    let tree = usvg::Tree::from_str(svg, options).map_err(|e| AnalysisError::render(chart.stem(), e))?;
    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|e| AnalysisError::render(chart.stem(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::TempDir;

    fn renderer(dir: &Path) -> ChartRenderer {
        let config = AnalysisConfig::builder()
            .charts_dir(dir.join("charts"))
            .build()
            .unwrap();
        ChartRenderer::new(&config)
    }

    #[test]
    fn test_output_layout() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer(dir.path());

        assert_eq!(
            renderer.output_path(Chart::CorrelationHeatmap, ChartFormat::Svg),
            dir.path().join("charts/svg/10_correlation_heatmap.svg")
        );
        assert_eq!(
            renderer.output_path(Chart::TotalBillVsTip, ChartFormat::Png),
            dir.path().join("charts/png/01_total_bill_vs_tip.png")
        );
    }

    #[test]
    fn test_prepare_dirs_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let renderer = renderer(dir.path());

        renderer.prepare_dirs().unwrap();
        renderer.prepare_dirs().unwrap();
        for format in ChartFormat::ALL {
            assert!(renderer.format_dir(format).is_dir());
        }
    }
}
