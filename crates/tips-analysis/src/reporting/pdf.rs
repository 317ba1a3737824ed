//! Paginated PDF output.
//!
//! [`PageCursor`] tracks the free vertical space on the current page and
//! opens a new page when content would cross the bottom margin. The table
//! report and the script exporter both lay out through it.

use crate::analysis::AggregationResult;
use crate::error::{AnalysisError, Result};
use crate::reporting::writer::write_atomic;
use printpdf::path::PaintMode;
use printpdf::*;
use std::io::{BufWriter, Cursor};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// US letter.
pub const PAGE_WIDTH_MM: f32 = 215.9;
pub const PAGE_HEIGHT_MM: f32 = 279.4;
/// One inch on every side.
pub const MARGIN_MM: f32 = 25.4;

const MM_PER_PT: f32 = 0.352_778;

/// Points to millimetres.
pub fn pt(value: f32) -> f32 {
    value * MM_PER_PT
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

/// Vertical layout state over a growing document.
pub struct PageCursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
}

impl PageCursor {
    pub fn new(title: &str) -> Self {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let layer = doc.get_page(page).get_layer(layer);
        Self {
            doc,
            layer,
            y: Self::top(),
            pages: 1,
        }
    }

    fn top() -> f32 {
        PAGE_HEIGHT_MM - MARGIN_MM
    }

    pub fn doc(&self) -> &PdfDocumentReference {
        &self.doc
    }

    pub fn layer(&self) -> &PdfLayerReference {
        &self.layer
    }

    /// Top of the free area, in mm from the page bottom.
    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn advance(&mut self, height: f32) {
        self.y -= height;
    }

    /// Start a new page unless `height` still fits on this one. A fresh page
    /// never breaks again, so oversized blocks overflow instead of looping.
    pub fn ensure(&mut self, height: f32) {
        if self.y - height < MARGIN_MM && self.y < Self::top() {
            self.new_page();
        }
    }

    pub fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = Self::top();
        self.pages += 1;
    }

    /// Serialize the document. `path` is only used for error messages.
    pub fn finish(self, path: &Path) -> Result<Vec<u8>> {
        let mut writer = BufWriter::new(Cursor::new(Vec::new()));
        self.doc
            .save(&mut writer)
            .map_err(|e| AnalysisError::report_write(path, e))?;
        let cursor = writer
            .into_inner()
            .map_err(|e| AnalysisError::report_write(path, e.error()))?;
        Ok(cursor.into_inner())
    }
}

/// Builds the table report: one heading and one grid table per result.
pub struct TableReportBuilder {
    path: PathBuf,
    font_size: f32,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl TableReportBuilder {
    const TITLE_SIZE: f32 = 12.0;
    const CELL_PADDING_PT: f32 = 6.0;
    const SPACER_PT: f32 = 12.0;
    /// Rough Helvetica advance per character, as a fraction of the font size.
    const CHAR_WIDTH_EM: f32 = 0.55;

    pub fn new(path: impl Into<PathBuf>, font_size: f32) -> Self {
        Self {
            path: path.into(),
            font_size,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render the whole document in memory.
    pub fn render(&self, results: &[AggregationResult]) -> Result<Vec<u8>> {
        let mut cursor = PageCursor::new("Tips Dataset Analysis Report");
        let fonts = Fonts {
            regular: self.font(&cursor, BuiltinFont::Helvetica)?,
            bold: self.font(&cursor, BuiltinFont::HelveticaBold)?,
        };

        for result in results {
            self.draw_result(&mut cursor, &fonts, result)?;
        }

        debug!("Report laid out on {} page(s)", cursor.pages());
        cursor.finish(&self.path)
    }

    /// Render and write atomically; no file is left behind on failure.
    pub fn write(&self, results: &[AggregationResult]) -> Result<()> {
        let bytes = self.render(results)?;
        write_atomic(&self.path, &bytes)?;
        info!("PDF report saved: {}", self.path.display());
        Ok(())
    }

    fn font(&self, cursor: &PageCursor, font: BuiltinFont) -> Result<IndirectFontRef> {
        cursor
            .doc()
            .add_builtin_font(font)
            .map_err(|e| AnalysisError::report_write(&self.path, e))
    }

    fn row_height(&self) -> f32 {
        pt(self.font_size * 1.2 + Self::CELL_PADDING_PT)
    }

    fn title_height(&self) -> f32 {
        pt(Self::TITLE_SIZE * 1.5)
    }

    /// Column widths in mm, shrunk proportionally if wider than the page.
    fn column_widths(&self, headers: &[String], rows: &[Vec<String>]) -> Vec<f32> {
        let mut chars: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (n, cell) in chars.iter_mut().zip(row) {
                *n = (*n).max(cell.chars().count());
            }
        }

        let widths: Vec<f32> = chars
            .iter()
            .map(|&n| {
                pt(n as f32 * self.font_size * Self::CHAR_WIDTH_EM + 2.0 * Self::CELL_PADDING_PT)
            })
            .collect();

        let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
        let total: f32 = widths.iter().sum();
        if total > usable {
            widths.iter().map(|w| w * usable / total).collect()
        } else {
            widths
        }
    }

    fn draw_result(
        &self,
        cursor: &mut PageCursor,
        fonts: &Fonts,
        result: &AggregationResult,
    ) -> Result<()> {
        let (headers, rows) = result.cells()?;
        let widths = self.column_widths(&headers, &rows);
        let row_height = self.row_height();

        // heading, header row and the first body row stay together
        let body_rows = rows.len().min(1) as f32;
        cursor.ensure(self.title_height() + row_height * (1.0 + body_rows));

        cursor.advance(pt(Self::TITLE_SIZE));
        cursor.layer().set_fill_color(rgb(0, 0, 0));
        cursor.layer().use_text(
            result.pdf_title(),
            Self::TITLE_SIZE,
            Mm(MARGIN_MM),
            Mm(cursor.y()),
            &fonts.bold,
        );
        cursor.advance(self.title_height() - pt(Self::TITLE_SIZE));

        self.draw_row(cursor, &fonts.bold, &headers, &widths, true);
        for row in &rows {
            cursor.ensure(row_height);
            self.draw_row(cursor, &fonts.regular, row, &widths, false);
        }

        cursor.advance(pt(Self::SPACER_PT));
        Ok(())
    }

    fn draw_row(
        &self,
        cursor: &mut PageCursor,
        font: &IndirectFontRef,
        cells: &[String],
        widths: &[f32],
        header: bool,
    ) {
        let height = self.row_height();
        let top = cursor.y();
        let bottom = top - height;
        let (fill, text) = if header {
            (rgb(0x4F, 0x81, 0xBD), rgb(255, 255, 255))
        } else {
            (rgb(0xF5, 0xF5, 0xF5), rgb(0, 0, 0))
        };

        let layer = cursor.layer();
        layer.set_outline_color(rgb(128, 128, 128));
        layer.set_outline_thickness(0.25);

        let mut x = MARGIN_MM;
        for (cell, width) in cells.iter().zip(widths) {
            layer.set_fill_color(fill.clone());
            layer.add_rect(
                Rect::new(Mm(x), Mm(bottom), Mm(x + width), Mm(top))
                    .with_mode(PaintMode::FillStroke),
            );
            layer.set_fill_color(text.clone());
            layer.use_text(
                cell.as_str(),
                self.font_size,
                Mm(x + pt(Self::CELL_PADDING_PT)),
                Mm(bottom + pt(Self::CELL_PADDING_PT / 2.0 + self.font_size * 0.2)),
                font,
            );
            x += width;
        }

        cursor.advance(height);
    }
}

#[cfg(test)]
mod tests {
    use super::{MARGIN_MM, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, PageCursor, TableReportBuilder};
    use crate::analysis::{AggregationResult, run_pipeline};
    use crate::config::AnalysisConfig;
    use crate::dataset::Table;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn results() -> Vec<AggregationResult> {
        let df = df! {
            "total_bill" => &[10.0f64, 20.0, 10.0],
            "tip" => &[2.0f64, 4.0, 1.0],
            "sex" => &["Male", "Female", "Male"],
            "smoker" => &["No", "No", "Yes"],
            "day" => &["Sun", "Sun", "Sat"],
            "time" => &["Dinner", "Dinner", "Lunch"],
            "size" => &[2i64, 2, 1],
        }
        .unwrap();
        let table = Table::from_frame(df).unwrap();
        run_pipeline(&table, &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn test_render_produces_pdf() {
        let builder = TableReportBuilder::new("report.pdf", 8.0);
        let bytes = builder.render(&results()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_write_creates_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports/tips.pdf");

        TableReportBuilder::new(&path, 8.0).write(&results()).unwrap();
        assert!(fs::read(&path).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_write_failure_is_report_write_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let path = blocker.join("tips.pdf");

        let err = TableReportBuilder::new(&path, 8.0)
            .write(&results())
            .unwrap_err();
        assert_eq!(err.error_code(), "REPORT_WRITE_ERROR");
        assert!(!path.exists());
    }

    #[test]
    fn test_cursor_breaks_pages() {
        let mut cursor = PageCursor::new("t");
        cursor.ensure(10.0);
        assert_eq!(cursor.pages(), 1);

        cursor.advance(PAGE_HEIGHT_MM - 2.0 * MARGIN_MM - 5.0);
        cursor.ensure(10.0);
        assert_eq!(cursor.pages(), 2);
        assert_eq!(cursor.y(), PAGE_HEIGHT_MM - MARGIN_MM);
    }

    #[test]
    fn test_column_widths_fit_page() {
        let builder = TableReportBuilder::new("r.pdf", 8.0);
        let headers = vec!["x".repeat(200), "y".repeat(200)];
        let widths = builder.column_widths(&headers, &[]);
        let total: f32 = widths.iter().sum();
        assert!(total <= PAGE_WIDTH_MM - 2.0 * MARGIN_MM + 1e-3);
    }
}
