//! Script-to-PDF export.
//!
//! Copies the literal text of a source file into a paginated PDF with a
//! title line and a monospaced body. Unrelated to the analysis itself.

use crate::error::{AnalysisError, Result};
use crate::reporting::pdf::{MARGIN_MM, PAGE_WIDTH_MM, PageCursor, pt};
use crate::reporting::write_atomic;
use printpdf::{BuiltinFont, IndirectFontRef, Mm};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const TITLE_SIZE: f32 = 18.0;
const BODY_SIZE: f32 = 8.0;
const TITLE_GAP_PT: f32 = 20.0;
const TAB: &str = "    ";
/// Courier advances 0.6 em per glyph.
const COURIER_EM: f32 = 0.6;

/// Characters of body text that fit on one line.
pub fn line_capacity() -> usize {
    let usable_pt = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) / pt(1.0);
    (usable_pt / (BODY_SIZE * COURIER_EM)).floor() as usize
}

/// Split `source` into printable lines: tabs expanded, long lines hard
/// wrapped at `width` characters, empty lines kept.
pub fn layout_lines(source: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for raw in source.lines() {
        let expanded = raw.replace('\t', TAB);
        let chars: Vec<char> = expanded.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        for chunk in chars.chunks(width) {
            lines.push(chunk.iter().collect());
        }
    }
    lines
}

/// Output file name for `input`: `<stem>_script.pdf`.
pub fn output_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "script".to_string());
    format!("{}_script.pdf", stem)
}

/// Render the document for a source text in memory.
pub fn render_script(name: &str, source: &str, out: &Path) -> Result<Vec<u8>> {
    let title = format!("Script: {}", name);
    let mut cursor = PageCursor::new(&title);
    let bold = builtin(&cursor, BuiltinFont::HelveticaBold, out)?;
    let mono = builtin(&cursor, BuiltinFont::Courier, out)?;

    cursor.advance(pt(TITLE_SIZE));
    cursor
        .layer()
        .use_text(title.as_str(), TITLE_SIZE, Mm(MARGIN_MM), Mm(cursor.y()), &bold);
    cursor.advance(pt(TITLE_GAP_PT));

    let line_height = pt(BODY_SIZE * 1.2);
    for line in layout_lines(source, line_capacity()) {
        cursor.ensure(line_height);
        cursor.advance(line_height);
        if !line.is_empty() {
            cursor
                .layer()
                .use_text(line, BODY_SIZE, Mm(MARGIN_MM), Mm(cursor.y()), &mono);
        }
    }

    cursor.finish(out)
}

fn builtin(cursor: &PageCursor, font: BuiltinFont, out: &Path) -> Result<IndirectFontRef> {
    cursor
        .doc()
        .add_builtin_font(font)
        .map_err(|e| AnalysisError::report_write(out, e))
}

/// Export one file into `out_dir`, returning the written path.
pub fn export_script(input: &Path, out_dir: &Path) -> Result<PathBuf> {
    let source = fs::read_to_string(input).map_err(|e| AnalysisError::load(input, e))?;
    let name = input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let out = out_dir.join(output_name(input));
    let bytes = render_script(&name, &source, &out)?;
    write_atomic(&out, &bytes)?;

    info!("Created PDF: {}", out.display());
    Ok(out)
}

/// Export several files, stopping at the first failure.
pub fn export_scripts(inputs: &[PathBuf], out_dir: &Path) -> Result<Vec<PathBuf>> {
    inputs.iter().map(|input| export_script(input, out_dir)).collect()
}
