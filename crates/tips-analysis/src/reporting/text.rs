//! Plain-text report.
//!
//! The report is built as an ordered list of sections and only joined at the
//! end; nothing here performs I/O.

use crate::analysis::AggregationResult;
use crate::error::Result;

/// Column separator of rendered tables.
const COLUMN_GAP: &str = "  ";

/// Render headers and cells as right-aligned columns without a row index.
///
/// Each column is as wide as its widest header or cell.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{:>width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP)
    };

    std::iter::once(line(headers))
        .chain(rows.iter().map(|row| line(row)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The text pieces of one result: opening rule, title, closing rule, table,
/// trailing newline.
pub fn section(result: &AggregationResult, width: usize) -> Result<Vec<String>> {
    let rule = "=".repeat(width);
    let (headers, rows) = result.cells()?;
    Ok(vec![
        format!("\n{}", rule),
        format!(" {}", result.title()),
        rule,
        render_table(&headers, &rows),
        "\n".to_string(),
    ])
}

/// Every section, in pipeline order.
pub fn report_sections(results: &[AggregationResult], width: usize) -> Result<Vec<String>> {
    let mut pieces = Vec::with_capacity(results.len() * 5);
    for result in results {
        pieces.extend(section(result, width)?);
    }
    Ok(pieces)
}

/// The whole text report as one string, pieces joined by newlines.
pub fn render_text_report(results: &[AggregationResult], width: usize) -> Result<String> {
    Ok(report_sections(results, width)?.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{execute, find_step};
    use crate::dataset::Table;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn scenario_table() -> Table {
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
        Table::from_frame(df).unwrap()
    }

    #[test]
    fn test_render_table_right_aligns() {
        let headers = strings(&["Sex", "Average_Tip"]);
        let rows = vec![strings(&["Female", "4.0"]), strings(&["Male", "1.5"])];

        let expected = "   Sex  Average_Tip\nFemale          4.0\n  Male          1.5";
        assert_eq!(render_table(&headers, &rows), expected);
    }

    #[test]
    fn test_render_table_header_only() {
        let headers = strings(&["a", "bb"]);
        assert_eq!(render_table(&headers, &[]), "a  bb");
    }

    #[test]
    fn test_section_layout() {
        let table = scenario_table();
        let result = execute(&find_step(9, 10).unwrap(), &table).unwrap();
        let text = section(&result, 10).unwrap().join("\n");

        let expected = "\n\
==========\n \
ANALYSIS 9: Total Customers per Day\n\
==========\n\
Day  Total_Customers\n\
Sat                1\n\
Sun                2\n\
\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_report_keeps_pipeline_order() {
        let table = scenario_table();
        let results: Vec<_> = [5, 4]
            .iter()
            .map(|n| execute(&find_step(*n, 10).unwrap(), &table).unwrap())
            .collect();

        let report = render_text_report(&results, 46).unwrap();
        let five = report.find("ANALYSIS 5").unwrap();
        let four = report.find("ANALYSIS 4").unwrap();
        assert!(five < four);
    }

    #[test]
    fn test_report_is_deterministic() {
        let table = scenario_table();
        let results: Vec<_> = (1..=14)
            .map(|n| execute(&find_step(n, 10).unwrap(), &table).unwrap())
            .collect();

        assert_eq!(
            render_text_report(&results, 46).unwrap(),
            render_text_report(&results, 46).unwrap()
        );
    }
}
