//! Shared utilities for the tipping analysis.
//!
//! Cell formatting lives here so the text reporter, the PDF builder and the
//! JSON output render a value the same way.

use polars::prelude::*;
use std::cmp::Ordering;

/// Rendering of an undefined cell (null or NaN).
pub const UNDEFINED_CELL: &str = "NaN";

/// Upper bound on decimals shown for a float column.
pub const MAX_DECIMALS: usize = 6;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

// =============================================================================
// Cell Formatting
// =============================================================================

/// Number of decimals needed to show `value` at [`MAX_DECIMALS`] precision
/// without trailing zeros.
pub fn significant_decimals(value: f64) -> usize {
    if !value.is_finite() {
        return 0;
    }
    let fixed = format!("{:.*}", MAX_DECIMALS, value);
    match fixed.split_once('.') {
        Some((_, frac)) => frac.trim_end_matches('0').len(),
        None => 0,
    }
}

/// Decimals shared by every value of a float column: the most any value
/// needs, at least one.
pub fn column_decimals(values: &[Option<f64>]) -> usize {
    values
        .iter()
        .flatten()
        .map(|v| significant_decimals(*v))
        .max()
        .unwrap_or(1)
        .clamp(1, MAX_DECIMALS)
}

/// Format a single float cell with a fixed number of decimals.
pub fn format_float(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_nan() => UNDEFINED_CELL.to_string(),
        Some(v) if v.is_infinite() => {
            if v > 0.0 {
                "inf".to_string()
            } else {
                "-inf".to_string()
            }
        }
        Some(v) => format!("{:.*}", decimals, v),
        None => UNDEFINED_CELL.to_string(),
    }
}

/// Render every cell of a column as display text.
///
/// Float columns share one decimal count; integers render plainly; null and
/// NaN render as [`UNDEFINED_CELL`].
pub fn format_column(column: &Column) -> PolarsResult<Vec<String>> {
    let series = column.as_materialized_series();
    let dtype = series.dtype();

    if is_float_dtype(dtype) {
        let floats = series.cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = floats.f64()?.into_iter().collect();
        let decimals = column_decimals(&values);
        return Ok(values
            .into_iter()
            .map(|v| format_float(v, decimals))
            .collect());
    }

    if is_numeric_dtype(dtype) {
        let ints = series.cast(&DataType::Int64)?;
        return Ok(ints
            .i64()?
            .into_iter()
            .map(|v| v.map_or_else(|| UNDEFINED_CELL.to_string(), |n| n.to_string()))
            .collect());
    }

    let strings = series.cast(&DataType::String)?;
    Ok(strings
        .str()?
        .into_iter()
        .map(|v| v.map_or_else(|| UNDEFINED_CELL.to_string(), str::to_string))
        .collect())
}

/// Render a whole frame as header names plus row-major display cells.
pub fn frame_cells(df: &DataFrame) -> PolarsResult<(Vec<String>, Vec<Vec<String>>)> {
    let headers: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let formatted: Vec<Vec<String>> = df
        .get_columns()
        .iter()
        .map(format_column)
        .collect::<PolarsResult<_>>()?;

    let rows = (0..df.height())
        .map(|row| formatted.iter().map(|col| col[row].clone()).collect())
        .collect();

    Ok((headers, rows))
}

// =============================================================================
// Column Extraction
// =============================================================================

/// Values of a numeric column as `f64`; nulls become NaN.
pub fn column_f64(df: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
    let floats = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(floats
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

/// Values of a column as owned labels; nulls become empty strings.
pub fn column_labels(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    let strings = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(strings
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

// =============================================================================
// Ordering
// =============================================================================

/// Descending order on floats with NaN placed after every number.
///
/// Used with a stable sort so equal values keep their original row order.
pub fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::UInt32));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_significant_decimals() {
        assert_eq!(significant_decimals(2.0), 0);
        assert_eq!(significant_decimals(16.99), 2);
        assert_eq!(significant_decimals(1.0 / 3.0), 6);
        assert_eq!(significant_decimals(f64::NAN), 0);
    }

    #[test]
    fn test_column_decimals_shared() {
        let values = vec![Some(1.5), Some(4.0), None, Some(f64::NAN)];
        assert_eq!(column_decimals(&values), 1);

        let values = vec![Some(10.34), Some(1.01)];
        assert_eq!(column_decimals(&values), 2);
    }

    #[test]
    fn test_column_decimals_empty_defaults_to_one() {
        assert_eq!(column_decimals(&[]), 1);
        assert_eq!(column_decimals(&[None, Some(f64::NAN)]), 1);
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(Some(2.5), 2), "2.50");
        assert_eq!(format_float(Some(f64::NAN), 2), "NaN");
        assert_eq!(format_float(None, 2), "NaN");
        assert_eq!(format_float(Some(f64::INFINITY), 2), "inf");
    }

    #[test]
    fn test_format_column_float() {
        let column = Column::new("v".into(), &[1.5f64, 4.0, f64::NAN]);
        let cells = format_column(&column).unwrap();
        assert_eq!(cells, vec!["1.5", "4.0", "NaN"]);
    }

    #[test]
    fn test_format_column_integer_and_string() {
        let ints = Column::new("n".into(), &[Some(2u32), None, Some(7)]);
        assert_eq!(format_column(&ints).unwrap(), vec!["2", "NaN", "7"]);

        let labels = Column::new("day".into(), &["Sun", "Sat"]);
        assert_eq!(format_column(&labels).unwrap(), vec!["Sun", "Sat"]);
    }

    #[test]
    fn test_frame_cells_row_major() {
        let df = DataFrame::new(vec![
            Column::new("Sex".into(), &["Female", "Male"]),
            Column::new("Average_Tip".into(), &[4.0f64, 1.5]),
        ])
        .unwrap();

        let (headers, rows) = frame_cells(&df).unwrap();
        assert_eq!(headers, vec!["Sex", "Average_Tip"]);
        assert_eq!(rows, vec![vec!["Female", "4.0"], vec!["Male", "1.5"]]);
    }

    #[test]
    fn test_descending_nan_last() {
        let mut values = vec![1.0, f64::NAN, 3.0, 2.0];
        values.sort_by(|a, b| descending_nan_last(*a, *b));
        assert_eq!(values[..3], [3.0, 2.0, 1.0]);
        assert!(values[3].is_nan());
    }
}
