//! Dataset loading.
//!
//! [`load_dataset`] is the only way the report and chart pipelines obtain
//! data, so the derived `tip_percentage` column is computed in exactly one
//! place.

use crate::error::{AnalysisError, Result};
use crate::utils::{column_f64, column_labels};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const TOTAL_BILL: &str = "total_bill";
pub const TIP: &str = "tip";
pub const SEX: &str = "sex";
pub const SMOKER: &str = "smoker";
pub const DAY: &str = "day";
pub const TIME: &str = "time";
pub const SIZE: &str = "size";
/// Derived column, never read from the source.
pub const TIP_PERCENTAGE: &str = "tip_percentage";

/// Source columns, in schema order.
pub const REQUIRED_COLUMNS: [&str; 7] = [TOTAL_BILL, TIP, SEX, SMOKER, DAY, TIME, SIZE];

const DECIMAL_COLUMNS: [&str; 2] = [TOTAL_BILL, TIP];
const CATEGORY_COLUMNS: [&str; 4] = [SEX, SMOKER, DAY, TIME];

/// The loaded dataset: the seven source columns plus `tip_percentage`.
///
/// Read-only once built; every aggregation step reads from it and nothing
/// writes back.
#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
}

impl Table {
    /// Validate an in-memory frame against the schema and derive
    /// `tip_percentage`.
    ///
    /// Extra columns are dropped; a source `tip_percentage` column is ignored.
    pub fn from_frame(df: DataFrame) -> Result<Self> {
        Self::from_frame_with_source(df, Path::new("<memory>"))
    }

    fn from_frame_with_source(df: DataFrame, source: &Path) -> Result<Self> {
        for name in REQUIRED_COLUMNS {
            if df.column(name).is_err() {
                return Err(AnalysisError::MissingColumn(name.to_string()));
            }
        }

        let mut columns = Vec::with_capacity(REQUIRED_COLUMNS.len());
        for name in REQUIRED_COLUMNS {
            let target = if DECIMAL_COLUMNS.contains(&name) {
                DataType::Float64
            } else if CATEGORY_COLUMNS.contains(&name) {
                DataType::String
            } else {
                DataType::Int64
            };
            columns.push(cast_required(&df, name, &target, source)?);
        }

        let frame = DataFrame::new(columns)?
            .lazy()
            .with_column(
                when(col(TOTAL_BILL).eq(lit(0.0)))
                    .then(lit(f64::NAN))
                    .otherwise(col(TIP) / col(TOTAL_BILL) * lit(100.0))
                    .alias(TIP_PERCENTAGE),
            )
            .collect()?;

        let table = Self { frame };
        let undefined = table
            .values_f64(TIP_PERCENTAGE)?
            .iter()
            .filter(|v| v.is_nan())
            .count();
        if undefined > 0 {
            warn!(
                "{} record(s) with total_bill = 0 have an undefined tip percentage",
                undefined
            );
        }

        Ok(table)
    }

    /// The underlying frame.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of records.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Values of a numeric column as `f64`; nulls become NaN.
    pub fn values_f64(&self, name: &str) -> Result<Vec<f64>> {
        self.require(name)?;
        Ok(column_f64(&self.frame, name)?)
    }

    /// Values of a categorical column as owned labels.
    pub fn labels(&self, name: &str) -> Result<Vec<String>> {
        self.require(name)?;
        Ok(column_labels(&self.frame, name)?)
    }

    fn require(&self, name: &str) -> Result<()> {
        if self.frame.column(name).is_err() {
            return Err(AnalysisError::MissingColumn(name.to_string()));
        }
        Ok(())
    }
}

/// Cast a required column, treating any null in the result as malformed input.
fn cast_required(df: &DataFrame, name: &str, target: &DataType, source: &Path) -> Result<Column> {
    let original = df.column(name)?;
    let source_nulls = original.null_count();
    if source_nulls > 0 {
        return Err(AnalysisError::load(
            source,
            format!("column '{}' has {} empty value(s)", name, source_nulls),
        ));
    }

    let cast = original
        .cast(target)
        .map_err(|e| AnalysisError::load(source, format!("column '{}': {}", name, e)))?;
    let invalid = cast.null_count();
    if invalid > 0 {
        return Err(AnalysisError::load(
            source,
            format!(
                "column '{}' has {} value(s) that are not {}",
                name, invalid, target
            ),
        ));
    }

    Ok(cast)
}

/// Load the dataset at `path` and derive `tip_percentage`.
///
/// # Errors
///
/// Returns a load error when the file is missing or cannot be parsed, and
/// [`AnalysisError::MissingColumn`] when a required column is absent.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(AnalysisError::load(path, "file not found"));
    }

    info!("Loading dataset from: {}", path.display());
    let raw = CsvReadOptions::default()
        .with_has_header(true)
        // whole-file inference: a column of whole-number bills can turn
        // decimal far down the file
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .and_then(|reader| reader.finish())
        .map_err(|e| AnalysisError::load(path, e))?;
    debug!("Raw dataset shape: {:?}", raw.shape());

    let table = Table::from_frame_with_source(raw, path)?;
    info!("Dataset loaded successfully: {:?}", table.frame().shape());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_frame() -> DataFrame {
        df! {
            TOTAL_BILL => &[10.0f64, 20.0, 0.0],
            TIP => &[2.0f64, 4.0, 1.0],
            SEX => &["Male", "Female", "Male"],
            SMOKER => &["No", "No", "Yes"],
            DAY => &["Sun", "Sun", "Sat"],
            TIME => &["Dinner", "Dinner", "Lunch"],
            SIZE => &[2i64, 2, 1],
        }
        .unwrap()
    }

    #[test]
    fn test_tip_percentage_is_derived() {
        let table = Table::from_frame(sample_frame()).unwrap();
        let pct = table.values_f64(TIP_PERCENTAGE).unwrap();

        assert_eq!(pct[0], 20.0);
        assert_eq!(pct[1], 20.0);
    }

    #[test]
    fn test_zero_bill_gives_nan() {
        let table = Table::from_frame(sample_frame()).unwrap();
        let pct = table.values_f64(TIP_PERCENTAGE).unwrap();
        assert!(pct[2].is_nan());
    }

    #[test]
    fn test_column_order_and_extra_columns_dropped() {
        let mut df = sample_frame();
        df.with_column(Column::new("note".into(), &["a", "b", "c"]))
            .unwrap();
        let table = Table::from_frame(df).unwrap();

        let names: Vec<String> = table
            .frame()
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(
            names,
            vec!["total_bill", "tip", "sex", "smoker", "day", "time", "size", "tip_percentage"]
        );
    }

    #[test]
    fn test_missing_column_is_load_error() {
        let df = sample_frame().drop(SMOKER).unwrap();
        let err = Table::from_frame(df).unwrap_err();

        assert!(matches!(err, AnalysisError::MissingColumn(ref c) if c == "smoker"));
        assert!(err.is_load_error());
    }

    #[test]
    fn test_non_numeric_bill_is_load_error() {
        let df = df! {
            TOTAL_BILL => &["ten", "20"],
            TIP => &[2.0f64, 4.0],
            SEX => &["Male", "Female"],
            SMOKER => &["No", "No"],
            DAY => &["Sun", "Sun"],
            TIME => &["Dinner", "Dinner"],
            SIZE => &[2i64, 2],
        }
        .unwrap();

        let err = Table::from_frame(df).unwrap_err();
        assert_eq!(err.error_code(), "LOAD_ERROR");
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = load_dataset("does/not/exist.csv").unwrap_err();
        assert!(err.is_load_error());
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_labels_and_height() {
        let table = Table::from_frame(sample_frame()).unwrap();
        assert_eq!(table.height(), 3);
        assert_eq!(table.labels(DAY).unwrap(), vec!["Sun", "Sun", "Sat"]);
    }
}
