//! Aggregation pipeline.
//!
//! The pipeline is a declarative [`catalog`] of [`StepSpec`] descriptors and
//! one generic [`execute`] function. [`run_pipeline`] runs the whole catalog
//! in order and hands the results to the reporters.
//!
//! # Example
//!
//! ```rust,ignore
//! use tips_analysis::{AnalysisConfig, load_dataset, run_pipeline};
//!
//! let config = AnalysisConfig::default();
//! let table = load_dataset(&config.data_path)?;
//! for result in run_pipeline(&table, &config)? {
//!     println!("{}: {:?}", result.title(), result.frame().shape());
//! }
//! ```

pub mod catalog;
pub mod correlation;
mod executor;

pub use catalog::{AggOp, StepKind, StepSpec, catalog, find_step};
pub use executor::{CORRELATION_INDEX, execute};

use crate::config::AnalysisConfig;
use crate::dataset::Table;
use crate::error::Result;
use crate::utils::{column_f64, column_labels, frame_cells};
use polars::prelude::*;
use serde::Serialize;
use serde::ser::{Error as _, SerializeStruct};
use tracing::info;

/// The output table of one step.
///
/// Immutable after creation: reporters only read it.
#[derive(Debug, Clone)]
pub struct AggregationResult {
    number: usize,
    title: String,
    pdf_title: String,
    frame: DataFrame,
}

impl AggregationResult {
    pub(crate) fn new(spec: &StepSpec, frame: DataFrame) -> Self {
        Self {
            number: spec.number,
            title: spec.title.clone(),
            pdf_title: spec.pdf_title.clone(),
            frame,
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    /// Title used by the text report.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title used by the PDF report.
    pub fn pdf_title(&self) -> &str {
        &self.pdf_title
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Column headers in display order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Numeric column values as `f64`; undefined cells are NaN.
    pub fn values_f64(&self, name: &str) -> Result<Vec<f64>> {
        Ok(column_f64(&self.frame, name)?)
    }

    /// Column values as labels.
    pub fn labels(&self, name: &str) -> Result<Vec<String>> {
        Ok(column_labels(&self.frame, name)?)
    }

    /// Headers plus row-major display cells.
    pub fn cells(&self) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        Ok(frame_cells(&self.frame)?)
    }
}

impl Serialize for AggregationResult {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let (columns, rows) = frame_cells(&self.frame).map_err(S::Error::custom)?;
        let mut state = serializer.serialize_struct("AggregationResult", 4)?;
        state.serialize_field("number", &self.number)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("columns", &columns)?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}

/// Run every catalog step, in order, against `table`.
pub fn run_pipeline(table: &Table, config: &AnalysisConfig) -> Result<Vec<AggregationResult>> {
    info!("Running {} analysis steps...", catalog::STEP_COUNT);
    let results = catalog(config.top_n)
        .iter()
        .map(|spec| execute(spec, table))
        .collect::<Result<Vec<_>>>()?;
    info!("Analysis steps completed");
    Ok(results)
}
