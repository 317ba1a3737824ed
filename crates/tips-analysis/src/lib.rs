//! Restaurant Tipping Analysis Library
//!
//! Descriptive statistics over the classic restaurant-tipping dataset, built
//! with Rust and Polars.
//!
//! # Overview
//!
//! - **Loading**: [`load_dataset`] reads the fixed-schema CSV and derives
//!   `tip_percentage` once, for every consumer
//! - **Aggregation**: a declarative catalog of 14 steps run by one generic
//!   executor ([`run_pipeline`])
//! - **Reporting**: a plain-text report and a paginated PDF of grid tables
//! - **Charts**: ten fixed charts, each written as PNG, PDF and SVG
//! - **Script export**: copies source files verbatim into monospaced PDFs
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tips_analysis::{AnalysisConfig, TableReportBuilder, load_dataset, render_text_report, run_pipeline};
//!
//! let config = AnalysisConfig::builder()
//!     .data_path("data/tips.csv")
//!     .top_n(10)
//!     .build()?;
//!
//! let table = load_dataset(&config.data_path)?;
//! let results = run_pipeline(&table, &config)?;
//!
//! println!("{}", render_text_report(&results, config.separator_width)?);
//! TableReportBuilder::new(&config.report_path, config.table_font_size).write(&results)?;
//! ```
//!
//! # Charts
//!
//! ```rust,ignore
//! use tips_analysis::ChartRenderer;
//!
//! let rendered = ChartRenderer::new(&config).render_all(&table)?;
//! for chart in rendered {
//!     println!("{:?}: {:?}", chart.chart, chart.files);
//! }
//! ```
//!
//! # Undefined values
//!
//! A record with `total_bill = 0` has a NaN `tip_percentage`. It is not an
//! error: means skip it, the top-N step sorts it last and reports print it
//! as `NaN`.

pub mod analysis;
pub mod charts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod exporter;
pub mod reporting;
pub mod utils;

// Re-exports for convenient access
pub use analysis::{AggregationResult, StepKind, StepSpec, catalog, execute, run_pipeline};
pub use charts::{Chart, ChartFormat, ChartRenderer, RenderedChart};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use dataset::{Table, load_dataset};
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use exporter::{export_script, export_scripts};
pub use reporting::{TableReportBuilder, render_text_report};
