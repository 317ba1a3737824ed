//! Report generation module.
//!
//! Both reporters consume the same ordered list of
//! [`AggregationResult`](crate::analysis::AggregationResult)s:
//!
//! - [`render_text_report`] builds the plain-text report printed to stdout
//! - [`TableReportBuilder`] lays the results out as grid tables in a
//!   paginated PDF, written atomically
//!
//! # Example
//!
//! ```rust,ignore
//! use tips_analysis::reporting::{TableReportBuilder, render_text_report};
//!
//! let results = run_pipeline(&table, &config)?;
//! println!("{}", render_text_report(&results, config.separator_width)?);
//! TableReportBuilder::new(&config.report_path, config.table_font_size).write(&results)?;
//! ```

pub mod pdf;
pub mod text;
mod writer;

pub use pdf::{PageCursor, TableReportBuilder};
pub use text::{render_table, render_text_report, report_sections};
pub use writer::write_atomic;
