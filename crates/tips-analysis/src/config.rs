//! Configuration for the analysis run.
//!
//! Defaults reproduce the fixed layout of the project: the dataset under
//! `data/`, the PDF report under `reports/` and the charts under `charts/`.
//! The CLI only overrides what the user passes explicitly.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default dataset location, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "data/tips.csv";
/// Default PDF report location.
pub const DEFAULT_REPORT_PATH: &str = "reports/tips_advanced_report.pdf";
/// Default chart output root.
pub const DEFAULT_CHARTS_DIR: &str = "charts";
/// Default directory for exported script documents.
pub const DEFAULT_SCRIPTS_DIR: &str = "reports";

/// Configuration shared by the report, chart and export pipelines.
///
/// Use [`AnalysisConfig::builder()`] to create a configuration with a
/// fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use tips_analysis::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .data_path("data/tips.csv")
///     .top_n(5)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Path of the delimited input table.
    /// Default: "data/tips.csv"
    pub data_path: PathBuf,

    /// Path of the paginated tabular report.
    /// Default: "reports/tips_advanced_report.pdf"
    pub report_path: PathBuf,

    /// Root directory for charts; `png`, `pdf` and `svg` live beneath it.
    /// Default: "charts"
    pub charts_dir: PathBuf,

    /// Output directory of the script exporter.
    /// Default: "reports"
    pub scripts_dir: PathBuf,

    /// Number of rows kept by the top tip percentage step.
    /// Default: 10
    pub top_n: usize,

    /// Width of the `=` rule around each text report title.
    /// Default: 46
    pub separator_width: usize,

    /// Font size of PDF table cells, in points.
    /// Default: 8.0
    pub table_font_size: f32,

    /// Chart canvas size in pixels (width, height).
    /// Default: (1200, 700)
    pub chart_size: (u32, u32),

    /// Number of bins of the tip percentage histogram.
    /// Default: 20
    pub histogram_bins: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            charts_dir: PathBuf::from(DEFAULT_CHARTS_DIR),
            scripts_dir: PathBuf::from(DEFAULT_SCRIPTS_DIR),
            top_n: 10,
            separator_width: 46,
            table_font_size: 8.0,
            chart_size: (1200, 700),
            histogram_bins: 20,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.top_n == 0 {
            return Err(ConfigValidationError::ZeroCount {
                field: "top_n".to_string(),
            });
        }

        if self.separator_width == 0 {
            return Err(ConfigValidationError::ZeroCount {
                field: "separator_width".to_string(),
            });
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::ZeroCount {
                field: "histogram_bins".to_string(),
            });
        }

        if !(self.table_font_size.is_finite() && self.table_font_size > 0.0) {
            return Err(ConfigValidationError::InvalidFontSize(self.table_font_size));
        }

        if self.chart_size.0 == 0 || self.chart_size.1 == 0 {
            return Err(ConfigValidationError::InvalidChartSize {
                width: self.chart_size.0,
                height: self.chart_size.1,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': must be at least 1")]
    ZeroCount { field: String },

    #[error("Invalid table font size: {0} (must be a positive number)")]
    InvalidFontSize(f32),

    #[error("Invalid chart size: {width}x{height} (both dimensions must be non-zero)")]
    InvalidChartSize { width: u32, height: u32 },
}

impl From<ConfigValidationError> for AnalysisError {
    fn from(err: ConfigValidationError) -> Self {
        AnalysisError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    data_path: Option<PathBuf>,
    report_path: Option<PathBuf>,
    charts_dir: Option<PathBuf>,
    scripts_dir: Option<PathBuf>,
    top_n: Option<usize>,
    separator_width: Option<usize>,
    table_font_size: Option<f32>,
    chart_size: Option<(u32, u32)>,
    histogram_bins: Option<usize>,
}

impl AnalysisConfigBuilder {
    /// Set the input dataset path.
    pub fn data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    /// Set the PDF report path.
    pub fn report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    /// Set the chart output root.
    pub fn charts_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.charts_dir = Some(path.into());
        self
    }

    /// Set the output directory of exported scripts.
    pub fn scripts_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.scripts_dir = Some(path.into());
        self
    }

    /// Set how many rows the top tip percentage step keeps.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Set the width of the text report rules.
    pub fn separator_width(mut self, width: usize) -> Self {
        self.separator_width = Some(width);
        self
    }

    /// Set the PDF table font size in points.
    pub fn table_font_size(mut self, size: f32) -> Self {
        self.table_font_size = Some(size);
        self
    }

    /// Set the chart canvas size in pixels.
    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_size = Some((width, height));
        self
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            data_path: self.data_path.unwrap_or(defaults.data_path),
            report_path: self.report_path.unwrap_or(defaults.report_path),
            charts_dir: self.charts_dir.unwrap_or(defaults.charts_dir),
            scripts_dir: self.scripts_dir.unwrap_or(defaults.scripts_dir),
            top_n: self.top_n.unwrap_or(defaults.top_n),
            separator_width: self.separator_width.unwrap_or(defaults.separator_width),
            table_font_size: self.table_font_size.unwrap_or(defaults.table_font_size),
            chart_size: self.chart_size.unwrap_or(defaults.chart_size),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.data_path, PathBuf::from("data/tips.csv"));
        assert_eq!(
            config.report_path,
            PathBuf::from("reports/tips_advanced_report.pdf")
        );
        assert_eq!(config.top_n, 10);
        assert_eq!(config.separator_width, 46);
        assert_eq!(config.table_font_size, 8.0);
        assert_eq!(config.histogram_bins, 20);
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let config = AnalysisConfig::builder().build().unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AnalysisConfig::builder()
            .data_path("fixtures/small.csv")
            .charts_dir("out/charts")
            .top_n(3)
            .chart_size(800, 600)
            .build()
            .unwrap();

        assert_eq!(config.data_path, PathBuf::from("fixtures/small.csv"));
        assert_eq!(config.charts_dir, PathBuf::from("out/charts"));
        assert_eq!(config.top_n, 3);
        assert_eq!(config.chart_size, (800, 600));
    }

    #[test]
    fn test_validation_zero_top_n() {
        let result = AnalysisConfig::builder().top_n(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::ZeroCount { field } if field == "top_n"
        ));
    }

    #[test]
    fn test_validation_font_size() {
        let result = AnalysisConfig::builder().table_font_size(0.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidFontSize(_)
        ));

        let result = AnalysisConfig::builder().table_font_size(f32::NAN).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_chart_size() {
        let result = AnalysisConfig::builder().chart_size(0, 700).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidChartSize { width: 0, height: 700 }
        ));
    }

    #[test]
    fn test_validation_error_converts_to_analysis_error() {
        let err: AnalysisError = ConfigValidationError::InvalidFontSize(-1.0).into();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "data_path": "input/tips.csv",
            "report_path": "out/report.pdf",
            "charts_dir": "out/charts",
            "scripts_dir": "out/scripts",
            "top_n": 5,
            "separator_width": 30,
            "table_font_size": 9.0,
            "chart_size": [640, 480],
            "histogram_bins": 10
        }"#;

        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.separator_width, 30);
        assert_eq!(config.chart_size, (640, 480));
        assert!(config.validate().is_ok());
    }
}
