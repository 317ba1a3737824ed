//! Chart data, derived from the base table through the step executor.

use crate::analysis::{AggregationResult, CORRELATION_INDEX, execute, find_step};
use crate::dataset::{TIP, TIP_PERCENTAGE, TOTAL_BILL, Table};
use crate::error::{AnalysisError, Result};
use serde::Serialize;

/// The ten fixed charts, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Chart {
    TotalBillVsTip,
    TipPercentageDistribution,
    AvgTipPercentageByDay,
    CustomerCountPerDay,
    AvgTipByGroupSize,
    TotalRevenuePerDay,
    GenderCountByTime,
    GenderCountByDay,
    TipPercentageBySmoker,
    CorrelationHeatmap,
}

impl Chart {
    pub const ALL: [Chart; 10] = [
        Chart::TotalBillVsTip,
        Chart::TipPercentageDistribution,
        Chart::AvgTipPercentageByDay,
        Chart::CustomerCountPerDay,
        Chart::AvgTipByGroupSize,
        Chart::TotalRevenuePerDay,
        Chart::GenderCountByTime,
        Chart::GenderCountByDay,
        Chart::TipPercentageBySmoker,
        Chart::CorrelationHeatmap,
    ];

    /// Base file name shared by the three encodings.
    pub fn stem(self) -> &'static str {
        match self {
            Chart::TotalBillVsTip => "01_total_bill_vs_tip",
            Chart::TipPercentageDistribution => "02_tip_percentage_distribution",
            Chart::AvgTipPercentageByDay => "03_avg_tip_percentage_by_day",
            Chart::CustomerCountPerDay => "04_customer_count_per_day",
            Chart::AvgTipByGroupSize => "05_avg_tip_by_group_size",
            Chart::TotalRevenuePerDay => "06_total_revenue_per_day",
            Chart::GenderCountByTime => "07_gender_count_by_time",
            Chart::GenderCountByDay => "08_gender_count_by_day",
            Chart::TipPercentageBySmoker => "09_tip_percentage_by_smoker_status",
            Chart::CorrelationHeatmap => "10_correlation_heatmap",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Chart::TotalBillVsTip => "Total Bill vs Tip",
            Chart::TipPercentageDistribution => "Tip Percentage Distribution",
            Chart::AvgTipPercentageByDay => "Average Tip Percentage by Day",
            Chart::CustomerCountPerDay => "Customer Count per Day",
            Chart::AvgTipByGroupSize => "Average Tip by Group Size",
            Chart::TotalRevenuePerDay => "Total Revenue per Day",
            Chart::GenderCountByTime => "Gender Count by Time",
            Chart::GenderCountByDay => "Gender Count by Day",
            Chart::TipPercentageBySmoker => "Tip Percentage by Smoker Status",
            Chart::CorrelationHeatmap => "Correlation Heatmap",
        }
    }

    /// Axis descriptions (x, y). The heatmap has none.
    pub fn axes(self) -> (&'static str, &'static str) {
        match self {
            Chart::TotalBillVsTip => ("Total Bill", "Tip"),
            Chart::TipPercentageDistribution => ("Tip Percentage", "Frequency"),
            Chart::AvgTipPercentageByDay => ("Day", "Average Tip Percentage"),
            Chart::CustomerCountPerDay => ("Day", "Customer Count"),
            Chart::AvgTipByGroupSize => ("Group Size", "Average Tip"),
            Chart::TotalRevenuePerDay => ("Day", "Total Revenue"),
            Chart::GenderCountByTime => ("Time", "Count"),
            Chart::GenderCountByDay => ("Day", "Count"),
            Chart::TipPercentageBySmoker => ("Smoker Status", "Average Tip Percentage"),
            Chart::CorrelationHeatmap => ("", ""),
        }
    }
}

/// One histogram bin over `[lower, upper)`; the last bin is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// What gets drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Plot {
    Scatter {
        points: Vec<(f64, f64)>,
    },
    Histogram {
        bins: Vec<Bin>,
    },
    /// One bar per label, drawn in palette colour `color`.
    Bars {
        labels: Vec<String>,
        values: Vec<f64>,
        color: usize,
    },
    /// One cluster per label, one bar per named series.
    Clustered {
        labels: Vec<String>,
        series: Vec<(String, Vec<f64>)>,
    },
    Heatmap {
        labels: Vec<String>,
        matrix: Vec<Vec<f64>>,
    },
}

/// A chart together with its data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub chart: Chart,
    pub plot: Plot,
}

impl ChartSpec {
    pub fn title(&self) -> &'static str {
        self.chart.title()
    }
}

/// Equal-width bins between the smallest and largest finite value.
///
/// NaN and infinite values are ignored. A single distinct value gets a unit
/// wide range centred on it.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

fn step_result(chart: Chart, number: usize, table: &Table) -> Result<AggregationResult> {
    let spec = find_step(number, 1)
        .ok_or_else(|| AnalysisError::render(chart.stem(), format!("no analysis step {}", number)))?;
    execute(&spec, table)
}

fn bars(chart: Chart, table: &Table, number: usize, color: usize) -> Result<Plot> {
    let result = step_result(chart, number, table)?;
    let headers = result.column_names();
    Ok(Plot::Bars {
        labels: result.labels(&headers[0])?,
        values: result.values_f64(&headers[1])?,
        color,
    })
}

fn clustered(chart: Chart, table: &Table, number: usize) -> Result<Plot> {
    let result = step_result(chart, number, table)?;
    let headers = result.column_names();
    let series = headers[1..]
        .iter()
        .map(|name| Ok((name.clone(), result.values_f64(name)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Plot::Clustered {
        labels: result.labels(&headers[0])?,
        series,
    })
}

fn heatmap(chart: Chart, table: &Table) -> Result<Plot> {
    let result = step_result(chart, 12, table)?;
    let labels = result.labels(CORRELATION_INDEX)?;
    let columns = labels
        .iter()
        .map(|name| result.values_f64(name))
        .collect::<Result<Vec<_>>>()?;
    // transpose column-major cells into rows
    let matrix = (0..labels.len())
        .map(|i| columns.iter().map(|col| col[i]).collect())
        .collect();
    Ok(Plot::Heatmap { labels, matrix })
}

/// Compute the data for `chart` from the base table.
pub fn chart_spec(chart: Chart, table: &Table, histogram_bins: usize) -> Result<ChartSpec> {
    let plot = match chart {
        Chart::TotalBillVsTip => {
            let x = table.values_f64(TOTAL_BILL)?;
            let y = table.values_f64(TIP)?;
            Plot::Scatter {
                points: x.into_iter().zip(y).collect(),
            }
        }
        Chart::TipPercentageDistribution => Plot::Histogram {
            bins: histogram(&table.values_f64(TIP_PERCENTAGE)?, histogram_bins),
        },
        Chart::AvgTipPercentageByDay => bars(chart, table, 7, 0)?,
        Chart::CustomerCountPerDay => bars(chart, table, 9, 1)?,
        Chart::AvgTipByGroupSize => bars(chart, table, 10, 2)?,
        Chart::TotalRevenuePerDay => bars(chart, table, 13, 0)?,
        Chart::GenderCountByTime => clustered(chart, table, 1)?,
        Chart::GenderCountByDay => clustered(chart, table, 2)?,
        Chart::TipPercentageBySmoker => bars(chart, table, 11, 1)?,
        Chart::CorrelationHeatmap => heatmap(chart, table)?,
    };
    Ok(ChartSpec { chart, plot })
}
