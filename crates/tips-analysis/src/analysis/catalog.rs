//! The fixed catalog of analysis steps.
//!
//! Each step is a plain descriptor; [`super::execute`] interprets it. Titles
//! come in two flavours because the text report and the PDF report label a
//! few steps differently.

use crate::dataset::{DAY, SEX, SIZE, SMOKER, TIME, TIP, TIP_PERCENTAGE, TOTAL_BILL};
use serde::Serialize;

/// Reduction applied to a grouped value column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AggOp {
    /// Sum of the non-NaN values.
    Sum,
    /// Mean of the non-NaN values.
    Mean,
}

/// What a step computes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StepKind {
    /// Count per (row_key, col_key) with `col_key` labels as columns; missing
    /// combinations are filled with zero.
    PivotCount {
        row_key: &'static str,
        col_key: &'static str,
    },
    /// One reduction of `value` per `key` group.
    Grouped {
        key: &'static str,
        value: &'static str,
        op: AggOp,
        key_header: &'static str,
        value_header: &'static str,
    },
    /// Records per observed `key` label, sorted by label. Labels with no
    /// records are absent.
    ValueCounts {
        key: &'static str,
        key_header: &'static str,
        count_header: &'static str,
    },
    /// Pairwise Pearson correlation between `columns`.
    Correlation { columns: Vec<&'static str> },
    /// The `n` records with the largest `sort_by` value, NaN last, ties in
    /// original row order, projected onto `columns`.
    TopN {
        sort_by: &'static str,
        n: usize,
        columns: Vec<&'static str>,
    },
}

/// Descriptor of one analysis step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSpec {
    /// 1-based position in the pipeline.
    pub number: usize,
    /// Title used by the text report.
    pub title: String,
    /// Title used by the PDF report.
    pub pdf_title: String,
    pub kind: StepKind,
}

impl StepSpec {
    fn new(number: usize, label: &str, kind: StepKind) -> Self {
        Self::with_pdf_label(number, label, label, kind)
    }

    fn with_pdf_label(number: usize, label: &str, pdf_label: &str, kind: StepKind) -> Self {
        Self {
            number,
            title: format!("ANALYSIS {}: {}", number, label),
            pdf_title: format!("Analysis {}: {}", number, pdf_label),
            kind,
        }
    }
}

fn grouped(
    key: &'static str,
    value: &'static str,
    op: AggOp,
    key_header: &'static str,
    value_header: &'static str,
) -> StepKind {
    StepKind::Grouped {
        key,
        value,
        op,
        key_header,
        value_header,
    }
}

/// Number of steps in the catalog.
pub const STEP_COUNT: usize = 14;

/// Columns correlated by the correlation step, in matrix order.
pub const CORRELATION_COLUMNS: [&str; 4] = [TOTAL_BILL, TIP, TIP_PERCENTAGE, SIZE];

/// Columns shown by the top tip percentage step.
pub const TOP_N_COLUMNS: [&str; 8] = [TOTAL_BILL, TIP, TIP_PERCENTAGE, SEX, SMOKER, DAY, TIME, SIZE];

/// The ordered list of steps. `top_n` sets the row limit of the last step.
pub fn catalog(top_n: usize) -> Vec<StepSpec> {
    vec![
        StepSpec::new(
            1,
            "Gender Count by Time (Dinner vs Lunch)",
            StepKind::PivotCount {
                row_key: TIME,
                col_key: SEX,
            },
        ),
        StepSpec::new(
            2,
            "Gender Count by Day of Week",
            StepKind::PivotCount {
                row_key: DAY,
                col_key: SEX,
            },
        ),
        StepSpec::new(
            3,
            "Smoker Count by Gender",
            StepKind::PivotCount {
                row_key: SEX,
                col_key: SMOKER,
            },
        ),
        StepSpec::new(
            4,
            "Total Tip Amount by Gender",
            grouped(SEX, TIP, AggOp::Sum, "Sex", "Total_Tip_Amount"),
        ),
        StepSpec::new(
            5,
            "Average Tip by Gender",
            grouped(SEX, TIP, AggOp::Mean, "Sex", "Average_Tip"),
        ),
        StepSpec::new(
            6,
            "Average Tip Percentage by Gender",
            grouped(SEX, TIP_PERCENTAGE, AggOp::Mean, "Sex", "Average_Tip_Percentage"),
        ),
        StepSpec::new(
            7,
            "Average Tip Percentage by Day",
            grouped(DAY, TIP_PERCENTAGE, AggOp::Mean, "Day", "Average_Tip_Percentage"),
        ),
        StepSpec::with_pdf_label(
            8,
            "Average Tip Percentage by Time (Lunch vs Dinner)",
            "Average Tip Percentage by Time",
            grouped(TIME, TIP_PERCENTAGE, AggOp::Mean, "Time", "Average_Tip_Percentage"),
        ),
        StepSpec::new(
            9,
            "Total Customers per Day",
            StepKind::ValueCounts {
                key: DAY,
                key_header: "Day",
                count_header: "Total_Customers",
            },
        ),
        StepSpec::new(
            10,
            "Average Tip by Group Size",
            grouped(SIZE, TIP, AggOp::Mean, "Group_Size", "Average_Tip"),
        ),
        StepSpec::new(
            11,
            "Average Tip Percentage by Smoker Status",
            grouped(SMOKER, TIP_PERCENTAGE, AggOp::Mean, "Smoker", "Average_Tip_Percentage"),
        ),
        StepSpec::new(
            12,
            "Correlation Matrix",
            StepKind::Correlation {
                columns: CORRELATION_COLUMNS.to_vec(),
            },
        ),
        StepSpec::with_pdf_label(
            13,
            "Total Revenue (Total Bill) per Day",
            "Total Revenue by Day",
            grouped(DAY, TOTAL_BILL, AggOp::Sum, "Day", "Total_Revenue"),
        ),
        StepSpec::new(
            14,
            &format!("Top {} Highest Tip Percentage Bills", top_n),
            StepKind::TopN {
                sort_by: TIP_PERCENTAGE,
                n: top_n,
                columns: TOP_N_COLUMNS.to_vec(),
            },
        ),
    ]
}

/// Look up a single step by its 1-based number.
pub fn find_step(number: usize, top_n: usize) -> Option<StepSpec> {
    catalog(top_n).into_iter().find(|step| step.number == number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_catalog_is_numbered_in_order() {
        let steps = catalog(10);
        assert_eq!(steps.len(), STEP_COUNT);
        for (idx, step) in steps.iter().enumerate() {
            assert_eq!(step.number, idx + 1);
        }
    }

    #[test]
    fn test_titles() {
        let steps = catalog(10);
        assert_eq!(
            steps[0].title,
            "ANALYSIS 1: Gender Count by Time (Dinner vs Lunch)"
        );
        assert_eq!(steps[7].pdf_title, "Analysis 8: Average Tip Percentage by Time");
        assert_eq!(steps[12].pdf_title, "Analysis 13: Total Revenue by Day");
        assert_eq!(
            steps[13].title,
            "ANALYSIS 14: Top 10 Highest Tip Percentage Bills"
        );
    }

    #[test]
    fn test_top_n_parameter() {
        let step = find_step(14, 3).unwrap();
        assert!(matches!(step.kind, StepKind::TopN { n: 3, .. }));
        assert!(step.title.contains("Top 3"));
    }

    #[test]
    fn test_find_step_out_of_range() {
        assert!(find_step(0, 10).is_none());
        assert!(find_step(15, 10).is_none());
    }
}
