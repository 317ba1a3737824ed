//! Generic step executor.
//!
//! Every step reads only the base [`Table`]; no step sees another step's
//! output.

use crate::analysis::catalog::{AggOp, StepKind, StepSpec};
use crate::analysis::correlation::correlation_matrix;
use crate::analysis::AggregationResult;
use crate::dataset::Table;
use crate::error::{Result, ResultExt};
use crate::utils::{column_labels, descending_nan_last};
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const COUNT: &str = "__count";

/// Header of the label column in the correlation matrix.
pub const CORRELATION_INDEX: &str = "index";

/// Execute one step against the base table.
pub fn execute(spec: &StepSpec, table: &Table) -> Result<AggregationResult> {
    let frame = match &spec.kind {
        StepKind::PivotCount { row_key, col_key } => pivot_count(table, row_key, col_key),
        StepKind::Grouped {
            key,
            value,
            op,
            key_header,
            value_header,
        } => grouped(table, key, value, *op, key_header, value_header),
        StepKind::ValueCounts {
            key,
            key_header,
            count_header,
        } => value_counts(table, key, key_header, count_header),
        StepKind::Correlation { columns } => correlation(table, columns),
        StepKind::TopN {
            sort_by,
            n,
            columns,
        } => top_n(table, sort_by, *n, columns),
    }
    .context(format!("Step {} failed", spec.number))?;

    debug!("{} -> {:?}", spec.title, frame.shape());
    Ok(AggregationResult::new(spec, frame))
}

fn pivot_count(table: &Table, row_key: &str, col_key: &str) -> Result<DataFrame> {
    let counts = table
        .frame()
        .clone()
        .lazy()
        .group_by([col(row_key), col(col_key)])
        .agg([len().alias(COUNT)])
        .collect()?;

    let rows = column_labels(&counts, row_key)?;
    let cols = column_labels(&counts, col_key)?;
    let n = counts
        .column(COUNT)?
        .as_materialized_series()
        .cast(&DataType::UInt64)?;

    let mut cells: BTreeMap<(String, String), u64> = BTreeMap::new();
    for ((r, c), count) in rows.iter().zip(&cols).zip(n.u64()?.into_iter()) {
        cells.insert((r.clone(), c.clone()), count.unwrap_or(0));
    }

    let row_labels: BTreeSet<String> = rows.into_iter().collect();
    let col_labels: BTreeSet<String> = cols.into_iter().collect();

    let mut columns = Vec::with_capacity(col_labels.len() + 1);
    columns.push(Column::new(
        row_key.into(),
        row_labels.iter().cloned().collect::<Vec<String>>(),
    ));
    for c in &col_labels {
        let filled: Vec<u64> = row_labels
            .iter()
            .map(|r| cells.get(&(r.clone(), c.clone())).copied().unwrap_or(0))
            .collect();
        columns.push(Column::new(c.as_str().into(), filled));
    }

    Ok(DataFrame::new(columns)?)
}

fn grouped(
    table: &Table,
    key: &str,
    value: &str,
    op: AggOp,
    key_header: &str,
    value_header: &str,
) -> Result<DataFrame> {
    let values = col(value).cast(DataType::Float64);
    let defined = values.clone().filter(values.is_not_nan());
    let reduced = match op {
        AggOp::Sum => defined.sum(),
        AggOp::Mean => defined.mean(),
    };

    Ok(table
        .frame()
        .clone()
        .lazy()
        .group_by([col(key)])
        .agg([reduced.alias(value_header)])
        .sort([key], SortMultipleOptions::default())
        .select([col(key).alias(key_header), col(value_header)])
        .collect()?)
}

fn value_counts(table: &Table, key: &str, key_header: &str, count_header: &str) -> Result<DataFrame> {
    Ok(table
        .frame()
        .clone()
        .lazy()
        .group_by([col(key)])
        .agg([len().alias(count_header)])
        .sort([key], SortMultipleOptions::default())
        .select([col(key).alias(key_header), col(count_header)])
        .collect()?)
}

fn correlation(table: &Table, columns: &[&str]) -> Result<DataFrame> {
    let data = columns
        .iter()
        .map(|name| table.values_f64(name))
        .collect::<Result<Vec<_>>>()?;
    let matrix = correlation_matrix(&data);

    let mut out = Vec::with_capacity(columns.len() + 1);
    out.push(Column::new(
        CORRELATION_INDEX.into(),
        columns.iter().map(|c| c.to_string()).collect::<Vec<String>>(),
    ));
    for (j, name) in columns.iter().enumerate() {
        let values: Vec<f64> = matrix.iter().map(|row| row[j]).collect();
        out.push(Column::new((*name).into(), values));
    }

    Ok(DataFrame::new(out)?)
}

fn top_n(table: &Table, sort_by: &str, n: usize, columns: &[&str]) -> Result<DataFrame> {
    let values = table.values_f64(sort_by)?;

    // slice::sort_by is stable, so ties keep their row order
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| descending_nan_last(values[a], values[b]));
    order.truncate(n);

    let idx = IdxCa::from_vec(
        "idx".into(),
        order.into_iter().map(|i| i as IdxSize).collect(),
    );
    let projected = table.frame().select(columns.iter().copied())?;
    Ok(projected.take(&idx)?)
}
