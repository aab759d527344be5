use crate::data::Dataset;
use crate::error::DashResult;
use std::collections::HashMap;
use tracing::debug;

/// Columns the records are partitioned by.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    Single(String),
    Pair(String, String),
}

impl GroupKey {
    pub fn single(col: &str) -> Self {
        GroupKey::Single(col.to_string())
    }

    pub fn pair(outer: &str, inner: &str) -> Self {
        GroupKey::Pair(outer.to_string(), inner.to_string())
    }
}

/// Reduction applied to each group.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// Arithmetic mean of a numeric column, skipping empty cells
    Mean(String),
    /// Number of rows, or of non-empty cells when a column is given
    Count(Option<String>),
}

impl Aggregation {
    pub fn mean(col: &str) -> Self {
        Aggregation::Mean(col.to_string())
    }

    pub fn count() -> Self {
        Aggregation::Count(None)
    }

    pub fn count_of(col: &str) -> Self {
        Aggregation::Count(Some(col.to_string()))
    }
}

/// One aggregated group. `sub` is set for two-column keys.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupValue {
    pub key: String,
    pub sub: Option<String>,
    pub value: f64,
}

/// Per-key means of several metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub key: String,
    pub values: Vec<f64>,
}

/// How groups are ordered before rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    FirstSeen,
    ByKey,
    /// Descending frequency of the given column's values
    ByCount(String),
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    n: usize,
}

/// Group the dataset by `key` and reduce each group with `agg`.
///
/// Returns one entry per distinct key (or key pair) in first-encounter order.
/// Rows with an empty key cell are dropped.
pub fn aggregate(data: &Dataset, key: &GroupKey, agg: &Aggregation) -> DashResult<Vec<GroupValue>> {
    let (outer_idx, inner_idx) = match key {
        GroupKey::Single(col) => (data.column_index(col)?, None),
        GroupKey::Pair(outer, inner) => {
            (data.column_index(outer)?, Some(data.column_index(inner)?))
        }
    };

    let target_idx = match agg {
        Aggregation::Mean(col) => Some(data.column_index(col)?),
        Aggregation::Count(Some(col)) => Some(data.column_index(col)?),
        Aggregation::Count(None) => None,
    };

    let mut order: Vec<(String, Option<String>)> = Vec::new();
    let mut groups: HashMap<(String, Option<String>), Accumulator> = HashMap::new();

    for row in 0..data.len() {
        let outer = data.cell(row, outer_idx).trim();
        if outer.is_empty() {
            continue;
        }
        let inner = match inner_idx {
            Some(idx) => {
                let v = data.cell(row, idx).trim();
                if v.is_empty() {
                    continue;
                }
                Some(v.to_string())
            }
            None => None,
        };

        let group_key = (outer.to_string(), inner);
        if !groups.contains_key(&group_key) {
            order.push(group_key.clone());
        }
        let acc = groups.entry(group_key).or_default();

        match (agg, target_idx) {
            (Aggregation::Mean(_), Some(idx)) => {
                if let Some(v) = data.numeric_cell(row, idx)? {
                    acc.sum += v;
                    acc.n += 1;
                }
            }
            (Aggregation::Count(_), Some(idx)) => {
                if !data.cell(row, idx).trim().is_empty() {
                    acc.n += 1;
                }
            }
            _ => acc.n += 1,
        }
    }

    debug!("Aggregated {} rows into {} groups", data.len(), order.len());

    Ok(order
        .into_iter()
        .map(|group_key| {
            let acc = &groups[&group_key];
            let value = match agg {
                Aggregation::Mean(_) if acc.n == 0 => f64::NAN,
                Aggregation::Mean(_) => acc.sum / acc.n as f64,
                Aggregation::Count(_) => acc.n as f64,
            };
            GroupValue {
                key: group_key.0,
                sub: group_key.1,
                value,
            }
        })
        .collect())
}

/// Mean of each of `metrics` per distinct value of `key`.
pub fn multi_mean(data: &Dataset, key: &str, metrics: &[&str]) -> DashResult<Vec<MetricRow>> {
    let group_key = GroupKey::single(key);
    let mut rows: Vec<MetricRow> = Vec::new();

    for (m, metric) in metrics.iter().enumerate() {
        let values = aggregate(data, &group_key, &Aggregation::mean(metric))?;
        if m == 0 {
            rows = values
                .into_iter()
                .map(|g| MetricRow {
                    key: g.key,
                    values: vec![g.value],
                })
                .collect();
        } else {
            // Every metric is grouped by the same key, so keys line up
            for (row, g) in rows.iter_mut().zip(values) {
                row.values.push(g.value);
            }
        }
    }

    Ok(rows)
}

/// Frequency of each distinct non-empty value, most frequent first.
/// Ties keep first-encounter order.
pub fn value_counts(data: &Dataset, col: &str) -> DashResult<Vec<(String, usize)>> {
    let counts = aggregate(data, &GroupKey::single(col), &Aggregation::count())?;
    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|g| (g.key, g.value as usize))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(counts)
}

/// Order category labels.
pub fn order_keys(data: &Dataset, keys: Vec<String>, order: &Order) -> DashResult<Vec<String>> {
    let mut keys = keys;
    match order {
        Order::FirstSeen => {}
        Order::ByKey => sort_keys(&mut keys),
        Order::ByCount(col) => {
            let rank: HashMap<String, usize> = value_counts(data, col)?
                .into_iter()
                .enumerate()
                .map(|(i, (k, _))| (k, i))
                .collect();
            keys.sort_by_key(|k| rank.get(k).copied().unwrap_or(usize::MAX));
        }
    }
    Ok(keys)
}

/// Numeric ascending when every key is a number, otherwise lexical.
pub fn sort_keys(keys: &mut [String]) {
    let all_numeric = keys.iter().all(|s| s.parse::<f64>().is_ok());
    if all_numeric {
        keys.sort_by(|a, b| {
            let fa = a.parse::<f64>().unwrap_or(0.0);
            let fb = b.parse::<f64>().unwrap_or(0.0);
            fa.partial_cmp(&fb).unwrap_or(std::cmp::Ordering::Equal)
        });
    } else {
        keys.sort();
    }
}

/// Distinct keys of the groups in first-encounter order
pub fn distinct_keys(values: &[GroupValue]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for v in values {
        if !keys.contains(&v.key) {
            keys.push(v.key.clone());
        }
    }
    keys
}

/// Distinct sub-keys of two-column groups in first-encounter order
pub fn distinct_subs(values: &[GroupValue]) -> Vec<String> {
    let mut subs: Vec<String> = Vec::new();
    for v in values {
        if let Some(s) = &v.sub {
            if !subs.contains(s) {
                subs.push(s.clone());
            }
        }
    }
    subs
}

/// The `n` groups with the largest values, largest first.
pub fn top_n(values: Vec<GroupValue>, n: usize) -> Vec<GroupValue> {
    let mut values: Vec<GroupValue> = values.into_iter().filter(|v| !v.value.is_nan()).collect();
    values.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    values.truncate(n);
    values
}

/// The `n` groups with the smallest values, smallest first.
pub fn bottom_n(values: Vec<GroupValue>, n: usize) -> Vec<GroupValue> {
    let mut values: Vec<GroupValue> = values.into_iter().filter(|v| !v.value.is_nan()).collect();
    values.sort_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal));
    values.truncate(n);
    values
}

/// Round to `decimals` places, ties to even.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}
