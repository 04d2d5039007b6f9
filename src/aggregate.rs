//! Aggregations that turn a record table into the small tables charts draw.
//!
//! Columns are picked with accessor closures over the typed rows, so every
//! function here is total: a column cannot be missing at this point. All of
//! them are pure and deterministic; ordering ties are broken by key.

use crate::table::RecordTable;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Category counts in a fixed order.
///
/// Only categories that occur in the input are present; there are no zero
/// entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Counts<K> {
    entries: Vec<(K, usize)>,
}

impl<K> Counts<K> {
    pub fn entries(&self) -> &[(K, usize)] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (K, usize)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn get(&self, key: &K) -> Option<usize>
    where
        K: PartialEq,
    {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, count)| *count)
    }

    /// Keep the first `n` entries.
    pub fn top(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }

    /// Reorder by category instead of by count.
    pub fn sorted_by_key(mut self) -> Self
    where
        K: Ord,
    {
        self.entries.sort_by(|a, b| a.0.cmp(&b.0));
        self
    }

    pub fn map_keys<T>(self, f: impl Fn(K) -> T) -> Counts<T> {
        Counts {
            entries: self.entries.into_iter().map(|(k, c)| (f(k), c)).collect(),
        }
    }
}

fn tally<K: Ord>(values: impl IntoIterator<Item = K>) -> Counts<K> {
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }

    let mut entries: Vec<(K, usize)> = counts.into_iter().collect();
    // Stable sort keeps ascending key order among equal counts
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    Counts { entries }
}

/// Number of rows per distinct value of one column, most frequent first.
///
/// The counts always add up to the number of rows in the table.
pub fn frequency_count<'a, R, K: Ord>(
    table: &'a RecordTable<R>,
    column: impl Fn(&'a R) -> K,
) -> Counts<K> {
    tally(table.iter().map(column))
}

/// For each category of `group`, how many distinct values of `value` occur
/// in it. Categories come back in ascending order.
pub fn grouped_unique_count<'a, R, G: Ord, V: Ord>(
    table: &'a RecordTable<R>,
    group: impl Fn(&'a R) -> G,
    value: impl Fn(&'a R) -> V,
) -> Counts<G> {
    let mut groups: BTreeMap<G, BTreeSet<V>> = BTreeMap::new();
    for row in table {
        groups.entry(group(row)).or_default().insert(value(row));
    }

    Counts {
        entries: groups
            .into_iter()
            .map(|(key, values)| (key, values.len()))
            .collect(),
    }
}

/// Row counts for every combination of two dimensions.
///
/// Rows and columns list the categories seen in the data in ascending order.
/// The matrix is dense over those categories, so a combination that never
/// occurs is present with a count of zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab<A, B> {
    pub rows: Vec<A>,
    pub columns: Vec<B>,
    /// `cells[row][column]`
    pub cells: Vec<Vec<usize>>,
}

impl<A: PartialEq, B: PartialEq> CrossTab<A, B> {
    pub fn get(&self, row: &A, column: &B) -> Option<usize> {
        let r = self.rows.iter().position(|a| a == row)?;
        let c = self.columns.iter().position(|b| b == column)?;
        Some(self.cells[r][c])
    }

    pub fn total(&self) -> usize {
        self.cells.iter().flatten().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cross tabulation of two columns. Rows where either value is `None` are
/// left out.
pub fn cross_tab<'a, R, A: Ord + Clone, B: Ord + Clone>(
    table: &'a RecordTable<R>,
    dimension_a: impl Fn(&'a R) -> Option<A>,
    dimension_b: impl Fn(&'a R) -> Option<B>,
) -> CrossTab<A, B> {
    let mut pairs: BTreeMap<(A, B), usize> = BTreeMap::new();
    let mut rows = BTreeSet::new();
    let mut columns = BTreeSet::new();

    for row in table {
        if let (Some(a), Some(b)) = (dimension_a(row), dimension_b(row)) {
            rows.insert(a.clone());
            columns.insert(b.clone());
            *pairs.entry((a, b)).or_default() += 1;
        }
    }

    let rows: Vec<A> = rows.into_iter().collect();
    let columns: Vec<B> = columns.into_iter().collect();
    let cells = rows
        .iter()
        .map(|a| {
            columns
                .iter()
                .map(|b| pairs.get(&(a.clone(), b.clone())).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    CrossTab {
        rows,
        columns,
        cells,
    }
}

/// Sum of a numeric column per category, in ascending category order.
pub fn grouped_sum<'a, R, K: Ord>(
    table: &'a RecordTable<R>,
    group: impl Fn(&'a R) -> K,
    value: impl Fn(&'a R) -> f64,
) -> Vec<(K, f64)> {
    let mut sums: BTreeMap<K, f64> = BTreeMap::new();
    for row in table {
        *sums.entry(group(row)).or_default() += value(row);
    }
    sums.into_iter().collect()
}

/// Count, mean, spread and quartiles of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` for fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// `None` when there are no values.
pub fn describe_numeric(values: impl IntoIterator<Item = f64>) -> Option<NumericSummary> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let std = (count > 1).then(|| {
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    });

    Some(NumericSummary {
        count,
        mean,
        std,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

// Linear interpolation between the closest ranks
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

/// Count, distinct values and most frequent value of a text column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    pub top: String,
    pub freq: usize,
}

pub fn describe_categorical<'a>(
    values: impl IntoIterator<Item = &'a str>,
) -> Option<CategoricalSummary> {
    let counts = tally(values);
    let (top, freq) = counts.entries().first()?;
    Some(CategoricalSummary {
        count: counts.total(),
        unique: counts.len(),
        top: top.to_string(),
        freq: *freq,
    })
}
