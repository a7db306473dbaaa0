//! Numeric kernels behind the views.
//!
//! Every function takes measurement columns as `Option<f64>` and treats `None` and `NaN`
//! as missing. Missing values are skipped, never read as zero.

use ordered_float::OrderedFloat;
use serde::Serialize;

/// Keeps the present, non-NaN values.
pub fn present(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|value| value.filter(|v| !v.is_nan()))
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (ddof = 1).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((squares / (values.len() - 1) as f64).sqrt())
}

/// Rows where both `xs[i]` and `ys[i]` are present.
pub fn complete_pairs(xs: &[Option<f64>], ys: &[Option<f64>]) -> Vec<(f64, f64)> {
    xs.iter()
        .zip(ys)
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if !x.is_nan() && !y.is_nan() => Some((*x, *y)),
            _ => None,
        })
        .collect()
}

/// Pearson correlation over pairwise-complete observations.
///
/// Only rows where both values are present take part, so each pair of columns may be
/// computed over a different subset of rows. Returns `None` for fewer than two complete
/// pairs or when either side has zero variance.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs = complete_pairs(xs, ys);
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// An ordinary least squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub observations: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fits `ys` against `xs` over the rows where both are present.
/// Returns `None` if fewer than two pairs remain or `xs` is constant.
pub fn linear_fit(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<LinearFit> {
    let pairs = complete_pairs(xs, ys);
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        sxy += (x - mean_x) * (y - mean_y);
        sxx += (x - mean_x).powi(2);
        syy += (y - mean_y).powi(2);
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    let r_squared = if syy == 0.0 {
        1.0
    } else {
        (sxy * sxy) / (sxx * syy)
    };
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
        r_squared,
        observations: pairs.len(),
    })
}

pub fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by_key(|v| OrderedFloat(*v));
    values
}

/// Quantile of already sorted samples, linearly interpolated between order statistics.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

pub fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    let min = values.iter().copied().map(OrderedFloat).min()?;
    let max = values.iter().copied().map(OrderedFloat).max()?;
    Some((min.0, max.0))
}

/// `bins + 1` equal-width edges spanning `[min, max]`. A zero-width range is widened by 0.5
/// on each side so every sample still lands in a bin.
pub fn bin_edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let (low, high) = if max > min {
        (min, max)
    } else {
        (min - 0.5, max + 0.5)
    };
    let width = (high - low) / bins as f64;
    (0..=bins)
        .map(|i| if i == bins { high } else { low + width * i as f64 })
        .collect()
}

/// Counts samples per bin. Bins are half-open except the last, which also takes the upper
/// edge. Samples outside the edges are ignored.
pub fn bin_counts(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let bins = edges.len().saturating_sub(1);
    let mut counts = vec![0; bins];
    if bins == 0 {
        return counts;
    }
    let low = edges[0];
    let high = edges[bins];
    let width = (high - low) / bins as f64;
    for &value in values {
        if value < low || value > high {
            continue;
        }
        let index = (((value - low) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }
    counts
}

/// Box plot statistics of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    /// Most extreme samples still inside the fences.
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let sorted = sorted(values.to_vec());
    let q1 = quantile(&sorted, 0.25)?;
    let median = quantile(&sorted, 0.5)?;
    let q3 = quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    let inside: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|v| *v >= lower_fence && *v <= upper_fence)
        .collect();
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < lower_fence || *v > upper_fence)
        .collect();

    Some(BoxStats {
        count: sorted.len(),
        min: sorted[0],
        q1,
        median,
        q3,
        max: sorted[sorted.len() - 1],
        lower_fence,
        upper_fence,
        // q1 and q3 always lie inside the fences, so `inside` is never empty
        lower_whisker: inside.first().copied().unwrap_or(q1),
        upper_whisker: inside.last().copied().unwrap_or(q3),
        outliers,
    })
}

/// Rounds to two decimals for display tables.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
