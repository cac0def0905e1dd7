//! Descriptive statistics behind the box, histogram and heatmap renderers.

use serde::{Deserialize, Serialize};

use crate::error::{PlotError, Result};

/// Summary statistics for one sample. Non-finite values count as missing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Finite values in ascending order.
pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut vals: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    vals.sort_by(f64::total_cmp);
    vals
}

pub fn summarize(values: &[f64]) -> Summary {
    let vals = sorted_finite(values);
    let count = vals.len();
    let missing = values.len() - count;
    let min = vals.first().cloned();
    let max = vals.last().cloned();
    let mean = if count > 0 {
        Some(vals.iter().copied().sum::<f64>() / count as f64)
    } else {
        None
    };
    let median = if count == 0 {
        None
    } else if count % 2 == 1 {
        Some(vals[count / 2])
    } else {
        Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
    };
    Summary {
        count,
        missing,
        min,
        max,
        mean,
        median,
    }
}

/// Quantile of an ascending slice with linear interpolation between closest ranks.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Everything needed to draw one box of a box plot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub mean: f64,
    /// Furthest data points still within `whis × IQR` of the box.
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub fliers: Vec<f64>,
    /// Median ± 1.57 × IQR / √n.
    pub notch_low: f64,
    pub notch_high: f64,
}

pub fn box_stats(values: &[f64], whis: f64) -> Result<BoxStats> {
    let sorted = sorted_finite(values);
    if values.len() > sorted.len() {
        log::warn!(
            "box statistics: dropped {} non-finite value(s)",
            values.len() - sorted.len()
        );
    }
    let (Some(q1), Some(median), Some(q3)) = (
        quantile_sorted(&sorted, 0.25),
        quantile_sorted(&sorted, 0.5),
        quantile_sorted(&sorted, 0.75),
    ) else {
        return Err(PlotError::Empty("box plot data set is empty".into()));
    };
    let iqr = q3 - q1;
    let lo_fence = q1 - whis * iqr;
    let hi_fence = q3 + whis * iqr;
    let whisker_low = sorted
        .iter()
        .copied()
        .find(|v| *v >= lo_fence)
        .unwrap_or(q1)
        .min(q1);
    let whisker_high = sorted
        .iter()
        .rev()
        .copied()
        .find(|v| *v <= hi_fence)
        .unwrap_or(q3)
        .max(q3);
    let fliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < whisker_low || *v > whisker_high)
        .collect();
    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let half_notch = 1.57 * iqr / n.sqrt();
    Ok(BoxStats {
        q1,
        median,
        q3,
        mean,
        whisker_low,
        whisker_high,
        fliers,
        notch_low: median - half_notch,
        notch_high: median + half_notch,
    })
}

/// How histogram bins are chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum Bins {
    /// Equal-width bins spanning the range.
    Count(usize),
    /// Explicit monotonically increasing edges.
    Edges(Vec<f64>),
}

impl Default for Bins {
    fn default() -> Self {
        Bins::Count(10)
    }
}

impl From<usize> for Bins {
    fn from(n: usize) -> Self {
        Bins::Count(n)
    }
}

impl From<Vec<f64>> for Bins {
    fn from(edges: Vec<f64>) -> Self {
        Bins::Edges(edges)
    }
}

impl Bins {
    /// Resolve to concrete edges for data spanning `lo..=hi`.
    pub fn edges(&self, lo: f64, hi: f64) -> Result<Vec<f64>> {
        match self {
            Bins::Count(0) => Err(PlotError::setting("bins", "need at least one bin")),
            Bins::Count(n) => {
                let (lo, hi) = if (hi - lo).abs() < f64::EPSILON {
                    (lo - 0.5, hi + 0.5)
                } else {
                    (lo, hi)
                };
                let w = (hi - lo) / *n as f64;
                Ok((0..=*n).map(|i| if i == *n { hi } else { lo + w * i as f64 }).collect())
            }
            Bins::Edges(e) => {
                if e.len() < 2 {
                    return Err(PlotError::setting("bins", "need at least two edges"));
                }
                if e.windows(2).any(|w| w[1] <= w[0]) {
                    return Err(PlotError::setting("bins", "edges must increase monotonically"));
                }
                Ok(e.clone())
            }
        }
    }
}

/// Bin counts plus their edges (`edges.len() == counts.len() + 1`).
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<f64>,
}

impl Histogram {
    /// Count finite values into `edges`; the last bin is closed on the right,
    /// values outside the edges are ignored.
    pub fn compute(values: &[f64], edges: &[f64]) -> Histogram {
        let n = edges.len().saturating_sub(1);
        let mut counts = vec![0.0; n];
        if n == 0 {
            return Histogram {
                edges: edges.to_vec(),
                counts,
            };
        }
        let (first, last) = (edges[0], edges[n]);
        for v in values.iter().copied().filter(|v| v.is_finite()) {
            if v < first || v > last {
                continue;
            }
            let idx = if v == last {
                n - 1
            } else {
                // partition_point gives the first edge > v
                edges.partition_point(|e| *e <= v).saturating_sub(1).min(n - 1)
            };
            counts[idx] += 1.0;
        }
        Histogram {
            edges: edges.to_vec(),
            counts,
        }
    }

    pub fn widths(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| w[1] - w[0]).collect()
    }

    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Scale so that the histogram integrates to one.
    pub fn into_density(mut self) -> Self {
        let total = self.total();
        if total > 0.0 {
            let widths = self.widths();
            for (c, w) in self.counts.iter_mut().zip(widths) {
                *c /= total * w;
            }
        }
        self
    }

    /// Running sum; for densities this uses bin areas, so the last value is 1.
    pub fn into_cumulative(mut self, density: bool) -> Self {
        let widths = self.widths();
        let mut acc = 0.0;
        for (c, w) in self.counts.iter_mut().zip(widths) {
            acc += if density { *c * w } else { *c };
            *c = acc;
        }
        self
    }
}

/// Pearson correlation of two equally long samples; `NaN` when undefined.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return f64::NAN;
    }
    let ma = a[..n].iter().sum::<f64>() / n as f64;
    let mb = b[..n].iter().sum::<f64>() / n as f64;
    let (mut sab, mut saa, mut sbb) = (0.0, 0.0, 0.0);
    for i in 0..n {
        let (da, db) = (a[i] - ma, b[i] - mb);
        sab += da * db;
        saa += da * da;
        sbb += db * db;
    }
    sab / (saa.sqrt() * sbb.sqrt())
}

/// Pairwise correlation matrix of the given columns.
pub fn correlation_matrix(columns: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    if columns.is_empty() {
        return Err(PlotError::Empty("no columns to correlate".into()));
    }
    let n = columns[0].len();
    if let Some(bad) = columns.iter().find(|c| c.len() != n) {
        return Err(PlotError::count_mismatch("correlation column", n, bad.len()));
    }
    Ok(columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b)).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quartiles_of_one_to_nine() {
        let v: Vec<f64> = (1..=9).map(f64::from).collect();
        let b = box_stats(&v, 1.5).unwrap();
        assert_eq!((b.q1, b.median, b.q3), (3.0, 5.0, 7.0));
        assert_eq!((b.whisker_low, b.whisker_high), (1.0, 9.0));
        assert!(b.fliers.is_empty());
    }

    #[test]
    fn far_values_become_fliers() {
        let mut v: Vec<f64> = (1..=9).map(f64::from).collect();
        v.push(100.0);
        let b = box_stats(&v, 1.5).unwrap();
        assert_eq!(b.fliers, vec![100.0]);
        assert_eq!(b.whisker_high, 9.0);
    }

    #[test]
    fn summary_ignores_nan() {
        let s = summarize(&[3.0, f64::NAN, 1.0, 2.0]);
        assert_eq!(s.count, 3);
        assert_eq!(s.missing, 1);
        assert_eq!(s.median, Some(2.0));
    }

    #[test]
    fn histogram_counts_and_density() {
        let v = [0.0, 0.5, 1.0, 1.5, 2.0, 9.0];
        let edges = Bins::Count(2).edges(0.0, 2.0).unwrap();
        let h = Histogram::compute(&v, &edges);
        assert_eq!(h.counts, vec![2.0, 3.0]);
        let d = h.into_density();
        let area: f64 = d.counts.iter().zip(d.widths()).map(|(c, w)| c * w).sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-12);
        let c = d.into_cumulative(true);
        assert_relative_eq!(*c.counts.last().unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn correlation_diagonal_is_one() {
        let m = correlation_matrix(&[vec![1.0, 2.0, 3.0], vec![3.0, 1.0, 2.0]]).unwrap();
        assert_relative_eq!(m[0][0], 1.0);
        assert_relative_eq!(m[0][1], m[1][0]);
    }
}
