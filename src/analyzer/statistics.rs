//! Numeric kernels over plain slices. No NaN handling beyond what each function documents.

/// Mean of every trailing window of `window_size` consecutive points.
/// Returns `data.len() - window_size + 1` values, or nothing when the window does not fit.
pub fn rolling_mean(data: &[f64], window_size: usize) -> Vec<f64> {
    if window_size == 0 || data.len() < window_size {
        return Vec::new();
    }
    data.windows(window_size)
        .map(|window| window.iter().sum::<f64>() / window_size as f64)
        .collect()
}

/// `data[i] - data[i - 1]` for every adjacent pair.
pub fn first_difference(data: &[f64]) -> Vec<f64> {
    data.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Pearson correlation coefficient between two slices.
/// Returns None if slices have different lengths, fewer than two points, or either one is constant.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 || is_constant(x) || is_constant(y) {
        return None;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let numerator: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    let denominator_x: f64 = x.iter().map(|xi| (xi - mean_x).powi(2)).sum();
    let denominator_y: f64 = y.iter().map(|yi| (yi - mean_y).powi(2)).sum();
    let denominator = (denominator_x * denominator_y).sqrt();
    if denominator == 0.0 {
        None
    } else {
        // rounding can push |r| a hair past 1
        Some((numerator / denominator).clamp(-1.0, 1.0))
    }
}

fn is_constant(data: &[f64]) -> bool {
    data.iter().all(|v| *v == data[0])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Maximum,
    Minimum,
}

/// Classifies every interior point that is strictly above or below both neighbours.
/// Endpoints and plateaus are never reported.
pub fn local_extrema(data: &[f64]) -> Vec<(usize, Extremum)> {
    data.windows(3)
        .enumerate()
        .filter_map(|(i, w)| {
            let (prev, cur, next) = (w[0], w[1], w[2]);
            if cur > prev && cur > next {
                Some((i + 1, Extremum::Maximum))
            } else if cur < prev && cur < next {
                Some((i + 1, Extremum::Minimum))
            } else {
                None
            }
        })
        .collect()
}
