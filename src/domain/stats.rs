//! Mean and covariance estimates over aligned return series.

pub type Matrix = Vec<Vec<f64>>;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample covariance matrix (denominator n - 1) of equal-length columns.
/// Fewer than two observations yield a zero matrix.
pub fn covariance_matrix(columns: &[&[f64]]) -> Matrix {
    let k = columns.len();
    let mut cov = vec![vec![0.0; k]; k];
    let n = columns.first().map(|c| c.len()).unwrap_or(0);
    if n < 2 {
        return cov;
    }

    let means: Vec<f64> = columns.iter().map(|c| mean(c)).collect();
    for i in 0..k {
        for j in i..k {
            let s: f64 = columns[i]
                .iter()
                .zip(columns[j].iter())
                .map(|(a, b)| (a - means[i]) * (b - means[j]))
                .sum();
            let c = s / (n - 1) as f64;
            cov[i][j] = c;
            cov[j][i] = c;
        }
    }
    cov
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn mat_vec(m: &Matrix, v: &[f64]) -> Vec<f64> {
    m.iter().map(|row| dot(row, v)).collect()
}

/// wᵀ Σ w
pub fn portfolio_variance(weights: &[f64], cov: &Matrix) -> f64 {
    dot(weights, &mat_vec(cov, weights))
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}
