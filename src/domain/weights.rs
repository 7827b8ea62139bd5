//! Portfolio weight vector.

/// One weight per asset, in asset order.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightVector {
    pub asset_ids: Vec<String>,
    pub weights: Vec<f64>,
}

impl WeightVector {
    pub fn equal(asset_ids: Vec<String>) -> Self {
        let n = asset_ids.len();
        let w = if n > 0 { 1.0 / n as f64 } else { 0.0 };
        Self {
            asset_ids,
            weights: vec![w; n],
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn get(&self, asset_id: &str) -> Option<f64> {
        self.asset_ids
            .iter()
            .position(|id| id == asset_id)
            .map(|i| self.weights[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.asset_ids
            .iter()
            .map(String::as_str)
            .zip(self.weights.iter().copied())
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Long-only and fully invested within `tolerance`.
    pub fn is_long_only_fully_invested(&self, tolerance: f64) -> bool {
        self.weights.iter().all(|&w| (-tolerance..=1.0 + tolerance).contains(&w))
            && (self.sum() - 1.0).abs() <= tolerance
    }
}

/// Euclidean projection onto the probability simplex
/// `{ w : w_i >= 0, sum(w) = 1 }`.
pub fn project_onto_simplex(v: &[f64]) -> Vec<f64> {
    if v.is_empty() {
        return Vec::new();
    }
    let mut sorted = v.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut cumsum = 0.0;
    let mut theta = 0.0;
    for (j, &u) in sorted.iter().enumerate() {
        cumsum += u;
        let t = (cumsum - 1.0) / (j + 1) as f64;
        if u - t > 0.0 {
            theta = t;
        }
    }

    let mut w: Vec<f64> = v.iter().map(|x| (x - theta).max(0.0)).collect();
    let total: f64 = w.iter().sum();
    if total > 0.0 {
        for wi in w.iter_mut() {
            *wi /= total;
        }
    }
    w
}
