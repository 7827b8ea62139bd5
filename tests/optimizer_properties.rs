//! Property tests for the maximum-Sharpe optimizer.

mod common;

use common::dates;
use proptest::prelude::*;
use sharpefolio::domain::error::SharpefolioError;
use sharpefolio::domain::optimizer::{optimize, Optimization, Optimizer};
use sharpefolio::domain::returns::{ReturnSeries, ReturnSet};
use sharpefolio::domain::stats;

fn return_set(columns: &[Vec<f64>]) -> ReturnSet {
    let n = columns.first().map(|c| c.len()).unwrap_or(0);
    let days = dates(n);
    columns
        .iter()
        .enumerate()
        .map(|(i, values)| {
            let id = format!("A{i}");
            let series = ReturnSeries {
                asset_id: id.clone(),
                dates: days.clone(),
                values: values.clone(),
            };
            (id, series)
        })
        .collect()
}

fn returns_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (2usize..=5, 8usize..=40).prop_flat_map(|(assets, periods)| {
        prop::collection::vec(prop::collection::vec(-0.05f64..0.05, periods), assets)
    })
}

fn annual_sharpe(returns: &[Vec<f64>], weights: &[f64]) -> Option<f64> {
    let cols: Vec<&[f64]> = returns.iter().map(|c| c.as_slice()).collect();
    let mean: Vec<f64> = cols.iter().map(|c| stats::mean(c)).collect();
    let cov = stats::covariance_matrix(&cols);
    let var = stats::portfolio_variance(weights, &cov);
    (var > 1e-20).then(|| stats::dot(weights, &mean) / var.sqrt() * 252f64.sqrt())
}

fn solve(returns: &[Vec<f64>]) -> Option<Optimization> {
    match optimize(&return_set(returns)) {
        Ok(result) => Some(result),
        Err(SharpefolioError::DegenerateInput { .. }) => None,
        Err(other) => panic!("unexpected error: {other}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn weights_are_long_only_and_fully_invested(returns in returns_strategy()) {
        let Some(result) = solve(&returns) else { return Ok(()); };
        let w = &result.weights.weights;
        prop_assert_eq!(w.len(), returns.len());
        for &wi in w {
            prop_assert!((-1e-12..=1.0 + 1e-12).contains(&wi), "weight {} out of range", wi);
        }
        prop_assert!((w.iter().sum::<f64>() - 1.0).abs() <= 1e-6);
    }

    #[test]
    fn never_worse_than_equal_weight(returns in returns_strategy()) {
        let Some(result) = solve(&returns) else { return Ok(()); };
        let n = returns.len();
        let equal = annual_sharpe(&returns, &vec![1.0 / n as f64; n]);
        if let (Some(equal), Some(optimal)) = (equal, result.sharpe_ratio) {
            prop_assert!(optimal >= equal - 1e-6, "optimal {} < equal {}", optimal, equal);
        }
    }

    #[test]
    fn restarting_from_the_optimum_does_not_regress(returns in returns_strategy()) {
        let Some(first) = solve(&returns) else { return Ok(()); };
        let Some(first_sharpe) = first.sharpe_ratio else { return Ok(()); };

        let second = Optimizer::default()
            .optimize_from(&return_set(&returns), &first.weights.weights)
            .unwrap();
        let second_sharpe = second.sharpe_ratio.unwrap_or(f64::INFINITY);
        prop_assert!(second_sharpe >= first_sharpe - 1e-9);
    }

    #[test]
    fn reruns_are_identical(returns in returns_strategy()) {
        let a = solve(&returns);
        let b = solve(&returns);
        prop_assert_eq!(
            a.map(|r| r.weights.weights),
            b.map(|r| r.weights.weights)
        );
    }
}
