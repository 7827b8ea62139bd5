//! End-to-end analysis tests against an in-memory price port.

mod common;

use approx::assert_abs_diff_eq;
use common::*;
use sharpefolio::adapters::csv_report::CsvReportAdapter;
use sharpefolio::adapters::svg_report::SvgReportAdapter;
use sharpefolio::domain::analysis::{analyze_prices, load_prices, run_analysis};
use sharpefolio::domain::error::SharpefolioError;
use sharpefolio::domain::evaluation::evaluate;
use sharpefolio::domain::optimizer::{optimize, ConvergencePolicy, OptimizerConfig};
use sharpefolio::domain::returns::aligned_returns;
use sharpefolio::ports::report_port::ReportPort;

mod pipeline {
    use super::*;

    #[test]
    fn full_pipeline_with_mock_data_port() {
        let report = run_analysis(&sample_port(), &sample_config()).unwrap();
        let opt = &report.optimization;

        assert_eq!(opt.weights.asset_ids, vec!["AAA", "BBB", "CCC"]);
        assert!(opt.weights.is_long_only_fully_invested(1e-6));
        assert!(opt.converged);

        // 11 prices on common dates give 10 evaluation periods.
        assert_eq!(report.evaluation.portfolio.points.len(), 10);
        assert_eq!(report.evaluation.benchmark.points.len(), 10);
        assert_eq!(report.evaluation.benchmark.label, "SPY");
        assert_eq!(report.plan.orders.len(), 3);
        assert!(report.plan.cash_remainder() >= 0.0);
    }

    #[test]
    fn benchmark_is_loaded_but_not_weighted() {
        let config = sample_config();
        let prices = load_prices(&sample_port(), &config).unwrap();
        assert!(prices.contains_key("SPY"));

        let report = analyze_prices(prices, &config).unwrap();
        assert!(report.optimization.weights.get("SPY").is_none());
    }

    #[test]
    fn net_returns_match_cumulative_series() {
        let report = run_analysis(&sample_port(), &sample_config()).unwrap();
        let eval = &report.evaluation;
        assert_abs_diff_eq!(
            eval.portfolio_net_return_pct,
            eval.portfolio.final_value() * 100.0,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            eval.benchmark_net_return_pct,
            eval.benchmark.final_value() * 100.0,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            report.portfolio_summary.total_return,
            eval.portfolio.final_value(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn optimized_portfolio_beats_equal_weight_in_sample() {
        let config = sample_config();
        let prices = load_prices(&sample_port(), &config).unwrap();
        let returns = aligned_returns(&prices, &config.tickers).unwrap();
        let result = optimize(&returns).unwrap();

        let sharpe_of = |w: &[f64]| {
            let eval = evaluate(w, &config.tickers, &prices, "SPY").unwrap();
            let r = &eval.portfolio.returns;
            let mean = r.iter().sum::<f64>() / r.len() as f64;
            let var = r.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (r.len() - 1) as f64;
            mean / var.sqrt()
        };

        let equal = sharpe_of(&[1.0 / 3.0; 3]);
        let optimal = sharpe_of(&result.weights.weights);
        assert!(optimal >= equal - 1e-9, "optimal {optimal} < equal {equal}");
    }

    #[test]
    fn date_window_limits_loaded_prices() {
        let mut config = sample_config();
        config.start_date = date("2024-01-03");
        config.end_date = date("2024-01-08");
        let report = run_analysis(&sample_port(), &config).unwrap();

        // Six prices in the window, five returns.
        assert_eq!(report.evaluation.portfolio.points.len(), 5);
        assert_eq!(report.evaluation.portfolio.points[0].date, date("2024-01-04"));
    }

    #[test]
    fn misaligned_dates_use_common_intersection() {
        let mut gappy = series_from_returns("BBB", &[0.01; 10]);
        gappy.points.remove(4);
        let port = MockPriceDataPort::new()
            .with_series(series_from_returns(
                "AAA",
                &[0.01, -0.02, 0.03, 0.0, 0.01, -0.01, 0.02, 0.0, 0.01, 0.005],
            ))
            .with_series(gappy)
            .with_series(series_from_returns("SPY", &[0.001; 10]));
        let mut config = sample_config();
        config.tickers = vec!["AAA".into(), "BBB".into()];

        let report = run_analysis(&port, &config).unwrap();
        assert_eq!(report.evaluation.portfolio.points.len(), 9);
        assert!(report
            .evaluation
            .portfolio
            .points
            .iter()
            .all(|p| p.date != date("2024-01-05")));
    }
}

mod failures {
    use super::*;

    #[test]
    fn missing_benchmark_is_reported() {
        let port = MockPriceDataPort::new()
            .with_series(series_from_returns("AAA", &[0.01, -0.01, 0.02]))
            .with_series(series_from_returns("BBB", &[0.0, 0.01, -0.005]));
        let mut config = sample_config();
        config.tickers = vec!["AAA".into(), "BBB".into()];

        // The port returns an empty series for SPY.
        let err = run_analysis(&port, &config).unwrap_err();
        assert!(matches!(err, SharpefolioError::NoData { asset_id } if asset_id == "SPY"));

        let prices = make_history(vec![
            series_from_returns("AAA", &[0.01, -0.01, 0.02]),
            series_from_returns("BBB", &[0.0, 0.01, -0.005]),
        ]);
        let err = analyze_prices(prices, &config).unwrap_err();
        assert!(matches!(
            err,
            SharpefolioError::MissingBenchmark { asset_id } if asset_id == "SPY"
        ));
    }

    #[test]
    fn no_data_for_ticker() {
        let mut config = sample_config();
        config.tickers = vec!["AAA".into(), "ZZZ".into()];
        let err = run_analysis(&sample_port(), &config).unwrap_err();
        assert!(matches!(err, SharpefolioError::NoData { asset_id } if asset_id == "ZZZ"));
    }

    #[test]
    fn fetch_error_propagates() {
        let port = sample_port().with_error("BBB", "disk on fire");
        let err = run_analysis(&port, &sample_config()).unwrap_err();
        assert!(matches!(err, SharpefolioError::Data { reason } if reason == "disk on fire"));
    }

    #[test]
    fn constant_prices_are_degenerate() {
        let port = MockPriceDataPort::new()
            .with_series(price_series("AAA", &[10.0; 6]))
            .with_series(price_series("BBB", &[20.0; 6]))
            .with_series(series_from_returns("SPY", &[0.01; 5]));
        let mut config = sample_config();
        config.tickers = vec!["AAA".into(), "BBB".into()];

        let err = run_analysis(&port, &config).unwrap_err();
        assert!(matches!(err, SharpefolioError::DegenerateInput { .. }));
    }

    #[test]
    fn strict_policy_surfaces_non_convergence() {
        let mut config = sample_config();
        config.optimizer = OptimizerConfig {
            max_iterations: 1,
            tolerance: 0.0,
            ..OptimizerConfig::default()
        };
        config.convergence = ConvergencePolicy::Strict;

        let err = run_analysis(&sample_port(), &config).unwrap_err();
        assert!(matches!(err, SharpefolioError::SolverNonConvergence { iterations: 1 }));

        config.convergence = ConvergencePolicy::Warn;
        let report = run_analysis(&sample_port(), &config).unwrap();
        assert!(!report.optimization.converged);
        assert!(report.optimization.weights.is_long_only_fully_invested(1e-9));
    }
}

mod evaluation {
    use super::*;

    #[test]
    fn single_asset_fully_weighted_tracks_its_prices() {
        let prices = make_history(vec![
            price_series("AAA", &[100.0, 110.0, 121.0]),
            price_series("BBB", &[50.0, 50.0, 50.0]),
            price_series("SPY", &[200.0, 200.0, 220.0]),
        ]);
        let eval = evaluate(
            &[1.0, 0.0],
            &["AAA".to_string(), "BBB".to_string()],
            &prices,
            "SPY",
        )
        .unwrap();

        let values = eval.portfolio.values();
        assert_abs_diff_eq!(values[0], 0.10, epsilon = 1e-12);
        assert_abs_diff_eq!(values[1], 0.21, epsilon = 1e-12);
        assert_abs_diff_eq!(eval.portfolio_net_return_pct, 21.0, epsilon = 1e-9);
        assert_abs_diff_eq!(eval.benchmark_net_return_pct, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn partially_hedged_pair_reduces_variance() {
        let a: Vec<f64> = (0..30)
            .map(|i| if i % 2 == 0 { 0.012 } else { -0.008 })
            .collect();
        let b: Vec<f64> = (0..30)
            .map(|i| if i % 3 == 0 { 0.006 } else { -0.001 } - 0.5 * a[i])
            .collect();
        let prices = make_history(vec![
            series_from_returns("A", &a),
            series_from_returns("B", &b),
            series_from_returns("SPY", &[0.001; 30]),
        ]);
        let ids = vec!["A".to_string(), "B".to_string()];
        let returns = aligned_returns(&prices, &ids).unwrap();
        let result = optimize(&returns).unwrap();

        let eval = evaluate(&result.weights.weights, &ids, &prices, "SPY").unwrap();
        let var = |r: &[f64]| {
            let m = r.iter().sum::<f64>() / r.len() as f64;
            r.iter().map(|x| (x - m).powi(2)).sum::<f64>() / r.len() as f64
        };
        assert!(var(&eval.portfolio.returns) < var(&a));
        assert!(result.weights.weights.iter().all(|w| *w > 0.0));
    }
}

mod reports {
    use super::*;
    use std::fs;

    #[test]
    fn svg_report_written_to_disk() {
        let report = run_analysis(&sample_port(), &sample_config()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");

        SvgReportAdapter.write(&report, &path).unwrap();
        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Cumulative Returns"));
        assert_eq!(svg.matches("<polyline").count(), 2);
    }

    #[test]
    fn csv_report_has_one_row_per_period() {
        let report = run_analysis(&sample_port(), &sample_config()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cumulative.csv");

        CsvReportAdapter.write(&report, &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "date,portfolio,SPY");
        assert_eq!(lines.len(), 11);
        assert!(lines[1].starts_with("2024-01-02,"));

        let last: Vec<&str> = lines[10].split(',').collect();
        let value: f64 = last[1].parse().unwrap();
        assert_abs_diff_eq!(value, report.evaluation.portfolio.final_value(), epsilon = 1e-8);
    }

    #[test]
    fn report_to_missing_directory_fails() {
        let report = run_analysis(&sample_port(), &sample_config()).unwrap();
        let path = std::path::Path::new("/nonexistent/dir/chart.svg");
        assert!(SvgReportAdapter.write(&report, path).is_err());
        assert!(CsvReportAdapter
            .write(&report, &path.with_extension("csv"))
            .is_err());
    }
}
