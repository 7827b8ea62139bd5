//! SVG line chart of cumulative returns, portfolio against benchmark.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::SharpefolioError;
use crate::domain::evaluation::CumulativeSeries;
use crate::ports::report_port::ReportPort;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 400.0;
const PADDING: f64 = 50.0;

const PORTFOLIO_COLOR: &str = "#1f77b4";
const BENCHMARK_COLOR: &str = "#7f7f7f";

pub struct SvgReportAdapter;

impl ReportPort for SvgReportAdapter {
    fn write(&self, report: &AnalysisReport, output_path: &Path) -> Result<(), SharpefolioError> {
        let svg = render_chart(
            &report.evaluation.portfolio,
            &report.evaluation.benchmark,
        );
        fs::write(output_path, svg)?;
        Ok(())
    }
}

/// Renders both series on a shared date axis.
pub fn render_chart(portfolio: &CumulativeSeries, benchmark: &CumulativeSeries) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = writeln!(
        svg,
        r#"<rect width="{:.0}" height="{:.0}" fill="white"/>"#,
        WIDTH, HEIGHT
    );
    let _ = writeln!(
        svg,
        r#"<text x="{:.0}" y="25" font-family="sans-serif" font-size="16" text-anchor="middle">Cumulative Returns: {} {:+.2}% vs {} {:+.2}%</text>"#,
        WIDTH / 2.0,
        escape(&portfolio.label),
        portfolio.net_return_pct(),
        escape(&benchmark.label),
        benchmark.net_return_pct(),
    );

    let all: Vec<f64> = portfolio
        .points
        .iter()
        .chain(benchmark.points.iter())
        .map(|p| p.value)
        .collect();
    if all.is_empty() {
        let _ = writeln!(
            svg,
            r#"<text x="{:.0}" y="{:.0}" font-family="sans-serif" text-anchor="middle">No return data available.</text>"#,
            WIDTH / 2.0,
            HEIGHT / 2.0
        );
        svg.push_str("</svg>\n");
        return svg;
    }

    // Keep zero inside the plotted range so the baseline is always drawn.
    let min = all.iter().copied().fold(0.0_f64, f64::min);
    let max = all.iter().copied().fold(0.0_f64, f64::max);
    let range = max - min;

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let y_of = |v: f64| HEIGHT - PADDING - (v - min) * scale_y;

    // Axes
    let _ = writeln!(
        svg,
        r#"<line x1="{p:.1}" y1="{p:.1}" x2="{p:.1}" y2="{b:.1}" stroke="black"/>"#,
        p = PADDING,
        b = HEIGHT - PADDING
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{p:.1}" y1="{b:.1}" x2="{r:.1}" y2="{b:.1}" stroke="black"/>"#,
        p = PADDING,
        b = HEIGHT - PADDING,
        r = WIDTH - PADDING
    );
    let _ = writeln!(
        svg,
        r##"<line x1="{p:.1}" y1="{z:.1}" x2="{r:.1}" y2="{z:.1}" stroke="#cccccc" stroke-dasharray="4 4"/>"##,
        p = PADDING,
        z = y_of(0.0),
        r = WIDTH - PADDING
    );

    // Y labels
    for (value, anchor_y) in [(max, y_of(max)), (min, y_of(min))] {
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="10" text-anchor="end">{:.1}%</text>"#,
            PADDING - 5.0,
            anchor_y + 3.0,
            value * 100.0
        );
    }

    // X labels
    if let (Some(first), Some(last)) = (portfolio.points.first(), portfolio.points.last()) {
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="10">{}</text>"#,
            PADDING,
            HEIGHT - PADDING + 15.0,
            first.date
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="10" text-anchor="end">{}</text>"#,
            WIDTH - PADDING,
            HEIGHT - PADDING + 15.0,
            last.date
        );
    }

    for (series, color) in [(benchmark, BENCHMARK_COLOR), (portfolio, PORTFOLIO_COLOR)] {
        let n = series.points.len();
        let scale_x = if n > 1 { plot_width / (n - 1) as f64 } else { 0.0 };
        let points: Vec<String> = series
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{:.1},{:.1}", PADDING + i as f64 * scale_x, y_of(p.value)))
            .collect();
        let _ = writeln!(
            svg,
            r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
            color,
            points.join(" ")
        );
    }

    // Legend
    for (i, (series, color)) in [(portfolio, PORTFOLIO_COLOR), (benchmark, BENCHMARK_COLOR)]
        .into_iter()
        .enumerate()
    {
        let y = PADDING + 15.0 * i as f64;
        let _ = writeln!(
            svg,
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="2"/>"#,
            PADDING + 10.0,
            y,
            PADDING + 30.0,
            y,
            color
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="11">{}</text>"#,
            PADDING + 35.0,
            y + 4.0,
            escape(&series.label)
        );
    }

    svg.push_str("</svg>\n");
    svg
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
