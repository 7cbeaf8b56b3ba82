// src/chart.rs

use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};
use tracing::info;
//
use crate::{
    error::{PipelineError, Result},
    forecast::Forecast,
    kpi::KpiSummary,
    order::full_weekday_name,
};

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 540.0;
const LEFT: f64 = 90.0;
const RIGHT: f64 = 30.0;
const TOP: f64 = 60.0;
const BOTTOM: f64 = 130.0;
const Y_TICKS: usize = 5;

pub struct Series {
    pub label: String,
    pub color: &'static str,
    pub dashed: bool,
    pub markers: bool,
    pub points: Vec<(f64, f64)>,
}

pub enum Chart {
    Bar {
        title: String,
        y_label: String,
        bars: Vec<(String, f64)>,
    },
    Line {
        title: String,
        x_label: String,
        y_label: String,
        x_ticks: Vec<(f64, String)>,
        series: Vec<Series>,
    },
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

/// Maps data values onto the plot area.
struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    fn new(x: (f64, f64), y: (f64, f64)) -> Self {
        let y_min = y.0.min(0.0);
        let y_max = if y.1 > y_min { y.1 * 1.1 } else { y_min + 1.0 };
        let x_max = if x.1 > x.0 { x.1 } else { x.0 + 1.0 };
        Self { x_min: x.0, x_max, y_min, y_max }
    }

    fn plot_width() -> f64 {
        WIDTH - LEFT - RIGHT
    }

    fn plot_height() -> f64 {
        HEIGHT - TOP - BOTTOM
    }

    fn x(&self, value: f64) -> f64 {
        LEFT + (value - self.x_min) / (self.x_max - self.x_min) * Self::plot_width()
    }

    fn y(&self, value: f64) -> f64 {
        TOP + Self::plot_height() - (value - self.y_min) / (self.y_max - self.y_min) * Self::plot_height()
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

impl Chart {
    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif" font-size="12">"#
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);

        match self {
            Chart::Bar { title, y_label, bars } => {
                let (_, hi) = bounds(bars.iter().map(|(_, v)| *v));
                let frame = Frame::new((0.0, bars.len() as f64), (0.0, if hi.is_finite() { hi } else { 0.0 }));
                header(&mut svg, title, "", y_label);
                axes(&mut svg, &frame);

                let slot = Frame::plot_width() / bars.len().max(1) as f64;
                for (i, (label, value)) in bars.iter().enumerate() {
                    let x = frame.x(i as f64) + slot * 0.15;
                    let y = frame.y(*value);
                    let _ = writeln!(
                        svg,
                        r##"<rect x="{x:.1}" y="{y:.1}" width="{:.1}" height="{:.1}" fill="#4c72b0"><title>{}: {value:.2}</title></rect>"##,
                        slot * 0.7,
                        frame.y(0.0) - y,
                        escape(label)
                    );
                    let cx = x + slot * 0.35;
                    let cy = TOP + Frame::plot_height() + 14.0;
                    let _ = writeln!(
                        svg,
                        r#"<text x="{cx:.1}" y="{cy:.1}" text-anchor="end" transform="rotate(-45 {cx:.1} {cy:.1})">{}</text>"#,
                        escape(label)
                    );
                }
            }
            Chart::Line { title, x_label, y_label, x_ticks, series } => {
                let xs = bounds(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)));
                let ys = bounds(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)));
                let xs = if xs.0.is_finite() { xs } else { (0.0, 1.0) };
                let ys = if ys.0.is_finite() { ys } else { (0.0, 1.0) };
                let frame = Frame::new(xs, ys);
                header(&mut svg, title, x_label, y_label);
                axes(&mut svg, &frame);

                for (value, label) in x_ticks {
                    let cx = frame.x(*value);
                    let cy = TOP + Frame::plot_height() + 14.0;
                    let _ = writeln!(
                        svg,
                        r#"<text x="{cx:.1}" y="{cy:.1}" text-anchor="end" transform="rotate(-45 {cx:.1} {cy:.1})">{}</text>"#,
                        escape(label)
                    );
                }

                for (i, line) in series.iter().enumerate() {
                    let path: Vec<String> = line
                        .points
                        .iter()
                        .map(|(x, y)| format!("{:.1},{:.1}", frame.x(*x), frame.y(*y)))
                        .collect();
                    let dash = if line.dashed { r#" stroke-dasharray="6 4""# } else { "" };
                    let _ = writeln!(
                        svg,
                        r#"<polyline fill="none" stroke="{}" stroke-width="1.5"{dash} points="{}"/>"#,
                        line.color,
                        path.join(" ")
                    );
                    if line.markers {
                        for (x, y) in &line.points {
                            let _ = writeln!(
                                svg,
                                r#"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{}"/>"#,
                                frame.x(*x),
                                frame.y(*y),
                                line.color
                            );
                        }
                    }

                    let ly = TOP + 4.0 + i as f64 * 16.0;
                    let lx = WIDTH - RIGHT - 170.0;
                    let _ = writeln!(
                        svg,
                        r#"<line x1="{lx:.1}" y1="{ly:.1}" x2="{:.1}" y2="{ly:.1}" stroke="{}" stroke-width="2"{dash}/><text x="{:.1}" y="{:.1}">{}</text>"#,
                        lx + 24.0,
                        line.color,
                        lx + 30.0,
                        ly + 4.0,
                        escape(&line.label)
                    );
                }
            }
        }

        svg.push_str("</svg>\n");
        svg
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_svg()).map_err(PipelineError::io(path))
    }
}

fn header(svg: &mut String, title: &str, x_label: &str, y_label: &str) {
    let _ = writeln!(
        svg,
        r#"<text x="{:.1}" y="30" text-anchor="middle" font-size="18">{}</text>"#,
        WIDTH / 2.0,
        escape(title)
    );
    if !x_label.is_empty() {
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
            LEFT + Frame::plot_width() / 2.0,
            HEIGHT - 12.0,
            escape(x_label)
        );
    }
    let cy = TOP + Frame::plot_height() / 2.0;
    let _ = writeln!(
        svg,
        r#"<text x="20" y="{cy:.1}" text-anchor="middle" transform="rotate(-90 20 {cy:.1})">{}</text>"#,
        escape(y_label)
    );
}

fn axes(svg: &mut String, frame: &Frame) {
    let bottom = TOP + Frame::plot_height();
    let _ = writeln!(
        svg,
        r#"<line x1="{LEFT}" y1="{TOP}" x2="{LEFT}" y2="{bottom}" stroke="black"/><line x1="{LEFT}" y1="{bottom}" x2="{:.1}" y2="{bottom}" stroke="black"/>"#,
        WIDTH - RIGHT
    );

    for tick in 0..=Y_TICKS {
        let value = frame.y_min + (frame.y_max - frame.y_min) * tick as f64 / Y_TICKS as f64;
        let y = frame.y(value);
        let _ = writeln!(
            svg,
            r##"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#dddddd"/><text x="{:.1}" y="{:.1}" text-anchor="end">{value:.0}</text>"##,
            LEFT,
            WIDTH - RIGHT,
            LEFT - 6.0,
            y + 4.0
        );
    }
}

pub fn write_kpi_charts(dir: &Path, summary: &KpiSummary) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(PipelineError::io(dir))?;

    let charts = [
        (
            "revenue_by_category.svg",
            Chart::Bar {
                title: "Revenue by Category".into(),
                y_label: "Revenue ($)".into(),
                bars: summary.category_revenue.iter().map(|(c, v)| (c.to_string(), *v)).collect(),
            },
        ),
        (
            "top_10_items.svg",
            Chart::Bar {
                title: "Top 10 Selling Items".into(),
                y_label: "Units Sold".into(),
                bars: summary.top_items.iter().map(|(item, qty)| (item.clone(), *qty as f64)).collect(),
            },
        ),
        (
            "orders_by_day.svg",
            Chart::Bar {
                title: "Orders by Day of Week".into(),
                y_label: "Number of Orders".into(),
                bars: summary
                    .orders_by_day
                    .iter()
                    .map(|(day, count)| (full_weekday_name(*day).to_string(), *count as f64))
                    .collect(),
            },
        ),
    ];

    save_all(dir, charts)
}

pub fn write_forecast_charts(dir: &Path, forecast: &Forecast) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(PipelineError::io(dir))?;

    let step = (forecast.daily.len() / 12).max(1);
    let x_ticks = forecast
        .daily
        .iter()
        .step_by(step)
        .map(|d| (d.day_index as f64, d.order_date.to_string()))
        .collect();

    let actual = Series {
        label: "Actual Revenue".into(),
        color: "blue",
        dashed: false,
        markers: false,
        points: forecast.daily.iter().map(|d| (d.day_index as f64, d.daily_revenue)).collect(),
    };
    let predicted = Series {
        label: "Predicted Revenue".into(),
        color: "red",
        dashed: true,
        markers: false,
        points: forecast
            .test()
            .iter()
            .zip(&forecast.predictions)
            .map(|(d, p)| (d.day_index as f64, *p))
            .collect(),
    };
    let weekly = Series {
        label: "Weekly Revenue".into(),
        color: "green",
        dashed: false,
        markers: true,
        points: forecast.weekly.iter().map(|w| (w.iso_week as f64, w.weekly_revenue)).collect(),
    };

    let charts = [
        (
            "revenue_forecast.svg",
            Chart::Line {
                title: "Daily Revenue Forecast".into(),
                x_label: "Date".into(),
                y_label: "Revenue ($)".into(),
                x_ticks,
                series: vec![actual, predicted],
            },
        ),
        (
            "weekly_forecast.svg",
            Chart::Line {
                title: "Weekly Revenue Trend".into(),
                x_label: "Week Number".into(),
                y_label: "Revenue ($)".into(),
                x_ticks: forecast.weekly.iter().map(|w| (w.iso_week as f64, w.iso_week.to_string())).collect(),
                series: vec![weekly],
            },
        ),
    ];

    save_all(dir, charts)
}

fn save_all<const N: usize>(dir: &Path, charts: [(&str, Chart); N]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(N);

    for (file_name, chart) in charts {
        let path = dir.join(file_name);
        chart.save(&path)?;
        written.push(path);
    }

    info!(dir = %dir.display(), charts = written.len(), "wrote charts");

    Ok(written)
}
