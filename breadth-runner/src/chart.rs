//! Chart rendering.
//!
//! `breadth_charts` turns processed tables into renderer-neutral chart
//! descriptions (named traces of (date, value) pairs, a title and the
//! display-window lower bound). `PlotlyHtmlRenderer` writes each one as a
//! standalone HTML page that loads Plotly from its CDN.

use breadth_core::breadth::advance_decline::AD_LINE;
use breadth_core::breadth::high_low::NET;
use breadth_core::breadth::sma_breadth::column_name;
use breadth_core::ProcessedBreadth;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("create chart dir {path}: {reason}")]
    CreateDir { path: String, reason: String },

    #[error("encode chart {file}: {reason}")]
    Encode { file: String, reason: String },

    #[error("write chart {path}: {reason}")]
    Write { path: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    Line,
    DashedLine,
    Bar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: String,
    pub kind: TraceKind,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub file_name: String,
    pub title: String,
    pub y_title: Option<String>,
    pub height: u32,
    pub traces: Vec<Trace>,
    /// Lower bound of the x axis.
    pub x_start: NaiveDate,
}

/// Renders chart descriptions to files.
pub trait ChartRenderer: Send + Sync {
    fn name(&self) -> &str;

    /// Write `chart` into `dir`, returning the file path.
    fn render(&self, chart: &Chart, dir: &Path) -> Result<PathBuf, ChartError>;
}

/// Build every chart for a processed run: one per MA period, the net
/// highs/lows bar chart, and the AD line.
pub fn breadth_charts(
    market: &str,
    processed: &ProcessedBreadth,
    periods: &[usize],
    smoothing_window: usize,
    x_start: NaiveDate,
) -> Vec<Chart> {
    let smoothed_name = format!("{smoothing_window}-Day SMA");
    let mut charts = Vec::with_capacity(periods.len() + 2);

    for &period in periods {
        let column = column_name(period);
        let mut traces = vec![Trace {
            name: format!("% Above {period}-Day SMA"),
            kind: TraceKind::Line,
            points: processed.sma.raw.points(&column),
        }];
        if let Some(smoothed) = &processed.sma.smoothed {
            traces.push(Trace {
                name: smoothed_name.clone(),
                kind: TraceKind::DashedLine,
                points: smoothed.points(&column),
            });
        }
        charts.push(Chart {
            file_name: format!("breadth_{period}.html"),
            title: format!("{market} % of Stocks Above {period}-Day SMA"),
            y_title: Some("Percent".into()),
            height: 850,
            traces,
            x_start,
        });
    }

    charts.push(Chart {
        file_name: "high_low_52w.html".into(),
        title: format!("{market} 52-Week Highs Minus Lows"),
        y_title: Some("Net Highs".into()),
        height: 600,
        traces: vec![Trace {
            name: "52W Highs − Lows".into(),
            kind: TraceKind::Bar,
            points: processed.high_low.raw.points(NET),
        }],
        x_start,
    });

    let mut ad_traces = vec![Trace {
        name: "Advance–Decline Line".into(),
        kind: TraceKind::Line,
        points: processed.advance_decline.raw.points(AD_LINE),
    }];
    if let Some(smoothed) = &processed.advance_decline.smoothed {
        ad_traces.push(Trace {
            name: smoothed_name,
            kind: TraceKind::DashedLine,
            points: smoothed.points(AD_LINE),
        });
    }
    charts.push(Chart {
        file_name: "ad_line.html".into(),
        title: format!("{market} Advance–Decline Line"),
        y_title: None,
        height: 700,
        traces: ad_traces,
        x_start,
    });

    charts
}

/// Standalone Plotly HTML pages.
#[derive(Debug, Clone)]
pub struct PlotlyHtmlRenderer {
    script_src: String,
}

impl PlotlyHtmlRenderer {
    pub fn new() -> Self {
        Self {
            script_src: PLOTLY_CDN.to_string(),
        }
    }

    fn trace_json(trace: &Trace) -> Value {
        let x: Vec<String> = trace.points.iter().map(|(d, _)| d.to_string()).collect();
        let y: Vec<f64> = trace.points.iter().map(|(_, v)| *v).collect();
        match trace.kind {
            TraceKind::Bar => json!({ "type": "bar", "name": trace.name, "x": x, "y": y }),
            TraceKind::Line => json!({
                "type": "scatter", "mode": "lines", "name": trace.name, "x": x, "y": y,
                "line": { "width": 2 }
            }),
            TraceKind::DashedLine => json!({
                "type": "scatter", "mode": "lines", "name": trace.name, "x": x, "y": y,
                "line": { "width": 2, "dash": "dash" }
            }),
        }
    }

    fn layout_json(chart: &Chart) -> Value {
        let mut layout = json!({
            "title": { "text": chart.title },
            "height": chart.height,
            "xaxis": { "range": [chart.x_start.to_string(), Value::Null] },
        });
        if let Some(y_title) = &chart.y_title {
            layout["yaxis"] = json!({ "title": { "text": y_title } });
        }
        if chart.traces.len() > 1 {
            layout["legend"] = json!({ "orientation": "h", "yanchor": "bottom", "y": 1.02 });
        }
        layout
    }

    /// The full HTML page for one chart.
    pub fn to_html(&self, chart: &Chart) -> Result<String, ChartError> {
        let encode = |v: &Value| {
            serde_json::to_string(v)
                .map(|s| s.replace("</", "<\\/"))
                .map_err(|e| ChartError::Encode {
                    file: chart.file_name.clone(),
                    reason: e.to_string(),
                })
        };
        let data = encode(&Value::Array(
            chart.traces.iter().map(Self::trace_json).collect(),
        ))?;
        let layout = encode(&Self::layout_json(chart))?;

        Ok(format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n<script src=\"{src}\"></script>\n</head>\n<body>\n\
             <div id=\"chart\" style=\"width:100%;\"></div>\n\
             <script>Plotly.newPlot(\"chart\", {data}, {layout}, {{\"responsive\": true}});</script>\n\
             </body>\n</html>\n",
            title = escape_html(&chart.title),
            src = self.script_src,
        ))
    }
}

impl Default for PlotlyHtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartRenderer for PlotlyHtmlRenderer {
    fn name(&self) -> &str {
        "plotly_html"
    }

    fn render(&self, chart: &Chart, dir: &Path) -> Result<PathBuf, ChartError> {
        std::fs::create_dir_all(dir).map_err(|e| ChartError::CreateDir {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        let path = dir.join(&chart.file_name);
        let html = self.to_html(chart)?;
        std::fs::write(&path, html).map_err(|e| ChartError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(path)
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
