// Candlestick chart rendering
use std::fmt::Write as _;
use std::path::Path;

use shared::utils::format_decimal;
use shared::{AnnotatedSeries, Bar};

use crate::theme::ChartStyle;
use crate::ChartError;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 60.0;
const GRID_LINES: usize = 5;
const ARROW_LENGTH: f64 = 28.0;

/// Names of the annotated-series columns drawn on the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartColumns {
    pub fast: String,
    pub slow: String,
    pub upper: String,
    pub lower: String,
    pub golden_cross: String,
    pub death_cross: String,
}

// Maps bar indices and prices to SVG coordinates.
struct Scale {
    min_price: f64,
    max_price: f64,
    plot_width: f64,
    plot_height: f64,
    slot: f64,
}

impl Scale {
    fn new(style: &ChartStyle, bars: usize, min_price: f64, max_price: f64) -> Self {
        let plot_width = (style.width as f64 - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
        let plot_height = (style.height as f64 - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
        Self {
            min_price,
            max_price,
            plot_width,
            plot_height,
            slot: plot_width / bars.max(1) as f64,
        }
    }

    fn x(&self, index: usize) -> f64 {
        MARGIN_LEFT + index as f64 * self.slot + self.slot / 2.0
    }

    fn y(&self, price: f64) -> f64 {
        let range = if (self.max_price - self.min_price) > 0.0 { self.max_price - self.min_price } else { 1.0 };
        MARGIN_TOP + (self.max_price - price) * (self.plot_height / range)
    }
}

/// Renders the candlestick chart with moving averages, Bollinger bands and
/// golden/death cross annotations.
pub fn render_html(annotated: &AnnotatedSeries, style: &ChartStyle, columns: &ChartColumns) -> Result<String, ChartError> {
    let derived = |name: &str| annotated.derived(name).ok_or_else(|| ChartError::MissingColumn(name.to_string()));
    let signal = |name: &str| annotated.signal(name).ok_or_else(|| ChartError::MissingColumn(name.to_string()));

    let fast = derived(&columns.fast)?;
    let slow = derived(&columns.slow)?;
    let upper = derived(&columns.upper)?;
    let lower = derived(&columns.lower)?;
    let golden = signal(&columns.golden_cross)?;
    let death = signal(&columns.death_cross)?;

    let bars = annotated.series().bars();
    let (min_price, max_price) = price_bounds(bars, &[fast, slow, upper, lower]);
    let scale = Scale::new(style, bars.len(), min_price, max_price);
    let title = format!("{} Technical Analysis", escape(annotated.symbol()));

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = style.width,
        h = style.height
    )?;
    writeln!(svg, r#"<rect width="100%" height="100%" fill="{}"/>"#, style.background)?;
    writeln!(
        svg,
        r#"<text x="{:.2}" y="32" fill="{}" font-size="20">{}</text>"#,
        MARGIN_LEFT, style.foreground, title
    )?;

    write_axes(&mut svg, style, &scale, bars)?;
    write_candles(&mut svg, style, &scale, bars)?;

    write_line(&mut svg, &scale, upper, &style.band, true)?;
    write_line(&mut svg, &scale, lower, &style.band, true)?;
    write_line(&mut svg, &scale, fast, &style.sma_fast, false)?;
    write_line(&mut svg, &scale, slow, &style.sma_slow, false)?;

    for (i, bar) in bars.iter().enumerate() {
        if golden[i] {
            write_annotation(&mut svg, &scale, i, bar.low, "Golden Cross", "golden-cross", &style.golden_cross, true)?;
        }
        if death[i] {
            write_annotation(&mut svg, &scale, i, bar.high, "Death Cross", "death-cross", &style.death_cross, false)?;
        }
    }

    write_legend(&mut svg, style, columns)?;
    svg.push_str("</svg>\n");

    Ok(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body style=\"margin:0;background:{bg}\">\n{svg}</body>\n</html>\n",
        title = title,
        bg = style.background,
        svg = svg
    ))
}

/// Writes a rendered document to `path`.
pub fn write_html(path: &Path, html: &str) -> Result<(), ChartError> {
    std::fs::write(path, html)?;
    tracing::info!(path = %path.display(), bytes = html.len(), "Wrote chart");
    Ok(())
}

fn price_bounds(bars: &[Bar], overlays: &[&[Option<f64>]]) -> (f64, f64) {
    let prices = bars
        .iter()
        .flat_map(|b| [b.low, b.high])
        .chain(overlays.iter().flat_map(|col| col.iter().flatten().copied()))
        .filter(|p| p.is_finite());
    let (min, max) = prices.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p), hi.max(p)));
    if min > max {
        return (0.0, 1.0);
    }
    // Room for the annotation arrows above and below.
    let pad = ((max - min) * 0.08).max(max.abs() * 0.01).max(f64::EPSILON);
    (min - pad, max + pad)
}

fn write_axes(svg: &mut String, style: &ChartStyle, scale: &Scale, bars: &[Bar]) -> std::fmt::Result {
    for step in 0..=GRID_LINES {
        let price = scale.min_price + (scale.max_price - scale.min_price) * step as f64 / GRID_LINES as f64;
        let y = scale.y(price);
        writeln!(
            svg,
            r#"<line x1="{:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="{}" stroke-dasharray="2,4"/>"#,
            MARGIN_LEFT,
            MARGIN_LEFT + scale.plot_width,
            style.grid,
            y = y
        )?;
        writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" fill="{}" font-size="11" text-anchor="end">{}</text>"#,
            MARGIN_LEFT - 6.0,
            y + 4.0,
            style.foreground,
            format_decimal(price, 2)
        )?;
    }

    let bottom = MARGIN_TOP + scale.plot_height;
    let last = bars.len().saturating_sub(1);
    let mut ticks = vec![0, last / 2, last];
    ticks.dedup();
    for i in ticks {
        writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" fill="{}" font-size="11" text-anchor="middle">{}</text>"#,
            scale.x(i),
            bottom + 18.0,
            style.foreground,
            bars[i].timestamp.format("%Y-%m-%d")
        )?;
    }

    writeln!(
        svg,
        r#"<text x="{:.2}" y="{:.2}" fill="{}" font-size="13" text-anchor="middle">Date</text>"#,
        MARGIN_LEFT + scale.plot_width / 2.0,
        bottom + 44.0,
        style.foreground
    )?;
    writeln!(
        svg,
        r#"<text x="18" y="{y:.2}" fill="{}" font-size="13" text-anchor="middle" transform="rotate(-90 18 {y:.2})">Price</text>"#,
        style.foreground,
        y = MARGIN_TOP + scale.plot_height / 2.0
    )
}

fn write_candles(svg: &mut String, style: &ChartStyle, scale: &Scale, bars: &[Bar]) -> std::fmt::Result {
    let body_width = (scale.slot * 0.7).max(1.0);
    writeln!(svg, r#"<g class="candles">"#)?;
    for (i, bar) in bars.iter().enumerate() {
        let color = if bar.close >= bar.open { &style.bullish } else { &style.bearish };
        let x = scale.x(i);
        writeln!(
            svg,
            r#"<line x1="{x:.2}" y1="{:.2}" x2="{x:.2}" y2="{:.2}" stroke="{}"/>"#,
            scale.y(bar.high),
            scale.y(bar.low),
            color,
            x = x
        )?;
        let top = scale.y(bar.open.max(bar.close));
        let height = (scale.y(bar.open.min(bar.close)) - top).max(1.0);
        writeln!(
            svg,
            r#"<rect class="candle" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
            x - body_width / 2.0,
            top,
            body_width,
            height,
            color
        )?;
    }
    writeln!(svg, "</g>")
}

// Absent values break the line into separate polylines.
fn write_line(svg: &mut String, scale: &Scale, values: &[Option<f64>], color: &str, dashed: bool) -> std::fmt::Result {
    let dash = if dashed { r#" stroke-dasharray="6,4""# } else { "" };
    for segment in segments(values) {
        let points: Vec<String> = segment
            .iter()
            .map(|&(i, v)| format!("{:.2},{:.2}", scale.x(i), scale.y(v)))
            .collect();
        writeln!(
            svg,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="1.5"{}/>"#,
            points.join(" "),
            color,
            dash
        )?;
    }
    Ok(())
}

fn segments(values: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => current.push((i, *v)),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

#[allow(clippy::too_many_arguments)]
fn write_annotation(
    svg: &mut String,
    scale: &Scale,
    index: usize,
    price: f64,
    label: &str,
    class: &str,
    color: &str,
    below: bool,
) -> std::fmt::Result {
    let x = scale.x(index);
    let tip = scale.y(price);
    let tail = if below { tip + ARROW_LENGTH } else { tip - ARROW_LENGTH };
    let text_y = if below { tail + 12.0 } else { tail - 4.0 };
    writeln!(
        svg,
        r#"<g class="{class}"><line x1="{x:.2}" y1="{tail:.2}" x2="{x:.2}" y2="{tip:.2}" stroke="{color}"/><text x="{x:.2}" y="{text_y:.2}" fill="{color}" font-size="11" text-anchor="middle">{label}</text></g>"#,
        class = class,
        x = x,
        tail = tail,
        tip = tip,
        color = color,
        text_y = text_y,
        label = label
    )
}

fn write_legend(svg: &mut String, style: &ChartStyle, columns: &ChartColumns) -> std::fmt::Result {
    let entries = [
        (escape(&columns.fast), &style.sma_fast),
        (escape(&columns.slow), &style.sma_slow),
        ("BB Upper / Lower".to_string(), &style.band),
    ];
    let mut x = style.width as f64 - MARGIN_RIGHT - 360.0;
    for (label, color) in entries {
        writeln!(
            svg,
            r#"<line x1="{x:.2}" y1="28" x2="{:.2}" y2="28" stroke="{}" stroke-width="2"/><text x="{:.2}" y="32" fill="{}" font-size="12">{}</text>"#,
            x + 18.0,
            color,
            x + 24.0,
            style.foreground,
            label,
            x = x
        )?;
        x += 110.0;
    }
    Ok(())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
