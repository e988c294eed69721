// Presentation adapter: renders an annotated series as a standalone HTML page
// with an inline SVG candlestick chart.
pub mod render;
pub mod theme;

pub use render::{render_html, write_html, ChartColumns};
pub use theme::{ChartStyle, ChartTheme};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Column '{0}' required by the chart is missing")]
    MissingColumn(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to format chart markup")]
    Fmt(#[from] std::fmt::Error),
}
