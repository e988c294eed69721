// crypto-analyzer: fetch daily bars, annotate them with indicators and
// patterns, print the summary report and write an HTML chart.
use analysis_engine::config::{AnalyzerSettings, DateWindow};
use analysis_engine::data::{CsvSource, DataSource, SeriesRequest, YahooChartSource};
use analysis_engine::Analyzer;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Technical analysis report and chart for a single asset")]
struct Cli {
    /// Asset symbol, e.g. BTC
    #[arg(default_value = "BTC")]
    symbol: String,

    /// Inclusive start date (YYYY-MM-DD); defaults to 365 days before today
    #[arg(long)]
    start: Option<String>,

    /// Inclusive end date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    end: Option<String>,

    /// Read bars from a CSV export instead of downloading them
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Path to a JSON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the HTML chart
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Skip writing the chart
    #[arg(long)]
    no_chart: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = AnalyzerSettings::load(cli.config.as_deref()).context("Failed to load settings")?;
    let range = DateWindow::parse(cli.start.as_deref(), cli.end.as_deref())?
        .resolve(chrono::Local::now().date_naive())?;
    info!(symbol = %cli.symbol, %range, "Starting analysis");

    let source: Box<dyn DataSource> = match &cli.csv {
        Some(path) => Box::new(CsvSource::new(path)),
        None => Box::new(YahooChartSource::new(&settings.data).context("Failed to build HTTP client")?),
    };
    let series = source
        .fetch(&SeriesRequest::new(cli.symbol.clone(), range))
        .await
        .with_context(|| format!("Failed to load data for {}", cli.symbol))?;

    let analyzer = Analyzer::new(settings)?;
    let analysis = analyzer.run(series, &range).context("Analysis failed")?;

    if cli.json {
        println!("{}", analysis.report.to_json()?);
    } else {
        println!("\n{}", analysis.report);
    }

    if !cli.no_chart {
        let path = cli.chart.unwrap_or_else(|| {
            PathBuf::from(&analyzer.settings().chart.output_dir).join(format!("{}_analysis.html", cli.symbol.to_uppercase()))
        });
        let html = chart::render_html(&analysis.annotated, &analyzer.settings().chart.resolved_style(), &analyzer.chart_columns())
            .context("Failed to render chart")?;
        chart::write_html(&path, &html).with_context(|| format!("Failed to write chart to {}", path.display()))?;
    }

    Ok(())
}
