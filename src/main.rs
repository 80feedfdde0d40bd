mod chart;
mod config;
mod error;
mod mediawiki;
mod parser;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::chart::render;
use crate::config::{ChartRequest, Mode, RequestSettings};
use crate::mediawiki::MediaWikiClient;

#[derive(Parser)]
#[command(name = "wikiviz", about = "Chart the data published in a wikitable")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a page and render its table or datasets as a chart
    Render {
        #[command(flatten)]
        request: RequestArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the extracted rows or datasets without building a chart
    Inspect {
        #[command(flatten)]
        request: RequestArgs,
    },
}

#[derive(Args)]
struct RequestArgs {
    /// Page title, e.g. "Template:Visualizer"
    #[arg(short, long)]
    page: Option<String>,
    /// Wiki host, e.g. en.wikipedia.org
    #[arg(long)]
    project: Option<String>,
    /// Template marking the table ("visualize" selects the motion chart)
    #[arg(short, long)]
    template: Option<String>,
    /// Chart type: pie, bar, col, line, scatter or area
    #[arg(short, long)]
    chart: Option<String>,
    /// Chart title (default: the page name)
    #[arg(long)]
    title: Option<String>,
    /// Motion chart x axis caption
    #[arg(long)]
    x: Option<String>,
    /// Motion chart y axis caption
    #[arg(long)]
    y: Option<String>,
    /// Motion chart group caption
    #[arg(long)]
    group: Option<String>,
    /// Reject rows whose cell count differs from the header
    #[arg(long)]
    strict: bool,
    /// Read page markup from a local file instead of the API
    #[arg(short, long)]
    file: Option<PathBuf>,
}

impl RequestArgs {
    fn settings(&self) -> RequestSettings {
        RequestSettings {
            page: self.page.clone(),
            project: self.project.clone(),
            template: self.template.clone(),
            chart: self.chart.clone(),
            title: self.title.clone(),
            x: self.x.clone(),
            y: self.y.clone(),
            group: self.group.clone(),
            strict: self.strict.then_some(true),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Html,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            request,
            format,
            output,
        } => {
            let req = resolve(&request)?;
            let source = load_source(&req, request.file.as_ref()).await?;
            let chart = parser::extract_chart(&source, &req)
                .with_context(|| format!("cannot chart [[{}]] on {}", req.display_name, req.project))?;

            let rendered = match format {
                Format::Json => render::to_json(&chart)?,
                Format::Html => render::to_html(&chart, &req)?,
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }
        Commands::Inspect { request } => {
            let req = resolve(&request)?;
            let source = load_source(&req, request.file.as_ref()).await?;
            inspect(&source, &req)?;
        }
    }

    info!("Done in {:.1}s", t0.elapsed().as_secs_f64());
    Ok(())
}

/// Defaults, then `WIKIVIZ_*` environment, then command-line flags.
fn resolve(args: &RequestArgs) -> anyhow::Result<ChartRequest> {
    let env = RequestSettings::from_env()?;
    let req = env.merge(args.settings()).resolve()?;
    info!(page = %req.page, project = %req.project, mode = ?req.mode, "request resolved");
    Ok(req)
}

async fn load_source(req: &ChartRequest, file: Option<&PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let client = MediaWikiClient::new()?;
            let source = client.fetch_page_source(&req.page, &req.project).await?;
            Ok(source)
        }
    }
}

fn inspect(source: &str, req: &ChartRequest) -> anyhow::Result<()> {
    match &req.mode {
        Mode::Table { template, .. } => {
            let table = parser::extract_table(source, template)?;
            match &table.header {
                Some(h) => println!("header | {}", h.join(" | ")),
                None => println!("header | (none)"),
            }
            println!("{}", "-".repeat(40));
            for (i, row) in table.rows.iter().enumerate() {
                println!("{:>6} | {}", i + 1, row.join(" | "));
            }
            println!("\n{} rows, {} columns", table.rows.len(), table.column_count());
        }
        Mode::Motion { .. } => {
            let datasets = parser::dataset::extract_datasets(source)
                .ok_or(error::VizError::DatasetPatternNotMatched)?;
            println!(
                "{:<12} | {:<10} | {:>12} | {:>12} | {}",
                "id", "date", "x", "y", "label"
            );
            println!("{}", "-".repeat(64));
            for d in &datasets {
                let date = format!("{}/{}/{}", d.date.year, d.date.month, d.date.day);
                println!(
                    "{:<12} | {:<10} | {:>12} | {:>12} | {}",
                    d.id, date, d.x, d.y, d.label
                );
            }
            println!("\n{} datasets", datasets.len());
        }
    }
    Ok(())
}
