//! Command-line runner: analyse a roster or a manual company list, print the
//! text report and write the CSV export.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use upsell_analyzer::classify::build_generator;
use upsell_analyzer::config::{ai::AiConfig, analyzer::AnalyzerConfig};
use upsell_analyzer::logging::init_tracing;
use upsell_analyzer::news::google_news::GoogleNewsProvider;
use upsell_analyzer::report::{export_file_name, render_text, write_csv};
use upsell_analyzer::roster::resolve_companies;
use upsell_analyzer::{Analyzer, SystemClock};

#[derive(Debug, Parser)]
#[command(name = "upsell-cli", version, about = "Score recent company news for employee-benefits upsell opportunities")]
struct Cli {
    /// Roster CSV with a `CompanyName` column.
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Comma-separated company names; overrides the roster when non-empty.
    #[arg(long)]
    companies: Option<String>,

    /// Days to search back (1-365); defaults to the configured value.
    #[arg(long)]
    days: Option<u32>,

    /// Directory for the CSV export.
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    let roster = cli
        .roster
        .as_ref()
        .map(|p| fs::read(p).with_context(|| format!("reading roster {}", p.display())))
        .transpose()?;
    let companies = resolve_companies(cli.companies.as_deref(), roster.as_deref())?;

    let config = AnalyzerConfig::load_default().context("loading analyzer config")?;
    let days = cli.days.unwrap_or(config.days_back);
    let ai = AiConfig::load_default().context("loading ai config")?;
    let generator = build_generator(&ai)?;

    let analyzer = Analyzer::with_clock(
        Arc::new(GoogleNewsProvider::new()),
        generator,
        config,
        Arc::new(SystemClock),
        Duration::from_secs(ai.timeout_secs),
    );
    let run = analyzer.run(&companies, days).await?;

    print!("{}", render_text(&run));

    fs::create_dir_all(&cli.out).with_context(|| format!("creating {}", cli.out.display()))?;
    let path = cli.out.join(export_file_name(run.generated_at));
    let file = fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    write_csv(&run, file)?;
    println!("Results written to {}", path.display());
    Ok(())
}
