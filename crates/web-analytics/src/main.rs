mod bootstrap;

use anyhow::{Context, Result};
use analytics_core::settings::{Command, DashboardArgs, GenerateArgs, Settings};
use analytics_data::aggregator::DashboardAggregator;
use analytics_data::cache::TableCache;
use analytics_data::filter::SessionFilter;
use analytics_data::generator::{generate_to_file, GeneratorConfig};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Web Analytics v{} starting", env!("CARGO_PKG_VERSION"));

    match &settings.command {
        Command::Generate(args) => run_generate(args),
        Command::Dashboard(args) => run_dashboard(args),
    }
}

fn run_generate(args: &GenerateArgs) -> Result<()> {
    let mut config = GeneratorConfig::new(args.days, args.sessions_per_day_avg).with_seed(args.seed);
    if let Some(end) = args.end_date()? {
        config = config.with_end_date(end);
    }
    let start = config.start_date()?;
    tracing::info!(
        days = config.days,
        sessions_per_day = config.sessions_per_day_avg,
        seed = config.seed,
        start = %start,
        end = %config.end_date,
        "generating session table"
    );

    let rows = generate_to_file(config, &args.output)
        .with_context(|| format!("failed to generate {}", args.output.display()))?;

    println!("Generated {rows} sessions into {}", args.output.display());
    Ok(())
}

fn run_dashboard(args: &DashboardArgs) -> Result<()> {
    let tab = args.tab()?;

    let mut cache = TableCache::new();
    let records = cache
        .get(&args.data_file)
        .with_context(|| format!("failed to load session table {}", args.data_file.display()))?;

    let filter = SessionFilter::resolve(
        records,
        args.start_date()?,
        args.end_date()?,
        args.sources.clone(),
    )?;
    tracing::debug!(?filter, "applying dashboard filter");

    let outcome = DashboardAggregator::build(records, &filter);
    if outcome.is_no_data() {
        tracing::warn!(start = %filter.start, end = %filter.end, "filter matched no sessions");
    }

    let report = match args.format.as_str() {
        "json" => analytics_ui::render_json(&outcome, tab)?,
        _ => analytics_ui::render_text(&outcome, tab),
    };
    println!("{report}");
    Ok(())
}
