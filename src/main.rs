use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use engine::{dispatch, EngineError, TransformConfig, Transformation};
use rust_decimal::Decimal;
use series_types::{LagDaySelection, Observation, Record, Series};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;
use transforms::{
    annualized_volatility, calendar_lag, cumulative_return, drawdown_amount,
    drawdown_percentage, ewma, moving_average, observation_returns, standard_deviation,
    standard_deviation_band, wealth, wealth_reverse, Classification, WindowSpec,
};

/// The main entry point for the Meridian series toolkit.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Transform(args) => handle_transform(args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Statistics and transformations over ordered financial observation series.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a named transform to a CSV series of `YYYY-MM-DD,value` lines.
    Transform(TransformArgs),
}

#[derive(Parser)]
struct TransformArgs {
    /// Path to the input CSV file.
    #[arg(long)]
    input: PathBuf,

    /// The transform to apply: returns, cumulative-return, wealth,
    /// wealth-reverse, drawdown, drawdown-amount, moving-average, std-dev,
    /// volatility, ewma, band, lag.
    #[arg(long)]
    name: String,

    /// Fixed window size; omit for expanding windows where applicable.
    #[arg(long)]
    window: Option<usize>,

    /// Final scalar multiplier applied to the output; 1 leaves it untouched.
    #[arg(long, default_value = "1")]
    scalar: Decimal,

    /// Band width multiplier (for "band"; negative gives the lower band).
    #[arg(long, default_value = "2")]
    k: Decimal,

    /// Target value for the wealth transforms.
    #[arg(long, default_value = "1000")]
    target: Decimal,

    /// Signed lag in days (for "lag").
    #[arg(long, default_value_t = 0)]
    days: i64,

    /// Count only weekdays when lagging.
    #[arg(long)]
    weekdays: bool,

    /// Use sample (n - 1) instead of population statistics.
    #[arg(long)]
    sample: bool,

    /// Restrict to weekday observations before computing volatility.
    #[arg(long)]
    align_weekdays: bool,

    /// Emit JSON instead of a table.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Transform Command Logic
// ==============================================================================

fn handle_transform(args: TransformArgs) -> anyhow::Result<()> {
    let series = load_series(&args.input)?;
    tracing::info!(points = series.len(), "loaded input series");

    let classification = if args.sample {
        Classification::Sample
    } else {
        Classification::Population
    };
    let window_spec = args
        .window
        .map(WindowSpec::Fixed)
        .unwrap_or(WindowSpec::Expanding);
    let lag_mode = if args.weekdays {
        LagDaySelection::Weekday
    } else {
        LagDaySelection::AnyDay
    };

    let output = match args.name.as_str() {
        "returns" => observation_returns(&series)?,
        "cumulative-return" => cumulative_return(&series)?,
        "wealth" => wealth(&series, args.target)?,
        "wealth-reverse" => wealth_reverse(&series, args.target)?,
        "drawdown" => drawdown_percentage(&series)?,
        "drawdown-amount" => drawdown_amount(&series)?,
        "moving-average" => moving_average(&series, required_window(&args)?)?,
        "std-dev" => standard_deviation(&series, window_spec, classification)?,
        "volatility" => {
            annualized_volatility(&series, window_spec, classification, args.align_weekdays)?
        }
        "ewma" => ewma(&series, window_spec)?,
        "band" => {
            standard_deviation_band(&series, required_window(&args)?, args.k, classification)?
        }
        "lag" => calendar_lag(&series, args.days, lag_mode)?,
        // Unknown names fail fast; there is no identity fallback.
        other => return Err(EngineError::UnsupportedTransformation(other.to_string()).into()),
    };
    let output = apply_scalar(output, args.scalar)?;

    if args.json {
        print_json(&output)?;
    } else {
        print_table(&output);
    }
    Ok(())
}

/// The CLI-level scalar stage, routed through the dispatcher so a scalar
/// of one stays an exact copy.
fn apply_scalar(
    series: Series<NaiveDate, Observation>,
    scalar: Decimal,
) -> anyhow::Result<Series<NaiveDate, Observation>> {
    if scalar == Decimal::ONE {
        return Ok(series);
    }
    let identity = Transformation::point(|r: &Observation| Ok(*r));
    let config = TransformConfig::default().with_scalar(scalar);
    Ok(dispatch(&series, &identity, &config)?)
}

fn required_window(args: &TransformArgs) -> anyhow::Result<usize> {
    args.window
        .with_context(|| format!("transform '{}' requires --window", args.name))
}

/// Parses `YYYY-MM-DD,value` lines. Blank lines and `#` comments are
/// skipped; duplicate dates are rejected by the functional series.
fn load_series(path: &Path) -> anyhow::Result<Series<NaiveDate, Observation>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut series = Series::new();
    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (date, value) = line
            .split_once(',')
            .with_context(|| format!("line {}: expected `date,value`", number + 1))?;
        let date = NaiveDate::from_str(date.trim())
            .with_context(|| format!("line {}: invalid date `{}`", number + 1, date.trim()))?;
        let value = Decimal::from_str(value.trim())
            .with_context(|| format!("line {}: invalid decimal `{}`", number + 1, value.trim()))?;

        series.insert(date, Observation::new(value))?;
    }
    Ok(series)
}

fn print_table(series: &Series<NaiveDate, Observation>) {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Value", "Rolled", "Synthetic"]);

    for (date, record) in series.iter() {
        let value = record
            .value()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        let provenance = record.provenance();
        table.add_row(vec![
            date.to_string(),
            value,
            provenance.is_rolled.to_string(),
            provenance.is_synthetic.to_string(),
        ]);
    }

    println!("{table}");
}

fn print_json(series: &Series<NaiveDate, Observation>) -> anyhow::Result<()> {
    let rows: Vec<serde_json::Value> = series
        .iter()
        .map(|(date, record)| {
            serde_json::json!({
                "date": date.to_string(),
                "value": record.value().map(|v| v.to_string()),
                "is_rolled": record.provenance().is_rolled,
                "is_synthetic": record.provenance().is_synthetic,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
