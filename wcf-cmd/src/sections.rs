//! Sections command: compare one census section with the rest of the city.

use anyhow::Context;
use clap::Args;
use log::info;
use std::path::PathBuf;
use wcf_core::loader::parse_date;
use wcf_sections::{load_section_path, resolve_section, summarize_section, Period, SectionSummary, UsageConcentration};

#[derive(Args, Debug, Clone)]
pub struct SectionArgs {
    /// Path to a dataset CSV carrying a census section column
    #[arg(short = 'd', long)]
    pub data: PathBuf,

    /// Census section code, or a prefix of one
    #[arg(short = 's', long)]
    pub section: String,

    /// First day of the period (defaults to the first reading)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day of the period (defaults to the last reading)
    #[arg(long)]
    pub to: Option<String>,

    /// Approximate price per unit of consumption, for the savings estimate
    #[arg(long, default_value_t = 1.5)]
    pub price: f64,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn section_summary(args: &SectionArgs) -> anyhow::Result<SectionSummary> {
    let readings = load_section_path(&args.data)
        .with_context(|| format!("Failed to load dataset {}", args.data.display()))?;
    let covering = Period::covering(&readings)
        .with_context(|| format!("No section readings in {}", args.data.display()))?;
    let from = match &args.from {
        Some(s) => parse_date(s)?,
        None => covering.from,
    };
    let to = match &args.to {
        Some(s) => parse_date(s)?,
        None => covering.to,
    };
    let period = Period::new(from, to)?;
    let section = resolve_section(&readings, &args.section)?;
    info!("Summarising section {} from {} to {}", section, period.from, period.to);
    Ok(summarize_section(&readings, &section, period, args.price)?)
}

pub fn run_sections(args: &SectionArgs) -> anyhow::Result<()> {
    let summary = section_summary(args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Section:                {}", summary.section);
    println!("Period:                 {} to {}", summary.period.from, summary.period.to);
    println!("Total consumption:      {:.2}", summary.total_consumption);
    println!("Average per day:        {:.2}", summary.average_daily);
    println!("City average per day:   {:.2}", summary.city_average_daily);
    if let Some(ranking) = summary.ranking {
        if let Some(pct) = ranking.percent_vs_peers {
            let direction = if pct > 0.0 { "more" } else { "less" };
            println!("Versus other sections:  {:.1}% {}", pct.abs(), direction);
        }
        println!(
            "Citywide percentile:    {:.0} of {} sections",
            ranking.percentile, ranking.sections_ranked
        );
    }
    if !summary.usage.is_empty() {
        println!("Use types:");
        for share in &summary.usage {
            println!("  {:<10} {:>12.2}  {:>5.1}%", share.use_type, share.consumption, share.percent);
        }
    }
    match (summary.concentration, summary.usage.first()) {
        (Some(UsageConcentration::Dominant), Some(top)) => {
            println!("Most consumption ({:.0}%) is from {}.", top.percent, top.use_type)
        }
        (Some(UsageConcentration::Leading), Some(top)) => {
            println!("Top category {} accounts for {:.0}%.", top.use_type, top.percent)
        }
        (Some(UsageConcentration::Spread), _) => {
            println!("Consumption is spread across use types.")
        }
        _ => {}
    }
    println!("Savings estimate:");
    for saving in &summary.savings {
        println!(
            "  {:>2}%  {:>12.2}  EUR {:.2}",
            saving.reduction_percent, saving.volume, saving.euros
        );
    }
    Ok(())
}
