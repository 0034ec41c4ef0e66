//! Summary command - monthly totals from the record store.

use std::path::PathBuf;

use clap::Args;
use console::style;

use remb_core::statement::rules::format_amount;
use remb_core::{monthly_totals, JsonLinesStore, MonthlyTotal, RecordStore};

use super::load_config;

/// Arguments for the summary command.
#[derive(Args)]
pub struct SummaryArgs {
    /// Record store file (default: from config)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: super::process::OutputFormat,
}

pub async fn run(args: SummaryArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let path = args.store.unwrap_or(config.store.path);

    let store = JsonLinesStore::open(&path)?;
    let rows = store.load()?;
    if rows.is_empty() {
        eprintln!(
            "{} No records stored in {}",
            style("ℹ").blue(),
            path.display()
        );
    }

    let totals = monthly_totals(rows.iter().map(|row| &row.record))?;

    let output = match args.format {
        super::process::OutputFormat::Json => serde_json::to_string_pretty(&totals)?,
        super::process::OutputFormat::Csv => format_csv(&totals)?,
        super::process::OutputFormat::Text => format_text(&totals),
    };
    println!("{}", output);

    Ok(())
}

fn format_csv(totals: &[MonthlyTotal]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["month", "paid_amount", "reimbursed_amount", "records"])?;
    for total in totals {
        wtr.write_record([
            &total.month.to_string(),
            &total.paid_amount.to_string(),
            &total.reimbursed_amount.to_string(),
            &total.records.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(totals: &[MonthlyTotal]) -> String {
    let mut output = String::from("Month     Paid        Reimbursed  Records\n");
    for total in totals {
        output.push_str(&format!(
            "{}   {:>10}  {:>10}  {:>7}\n",
            total.month,
            format_amount(total.paid_amount),
            format_amount(total.reimbursed_amount),
            total.records
        ));
    }
    output
}
