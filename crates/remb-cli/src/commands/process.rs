//! Process command - extract care records from a single statement.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use remb_core::models::config::RembConfig;
use remb_core::statement::rules::format_amount;
use remb_core::{CareRecord, Extraction, FormatHint, JsonLinesStore, Outcome, RecordStore};

use super::{build_pipeline, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input statement (text or PDF)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// How to read the input (default: guess from extension and content)
    #[arg(long, value_enum, default_value = "auto")]
    input_format: InputFormat,

    /// Append extracted records to the record store
    #[arg(long)]
    save: bool,

    /// Record store file (implies --save)
    #[arg(long)]
    store: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum InputFormat {
    /// Guess from the file
    Auto,
    /// UTF-8 text
    Text,
    /// PDF with a text layer
    Pdf,
}

/// Resolve the decoding hint for `path`.
pub fn format_hint(input_format: InputFormat, path: &std::path::Path) -> FormatHint {
    match input_format {
        InputFormat::Auto => FormatHint::from_path(path),
        InputFormat::Text => FormatHint::Text,
        InputFormat::Pdf => FormatHint::Pdf,
    }
}

/// Open the store selected by `--store`/`--save`, if any.
pub fn open_store(
    save: bool,
    store: Option<&PathBuf>,
    config: &RembConfig,
) -> anyhow::Result<Option<JsonLinesStore>> {
    let path = match (store, save) {
        (Some(path), _) => path.clone(),
        (None, true) => config.store.path.clone(),
        (None, false) => return Ok(None),
    };
    Ok(Some(JsonLinesStore::open(path)?))
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pipeline = build_pipeline(&config)?;
    let data = fs::read(&args.input)?;
    let hint = format_hint(args.input_format, &args.input);
    let extraction = pipeline.extract_bytes(&data, hint)?;

    let output = format_extraction(&extraction, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    report_outcome(&extraction);

    if let Some(mut store) = open_store(args.save, args.store.as_ref(), &config)? {
        let ids = store.append(&extraction.records)?;
        eprintln!(
            "{} Stored {} records in {}",
            style("✓").green(),
            ids.len(),
            store.path().display()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    if config.extraction.fail_on_partial && extraction.failure_count() > 0 {
        anyhow::bail!("{} records could not be parsed", extraction.failure_count());
    }

    Ok(())
}

/// Print diagnostics about dropped records to stderr.
pub fn report_outcome(extraction: &Extraction) {
    match extraction.outcome() {
        Outcome::NoMatches => {
            eprintln!(
                "{} No reimbursement records found in this document.",
                style("ℹ").blue()
            );
        }
        Outcome::Complete => {}
        Outcome::Partial => {
            for failure in &extraction.failures {
                eprintln!(
                    "{} Record {} could not be parsed: {}",
                    style("!").yellow(),
                    failure.index + 1,
                    failure.error
                );
            }
        }
    }
}

pub fn format_extraction(extraction: &Extraction, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(extraction)?),
        OutputFormat::Csv => format_csv(&extraction.records),
        OutputFormat::Text => Ok(format_text(extraction)),
    }
}

pub fn format_csv(records: &[CareRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "care_date",
        "care_type",
        "care_code",
        "paid_amount",
        "reimbursement_base",
        "reimbursed_amount",
        "complementary_rate",
        "complementary_amount",
    ])?;

    for record in records {
        wtr.write_record([
            &record.care_date.to_string(),
            &record.care_type,
            &record.care_code,
            &record.paid_amount.to_string(),
            &record.reimbursement_base.to_string(),
            &record.reimbursed_amount.to_string(),
            &record.complementary_rate,
            &record.complementary_amount.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(extraction: &Extraction) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Records: {} ({} failed)\n",
        extraction.records.len(),
        extraction.failure_count()
    ));
    if let Some(variant) = extraction.variant {
        output.push_str(&format!("Layout: {}\n", variant));
    }

    for record in &extraction.records {
        output.push('\n');
        output.push_str(&format!(
            "{}  {} ({})\n",
            record.care_date.format("%d/%m/%Y"),
            record.care_type,
            record.care_code
        ));
        output.push_str(&format!(
            "  Paid: {}  Base: {}  Reimbursed: {}\n",
            format_amount(record.paid_amount),
            format_amount(record.reimbursement_base),
            format_amount(record.reimbursed_amount)
        ));
        output.push_str(&format!(
            "  Complementary: {} at {}\n",
            format_amount(record.complementary_amount),
            record.complementary_rate
        ));
    }

    output
}
