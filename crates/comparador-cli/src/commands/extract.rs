//! Extract command - pull consumption data out of a single bill.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info, warn};

use comparador_core::invoice::rules::format_spanish_amount;
use comparador_core::models::config::ComparadorConfig;
use comparador_core::pdf::{PdfExtractor, PdfProcessor, PdfType};
use comparador_core::{InvoiceParser, InvoiceRecord, RuleInvoiceParser};

use super::{load_config, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input bill (PDF or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print fields that fell back to their default
    #[arg(long)]
    show_warnings: bool,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let text = read_bill_text(&args.input, &config)?;
    let parser = RuleInvoiceParser::from_config(&config.extraction)?;
    let result = parser.parse(&text)?;

    let output = format_record(&result.record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_warnings && !result.warnings.is_empty() {
        eprintln!("{}", style("Defaults applied:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Text of a bill: PDF text extraction, or the file itself for anything else.
pub fn read_bill_text(path: &Path, config: &ComparadorConfig) -> anyhow::Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let text = match extension.as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            let mut extractor = PdfExtractor::new();
            extractor.load(&data)?;
            debug!("PDF has {} pages", extractor.page_count());

            match extractor.analyze(config.pdf.min_text_length) {
                PdfType::Empty => anyhow::bail!("PDF appears to be empty"),
                PdfType::Scanned => {
                    warn!("PDF has little embedded text; it may be a scanned bill");
                }
                PdfType::Text => {}
            }

            extractor.extract_text()?
        }
        _ => fs::read_to_string(path)?,
    };

    if text.trim().is_empty() {
        anyhow::bail!("No text could be extracted from {}", path.display());
    }

    Ok(text)
}

/// Column names of the CSV output, shared with the batch summary.
pub const CSV_HEADER: [&str; 9] = [
    "dias_factura",
    "potencia_punta",
    "potencia_valle",
    "energia_punta",
    "energia_llano",
    "energia_valle",
    "factura_total",
    "factura_impuesto",
    "factura_alquiler",
];

/// One CSV row for a record, in [`CSV_HEADER`] order.
pub fn csv_row(record: &InvoiceRecord) -> [String; 9] {
    [
        record.dias_factura().to_string(),
        record.potencia().punta.to_string(),
        record.potencia().valle.to_string(),
        record.energia().punta.to_string(),
        record.energia().llano.to_string(),
        record.energia().valle.to_string(),
        record.factura_total().to_string(),
        record.factura_impuesto().to_string(),
        record.factura_alquiler().to_string(),
    ]
}

pub fn format_record(record: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;
    wtr.write_record(csv_row(record))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Días facturados: {}\n", record.dias_factura()));
    output.push('\n');

    output.push_str("Potencia contratada:\n");
    output.push_str(&format!("  Punta: {} kW\n", record.potencia().punta));
    output.push_str(&format!("  Valle: {} kW\n", record.potencia().valle));
    output.push('\n');

    output.push_str("Energía consumida:\n");
    output.push_str(&format!("  Punta: {} kWh\n", record.energia().punta));
    output.push_str(&format!("  Llano: {} kWh\n", record.energia().llano));
    output.push_str(&format!("  Valle: {} kWh\n", record.energia().valle));
    output.push('\n');

    output.push_str("Importes:\n");
    output.push_str(&format!("  IVA:      {} €\n", format_spanish_amount(record.factura_impuesto())));
    output.push_str(&format!("  Alquiler: {} €\n", format_spanish_amount(record.factura_alquiler())));
    output.push_str(&format!("  Total:    {} €\n", format_spanish_amount(record.factura_total())));

    output
}
