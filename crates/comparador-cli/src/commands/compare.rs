//! Compare command - rank the tariffs of a rate catalog for a consumption.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::{debug, info};

use comparador_core::invoice::rules::format_spanish_amount;
use comparador_core::{
    compare_tariffs, ComparisonReport, ConsumptionInput, CsvSource, InvoiceParser,
    RateOptions, RuleInvoiceParser,
};

use super::extract::read_bill_text;
use super::{load_config, OutputFormat};

/// Arguments for the compare command.
#[derive(Args)]
pub struct CompareArgs {
    /// Rate catalog CSV (default: `rates.source` from the config)
    #[arg(short, long)]
    rates: Option<PathBuf>,

    /// Bill to take the consumption from (PDF or plain text)
    #[arg(short, long, required_unless_present = "consumption", conflicts_with = "consumption")]
    invoice: Option<PathBuf>,

    /// Consumption as a JSON file
    #[arg(long)]
    consumption: Option<PathBuf>,

    /// Ignore tax and rental; rank by variable cost only
    #[arg(long)]
    no_fixed: bool,

    /// Only show the N cheapest tariffs
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub fn run(args: CompareArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let mut consumption = match (&args.invoice, &args.consumption) {
        (Some(invoice), _) => {
            info!("Reading consumption from bill {}", invoice.display());
            let text = read_bill_text(invoice, &config)?;
            let parser = RuleInvoiceParser::from_config(&config.extraction)?;
            ConsumptionInput::from(&parser.parse(&text)?.record)
        }
        (None, Some(path)) => {
            let content = fs::read_to_string(path)?;
            serde_json::from_str::<ConsumptionInput>(&content).map_err(|e| {
                anyhow::anyhow!("Invalid consumption file {}: {}", path.display(), e)
            })?
        }
        (None, None) => anyhow::bail!("Either --invoice or --consumption is required"),
    };

    if args.no_fixed {
        consumption = consumption.without_fixed_costs();
    }
    debug!("Consumption: {:?}", consumption);

    let rates_path = args.rates.clone().unwrap_or_else(|| config.rates.source.clone());
    if !rates_path.exists() {
        anyhow::bail!("Rate catalog not found: {}", rates_path.display());
    }

    let source = CsvSource::from_path(&rates_path)
        .with_delimiter(config.rates.delimiter)?
        .with_header_row(config.rates.has_header_row);
    let options = RateOptions::from(&config.rates);

    let report = compare_tariffs(&consumption, &source, &options)?;

    let output = match args.format {
        OutputFormat::Json => format_json(&report, args.top)?,
        OutputFormat::Csv => format_csv(&report, args.top)?,
        OutputFormat::Text => format_text(&report, args.top),
    };

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

    Ok(())
}

fn limit(report: &ComparisonReport, top: Option<usize>) -> usize {
    top.map_or(report.len(), |n| n.min(report.len()))
}

fn format_json(report: &ComparisonReport, top: Option<usize>) -> anyhow::Result<String> {
    let entries = &report.entries()[..limit(report, top)];
    Ok(serde_json::to_string_pretty(entries)?)
}

fn format_csv(report: &ComparisonReport, top: Option<usize>) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "posicion",
        "tarifa",
        "coste_potencia",
        "coste_energia",
        "coste_variable",
        "coste_fijo",
        "coste_total",
        "enlace",
    ])?;

    for (i, entry) in report.iter().take(limit(report, top)).enumerate() {
        wtr.write_record([
            &(i + 1).to_string(),
            &entry.tarifa,
            &entry.coste_potencia.to_string(),
            &entry.coste_energia.to_string(),
            &entry.coste_variable.to_string(),
            &entry.coste_fijo.map(|c| c.to_string()).unwrap_or_default(),
            &entry.coste_total.to_string(),
            &entry.enlace,
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &ComparisonReport, top: Option<usize>) -> String {
    let mut output = String::new();

    let basis = if report.fixed_costs_applied() {
        "coste total (variable + IVA + alquiler)"
    } else {
        "coste variable"
    };
    output.push_str(&format!("Tarifas ordenadas por {}:\n\n", basis));

    for (i, entry) in report.iter().take(limit(report, top)).enumerate() {
        let line = format!(
            "{:>3}. {:<30} {:>10} €",
            i + 1,
            entry.tarifa,
            format_spanish_amount(entry.coste_total)
        );
        if i == 0 {
            output.push_str(&style(line).green().bold().to_string());
        } else {
            output.push_str(&line);
        }
        output.push('\n');

        output.push_str(&format!(
            "     potencia {} € · energía {} €",
            format_spanish_amount(entry.coste_potencia),
            format_spanish_amount(entry.coste_energia)
        ));
        if let Some(fijo) = entry.coste_fijo {
            output.push_str(&format!(" · fijo {} €", format_spanish_amount(fijo)));
        }
        output.push('\n');

        if !entry.enlace.is_empty() {
            output.push_str(&format!("     {}\n", style(&entry.enlace).dim()));
        }
    }

    output
}
