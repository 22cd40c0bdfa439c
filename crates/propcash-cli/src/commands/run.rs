//! Run command implementation.
//!
//! Runs the full pipeline for one as-at date.

use anyhow::Result;
use clap::Args;

use propcash_engine::{EngineConfig, RunReport};

use crate::cli::OutputFormat;
use crate::commands::open_pipeline;
use crate::output::{print_dv01, print_header, print_success, print_table, print_warning, KeyValue};

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// As-at date (YYYY-MM-DD)
    pub as_at: String,
}

/// Executes the run command.
pub async fn execute(args: RunArgs, config: &EngineConfig, format: OutputFormat) -> Result<()> {
    let pipeline = open_pipeline(config)?;
    let report = pipeline.run(&args.as_at).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Csv => print_dv01(&report.dv01, format)?,
        OutputFormat::Table => {
            print_header(&format!("Run {} as at {}", report.run_id, report.as_at));
            print_table(&summary(&report));
            print_anomalies(&report);
            print_header("DV01");
            print_dv01(&report.dv01, format)?;
            print_success(&format!(
                "{} properties, total DV01 {:.2}",
                report.dv01.len(),
                report.total_dv01()
            ));
        }
    }
    Ok(())
}

fn summary(report: &RunReport) -> Vec<KeyValue> {
    let curve = report
        .curve_date
        .map_or_else(|| "none".to_string(), |d| d.to_string());
    vec![
        KeyValue::new("Ledger version", report.ledger_version.to_string()),
        KeyValue::new("Valuation snapshot", report.valuation_date.to_string()),
        KeyValue::new("Curve snapshot", curve),
        KeyValue::new("Contracted rows", report.contracted_rows.to_string()),
        KeyValue::new("OpEx rows injected", report.apportioned_rows.to_string()),
        KeyValue::new("DmAdj rows", report.dm_adj_rows.to_string()),
        KeyValue::new("Adjusted rows", report.adjusted_rows.to_string()),
        KeyValue::new("Contracted write", format!("{:?}", report.contracted_write)),
        KeyValue::new("Adjusted write", format!("{:?}", report.adjusted_write)),
    ]
}

fn print_anomalies(report: &RunReport) {
    if !report.unmapped_charge_codes.is_empty() {
        print_warning(&format!(
            "{} rows dropped for unmapped charge codes: {}",
            report.unmapped_charge_rows,
            report.unmapped_charge_codes.join(", ")
        ));
    }
    if report.incomplete_apportionments > 0 {
        print_warning(&format!(
            "{} operating-expense rows set to 0 for missing factors",
            report.incomplete_apportionments
        ));
    }
    for property in &report.unmapped_properties {
        print_warning(&format!("no discount profile for {property}"));
    }
    if report.missing_rate_rows > 0 {
        print_warning(&format!(
            "{} rows excluded from DV01 for lack of a curve rate",
            report.missing_rate_rows
        ));
    }
}
