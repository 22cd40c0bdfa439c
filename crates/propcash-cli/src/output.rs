//! Output formatting utilities.

use colored::Colorize;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use propcash_core::types::Dv01Result;

use crate::cli::OutputFormat;

/// Formats and prints output based on the specified format.
pub fn print_output<T: Serialize + Tabled>(data: &[T], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            print_table(data);
            Ok(())
        }
        OutputFormat::Json => print_json(data),
        OutputFormat::Csv => print_csv(data),
    }
}

/// Prints data as a formatted table.
pub fn print_table<T: Tabled>(data: &[T]) {
    if data.is_empty() {
        println!("No results.");
        return;
    }

    let table = Table::new(data)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::left()))
        .to_string();

    println!("{table}");
}

fn print_json<T: Serialize>(data: &[T]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

fn print_csv<T: Serialize>(data: &[T]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for item in data {
        wtr.serialize(item)?;
    }
    wtr.flush()?;
    Ok(())
}

/// One property's DV01 for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct Dv01Row {
    /// Property name.
    #[tabled(rename = "Property")]
    pub property: String,
    /// Property id.
    #[tabled(rename = "ID")]
    pub property_id: String,
    /// Property code.
    #[tabled(rename = "Code")]
    pub property_code: i64,
    /// Sensitivity, two decimals.
    #[tabled(rename = "DV01")]
    pub dv01: String,
    /// Rows without a curve rate.
    #[tabled(rename = "Missing Rates")]
    pub missing_rate_rows: u32,
}

impl From<&Dv01Result> for Dv01Row {
    fn from(r: &Dv01Result) -> Self {
        Self {
            property: r.property.property_name.clone(),
            property_id: r.property.property_id.clone(),
            property_code: r.property.property_code,
            dv01: format!("{:.2}", r.sensitivity),
            missing_rate_rows: r.missing_rate_rows,
        }
    }
}

/// Prints DV01 results. JSON keeps the stored record shape.
pub fn print_dv01(results: &[Dv01Result], format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(results);
    }
    let rows: Vec<Dv01Row> = results.iter().map(Dv01Row::from).collect();
    print_output(&rows, format)
}

/// A key-value pair for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct KeyValue {
    #[tabled(rename = "Metric")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl KeyValue {
    /// Creates a new key-value pair.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Prints a header for a section.
pub fn print_header(title: &str) {
    println!("\n{}", title.bold().underline());
}

/// Prints a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Prints a warning message.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use propcash_core::types::{Date, PropertyKey};

    #[test]
    fn test_dv01_row_formatting() {
        let result = Dv01Result {
            property: PropertyKey::new("P001", 1001, "Harbour Plaza"),
            sensitivity: 12.3456,
            missing_rate_rows: 2,
            as_at_date: Date::from_ymd(2025, 6, 30).unwrap(),
        };
        let row = Dv01Row::from(&result);
        assert_eq!(row.dv01, "12.35");
        assert_eq!(row.property_code, 1001);
        assert_eq!(row.missing_rate_rows, 2);
    }
}
