// Inventory rendering: rows, boxed table, CSV and JSON
pub mod csv;
pub mod json;
pub mod rows;
pub mod table;

use std::fmt;

use crate::error::AppError;
use crate::hardware::types::HardwareSnapshot;

pub use json::render_json;
pub use rows::build_rows;

pub const ACCEPTED_FORMATS: &str = "Accepted formats: json, csv, std";

/// Value of the `-f` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSelector {
    Json,
    Csv,
    Std,
    Unsupported(String),
}

impl FormatSelector {
    /// Case-sensitive; an empty selector means no format was given.
    pub fn parse(raw: &str) -> Option<Self> {
        let selector = match raw {
            "" => return None,
            "json" => FormatSelector::Json,
            "csv" => FormatSelector::Csv,
            "std" => FormatSelector::Std,
            other => FormatSelector::Unsupported(other.to_string()),
        };
        Some(selector)
    }
}

impl fmt::Display for FormatSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatSelector::Json => f.write_str("json"),
            FormatSelector::Csv => f.write_str("csv"),
            FormatSelector::Std => f.write_str("std"),
            FormatSelector::Unsupported(raw) => f.write_str(raw),
        }
    }
}

/// Render a snapshot in the selected format. Rows are built fresh on every
/// call.
pub fn render(snapshot: &HardwareSnapshot, format: &FormatSelector) -> Result<String, AppError> {
    let output = match format {
        FormatSelector::Json => render_json(snapshot)?,
        FormatSelector::Csv => csv::render_csv(&build_rows(snapshot)),
        FormatSelector::Std => table::render_table(&build_rows(snapshot)),
        FormatSelector::Unsupported(_) => ACCEPTED_FORMATS.to_string(),
    };
    Ok(output)
}
