//! CSV/JSON export renderings of equipment listings.
//!
//! # Responsibility
//! - Render an already-selected sequence of entries; never re-query.
//!
//! # Invariants
//! - CSV: header row first, UTF-8, `,` delimiter, quoting only when needed,
//!   `\n` record terminator.
//! - JSON: 4-space pretty print, non-ASCII characters left unescaped.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;

use crate::view::{format_id, format_timestamp, EquipmentEntry, EquipmentView};

/// Employee column label for unassigned equipment.
pub const UNASSIGNED_LABEL: &str = "Non assigné";

const CSV_HEADER: [&str; 7] = [
    "ID",
    "Nom",
    "Catégorie",
    "Numéro",
    "Description",
    "Créé le",
    "Assigné à",
];

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
        }
    }

    /// Download file name offered to callers.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Csv => "equipments.csv",
            Self::Json => "equipments.json",
        }
    }

    pub fn render(self, entries: &[EquipmentEntry]) -> Result<Vec<u8>, ExportError> {
        match self {
            Self::Csv => export_csv(entries),
            Self::Json => export_json(entries),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Export rendering failures.
#[derive(Debug)]
pub enum ExportError {
    UnsupportedFormat(String),
    Csv(csv::Error),
    Json(serde_json::Error),
    Io(std::io::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormat(value) => write!(f, "unsupported export format `{value}`"),
            Self::Csv(err) => write!(f, "csv export failed: {err}"),
            Self::Json(err) => write!(f, "json export failed: {err}"),
            Self::Io(err) => write!(f, "export buffer failed: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnsupportedFormat(_) => None,
            Self::Csv(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Renders entries as CSV with the employee shown as "first last".
pub fn export_csv(entries: &[EquipmentEntry]) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .delimiter(b',')
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for entry in entries {
        let equipment = &entry.equipment;
        let assigned_to = entry
            .employee
            .as_ref()
            .map_or_else(|| UNASSIGNED_LABEL.to_string(), |employee| employee.full_name());

        writer.write_record([
            format_id(equipment.id),
            equipment.name.clone().unwrap_or_default(),
            equipment.category.clone().unwrap_or_default(),
            equipment.number.clone(),
            equipment.description.clone(),
            format_timestamp(equipment.created_at),
            assigned_to,
        ])?;
    }

    writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))
}

/// Renders entries as a pretty-printed JSON array of read projections.
pub fn export_json(entries: &[EquipmentEntry]) -> Result<Vec<u8>, ExportError> {
    let views = entries.iter().map(EquipmentView::from).collect::<Vec<_>>();

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    views.serialize(&mut serializer)?;
    Ok(buffer)
}
