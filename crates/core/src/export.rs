//! Client-side export of loaded records to JSON or CSV.

use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::entity::Entity;
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match *self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(CoreError::UnknownExportFormat(other.to_owned())),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[must_use]
pub fn default_export_file_name(entity: Entity, format: ExportFormat) -> String {
    format!("{entity}-export.{}", format.extension())
}

/// Serialize records in the requested format.
///
/// # Errors
/// Returns an error if a record cannot be serialized.
pub fn export_records<T: Serialize>(records: &[T], format: ExportFormat) -> Result<String, CoreError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        ExportFormat::Csv => {
            let rows = records.iter().map(serde_json::to_value).collect::<Result<Vec<_>, _>>()?;
            Ok(to_csv(&rows))
        },
    }
}

/// Render JSON objects as CSV. The header is the union of top-level keys in
/// first-seen order (each object contributes its keys in map order); non-object
/// rows occupy a single `value` column.
#[must_use]
pub fn to_csv(rows: &[Value]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        match row {
            Value::Object(map) => {
                for key in map.keys() {
                    if !columns.iter().any(|c| c == key) {
                        columns.push(key.clone());
                    }
                }
            },
            _ => {
                if !columns.iter().any(|c| c == "value") {
                    columns.push("value".to_owned());
                }
            },
        }
    }

    let mut out = String::new();
    push_line(&mut out, columns.iter().map(String::as_str).map(escape_field));
    for row in rows {
        let cells = columns.iter().map(|col| {
            let cell = match row {
                Value::Object(map) => map.get(col).map(cell_text).unwrap_or_default(),
                other if col == "value" => cell_text(other),
                _ => String::new(),
            };
            escape_field(&cell)
        });
        push_line(&mut out, cells);
    }
    out
}

fn push_line(out: &mut String, cells: impl Iterator<Item = String>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&cell);
    }
    out.push('\n');
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        let mut quoted = String::with_capacity(field.len() + 2);
        quoted.push('"');
        for ch in field.chars() {
            if ch == '"' {
                quoted.push('"');
            }
            quoted.push(ch);
        }
        quoted.push('"');
        quoted
    } else {
        field.to_owned()
    }
}
