//! Serialization of the current view into the supported export formats.

use crate::error::EngineError;
use crate::store::Row;
use crate::value::{self, CellValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Sql,
    Md,
}

impl ExportFormat {
    pub fn parse(name: &str) -> Result<Self, EngineError> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "sql" => Ok(ExportFormat::Sql),
            "md" | "markdown" => Ok(ExportFormat::Md),
            _ => Err(EngineError::UnknownFormat(name.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Sql => "sql",
            ExportFormat::Md => "md",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Sql => "application/sql",
            ExportFormat::Md => "text/markdown",
        }
    }
}

/// Render rows in the given column order.
pub fn render(
    columns: &[String],
    rows: &[&Row],
    format: ExportFormat,
) -> Result<String, EngineError> {
    match format {
        ExportFormat::Json => to_json(columns, rows),
        ExportFormat::Csv => to_csv(columns, rows),
        ExportFormat::Sql => Ok(to_sql(columns, rows)),
        ExportFormat::Md => Ok(to_md(columns, rows)),
    }
}

/// Pretty-printed array of objects. Missing cells become `null`.
fn to_json(columns: &[String], rows: &[&Row]) -> Result<String, EngineError> {
    let array: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            let object: serde_json::Map<String, serde_json::Value> = columns
                .iter()
                .map(|col| {
                    let cell = match row.get(col) {
                        Some(CellValue::Number(n)) => serde_json::Number::from_f64(*n)
                            .map(serde_json::Value::Number)
                            .unwrap_or(serde_json::Value::Null),
                        Some(CellValue::Text(s)) => serde_json::Value::String(s.clone()),
                        Some(CellValue::Missing) | None => serde_json::Value::Null,
                    };
                    (col.clone(), cell)
                })
                .collect();
            serde_json::Value::Object(object)
        })
        .collect();

    serde_json::to_string_pretty(&array).map_err(|e| EngineError::Export(e.to_string()))
}

/// Delimited text through the csv writer; missing cells become empty fields.
fn to_csv(columns: &[String], rows: &[&Row]) -> Result<String, EngineError> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    writer
        .write_record(columns)
        .map_err(|e| EngineError::Export(e.to_string()))?;
    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|col| {
                row.get(col)
                    .map(|v| v.display().into_owned())
                    .unwrap_or_default()
            })
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| EngineError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| EngineError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| EngineError::Export(e.to_string()))
}

/// One INSERT statement per row. Text is single-quote-escaped, missing
/// becomes NULL.
fn to_sql(columns: &[String], rows: &[&Row]) -> String {
    let column_list = columns.join(", ");
    let mut out = String::new();
    for row in rows {
        let values: Vec<String> = columns
            .iter()
            .map(|col| match row.get(col) {
                Some(CellValue::Number(n)) => value::format_number(*n),
                Some(CellValue::Text(s)) => format!("'{}'", s.replace('\'', "''")),
                Some(CellValue::Missing) | None => "NULL".to_string(),
            })
            .collect();
        out.push_str(&format!(
            "INSERT INTO dataset ({}) VALUES ({});\n",
            column_list,
            values.join(", ")
        ));
    }
    out
}

/// Pipe-delimited table with header and divider rows.
fn to_md(columns: &[String], rows: &[&Row]) -> String {
    let mut out = String::new();
    out.push_str(&format!("| {} |\n", columns.join(" | ")));
    out.push_str(&format!(
        "| {} |\n",
        columns.iter().map(|_| "---").collect::<Vec<_>>().join(" | ")
    ));
    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|col| {
                row.get(col)
                    .map(|v| v.display().into_owned())
                    .unwrap_or_default()
            })
            .collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::RowId;
    use std::collections::HashMap;

    fn rows() -> (Vec<String>, Vec<Row>) {
        let columns = vec!["name".to_string(), "score".to_string()];
        let mut a = HashMap::new();
        a.insert("name".to_string(), CellValue::Text("Ada".into()));
        a.insert("score".to_string(), CellValue::Number(95.0));
        let mut b = HashMap::new();
        b.insert("name".to_string(), CellValue::Text("O'Brien".into()));
        b.insert("score".to_string(), CellValue::Missing);
        (
            columns,
            vec![Row::new(RowId::from_raw(1), a), Row::new(RowId::from_raw(2), b)],
        )
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(ExportFormat::parse("JSON").unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::parse("markdown").unwrap(), ExportFormat::Md);
        assert!(ExportFormat::parse("xlsx").is_err());
        assert_eq!(ExportFormat::Csv.mime_type(), "text/csv");
    }

    #[test]
    fn test_json_export() {
        let (columns, rows) = rows();
        let refs: Vec<&Row> = rows.iter().collect();
        let out = render(&columns, &refs, ExportFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["name"], "Ada");
        assert_eq!(parsed[0]["score"], 95.0);
        assert_eq!(parsed[1]["score"], serde_json::Value::Null);
    }

    #[test]
    fn test_csv_export() {
        let (columns, rows) = rows();
        let refs: Vec<&Row> = rows.iter().collect();
        let out = render(&columns, &refs, ExportFormat::Csv).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("name,score"));
        assert_eq!(lines.next(), Some("Ada,95"));
        assert_eq!(lines.next(), Some("O'Brien,"));
    }

    #[test]
    fn test_sql_export_escapes_quotes() {
        let (columns, rows) = rows();
        let refs: Vec<&Row> = rows.iter().collect();
        let out = render(&columns, &refs, ExportFormat::Sql).unwrap();
        assert!(out.contains("INSERT INTO dataset (name, score) VALUES ('Ada', 95);"));
        assert!(out.contains("VALUES ('O''Brien', NULL);"));
    }

    #[test]
    fn test_md_export() {
        let (columns, rows) = rows();
        let refs: Vec<&Row> = rows.iter().collect();
        let out = render(&columns, &refs, ExportFormat::Md).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("| name | score |"));
        assert_eq!(lines.next(), Some("| --- | --- |"));
        assert_eq!(lines.next(), Some("| Ada | 95 |"));
        assert_eq!(lines.next(), Some("| O'Brien |  |"));
    }
}
