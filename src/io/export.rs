//! Overstay export - writes the overstay report as CSV
//!
//! Columns: name, gate, host, overstayMinutes, severity. Rows are in report
//! order (most severe first). The file is replaced on every export.

use crate::services::overstay_report::{OverstayReport, CSV_HEADER};
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Leading characters a spreadsheet would evaluate as a formula
const FORMULA_PREFIXES: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

/// Neutralize formula prefixes, then quote a field if it contains a
/// delimiter, quote or line break
fn escape_field(field: &str) -> String {
    let field = if field.starts_with(FORMULA_PREFIXES) {
        format!("'{field}")
    } else {
        field.to_string()
    };

    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field
    }
}

fn write_row<W: Write, S: AsRef<str>>(out: &mut W, fields: &[S]) -> std::io::Result<()> {
    let line: Vec<String> = fields.iter().map(|f| escape_field(f.as_ref())).collect();
    writeln!(out, "{}", line.join(","))
}

/// Write the report as CSV to any writer. Returns the number of data rows.
pub fn write_csv_to<W: Write>(out: &mut W, report: &OverstayReport) -> std::io::Result<usize> {
    write_row(out, &CSV_HEADER[..])?;
    let mut rows = 0;
    for row in report.rows() {
        write_row(out, &row[..])?;
        rows += 1;
    }
    Ok(rows)
}

/// Write the report to a CSV file, creating parent directories
pub fn write_csv<P: AsRef<Path>>(path: P, report: &OverstayReport) -> anyhow::Result<usize> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create export file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let rows = write_csv_to(&mut out, report)
        .with_context(|| format!("Failed to write export file {}", path.display()))?;
    out.flush().with_context(|| format!("Failed to flush export file {}", path.display()))?;

    let counts = report.severity_counts();
    info!(
        file = %path.display(),
        rows = rows,
        critical = counts.critical,
        high = counts.high,
        medium = counts.medium,
        "overstay_exported"
    );
    Ok(rows)
}
