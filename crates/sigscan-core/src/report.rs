//! Selecting checks by severity for reporting.

use std::fmt;

use serde::Serialize;

use crate::signatures::SignatureSet;

/// One reported check with the endpoints of its plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow<'a> {
    pub endpoints: &'a [String],
    pub check_name: &'a str,
    pub severity: &'a str,
    pub description: &'a str,
}

impl SignatureSet {
    /// Every check whose severity label equals `severity` exactly, in
    /// document order.
    pub fn report_rows<'a>(&'a self, severity: &str) -> Vec<ReportRow<'a>> {
        self.checks()
            .filter(|(_, check)| check.severity() == severity)
            .map(|(plugin, check)| ReportRow {
                endpoints: plugin.endpoints(),
                check_name: check.name(),
                severity: check.severity(),
                description: check.description(),
            })
            .collect()
    }
}

/// Plain-text table of report rows with a `Total Checks` footer.
pub struct ReportTable<'a> {
    rows: Vec<ReportRow<'a>>,
}

const HEADER: [&str; 4] = ["ENDPOINT", "CHECK NAME", "SEVERITY", "DESCRIPTION"];

impl<'a> ReportTable<'a> {
    pub fn new(rows: Vec<ReportRow<'a>>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn cells(&self) -> Vec<[String; 4]> {
        self.rows
            .iter()
            .map(|row| {
                [
                    format!("[{}]", row.endpoints.join(" ")),
                    row.check_name.to_string(),
                    row.severity.to_string(),
                    row.description.to_string(),
                ]
            })
            .collect()
    }
}

impl fmt::Display for ReportTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = self.cells();
        let footer = [
            String::new(),
            String::new(),
            "TOTAL CHECKS".to_string(),
            self.rows.len().to_string(),
        ];

        let mut widths = HEADER.map(str::len);
        for row in cells.iter().chain(std::iter::once(&footer)) {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let separator = widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+");
        let separator = format!("+{separator}+");

        let write_row = |f: &mut fmt::Formatter<'_>, row: &[String]| -> fmt::Result {
            write!(f, "|")?;
            for (cell, width) in row.iter().zip(widths) {
                write!(f, " {cell:<width$} |")?;
            }
            writeln!(f)
        };

        writeln!(f, "{separator}")?;
        write_row(f, &HEADER.map(String::from))?;
        writeln!(f, "{separator}")?;
        for row in &cells {
            write_row(f, row)?;
        }
        writeln!(f, "{separator}")?;
        write_row(f, &footer)?;
        writeln!(f, "{separator}")
    }
}
