// src/report.rs

use crate::model::{Outcome, ReportRow};
use std::borrow::Cow;
use std::io::{self, Write};

pub const HEADER: [&str; 6] = ["commit", "functions", "no_functions", "no_eq_functions", "verdict", "confident"];

const ABSENT: &str = "-";

/// Streams report rows as comma-separated values, flushing after every row
pub struct ReportWriter<W: Write> {
    out: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        ReportWriter { out }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        self.write_record(&HEADER.map(String::from))
    }

    pub fn write_row(&mut self, row: &ReportRow) -> io::Result<()> {
        self.write_record(&render(row))
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_record(&mut self, fields: &[String]) -> io::Result<()> {
        let line: Vec<Cow<str>> = fields.iter().map(|f| quote(f)).collect();
        writeln!(self.out, "{}", line.join(","))?;
        self.out.flush()
    }
}

/// The six report fields for one row. Absent values render as `-`.
pub fn render(row: &ReportRow) -> [String; 6] {
    let verdict = row.verdict().as_str().to_string();
    let absent = || ABSENT.to_string();
    match &row.outcome {
        Outcome::Analyzed { functions, comparison, confident } => [
            row.commit.clone(),
            join(functions),
            comparison.total_count.to_string(),
            comparison.equal_count.to_string(),
            verdict,
            python_bool(*confident),
        ],
        Outcome::LowConfidenceSkipped { functions } => [
            row.commit.clone(),
            join(functions),
            absent(),
            absent(),
            verdict,
            python_bool(false),
        ],
        Outcome::NoFunctions | Outcome::Failed => [row.commit.clone(), absent(), absent(), absent(), verdict, absent()],
    }
}

fn join<'a>(functions: impl IntoIterator<Item = &'a String>) -> String {
    functions.into_iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn python_bool(value: bool) -> String {
    let text = if value { "True" } else { "False" };
    text.to_string()
}

fn quote(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
