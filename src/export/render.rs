// src/export/render.rs

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::matrix::CompletionMatrix;
use crate::models::completion::CompletionResponse;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Minimal CSV writer: comma separated, CRLF terminated, fields quoted only
/// when they contain a comma, a quote or a line break.
#[derive(Debug, Default)]
struct CsvWriter {
    buf: String,
}

impl CsvWriter {
    fn write_record<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            self.buf.push_str(&escape(field.as_ref()));
        }
        self.buf.push_str("\r\n");
    }

    fn into_inner(self) -> String {
        self.buf
    }
}

fn escape(field: &str) -> Cow<'_, str> {
    if !field.contains([',', '"', '\n', '\r']) {
        return Cow::Borrowed(field);
    }

    let mut out = String::with_capacity(field.len() + 2);
    out.push('"');
    for ch in field.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
    Cow::Owned(out)
}

/// Formats a stored ISO-8601 timestamp as `YYYY-MM-DD HH:MM`.
///
/// Offsets are kept as written (`Z` is UTC) and offset-less values are taken
/// as-is. Anything unparseable comes back unchanged.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY_FORMAT).to_string();
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return dt.format(DISPLAY_FORMAT).to_string();
        }
    }

    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return dt.format(DISPLAY_FORMAT).to_string();
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return format!("{} 00:00", date.format("%Y-%m-%d"));
    }

    raw.to_string()
}

/// Renders the class-wide report: one row per student, one column per
/// exercise, followed by a summary block.
pub fn render_class_report(matrix: &CompletionMatrix) -> String {
    let mut csv = CsvWriter::default();

    let header = ["Student Name", "Email"]
        .into_iter()
        .chain(matrix.columns.iter().map(String::as_str))
        .chain(["Total Completed", "Completion Rate"]);
    csv.write_record(header);

    for row in &matrix.rows {
        let mut record: Vec<String> = Vec::with_capacity(matrix.columns.len() + 4);
        record.push(row.name.clone());
        record.push(row.email.clone());
        for exercise_name in &matrix.columns {
            record.push(row.completed_at(exercise_name).map(format_timestamp).unwrap_or_default());
        }
        record.push(format!("{}/{}", row.completed_count, matrix.total_exercises));
        record.push(row.completion_rate.clone());
        csv.write_record(record);
    }

    csv.write_record(std::iter::empty::<&str>());
    csv.write_record(["Summary Statistics"]);
    csv.write_record(["Total Students".to_string(), matrix.total_students.to_string()]);
    csv.write_record(["Total Exercises".to_string(), matrix.total_exercises.to_string()]);

    csv.into_inner()
}

/// Renders the completions of a single exercise in stored order.
pub fn render_exercise_report(completions: &[CompletionResponse]) -> String {
    let mut csv = CsvWriter::default();
    csv.write_record(["Student Name", "Email", "Completed At"]);

    for completion in completions {
        csv.write_record([
            completion.student_name.as_str(),
            completion.student_email.as_str(),
            completion.completed_at.as_str(),
        ]);
    }

    csv.into_inner()
}
