// Tabular and JSON sinks for change reports.

use crate::batch::CaseOutcome;
use crate::core_modules::change_analyzer::ChangeReport;
use crate::error::CaseError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const CSV_HEADER: &str = "change_id,pixels";

/// Writes one `change_id,pixels` row per change, after a header row.
pub fn write_changes_csv<W: Write>(mut writer: W, report: &ChangeReport) -> io::Result<()> {
    writeln!(writer, "{CSV_HEADER}")?;
    for change in report.changes() {
        writeln!(writer, "{},{}", change.change_id, change.pixels)?;
    }
    writer.flush()
}

pub fn save_changes_csv(path: &Path, report: &ChangeReport) -> Result<(), CaseError> {
    let file = BufWriter::new(File::create(path)?);
    write_changes_csv(file, report)?;
    Ok(())
}

/// Writes a pretty-printed JSON array with one entry per processed test case.
pub fn write_summary_json<W: Write>(writer: W, outcomes: &[CaseOutcome]) -> Result<(), CaseError> {
    serde_json::to_writer_pretty(writer, outcomes)?;
    Ok(())
}

pub fn save_summary_json(path: &Path, outcomes: &[CaseOutcome]) -> Result<(), CaseError> {
    let mut file = BufWriter::new(File::create(path)?);
    write_summary_json(&mut file, outcomes)?;
    file.flush()?;
    Ok(())
}
