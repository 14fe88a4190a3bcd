//! The output table: one row per processed segment.
//!
//! Column names and order are a stable contract — the correlation notebooks
//! and dashboards downstream read them by name.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::indices::IndexSet;
use crate::metadata::RecordingMetadata;

/// CSV header, exactly as consumers expect it.
pub const CSV_HEADER: &str =
    "Filename,Segment,Year,Month,Date,Hour,Minute,Second,ADI,ACI,AEI,NDSI,MFC,CLS";

/// One output row.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    pub filename: String,
    /// 1-based segment position within the recording.
    pub segment: usize,
    pub year: String,
    pub month: String,
    pub day: String,
    pub hour: u32,
    pub minute: u32,
    /// Elapsed seconds from the start of the recording to this segment.
    pub second: f64,
    pub indices: IndexSet,
}

impl IndexRecord {
    pub fn new(
        filename: &str,
        segment: usize,
        meta: &RecordingMetadata,
        second: f64,
        indices: IndexSet,
    ) -> Self {
        Self {
            filename: filename.to_owned(),
            segment,
            year: meta.year.clone(),
            month: meta.month.clone(),
            day: meta.day.clone(),
            hour: meta.hour,
            minute: meta.minute,
            second,
            indices,
        }
    }

    fn write_csv_row(&self, out: &mut impl Write) -> std::io::Result<()> {
        let ix = &self.indices;
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            csv_field(&self.filename),
            self.segment,
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            ix.adi,
            ix.aci,
            ix.aei,
            ix.ndsi,
            ix.mfc,
            ix.cls,
        )
    }
}

/// Sort rows into the canonical (filename, segment) order.
///
/// Workers finish in scheduling order; sorting here makes batch output
/// reproducible regardless of worker count.
pub fn sort_rows(rows: &mut [IndexRecord]) {
    rows.sort_by(|a, b| {
        a.filename
            .cmp(&b.filename)
            .then(a.segment.cmp(&b.segment))
    });
}

/// Write header + rows to `path` in one flush.
pub fn write_csv(path: &Path, rows: &[IndexRecord]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{CSV_HEADER}")?;
    for row in rows {
        row.write_csv_row(&mut out)?;
    }
    out.flush()?;
    Ok(())
}

/// Quote a field only when it needs it.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}
