//! Manifest serialization
//!
//! The manifest is the sole durability boundary of a run: one JSON array
//! of full experiment records, in generation order, written only after
//! every row has been simulated (or skipped).

use crate::error::Result;
use crate::experiment::Experiment;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the experiment table to `path` as a JSON array of records.
///
/// The buffer is flushed explicitly: a write error surfacing only at
/// flush time must fail the run, not vanish in the writer's `Drop`.
pub fn write_manifest(table: &[Experiment], path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, table)?;
    writer.flush()?;
    Ok(())
}
