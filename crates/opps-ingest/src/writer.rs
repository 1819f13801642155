//! Snapshot output.

use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{IngestError, Result};

fn write_records<W: Write, R: AsRef<[String]>>(writer: W, path: &Path, records: &[R]) -> Result<()> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);
    for record in records {
        writer
            .write_record(record.as_ref())
            .map_err(|source| IngestError::write(path, source))?;
    }
    writer.flush().map_err(|source| IngestError::io(path, source))
}

/// Write `records` to `path`, creating or truncating it.
pub fn write_snapshot<R: AsRef<[String]>>(path: &Path, records: &[R]) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|source| IngestError::io(path, source))?;
    write_records(file, path, records)?;
    debug!(path = %path.display(), records = records.len(), "wrote snapshot");
    Ok(())
}

/// Replace `path` with `records` without ever leaving it half written.
///
/// The records go to a temporary file in the same directory, which is then
/// renamed over the original.
pub fn replace_snapshot<R: AsRef<[String]>>(path: &Path, records: &[R]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(|source| IngestError::io(dir, source))?;
    write_records(temp.as_file_mut(), path, records)?;
    temp.as_file()
        .sync_all()
        .map_err(|source| IngestError::io(temp.path(), source))?;
    temp.persist(path).map_err(|source| IngestError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), records = records.len(), "replaced snapshot");
    Ok(())
}
