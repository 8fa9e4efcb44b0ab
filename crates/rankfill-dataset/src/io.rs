//! Dataset and plan files

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{DatasetError, Result};
use crate::model::Dataset;
use crate::plan::SynthesisPlan;

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> DatasetError + '_ {
  move |source| DatasetError::Io { path: path.to_path_buf(), source }
}

pub fn load_dataset(path: &Path) -> Result<Dataset> {
  let file = File::open(path).map_err(io_err(path))?;
  let dataset: Dataset = serde_json::from_reader(BufReader::new(file))
    .map_err(|source| DatasetError::Json { path: path.to_path_buf(), source })?;
  debug!(path = %path.display(), products = dataset.len(), "dataset loaded");
  Ok(dataset)
}

/// Write `dataset` as pretty JSON
/// Goes through a uniquely named temporary file next to `path` that is
/// renamed over the target, and removed again if anything fails.
pub fn save_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
  let dir = target_dir(path);
  let mut tmp = NamedTempFile::new_in(dir).map_err(io_err(dir))?;

  {
    let mut writer = BufWriter::new(tmp.as_file_mut());
    serde_json::to_writer_pretty(&mut writer, dataset)
      .map_err(|source| DatasetError::Json { path: path.to_path_buf(), source })?;
    writer.write_all(b"\n").map_err(io_err(path))?;
    writer.flush().map_err(io_err(path))?;
  }

  tmp.persist(path).map_err(|e| DatasetError::Io { path: path.to_path_buf(), source: e.error })?;
  debug!(path = %path.display(), products = dataset.len(), "dataset saved");
  Ok(())
}

pub fn load_plan(path: &Path) -> Result<SynthesisPlan> {
  let raw = fs::read_to_string(path).map_err(io_err(path))?;
  SynthesisPlan::from_json_str(&raw)
}

fn target_dir(path: &Path) -> &Path {
  match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  }
}
