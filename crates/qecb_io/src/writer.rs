//! Persistence of sweep results.
//!
//! A sweep's output is written exactly once, when the sweep ends. The file
//! is first written next to its destination and then renamed over it, so a
//! crash never leaves a half-written result behind and earlier sweeps'
//! files are never touched.

use qecb_common::model::float_repr;
use qecb_core::Result;
use qecb_core::sweep::SweepOutcome;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Output file for the sweep at `pauli_ratio`, e.g. `pauli_ratio_0.05.txt`.
pub fn sweep_output_path(dir: &Path, pauli_ratio: f64) -> PathBuf {
    dir.join(format!("pauli_ratio_{}.txt", float_repr(pauli_ratio)))
}

/// Replaces `path` with `contents` via a sibling temporary file.
pub fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let mut tmp_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name"))?
        .to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let mut file = BufWriter::new(File::create(&tmp_path)?);
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    file.get_ref().sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Writes a finished sweep to its per-ratio file in `dir`.
pub fn write_sweep_output(dir: &Path, outcome: &SweepOutcome) -> Result<PathBuf> {
    let path = sweep_output_path(dir, outcome.pauli_ratio);
    write_atomically(&path, &outcome.render())?;
    info!(
        path = %path.display(),
        points = outcome.points.len(),
        "sweep output written"
    );
    Ok(path)
}
