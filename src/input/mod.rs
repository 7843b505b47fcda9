use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod correction;
pub mod records;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("missing input file: {}", .0.display())]
    MissingInput(PathBuf),
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Filename for one (case, [run,] region, cell type) export, matching
/// the space-joined convention the exports are saved under.
pub fn measurement_file_name(case: &str, run: &str, region: &str, cell_type: &str) -> String {
    if run.is_empty() {
        format!("{case} {region} {cell_type}.txt")
    } else {
        format!("{case} {run} {region} {cell_type}.txt")
    }
}

pub fn case_file_name(case: &str) -> String {
    format!("{case}.txt")
}

/// Opens an expected input file; absence is a configuration error, not
/// a recoverable condition.
fn open_input(path: &Path) -> Result<BufReader<File>, InputError> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(InputError::MissingInput(path.to_path_buf()))
        }
        Err(e) => Err(InputError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Reads a tab-delimited file into rows of cells. Fully-empty lines are
/// dropped so stray trailing newlines cannot shift the trailing-summary
/// slice.
pub fn read_delimited(path: &Path) -> Result<Vec<Vec<String>>, InputError> {
    let reader = open_input(path)?;
    let mut rows = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }
        rows.push(line.split('\t').map(|s| s.trim().to_string()).collect());
    }
    Ok(rows)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
