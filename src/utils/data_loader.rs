//! Table and artifact IO
//!
//! Every writer goes through a temporary file in the destination directory
//! followed by a rename, so a reader never observes a half-written file.

use crate::error::{AttritionError, Result};
use polars::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use tracing::debug;

/// Load a CSV file with a header row, inferring the schema from every row
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(AttritionError::DataError(format!(
            "input file not found: {}",
            path.display()
        )));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!(path = %path.display(), rows = df.height(), cols = df.width(), "Loaded CSV");
    Ok(df)
}

/// Write a DataFrame as CSV, creating parent directories as needed
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    atomic_write(path, |file| {
        CsvWriter::new(file).include_header(true).finish(df)?;
        Ok(())
    })?;
    debug!(path = %path.display(), rows = df.height(), "Wrote CSV");
    Ok(())
}

/// Persist a serializable artifact; `.json` paths are written as pretty
/// JSON, everything else as bincode.
pub fn save_artifact<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if is_json(path) {
        atomic_write(path, |file| {
            serde_json::to_writer_pretty(&mut *file, value)?;
            file.write_all(b"\n")?;
            Ok(())
        })
    } else {
        atomic_write(path, |file| {
            bincode::serialize_into(&mut *file, value)?;
            Ok(())
        })
    }
}

/// Load an artifact written by [`save_artifact`]
pub fn load_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| {
        AttritionError::IoError(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let reader = BufReader::new(file);

    if is_json(path) {
        Ok(serde_json::from_reader(reader)?)
    } else {
        Ok(bincode::deserialize_from(reader)?)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn atomic_write<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut tempfile::NamedTempFile) -> Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    write(&mut tmp)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| AttritionError::IoError(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        values: Vec<f64>,
    }

    fn sample() -> Sample {
        Sample {
            name: "scaler".to_string(),
            values: vec![1.0, 2.5],
        }
    }

    #[test]
    fn test_load_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "a,b,c").unwrap();
        writeln!(file, "1,x,3.5").unwrap();
        writeln!(file, "4,y,").unwrap();

        let df = load_csv(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
        assert_eq!(df.column("c").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, AttritionError::DataError(_)));
    }

    #[test]
    fn test_write_csv_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");
        let mut df = df!("a" => &[1i64, 2, 3]).unwrap();

        write_csv(&mut df, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "a\n1\n2\n3\n");
    }

    #[test]
    fn test_artifact_json_and_bincode() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("artifact.json");
        save_artifact(&sample(), &json_path).unwrap();
        let text = std::fs::read_to_string(&json_path).unwrap();
        assert!(text.contains("\"scaler\""));
        assert_eq!(load_artifact::<Sample>(&json_path).unwrap(), sample());

        let bin_path = dir.path().join("artifact.bin");
        save_artifact(&sample(), &bin_path).unwrap();
        assert_eq!(load_artifact::<Sample>(&bin_path).unwrap(), sample());
    }

    #[test]
    fn test_overwrite_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        save_artifact(&vec![1, 2, 3], &path).unwrap();
        save_artifact(&vec![4], &path).unwrap();
        assert_eq!(load_artifact::<Vec<i32>>(&path).unwrap(), vec![4]);
    }
}
