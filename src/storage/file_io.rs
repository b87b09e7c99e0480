//! Document I/O with atomic writes
//!
//! Whole-document persistence for the configuration (YAML) and event/audit
//! data (JSON). Writes go to a temp file in the same directory and are
//! renamed into place, so an interrupted write never leaves a torn
//! document behind.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::CadenceError;

/// Read a JSON document, returning `T::default()` if the file is missing
pub fn read_json<T, P>(path: P) -> Result<T, CadenceError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| CadenceError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| CadenceError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Read a JSON document, erroring if the file is missing
pub fn read_json_required<T, P>(path: P) -> Result<T, CadenceError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Err(CadenceError::Storage(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let file = File::open(path)
        .map_err(|e| CadenceError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| CadenceError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Read a YAML document, returning `T::default()` if the file is missing
pub fn read_yaml<T, P>(path: P) -> Result<T, CadenceError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| CadenceError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;
    serde_yaml::from_reader(BufReader::new(file))
        .map_err(|e| CadenceError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write a JSON document atomically (temp file + rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), CadenceError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_atomic(path.as_ref(), "json.tmp", |writer| {
        serde_json::to_writer_pretty(writer, data)
            .map_err(|e| CadenceError::Storage(format!("Failed to serialize data: {}", e)))
    })
}

/// Write a YAML document atomically (temp file + rename)
pub fn write_yaml_atomic<T, P>(path: P, data: &T) -> Result<(), CadenceError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_atomic(path.as_ref(), "yaml.tmp", |writer| {
        serde_yaml::to_writer(writer, data)
            .map_err(|e| CadenceError::Storage(format!("Failed to serialize data: {}", e)))
    })
}

fn write_atomic<F>(path: &Path, tmp_ext: &str, serialize: F) -> Result<(), CadenceError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), CadenceError>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CadenceError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Temp file must live in the same directory for the rename to be atomic
    let temp_path = path.with_extension(tmp_ext);

    let file = File::create(&temp_path)
        .map_err(|e| CadenceError::Storage(format!("Failed to create temp file: {}", e)))?;
    let mut writer = BufWriter::new(file);

    serialize(&mut writer)?;

    writer
        .flush()
        .map_err(|e| CadenceError::Storage(format!("Failed to flush data: {}", e)))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| CadenceError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        CadenceError::Storage(format!("Failed to rename temp file: {}", e))
    })
}
