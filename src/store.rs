// src/store.rs

use crate::error::{Result, SimDevError};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| SimDevError::io(path, e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Pretty-prints `value` to `path`, creating missing parent directories
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SimDevError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| SimDevError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(|e| SimDevError::io(path, e))?;
    Ok(())
}

pub fn default_similar_path(user_email: &str) -> PathBuf {
    PathBuf::from("results").join(format!("similar_developers_for_{}.json", user_email))
}
