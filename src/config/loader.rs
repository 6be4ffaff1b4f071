// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ProjectFile, RawProjectFile};
use crate::errors::Result;

/// Load a project file from a given path and return the raw `RawProjectFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (unknown parents, cycles, etc.). Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawProjectFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_str(&contents)
}

/// Parse project TOML held in memory.
pub fn parse_str(contents: &str) -> Result<RawProjectFile> {
    let project: RawProjectFile = toml::from_str(contents)?;
    Ok(project)
}

/// Load a project file from path and validate it.
///
/// - Reads TOML.
/// - Checks for:
///   - unknown parent or head references,
///   - self-dependencies,
///   - anticipated end before anticipated start,
///   - cycles across all prerequisites versions.
///
/// Turning the validated file into units is left to
/// [`assemble`](crate::config::assemble::assemble).
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ProjectFile> {
    let raw = load_from_path(&path)?;
    ProjectFile::try_from(raw)
}

