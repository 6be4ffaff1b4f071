// src/config/mod.rs

//! Project files: TOML model, loading, validation and unit assembly.

pub mod assemble;
pub mod loader;
pub mod model;
pub mod validate;

pub use assemble::{assemble, Project};
pub use loader::{load_and_validate, load_from_path, parse_str};
pub use model::{PrerequisitesConfig, ProjectFile, ProjectSection, RawProjectFile, UnitConfig};
