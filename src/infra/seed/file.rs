//! JSON file seed.
//!
//! The file holds an array of `{ "id": "...", "cost": 123 }` objects, in the
//! order they should be scheduled.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{SchedulerError, SeedEntry};

use super::SeedSource;

/// Seed loaded from a JSON file on each `load`.
#[derive(Debug, Clone)]
pub struct JsonFileSeed {
    path: PathBuf,
}

impl JsonFileSeed {
    /// Seed reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the seed file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SeedSource for JsonFileSeed {
    fn load(&self) -> Result<Vec<SeedEntry>, SchedulerError> {
        let raw = fs::read_to_string(&self.path)?;
        let entries: Vec<SeedEntry> = serde_json::from_str(&raw)?;
        tracing::debug!(path = %self.path.display(), entries = entries.len(), "loaded seed file");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_preserves_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": "b", "cost": 5}}, {{"id": "a", "cost": 0}}]"#).unwrap();

        let entries = JsonFileSeed::new(file.path()).load().unwrap();
        assert_eq!(entries, vec![SeedEntry::new("b", 5), SeedEntry::new("a", 0)]);
    }

    #[test]
    fn test_missing_file_and_bad_json() {
        let missing = JsonFileSeed::new("/nonexistent/fetchlot-seed.json").load();
        assert!(matches!(missing, Err(SchedulerError::Io(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": "a", "cost": -1}}]"#).unwrap();
        let bad = JsonFileSeed::new(file.path()).load();
        assert!(matches!(bad, Err(SchedulerError::Parse(_))));
    }
}
