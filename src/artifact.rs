use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Writes generated text to `<prefix>_<YYYYMMDD_HHMMSS>.txt` files.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ArtifactStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self, prefix: &str, content: &str) -> io::Result<PathBuf> {
        self.save_at(prefix, content, Local::now())
    }

    /// Never overwrites: a second save in the same second gets `_2`, `_3`, ...
    pub fn save_at(&self, prefix: &str, content: &str, now: DateTime<Local>) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let stem = format!("{prefix}_{}", now.format(TIMESTAMP_FORMAT));

        let mut suffix = 1;
        loop {
            let name = if suffix == 1 {
                format!("{stem}.txt")
            } else {
                format!("{stem}_{suffix}.txt")
            };
            let path = self.dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(content.as_bytes())?;
                    file.flush()?;
                    info!(path = %path.display(), bytes = content.len(), "Saved artifact");
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_name_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let path = store.save_at("MCQs", "Q1 ...", fixed_time()).unwrap();

        assert_eq!(path.file_name().unwrap(), "MCQs_20240309_140507.txt");
        assert_eq!(fs::read_to_string(&path).unwrap(), "Q1 ...");
    }

    #[test]
    fn test_same_second_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let first = store.save_at("Daily_Tip", "one", fixed_time()).unwrap();
        let second = store.save_at("Daily_Tip", "two", fixed_time()).unwrap();

        assert_ne!(first, second);
        assert_eq!(second.file_name().unwrap(), "Daily_Tip_20240309_140507_2.txt");
        assert_eq!(fs::read_to_string(first).unwrap(), "one");
        assert_eq!(fs::read_to_string(second).unwrap(), "two");
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("out/nested"));
        let path = store.save("User_Notes", "ünïcode ✓").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "ünïcode ✓");
    }
}
