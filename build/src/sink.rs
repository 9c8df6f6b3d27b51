use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Receives generated text under unique keys.
///
/// Adding the same key twice replaces the earlier text, so running a pass
/// again with the same input leaves the output unchanged.
pub trait OutputSink {
    /// Register generated text.
    fn add(&mut self, key: &str, text: String) -> Result<()>;
}

/// Keeps generated text in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    units: BTreeMap<String, String>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The text registered under a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.units.get(key).map(String::as_str)
    }

    /// All keys, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    /// How many texts were registered.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl OutputSink for MemorySink {
    fn add(&mut self, key: &str, text: String) -> Result<()> {
        self.units.insert(key.into(), text);
        Ok(())
    }
}

/// Writes generated text to files in a directory, one per key.
///
/// Files whose content would not change are left alone, so that their
/// modification time stays the same across repeated runs.
#[derive(Debug, Clone)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    /// Create a sink for a directory, creating the directory if necessary.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| Error::Write { path: dir.clone(), source })?;
        Ok(Self { dir })
    }

    /// The output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputSink for DirSink {
    fn add(&mut self, key: &str, text: String) -> Result<()> {
        let path = self.dir.join(key);
        if fs::read_to_string(&path).is_ok_and(|existing| existing == text) {
            return Ok(());
        }

        tracing::debug!(path = %path.display(), "writing generated file");
        fs::write(&path, text).map_err(|source| Error::Write { path, source })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_memory_sink_replaces() {
        let mut sink = MemorySink::new();
        sink.add("b", "1".into()).unwrap();
        sink.add("a", "2".into()).unwrap();
        sink.add("b", "3".into()).unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(sink.get("b"), Some("3"));
    }

    #[test]
    fn test_dir_sink_skips_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirSink::new(dir.path().join("out")).unwrap();
        sink.add("unit.g.rs", "fn a() {}".into()).unwrap();

        let path = sink.dir().join("unit.g.rs");
        let modified = fs::metadata(&path).unwrap().modified().unwrap();
        std::thread::sleep(Duration::from_millis(20));

        sink.add("unit.g.rs", "fn a() {}".into()).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified);

        sink.add("unit.g.rs", "fn b() {}".into()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "fn b() {}");
    }
}
