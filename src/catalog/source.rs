use anyhow::Context;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A flat key/value store of media objects, listed by key.
pub trait ObjectSource {
    /// All object keys, in no particular order.
    fn list(&self) -> anyhow::Result<Vec<String>>;

    /// Text content of `key`, or `None` if there is no such object.
    fn get_text(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Reference a player can open when no public URL prefix is configured.
    fn locate(&self, key: &str) -> String;
}

/// A library directory. Keys are `/`-separated paths relative to the root.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn open(root: &Path) -> anyhow::Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("open library {}", root.display()))?;
        if !root.is_dir() {
            anyhow::bail!("{} is not a directory", root.display());
        }
        Ok(Self { root })
    }

    fn path_of(&self, key: &str) -> PathBuf {
        key.split('/').fold(self.root.clone(), |p, seg| p.join(seg))
    }
}

impl ObjectSource for DirSource {
    fn list(&self) -> anyhow::Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = entry.with_context(|| format!("walk {}", self.root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            keys.push(key);
        }
        Ok(keys)
    }

    fn get_text(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_of(key);
        if !path.is_file() {
            return Ok(None);
        }
        let raw = std::fs::read(&path).with_context(|| format!("read {}", path.display()))?;
        Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
    }

    fn locate(&self, key: &str) -> String {
        self.path_of(key).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_lists_nested_keys() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("top.flac"), b"x").unwrap();
        fs::write(dir.path().join("sub").join("inner.lrc"), b"y").unwrap();

        let source = DirSource::open(dir.path()).unwrap();
        let mut keys = source.list().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["sub/inner.lrc".to_string(), "top.flac".to_string()]);
    }

    #[test]
    fn test_get_text() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.lrc"), "[00:01.00]hi").unwrap();

        let source = DirSource::open(dir.path()).unwrap();
        assert_eq!(source.get_text("a.lrc").unwrap().as_deref(), Some("[00:01.00]hi"));
        assert_eq!(source.get_text("missing.lrc").unwrap(), None);
        assert!(source.locate("a.lrc").ends_with("a.lrc"));
    }

    #[test]
    fn test_open_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DirSource::open(&dir.path().join("nope")).is_err());
    }
}
