use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use super::{clip_preview, display_name, ChildEntry, EntryInfo, EntryKind, EntrySource};
use crate::error::{Error, Result};

/// Reads the local filesystem below a base directory.
///
/// Request paths are relative to `base`; absolute paths and `..`
/// components are rejected.
#[derive(Debug, Clone)]
pub struct LocalSource {
    base: PathBuf,
    preview_bytes: usize,
}

impl LocalSource {
    pub fn new(base: impl Into<PathBuf>, preview_bytes: usize) -> Self {
        Self {
            base: base.into(),
            preview_bytes: preview_bytes.max(1),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let mut resolved = self.base.clone();
        for component in Path::new(path).components() {
            match component {
                Component::CurDir => {}
                Component::Normal(part) => resolved.push(part),
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(Error::OutsideRoot(path.to_string()));
                }
            }
        }
        Ok(resolved)
    }

    fn kind_of(metadata: &fs::Metadata) -> Option<EntryKind> {
        if metadata.is_dir() {
            Some(EntryKind::Directory)
        } else if metadata.is_file() {
            Some(EntryKind::File)
        } else {
            None
        }
    }
}

impl EntrySource for LocalSource {
    fn stat(&self, path: &str) -> Result<EntryInfo> {
        let full = self.resolve(path)?;
        let metadata = fs::metadata(&full)?;
        let kind = Self::kind_of(&metadata).ok_or_else(|| Error::UnsupportedEntry(path.to_string()))?;

        Ok(EntryInfo {
            name: display_name(path).to_string(),
            kind,
        })
    }

    fn list_dir(&self, path: &str) -> Result<Vec<ChildEntry>> {
        let full = self.resolve(path)?;
        let mut children = Vec::new();

        for entry in fs::read_dir(&full)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            // Follow symlinks so linked directories can be entered
            let kind = match fs::metadata(entry.path()) {
                Ok(metadata) => Self::kind_of(&metadata),
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", entry.path().display(), e);
                    None
                }
            };
            if let Some(kind) = kind {
                children.push(ChildEntry { name, kind });
            }
        }

        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    fn preview(&self, path: &str) -> Result<String> {
        let full = self.resolve(path)?;
        let file = fs::File::open(&full)?;
        let mut buffer = Vec::with_capacity(self.preview_bytes);
        file.take(self.preview_bytes as u64).read_to_end(&mut buffer)?;

        let hit_cap = buffer.len() == self.preview_bytes;
        Ok(clip_preview(&buffer, hit_cap))
    }
}
