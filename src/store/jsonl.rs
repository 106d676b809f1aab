use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::app::{FreshetError, LoadError, LoadFailure, Result};
use crate::domain::Source;

/// The source list, persisted as a stream of JSON records.
///
/// Records are written one per line. Reading accepts any whitespace between
/// records, so hand-edited files load too.
#[derive(Debug)]
pub struct SourceStore {
    path: PathBuf,
    sources: Vec<Source>,
}

impl SourceStore {
    /// A store at `path` with no sources. Nothing is written until [`save`](Self::save).
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sources: Vec::new(),
        }
    }

    /// Reads the list at `path`. A missing file is an empty list.
    pub fn load(path: impl Into<PathBuf>) -> std::result::Result<Self, LoadError> {
        let path = path.into();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No source list at {}, starting empty", path.display());
                return Ok(Self::empty(path));
            }
            Err(e) => {
                return Err(LoadError {
                    path,
                    reason: LoadFailure::Io(e),
                    partial: Vec::new(),
                })
            }
        };

        let mut sources = Vec::new();
        for record in serde_json::Deserializer::from_str(&content).into_iter::<Source>() {
            match record {
                Ok(source) => sources.push(source),
                Err(e) => {
                    return Err(LoadError {
                        path,
                        reason: LoadFailure::Corrupt {
                            line: e.line(),
                            source: e,
                        },
                        partial: sources,
                    })
                }
            }
        }

        tracing::debug!("Loaded {} sources from {}", sources.len(), path.display());
        Ok(Self { path, sources })
    }

    /// Continues with whatever was read before a load failure.
    pub fn recover(err: LoadError) -> Self {
        Self {
            path: err.path,
            sources: err.partial,
        }
    }

    /// Replaces the file with the current list.
    ///
    /// The records go to a temporary file in the same directory which is
    /// then renamed over the target, so readers never see a half-written list.
    pub fn save(&self) -> Result<()> {
        let fail = |source: io::Error| FreshetError::Save {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(fail)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(fail)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            for source in &self.sources {
                serde_json::to_writer(&mut writer, source).map_err(|e| fail(e.into()))?;
                writer.write_all(b"\n").map_err(fail)?;
            }
            writer.flush().map_err(fail)?;
        }
        tmp.as_file().sync_all().map_err(fail)?;
        // The temp file is created owner-only; keep the mode of the list it replaces.
        if let Ok(existing) = fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(existing.permissions())
                .map_err(fail)?;
        }
        tmp.persist(&self.path).map_err(|e| fail(e.error))?;

        tracing::debug!("Saved {} sources to {}", self.sources.len(), self.path.display());
        Ok(())
    }

    /// Appends `url` unless it is already tracked. Returns whether it was added.
    pub fn add_source(&mut self, url: &str) -> bool {
        if self.sources.iter().any(|s| s.url == url) {
            return false;
        }
        self.sources.push(Source::new(url));
        true
    }

    /// Removes every source with this `url`. Returns how many were removed.
    pub fn delete_source(&mut self, url: &str) -> usize {
        let before = self.sources.len();
        self.sources.retain(|s| s.url != url);
        before - self.sources.len()
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Hands the list to a fetch run. Put it back with [`restore_sources`](Self::restore_sources).
    pub fn take_sources(&mut self) -> Vec<Source> {
        std::mem::take(&mut self.sources)
    }

    pub fn restore_sources(&mut self, sources: Vec<Source>) {
        self.sources = sources;
    }
}
