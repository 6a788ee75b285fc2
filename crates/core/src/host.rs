//! File emission primitive used by the emitters.
//!
//! Emitters fully render every artifact before the first write, so a host only
//! ever sees complete file contents.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::EmitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Rewrite `\n` line breaks of `content` to this line ending.
    pub fn apply(&self, content: &str) -> String {
        match self {
            LineEnding::Lf => content.to_string(),
            LineEnding::CrLf => content.replace("\r\n", "\n").replace('\n', "\r\n"),
        }
    }
}

/// Destination for emitted artifacts.
pub trait EmitHost {
    /// Write `content` to `path`, relative to the host's output root.
    fn emit_file(
        &mut self,
        path: &Path,
        content: &str,
        line_ending: LineEnding,
    ) -> Result<(), EmitError>;
}

/// Writes artifacts below an output directory on disk.
#[derive(Debug, Clone)]
pub struct FsHost {
    out_dir: PathBuf,
}

impl FsHost {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

impl EmitHost for FsHost {
    fn emit_file(
        &mut self,
        path: &Path,
        content: &str,
        line_ending: LineEnding,
    ) -> Result<(), EmitError> {
        let target = self.out_dir.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| EmitError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&target, line_ending.apply(content)).map_err(|source| EmitError::Write {
            path: target.clone(),
            source,
        })?;
        debug!(path = %target.display(), bytes = content.len(), "Wrote file.");
        Ok(())
    }
}

/// Keeps artifacts in memory, keyed by relative path.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    pub files: BTreeMap<PathBuf, String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }
}

impl EmitHost for MemoryHost {
    fn emit_file(
        &mut self,
        path: &Path,
        content: &str,
        line_ending: LineEnding,
    ) -> Result<(), EmitError> {
        self.files
            .insert(path.to_path_buf(), line_ending.apply(content));
        Ok(())
    }
}
