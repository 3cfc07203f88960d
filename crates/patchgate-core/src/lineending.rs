//! Line-ending classification for changed files.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Classifies whether a file uses CRLF line endings.
pub trait LineEndingInspector {
    /// True if the file contains at least one `\r\n` sequence.
    fn uses_crlf(&self, path: &Path) -> Result<bool>;
}

/// Probe size; CRLF files betray themselves at the first line break.
const PROBE_BYTES: usize = 8192;

/// Filesystem-backed inspector reading the head of each file.
pub struct FsLineEndingInspector {
    repo_root: PathBuf,
}

impl FsLineEndingInspector {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }
}

impl LineEndingInspector for FsLineEndingInspector {
    fn uses_crlf(&self, path: &Path) -> Result<bool> {
        let mut file = File::open(self.repo_root.join(path))?;
        let mut buf = vec![0u8; PROBE_BYTES];
        let n = file.read(&mut buf)?;
        Ok(buf[..n].windows(2).any(|w| w == b"\r\n"))
    }
}
