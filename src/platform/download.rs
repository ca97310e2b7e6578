//! Save/download interaction for exported files

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

/// What the exporter hands to the save interaction.
#[derive(Debug, Clone, Copy)]
pub struct DownloadRequest<'a> {
    /// Temporary handle URL (`blob:` scheme) valid only during the call
    pub url: &'a str,
    pub filename: &'a str,
    pub bytes: &'a [u8],
}

pub trait DownloadSink: Send + Sync {
    /// Start the save interaction. Returns a human-readable location.
    fn save(&self, request: &DownloadRequest<'_>) -> io::Result<String>;
}

/// Writes downloads into a directory, creating it when missing.
///
/// Bytes go to a hidden `.part` sibling first and are renamed into place,
/// so a failed write never leaves a truncated file under the final name.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, request: &DownloadRequest<'_>) -> io::Result<String> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(request.filename);
        let part = self.dir.join(format!(".{}.part", request.filename));
        let written = std::fs::write(&part, request.bytes).and_then(|_| std::fs::rename(&part, &path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&part);
            return Err(e);
        }
        Ok(path.display().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Keeps downloads in memory; used by tests and dry runs.
#[derive(Default)]
pub struct MemorySink {
    saved: Mutex<Vec<SavedFile>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<SavedFile> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl DownloadSink for MemorySink {
    fn save(&self, request: &DownloadRequest<'_>) -> io::Result<String> {
        let mut g = self.saved.lock().unwrap_or_else(|e| e.into_inner());
        g.push(SavedFile {
            filename: request.filename.to_string(),
            bytes: request.bytes.to_vec(),
        });
        Ok(format!("memory:{}", request.filename))
    }
}
