//! Export pipeline: capture the mounted preview, encode it as PNG and hand
//! it to the save interaction.
//!
//! Preconditions are checked before anything touches the surface. Capture
//! and encode run on the blocking pool so the caller only suspends. Only one
//! export runs at a time; a second request while one is in flight is
//! rejected with [`Error::ExportBusy`].

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, info};
use sha2::{Digest, Sha256};

use crate::card::CardDescription;
use crate::platform::{BlobRegistry, DownloadRequest, DownloadSink};
use crate::rendering::{self, PreviewSurface};
use crate::{Error, Result, StudioConfig};

/// File stem used when the card name yields nothing usable.
pub const DEFAULT_FILE_STEM: &str = "pokemon-card";

/// Cooperative cancellation, checked between pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct ExportedCard {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
    /// Where the save interaction put the file
    pub location: String,
}

impl ExportedCard {
    /// Hex SHA-256 of the PNG bytes.
    pub fn sha256_hex(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }
}

/// Replace characters that cannot appear in a file name and trim the rest.
fn sanitize_stem(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect();
    cleaned.trim().trim_matches('.').trim().to_string()
}

/// `<name>.png`, or `<fallback>.png` when the name sanitizes to nothing.
pub fn export_filename(name: &str, fallback: &str) -> String {
    let stem = sanitize_stem(name);
    if stem.is_empty() {
        format!("{}.png", fallback)
    } else {
        format!("{}.png", stem)
    }
}

/// Fail fast when the card is incomplete.
pub fn check_preconditions(card: &CardDescription) -> Result<()> {
    match card.export_blocker() {
        Some(reason) => Err(Error::PreconditionFailed(reason.to_string())),
        None => Ok(()),
    }
}

struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| Error::ExportBusy)?;
        Ok(Self(Arc::clone(flag)))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn failed(stage: &str, err: impl Display) -> Error {
    error!("export {} failed: {}", stage, err);
    Error::ExportFailed
}

pub struct Exporter {
    supersample: u32,
    fallback_stem: String,
    sink: Arc<dyn DownloadSink>,
    blobs: BlobRegistry,
    busy: Arc<AtomicBool>,
}

impl Exporter {
    pub fn new(config: &StudioConfig, sink: Arc<dyn DownloadSink>) -> Self {
        Self {
            supersample: config.supersample,
            fallback_stem: config.fallback_file_stem.clone(),
            sink,
            blobs: BlobRegistry::new(),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn blobs(&self) -> &BlobRegistry {
        &self.blobs
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Export `card` from what `surface` currently shows.
    pub async fn export_card(&self, card: &CardDescription, surface: &PreviewSurface) -> Result<ExportedCard> {
        self.export_card_with_cancel(card, surface, &CancelToken::new()).await
    }

    pub async fn export_card_with_cancel(
        &self,
        card: &CardDescription,
        surface: &PreviewSurface,
        cancel: &CancelToken,
    ) -> Result<ExportedCard> {
        check_preconditions(card)?;
        let _busy = BusyGuard::acquire(&self.busy)?;

        let tree = surface
            .tree()
            .ok_or_else(|| failed("capture", "preview surface is not mounted"))?;
        let scale = self.supersample;
        let bitmap = tokio::task::spawn_blocking(move || rendering::capture_tree(&tree, scale))
            .await
            .map_err(|e| failed("capture", e))?
            .map_err(|e| failed("capture", e))?;
        debug!("captured {}x{} bitmap", bitmap.width(), bitmap.height());
        cancel.check()?;

        let shot = tokio::task::spawn_blocking(move || rendering::encode_png(&bitmap))
            .await
            .map_err(|e| failed("encode", e))?
            .map_err(|e| failed("encode", e))?;
        cancel.check()?;

        let filename = export_filename(&card.name, &self.fallback_stem);
        let handle = self.blobs.register(shot.png_data);
        let saved = self.sink.save(&DownloadRequest {
            url: handle.url(),
            filename: &filename,
            bytes: handle.bytes(),
        });
        let png_data = handle.bytes().to_vec();
        drop(handle);
        let location = saved.map_err(|e| failed("save", e))?;

        info!("exported {} ({}x{}, {} bytes)", filename, shot.width, shot.height, png_data.len());
        Ok(ExportedCard {
            filename,
            width: shot.width,
            height: shot.height,
            png_data,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_uses_name_or_fallback() {
        assert_eq!(export_filename("Pika", DEFAULT_FILE_STEM), "Pika.png");
        assert_eq!(export_filename("", DEFAULT_FILE_STEM), "pokemon-card.png");
        assert_eq!(export_filename("  ", DEFAULT_FILE_STEM), "pokemon-card.png");
        assert_eq!(export_filename("..", DEFAULT_FILE_STEM), "pokemon-card.png");
    }

    #[test]
    fn filename_strips_path_characters() {
        assert_eq!(export_filename("../etc/passwd", DEFAULT_FILE_STEM), "_etc_passwd.png");
        assert_eq!(export_filename("Mr. Mime?", DEFAULT_FILE_STEM), "Mr. Mime_.png");
        assert_eq!(export_filename("Flabébé", DEFAULT_FILE_STEM), "Flabébé.png");
    }

    #[test]
    fn busy_guard_is_exclusive_and_releases() {
        let flag = Arc::new(AtomicBool::new(false));
        let g = BusyGuard::acquire(&flag).unwrap();
        assert!(matches!(BusyGuard::acquire(&flag), Err(Error::ExportBusy)));
        drop(g);
        assert!(BusyGuard::acquire(&flag).is_ok());
    }

    #[test]
    fn cancel_token_is_shared() {
        let t = CancelToken::new();
        let t2 = t.clone();
        assert!(t.check().is_ok());
        t2.cancel();
        assert!(matches!(t.check(), Err(Error::Cancelled)));
    }
}
