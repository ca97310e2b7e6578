//! Pokecard Studio
//!
//! A trading card studio: edit a card description, watch a live preview
//! re-render on every change, and export the preview as a lossless PNG.
//!
//! # Pipeline
//!
//! - **Store**: one live [`CardDescription`]; each edit replaces one field and
//!   publishes a new snapshot
//! - **Ingestion**: uploaded files become self-contained data URIs
//! - **Preview**: a pure [`render`] from card to visual tree, mounted on a
//!   [`PreviewSurface`]
//! - **Export**: capture the surface at 2x, encode PNG, hand the bytes to a
//!   [`platform::DownloadSink`]
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pokecard::platform::{DirectorySink, LogNotifier};
//! use pokecard::{Studio, StudioConfig, UploadedFile};
//!
//! # async fn run() -> pokecard::Result<()> {
//! let mut studio = Studio::new(
//!     StudioConfig::default(),
//!     Arc::new(DirectorySink::new("cards")),
//!     Arc::new(LogNotifier),
//! )?;
//! studio.edit("name", "Pika")?;
//! studio.upload(&UploadedFile::from_path("pika.png").await?).await?;
//! let exported = studio.download().await?;
//! println!("saved {}", exported.location);
//! # Ok(())
//! # }
//! ```

pub mod card;
pub mod error;
pub mod export;
pub mod ingest;
pub mod platform;
pub mod randomize;
pub mod rendering;
pub mod store;
pub mod studio;

pub use card::{CardDescription, CardImage, ElementType, Move, MoveField, MoveSlot};
pub use error::{Error, Result};
pub use export::{CancelToken, ExportedCard, Exporter};
pub use ingest::{EmbeddableImage, UploadedFile};
pub use rendering::{render, PreviewSurface, VisualTree};
pub use store::{CardStore, CardUpdate, FieldPath, FieldValue};
pub use studio::Studio;

/// Configuration for a [`Studio`]
///
/// Defaults:
/// - exports are captured at 2x the preview's logical size
/// - uploads above 5 MiB are rejected
/// - nameless exports fall back to `pokemon-card.png`
///
/// # Examples
///
/// ```
/// let cfg = pokecard::StudioConfig::default();
/// assert_eq!(cfg.supersample, 2);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Capture multiplier applied to the preview's logical size
    pub supersample: u32,
    /// Largest accepted upload in bytes
    pub max_upload_bytes: u64,
    /// File stem used when the card name is empty
    pub fallback_file_stem: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            supersample: 2,
            max_upload_bytes: ingest::MAX_UPLOAD_BYTES,
            fallback_file_stem: export::DEFAULT_FILE_STEM.to_string(),
        }
    }
}

impl StudioConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=8).contains(&self.supersample) {
            return Err(Error::ConfigError(format!(
                "supersample must be between 1 and 8, got {}",
                self.supersample
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(Error::ConfigError("max_upload_bytes must be positive".into()));
        }
        if self.fallback_file_stem.trim().is_empty() {
            return Err(Error::ConfigError("fallback_file_stem must not be empty".into()));
        }
        Ok(())
    }
}
