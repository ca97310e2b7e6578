use std::sync::Arc;

use log::debug;
use rand::Rng;

use crate::export::{ExportedCard, Exporter};
use crate::ingest::{self, UploadedFile};
use crate::platform::{DownloadSink, NoticeLevel, Notifier};
use crate::randomize;
use crate::rendering::{self, PreviewSurface, VisualTree};
use crate::store::{CardStore, FieldValue};
use crate::{CardDescription, CardImage, Error, Result, StudioConfig};

const MIB: u64 = 1024 * 1024;

/// The editing session: owns the card store, the mounted preview and the
/// exporter, and reports outcomes through a [`Notifier`].
///
/// Every store change re-renders the preview before the edit call returns,
/// so the surface always shows the current card.
pub struct Studio {
    config: StudioConfig,
    store: CardStore,
    surface: Arc<PreviewSurface>,
    exporter: Exporter,
    notifier: Arc<dyn Notifier>,
}

impl Studio {
    /// Start a session on the default card.
    pub fn new(
        config: StudioConfig,
        sink: Arc<dyn DownloadSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        Self::with_card(config, CardDescription::default(), sink, notifier)
    }

    /// Start a session on an existing card.
    pub fn with_card(
        config: StudioConfig,
        card: CardDescription,
        sink: Arc<dyn DownloadSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        config.validate()?;

        let surface = Arc::new(PreviewSurface::new());
        surface.mount(rendering::render(&card));

        let mut store = CardStore::new(card);
        let preview = Arc::clone(&surface);
        store.subscribe(move |card| {
            preview.mount(rendering::render(card));
        });

        let exporter = Exporter::new(&config, sink);
        Ok(Self {
            config,
            store,
            surface,
            exporter,
            notifier,
        })
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn card(&self) -> Arc<CardDescription> {
        self.store.snapshot()
    }

    pub fn surface(&self) -> &PreviewSurface {
        &self.surface
    }

    pub fn preview(&self) -> Option<Arc<VisualTree>> {
        self.surface.tree()
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    /// Direct access to the typed setters.
    pub fn store_mut(&mut self) -> &mut CardStore {
        &mut self.store
    }

    /// Apply one form event.
    pub fn edit(&mut self, path: &str, value: impl Into<FieldValue>) -> Result<()> {
        self.store.update_path(path, value)?;
        Ok(())
    }

    /// Ingest `file` and, on success, make it the card's artwork.
    /// A rejected file leaves the card untouched.
    pub async fn upload(&mut self, file: &UploadedFile) -> Result<()> {
        match ingest::ingest_with_limit(file, self.config.max_upload_bytes).await {
            Ok(image) => {
                self.store.set_image(CardImage::Embedded(image));
                self.notifier
                    .notify(NoticeLevel::Success, "Image uploaded successfully!");
                Ok(())
            }
            Err(e) => {
                let message = match &e {
                    Error::InvalidType(_) => "Please upload an image file".to_string(),
                    Error::TooLarge { limit, .. } if limit % MIB == 0 => {
                        format!("Image size should be less than {}MB", limit / MIB)
                    }
                    Error::TooLarge { limit, .. } => {
                        format!("Image size should be less than {} bytes", limit)
                    }
                    _ => "Failed to upload image".to_string(),
                };
                self.notifier.notify(NoticeLevel::Error, &message);
                Err(e)
            }
        }
    }

    /// Remove the artwork. The card then reads as explicitly cleared.
    pub fn clear_image(&mut self) {
        self.store.set_image(CardImage::Cleared);
    }

    /// Redraw type, hit points and damage using `rng`.
    pub fn randomize_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let next = randomize::randomize(&self.store.snapshot(), rng);
        self.apply_randomized(next);
    }

    pub fn randomize(&mut self) {
        let next = randomize::randomize_thread(&self.store.snapshot());
        self.apply_randomized(next);
    }

    fn apply_randomized(&mut self, next: CardDescription) {
        debug!("randomized: {} / {} HP", next.element_type, next.hit_points);
        self.store.replace(next);
        self.notifier
            .notify(NoticeLevel::Success, "Random stats generated!");
    }

    /// Export the current card from the mounted preview.
    pub async fn download(&self) -> Result<ExportedCard> {
        let card = self.store.snapshot();
        match self.exporter.export_card(&card, &self.surface).await {
            Ok(exported) => {
                self.notifier
                    .notify(NoticeLevel::Success, "Card downloaded successfully!");
                Ok(exported)
            }
            Err(e) => {
                let message = match &e {
                    Error::PreconditionFailed(_) => {
                        "Please upload an image and enter a Pokémon name first!"
                    }
                    Error::ExportBusy => "An export is already in progress",
                    _ => "Failed to download card. Please try again.",
                };
                self.notifier.notify(NoticeLevel::Error, message);
                Err(e)
            }
        }
    }
}
