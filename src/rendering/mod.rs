//! Preview rendering: card -> visual tree -> paint commands -> bitmap -> PNG
//!
//! [`render`] is the pure preview function. [`PreviewSurface`] plays the role
//! of the mounted on-screen preview: it holds whatever tree was rendered last
//! and can be captured as a bitmap at a supersampling factor.

pub mod layout;
pub mod paint;
pub mod palette;
pub mod raster;

use std::sync::{Arc, RwLock};

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use log::debug;

use crate::card::CardDescription;
use crate::{Error, Result};

pub use layout::{Section, VisualTree};

/// Render the preview for `card`. Pure and deterministic.
pub fn render(card: &CardDescription) -> VisualTree {
    layout::layout_card(card)
}

/// An encoded capture of the preview.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

/// The mounted preview. Starts unmounted; capture fails until a tree is
/// mounted.
#[derive(Debug, Default)]
pub struct PreviewSurface {
    mounted: RwLock<Option<Arc<VisualTree>>>,
}

impl PreviewSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&self, tree: VisualTree) {
        let mut g = self.mounted.write().unwrap_or_else(|e| e.into_inner());
        *g = Some(Arc::new(tree));
    }

    pub fn unmount(&self) {
        let mut g = self.mounted.write().unwrap_or_else(|e| e.into_inner());
        *g = None;
    }

    /// The tree currently on screen, if any.
    pub fn tree(&self) -> Option<Arc<VisualTree>> {
        self.mounted.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.tree().is_some()
    }

    /// Logical size of the mounted preview.
    pub fn logical_size(&self) -> Option<(u32, u32)> {
        self.tree().map(|t| (t.width, t.height))
    }

    /// Rasterize the mounted tree at `scale` times its logical size.
    pub fn capture(&self, scale: u32) -> Result<RgbaImage> {
        let tree = self
            .tree()
            .ok_or_else(|| Error::RenderError("preview surface is not mounted".into()))?;
        capture_tree(&tree, scale)
    }
}

/// Rasterize `tree` at `scale` times its logical size.
pub fn capture_tree(tree: &VisualTree, scale: u32) -> Result<RgbaImage> {
    if tree.width == 0 || tree.height == 0 {
        return Err(Error::RenderError("preview has zero size".into()));
    }
    if scale == 0 {
        return Err(Error::RenderError("supersampling factor must be at least 1".into()));
    }
    let commands = paint::paint_commands(tree);
    debug!(
        "capturing {}x{} preview at {}x ({} commands)",
        tree.width,
        tree.height,
        scale,
        commands.len()
    );
    Ok(raster::rasterize(&commands, tree.width, tree.height, scale))
}

/// Encode a bitmap as a lossless RGBA PNG at maximum compression.
pub fn encode_png(bitmap: &RgbaImage) -> Result<Screenshot> {
    let (width, height) = bitmap.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::RenderError("no bitmap produced".into()));
    }
    let mut png_data = Vec::new();
    PngEncoder::new_with_quality(&mut png_data, CompressionType::Best, FilterType::Adaptive)
        .write_image(bitmap.as_raw(), width, height, ExtendedColorType::Rgba8)
        .map_err(|e| Error::RenderError(format!("PNG encode failed: {}", e)))?;
    Ok(Screenshot {
        width,
        height,
        png_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_is_pure() {
        let card = CardDescription::default();
        assert_eq!(render(&card), render(&card.clone()));
    }

    #[test]
    fn unmounted_surface_cannot_capture() {
        let surface = PreviewSurface::new();
        assert!(matches!(surface.capture(2), Err(Error::RenderError(_))));
    }

    #[test]
    fn capture_doubles_logical_size() {
        let surface = PreviewSurface::new();
        surface.mount(render(&CardDescription::default()));
        assert_eq!(surface.logical_size(), Some((320, 440)));
        let bmp = surface.capture(2).unwrap();
        assert_eq!(bmp.dimensions(), (640, 880));
        // Rounded corner outside the card stays transparent.
        assert_eq!(bmp.get_pixel(0, 0)[3], 0);
        assert_eq!(bmp.get_pixel(320, 440)[3], 255);
    }

    #[test]
    fn encode_produces_png_signature() {
        let bmp = RgbaImage::from_pixel(2, 3, image::Rgba([1, 2, 3, 4]));
        let shot = encode_png(&bmp).unwrap();
        assert_eq!(&shot.png_data[0..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!((shot.width, shot.height), (2, 3));
        let back = image::load_from_memory(&shot.png_data).unwrap().to_rgba8();
        assert_eq!(back, bmp);
    }

    #[test]
    fn encode_rejects_empty_bitmap() {
        assert!(encode_png(&RgbaImage::new(0, 0)).is_err());
    }
}
