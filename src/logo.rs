//! Logo image decoding and the texture that owns it on the GPU side.

use std::path::Path;

use egui::{ColorImage, Pos2, Rect, TextureHandle, TextureId, TextureOptions};

use crate::error::{OverlayError, Result};

pub const DEFAULT_LOGO_PATH: &str = "logo.png";
/// Logo side length relative to the progress ring radius.
pub const LOGO_SCALE: f32 = 1.5;

const TEXTURE_NAME: &str = "loading_logo";

/// Turns an image file into pixels egui can upload.
pub trait ImageSource {
    fn decode(&self, path: &Path) -> Result<ColorImage>;
}

/// Decodes from disk with the `image` crate. Any format it recognises works.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImageSource;

impl ImageSource for FileImageSource {
    fn decode(&self, path: &Path) -> Result<ColorImage> {
        let img = image::open(path).map_err(|source| OverlayError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let rgba = img.to_rgba8();
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(OverlayError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        let size = [rgba.width() as usize, rgba.height() as usize];
        Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
    }
}

/// Exclusive owner of the uploaded logo.
///
/// The texture stays registered with egui while the handle is held and is
/// freed as soon as it is released or replaced.
#[derive(Default)]
pub struct LogoTexture {
    handle: Option<TextureHandle>,
}

impl LogoTexture {
    /// Decode `path` and upload it, replacing any texture already held.
    ///
    /// The old texture is released before decoding, so on failure the logo
    /// is simply absent.
    pub fn load(&mut self, ctx: &egui::Context, source: &dyn ImageSource, path: &Path) -> Result<()> {
        self.release();

        let image = source.decode(path)?;
        let [w, h] = image.size;
        self.handle = Some(ctx.load_texture(TEXTURE_NAME, image, TextureOptions::LINEAR));
        log::info!("Loaded logo {} ({}x{})", path.display(), w, h);
        Ok(())
    }

    /// Drop the texture if one is held. Returns whether anything was released.
    pub fn release(&mut self) -> bool {
        self.handle.take().is_some()
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }

    pub fn id(&self) -> Option<TextureId> {
        self.handle.as_ref().map(TextureHandle::id)
    }

    /// Draw the logo as a square centred on `center`. Does nothing when no
    /// texture is held.
    pub fn paint(&self, painter: &egui::Painter, center: Pos2, ring_radius: f32) {
        if let Some(id) = self.id() {
            let uv = Rect::from_min_max(Pos2::ZERO, egui::pos2(1.0, 1.0));
            painter.image(id, logo_rect(center, ring_radius), uv, egui::Color32::WHITE);
        }
    }
}

pub fn logo_rect(center: Pos2, ring_radius: f32) -> Rect {
    let side = ring_radius * LOGO_SCALE;
    Rect::from_center_size(center, egui::vec2(side, side))
}
