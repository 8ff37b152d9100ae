use std::path::{Path, PathBuf};

use egui::{Pos2, Vec2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::logo::{FileImageSource, ImageSource, LogoTexture, DEFAULT_LOGO_PATH};
use crate::progress::{ProgressMode, ProgressRing};
use crate::snow::{SnowField, Snowflake, MAX_SNOWFLAKES};
use crate::ui::theme;

/// Full-screen loading overlay: falling snow, a progress ring and a
/// centred logo, drawn back to front.
///
/// Drive it once per frame from the GUI thread:
/// `init` once, then `update` followed by `render`, and `cleanup` at the end
/// (dropping the overlay does the same).
pub struct LoadingOverlay {
    ctx: Option<egui::Context>,
    rng: StdRng,
    snow: SnowField,
    progress: ProgressRing,
    logo: LogoTexture,
    logo_path: PathBuf,
    image_source: Box<dyn ImageSource>,
    viewport: Vec2,
    center: Pos2,
}

impl Default for LoadingOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingOverlay {
    /// Overlay seeded from OS entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Overlay with a reproducible particle field.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            ctx: None,
            rng,
            snow: SnowField::new(MAX_SNOWFLAKES),
            progress: ProgressRing::default(),
            logo: LogoTexture::default(),
            logo_path: PathBuf::from(DEFAULT_LOGO_PATH),
            image_source: Box::new(FileImageSource),
            viewport: Vec2::ZERO,
            center: Pos2::ZERO,
        }
    }

    pub fn with_logo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo_path = path.into();
        self
    }

    pub fn with_image_source(mut self, source: impl ImageSource + 'static) -> Self {
        self.image_source = Box::new(source);
        self
    }

    /// Pool size. Takes effect at the next `init`.
    pub fn with_max_flakes(mut self, count: usize) -> Self {
        self.snow = SnowField::new(count);
        self
    }

    /// Prepare the overlay for drawing into `ctx`.
    ///
    /// A logo that fails to load is logged and skipped; the overlay still
    /// comes up, so this always returns `true`.
    pub fn init(&mut self, ctx: &egui::Context) -> bool {
        self.ctx = Some(ctx.clone());
        self.refresh_viewport(ctx);

        self.load_logo(ctx);

        self.snow.populate(&mut self.rng, self.viewport);
        theme::install(ctx);

        log::info!(
            "Loading overlay ready: {} flakes, {:.0}x{:.0} viewport, logo {}",
            self.snow.len(),
            self.viewport.x,
            self.viewport.y,
            if self.logo.is_loaded() { "loaded" } else { "absent" }
        );
        true
    }

    /// Advance the snow and the progress animation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.snow.update(&mut self.rng, dt, self.viewport);
        self.progress.advance(dt);
    }

    /// Draw the overlay for this frame.
    pub fn render(&mut self, ctx: &egui::Context) {
        self.refresh_viewport(ctx);
        let screen = ctx.screen_rect();

        egui::Area::new(egui::Id::new("loading_overlay"))
            .fixed_pos(screen.min)
            .interactable(false)
            .fade_in(false)
            .show(ctx, |ui| {
                ui.set_min_size(screen.size());
                let painter = ui.painter();

                self.snow.paint(painter);
                self.progress.paint(painter, self.center);
                self.logo.paint(painter, self.center, self.progress.radius());
            });
    }

    /// Release the logo texture and empty the particle pool. Safe to call
    /// any number of times.
    pub fn cleanup(&mut self) {
        let released = self.logo.release();
        let had_flakes = !self.snow.is_empty();
        self.snow.clear();
        if released || had_flakes {
            log::info!("Loading overlay cleaned up");
        }
    }

    /// Swap in a different logo. The current texture is released first, so
    /// a failed load leaves the overlay without a logo.
    ///
    /// Returns `false` if `init` has not run yet or the image failed to load.
    pub fn reload_logo(&mut self, path: impl Into<PathBuf>) -> bool {
        self.logo_path = path.into();
        match self.ctx.clone() {
            Some(ctx) => self.load_logo(&ctx),
            None => false,
        }
    }

    /// Feed real progress in place of the looping animation.
    pub fn set_progress(&mut self, fraction: f32) {
        self.progress.set(fraction);
    }

    pub fn resume_animation(&mut self) {
        self.progress.resume_animation();
    }

    pub fn progress(&self) -> f32 {
        self.progress.fraction()
    }

    pub fn progress_mode(&self) -> ProgressMode {
        self.progress.mode()
    }

    /// Panel centre as of the last `init` or `render`.
    pub fn center(&self) -> Pos2 {
        self.center
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn snowflakes(&self) -> &[Snowflake] {
        self.snow.flakes()
    }

    pub fn has_logo(&self) -> bool {
        self.logo.is_loaded()
    }

    pub fn logo_texture_id(&self) -> Option<egui::TextureId> {
        self.logo.id()
    }

    pub fn logo_path(&self) -> &Path {
        &self.logo_path
    }

    fn refresh_viewport(&mut self, ctx: &egui::Context) {
        let screen = ctx.screen_rect();
        self.viewport = screen.size();
        self.center = Pos2::new(self.viewport.x * 0.5, self.viewport.y * 0.5);
    }

    fn load_logo(&mut self, ctx: &egui::Context) -> bool {
        match self
            .logo
            .load(ctx, self.image_source.as_ref(), &self.logo_path)
        {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to load logo texture: {}", e);
                false
            }
        }
    }
}

impl Drop for LoadingOverlay {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OverlayError, Result};
    use crate::progress::PROGRESS_RATE;
    use crate::snow::RESPAWN_Y;
    use egui::epaint::Shape;
    use egui::{Color32, ColorImage, Rect};

    struct SolidSource;

    impl ImageSource for SolidSource {
        fn decode(&self, _path: &Path) -> Result<ColorImage> {
            Ok(ColorImage::new([8, 8], Color32::WHITE))
        }
    }

    struct BrokenSource;

    impl ImageSource for BrokenSource {
        fn decode(&self, path: &Path) -> Result<ColorImage> {
            Err(OverlayError::EmptyImage {
                path: path.to_path_buf(),
            })
        }
    }

    fn input(width: f32, height: f32) -> egui::RawInput {
        egui::RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, egui::vec2(width, height))),
            ..Default::default()
        }
    }

    fn init_overlay(overlay: &mut LoadingOverlay, ctx: &egui::Context, w: f32, h: f32) -> bool {
        let mut ok = false;
        let _ = ctx.run(input(w, h), |ctx| ok = overlay.init(ctx));
        ok
    }

    /// Render two frames (the first lets the area settle) and return the
    /// shapes from the second.
    fn render_shapes(overlay: &mut LoadingOverlay, ctx: &egui::Context, w: f32, h: f32) -> Vec<Shape> {
        let _ = ctx.run(input(w, h), |ctx| overlay.render(ctx));
        let output = ctx.run(input(w, h), |ctx| overlay.render(ctx));
        output.shapes.into_iter().map(|c| c.shape).collect()
    }

    fn count_filled_circles(shapes: &[Shape]) -> usize {
        shapes
            .iter()
            .filter(|s| matches!(s, Shape::Circle(c) if c.fill != Color32::TRANSPARENT))
            .count()
    }

    fn ready_overlay(source: impl ImageSource + 'static) -> (LoadingOverlay, egui::Context) {
        let ctx = egui::Context::default();
        let mut overlay = LoadingOverlay::with_seed(11).with_image_source(source);
        assert!(init_overlay(&mut overlay, &ctx, 800.0, 600.0));
        (overlay, ctx)
    }

    #[test]
    fn test_init_populates_and_centres() {
        let (overlay, ctx) = ready_overlay(SolidSource);
        assert_eq!(overlay.snowflakes().len(), MAX_SNOWFLAKES);
        assert_eq!(overlay.center(), egui::pos2(400.0, 300.0));
        assert!(overlay.has_logo());
        assert_eq!(ctx.style().visuals.window_fill, theme::WINDOW_FILL);
    }

    #[test]
    fn test_init_succeeds_without_logo() {
        let (mut overlay, ctx) = ready_overlay(BrokenSource);
        assert!(!overlay.has_logo());
        assert_eq!(overlay.snowflakes().len(), MAX_SNOWFLAKES);

        overlay.update(1.0);
        let shapes = render_shapes(&mut overlay, &ctx, 800.0, 600.0);
        assert!(shapes
            .iter()
            .all(|s| s.texture_id() == egui::TextureId::default()));
        assert_eq!(count_filled_circles(&shapes), MAX_SNOWFLAKES);
    }

    #[test]
    fn test_missing_logo_file_is_not_fatal() {
        let ctx = egui::Context::default();
        let mut overlay =
            LoadingOverlay::with_seed(1).with_logo_path("no/such/dir/logo.png");
        assert!(init_overlay(&mut overlay, &ctx, 640.0, 480.0));
        assert!(!overlay.has_logo());
    }

    #[test]
    fn test_render_draws_back_to_front() {
        let (mut overlay, ctx) = ready_overlay(SolidSource);
        overlay.update(1.0);
        let logo_id = overlay.logo_texture_id().unwrap();
        let shapes = render_shapes(&mut overlay, &ctx, 800.0, 600.0);

        let last_flake = shapes
            .iter()
            .rposition(|s| matches!(s, Shape::Circle(c) if c.fill != Color32::TRANSPARENT))
            .unwrap();
        let track = shapes
            .iter()
            .position(|s| matches!(s, Shape::Circle(c) if c.fill == Color32::TRANSPARENT))
            .unwrap();
        let arc = shapes
            .iter()
            .position(|s| matches!(s, Shape::Path(_)))
            .unwrap();
        let logo = shapes
            .iter()
            .position(|s| s.texture_id() == logo_id)
            .unwrap();

        assert!(last_flake < track);
        assert!(track < arc);
        assert!(arc < logo);
        assert_eq!(count_filled_circles(&shapes), MAX_SNOWFLAKES);
    }

    #[test]
    fn test_centre_follows_resize() {
        let (mut overlay, ctx) = ready_overlay(SolidSource);

        let _ = ctx.run(input(1024.0, 768.0), |ctx| overlay.render(ctx));
        assert_eq!(overlay.center(), egui::pos2(512.0, 384.0));

        let _ = ctx.run(input(300.0, 200.0), |ctx| overlay.render(ctx));
        assert_eq!(overlay.center(), egui::pos2(150.0, 100.0));
        assert_eq!(overlay.viewport(), egui::vec2(300.0, 200.0));
    }

    #[test]
    fn test_update_keeps_flakes_on_screen() {
        let (mut overlay, _ctx) = ready_overlay(SolidSource);
        for _ in 0..500 {
            overlay.update(1.0 / 30.0);
            assert_eq!(overlay.snowflakes().len(), MAX_SNOWFLAKES);
            for flake in overlay.snowflakes() {
                assert!(flake.position.y >= RESPAWN_Y);
                assert!(flake.position.y <= 600.0);
            }
        }
    }

    #[test]
    fn test_progress_loops() {
        let (mut overlay, _ctx) = ready_overlay(SolidSource);
        let dt = 1.0 / 60.0;
        for _ in 0..600 {
            overlay.update(dt);
            assert!((0.0..1.0).contains(&overlay.progress()));
        }
        let expected = (PROGRESS_RATE * dt * 600.0).rem_euclid(1.0);
        let diff = (overlay.progress() - expected).abs();
        assert!(diff < 1e-3 || 1.0 - diff < 1e-3);
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let (mut overlay, _ctx) = ready_overlay(SolidSource);
        let before = overlay.snowflakes().to_vec();
        overlay.update(-1.0);
        overlay.update(f32::NAN);
        assert_eq!(overlay.snowflakes(), before.as_slice());
        assert_eq!(overlay.progress(), 0.0);
    }

    #[test]
    fn test_manual_progress() {
        let (mut overlay, _ctx) = ready_overlay(SolidSource);
        overlay.set_progress(0.5);
        overlay.update(2.0);
        assert_eq!(overlay.progress(), 0.5);
        assert_eq!(overlay.progress_mode(), ProgressMode::Manual);

        overlay.resume_animation();
        overlay.update(1.0);
        assert!((overlay.progress() - 0.7).abs() < 1e-4);
    }

    #[test]
    fn test_cleanup_twice() {
        let (mut overlay, ctx) = ready_overlay(SolidSource);
        let id = overlay.logo_texture_id().unwrap();

        overlay.cleanup();
        assert!(!overlay.has_logo());
        assert!(overlay.snowflakes().is_empty());
        assert!(ctx.tex_manager().read().meta(id).is_none());

        overlay.cleanup();
        assert!(!overlay.has_logo());
        assert!(overlay.snowflakes().is_empty());
    }

    #[test]
    fn test_drop_releases_logo() {
        let (overlay, ctx) = ready_overlay(SolidSource);
        let id = overlay.logo_texture_id().unwrap();
        drop(overlay);
        assert!(ctx.tex_manager().read().meta(id).is_none());
    }

    #[test]
    fn test_reload_logo() {
        let (mut overlay, ctx) = ready_overlay(SolidSource);
        let first = overlay.logo_texture_id().unwrap();

        assert!(overlay.reload_logo("other.png"));
        let second = overlay.logo_texture_id().unwrap();
        assert_ne!(first, second);
        assert!(ctx.tex_manager().read().meta(first).is_none());
        assert_eq!(overlay.logo_path(), Path::new("other.png"));
    }

    #[test]
    fn test_reload_before_init_is_refused() {
        let mut overlay = LoadingOverlay::with_seed(2).with_image_source(SolidSource);
        assert!(!overlay.reload_logo("logo.png"));
        assert!(!overlay.has_logo());
    }

    #[test]
    fn test_same_seed_same_snow() {
        let ctx = egui::Context::default();
        let mut a = LoadingOverlay::with_seed(99).with_image_source(BrokenSource);
        let mut b = LoadingOverlay::with_seed(99).with_image_source(BrokenSource);
        init_overlay(&mut a, &ctx, 800.0, 600.0);
        init_overlay(&mut b, &ctx, 800.0, 600.0);
        for _ in 0..100 {
            a.update(0.05);
            b.update(0.05);
        }
        assert_eq!(a.snowflakes(), b.snowflakes());
    }

    #[test]
    fn test_custom_pool_size() {
        let ctx = egui::Context::default();
        let mut overlay = LoadingOverlay::with_seed(4)
            .with_image_source(BrokenSource)
            .with_max_flakes(12);
        init_overlay(&mut overlay, &ctx, 800.0, 600.0);
        overlay.update(3.0);
        assert_eq!(overlay.snowflakes().len(), 12);
    }
}
