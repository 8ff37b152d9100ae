//! Falling-snow particle field.

use std::ops::Range;

use egui::{Color32, Painter, Pos2, Vec2};
use rand::Rng;

/// Number of flakes in a default field.
pub const MAX_SNOWFLAKES: usize = 100;
/// Fall speed in pixels per second.
pub const SPEED_RANGE: Range<f32> = 50.0..150.0;
/// Flake radius in pixels.
pub const SIZE_RANGE: Range<f32> = 2.0..4.0;
pub const ALPHA_RANGE: Range<f32> = 0.3..1.0;
/// Recycled flakes re-enter just above the top edge.
pub const RESPAWN_Y: f32 = -5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snowflake {
    pub position: Pos2,
    /// Pixels per second.
    pub speed: f32,
    /// Radius in pixels.
    pub size: f32,
    /// Opacity in 0.0–1.0.
    pub alpha: f32,
}

impl Snowflake {
    fn random<R: Rng + ?Sized>(rng: &mut R, viewport: Vec2) -> Self {
        Self {
            position: Pos2::new(sample_span(rng, viewport.x), sample_span(rng, viewport.y)),
            speed: rng.random_range(SPEED_RANGE),
            size: rng.random_range(SIZE_RANGE),
            alpha: rng.random_range(ALPHA_RANGE),
        }
    }

    pub fn color(&self) -> Color32 {
        let a = (255.0 * self.alpha.clamp(0.0, 1.0)) as u8;
        Color32::from_rgba_unmultiplied(255, 255, 255, a)
    }
}

/// Uniform sample in `[0, max)`, or 0 when the span is empty.
fn sample_span<R: Rng + ?Sized>(rng: &mut R, max: f32) -> f32 {
    if max > 0.0 {
        rng.random_range(0.0..max)
    } else {
        0.0
    }
}

/// A fixed-size pool of flakes that are recycled in place once they fall
/// past the bottom edge.
#[derive(Debug, Clone)]
pub struct SnowField {
    flakes: Vec<Snowflake>,
    capacity: usize,
}

impl Default for SnowField {
    fn default() -> Self {
        Self::new(MAX_SNOWFLAKES)
    }
}

impl SnowField {
    pub fn new(capacity: usize) -> Self {
        Self {
            flakes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Replace the pool with `capacity` freshly randomized flakes spread
    /// over the whole viewport.
    pub fn populate<R: Rng + ?Sized>(&mut self, rng: &mut R, viewport: Vec2) {
        self.flakes.clear();
        self.flakes
            .extend((0..self.capacity).map(|_| Snowflake::random(rng, viewport)));
    }

    /// Advance every flake by `dt` seconds.
    ///
    /// A flake that drops below `viewport.y` moves back to [`RESPAWN_Y`] with
    /// a new horizontal position and opacity. Its speed and size are kept.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R, dt: f32, viewport: Vec2) {
        for flake in &mut self.flakes {
            flake.position.y += flake.speed * dt;

            if flake.position.y > viewport.y {
                flake.position.y = RESPAWN_Y;
                flake.position.x = sample_span(rng, viewport.x);
                flake.alpha = rng.random_range(ALPHA_RANGE);
            }
        }
    }

    pub fn paint(&self, painter: &Painter) {
        for flake in &self.flakes {
            painter.circle_filled(flake.position, flake.size, flake.color());
        }
    }

    pub fn clear(&mut self) {
        self.flakes.clear();
    }

    pub fn flakes(&self) -> &[Snowflake] {
        &self.flakes
    }

    pub fn len(&self) -> usize {
        self.flakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flakes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
