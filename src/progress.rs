//! Circular progress indicator.

use std::f32::consts::{FRAC_PI_2, TAU};

use egui::{Color32, Painter, Pos2, Shape, Stroke};

pub const RING_RADIUS: f32 = 50.0;
/// Fraction of a full turn per second while animating.
pub const PROGRESS_RATE: f32 = 0.2;
/// Twelve o'clock.
pub const START_ANGLE: f32 = -FRAC_PI_2;
pub const ARC_SEGMENTS: usize = 32;
pub const STROKE_WIDTH: f32 = 2.0;

/// rgba(100, 100, 100, 100) unmultiplied.
pub const TRACK_COLOR: Color32 = Color32::from_rgba_premultiplied(39, 39, 39, 100);
pub const ARC_COLOR: Color32 = Color32::WHITE;

/// Where the ring's fraction comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    /// Loops from 0 to 1 at [`PROGRESS_RATE`], independent of any real work.
    #[default]
    Animated,
    /// Held at whatever the caller last set.
    Manual,
}

#[derive(Debug, Clone)]
pub struct ProgressRing {
    fraction: f32,
    rate: f32,
    radius: f32,
    mode: ProgressMode,
}

impl Default for ProgressRing {
    fn default() -> Self {
        Self {
            fraction: 0.0,
            rate: PROGRESS_RATE,
            radius: RING_RADIUS,
            mode: ProgressMode::Animated,
        }
    }
}

impl ProgressRing {
    pub fn fraction(&self) -> f32 {
        self.fraction
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn mode(&self) -> ProgressMode {
        self.mode
    }

    /// Advance the animation by `dt` seconds, wrapping at 1.0.
    /// Does nothing in manual mode.
    pub fn advance(&mut self, dt: f32) {
        if self.mode == ProgressMode::Manual {
            return;
        }
        let next = (self.fraction + self.rate * dt).rem_euclid(1.0);
        // rem_euclid can round up to exactly 1.0 for tiny negative inputs
        self.fraction = if next >= 1.0 { 0.0 } else { next };
    }

    /// Pin the ring to an externally supplied fraction, clamped to [0, 1].
    pub fn set(&mut self, fraction: f32) {
        self.mode = ProgressMode::Manual;
        self.fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Return to the looping animation, continuing from the current
    /// fraction.
    pub fn resume_animation(&mut self) {
        if self.mode == ProgressMode::Manual {
            self.mode = ProgressMode::Animated;
            if self.fraction >= 1.0 {
                self.fraction = 0.0;
            }
        }
    }

    pub fn sweep(&self) -> f32 {
        TAU * self.fraction
    }

    /// Polyline for the filled part of the ring, or empty at zero progress.
    pub fn arc_points(&self, center: Pos2) -> Vec<Pos2> {
        if self.fraction <= 0.0 {
            return Vec::new();
        }
        arc_points(center, self.radius, START_ANGLE, START_ANGLE + self.sweep(), ARC_SEGMENTS)
    }

    /// Draw the faint track, then the progress arc over it.
    pub fn paint(&self, painter: &Painter, center: Pos2) {
        painter.circle_stroke(center, self.radius, Stroke::new(STROKE_WIDTH, TRACK_COLOR));

        let points = self.arc_points(center);
        if points.len() >= 2 {
            painter.add(Shape::line(points, Stroke::new(STROKE_WIDTH, ARC_COLOR)));
        }
    }
}

/// Evenly spaced points on a circular arc, both end points included.
pub fn arc_points(center: Pos2, radius: f32, start: f32, end: f32, segments: usize) -> Vec<Pos2> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let angle = start + (end - start) * (i as f32 / segments as f32);
            center + radius * egui::vec2(angle.cos(), angle.sin())
        })
        .collect()
}
