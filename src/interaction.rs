//! Fingertip-to-region interaction mapping.
//!
//! Each frame the fingertip of every detected hand is converted from
//! normalized detector coordinates into canvas pixels and tested against a
//! list of rectangular regions. A hit fires the region's action at most once
//! per cooldown window.

use crate::{
    landmarks::{hand::INDEX_FINGER_TIP, LandmarkSet},
    smoothing::{NoFilter, PointFilter},
};
use log::debug;
use nalgebra::Point2;
use std::time::{Duration, Instant};

/// Canvas dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Screen-space rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Inclusive point-in-rectangle test
    pub fn contains(&self, p: &Point2<f32>) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Convert a normalized landmark to canvas pixels, flipping x for a mirrored display
pub fn to_canvas(x: f32, y: f32, canvas: CanvasSize, mirrored: bool) -> Point2<f32> {
    let px = if mirrored {
        canvas.width - x * canvas.width
    } else {
        x * canvas.width
    };
    Point2::new(px, y * canvas.height)
}

/// Minimum spacing between accepted triggers
#[derive(Debug, Clone)]
pub struct Cooldown {
    window: Duration,
    last_fired: Option<Instant>,
}

impl Cooldown {
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            last_fired: None,
        }
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.last_fired
            .is_some_and(|fired| now.saturating_duration_since(fired) < self.window)
    }

    /// Fire if the cooldown has elapsed; returns whether it fired
    pub fn try_fire(&mut self, now: Instant) -> bool {
        if self.is_active(now) {
            return false;
        }
        self.last_fired = Some(now);
        true
    }
}

/// Maps fingertips onto regions with a shared cooldown
pub struct InteractionMapper {
    mirrored: bool,
    cooldown: Cooldown,
    filter: Box<dyn PointFilter>,
}

impl InteractionMapper {
    pub fn new(cooldown: Duration, mirrored: bool) -> Self {
        Self {
            mirrored,
            cooldown: Cooldown::new(cooldown),
            filter: Box::new(NoFilter),
        }
    }

    /// Smooth fingertip positions before hit testing
    pub fn with_filter(mut self, filter: Box<dyn PointFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub const fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// Canvas positions of the index fingertip for every hand that has it
    pub fn fingertips(&mut self, hands: &[&LandmarkSet], canvas: CanvasSize) -> Vec<Point2<f32>> {
        if hands.is_empty() {
            self.filter.reset();
            return Vec::new();
        }
        let mut points = Vec::with_capacity(hands.len());
        for hand in hands {
            if let Some(tip) = hand.get(INDEX_FINGER_TIP) {
                let p = to_canvas(tip.x, tip.y, canvas, self.mirrored);
                let (x, y) = self.filter.apply(p.x, p.y);
                points.push(Point2::new(x, y));
            }
        }
        points
    }

    /// First region containing a fingertip, ignoring the cooldown
    pub fn locate<A: Copy>(
        &mut self,
        hands: &[&LandmarkSet],
        regions: &[(Region, A)],
        canvas: CanvasSize,
    ) -> Option<A> {
        let tips = self.fingertips(hands, canvas);
        tips.iter()
            .find_map(|tip| regions.iter().find(|(region, _)| region.contains(tip)))
            .map(|(_, action)| *action)
    }

    /// Locate a hit and fire it if the cooldown allows
    pub fn map<A: Copy>(
        &mut self,
        hands: &[&LandmarkSet],
        regions: &[(Region, A)],
        canvas: CanvasSize,
        now: Instant,
    ) -> Option<A> {
        let action = self.locate(hands, regions, canvas)?;
        if self.cooldown.try_fire(now) {
            debug!("Interaction fired");
            Some(action)
        } else {
            None
        }
    }

    pub fn cooldown_active(&self, now: Instant) -> bool {
        self.cooldown.is_active(now)
    }
}
