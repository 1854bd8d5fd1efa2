//! Ordered list of selectable face filter models and the auto-switch timer.

use crate::{constants::AUTOSWITCH_MAX_INTERVAL_SECONDS, Error, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Static description of one selectable 3D model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the mesh file
    pub path: PathBuf,
    /// Name shown in the filter label
    pub name: String,
    /// Scale applied to the loaded mesh
    pub scale: [f32; 3],
    /// Euler rotation (radians, XYZ order) applied to the loaded mesh
    pub rotation: [f32; 3],
    /// Offset of each face clone inside its pose group
    pub position: [f32; 3],
    /// Base colour (RGB) used for flat shading
    #[serde(default = "default_color")]
    pub color: [u8; 3],
}

const fn default_color() -> [u8; 3] {
    [180, 180, 180]
}

impl ModelConfig {
    fn helmet(path: &str, name: &str, position: [f32; 3], color: [u8; 3]) -> Self {
        Self {
            path: PathBuf::from(path),
            name: name.to_string(),
            scale: [30.0, 30.0, 30.0],
            rotation: [0.0, 0.0, 0.0],
            position,
            color,
        }
    }
}

/// Models offered by the button demo
pub fn button_presets() -> Vec<ModelConfig> {
    vec![
        ModelConfig::helmet("assets/models/helmet_black.obj", "Black Helmet", [0.0, 0.0, -5.0], [35, 35, 35]),
        ModelConfig::helmet("assets/models/helmet_red.obj", "Red Helmet", [0.0, 0.0, -5.0], [200, 30, 30]),
    ]
}

/// Models cycled by the auto-switch demo
pub fn autoswitch_presets() -> Vec<ModelConfig> {
    vec![
        ModelConfig::helmet(
            "assets/models/ls2_rapid2_white.obj",
            "LS2 Rapid2 White",
            [0.0, 5.0, -5.0],
            [235, 235, 235],
        ),
        ModelConfig::helmet(
            "assets/models/ls2_rapid2_matt_titanium.obj",
            "LS2 Rapid2 Matt Titanium",
            [0.0, 5.0, -5.0],
            [110, 112, 118],
        ),
        ModelConfig::helmet(
            "assets/models/ls2_rapid2_optical.obj",
            "LS2 Rapid2 Optical",
            [0.0, 5.0, -5.0],
            [230, 220, 60],
        ),
    ]
}

/// Fixed ordered list of models with a current selection
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    entries: Vec<ModelConfig>,
    index: usize,
}

impl ModelCatalog {
    /// # Errors
    ///
    /// Returns an error if the list is empty
    pub fn new(entries: Vec<ModelConfig>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::ConfigError("At least one model must be configured".to_string()));
        }
        Ok(Self { entries, index: 0 })
    }

    pub fn current(&self) -> &ModelConfig {
        &self.entries[self.index]
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advance to the next model, wrapping around
    pub fn next(&mut self) -> &ModelConfig {
        self.index = (self.index + 1) % self.entries.len();
        info!("Selected model {}: {}", self.index, self.current().name);
        self.current()
    }

    /// Step back to the previous model, wrapping around
    pub fn prev(&mut self) -> &ModelConfig {
        self.index = (self.index + self.entries.len() - 1) % self.entries.len();
        info!("Selected model {}: {}", self.index, self.current().name);
        self.current()
    }
}

/// Periodic model switching with a lower bound on the interval
///
/// Both the requested seconds and the minimum are capped at one day, so the
/// next deadline is always representable.
#[derive(Debug, Clone)]
pub struct AutoSwitch {
    seconds: u64,
    min_interval: Duration,
    next_at: Instant,
}

impl AutoSwitch {
    pub fn new(seconds: u64, min_interval: Duration, now: Instant) -> Self {
        let mut switch = Self {
            seconds: seconds.min(AUTOSWITCH_MAX_INTERVAL_SECONDS),
            min_interval: min_interval.min(Duration::from_secs(AUTOSWITCH_MAX_INTERVAL_SECONDS)),
            next_at: now,
        };
        switch.next_at = now + switch.interval();
        switch
    }

    /// Effective interval: the requested seconds, clamped to the minimum
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.seconds).max(self.min_interval)
    }

    pub const fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Change the requested interval and restart the timer
    pub fn set_seconds(&mut self, seconds: u64, now: Instant) {
        self.seconds = seconds.min(AUTOSWITCH_MAX_INTERVAL_SECONDS);
        self.next_at = now + self.interval();
        info!("Auto-switch interval set to {:?}", self.interval());
    }

    /// True once per elapsed interval
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_at {
            return false;
        }
        self.next_at = now + self.interval();
        true
    }
}
