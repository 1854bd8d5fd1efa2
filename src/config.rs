//! Configuration management for the face filter demos

use crate::{
    catalog::ModelConfig,
    constants::{
        AUTOSWITCH_MAX_INTERVAL_SECONDS, AUTOSWITCH_MIN_INTERVAL_MS, BUTTON_COOLDOWN_MS, FAR_PLANE, FOV_DEGREES, NEAR_PLANE, QUIZ_DEBOUNCE_MS,
        QUIZ_FEEDBACK_WINDOW_MS, QUIZ_QUESTION_DELAY_MS, VIDEO_DEPTH,
    },
    quiz::QuizTimings,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frame source
    pub camera: CameraConfig,

    /// Landmark bridge process
    pub detector: DetectorConfig,

    /// Virtual camera and background plane
    pub scene: SceneConfig,

    /// Overlay models; empty selects the built-in presets of the demo
    pub models: Vec<ModelConfig>,

    /// Button demo tuning
    pub buttons: ButtonsConfig,

    /// Auto-switch demo tuning
    pub autoswitch: AutoSwitchConfig,

    /// Quiz demo tuning
    pub quiz: QuizConfig,

    /// Fingertip handling
    pub interaction: InteractionConfig,

    /// Display configuration
    pub display: DisplayConfig,
}

/// Camera configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Device index
    pub index: i32,

    /// Show the feed mirrored, like a selfie camera
    pub mirror: bool,
}

/// Landmark bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Bridge executable
    pub program: String,

    /// Arguments passed before the detector options
    pub args: Vec<String>,

    /// Maximum number of hands reported per frame
    pub max_hands: usize,

    /// Maximum number of faces reported per frame
    pub max_faces: usize,

    /// Hands scoring below this are discarded (0.0-1.0)
    pub min_hand_confidence: f32,

    /// Face detection confidence passed to the bridge (0.0-1.0)
    pub min_face_confidence: f32,
}

/// Scene configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,

    /// Near clipping plane
    pub near: f32,

    /// Far clipping plane
    pub far: f32,

    /// Distance of the background video plane
    pub video_depth: f32,
}

/// Button demo configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonsConfig {
    /// Minimum time between two button presses
    pub cooldown_ms: u64,
}

/// Auto-switch demo configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSwitchConfig {
    /// Requested interval between model switches
    pub interval_seconds: u64,

    /// Lower bound on the effective interval
    pub min_interval_ms: u64,
}

/// Quiz demo configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// JSON question bank
    pub question_bank: PathBuf,

    /// Minimum time between two accepted answers
    pub debounce_ms: u64,

    /// Time from an answer to the next question
    pub question_delay_ms: u64,

    /// How long the correct/incorrect overlay is shown
    pub feedback_window_ms: u64,

    /// Points removed for a wrong answer
    pub wrong_answer_penalty: u32,
}

/// Interaction configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Fingertip smoothing, `name[:param]`
    pub fingertip_filter: String,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Window title
    pub window_title: String,

    /// Show a window; false runs headless
    pub gui: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { index: 0, mirror: true }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["bridge/landmark_bridge.py".to_string()],
            max_hands: 1,
            max_faces: 3,
            min_hand_confidence: 0.9,
            min_face_confidence: 0.5,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fov_degrees: FOV_DEGREES,
            near: NEAR_PLANE,
            far: FAR_PLANE,
            video_depth: VIDEO_DEPTH,
        }
    }
}

impl Default for ButtonsConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: BUTTON_COOLDOWN_MS,
        }
    }
}

impl Default for AutoSwitchConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
            min_interval_ms: AUTOSWITCH_MIN_INTERVAL_MS,
        }
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_bank: PathBuf::from("assets/questions.json"),
            debounce_ms: QUIZ_DEBOUNCE_MS,
            question_delay_ms: QUIZ_QUESTION_DELAY_MS,
            feedback_window_ms: QUIZ_FEEDBACK_WINDOW_MS,
            wrong_answer_penalty: 0,
        }
    }
}

impl QuizConfig {
    pub const fn timings(&self) -> QuizTimings {
        QuizTimings {
            debounce: Duration::from_millis(self.debounce_ms),
            question_delay: Duration::from_millis(self.question_delay_ms),
            feedback_window: Duration::from_millis(self.feedback_window_ms),
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            fingertip_filter: "none".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_title: "Face Filter".to_string(),
            gui: true,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range setting found
    pub fn validate(&self) -> Result<()> {
        // Detector thresholds
        if !(0.0..=1.0).contains(&self.detector.min_hand_confidence) {
            return Err(Error::ConfigError(
                "Minimum hand confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.detector.min_face_confidence) {
            return Err(Error::ConfigError(
                "Minimum face confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.detector.program.trim().is_empty() {
            return Err(Error::ConfigError("Detector program must not be empty".to_string()));
        }

        // Scene
        if !(self.scene.fov_degrees > 0.0 && self.scene.fov_degrees < 180.0) {
            return Err(Error::ConfigError(
                "Field of view must be between 0 and 180 degrees".to_string(),
            ));
        }
        if !(self.scene.near > 0.0 && self.scene.near < self.scene.far) {
            return Err(Error::ConfigError(
                "Clipping planes must satisfy 0 < near < far".to_string(),
            ));
        }
        if !(self.scene.near..=self.scene.far).contains(&self.scene.video_depth) {
            return Err(Error::ConfigError(
                "Video plane depth must lie between the clipping planes".to_string(),
            ));
        }

        // Models
        for model in &self.models {
            if model.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
                return Err(Error::ConfigError(format!(
                    "Model '{}' needs a finite non-zero scale",
                    model.name
                )));
            }
        }

        // Auto-switch
        if self.autoswitch.interval_seconds > AUTOSWITCH_MAX_INTERVAL_SECONDS
            || self.autoswitch.min_interval_ms > AUTOSWITCH_MAX_INTERVAL_SECONDS * 1000
        {
            return Err(Error::ConfigError(format!(
                "Auto-switch intervals must not exceed {AUTOSWITCH_MAX_INTERVAL_SECONDS} seconds"
            )));
        }

        // Quiz
        if self.quiz.feedback_window_ms > self.quiz.question_delay_ms {
            return Err(Error::ConfigError(
                "Quiz feedback window must not outlast the question delay".to_string(),
            ));
        }

        crate::smoothing::create_filter(&self.interaction.fingertip_filter)?;

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Face Filter Configuration

# Frame source
camera:
  index: 0
  mirror: true

# Landmark bridge process
detector:
  program: "python3"
  args: ["bridge/landmark_bridge.py"]
  max_hands: 1
  max_faces: 3
  min_hand_confidence: 0.9
  min_face_confidence: 0.5

# Virtual camera
scene:
  fov_degrees: 63.0
  near: 1.0
  far: 10000.0
  video_depth: 500.0

# Overlay models (leave empty for the built-in presets)
models:
  - path: "assets/models/helmet_black.obj"
    name: "Black Helmet"
    scale: [30.0, 30.0, 30.0]
    rotation: [0.0, 0.0, 0.0]
    position: [0.0, 0.0, -5.0]
    color: [35, 35, 35]

# Button demo
buttons:
  cooldown_ms: 2000

# Auto-switch demo
autoswitch:
  interval_seconds: 60
  min_interval_ms: 60000

# Quiz demo
quiz:
  question_bank: "assets/questions.json"
  debounce_ms: 2000
  question_delay_ms: 5000
  feedback_window_ms: 1200
  wrong_answer_penalty: 0

# Fingertip handling: none, exponential[:alpha], moving_average[:window]
interaction:
  fingertip_filter: "none"

# Display
display:
  window_title: "Face Filter"
  gui: true
"#;
