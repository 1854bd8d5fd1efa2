//! Hand-driven 3D face filters and gesture trivia on a live camera feed.
//!
//! The library wires a camera feed into an external landmark detector and
//! an `OpenCV` renderer:
//! - Hand and face landmarks come from a bridge process (see [`detector`])
//! - Fingertips are mapped onto on-screen regions with a cooldown ([`interaction`])
//! - A 3D model is placed on every face with a pose ([`scene`], [`render`])
//! - A two-choice quiz is answered by pointing ([`quiz`])
//!
//! Each frame runs the same pipeline:
//! 1. Read a frame from the camera
//! 2. Ask the detector for hands and faces
//! 3. Turn fingertip positions into button presses or quiz answers
//! 4. Draw the video, the overlays and the HUD
//!
//! # Examples
//!
//! ## Placing a model on a face
//!
//! ```no_run
//! use face_filter::{
//!     asset::ModelAsset,
//!     catalog::button_presets,
//!     landmarks::PoseTransform,
//!     scene::project_overlay,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = &button_presets()[0];
//! let asset = Arc::new(ModelAsset::load(&config.path)?);
//!
//! // column-major 4x4 matrix as reported by the detector
//! let mut packed = [0.0f32; 16];
//! packed[0] = 1.0;
//! packed[5] = 1.0;
//! packed[10] = 1.0;
//! packed[15] = 1.0;
//! packed[14] = -60.0;
//! let pose = PoseTransform::from_packed(&packed)?;
//!
//! let node = project_overlay(&asset, config, &pose);
//! println!("Model origin in camera space: {}", node.world.column(3));
//! # Ok(())
//! # }
//! ```
//!
//! ## Hit testing a fingertip
//!
//! ```no_run
//! use face_filter::{
//!     interaction::{CanvasSize, InteractionMapper, Region},
//!     landmarks::{Landmark, LandmarkSet},
//! };
//! use std::time::{Duration, Instant};
//!
//! let mut mapper = InteractionMapper::new(Duration::from_millis(2000), true);
//! let canvas = CanvasSize::new(1280.0, 720.0);
//! let regions = [(Region::new(1000.0, 300.0, 200.0, 100.0), "next")];
//!
//! let hand = LandmarkSet::new(vec![Landmark::new(0.1, 0.48, 0.0); 21]);
//! if let Some(action) = mapper.map(&[&hand], &regions, canvas, Instant::now()) {
//!     println!("Fired {action}");
//! }
//! ```
//!
//! ## Running the quiz
//!
//! ```no_run
//! use face_filter::quiz::{QuestionBank, QuizState, QuizTimings};
//! use std::time::Instant;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bank = QuestionBank::from_file("assets/questions.json")?;
//! let mut rng = rand::thread_rng();
//! let mut quiz = QuizState::new(bank.random(&mut rng)?, QuizTimings::default());
//!
//! if let Some(selection) = quiz.select(0, Instant::now()) {
//!     println!("Correct: {} (score {})", selection.correct, quiz.score());
//! }
//! # Ok(())
//! # }
//! ```

/// Hand and face landmark types
pub mod landmarks;

/// Landmark detection through an external bridge process
pub mod detector;

/// Fingertip smoothing filters
pub mod smoothing;

/// Fingertip-to-region interaction mapping
pub mod interaction;

/// Selectable models and the auto-switch timer
pub mod catalog;

/// Mesh loading
pub mod asset;

/// Per-frame scene assembly
pub mod scene;

/// `OpenCV` scene renderer
pub mod render;

/// On-screen widgets
pub mod hud;

/// Two-choice quiz state machine
pub mod quiz;

/// Utility functions for colours and coordinate conversion
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
