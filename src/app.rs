//! Main application module for the face filter demos.

use crate::{
    asset::{AssetLoader, ModelAsset},
    catalog::{autoswitch_presets, button_presets, AutoSwitch, ModelCatalog, ModelConfig},
    config::Config,
    constants::{AUTOSWITCH_STEP_SECONDS, BUTTON_HEIGHT, BUTTON_MARGIN, BUTTON_WIDTH},
    detector::{BridgeDetector, LandmarkDetector},
    hud::{self, HandStyle},
    interaction::{CanvasSize, InteractionMapper, Region},
    landmarks::{Detections, FaceGeometry},
    quiz::{choice_regions, QuestionBank, QuizState},
    render::OpenCvRenderer,
    scene::ScenePresenter,
    smoothing::create_filter,
    utils::safe_cast::f32_to_i32_clamp,
    Error, Result,
};
use log::{debug, error, info, warn};
use opencv::{
    core::{self, Mat, Point},
    highgui::{self, WINDOW_NORMAL},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
};
use rand::{rngs::StdRng, SeedableRng};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Which demo to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demo {
    /// Helmet overlay switched with on-screen buttons
    Buttons,
    /// Helmet overlay switched on a timer
    AutoSwitch,
    /// Two-choice trivia answered by pointing
    Quiz,
}

impl Demo {
    pub const fn tracks_hands(self) -> bool {
        matches!(self, Self::Buttons | Self::Quiz)
    }

    pub const fn tracks_faces(self) -> bool {
        matches!(self, Self::Buttons | Self::AutoSwitch)
    }

    /// Built-in model list for demos that show overlays
    pub fn presets(self) -> Vec<ModelConfig> {
        match self {
            Self::Buttons => button_presets(),
            Self::AutoSwitch => autoswitch_presets(),
            Self::Quiz => Vec::new(),
        }
    }
}

impl FromStr for Demo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "buttons" => Ok(Self::Buttons),
            "autoswitch" | "auto-switch" => Ok(Self::AutoSwitch),
            "quiz" => Ok(Self::Quiz),
            other => Err(Error::InvalidInput(format!(
                "Unknown demo '{other}' (expected buttons, autoswitch or quiz)"
            ))),
        }
    }
}

impl fmt::Display for Demo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Buttons => "buttons",
            Self::AutoSwitch => "autoswitch",
            Self::Quiz => "quiz",
        })
    }
}

/// Video source type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Webcam index
    Camera(i32),
    /// Video file path
    File(String),
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Demo to run
    pub demo: Demo,
    /// Camera index or video file path
    pub video_source: VideoSource,
    /// Settings loaded from file and overridden on the command line
    pub settings: Config,
}

/// On-screen model switching buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Previous,
    Next,
}

/// Previous button on the left edge, next button on the right, both vertically centred
pub fn button_regions(canvas: CanvasSize) -> [(Region, ButtonAction); 2] {
    let y = canvas.height / 2.0 - BUTTON_HEIGHT / 2.0;
    [
        (
            Region::new(BUTTON_MARGIN, y, BUTTON_WIDTH, BUTTON_HEIGHT),
            ButtonAction::Previous,
        ),
        (
            Region::new(canvas.width - BUTTON_MARGIN - BUTTON_WIDTH, y, BUTTON_WIDTH, BUTTON_HEIGHT),
            ButtonAction::Next,
        ),
    ]
}

struct QuizSession {
    bank: QuestionBank,
    state: QuizState,
    rng: StdRng,
}

/// All mutable state of the running demo
pub struct DemoState {
    demo: Demo,
    catalog: Option<ModelCatalog>,
    loader: AssetLoader,
    autoswitch: Option<AutoSwitch>,
    quiz: Option<QuizSession>,
    mapper: InteractionMapper,
    last_action: Option<ButtonAction>,
}

impl DemoState {
    /// Build the state for `demo`, reading the question bank from disk for the quiz
    ///
    /// # Errors
    ///
    /// Returns an error if the model list, question bank or filter setting is unusable
    pub fn new(demo: Demo, config: &Config, now: Instant) -> Result<Self> {
        let bank = if demo == Demo::Quiz {
            info!("Loading questions from {}", config.quiz.question_bank.display());
            Some(QuestionBank::from_file(&config.quiz.question_bank)?)
        } else {
            None
        };
        Self::with_bank(demo, config, bank, now)
    }

    /// Build the state with an already loaded question bank
    ///
    /// # Errors
    ///
    /// Returns an error if the model list, question bank or filter setting is unusable
    pub fn with_bank(demo: Demo, config: &Config, bank: Option<QuestionBank>, now: Instant) -> Result<Self> {
        let cooldown = match demo {
            Demo::Buttons => Duration::from_millis(config.buttons.cooldown_ms),
            // the quiz debounces answers itself
            Demo::AutoSwitch | Demo::Quiz => Duration::ZERO,
        };
        let mapper = InteractionMapper::new(cooldown, config.camera.mirror)
            .with_filter(create_filter(&config.interaction.fingertip_filter)?);

        let mut loader = AssetLoader::new();
        let catalog = if demo.tracks_faces() {
            let models = if config.models.is_empty() {
                demo.presets()
            } else {
                config.models.clone()
            };
            let catalog = ModelCatalog::new(models)?;
            loader.request(catalog.current());
            Some(catalog)
        } else {
            None
        };

        let autoswitch = (demo == Demo::AutoSwitch).then(|| {
            AutoSwitch::new(
                config.autoswitch.interval_seconds,
                Duration::from_millis(config.autoswitch.min_interval_ms),
                now,
            )
        });

        let quiz = if demo == Demo::Quiz {
            let bank = bank.ok_or(Error::EmptyQuestionBank)?;
            let mut rng = StdRng::from_entropy();
            let first = bank.random(&mut rng)?;
            info!("Quiz ready with {} question(s)", bank.len());
            let state = QuizState::new(first, config.quiz.timings()).with_penalty(config.quiz.wrong_answer_penalty);
            Some(QuizSession { bank, state, rng })
        } else {
            None
        };

        Ok(Self {
            demo,
            catalog,
            loader,
            autoswitch,
            quiz,
            mapper,
            last_action: None,
        })
    }

    pub const fn demo(&self) -> Demo {
        self.demo
    }

    pub const fn catalog(&self) -> Option<&ModelCatalog> {
        self.catalog.as_ref()
    }

    pub const fn autoswitch(&self) -> Option<&AutoSwitch> {
        self.autoswitch.as_ref()
    }

    pub fn quiz(&self) -> Option<&QuizState> {
        self.quiz.as_ref().map(|q| &q.state)
    }

    /// Loaded mesh and its placement, if any
    pub fn active_model(&self) -> Option<(&Arc<ModelAsset>, &ModelConfig)> {
        self.loader.active()
    }

    pub const fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    /// Button that fired most recently, while its cooldown is running
    pub fn highlighted_button(&self, now: Instant) -> Option<ButtonAction> {
        self.last_action.filter(|_| self.mapper.cooldown_active(now))
    }

    pub const fn is_mirrored(&self) -> bool {
        self.mapper.is_mirrored()
    }

    fn switch_model(&mut self, action: ButtonAction) {
        if let Some(catalog) = self.catalog.as_mut() {
            let config = match action {
                ButtonAction::Previous => catalog.prev(),
                ButtonAction::Next => catalog.next(),
            };
            self.loader.request(config);
        }
    }

    /// Advance the demo by one frame
    ///
    /// # Errors
    ///
    /// Returns an error if a new quiz question cannot be drawn
    pub fn update(&mut self, detections: &Detections, canvas: CanvasSize, now: Instant) -> Result<()> {
        self.loader.poll();
        let hands = detections.hand_landmarks();

        match self.demo {
            Demo::Buttons => {
                if let Some(action) = self.mapper.map(&hands, &button_regions(canvas), canvas, now) {
                    info!("Button pressed: {action:?}");
                    self.last_action = Some(action);
                    self.switch_model(action);
                }
            }
            Demo::AutoSwitch => {
                if self.autoswitch.as_mut().is_some_and(|s| s.poll(now)) {
                    self.switch_model(ButtonAction::Next);
                }
            }
            Demo::Quiz => {
                if let Some(session) = self.quiz.as_mut() {
                    if session.state.tick(now, &session.bank, &mut session.rng)? {
                        debug!("Next question: {}", session.state.question().text);
                    }
                    if let Some(choice) = self.mapper.locate(&hands, &choice_regions(canvas), canvas) {
                        session.state.select(choice, now);
                    }
                }
            }
        }
        Ok(())
    }

    /// React to a key press; returns true when the user asked to quit
    pub fn handle_key(&mut self, key: i32, now: Instant) -> bool {
        if key < 0 {
            return false;
        }
        match u8::try_from(key & 0xFF).map(char::from) {
            Ok('q' | '\u{1b}') => {
                info!("Exit requested by user");
                true
            }
            Ok('n') => {
                self.switch_model(ButtonAction::Next);
                false
            }
            Ok('p') => {
                self.switch_model(ButtonAction::Previous);
                false
            }
            Ok(c @ ('+' | '=' | '-')) => {
                if let Some(switch) = self.autoswitch.as_mut() {
                    let seconds = if c == '-' {
                        switch.seconds().saturating_sub(AUTOSWITCH_STEP_SECONDS)
                    } else {
                        switch.seconds().saturating_add(AUTOSWITCH_STEP_SECONDS)
                    };
                    switch.set_seconds(seconds, now);
                }
                false
            }
            _ => false,
        }
    }
}

/// Draw the demo's overlay widgets on top of the rendered frame
///
/// # Errors
///
/// Returns an error if an `OpenCV` drawing call fails
pub fn draw_hud(
    canvas: &mut Mat,
    state: &DemoState,
    detections: &Detections,
    size: CanvasSize,
    now: Instant,
) -> Result<()> {
    let style = match state.demo() {
        Demo::Quiz => HandStyle::QUIZ,
        Demo::Buttons | Demo::AutoSwitch => HandStyle::BUTTONS,
    };

    if let Some(quiz) = state.quiz() {
        hud::quiz(canvas, quiz, size, now)?;
    }

    if state.demo() == Demo::Buttons {
        let highlighted = state.highlighted_button(now);
        for (region, action) in button_regions(size) {
            let text = match action {
                ButtonAction::Previous => "< Prev",
                ButtonAction::Next => "Next >",
            };
            hud::button(canvas, &region, text, highlighted == Some(action))?;
        }
    }

    if let Some(catalog) = state.catalog() {
        let mut name = catalog.current().name.clone();
        if state.is_loading() {
            name.push_str(" (loading)");
        }
        let bottom = Region::new(0.0, size.height - 70.0, size.width, 40.0);
        hud::translucent_box(canvas, &bottom, core::Scalar::all(0.0), 0.3)?;
        hud::centered_text(canvas, &name, &bottom, 0.9, core::Scalar::all(255.0))?;
    }

    if let Some(switch) = state.autoswitch() {
        let text = format!(
            "Switch every {}s (effective {}s)  [+/-]",
            switch.seconds(),
            switch.interval().as_secs()
        );
        hud::label(canvas, &text, Point::new(20, 40))?;
    }

    for hand in detections.hand_landmarks() {
        hud::hand_skeleton(canvas, hand, size, state.is_mirrored(), style)?;
    }
    Ok(())
}

/// Main application struct
pub struct FaceFilterApp {
    config: AppConfig,
    video_capture: VideoCapture,
    detector: Box<dyn LandmarkDetector>,
    presenter: ScenePresenter,
    renderer: OpenCvRenderer,
    state: DemoState,
    started: Instant,
}

impl FaceFilterApp {
    /// Open the video source, start the landmark bridge and set up the demo
    ///
    /// # Errors
    ///
    /// Returns an error if any of the components fails to start
    pub fn new(config: AppConfig) -> Result<Self> {
        let detector = BridgeDetector::spawn(
            &config.settings.detector,
            config.demo.tracks_hands(),
            config.demo.tracks_faces(),
            config.settings.camera.mirror,
        )?;
        Self::with_detector(config, Box::new(detector))
    }

    /// Same as [`FaceFilterApp::new`] with a caller-provided detector
    ///
    /// # Errors
    ///
    /// Returns an error if the video source or demo cannot be set up
    pub fn with_detector(config: AppConfig, detector: Box<dyn LandmarkDetector>) -> Result<Self> {
        info!("Initializing {} demo", config.demo);

        let video_capture = open_video_source(&config.video_source)?;
        let state = DemoState::new(config.demo, &config.settings, Instant::now())?;

        let scene = &config.settings.scene;
        let presenter = ScenePresenter::new(scene.fov_degrees, scene.near, scene.far, scene.video_depth);
        let renderer = OpenCvRenderer::new(1280, 720)?;

        if config.settings.display.gui {
            highgui::named_window(&config.settings.display.window_title, WINDOW_NORMAL)?;
        }

        Ok(Self {
            config,
            video_capture,
            detector,
            presenter,
            renderer,
            state,
            started: Instant::now(),
        })
    }

    /// Run the main application loop
    ///
    /// # Errors
    ///
    /// Returns an error if detection, rendering or display fails
    pub fn run(&mut self) -> Result<()> {
        info!("Starting main application loop");

        let mut frame_count = 0u32;
        let mut fps_window_start = Instant::now();
        let mut fps = 0.0;

        loop {
            let mut frame = Mat::default();
            if !self.video_capture.read(&mut frame)? || frame.empty() {
                if matches!(self.config.video_source, VideoSource::File(_)) {
                    info!("End of video file reached");
                    break;
                }
                warn!("Failed to read frame, retrying...");
                continue;
            }

            let detections = self.detector.detect(&frame, self.started.elapsed())?;

            let display = if self.state.is_mirrored() {
                let mut flipped = Mat::default();
                core::flip(&frame, &mut flipped, 1)?;
                flipped
            } else {
                frame
            };
            #[allow(clippy::cast_precision_loss)] // frame sizes fit in f32
            let size = CanvasSize::new(display.cols() as f32, display.rows() as f32);
            let now = Instant::now();

            self.state.update(&detections, size, now)?;

            let faces: &[FaceGeometry] = if self.config.demo.tracks_faces() {
                &detections.faces
            } else {
                &[]
            };
            let stats = self
                .presenter
                .render(&mut self.renderer, &display, size, faces, self.state.active_model())?;
            debug!("Drew {} overlay(s), skipped {}", stats.overlays, stats.skipped);

            let canvas = self.renderer.canvas_mut();
            draw_hud(canvas, &self.state, &detections, size, now)?;

            frame_count += 1;
            let window = fps_window_start.elapsed();
            if window >= Duration::from_secs(1) {
                fps = f64::from(frame_count) / window.as_secs_f64();
                frame_count = 0;
                fps_window_start = Instant::now();
            }
            let fps_origin = Point::new(20, f32_to_i32_clamp(size.height, 0, i32::MAX) - 20);
            hud::label(canvas, &format!("FPS: {fps:.1}"), fps_origin)?;

            if self.config.settings.display.gui {
                highgui::imshow(&self.config.settings.display.window_title, self.renderer.canvas())?;

                let key = highgui::wait_key(1)?;
                if self.state.handle_key(key, now) {
                    break;
                }
            }
        }

        info!("Application shutting down");
        Ok(())
    }
}

fn open_video_source(source: &VideoSource) -> Result<VideoCapture> {
    let capture = match source {
        VideoSource::Camera(index) => {
            info!("Opening camera {index}");
            let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;
            if cap.is_opened()? {
                // one-frame buffer: frames arriving during detection are dropped
                cap.set(CAP_PROP_BUFFERSIZE, 1.0)?;
                cap.set(CAP_PROP_FRAME_WIDTH, 1280.0)?;
                cap.set(CAP_PROP_FRAME_HEIGHT, 720.0)?;
            }
            cap
        }
        VideoSource::File(path) => {
            info!("Opening video file: {path}");
            VideoCapture::from_file(path, videoio::CAP_ANY)?
        }
    };

    if !capture.is_opened()? {
        error!("Unable to open video source {source:?}");
        return Err(Error::Camera(format!("Unable to open {source:?}")));
    }
    Ok(capture)
}
