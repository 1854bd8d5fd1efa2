//! Constants used throughout the application

/// Number of landmarks in a hand landmark set
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Length of a packed 4x4 pose matrix
pub const POSE_MATRIX_LEN: usize = 16;

/// Perspective camera parameters
pub const FOV_DEGREES: f32 = 63.0;
pub const NEAR_PLANE: f32 = 1.0;
pub const FAR_PLANE: f32 = 10_000.0;

/// Distance of the background video plane from the camera
pub const VIDEO_DEPTH: f32 = 500.0;

/// Scene clear colour (light blue)
pub const SCENE_BACKGROUND: u32 = 0x00AD_D8E6;

/// Lighting
pub const HEMI_SKY_COLOR: u32 = 0x00FF_FFFF;
pub const HEMI_GROUND_COLOR: u32 = 0x0044_4444;
pub const HEMI_LIGHT_POSITION: [f32; 3] = [0.0, 100.0, 0.0];
pub const DIR_LIGHT_COLOR: u32 = 0x00FF_FFFF;
pub const DIR_LIGHT_POSITION: [f32; 3] = [-30.0, 100.0, -5.0];

/// Button demo cooldown after a fingertip press
pub const BUTTON_COOLDOWN_MS: u64 = 2000;

/// Quiz timings
pub const QUIZ_DEBOUNCE_MS: u64 = 2000;
pub const QUIZ_QUESTION_DELAY_MS: u64 = 5000;
pub const QUIZ_FEEDBACK_WINDOW_MS: u64 = 1200;

/// Auto-switch never cycles faster than once a minute
pub const AUTOSWITCH_MIN_INTERVAL_MS: u64 = 60_000;
pub const AUTOSWITCH_STEP_SECONDS: u64 = 10;
/// Upper bound on any auto-switch interval (one day)
pub const AUTOSWITCH_MAX_INTERVAL_SECONDS: u64 = 86_400;

/// Quiz layout
pub const QUIZ_BANNER_Y: f32 = 120.0;
pub const QUIZ_BANNER_HEIGHT: f32 = 56.0;
pub const QUIZ_BANNER_MARGIN: f32 = 200.0;
pub const QUIZ_CHOICE_WIDTH: f32 = 260.0;
pub const QUIZ_CHOICE_HEIGHT: f32 = 90.0;
pub const QUIZ_CHOICE_GAP: f32 = 60.0;
pub const QUIZ_CHOICE_BOTTOM_OFFSET: f32 = 150.0;

/// Filter button layout
pub const BUTTON_WIDTH: f32 = 180.0;
pub const BUTTON_HEIGHT: f32 = 80.0;
pub const BUTTON_MARGIN: f32 = 40.0;
