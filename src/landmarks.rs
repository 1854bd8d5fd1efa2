//! Landmark and pose types produced by the detector each frame.

use crate::{
    constants::{NUM_HAND_LANDMARKS, POSE_MATRIX_LEN},
    Error, Result,
};
use nalgebra::Matrix4;
use serde::Deserialize;

/// Hand landmark indices (MediaPipe hand landmark model convention)
pub mod hand {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_MCP: usize = 5;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_DIP: usize = 7;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP: usize = 13;
    pub const RING_FINGER_PIP: usize = 14;
    pub const RING_FINGER_DIP: usize = 15;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;

    /// Fingertips other than the index finger
    pub const OTHER_FINGERTIPS: [usize; 4] = [THUMB_TIP, MIDDLE_FINGER_TIP, RING_FINGER_TIP, PINKY_TIP];

    /// Bone connections of the hand skeleton
    pub const CONNECTIONS: [(usize, usize); 21] = [
        (WRIST, THUMB_CMC),
        (THUMB_CMC, THUMB_MCP),
        (THUMB_MCP, THUMB_IP),
        (THUMB_IP, THUMB_TIP),
        (WRIST, INDEX_FINGER_MCP),
        (INDEX_FINGER_MCP, INDEX_FINGER_PIP),
        (INDEX_FINGER_PIP, INDEX_FINGER_DIP),
        (INDEX_FINGER_DIP, INDEX_FINGER_TIP),
        (INDEX_FINGER_MCP, MIDDLE_FINGER_MCP),
        (MIDDLE_FINGER_MCP, MIDDLE_FINGER_PIP),
        (MIDDLE_FINGER_PIP, MIDDLE_FINGER_DIP),
        (MIDDLE_FINGER_DIP, MIDDLE_FINGER_TIP),
        (MIDDLE_FINGER_MCP, RING_FINGER_MCP),
        (RING_FINGER_MCP, RING_FINGER_PIP),
        (RING_FINGER_PIP, RING_FINGER_DIP),
        (RING_FINGER_DIP, RING_FINGER_TIP),
        (RING_FINGER_MCP, PINKY_MCP),
        (WRIST, PINKY_MCP),
        (PINKY_MCP, PINKY_PIP),
        (PINKY_PIP, PINKY_DIP),
        (PINKY_DIP, PINKY_TIP),
    ];
}

/// A single landmark, normalized to the frame (x, y in 0..1, z relative depth)
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Ordered landmarks for one detected hand or face
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    /// Landmark at an anatomical index, if the set is long enough
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.points.iter()
    }

    /// True if the set has the full 21-point hand layout
    pub fn is_full_hand(&self) -> bool {
        self.points.len() == NUM_HAND_LANDMARKS
    }
}

/// Camera-space transform of one detected face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseTransform(Matrix4<f32>);

impl PoseTransform {
    pub const fn new(matrix: Matrix4<f32>) -> Self {
        Self(matrix)
    }

    /// Build from a column-major packed list of 16 values
    ///
    /// # Errors
    ///
    /// Returns an error if the list does not hold exactly 16 finite values
    pub fn from_packed(data: &[f32]) -> Result<Self> {
        if data.len() != POSE_MATRIX_LEN {
            return Err(Error::InvalidInput(format!(
                "Pose matrix needs {POSE_MATRIX_LEN} values, got {}",
                data.len()
            )));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidInput("Pose matrix contains non-finite values".to_string()));
        }
        Ok(Self(Matrix4::from_column_slice(data)))
    }

    pub const fn matrix(&self) -> &Matrix4<f32> {
        &self.0
    }
}

/// One detected hand
#[derive(Debug, Clone)]
pub struct Hand {
    pub landmarks: LandmarkSet,
    pub handedness: String,
    pub score: f32,
}

/// One detected face with its geometry
#[derive(Debug, Clone)]
pub struct FaceGeometry {
    pub landmarks: LandmarkSet,
    /// Missing when the detector could not solve the face pose
    pub pose: Option<PoseTransform>,
}

/// Everything the detector found in one frame
#[derive(Debug, Clone, Default)]
pub struct Detections {
    pub hands: Vec<Hand>,
    pub faces: Vec<FaceGeometry>,
}

impl Detections {
    pub fn is_empty(&self) -> bool {
        self.hands.is_empty() && self.faces.is_empty()
    }

    /// Landmark sets of all detected hands, in detector order
    pub fn hand_landmarks(&self) -> Vec<&LandmarkSet> {
        self.hands.iter().map(|h| &h.landmarks).collect()
    }
}
