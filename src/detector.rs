//! Landmark detection through an external bridge process.
//!
//! The vision models (hand landmarker, face mesh with face geometry) run in a
//! separate process. The bridge prints `READY` once it has loaded its models,
//! then serves one request per frame:
//!
//! * request: little-endian `width: u32`, `height: u32`, `channels: u32`,
//!   `timestamp_ms: u64`, followed by the raw BGR pixel bytes
//! * response: a single JSON line
//!   `{"hands": [...], "faces": [...], "error": null}`
//!
//! Requests are strictly sequential, so a frame captured while the previous
//! request is in flight is never queued behind it.

use crate::{
    config::DetectorConfig,
    landmarks::{Detections, FaceGeometry, Hand, Landmark, LandmarkSet, PoseTransform},
    Error, Result,
};
use log::{debug, info, warn};
use opencv::{core::Mat, prelude::*};
use serde::Deserialize;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;

/// Source of per-frame landmarks
pub trait LandmarkDetector {
    /// Detect hands and faces in a frame captured at `timestamp`
    fn detect(&mut self, frame: &Mat, timestamp: Duration) -> Result<Detections>;
}

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default)]
    handedness: String,
    #[serde(default)]
    score: f32,
    landmarks: Vec<Landmark>,
}

#[derive(Deserialize, Debug)]
struct FaceJson {
    #[serde(default)]
    landmarks: Vec<Landmark>,
    #[serde(default)]
    pose: Option<Vec<f32>>,
}

#[derive(Deserialize, Debug)]
struct ResponseJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    faces: Vec<FaceJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode one bridge response line
///
/// Hands scoring below `min_hand_confidence` are dropped. Faces keep their
/// landmarks even when the pose is missing or malformed; such faces carry
/// `pose: None` and are skipped by the renderer.
///
/// # Errors
///
/// Returns an error if the line is not valid JSON
pub fn parse_response(line: &str, min_hand_confidence: f32) -> Result<Detections> {
    let response: ResponseJson = serde_json::from_str(line.trim())?;

    if let Some(error) = response.error {
        warn!("Landmark bridge reported: {}", error);
        return Ok(Detections::default());
    }

    let hands = response
        .hands
        .into_iter()
        .filter(|hand| hand.score >= min_hand_confidence)
        .map(|hand| Hand {
            landmarks: LandmarkSet::new(hand.landmarks),
            handedness: hand.handedness,
            score: hand.score,
        })
        .collect();

    let faces = response
        .faces
        .into_iter()
        .map(|face| {
            let pose = face.pose.and_then(|data| match PoseTransform::from_packed(&data) {
                Ok(pose) => Some(pose),
                Err(e) => {
                    debug!("Dropping face pose: {}", e);
                    None
                }
            });
            FaceGeometry {
                landmarks: LandmarkSet::new(face.landmarks),
                pose,
            }
        })
        .collect();

    Ok(Detections { hands, faces })
}

/// Detector backed by a long-running bridge subprocess
pub struct BridgeDetector {
    process: Child,
    stdin: ChildStdin,
    stdout_reader: BufReader<ChildStdout>,
    min_hand_confidence: f32,
}

impl BridgeDetector {
    /// Spawn the bridge and wait for its `READY` line
    ///
    /// `mirrored` must match the displayed frame so face poses land on the
    /// same side of the screen as the faces.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be started or does not signal ready
    pub fn spawn(config: &DetectorConfig, want_hands: bool, want_faces: bool, mirrored: bool) -> Result<Self> {
        info!("Starting landmark bridge: {} {:?}", config.program, config.args);

        let mut command = Command::new(&config.program);
        command
            .args(&config.args)
            .arg("--max-hands")
            .arg(if want_hands { config.max_hands } else { 0 }.to_string())
            .arg("--max-faces")
            .arg(if want_faces { config.max_faces } else { 0 }.to_string())
            .arg("--min-hand-confidence")
            .arg(config.min_hand_confidence.to_string())
            .arg("--min-face-confidence")
            .arg(config.min_face_confidence.to_string());
        if mirrored {
            command.arg("--selfie");
        }

        let mut process = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::Detector(format!("Failed to start {}: {e}", config.program)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| Error::Detector("Bridge stdin unavailable".to_string()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| Error::Detector("Bridge stdout unavailable".to_string()))?;
        let mut stdout_reader = BufReader::new(stdout);

        let mut ready_line = String::new();
        stdout_reader.read_line(&mut ready_line)?;
        if ready_line.trim() != "READY" {
            let _ = process.kill();
            return Err(Error::Detector(format!(
                "Bridge did not signal ready, got: {}",
                ready_line.trim()
            )));
        }

        info!("Landmark bridge ready");

        Ok(Self {
            process,
            stdin,
            stdout_reader,
            min_hand_confidence: config.min_hand_confidence,
        })
    }
}

impl LandmarkDetector for BridgeDetector {
    fn detect(&mut self, frame: &Mat, timestamp: Duration) -> Result<Detections> {
        if frame.empty() {
            return Ok(Detections::default());
        }

        let width = u32::try_from(frame.cols()).map_err(|_| Error::InvalidInput("Negative frame width".to_string()))?;
        let height = u32::try_from(frame.rows()).map_err(|_| Error::InvalidInput("Negative frame height".to_string()))?;
        let channels =
            u32::try_from(frame.channels()).map_err(|_| Error::InvalidInput("Negative channel count".to_string()))?;
        let timestamp_ms = u64::try_from(timestamp.as_millis()).unwrap_or(u64::MAX);

        // data_bytes needs a continuous buffer; ROIs and flipped views are not
        let owned;
        let frame = if frame.is_continuous() {
            frame
        } else {
            owned = frame.try_clone()?;
            &owned
        };

        self.stdin.write_all(&width.to_le_bytes())?;
        self.stdin.write_all(&height.to_le_bytes())?;
        self.stdin.write_all(&channels.to_le_bytes())?;
        self.stdin.write_all(&timestamp_ms.to_le_bytes())?;
        self.stdin.write_all(frame.data_bytes()?)?;
        self.stdin.flush()?;

        let mut response = String::new();
        let read = self.stdout_reader.read_line(&mut response)?;
        if read == 0 {
            return Err(Error::Detector("Bridge closed its output".to_string()));
        }

        let detections = parse_response(&response, self.min_hand_confidence)?;
        debug!(
            "Frame {}ms: {} hand(s), {} face(s)",
            timestamp_ms,
            detections.hands.len(),
            detections.faces.len()
        );
        Ok(detections)
    }
}

impl Drop for BridgeDetector {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_json(score: f32) -> String {
        let points: Vec<String> = (0..21)
            .map(|i| format!(r#"{{"x": {}, "y": 0.5, "z": 0.0}}"#, i as f32 / 21.0))
            .collect();
        format!(
            r#"{{"handedness": "Right", "score": {score}, "landmarks": [{}]}}"#,
            points.join(",")
        )
    }

    #[test]
    fn test_parse_hands_with_threshold() {
        let line = format!(r#"{{"hands": [{}, {}], "faces": []}}"#, hand_json(0.95), hand_json(0.3));
        let detections = parse_response(&line, 0.5).unwrap();
        assert_eq!(detections.hands.len(), 1);
        assert_eq!(detections.hands[0].handedness, "Right");
        assert!(detections.hands[0].landmarks.is_full_hand());
    }

    #[test]
    fn test_parse_faces_keeps_faces_without_pose() {
        let identity = "[1,0,0,0, 0,1,0,0, 0,0,1,0, 0,0,-50,1]";
        let line = format!(
            r#"{{"faces": [{{"pose": {identity}}}, {{"pose": null}}, {{"pose": [1, 2, 3]}}]}}"#
        );
        let detections = parse_response(&line, 0.5).unwrap();
        assert_eq!(detections.faces.len(), 3);
        assert!(detections.faces[0].pose.is_some());
        assert!(detections.faces[1].pose.is_none());
        assert!(detections.faces[2].pose.is_none());
    }

    #[test]
    fn test_parse_error_field_yields_empty_frame() {
        let line = format!(r#"{{"hands": [{}], "error": "model crashed"}}"#, hand_json(1.0));
        let detections = parse_response(&line, 0.0).unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_response("not json", 0.5).is_err());
    }

    #[test]
    fn test_parse_empty_response() {
        let detections = parse_response("{}\n", 0.5).unwrap();
        assert!(detections.is_empty());
    }
}
