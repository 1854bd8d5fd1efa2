//! Mesh assets and their background loader.
//!
//! Meshes are read from Wavefront OBJ files. Only geometry is used: `v`
//! records become vertices and `f` records are fan-triangulated. Texture and
//! normal indices (`f 1/2/3`) are accepted and ignored.

use crate::{catalog::ModelConfig, Error, Result};
use log::{info, warn};
use nalgebra::Point3;
use std::fs;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

/// Triangle mesh ready to be placed in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAsset {
    pub vertices: Vec<Point3<f32>>,
    pub triangles: Vec<[usize; 3]>,
}

impl ModelAsset {
    /// Load a mesh from an OBJ file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid mesh
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Asset(format!("Failed to read {}: {e}", path.as_ref().display())))?;
        Self::parse_obj(&content)
    }

    /// Parse OBJ text
    ///
    /// # Errors
    ///
    /// Returns an error on malformed records, out-of-range indices, or an empty mesh
    pub fn parse_obj(content: &str) -> Result<Self> {
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let mut fields = line.split_whitespace();
            match fields.next() {
                Some("v") => {
                    let coords: Vec<f32> = fields
                        .take(3)
                        .map(str::parse::<f32>)
                        .collect::<std::result::Result<_, _>>()
                        .map_err(|e| Error::Asset(format!("Line {}: bad vertex: {e}", line_no + 1)))?;
                    if coords.len() != 3 {
                        return Err(Error::Asset(format!("Line {}: vertex needs 3 coordinates", line_no + 1)));
                    }
                    vertices.push(Point3::new(coords[0], coords[1], coords[2]));
                }
                Some("f") => {
                    let corners = fields
                        .map(|field| Self::parse_face_index(field, vertices.len(), line_no + 1))
                        .collect::<Result<Vec<usize>>>()?;
                    if corners.len() < 3 {
                        return Err(Error::Asset(format!("Line {}: face needs 3 corners", line_no + 1)));
                    }
                    for i in 1..corners.len() - 1 {
                        triangles.push([corners[0], corners[i], corners[i + 1]]);
                    }
                }
                _ => {}
            }
        }

        if triangles.is_empty() {
            return Err(Error::Asset("Mesh has no faces".to_string()));
        }

        Ok(Self { vertices, triangles })
    }

    /// Resolve a 1-based (or negative, relative) OBJ index
    fn parse_face_index(field: &str, vertex_count: usize, line_no: usize) -> Result<usize> {
        let raw = field.split('/').next().unwrap_or_default();
        let index: i64 = raw
            .parse()
            .map_err(|_| Error::Asset(format!("Line {line_no}: bad face index '{field}'")))?;
        let count = i64::try_from(vertex_count).map_err(|_| Error::Asset("Too many vertices".to_string()))?;
        let resolved = if index < 0 { count + index } else { index - 1 };
        if resolved < 0 || resolved >= count {
            return Err(Error::Asset(format!("Line {line_no}: face index {index} out of range")));
        }
        usize::try_from(resolved).map_err(|_| Error::Asset(format!("Line {line_no}: face index overflow")))
    }
}

/// Outcome of one background load
struct LoadOutcome {
    generation: u64,
    name: String,
    result: Result<ModelAsset>,
}

/// Loads meshes off the render thread and hands back the most recent one
///
/// Requesting a new model immediately clears the active one, so nothing is
/// drawn until the new mesh arrives. Completions of superseded requests are
/// dropped.
pub struct AssetLoader {
    sender: Sender<LoadOutcome>,
    receiver: Receiver<LoadOutcome>,
    generation: u64,
    active: Option<(Arc<ModelAsset>, ModelConfig)>,
    pending: Option<ModelConfig>,
}

impl AssetLoader {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            generation: 0,
            active: None,
            pending: None,
        }
    }

    /// Start loading a model, replacing whatever is active or pending
    pub fn request(&mut self, config: &ModelConfig) {
        self.generation += 1;
        self.active = None;
        self.pending = Some(config.clone());

        let generation = self.generation;
        let sender = self.sender.clone();
        let path = config.path.clone();
        let name = config.name.clone();
        info!("Loading model '{}' from {}", name, path.display());

        thread::spawn(move || {
            let result = ModelAsset::load(&path);
            // receiver gone means the app is shutting down
            let _ = sender.send(LoadOutcome {
                generation,
                name,
                result,
            });
        });
    }

    /// Apply finished loads; returns true if a new model became active
    pub fn poll(&mut self) -> bool {
        let mut activated = false;
        loop {
            match self.receiver.try_recv() {
                Ok(outcome) => {
                    if outcome.generation != self.generation {
                        continue;
                    }
                    let Some(config) = self.pending.take() else {
                        continue;
                    };
                    match outcome.result {
                        Ok(asset) => {
                            info!(
                                "Model '{}' ready: {} vertices, {} triangles",
                                outcome.name,
                                asset.vertices.len(),
                                asset.triangles.len()
                            );
                            self.active = Some((Arc::new(asset), config));
                            activated = true;
                        }
                        Err(e) => warn!("Failed to load model '{}': {}", outcome.name, e),
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        activated
    }

    /// Active mesh together with the config it was loaded for
    pub fn active(&self) -> Option<(&Arc<ModelAsset>, &ModelConfig)> {
        self.active.as_ref().map(|(asset, config)| (asset, config))
    }

    pub const fn is_loading(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}
